// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod common;

use aether_core::renderer::api::*;
use aether_core::renderer::error::{PipelineError, ResourceError, ShaderError};
use aether_core::renderer::logging::{MemorySink, Severity};
use aether_core::renderer::traits::{Buffer, GraphicsDevice, RenderPipeline, ShaderModule, Texture};
use aether_infra::graphics::d3d12::{D3D12Device, HeadlessD3D12Device};
use aether_infra::graphics::vulkan::{
    BufferVulkan, HeadlessVulkanDevice, RenderPipelineVulkan, TextureVulkan, VulkanDevice,
    SPIRV_MAGIC,
};
use ash::vk::{self, Handle};
use common::*;
use std::sync::Arc;

fn device() -> (Arc<HeadlessVulkanDevice>, VulkanDevice, Arc<MemorySink>) {
    init_logging();
    let raw = Arc::new(HeadlessVulkanDevice::new());
    let (sink, logger) = recording_logger();
    let device = VulkanDevice::new(
        raw.clone(),
        raw.clone(),
        settings(GraphicsBackendType::Vulkan),
        logger,
    );
    (raw, device, sink)
}

#[test]
fn set_layouts_carry_immutable_samplers() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let layout = mixed_layout(&device);
    let pipeline = device.create_render_pipeline(simple_pipeline(&device, layout))?;
    let vulkan = pipeline
        .as_any()
        .downcast_ref::<RenderPipelineVulkan>()
        .expect("Vulkan pipeline");
    assert_eq!(vulkan.layout().set_layouts().len(), 2);

    let log = raw.log();
    assert_eq!(log.set_layouts.len(), 2);
    let set0 = &log.set_layouts[0].1;
    // The reserved binding is skipped but keeps its index.
    assert_eq!(set0.len(), 2);
    assert_eq!(set0[0].binding, 0);
    assert_eq!(set0[0].descriptor_type, vk::DescriptorType::UNIFORM_BUFFER);
    assert_eq!(set0[1].binding, 2);
    assert_eq!(set0[1].descriptor_type, vk::DescriptorType::SAMPLER);
    assert_eq!(set0[1].descriptor_count, 2);
    let samplers: Vec<_> = log.samplers.iter().map(|(handle, _)| *handle).collect();
    assert_eq!(set0[1].immutable_samplers, samplers);

    let set1 = &log.set_layouts[1].1;
    assert_eq!(set1[0].descriptor_type, vk::DescriptorType::SAMPLED_IMAGE);
    assert_eq!(set1[0].descriptor_count, 4);

    let info = &log.pipeline_layouts[0].1;
    assert_eq!(info.set_layouts, vulkan.layout().set_layouts());
    assert_eq!(info.push_constant_ranges.len(), 1);
    assert_eq!(info.push_constant_ranges[0].size, 20);
    assert!(log.graphics_pipelines.is_empty());
    Ok(())
}

#[test]
fn pipeline_info_follows_target_formats() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let mut desc = simple_pipeline(&device, PipelineLayout::default());
    desc.depth_stencil_state.depth_test = true;
    desc.depth_stencil_state.depth_write = false;
    desc.depth_stencil_state.stencil_test = true;
    let mut pipeline = device.create_render_pipeline(desc)?;

    assert!(pipeline.set_target_formats(
        &[ResourceFormat::Bgra8Unorm],
        ResourceFormat::Depth24UnormStencil8
    )?);
    assert!(!pipeline.set_target_formats(
        &[ResourceFormat::Bgra8Unorm],
        ResourceFormat::Depth24UnormStencil8
    )?);

    let log = raw.log();
    assert_eq!(log.graphics_pipelines.len(), 1);
    let info = &log.graphics_pipelines[0].1;
    assert_eq!(info.color_formats, vec![vk::Format::B8G8R8A8_UNORM]);
    assert_eq!(info.depth_format, vk::Format::D24_UNORM_S8_UINT);
    assert_eq!(info.stencil_format, vk::Format::D24_UNORM_S8_UINT);
    assert!(info.depth_stencil.depth_test_enable);
    assert!(!info.depth_stencil.depth_write_enable);
    assert!(info.depth_stencil.stencil_test_enable);
    assert_eq!(
        info.dynamic_states,
        vec![
            vk::DynamicState::VIEWPORT,
            vk::DynamicState::SCISSOR,
            vk::DynamicState::STENCIL_REFERENCE
        ]
    );
    assert_eq!(info.stages.len(), 2);
    assert_eq!(info.stages[0].stage, vk::ShaderStageFlags::VERTEX);
    assert_eq!(info.stages[1].stage, vk::ShaderStageFlags::FRAGMENT);
    Ok(())
}

#[test]
fn depth_only_target_has_no_stencil_format() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let mut pipeline = device.create_render_pipeline(simple_pipeline(&device, PipelineLayout::default()))?;
    pipeline.set_target_formats(&[ResourceFormat::Rgba8Unorm], ResourceFormat::Depth32Float)?;
    let first = pipeline
        .as_any()
        .downcast_ref::<RenderPipelineVulkan>()
        .and_then(RenderPipelineVulkan::raw)
        .expect("compiled");

    {
        let log = raw.log();
        let info = &log.graphics_pipelines[0].1;
        assert_eq!(info.depth_format, vk::Format::D32_SFLOAT);
        assert_eq!(info.stencil_format, vk::Format::UNDEFINED);
        // The depth test is off, so nothing is written either.
        assert!(!info.depth_stencil.depth_write_enable);
        assert_eq!(info.dynamic_states.len(), 2);
    }

    pipeline.set_target_formats(&[ResourceFormat::Rgba8Unorm], ResourceFormat::Undefined)?;
    assert!(!raw.is_alive(first));
    assert_eq!(raw.log().graphics_pipelines.len(), 2);
    Ok(())
}

#[test]
fn failed_pipeline_layout_destroys_set_layouts() {
    let (raw, device, sink) = device();
    let layout = mixed_layout(&device);
    raw.fail_pipeline_layouts(true);
    let err = device
        .create_render_pipeline(simple_pipeline(&device, layout))
        .unwrap_err();
    assert!(matches!(
        err,
        ResourceError::Pipeline(PipelineError::LayoutCreationFailed(_))
    ));
    assert_eq!(sink.count(Severity::Critical), 1);

    let log = raw.log();
    assert_eq!(log.set_layouts.len(), 2);
    for (handle, _) in &log.set_layouts {
        assert!(log
            .destroyed
            .contains(&(vk::ObjectType::DESCRIPTOR_SET_LAYOUT, handle.as_raw())));
    }
}

#[test]
fn failed_build_logs_once() -> anyhow::Result<()> {
    let (raw, device, sink) = device();
    let mut pipeline = device.create_render_pipeline(simple_pipeline(&device, PipelineLayout::default()))?;
    raw.fail_graphics_pipelines(true);
    let err = pipeline
        .set_target_formats(&[ResourceFormat::Rgba8Unorm], ResourceFormat::Undefined)
        .unwrap_err();
    assert!(matches!(err, PipelineError::CompilationFailed { .. }));
    assert!(!pipeline.is_compiled());
    assert_eq!(sink.count(Severity::Critical), 1);
    Ok(())
}

#[test]
fn wrong_backend_sampler_is_rejected() {
    let (_, device, sink) = device();
    let other = D3D12Device::new(
        Arc::new(HeadlessD3D12Device::new()),
        settings(GraphicsBackendType::Dx12),
        Default::default(),
    );
    let foreign = other
        .create_sampler(&SamplerDescriptor::default())
        .expect("sampler");
    let layout = PipelineLayout {
        sets_layout: vec![DescriptorSetLayout::new(vec![
            DescriptorSetLayoutBinding::immutable_samplers(vec![foreign]),
        ])],
        push_constants_size: 0,
    };
    let err = device
        .create_render_pipeline(simple_pipeline(&device, layout))
        .unwrap_err();
    assert!(matches!(
        err,
        ResourceError::Pipeline(PipelineError::BackendMismatch {
            expected: "Vulkan",
            ..
        })
    ));
    assert_eq!(sink.count(Severity::Critical), 1);
}

#[test]
fn invalid_spirv_is_reported_once() {
    let (raw, device, sink) = device();
    let mut descriptor = ShaderModuleDescriptor {
        label: "broken".to_string(),
        stage: ShaderStage::Vertex,
        entry_point: "main".to_string(),
        bytecode: b"DXBC".to_vec(),
    };
    let err = device.create_shader_module(&descriptor).unwrap_err();
    assert!(matches!(
        err,
        ResourceError::Shader(ShaderError::CompilationError { .. })
    ));

    descriptor.bytecode = bytecode(GraphicsBackendType::Vulkan);
    descriptor.bytecode.pop();
    assert!(device.create_shader_module(&descriptor).is_err());

    descriptor.bytecode = bytecode(GraphicsBackendType::Vulkan);
    descriptor.entry_point = "ma\0in".to_string();
    let err = device.create_shader_module(&descriptor).unwrap_err();
    assert!(matches!(
        err,
        ResourceError::Shader(ShaderError::InvalidEntryPoint { .. })
    ));

    assert_eq!(sink.count(Severity::Critical), 3);
    assert!(raw.log().shader_modules.is_empty());
}

#[test]
fn shader_modules_keep_their_words() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let module = shader(&device, ShaderStage::Compute, "cull");
    assert_eq!(module.bytecode(), bytecode(GraphicsBackendType::Vulkan).as_slice());
    let log = raw.log();
    assert_eq!(log.shader_modules.len(), 1);
    assert_eq!(log.shader_modules[0].1[0], SPIRV_MAGIC);
    assert!(log
        .names
        .iter()
        .any(|(_, ty, name)| *ty == vk::ObjectType::SHADER_MODULE && name == "cull"));
    Ok(())
}

#[test]
fn allocation_failure_destroys_the_buffer() {
    let (raw, device, sink) = device();
    raw.fail_allocations(true);
    let err = device
        .create_buffer(&BufferDescriptor::device_local("vertices", 1024, BufferUsage::VERTEX))
        .unwrap_err();
    assert!(matches!(err, ResourceError::Allocation(_)));
    assert_eq!(sink.count(Severity::Critical), 1);

    let log = raw.log();
    let (buffer, _) = log.buffers[0];
    assert!(log
        .destroyed
        .contains(&(vk::ObjectType::BUFFER, buffer.as_raw())));
    assert!(log.bindings.is_empty());
}

#[test]
fn upload_buffers_write_through_their_mapping() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let buffer = device.create_buffer(&BufferDescriptor::upload("constants", 64, BufferUsage::UNIFORM))?;
    assert!(buffer.is_mapped());
    buffer.write_pod(4, &[0.5f32, 1.5])?;

    let vulkan = buffer
        .as_any()
        .downcast_ref::<BufferVulkan>()
        .expect("Vulkan buffer");
    let id = vulkan.memory().allocation().id;
    let handle = vulkan.raw();
    let memory = raw.memory(id).expect("host-visible memory");
    assert_eq!(&memory[4..12], bytemuck::cast_slice::<f32, u8>(&[0.5, 1.5]));
    {
        let log = raw.log();
        assert_eq!(log.map_calls, 1);
        assert_eq!(log.bindings[0], (handle.as_raw(), vulkan.memory().allocation().memory, 0));
    }

    drop(buffer);
    assert!(!raw.is_alive(handle));
    assert!(!raw.is_allocated(id));
    let log = raw.log();
    assert_eq!(log.unmap_calls, 1);
    Ok(())
}

#[test]
fn writes_leave_an_outstanding_mapping_alone() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let desc = BufferDescriptor {
        persistently_mapped: false,
        ..BufferDescriptor::upload("staging", 32, BufferUsage::COPY_SRC)
    };
    let buffer = device.create_buffer(&desc)?;
    assert!(!buffer.is_mapped());
    buffer.write_bytes(0, &[2; 8])?;
    assert!(!buffer.is_mapped());
    assert_eq!(raw.log().unmap_calls, 1);

    let held = buffer.map()?;
    buffer.write_bytes(8, &[3; 8])?;
    assert!(buffer.is_mapped());
    assert_eq!(buffer.map()?, held);
    let log = raw.log();
    assert_eq!(log.map_calls, 2);
    assert_eq!(log.unmap_calls, 1);
    Ok(())
}

#[test]
fn device_local_buffers_cannot_be_mapped() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let buffer = device.create_buffer(&BufferDescriptor::device_local("indices", 48, BufferUsage::INDEX))?;
    assert!(matches!(buffer.map(), Err(ResourceError::NotMappable)));
    assert_eq!(raw.log().map_calls, 0);
    Ok(())
}

#[test]
fn texture_views_are_cached_and_destroyed_first() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let desc = TextureDescriptor {
        label: "shadow".to_string(),
        format: ResourceFormat::Depth32Float,
        usage: TextureUsage::DEPTH_STENCIL_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
        width: 512,
        height: 512,
        ..Default::default()
    };
    let texture = device.create_texture(&desc)?;
    let whole = TextureViewDescriptor::whole(&desc);
    assert_eq!(texture.view_handle(&whole)?, texture.view_handle(&whole)?);
    assert_eq!(texture.cached_view_count(), 1);

    let image = texture
        .as_any()
        .downcast_ref::<TextureVulkan>()
        .expect("Vulkan texture")
        .raw();
    {
        let log = raw.log();
        assert_eq!(log.image_views[0].1.aspect_mask, vk::ImageAspectFlags::DEPTH);
        assert_eq!(log.images[0].1.format, vk::Format::D32_SFLOAT);
    }

    drop(texture);
    let log = raw.log();
    let view = log.image_views[0].0;
    let view_at = log
        .destroyed
        .iter()
        .position(|entry| *entry == (vk::ObjectType::IMAGE_VIEW, view.as_raw()))
        .expect("view destroyed");
    let image_at = log
        .destroyed
        .iter()
        .position(|entry| *entry == (vk::ObjectType::IMAGE, image.as_raw()))
        .expect("image destroyed");
    assert!(view_at < image_at);
    assert_eq!(log.freed.len(), 1);
    Ok(())
}

#[test]
fn depth_stencil_views_carry_the_requested_aspects() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let desc = TextureDescriptor {
        label: "gbuffer-depth".to_string(),
        format: ResourceFormat::Depth24UnormStencil8,
        usage: TextureUsage::DEPTH_STENCIL_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
        width: 256,
        height: 256,
        ..Default::default()
    };
    let texture = device.create_texture(&desc)?;
    assert_eq!(texture.aspect(), FormatAspects::DEPTH | FormatAspects::STENCIL);
    let attachment = TextureViewDescriptor::whole(&desc);
    let sampled = TextureViewDescriptor {
        aspects: FormatAspects::DEPTH,
        ..attachment
    };
    assert_ne!(texture.view_handle(&attachment)?, texture.view_handle(&sampled)?);

    let log = raw.log();
    assert_eq!(
        log.image_views[0].1.aspect_mask,
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    );
    assert_eq!(log.image_views[1].1.aspect_mask, vk::ImageAspectFlags::DEPTH);
    Ok(())
}

#[test]
fn views_outside_the_texture_are_rejected() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let desc = TextureDescriptor {
        label: "albedo".to_string(),
        width: 64,
        height: 64,
        ..Default::default()
    };
    let texture = device.create_texture(&desc)?;
    let stencil = TextureViewDescriptor {
        aspects: FormatAspects::STENCIL,
        ..TextureViewDescriptor::whole(&desc)
    };
    assert!(matches!(
        texture.view_handle(&stencil),
        Err(ResourceError::InvalidDescriptor(_))
    ));
    assert!(texture
        .view_handle(&TextureViewDescriptor::single(&desc, 1, 0))
        .is_err());
    assert_eq!(texture.cached_view_count(), 0);
    assert!(raw.log().image_views.is_empty());
    Ok(())
}

#[test]
fn adopted_images_are_not_destroyed() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let desc = TextureDescriptor {
        label: "swapchain".to_string(),
        format: ResourceFormat::Bgra8Unorm,
        usage: TextureUsage::RENDER_ATTACHMENT,
        width: 800,
        height: 600,
        ..Default::default()
    };
    let image = vk::Image::from_raw(0x5eed);
    let texture = device.adopt_texture(image, &desc);
    assert!(texture.is_external());
    texture.view_handle(&TextureViewDescriptor::whole(&desc))?;
    drop(texture);

    let log = raw.log();
    assert!(log.images.is_empty());
    assert!(log.allocations.is_empty());
    assert!(!log
        .destroyed
        .contains(&(vk::ObjectType::IMAGE, image.as_raw())));
    assert_eq!(log.destroyed.len(), 1);
    Ok(())
}

#[test]
fn names_carry_the_object_type() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let mut pipeline = device.create_render_pipeline(simple_pipeline(&device, PipelineLayout::default()))?;
    pipeline.set_target_formats(&[ResourceFormat::Rgba8Unorm], ResourceFormat::Undefined)?;
    device.create_buffer(&BufferDescriptor::device_local("", 16, BufferUsage::VERTEX))?;

    let log = raw.log();
    let named = |ty: vk::ObjectType| {
        log.names
            .iter()
            .filter(|(_, t, _)| *t == ty)
            .map(|(_, _, name)| name.as_str())
            .collect::<Vec<_>>()
    };
    assert_eq!(named(vk::ObjectType::SHADER_MODULE), vec!["vs", "ps"]);
    assert_eq!(named(vk::ObjectType::PIPELINE_LAYOUT), vec!["opaque"]);
    assert_eq!(named(vk::ObjectType::PIPELINE), vec!["opaque"]);
    assert!(named(vk::ObjectType::BUFFER).is_empty());
    Ok(())
}
