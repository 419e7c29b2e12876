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
use aether_core::renderer::error::{PipelineError, ResourceError};
use aether_core::renderer::logging::{MemorySink, Severity};
use aether_core::renderer::traits::{Buffer, ComputePipeline, GraphicsDevice, RenderPipeline, Texture};
use aether_infra::graphics::d3d12::native::{
    DescriptorRangeType, DxgiFormat, PrimitiveTopology as D3D12Topology, RawHandle, RootParameter,
    RootSignatureFlags,
};
use aether_infra::graphics::d3d12::{
    BufferD3D12, D3D12Device, HeadlessD3D12Device, RenderPipelineD3D12, TextureD3D12,
};
use common::*;
use std::sync::Arc;

fn device() -> (Arc<HeadlessD3D12Device>, D3D12Device, Arc<MemorySink>) {
    init_logging();
    let raw = Arc::new(HeadlessD3D12Device::new());
    let (sink, logger) = recording_logger();
    let device = D3D12Device::new(raw.clone(), settings(GraphicsBackendType::Dx12), logger);
    (raw, device, sink)
}

#[test]
fn root_signature_from_mixed_layout() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let layout = mixed_layout(&device);
    let pipeline = device.create_render_pipeline(simple_pipeline(&device, layout))?;
    assert!(!pipeline.is_compiled());

    let log = raw.log();
    assert_eq!(log.root_signatures.len(), 1);
    let desc = &log.root_signatures[0].1;
    assert_eq!(desc.flags, RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT);
    // Two tables and the root constants.
    assert_eq!(desc.parameters.len(), 3);

    let RootParameter::DescriptorTable { ranges, .. } = &desc.parameters[0] else {
        panic!("set 0 should be a descriptor table");
    };
    // The reserved slot and the immutable samplers take no range.
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].range_type, DescriptorRangeType::Cbv);

    assert_eq!(desc.static_samplers.len(), 2);
    assert_eq!(desc.static_samplers[0].shader_register, 2);
    assert_eq!(desc.static_samplers[1].shader_register, 3);
    assert!(desc.static_samplers.iter().all(|s| s.register_space == 0));

    let RootParameter::DescriptorTable { ranges, .. } = &desc.parameters[1] else {
        panic!("set 1 should be a descriptor table");
    };
    assert_eq!(ranges[0].range_type, DescriptorRangeType::Srv);
    assert_eq!(ranges[0].num_descriptors, 4);
    assert_eq!(ranges[0].register_space, 1);

    let RootParameter::Constants {
        num_32bit_values, ..
    } = &desc.parameters[2]
    else {
        panic!("push constants should be root constants");
    };
    assert_eq!(*num_32bit_values, 5);
    assert!(log.graphics_pipelines.is_empty());
    Ok(())
}

#[test]
fn pipeline_builds_once_per_format_change() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let mut desc = simple_pipeline(&device, PipelineLayout::default());
    desc.vertex_input_buffers = vec![VertexInputBuffer {
        stride: 20,
        per_instance: false,
        attributes: vec![
            VertexAttribute {
                semantic: VertexSemantic::Position,
                format: ResourceFormat::Rgb32Float,
                offset: 0,
            },
            VertexAttribute {
                semantic: VertexSemantic::Texcoord3,
                format: ResourceFormat::Rg32Float,
                offset: 12,
            },
        ],
    }];
    let mut pipeline = device.create_render_pipeline(desc)?;
    assert!(!pipeline.is_compiled());

    assert!(pipeline.set_target_formats(&[ResourceFormat::Rgba8Unorm], ResourceFormat::Undefined)?);
    assert!(pipeline.is_compiled());
    assert_eq!(
        pipeline.descriptor().color_target_state.attachments[0].format,
        ResourceFormat::Rgba8Unorm
    );
    assert!(!pipeline.set_target_formats(&[ResourceFormat::Rgba8Unorm], ResourceFormat::Undefined)?);
    assert_eq!(raw.log().graphics_pipelines.len(), 1);

    {
        let log = raw.log();
        let state = &log.graphics_pipelines[0].1;
        assert_eq!(state.num_render_targets, 1);
        assert_eq!(state.rtv_formats[0], DxgiFormat::R8G8B8A8_UNORM);
        assert_eq!(state.dsv_format, DxgiFormat::UNKNOWN);
        assert!(!state.depth_stencil_state.depth_enable);
        assert_eq!(state.input_layout.len(), 2);
        assert_eq!(state.input_layout[1].semantic_name, "TEXCOORD");
        assert_eq!(state.input_layout[1].semantic_index, 3);
        assert_eq!(state.input_layout[0].semantic_name, "POSITION");
        assert_eq!(state.input_layout[0].semantic_index, 0);
    }

    let d3d12 = pipeline
        .as_any()
        .downcast_ref::<RenderPipelineD3D12>()
        .expect("D3D12 pipeline");
    assert_eq!(d3d12.primitive_topology(), D3D12Topology::TriangleList);
    let first = d3d12.raw_pipeline().expect("compiled");

    assert!(pipeline.set_target_formats(&[ResourceFormat::Rgba8Unorm], ResourceFormat::Depth32Float)?);
    let log = raw.log();
    assert_eq!(log.graphics_pipelines.len(), 2);
    assert_eq!(log.graphics_pipelines[1].1.dsv_format, DxgiFormat::D32_FLOAT);
    // The replaced state object is released.
    assert!(log.released.contains(&first));
    Ok(())
}

#[test]
fn failed_build_logs_once_and_stays_uncompiled() -> anyhow::Result<()> {
    let (raw, device, sink) = device();
    let mut pipeline = device.create_render_pipeline(simple_pipeline(&device, PipelineLayout::default()))?;
    raw.fail_graphics_pipelines(true);
    let err = pipeline
        .set_target_formats(&[ResourceFormat::Bgra8Unorm], ResourceFormat::Undefined)
        .unwrap_err();
    assert!(matches!(err, PipelineError::CompilationFailed { .. }));
    assert!(!pipeline.is_compiled());
    assert_eq!(sink.count(Severity::Critical), 1);

    // The formats were recorded, so an identical retry still builds.
    raw.fail_graphics_pipelines(false);
    assert!(pipeline.set_target_formats(&[ResourceFormat::Bgra8Unorm], ResourceFormat::Undefined)?);
    assert!(pipeline.is_compiled());
    Ok(())
}

#[test]
fn rejected_root_signature_logs_once() {
    let (raw, device, sink) = device();
    raw.fail_root_signatures(true);
    let err = device
        .create_render_pipeline(simple_pipeline(&device, PipelineLayout::default()))
        .unwrap_err();
    assert!(matches!(
        err,
        ResourceError::Pipeline(PipelineError::LayoutCreationFailed(_))
    ));
    assert_eq!(sink.count(Severity::Critical), 1);
}

#[test]
fn invalid_layout_logs_once() {
    let (raw, device, sink) = device();
    let layout = PipelineLayout {
        sets_layout: vec![DescriptorSetLayout::new(vec![DescriptorSetLayoutBinding::new(
            DescriptorType::StorageBuffer,
            0,
        )])],
        push_constants_size: 0,
    };
    let err = device
        .create_render_pipeline(simple_pipeline(&device, layout))
        .unwrap_err();
    assert!(matches!(
        err,
        ResourceError::Pipeline(PipelineError::InvalidLayout(_))
    ));
    assert_eq!(sink.count(Severity::Critical), 1);
    assert!(raw.log().root_signatures.is_empty());
}

#[test]
fn shader_in_the_wrong_stage_is_rejected() {
    let (_, device, sink) = device();
    let shaders = PipelineShaders::new(
        shader(&device, ShaderStage::Fragment, "ps"),
        shader(&device, ShaderStage::Fragment, "ps"),
    );
    let desc = RenderPipelineDescriptor::new("broken", shaders, PipelineLayout::default());
    let err = device.create_render_pipeline(desc).unwrap_err();
    assert!(matches!(
        err,
        ResourceError::Pipeline(PipelineError::InvalidShaderModuleForPipeline { .. })
    ));
    assert_eq!(sink.count(Severity::Critical), 1);
}

#[test]
fn compute_pipeline_is_built_immediately() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let desc = ComputePipelineDescriptor {
        label: "cull".to_string(),
        compute: shader(&device, ShaderStage::Compute, "cs"),
        layout: PipelineLayout {
            sets_layout: vec![DescriptorSetLayout::new(vec![DescriptorSetLayoutBinding::new(
                DescriptorType::RwStorageBuffer,
                1,
            )])],
            push_constants_size: 4,
        },
    };
    let pipeline = device.create_compute_pipeline(desc)?;
    assert_eq!(pipeline.descriptor().label, "cull");
    let log = raw.log();
    assert_eq!(log.compute_pipelines.len(), 1);
    assert_eq!(log.root_signatures[0].1.flags, RootSignatureFlags::empty());
    assert!(log.names.iter().any(|(_, name)| name == "cull"));
    Ok(())
}

#[test]
fn empty_bytecode_is_rejected() {
    let (_, device, sink) = device();
    let result = device.create_shader_module(&ShaderModuleDescriptor {
        label: "empty".to_string(),
        stage: ShaderStage::Vertex,
        entry_point: "main".to_string(),
        bytecode: Vec::new(),
    });
    assert!(result.is_err());
    assert_eq!(sink.count(Severity::Critical), 1);
}

#[test]
fn persistent_mapping_survives_unmap() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let buffer = device.create_buffer(&BufferDescriptor::upload("staging", 64, BufferUsage::COPY_SRC))?;
    let first = buffer.map()?;
    buffer.unmap();
    assert!(buffer.is_mapped());
    assert_eq!(buffer.map()?, first);
    assert_eq!(raw.log().map_calls, 1);
    assert_eq!(raw.log().unmap_calls, 0);

    buffer.write_pod(8, &[1u32, 2, 3])?;
    let handle = buffer
        .as_any()
        .downcast_ref::<BufferD3D12>()
        .expect("D3D12 buffer")
        .raw();
    let memory = raw.memory(handle).expect("upload memory");
    assert_eq!(&memory[8..20], bytemuck::cast_slice::<u32, u8>(&[1, 2, 3]));

    drop(buffer);
    assert_eq!(raw.log().unmap_calls, 1);
    assert!(!raw.is_alive(handle));
    Ok(())
}

#[test]
fn transient_mapping_is_released() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let desc = BufferDescriptor {
        persistently_mapped: false,
        ..BufferDescriptor::upload("readback", 16, BufferUsage::COPY_DST)
    };
    let buffer = device.create_buffer(&desc)?;
    assert!(!buffer.is_mapped());
    buffer.write_bytes(0, &[7; 16])?;
    assert!(!buffer.is_mapped());
    assert_eq!(raw.log().map_calls, 1);
    assert_eq!(raw.log().unmap_calls, 1);
    assert!(matches!(
        buffer.write_bytes(8, &[0; 9]),
        Err(ResourceError::OutOfBounds)
    ));
    Ok(())
}

#[test]
fn writes_keep_an_outstanding_mapping() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let desc = BufferDescriptor {
        persistently_mapped: false,
        ..BufferDescriptor::upload("staging", 16, BufferUsage::COPY_SRC)
    };
    let buffer = device.create_buffer(&desc)?;
    let held = buffer.map()?;
    buffer.write_bytes(0, &[1; 4])?;
    assert!(buffer.is_mapped());
    assert_eq!(buffer.map()?, held);
    assert_eq!(raw.log().map_calls, 1);
    assert_eq!(raw.log().unmap_calls, 0);

    buffer.unmap();
    assert!(!buffer.is_mapped());
    assert_eq!(raw.log().unmap_calls, 1);
    Ok(())
}

#[test]
fn device_local_buffers_cannot_be_mapped() -> anyhow::Result<()> {
    let (_, device, _) = device();
    let buffer = device.create_buffer(&BufferDescriptor::device_local("vertices", 256, BufferUsage::VERTEX))?;
    assert!(matches!(buffer.map(), Err(ResourceError::NotMappable)));
    assert!(matches!(
        buffer.write_bytes(0, &[0; 4]),
        Err(ResourceError::NotMappable)
    ));
    Ok(())
}

#[test]
fn views_are_cached_by_descriptor() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let desc = TextureDescriptor {
        label: "environment".to_string(),
        width: 128,
        height: 128,
        depth_or_layers: 6,
        ..Default::default()
    };
    let texture = device.create_texture(&desc)?;
    let whole = TextureViewDescriptor::whole(&desc);
    let a = texture.view_handle(&whole)?;
    let b = texture.view_handle(&whole)?;
    let face = texture.view_handle(&TextureViewDescriptor::single(&desc, 0, 3))?;
    assert_eq!(a, b);
    assert_ne!(a, face);
    assert_eq!(texture.cached_view_count(), 2);
    assert_eq!(raw.log().shader_resource_views.len(), 2);

    let resource = texture
        .as_any()
        .downcast_ref::<TextureD3D12>()
        .expect("D3D12 texture")
        .raw();
    drop(texture);
    let log = raw.log();
    assert_eq!(log.freed_descriptors.len(), 2);
    assert!(log.released.contains(&resource));
    Ok(())
}

#[test]
fn out_of_range_textures_and_views_are_rejected() -> anyhow::Result<()> {
    let (raw, device, sink) = device();
    let too_deep = TextureDescriptor {
        label: "atlas".to_string(),
        depth_or_layers: 70_000,
        ..Default::default()
    };
    assert!(matches!(
        device.create_texture(&too_deep),
        Err(ResourceError::InvalidDescriptor(_))
    ));
    let too_many_mips = TextureDescriptor {
        label: "tiny".to_string(),
        width: 4,
        height: 4,
        mip_levels: 4,
        ..Default::default()
    };
    assert!(device.create_texture(&too_many_mips).is_err());
    assert_eq!(sink.count(Severity::Critical), 2);
    assert!(raw.log().resources.is_empty());

    let desc = TextureDescriptor {
        label: "sky".to_string(),
        width: 32,
        height: 32,
        depth_or_layers: 12,
        ..Default::default()
    };
    let texture = device.create_texture(&desc)?;
    let ragged = TextureViewDescriptor {
        dimension: TextureViewDimension::CubeArray,
        array_layer_count: 8,
        ..TextureViewDescriptor::whole(&desc)
    };
    assert!(matches!(
        texture.view_handle(&ragged),
        Err(ResourceError::InvalidDescriptor(_))
    ));
    let cubes = TextureViewDescriptor {
        array_layer_count: 12,
        ..ragged
    };
    texture.view_handle(&cubes)?;
    assert_eq!(raw.log().shader_resource_views.len(), 1);
    assert_eq!(raw.log().shader_resource_views[0].2.array_size, 2);
    Ok(())
}

#[test]
fn adopted_textures_are_never_released() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    let desc = TextureDescriptor {
        label: "backbuffer".to_string(),
        format: ResourceFormat::Bgra8Unorm,
        usage: TextureUsage::RENDER_ATTACHMENT,
        width: 1280,
        height: 720,
        ..Default::default()
    };
    let texture = device.adopt_texture(RawHandle(0xbeef), &desc);
    assert!(texture.is_external());
    texture.view_handle(&TextureViewDescriptor::whole(&desc))?;
    drop(texture);
    let log = raw.log();
    assert!(log.resources.is_empty());
    assert!(!log.released.contains(&RawHandle(0xbeef)));
    assert_eq!(log.freed_descriptors.len(), 1);
    Ok(())
}

#[test]
fn debug_names_follow_settings_and_labels() -> anyhow::Result<()> {
    let (raw, device, _) = device();
    device.create_buffer(&BufferDescriptor::device_local("indices", 64, BufferUsage::INDEX))?;
    device.create_buffer(&BufferDescriptor::device_local("", 64, BufferUsage::INDEX))?;
    assert_eq!(raw.log().names.len(), 1);
    assert_eq!(raw.log().names[0].1, "indices");

    let quiet_raw = Arc::new(HeadlessD3D12Device::new());
    let settings = RhiSettings {
        debug_names: false,
        ..settings(GraphicsBackendType::Dx12)
    };
    let quiet = D3D12Device::new(quiet_raw.clone(), settings, Default::default());
    quiet.create_buffer(&BufferDescriptor::device_local("indices", 64, BufferUsage::INDEX))?;
    assert!(quiet_raw.log().names.is_empty());
    Ok(())
}
