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

//! [`VulkanRawDevice`] and [`DeviceAllocator`] for a real `ash::Device`.

use super::raw::*;
use aether_core::renderer::api::resource::buffer::MemoryLocation;
use ash::prelude::VkResult;
use ash::vk;
use gpu_allocator::vulkan::{
    AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc,
};
use gpu_allocator::AllocationError;
use std::collections::HashMap;
use std::ffi::CString;
use std::fmt;
use std::ptr::NonNull;
use std::sync::{Mutex, MutexGuard};

/// A Vulkan 1.3 device with dynamic rendering enabled.
#[derive(Clone)]
pub struct AshDevice {
    device: ash::Device,
    debug_utils: Option<ash::ext::debug_utils::Device>,
}

impl AshDevice {
    /// Wraps `device`. Pass `debug_utils = true` only if `VK_EXT_debug_utils` was
    /// enabled on `instance`.
    pub fn new(instance: &ash::Instance, device: ash::Device, debug_utils: bool) -> Self {
        let debug_utils =
            debug_utils.then(|| ash::ext::debug_utils::Device::new(instance, &device));
        Self {
            device,
            debug_utils,
        }
    }

    /// The wrapped device.
    pub fn device(&self) -> &ash::Device {
        &self.device
    }
}

impl fmt::Debug for AshDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AshDevice")
            .field("handle", &self.device.handle())
            .field("debug_utils", &self.debug_utils.is_some())
            .finish()
    }
}

fn first_pipeline(
    result: Result<Vec<vk::Pipeline>, (Vec<vk::Pipeline>, vk::Result)>,
) -> VkResult<vk::Pipeline> {
    result
        .map_err(|(_, err)| err)?
        .into_iter()
        .next()
        .ok_or(vk::Result::ERROR_UNKNOWN)
}

impl VulkanRawDevice for AshDevice {
    fn create_descriptor_set_layout(
        &self,
        bindings: &[SetLayoutBinding],
    ) -> VkResult<vk::DescriptorSetLayout> {
        let native: Vec<_> = bindings
            .iter()
            .map(|binding| {
                let native = vk::DescriptorSetLayoutBinding::default()
                    .binding(binding.binding)
                    .descriptor_type(binding.descriptor_type)
                    .descriptor_count(binding.descriptor_count)
                    .stage_flags(binding.stage_flags);
                if binding.immutable_samplers.is_empty() {
                    native
                } else {
                    native.immutable_samplers(&binding.immutable_samplers)
                }
            })
            .collect();
        let info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&native);
        unsafe { self.device.create_descriptor_set_layout(&info, None) }
    }

    fn create_pipeline_layout(&self, info: &PipelineLayoutInfo) -> VkResult<vk::PipelineLayout> {
        let native = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(&info.set_layouts)
            .push_constant_ranges(&info.push_constant_ranges);
        unsafe { self.device.create_pipeline_layout(&native, None) }
    }

    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule> {
        let info = vk::ShaderModuleCreateInfo::default().code(code);
        unsafe { self.device.create_shader_module(&info, None) }
    }

    fn create_graphics_pipeline(&self, info: &GraphicsPipelineInfo) -> VkResult<vk::Pipeline> {
        let stages: Vec<_> = info
            .stages
            .iter()
            .map(|stage| {
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(stage.stage)
                    .module(stage.module)
                    .name(&stage.entry_point)
            })
            .collect();
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&info.vertex_bindings)
            .vertex_attribute_descriptions(&info.vertex_attributes);
        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(info.topology)
            .primitive_restart_enable(false);
        let tessellation = vk::PipelineTessellationStateCreateInfo::default()
            .patch_control_points(info.patch_control_points);
        let viewport = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);
        let mut conservative = vk::PipelineRasterizationConservativeStateCreateInfoEXT::default()
            .conservative_rasterization_mode(vk::ConservativeRasterizationModeEXT::OVERESTIMATE);
        let mut rasterization = vk::PipelineRasterizationStateCreateInfo::default()
            .polygon_mode(info.rasterization.polygon_mode)
            .cull_mode(info.rasterization.cull_mode)
            .front_face(info.rasterization.front_face)
            .depth_clamp_enable(false)
            .depth_bias_enable(false)
            .line_width(1.0);
        if info.rasterization.conservative {
            rasterization = rasterization.push_next(&mut conservative);
        }
        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);
        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(info.depth_stencil.depth_test_enable)
            .depth_write_enable(info.depth_stencil.depth_write_enable)
            .depth_compare_op(info.depth_stencil.depth_compare_op)
            .stencil_test_enable(info.depth_stencil.stencil_test_enable)
            .front(info.depth_stencil.front)
            .back(info.depth_stencil.back);
        let color_blend = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&info.color_blend_attachments);
        let dynamic = vk::PipelineDynamicStateCreateInfo::default()
            .dynamic_states(&info.dynamic_states);
        let mut rendering = vk::PipelineRenderingCreateInfo::default()
            .color_attachment_formats(&info.color_formats)
            .depth_attachment_format(info.depth_format)
            .stencil_attachment_format(info.stencil_format);

        let mut create_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blend)
            .dynamic_state(&dynamic)
            .layout(info.layout)
            .push_next(&mut rendering);
        if info.topology == vk::PrimitiveTopology::PATCH_LIST {
            create_info = create_info.tessellation_state(&tessellation);
        }

        first_pipeline(unsafe {
            self.device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[create_info], None)
        })
    }

    fn create_compute_pipeline(&self, info: &ComputePipelineInfo) -> VkResult<vk::Pipeline> {
        let stage = vk::PipelineShaderStageCreateInfo::default()
            .stage(info.stage.stage)
            .module(info.stage.module)
            .name(&info.stage.entry_point);
        let create_info = vk::ComputePipelineCreateInfo::default()
            .stage(stage)
            .layout(info.layout);
        first_pipeline(unsafe {
            self.device
                .create_compute_pipelines(vk::PipelineCache::null(), &[create_info], None)
        })
    }

    fn create_sampler(&self, info: &SamplerInfo) -> VkResult<vk::Sampler> {
        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(info.mag_filter)
            .min_filter(info.min_filter)
            .mipmap_mode(info.mipmap_mode)
            .address_mode_u(info.address_mode_u)
            .address_mode_v(info.address_mode_v)
            .address_mode_w(info.address_mode_w)
            .mip_lod_bias(info.mip_lod_bias)
            .anisotropy_enable(info.max_anisotropy.is_some())
            .max_anisotropy(info.max_anisotropy.unwrap_or(1.0))
            .compare_enable(info.compare_op.is_some())
            .compare_op(info.compare_op.unwrap_or(vk::CompareOp::NEVER))
            .min_lod(info.min_lod)
            .max_lod(info.max_lod)
            .border_color(info.border_color);
        unsafe { self.device.create_sampler(&create_info, None) }
    }

    fn create_buffer(&self, info: &BufferInfo) -> VkResult<vk::Buffer> {
        let create_info = vk::BufferCreateInfo::default()
            .size(info.size)
            .usage(info.usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);
        unsafe { self.device.create_buffer(&create_info, None) }
    }

    fn create_image(&self, info: &ImageInfo) -> VkResult<vk::Image> {
        let create_info = vk::ImageCreateInfo::default()
            .flags(info.flags)
            .image_type(info.image_type)
            .format(info.format)
            .extent(vk::Extent3D {
                width: info.width,
                height: info.height,
                depth: info.depth,
            })
            .mip_levels(info.mip_levels)
            .array_layers(info.array_layers)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(info.usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);
        unsafe { self.device.create_image(&create_info, None) }
    }

    fn create_image_view(&self, info: &ImageViewInfo) -> VkResult<vk::ImageView> {
        let create_info = vk::ImageViewCreateInfo::default()
            .image(info.image)
            .view_type(info.view_type)
            .format(info.format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: info.aspect_mask,
                base_mip_level: info.base_mip_level,
                level_count: info.level_count,
                base_array_layer: info.base_array_layer,
                layer_count: info.layer_count,
            });
        unsafe { self.device.create_image_view(&create_info, None) }
    }

    fn buffer_memory_requirements(&self, buffer: vk::Buffer) -> vk::MemoryRequirements {
        unsafe { self.device.get_buffer_memory_requirements(buffer) }
    }

    fn image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements {
        unsafe { self.device.get_image_memory_requirements(image) }
    }

    fn bind_buffer_memory(
        &self,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        offset: u64,
    ) -> VkResult<()> {
        unsafe { self.device.bind_buffer_memory(buffer, memory, offset) }
    }

    fn bind_image_memory(
        &self,
        image: vk::Image,
        memory: vk::DeviceMemory,
        offset: u64,
    ) -> VkResult<()> {
        unsafe { self.device.bind_image_memory(image, memory, offset) }
    }

    fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout) {
        unsafe { self.device.destroy_descriptor_set_layout(layout, None) }
    }

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        unsafe { self.device.destroy_pipeline_layout(layout, None) }
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        unsafe { self.device.destroy_shader_module(module, None) }
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        unsafe { self.device.destroy_pipeline(pipeline, None) }
    }

    fn destroy_sampler(&self, sampler: vk::Sampler) {
        unsafe { self.device.destroy_sampler(sampler, None) }
    }

    fn destroy_buffer(&self, buffer: vk::Buffer) {
        unsafe { self.device.destroy_buffer(buffer, None) }
    }

    fn destroy_image(&self, image: vk::Image) {
        unsafe { self.device.destroy_image(image, None) }
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        unsafe { self.device.destroy_image_view(view, None) }
    }

    fn set_object_name(&self, handle: u64, object_type: vk::ObjectType, name: &str) {
        let Some(debug_utils) = &self.debug_utils else {
            return;
        };
        let Ok(name) = CString::new(name) else {
            log::warn!("AshDevice: Debug name {name:?} contains a NUL byte, skipped.");
            return;
        };
        let mut info = vk::DebugUtilsObjectNameInfoEXT::default().object_name(&name);
        info.object_type = object_type;
        info.object_handle = handle;
        if let Err(err) = unsafe { debug_utils.set_debug_utils_object_name(&info) } {
            log::warn!("AshDevice: Failed to set debug name: {err}");
        }
    }
}

/// The `gpu_allocator` location backing a [`MemoryLocation`].
pub fn gpu_location(location: MemoryLocation) -> gpu_allocator::MemoryLocation {
    match location {
        MemoryLocation::GpuOnly => gpu_allocator::MemoryLocation::GpuOnly,
        MemoryLocation::CpuToGpu => gpu_allocator::MemoryLocation::CpuToGpu,
        MemoryLocation::GpuToCpu => gpu_allocator::MemoryLocation::GpuToCpu,
    }
}

fn vk_result(err: &AllocationError) -> vk::Result {
    match err {
        AllocationError::OutOfMemory | AllocationError::NoCompatibleMemoryTypeFound => {
            vk::Result::ERROR_OUT_OF_DEVICE_MEMORY
        }
        AllocationError::FailedToMap(_) => vk::Result::ERROR_MEMORY_MAP_FAILED,
        _ => vk::Result::ERROR_INITIALIZATION_FAILED,
    }
}

#[derive(Default)]
struct Blocks {
    live: HashMap<u64, gpu_allocator::vulkan::Allocation>,
    next_id: u64,
}

/// A [`DeviceAllocator`] sub-allocating resources from `gpu_allocator` blocks.
///
/// Host-visible allocations stay mapped for their whole lifetime, so `map`
/// hands out the persistent pointer and `unmap` has nothing to release.
/// The allocator must be dropped before the device it was created on.
pub struct GpuAllocator {
    allocator: Mutex<Allocator>,
    blocks: Mutex<Blocks>,
}

impl GpuAllocator {
    pub fn new(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: &ash::Device,
    ) -> Result<Self, AllocationError> {
        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.clone(),
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })?;
        Ok(Self {
            allocator: Mutex::new(allocator),
            blocks: Mutex::new(Blocks::default()),
        })
    }

    fn allocator(&self) -> MutexGuard<'_, Allocator> {
        self.allocator.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn blocks(&self) -> MutexGuard<'_, Blocks> {
        self.blocks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for GpuAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuAllocator")
            .field("live", &self.blocks().live.len())
            .finish_non_exhaustive()
    }
}

impl DeviceAllocator for GpuAllocator {
    fn allocate(&self, request: &AllocationRequest<'_>) -> VkResult<Allocation> {
        let allocation = self
            .allocator()
            .allocate(&AllocationCreateDesc {
                name: request.label,
                requirements: request.requirements,
                location: gpu_location(request.location),
                linear: request.linear,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .map_err(|err| {
                log::error!("GpuAllocator: Allocation for '{}' failed: {err}", request.label);
                vk_result(&err)
            })?;
        let handed_out = Allocation {
            memory: unsafe { allocation.memory() },
            offset: allocation.offset(),
            size: allocation.size(),
            id: 0,
        };
        let mut blocks = self.blocks();
        blocks.next_id += 1;
        let id = blocks.next_id;
        blocks.live.insert(id, allocation);
        log::debug!(
            "GpuAllocator: {} bytes at offset {} for '{}'",
            handed_out.size,
            handed_out.offset,
            request.label
        );
        Ok(Allocation { id, ..handed_out })
    }

    fn free(&self, allocation: &Allocation) {
        let Some(block) = self.blocks().live.remove(&allocation.id) else {
            log::warn!("GpuAllocator: Allocation {} freed twice.", allocation.id);
            return;
        };
        if let Err(err) = self.allocator().free(block) {
            log::error!("GpuAllocator: Failed to free allocation {}: {err}", allocation.id);
        }
    }

    fn map(&self, allocation: &Allocation) -> VkResult<NonNull<u8>> {
        self.blocks()
            .live
            .get(&allocation.id)
            .and_then(|block| block.mapped_ptr())
            .map(|ptr| ptr.cast::<u8>())
            .ok_or(vk::Result::ERROR_MEMORY_MAP_FAILED)
    }

    fn unmap(&self, _allocation: &Allocation) {}
}
