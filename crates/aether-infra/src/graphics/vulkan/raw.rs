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

//! The boundary between the backend and a native Vulkan device.
//!
//! Create infos cross the boundary as owned values instead of `vk::*CreateInfo`
//! chains, so an implementation can record them and the backend never builds
//! pointer chains outside [`super::ash_device`].

use aether_core::renderer::api::resource::buffer::MemoryLocation;
use ash::prelude::VkResult;
use ash::vk;
use std::ffi::CString;
use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

/// One binding of a descriptor set layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SetLayoutBinding {
    pub binding: u32,
    pub descriptor_type: vk::DescriptorType,
    pub descriptor_count: u32,
    pub stage_flags: vk::ShaderStageFlags,
    /// When non-empty, `descriptor_count` equals its length.
    pub immutable_samplers: Vec<vk::Sampler>,
}

/// The input of `vkCreatePipelineLayout`.
#[derive(Debug, Clone, Default)]
pub struct PipelineLayoutInfo {
    pub set_layouts: Vec<vk::DescriptorSetLayout>,
    pub push_constant_ranges: Vec<vk::PushConstantRange>,
}

/// One programmable stage of a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderStageInfo {
    pub stage: vk::ShaderStageFlags,
    pub module: vk::ShaderModule,
    pub entry_point: CString,
}

/// Rasterization state of a graphics pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizationInfo {
    pub polygon_mode: vk::PolygonMode,
    pub cull_mode: vk::CullModeFlags,
    pub front_face: vk::FrontFace,
    /// Requires `VK_EXT_conservative_rasterization`.
    pub conservative: bool,
}

/// Depth and stencil state of a graphics pipeline.
#[derive(Debug, Clone, Copy)]
pub struct DepthStencilInfo {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_op: vk::CompareOp,
    pub stencil_test_enable: bool,
    pub front: vk::StencilOpState,
    pub back: vk::StencilOpState,
}

/// Everything `vkCreateGraphicsPipelines` needs for a dynamic rendering pipeline.
#[derive(Debug, Clone)]
pub struct GraphicsPipelineInfo {
    pub stages: Vec<ShaderStageInfo>,
    pub vertex_bindings: Vec<vk::VertexInputBindingDescription>,
    pub vertex_attributes: Vec<vk::VertexInputAttributeDescription>,
    pub topology: vk::PrimitiveTopology,
    /// Only used when `topology` is `PATCH_LIST`.
    pub patch_control_points: u32,
    pub rasterization: RasterizationInfo,
    pub depth_stencil: DepthStencilInfo,
    pub color_blend_attachments: Vec<vk::PipelineColorBlendAttachmentState>,
    pub color_formats: Vec<vk::Format>,
    pub depth_format: vk::Format,
    pub stencil_format: vk::Format,
    pub dynamic_states: Vec<vk::DynamicState>,
    pub layout: vk::PipelineLayout,
}

/// Everything `vkCreateComputePipelines` needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputePipelineInfo {
    pub stage: ShaderStageInfo,
    pub layout: vk::PipelineLayout,
}

/// The input of `vkCreateSampler`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerInfo {
    pub mag_filter: vk::Filter,
    pub min_filter: vk::Filter,
    pub mipmap_mode: vk::SamplerMipmapMode,
    pub address_mode_u: vk::SamplerAddressMode,
    pub address_mode_v: vk::SamplerAddressMode,
    pub address_mode_w: vk::SamplerAddressMode,
    pub mip_lod_bias: f32,
    /// `None` disables anisotropic filtering.
    pub max_anisotropy: Option<f32>,
    /// `None` disables depth comparison.
    pub compare_op: Option<vk::CompareOp>,
    pub min_lod: f32,
    pub max_lod: f32,
    pub border_color: vk::BorderColor,
}

/// The input of `vkCreateBuffer`. Sharing mode is always exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferInfo {
    pub size: u64,
    pub usage: vk::BufferUsageFlags,
}

/// The input of `vkCreateImage`. Tiling is optimal and the initial layout undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub flags: vk::ImageCreateFlags,
    pub image_type: vk::ImageType,
    pub format: vk::Format,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_levels: u32,
    pub array_layers: u32,
    pub usage: vk::ImageUsageFlags,
}

/// The input of `vkCreateImageView`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageViewInfo {
    pub image: vk::Image,
    pub view_type: vk::ImageViewType,
    pub format: vk::Format,
    pub aspect_mask: vk::ImageAspectFlags,
    pub base_mip_level: u32,
    pub level_count: u32,
    pub base_array_layer: u32,
    pub layer_count: u32,
}

/// The subset of a `VkDevice` the backend drives.
pub trait VulkanRawDevice: Send + Sync + fmt::Debug {
    fn create_descriptor_set_layout(
        &self,
        bindings: &[SetLayoutBinding],
    ) -> VkResult<vk::DescriptorSetLayout>;
    fn create_pipeline_layout(&self, info: &PipelineLayoutInfo) -> VkResult<vk::PipelineLayout>;
    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule>;
    fn create_graphics_pipeline(&self, info: &GraphicsPipelineInfo) -> VkResult<vk::Pipeline>;
    fn create_compute_pipeline(&self, info: &ComputePipelineInfo) -> VkResult<vk::Pipeline>;
    fn create_sampler(&self, info: &SamplerInfo) -> VkResult<vk::Sampler>;
    fn create_buffer(&self, info: &BufferInfo) -> VkResult<vk::Buffer>;
    fn create_image(&self, info: &ImageInfo) -> VkResult<vk::Image>;
    fn create_image_view(&self, info: &ImageViewInfo) -> VkResult<vk::ImageView>;

    fn buffer_memory_requirements(&self, buffer: vk::Buffer) -> vk::MemoryRequirements;
    fn image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements;
    fn bind_buffer_memory(
        &self,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        offset: u64,
    ) -> VkResult<()>;
    fn bind_image_memory(
        &self,
        image: vk::Image,
        memory: vk::DeviceMemory,
        offset: u64,
    ) -> VkResult<()>;

    fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout);
    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout);
    fn destroy_shader_module(&self, module: vk::ShaderModule);
    fn destroy_pipeline(&self, pipeline: vk::Pipeline);
    fn destroy_sampler(&self, sampler: vk::Sampler);
    fn destroy_buffer(&self, buffer: vk::Buffer);
    fn destroy_image(&self, image: vk::Image);
    fn destroy_image_view(&self, view: vk::ImageView);

    /// `vkSetDebugUtilsObjectNameEXT`. Does nothing when debug utils are unavailable.
    fn set_object_name(&self, handle: u64, object_type: vk::ObjectType, name: &str);
}

/// A handle type that knows how to give itself back to the device.
pub trait Destroy: vk::Handle + Copy + fmt::Debug {
    fn destroy(self, device: &dyn VulkanRawDevice);
}

macro_rules! impl_destroy {
    ($($handle:ty => $method:ident),* $(,)?) => {
        $(impl Destroy for $handle {
            fn destroy(self, device: &dyn VulkanRawDevice) {
                device.$method(self);
            }
        })*
    };
}

impl_destroy! {
    vk::DescriptorSetLayout => destroy_descriptor_set_layout,
    vk::PipelineLayout => destroy_pipeline_layout,
    vk::ShaderModule => destroy_shader_module,
    vk::Pipeline => destroy_pipeline,
    vk::Sampler => destroy_sampler,
    vk::Buffer => destroy_buffer,
    vk::Image => destroy_image,
    vk::ImageView => destroy_image_view,
}

/// An exclusively owned handle, destroyed on drop.
pub struct Owned<H: Destroy> {
    device: Arc<dyn VulkanRawDevice>,
    handle: H,
}

impl<H: Destroy> Owned<H> {
    /// Takes ownership of `handle`.
    pub fn new(device: Arc<dyn VulkanRawDevice>, handle: H) -> Self {
        Self { device, handle }
    }

    /// The native handle. Valid as long as `self` is alive.
    pub fn raw(&self) -> H {
        self.handle
    }
}

impl<H: Destroy> fmt::Debug for Owned<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Owned").field(&self.handle).finish()
    }
}

impl<H: Destroy> Drop for Owned<H> {
    fn drop(&mut self) {
        self.handle.destroy(self.device.as_ref());
    }
}

/// What a resource needs from the memory allocator.
#[derive(Debug, Clone)]
pub struct AllocationRequest<'a> {
    pub label: &'a str,
    pub requirements: vk::MemoryRequirements,
    pub location: MemoryLocation,
    /// `true` for buffers and linear images.
    pub linear: bool,
}

/// A block of device memory handed out by a [`DeviceAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub memory: vk::DeviceMemory,
    pub offset: u64,
    pub size: u64,
    /// Unique per allocator, used to match frees with allocations.
    pub id: u64,
}

/// The device memory allocator the backend sub-allocates resources from.
pub trait DeviceAllocator: Send + Sync + fmt::Debug {
    fn allocate(&self, request: &AllocationRequest<'_>) -> VkResult<Allocation>;
    fn free(&self, allocation: &Allocation);
    /// Maps the allocation and returns a pointer to its first byte.
    fn map(&self, allocation: &Allocation) -> VkResult<NonNull<u8>>;
    fn unmap(&self, allocation: &Allocation);
}

/// An allocation freed exactly once on drop.
pub struct OwnedAllocation {
    allocator: Arc<dyn DeviceAllocator>,
    allocation: Allocation,
}

impl OwnedAllocation {
    pub fn new(allocator: Arc<dyn DeviceAllocator>, allocation: Allocation) -> Self {
        Self {
            allocator,
            allocation,
        }
    }

    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    pub fn allocator(&self) -> &Arc<dyn DeviceAllocator> {
        &self.allocator
    }
}

impl fmt::Debug for OwnedAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedAllocation")
            .field(&self.allocation)
            .finish()
    }
}

impl Drop for OwnedAllocation {
    fn drop(&mut self) {
        self.allocator.free(&self.allocation);
    }
}
