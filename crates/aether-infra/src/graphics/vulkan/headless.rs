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

//! A Vulkan raw device and allocator that need no GPU.
//!
//! [`HeadlessVulkanDevice`] records every create info it receives and answers with
//! fresh synthetic handles. Host-visible allocations get real host memory so mapping
//! and writes can be observed.

use super::raw::*;
use aether_core::renderer::api::resource::buffer::MemoryLocation;
use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use std::collections::HashMap;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

const ALIGNMENT: u64 = 256;

/// Everything a [`HeadlessVulkanDevice`] has been asked to do.
#[derive(Debug, Default)]
pub struct HeadlessVulkanLog {
    pub set_layouts: Vec<(vk::DescriptorSetLayout, Vec<SetLayoutBinding>)>,
    pub pipeline_layouts: Vec<(vk::PipelineLayout, PipelineLayoutInfo)>,
    pub shader_modules: Vec<(vk::ShaderModule, Vec<u32>)>,
    pub graphics_pipelines: Vec<(vk::Pipeline, GraphicsPipelineInfo)>,
    pub compute_pipelines: Vec<(vk::Pipeline, ComputePipelineInfo)>,
    pub samplers: Vec<(vk::Sampler, SamplerInfo)>,
    pub buffers: Vec<(vk::Buffer, BufferInfo)>,
    pub images: Vec<(vk::Image, ImageInfo)>,
    pub image_views: Vec<(vk::ImageView, ImageViewInfo)>,
    /// Memory bindings as `(resource, memory, offset)`.
    pub bindings: Vec<(u64, vk::DeviceMemory, u64)>,
    pub allocations: Vec<(Allocation, MemoryLocation)>,
    /// Ids of freed allocations, in free order.
    pub freed: Vec<u64>,
    /// Debug names, in the order they were set.
    pub names: Vec<(u64, vk::ObjectType, String)>,
    /// Destroyed objects, in destruction order.
    pub destroyed: Vec<(vk::ObjectType, u64)>,
    pub map_calls: usize,
    pub unmap_calls: usize,
}

/// A recording [`VulkanRawDevice`] that is also its own [`DeviceAllocator`].
#[derive(Debug, Default)]
pub struct HeadlessVulkanDevice {
    next_handle: AtomicU64,
    fail_pipeline_layouts: AtomicBool,
    fail_graphics_pipelines: AtomicBool,
    fail_allocations: AtomicBool,
    log: Mutex<HeadlessVulkanLog>,
    memory: Mutex<HashMap<u64, Box<[u8]>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn requirements(size: u64) -> vk::MemoryRequirements {
    vk::MemoryRequirements {
        size: size.max(1).div_ceil(ALIGNMENT) * ALIGNMENT,
        alignment: ALIGNMENT,
        memory_type_bits: u32::MAX,
    }
}

impl HeadlessVulkanDevice {
    /// Creates a device with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following pipeline layout creation fail.
    pub fn fail_pipeline_layouts(&self, fail: bool) {
        self.fail_pipeline_layouts.store(fail, Ordering::SeqCst);
    }

    /// Makes every following graphics pipeline creation fail.
    pub fn fail_graphics_pipelines(&self, fail: bool) {
        self.fail_graphics_pipelines.store(fail, Ordering::SeqCst);
    }

    /// Makes every following allocation fail with `ERROR_OUT_OF_DEVICE_MEMORY`.
    pub fn fail_allocations(&self, fail: bool) {
        self.fail_allocations.store(fail, Ordering::SeqCst);
    }

    /// Locks and returns the record of everything the device was asked to do.
    pub fn log(&self) -> MutexGuard<'_, HeadlessVulkanLog> {
        lock(&self.log)
    }

    /// A copy of the host memory behind a host-visible allocation.
    pub fn memory(&self, allocation_id: u64) -> Option<Vec<u8>> {
        lock(&self.memory)
            .get(&allocation_id)
            .map(|bytes| bytes.to_vec())
    }

    /// Returns `true` if `handle` was created and not yet destroyed.
    pub fn is_alive<H: Handle>(&self, handle: H) -> bool {
        let raw = handle.as_raw();
        let log = self.log();
        let created = log.set_layouts.iter().any(|(h, _)| h.as_raw() == raw)
            || log.pipeline_layouts.iter().any(|(h, _)| h.as_raw() == raw)
            || log.shader_modules.iter().any(|(h, _)| h.as_raw() == raw)
            || log.graphics_pipelines.iter().any(|(h, _)| h.as_raw() == raw)
            || log.compute_pipelines.iter().any(|(h, _)| h.as_raw() == raw)
            || log.samplers.iter().any(|(h, _)| h.as_raw() == raw)
            || log.buffers.iter().any(|(h, _)| h.as_raw() == raw)
            || log.images.iter().any(|(h, _)| h.as_raw() == raw)
            || log.image_views.iter().any(|(h, _)| h.as_raw() == raw);
        created && !log.destroyed.contains(&(H::TYPE, raw))
    }

    /// Returns `true` if the allocation was handed out and not yet freed.
    pub fn is_allocated(&self, allocation_id: u64) -> bool {
        let log = self.log();
        log.allocations.iter().any(|(a, _)| a.id == allocation_id)
            && !log.freed.contains(&allocation_id)
    }

    fn next<H: Handle>(&self) -> H {
        H::from_raw(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn destroy<H: Handle>(&self, handle: H) {
        self.log().destroyed.push((H::TYPE, handle.as_raw()));
    }
}

impl VulkanRawDevice for HeadlessVulkanDevice {
    fn create_descriptor_set_layout(
        &self,
        bindings: &[SetLayoutBinding],
    ) -> VkResult<vk::DescriptorSetLayout> {
        let handle = self.next();
        self.log().set_layouts.push((handle, bindings.to_vec()));
        Ok(handle)
    }

    fn create_pipeline_layout(&self, info: &PipelineLayoutInfo) -> VkResult<vk::PipelineLayout> {
        if self.fail_pipeline_layouts.load(Ordering::SeqCst) {
            return Err(vk::Result::ERROR_INITIALIZATION_FAILED);
        }
        let handle = self.next();
        self.log().pipeline_layouts.push((handle, info.clone()));
        Ok(handle)
    }

    fn create_shader_module(&self, code: &[u32]) -> VkResult<vk::ShaderModule> {
        let handle = self.next();
        self.log().shader_modules.push((handle, code.to_vec()));
        Ok(handle)
    }

    fn create_graphics_pipeline(&self, info: &GraphicsPipelineInfo) -> VkResult<vk::Pipeline> {
        if self.fail_graphics_pipelines.load(Ordering::SeqCst) {
            return Err(vk::Result::ERROR_UNKNOWN);
        }
        let handle = self.next();
        self.log().graphics_pipelines.push((handle, info.clone()));
        Ok(handle)
    }

    fn create_compute_pipeline(&self, info: &ComputePipelineInfo) -> VkResult<vk::Pipeline> {
        let handle = self.next();
        self.log().compute_pipelines.push((handle, info.clone()));
        Ok(handle)
    }

    fn create_sampler(&self, info: &SamplerInfo) -> VkResult<vk::Sampler> {
        let handle = self.next();
        self.log().samplers.push((handle, *info));
        Ok(handle)
    }

    fn create_buffer(&self, info: &BufferInfo) -> VkResult<vk::Buffer> {
        let handle = self.next();
        self.log().buffers.push((handle, *info));
        Ok(handle)
    }

    fn create_image(&self, info: &ImageInfo) -> VkResult<vk::Image> {
        let handle = self.next();
        self.log().images.push((handle, *info));
        Ok(handle)
    }

    fn create_image_view(&self, info: &ImageViewInfo) -> VkResult<vk::ImageView> {
        let handle = self.next();
        self.log().image_views.push((handle, *info));
        Ok(handle)
    }

    fn buffer_memory_requirements(&self, buffer: vk::Buffer) -> vk::MemoryRequirements {
        let size = self
            .log()
            .buffers
            .iter()
            .find(|(h, _)| *h == buffer)
            .map_or(0, |(_, info)| info.size);
        requirements(size)
    }

    fn image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements {
        // Four bytes per texel, no mip chain.
        let size = self
            .log()
            .images
            .iter()
            .find(|(h, _)| *h == image)
            .map_or(0, |(_, info)| {
                u64::from(info.width)
                    * u64::from(info.height)
                    * u64::from(info.depth)
                    * u64::from(info.array_layers)
                    * 4
            });
        requirements(size)
    }

    fn bind_buffer_memory(
        &self,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        offset: u64,
    ) -> VkResult<()> {
        self.log().bindings.push((buffer.as_raw(), memory, offset));
        Ok(())
    }

    fn bind_image_memory(
        &self,
        image: vk::Image,
        memory: vk::DeviceMemory,
        offset: u64,
    ) -> VkResult<()> {
        self.log().bindings.push((image.as_raw(), memory, offset));
        Ok(())
    }

    fn destroy_descriptor_set_layout(&self, layout: vk::DescriptorSetLayout) {
        self.destroy(layout);
    }

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        self.destroy(layout);
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        self.destroy(module);
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        self.destroy(pipeline);
    }

    fn destroy_sampler(&self, sampler: vk::Sampler) {
        self.destroy(sampler);
    }

    fn destroy_buffer(&self, buffer: vk::Buffer) {
        self.destroy(buffer);
    }

    fn destroy_image(&self, image: vk::Image) {
        self.destroy(image);
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        self.destroy(view);
    }

    fn set_object_name(&self, handle: u64, object_type: vk::ObjectType, name: &str) {
        self.log()
            .names
            .push((handle, object_type, name.to_string()));
    }
}

impl DeviceAllocator for HeadlessVulkanDevice {
    fn allocate(&self, request: &AllocationRequest<'_>) -> VkResult<Allocation> {
        if self.fail_allocations.load(Ordering::SeqCst) {
            return Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        }
        let memory: vk::DeviceMemory = self.next();
        let allocation = Allocation {
            memory,
            offset: 0,
            size: request.requirements.size,
            id: memory.as_raw(),
        };
        if request.location.is_host_visible() {
            let len = usize::try_from(allocation.size)
                .map_err(|_| vk::Result::ERROR_OUT_OF_HOST_MEMORY)?;
            lock(&self.memory).insert(allocation.id, vec![0; len].into_boxed_slice());
        }
        self.log().allocations.push((allocation, request.location));
        Ok(allocation)
    }

    fn free(&self, allocation: &Allocation) {
        lock(&self.memory).remove(&allocation.id);
        self.log().freed.push(allocation.id);
    }

    fn map(&self, allocation: &Allocation) -> VkResult<NonNull<u8>> {
        let mut memory = lock(&self.memory);
        let bytes = memory
            .get_mut(&allocation.id)
            .ok_or(vk::Result::ERROR_MEMORY_MAP_FAILED)?;
        // The boxed slice never moves while it stays in the map.
        let ptr = NonNull::new(bytes.as_mut_ptr()).ok_or(vk::Result::ERROR_MEMORY_MAP_FAILED)?;
        self.log().map_calls += 1;
        Ok(ptr)
    }

    fn unmap(&self, _allocation: &Allocation) {
        self.log().unmap_calls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(location: MemoryLocation, size: u64) -> AllocationRequest<'static> {
        AllocationRequest {
            label: "test",
            requirements: requirements(size),
            location,
            linear: true,
        }
    }

    #[test]
    fn destroyed_handles_are_no_longer_alive() {
        let device = HeadlessVulkanDevice::new();
        let buffer = device
            .create_buffer(&BufferInfo {
                size: 64,
                usage: vk::BufferUsageFlags::UNIFORM_BUFFER,
            })
            .unwrap();
        assert_ne!(buffer.as_raw(), 0);
        assert!(device.is_alive(buffer));
        assert_eq!(device.buffer_memory_requirements(buffer).size, ALIGNMENT);
        device.destroy_buffer(buffer);
        assert!(!device.is_alive(buffer));
    }

    #[test]
    fn only_host_visible_memory_maps() {
        let device = HeadlessVulkanDevice::new();
        let upload = device.allocate(&request(MemoryLocation::CpuToGpu, 10)).unwrap();
        let local = device.allocate(&request(MemoryLocation::GpuOnly, 10)).unwrap();
        assert_eq!(upload.size, ALIGNMENT);
        assert!(device.map(&upload).is_ok());
        assert_eq!(
            device.map(&local),
            Err(vk::Result::ERROR_MEMORY_MAP_FAILED)
        );
        device.free(&upload);
        assert!(!device.is_allocated(upload.id));
        assert!(device.is_allocated(local.id));
    }

    #[test]
    fn allocation_failure_injection() {
        let device = HeadlessVulkanDevice::new();
        device.fail_allocations(true);
        assert!(device.allocate(&request(MemoryLocation::GpuOnly, 4)).is_err());
        device.fail_allocations(false);
        assert!(device.allocate(&request(MemoryLocation::GpuOnly, 4)).is_ok());
        assert_eq!(device.log().allocations.len(), 1);
    }
}
