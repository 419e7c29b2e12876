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

use super::ash_device::{AshDevice, GpuAllocator};
use super::pipeline::{ComputePipelineVulkan, RenderPipelineVulkan};
use super::raw::{DeviceAllocator, Owned, VulkanRawDevice};
use super::resource::{BufferVulkan, TextureVulkan};
use super::sampler::{sampler_info, SamplerVulkan};
use super::shader::ShaderModuleVulkan;
use aether_core::renderer::api::*;
use aether_core::renderer::error::{RenderError, ResourceError, ShaderError};
use aether_core::renderer::logging::GraphicsLogger;
use aether_core::renderer::traits::{
    Buffer, ComputePipeline, GraphicsDevice, RenderPipeline, Sampler, ShaderModule, Texture,
};
use ash::vk;
use std::ffi::CString;
use std::io::Cursor;
use std::sync::Arc;

/// The first word of every SPIR-V module.
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// State shared by the device and every object it creates.
#[derive(Debug)]
pub(crate) struct VulkanShared {
    pub(crate) raw: Arc<dyn VulkanRawDevice>,
    pub(crate) allocator: Arc<dyn DeviceAllocator>,
    pub(crate) settings: RhiSettings,
    pub(crate) logger: GraphicsLogger,
}

impl VulkanShared {
    /// Applies `label` as the debug name of `handle` when debug names are enabled.
    pub(crate) fn name_object<H: vk::Handle>(&self, handle: H, label: &str) {
        if self.settings.debug_names && !label.is_empty() {
            self.raw.set_object_name(handle.as_raw(), H::TYPE, label);
        }
    }
}

/// Decodes SPIR-V bytes into words, accepting either byte order.
fn spirv_words(label: &str, bytecode: &[u8]) -> Result<Vec<u32>, ShaderError> {
    let invalid = |details: String| ShaderError::CompilationError {
        label: label.to_string(),
        details,
    };
    let words = ash::util::read_spv(&mut Cursor::new(bytecode))
        .map_err(|err| invalid(format!("invalid SPIR-V: {err}")))?;
    match words.first() {
        Some(&SPIRV_MAGIC) => Ok(words),
        Some(_) => Err(invalid("missing SPIR-V magic number".to_string())),
        None => Err(invalid("empty bytecode".to_string())),
    }
}

/// A [`GraphicsDevice`] on top of a native Vulkan device.
#[derive(Debug, Clone)]
pub struct VulkanDevice {
    shared: Arc<VulkanShared>,
}

impl VulkanDevice {
    /// Wraps a native device and the allocator resources draw their memory from.
    pub fn new(
        raw: Arc<dyn VulkanRawDevice>,
        allocator: Arc<dyn DeviceAllocator>,
        settings: RhiSettings,
        logger: GraphicsLogger,
    ) -> Self {
        log::info!(
            "VulkanDevice: Created (debug names: {}, logger: '{}')",
            settings.debug_names,
            logger.name()
        );
        Self {
            shared: Arc::new(VulkanShared {
                raw,
                allocator,
                settings,
                logger,
            }),
        }
    }

    /// Wraps an `ash` device created by the application.
    ///
    /// The device must have dynamic rendering enabled. `debug_utils` must only be set
    /// if `VK_EXT_debug_utils` is enabled on `instance`.
    /// ## Errors
    /// * `RenderError::InitializationFailed` - If the memory allocator cannot be created.
    pub fn from_ash(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        debug_utils: bool,
        settings: RhiSettings,
        logger: GraphicsLogger,
    ) -> Result<Self, RenderError> {
        let allocator = GpuAllocator::new(instance, physical_device, &device).map_err(|err| {
            let message = format!("Failed to create the GPU memory allocator: {err}");
            logger.critical(&message);
            RenderError::InitializationFailed(message)
        })?;
        let raw = AshDevice::new(instance, device, debug_utils);
        Ok(Self::new(Arc::new(raw), Arc::new(allocator), settings, logger))
    }

    /// The native device.
    pub fn raw(&self) -> &Arc<dyn VulkanRawDevice> {
        &self.shared.raw
    }

    /// Wraps an image this device does not own, such as a swapchain image.
    pub fn adopt_texture(&self, raw: vk::Image, descriptor: &TextureDescriptor) -> Arc<dyn Texture> {
        log::debug!(
            "VulkanDevice: Adopted external texture '{}' ({}x{})",
            descriptor.label,
            descriptor.width,
            descriptor.height
        );
        Arc::new(TextureVulkan::external(self.shared.clone(), raw, descriptor))
    }
}

impl GraphicsDevice for VulkanDevice {
    fn backend_type(&self) -> GraphicsBackendType {
        GraphicsBackendType::Vulkan
    }

    fn settings(&self) -> &RhiSettings {
        &self.shared.settings
    }

    fn logger(&self) -> &GraphicsLogger {
        &self.shared.logger
    }

    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<Arc<dyn ShaderModule>, ResourceError> {
        let checked = spirv_words(&descriptor.label, &descriptor.bytecode).and_then(|words| {
            CString::new(descriptor.entry_point.as_str())
                .map(|entry_point| (words, entry_point))
                .map_err(|_| ShaderError::InvalidEntryPoint {
                    label: descriptor.label.clone(),
                    entry_point: descriptor.entry_point.clone(),
                })
        });
        let (words, entry_point_c) = checked.map_err(|err| {
            self.shared.logger.critical(err.to_string());
            err
        })?;

        let raw = self.shared.raw.create_shader_module(&words).map_err(|err| {
            self.shared.logger.critical(format!(
                "Failed to create shader module '{}': {err}",
                descriptor.label
            ));
            ResourceError::BackendError(err.to_string())
        })?;
        let module = Owned::new(self.shared.raw.clone(), raw);
        self.shared.name_object(raw, &descriptor.label);
        log::debug!(
            "VulkanDevice: Shader module '{}' ({:?}, {} words)",
            descriptor.label,
            descriptor.stage,
            words.len()
        );
        Ok(Arc::new(ShaderModuleVulkan::new(
            descriptor.label.clone(),
            descriptor.stage,
            descriptor.entry_point.clone(),
            entry_point_c,
            descriptor.bytecode.clone(),
            module,
        )))
    }

    fn create_sampler(
        &self,
        descriptor: &SamplerDescriptor,
    ) -> Result<Arc<dyn Sampler>, ResourceError> {
        let raw = self
            .shared
            .raw
            .create_sampler(&sampler_info(descriptor))
            .map_err(|err| {
                self.shared
                    .logger
                    .critical(format!("Failed to create sampler: {err}"));
                ResourceError::BackendError(err.to_string())
            })?;
        Ok(Arc::new(SamplerVulkan::new(
            *descriptor,
            Owned::new(self.shared.raw.clone(), raw),
        )))
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<Arc<dyn Buffer>, ResourceError> {
        let buffer = BufferVulkan::new(&self.shared, descriptor)?;
        log::debug!(
            "VulkanDevice: Buffer '{}' ({} bytes, {:?})",
            descriptor.label,
            descriptor.size,
            descriptor.location
        );
        Ok(Arc::new(buffer))
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
    ) -> Result<Arc<dyn Texture>, ResourceError> {
        let texture = TextureVulkan::new(self.shared.clone(), descriptor)?;
        log::debug!(
            "VulkanDevice: Texture '{}' ({}x{}x{}, {:?})",
            descriptor.label,
            descriptor.width,
            descriptor.height,
            descriptor.depth_or_layers,
            descriptor.format
        );
        Ok(Arc::new(texture))
    }

    fn create_render_pipeline(
        &self,
        descriptor: RenderPipelineDescriptor,
    ) -> Result<Box<dyn RenderPipeline>, ResourceError> {
        Ok(Box::new(RenderPipelineVulkan::new(
            self.shared.clone(),
            descriptor,
        )?))
    }

    fn create_compute_pipeline(
        &self,
        descriptor: ComputePipelineDescriptor,
    ) -> Result<Box<dyn ComputePipeline>, ResourceError> {
        Ok(Box::new(ComputePipelineVulkan::new(
            self.shared.clone(),
            descriptor,
        )?))
    }
}
