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

use super::native::RawHandle;
use super::pipeline::{ComputePipelineD3D12, RenderPipelineD3D12};
use super::raw::{D3D12RawDevice, OwnedDescriptor};
use super::resource::{BufferD3D12, TextureD3D12};
use super::sampler::{sampler_desc, SamplerD3D12};
use super::shader::ShaderModuleD3D12;
use aether_core::renderer::api::*;
use aether_core::renderer::error::{ResourceError, ShaderError};
use aether_core::renderer::logging::GraphicsLogger;
use aether_core::renderer::traits::{
    Buffer, ComputePipeline, GraphicsDevice, RenderPipeline, Sampler, ShaderModule, Texture,
};
use std::sync::Arc;

/// State shared by the device and every object it creates.
#[derive(Debug)]
pub(crate) struct D3D12Shared {
    pub(crate) raw: Arc<dyn D3D12RawDevice>,
    pub(crate) settings: RhiSettings,
    pub(crate) logger: GraphicsLogger,
}

impl D3D12Shared {
    /// Applies `label` as the debug name of `object` when debug names are enabled.
    pub(crate) fn name_object(&self, object: RawHandle, label: &str) {
        if self.settings.debug_names && !label.is_empty() {
            self.raw.set_name(object, label);
        }
    }
}

/// A [`GraphicsDevice`] on top of a native D3D12 device.
#[derive(Debug, Clone)]
pub struct D3D12Device {
    shared: Arc<D3D12Shared>,
}

impl D3D12Device {
    /// Wraps a native device. Fatal conditions are reported to `logger`.
    pub fn new(
        raw: Arc<dyn D3D12RawDevice>,
        settings: RhiSettings,
        logger: GraphicsLogger,
    ) -> Self {
        log::info!(
            "D3D12Device: Created (debug names: {}, logger: '{}')",
            settings.debug_names,
            logger.name()
        );
        Self {
            shared: Arc::new(D3D12Shared {
                raw,
                settings,
                logger,
            }),
        }
    }

    /// The native device.
    pub fn raw(&self) -> &Arc<dyn D3D12RawDevice> {
        &self.shared.raw
    }

    /// Wraps a resource this device does not own, such as a swapchain back buffer.
    pub fn adopt_texture(&self, raw: RawHandle, descriptor: &TextureDescriptor) -> Arc<dyn Texture> {
        log::debug!(
            "D3D12Device: Adopted external texture '{}' ({}x{})",
            descriptor.label,
            descriptor.width,
            descriptor.height
        );
        Arc::new(TextureD3D12::external(self.shared.clone(), raw, descriptor))
    }
}

impl GraphicsDevice for D3D12Device {
    fn backend_type(&self) -> GraphicsBackendType {
        GraphicsBackendType::Dx12
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
        if descriptor.bytecode.is_empty() {
            let err = ShaderError::CompilationError {
                label: descriptor.label.clone(),
                details: "empty bytecode".to_string(),
            };
            self.shared.logger.critical(err.to_string());
            return Err(err.into());
        }
        log::debug!(
            "D3D12Device: Shader module '{}' ({:?}, {} bytes)",
            descriptor.label,
            descriptor.stage,
            descriptor.bytecode.len()
        );
        Ok(Arc::new(ShaderModuleD3D12::new(
            descriptor.label.clone(),
            descriptor.stage,
            descriptor.entry_point.clone(),
            Arc::from(descriptor.bytecode.as_slice()),
        )))
    }

    fn create_sampler(
        &self,
        descriptor: &SamplerDescriptor,
    ) -> Result<Arc<dyn Sampler>, ResourceError> {
        let handle = self
            .shared
            .raw
            .create_sampler(&sampler_desc(descriptor))
            .map_err(|hr| {
                self.shared
                    .logger
                    .critical(format!("Failed to create sampler: {hr}"));
                ResourceError::BackendError(hr.to_string())
            })?;
        Ok(Arc::new(SamplerD3D12::new(
            *descriptor,
            OwnedDescriptor::new(self.shared.raw.clone(), handle),
        )))
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<Arc<dyn Buffer>, ResourceError> {
        let buffer = BufferD3D12::new(self.shared.clone(), descriptor)?;
        log::debug!(
            "D3D12Device: Buffer '{}' ({} bytes, {:?})",
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
        let texture = TextureD3D12::new(self.shared.clone(), descriptor)?;
        log::debug!(
            "D3D12Device: Texture '{}' ({}x{}x{}, {:?})",
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
        Ok(Box::new(RenderPipelineD3D12::new(
            self.shared.clone(),
            descriptor,
        )?))
    }

    fn create_compute_pipeline(
        &self,
        descriptor: ComputePipelineDescriptor,
    ) -> Result<Box<dyn ComputePipeline>, ResourceError> {
        Ok(Box::new(ComputePipelineD3D12::new(
            self.shared.clone(),
            descriptor,
        )?))
    }
}
