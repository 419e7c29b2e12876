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

//! Graphics backends and the device factory.

pub mod d3d12;
pub mod shader_compiler;
pub mod vulkan;

use self::d3d12::{D3D12Device, D3D12RawDevice, HeadlessD3D12Device};
use self::vulkan::{DeviceAllocator, HeadlessVulkanDevice, VulkanDevice, VulkanRawDevice};
use aether_core::renderer::api::*;
use aether_core::renderer::error::RenderError;
use aether_core::renderer::logging::{GraphicsLogger, LogSink};
use aether_core::renderer::traits::GraphicsDevice;
use std::sync::Arc;

/// A native device handed to [`create_device`].
#[derive(Debug, Clone)]
pub enum NativeDevice {
    /// A D3D12 device.
    D3D12(Arc<dyn D3D12RawDevice>),
    /// A Vulkan device and the allocator its resources draw memory from.
    Vulkan {
        /// The device.
        device: Arc<dyn VulkanRawDevice>,
        /// The memory allocator.
        allocator: Arc<dyn DeviceAllocator>,
    },
}

impl NativeDevice {
    /// The backend this device belongs to.
    pub fn backend_type(&self) -> GraphicsBackendType {
        match self {
            NativeDevice::D3D12(_) => GraphicsBackendType::Dx12,
            NativeDevice::Vulkan { .. } => GraphicsBackendType::Vulkan,
        }
    }
}

/// Creates the [`GraphicsDevice`] selected by `settings.backend` on top of `native`.
///
/// Fatal messages go to `sink` under `settings.logger_name`.
/// ## Errors
/// * `RenderError::InitializationFailed` - If `native` belongs to another backend.
pub fn create_device(
    settings: RhiSettings,
    native: NativeDevice,
    sink: Arc<dyn LogSink>,
) -> Result<Arc<dyn GraphicsDevice>, RenderError> {
    let logger = GraphicsLogger::new(settings.logger_name.clone(), sink);
    if native.backend_type() != settings.backend {
        let message = format!(
            "{:?} was requested but a {:?} device was provided",
            settings.backend,
            native.backend_type()
        );
        logger.critical(&message);
        return Err(RenderError::InitializationFailed(message));
    }
    Ok(open(native, settings, logger))
}

fn open(native: NativeDevice, settings: RhiSettings, logger: GraphicsLogger) -> Arc<dyn GraphicsDevice> {
    match native {
        NativeDevice::D3D12(raw) => Arc::new(D3D12Device::new(raw, settings, logger)),
        NativeDevice::Vulkan { device, allocator } => {
            Arc::new(VulkanDevice::new(device, allocator, settings, logger))
        }
    }
}

/// Creates a device of `settings.backend` on a headless raw device.
///
/// Nothing reaches a GPU: native descriptions are recorded and answered with
/// synthetic handles.
pub fn create_headless_device(
    settings: RhiSettings,
    sink: Arc<dyn LogSink>,
) -> Arc<dyn GraphicsDevice> {
    let native = match settings.backend {
        GraphicsBackendType::Dx12 => NativeDevice::D3D12(Arc::new(HeadlessD3D12Device::new())),
        GraphicsBackendType::Vulkan => {
            let headless = Arc::new(HeadlessVulkanDevice::new());
            NativeDevice::Vulkan {
                device: headless.clone(),
                allocator: headless,
            }
        }
    };
    let logger = GraphicsLogger::new(settings.logger_name.clone(), sink);
    open(native, settings, logger)
}
