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
use aether_core::renderer::error::{PipelineError, RenderError, ResourceError};
use aether_core::renderer::logging::{LogSink, MemorySink, Severity};
use aether_core::renderer::traits::GraphicsDevice;
use aether_infra::graphics::d3d12::HeadlessD3D12Device;
use aether_infra::graphics::vulkan::HeadlessVulkanDevice;
use aether_infra::{create_device, create_headless_device, NativeDevice};
use common::*;
use std::io::Write;
use std::sync::Arc;

fn headless_vulkan() -> NativeDevice {
    let headless = Arc::new(HeadlessVulkanDevice::new());
    NativeDevice::Vulkan {
        device: headless.clone(),
        allocator: headless,
    }
}

#[test]
fn mismatched_native_device_is_rejected() {
    init_logging();
    let sink = Arc::new(MemorySink::new());
    let result = create_device(
        settings(GraphicsBackendType::Dx12),
        headless_vulkan(),
        sink.clone(),
    );
    assert!(matches!(result, Err(RenderError::InitializationFailed(_))));
    assert_eq!(sink.count(Severity::Critical), 1);
}

#[test]
fn matching_native_device_opens() -> anyhow::Result<()> {
    let sink: Arc<dyn LogSink> = Arc::new(MemorySink::new());
    let device = create_device(
        settings(GraphicsBackendType::Dx12),
        NativeDevice::D3D12(Arc::new(HeadlessD3D12Device::new())),
        sink,
    )?;
    assert_eq!(device.backend_type(), GraphicsBackendType::Dx12);
    assert!(device.settings().debug_names);
    assert_eq!(device.logger().name(), "Graphics");
    Ok(())
}

#[test]
fn objects_do_not_cross_backends() {
    init_logging();
    let sink = Arc::new(MemorySink::new());
    let dx12 = create_headless_device(settings(GraphicsBackendType::Dx12), sink.clone());
    let vulkan = create_headless_device(settings(GraphicsBackendType::Vulkan), sink.clone());

    let desc = RenderPipelineDescriptor::new(
        "foreign",
        PipelineShaders::new(
            shader(dx12.as_ref(), ShaderStage::Vertex, "vs"),
            shader(dx12.as_ref(), ShaderStage::Fragment, "ps"),
        ),
        PipelineLayout::default(),
    );
    let err = vulkan.create_render_pipeline(desc).unwrap_err();
    assert!(matches!(
        err,
        ResourceError::Pipeline(PipelineError::BackendMismatch {
            expected: "Vulkan",
            object: "shader module",
        })
    ));

    let sampler = vulkan
        .create_sampler(&SamplerDescriptor::point_clamp())
        .expect("sampler");
    let mut desc = simple_pipeline(dx12.as_ref(), PipelineLayout::default());
    desc.layout.sets_layout = vec![DescriptorSetLayout::new(vec![
        DescriptorSetLayoutBinding::immutable_samplers(vec![sampler]),
    ])];
    let err = dx12.create_render_pipeline(desc).unwrap_err();
    assert!(matches!(
        err,
        ResourceError::Pipeline(PipelineError::BackendMismatch {
            expected: "D3D12",
            object: "immutable sampler",
        })
    ));
    assert_eq!(sink.count(Severity::Critical), 2);
}

#[test]
fn settings_file_selects_the_backend() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        r#"{{ "backend": "Vulkan", "debug_names": false, "logger_name": "Renderer" }}"#
    )?;
    let settings = RhiSettings::load(file.path())?;
    let sink = Arc::new(MemorySink::new());
    let device = create_headless_device(settings, sink.clone());
    assert_eq!(device.backend_type(), GraphicsBackendType::Vulkan);
    assert_eq!(device.logger().name(), "Renderer");

    device.logger().critical("device lost");
    assert_eq!(sink.records(), vec![(Severity::Critical, "device lost".to_string())]);
    Ok(())
}
