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

//! Helpers shared by the integration tests.

#![allow(dead_code)]

use aether_core::renderer::api::*;
use aether_core::renderer::logging::{GraphicsLogger, MemorySink};
use aether_core::renderer::traits::{GraphicsDevice, ShaderModule};
use aether_infra::graphics::vulkan::SPIRV_MAGIC;
use std::sync::Arc;

/// Routes `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A logger recording into a fresh [`MemorySink`].
pub fn recording_logger() -> (Arc<MemorySink>, GraphicsLogger) {
    let sink = Arc::new(MemorySink::new());
    let logger = GraphicsLogger::new("Graphics", sink.clone());
    (sink, logger)
}

/// Settings for `backend` with debug names on.
pub fn settings(backend: GraphicsBackendType) -> RhiSettings {
    RhiSettings {
        backend,
        debug_names: true,
        ..Default::default()
    }
}

/// Bytecode the device accepts for `backend`.
pub fn bytecode(backend: GraphicsBackendType) -> Vec<u8> {
    match backend {
        GraphicsBackendType::Dx12 => b"DXBC fake container".to_vec(),
        GraphicsBackendType::Vulkan => [SPIRV_MAGIC, 0x0001_0600, 0, 1, 0]
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .collect(),
    }
}

/// Creates a shader module for `stage` on `device`.
pub fn shader(device: &dyn GraphicsDevice, stage: ShaderStage, label: &str) -> Arc<dyn ShaderModule> {
    device
        .create_shader_module(&ShaderModuleDescriptor {
            label: label.to_string(),
            stage,
            entry_point: "main".to_string(),
            bytecode: bytecode(device.backend_type()),
        })
        .expect("shader module")
}

/// A VS + PS pipeline with one color attachment of undefined format.
pub fn simple_pipeline(device: &dyn GraphicsDevice, layout: PipelineLayout) -> RenderPipelineDescriptor {
    let shaders = PipelineShaders::new(
        shader(device, ShaderStage::Vertex, "vs"),
        shader(device, ShaderStage::Fragment, "ps"),
    );
    let mut desc = RenderPipelineDescriptor::new("opaque", shaders, layout);
    desc.color_target_state.attachments = vec![ColorTargetAttachment::default()];
    desc
}

/// A layout using every kind of binding: a uniform buffer, a reserved slot, two
/// immutable samplers, a texture array in a second set and push constants.
pub fn mixed_layout(device: &dyn GraphicsDevice) -> PipelineLayout {
    let linear = device
        .create_sampler(&SamplerDescriptor::default())
        .expect("sampler");
    let point = device
        .create_sampler(&SamplerDescriptor::point_clamp())
        .expect("sampler");
    PipelineLayout {
        sets_layout: vec![
            DescriptorSetLayout::new(vec![
                DescriptorSetLayoutBinding::new(DescriptorType::UniformBuffer, 1),
                DescriptorSetLayoutBinding::reserved(),
                DescriptorSetLayoutBinding::immutable_samplers(vec![linear, point]),
            ]),
            DescriptorSetLayout::new(vec![DescriptorSetLayoutBinding::new(
                DescriptorType::SampledTexture,
                4,
            )]),
        ],
        push_constants_size: 20,
    }
}
