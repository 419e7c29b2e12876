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

use super::conversions::{stencil_op_state, IntoVulkan};
use super::device::VulkanShared;
use super::layout::{create_pipeline_layout, PipelineLayoutVulkan};
use super::raw::{
    ComputePipelineInfo, DepthStencilInfo, GraphicsPipelineInfo, Owned, RasterizationInfo,
    ShaderStageInfo,
};
use super::shader::ShaderModuleVulkan;
use aether_core::renderer::api::pipeline::descriptor::{
    ComputePipelineDescriptor, RenderPipelineDescriptor,
};
use aether_core::renderer::api::pipeline::state::VertexInputBuffer;
use aether_core::renderer::api::util::enums::{ResourceFormat, ShaderStage};
use aether_core::renderer::error::PipelineError;
use aether_core::renderer::traits::{ComputePipeline, RenderPipeline, ShaderModule};
use ash::vk;
use std::any::Any;
use std::sync::Arc;

/// Patches carry one control point, matching the D3D12 backend.
const PATCH_CONTROL_POINTS: u32 = 1;

fn label_of(label: &str) -> Option<String> {
    (!label.is_empty()).then(|| label.to_string())
}

fn stage_info(
    module: &Arc<dyn ShaderModule>,
    expected: ShaderStage,
    pipeline_label: &str,
) -> Result<ShaderStageInfo, PipelineError> {
    let module_vk = module
        .as_any()
        .downcast_ref::<ShaderModuleVulkan>()
        .ok_or(PipelineError::BackendMismatch {
            expected: "Vulkan",
            object: "shader module",
        })?;
    if module_vk.stage() != expected {
        return Err(PipelineError::InvalidShaderModuleForPipeline {
            entry_point: module_vk.entry_point().to_string(),
            pipeline_label: label_of(pipeline_label),
        });
    }
    Ok(module_vk.stage_info())
}

/// Vertex buffer bindings and attributes. The attribute location is the semantic ordinal.
pub fn vertex_input(
    buffers: &[VertexInputBuffer],
) -> (
    Vec<vk::VertexInputBindingDescription>,
    Vec<vk::VertexInputAttributeDescription>,
) {
    let bindings = buffers
        .iter()
        .enumerate()
        .map(|(binding, buffer)| vk::VertexInputBindingDescription {
            binding: binding as u32,
            stride: buffer.stride,
            input_rate: if buffer.per_instance {
                vk::VertexInputRate::INSTANCE
            } else {
                vk::VertexInputRate::VERTEX
            },
        })
        .collect();
    let attributes = buffers
        .iter()
        .enumerate()
        .flat_map(|(binding, buffer)| {
            buffer
                .attributes
                .iter()
                .map(move |attribute| vk::VertexInputAttributeDescription {
                    location: attribute.semantic.location(),
                    binding: binding as u32,
                    format: attribute.format.into_vulkan(),
                    offset: attribute.offset,
                })
        })
        .collect();
    (bindings, attributes)
}

/// A rasterization pipeline using dynamic rendering. The pipeline is (re)built by
/// [`RenderPipeline::set_target_formats`].
#[derive(Debug)]
pub struct RenderPipelineVulkan {
    pipeline: Option<Owned<vk::Pipeline>>,
    layout: PipelineLayoutVulkan,
    stages: Vec<ShaderStageInfo>,
    desc: RenderPipelineDescriptor,
    shared: Arc<VulkanShared>,
}

impl RenderPipelineVulkan {
    pub(crate) fn new(
        shared: Arc<VulkanShared>,
        desc: RenderPipelineDescriptor,
    ) -> Result<Self, PipelineError> {
        let stages = desc
            .validate()
            .and_then(|_| {
                desc.shaders
                    .stages()
                    .map(|(stage, module)| stage_info(module, stage, &desc.label))
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(|err| {
                shared
                    .logger
                    .critical(format!("Invalid render pipeline '{}': {err}", desc.label));
                err
            })?;
        let layout = create_pipeline_layout(&shared, &desc.layout, &desc.label)?;
        Ok(Self {
            pipeline: None,
            layout,
            stages,
            desc,
            shared,
        })
    }

    /// The pipeline layout.
    pub fn layout(&self) -> &PipelineLayoutVulkan {
        &self.layout
    }

    /// The native pipeline, if compiled.
    pub fn raw(&self) -> Option<vk::Pipeline> {
        self.pipeline.as_ref().map(Owned::raw)
    }

    /// Assembles the pipeline create info from the current descriptor.
    pub fn graphics_pipeline_info(&self) -> GraphicsPipelineInfo {
        let desc = &self.desc;
        let primitive = &desc.primitive_state;
        let depth_stencil = &desc.depth_stencil_state;
        let (vertex_bindings, vertex_attributes) = vertex_input(&desc.vertex_input_buffers);

        let color_blend_attachments = desc
            .color_target_state
            .attachments
            .iter()
            .map(|attachment| vk::PipelineColorBlendAttachmentState {
                blend_enable: vk::Bool32::from(attachment.blend_enable),
                src_color_blend_factor: attachment.src_blend_factor.into_vulkan(),
                dst_color_blend_factor: attachment.dst_blend_factor.into_vulkan(),
                color_blend_op: attachment.blend_op.into_vulkan(),
                src_alpha_blend_factor: attachment.src_alpha_blend_factor.into_vulkan(),
                dst_alpha_blend_factor: attachment.dst_alpha_blend_factor.into_vulkan(),
                alpha_blend_op: attachment.alpha_blend_op.into_vulkan(),
                color_write_mask: attachment.color_write_mask.into_vulkan(),
            })
            .collect();

        let format = depth_stencil.format;
        let mut dynamic_states = vec![vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        if depth_stencil.stencil_test {
            dynamic_states.push(vk::DynamicState::STENCIL_REFERENCE);
        }

        GraphicsPipelineInfo {
            stages: self.stages.clone(),
            vertex_bindings,
            vertex_attributes,
            topology: primitive.topology.into_vulkan(),
            patch_control_points: PATCH_CONTROL_POINTS,
            rasterization: RasterizationInfo {
                polygon_mode: primitive.polygon_mode.into_vulkan(),
                cull_mode: primitive.cull_mode.into_vulkan(),
                front_face: primitive.front_face.into_vulkan(),
                conservative: primitive.conservative,
            },
            depth_stencil: DepthStencilInfo {
                depth_test_enable: depth_stencil.depth_test_active(),
                depth_write_enable: depth_stencil.depth_test_active() && depth_stencil.depth_write,
                depth_compare_op: depth_stencil.depth_compare.into_vulkan(),
                stencil_test_enable: depth_stencil.stencil_test,
                front: stencil_op_state(
                    &depth_stencil.stencil_front,
                    depth_stencil.stencil_read_mask,
                    depth_stencil.stencil_write_mask,
                ),
                back: stencil_op_state(
                    &depth_stencil.stencil_back,
                    depth_stencil.stencil_read_mask,
                    depth_stencil.stencil_write_mask,
                ),
            },
            color_blend_attachments,
            color_formats: desc
                .color_target_state
                .attachments
                .iter()
                .map(|attachment| attachment.format.into_vulkan())
                .collect(),
            depth_format: if format.is_depth() {
                format.into_vulkan()
            } else {
                vk::Format::UNDEFINED
            },
            stencil_format: if format.has_stencil() {
                format.into_vulkan()
            } else {
                vk::Format::UNDEFINED
            },
            dynamic_states,
            layout: self.layout.raw(),
        }
    }

    fn build(&mut self) -> Result<(), PipelineError> {
        let info = self.graphics_pipeline_info();
        let raw = self
            .shared
            .raw
            .create_graphics_pipeline(&info)
            .map_err(|err| {
                self.shared.logger.critical(format!(
                    "Failed to create graphics pipeline '{}': {err}",
                    self.desc.label
                ));
                PipelineError::CompilationFailed {
                    label: label_of(&self.desc.label),
                    details: err.to_string(),
                }
            })?;
        let pipeline = Owned::new(self.shared.raw.clone(), raw);
        self.shared.name_object(raw, &self.desc.label);
        self.pipeline = Some(pipeline);
        log::debug!(
            "VulkanDevice: Built graphics pipeline '{}' with {} color targets",
            self.desc.label,
            info.color_formats.len()
        );
        Ok(())
    }
}

impl RenderPipeline for RenderPipelineVulkan {
    fn descriptor(&self) -> &RenderPipelineDescriptor {
        &self.desc
    }

    fn set_target_formats(
        &mut self,
        color_formats: &[ResourceFormat],
        depth_stencil_format: ResourceFormat,
    ) -> Result<bool, PipelineError> {
        let changed = self
            .desc
            .apply_target_formats(color_formats, depth_stencil_format);
        if self.pipeline.is_some() && !changed {
            return Ok(false);
        }
        self.pipeline = None;
        self.build()?;
        Ok(true)
    }

    fn is_compiled(&self) -> bool {
        self.pipeline.is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A compute pipeline, built at construction.
#[derive(Debug)]
pub struct ComputePipelineVulkan {
    pipeline: Owned<vk::Pipeline>,
    layout: PipelineLayoutVulkan,
    desc: ComputePipelineDescriptor,
}

impl ComputePipelineVulkan {
    pub(crate) fn new(
        shared: Arc<VulkanShared>,
        desc: ComputePipelineDescriptor,
    ) -> Result<Self, PipelineError> {
        let stage = stage_info(&desc.compute, ShaderStage::Compute, &desc.label).map_err(|err| {
            shared
                .logger
                .critical(format!("Invalid compute pipeline '{}': {err}", desc.label));
            err
        })?;
        let layout = create_pipeline_layout(&shared, &desc.layout, &desc.label)?;
        let info = ComputePipelineInfo {
            stage,
            layout: layout.raw(),
        };
        let raw = shared.raw.create_compute_pipeline(&info).map_err(|err| {
            shared.logger.critical(format!(
                "Failed to create compute pipeline '{}': {err}",
                desc.label
            ));
            PipelineError::CompilationFailed {
                label: label_of(&desc.label),
                details: err.to_string(),
            }
        })?;
        let pipeline = Owned::new(shared.raw.clone(), raw);
        shared.name_object(raw, &desc.label);
        log::debug!("VulkanDevice: Built compute pipeline '{}'", desc.label);
        Ok(Self {
            pipeline,
            layout,
            desc,
        })
    }

    /// The native pipeline.
    pub fn raw(&self) -> vk::Pipeline {
        self.pipeline.raw()
    }

    /// The pipeline layout.
    pub fn layout(&self) -> &PipelineLayoutVulkan {
        &self.layout
    }
}

impl ComputePipeline for ComputePipelineVulkan {
    fn descriptor(&self) -> &ComputePipelineDescriptor {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
