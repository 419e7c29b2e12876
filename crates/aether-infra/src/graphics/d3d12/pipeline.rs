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

//! Render and compute pipeline state objects.

use super::conversions::IntoD3D12;
use super::device::D3D12Shared;
use super::layout::create_root_signature;
use super::native::{
    self, BlendDesc, ComputePipelineStateDesc, DepthStencilDesc, DepthStencilOpDesc,
    DepthWriteMask, DxgiFormat, GraphicsPipelineStateDesc, InputClassification,
    InputElementDesc, RasterizerDesc, RenderTargetBlendDesc, SampleDesc, ShaderBytecode,
    SIMULTANEOUS_RENDER_TARGET_COUNT,
};
use super::raw::ComPtr;
use super::shader::ShaderModuleD3D12;
use aether_core::renderer::api::pipeline::descriptor::{
    ComputePipelineDescriptor, RenderPipelineDescriptor,
};
use aether_core::renderer::api::pipeline::enums::FrontFace;
use aether_core::renderer::api::pipeline::state::{StencilFaceState, VertexInputBuffer};
use aether_core::renderer::api::util::enums::{ResourceFormat, ShaderStage};
use aether_core::renderer::error::PipelineError;
use aether_core::renderer::traits::{ComputePipeline, RenderPipeline, ShaderModule};
use std::any::Any;
use std::sync::Arc;

fn label_of(label: &str) -> Option<String> {
    (!label.is_empty()).then(|| label.to_string())
}

/// Resolves a shader module to D3D12 bytecode, checking its backend and stage.
fn stage_bytecode(
    module: &Arc<dyn ShaderModule>,
    expected: ShaderStage,
    pipeline_label: &str,
) -> Result<ShaderBytecode, PipelineError> {
    let module_d3d12 = module
        .as_any()
        .downcast_ref::<ShaderModuleD3D12>()
        .ok_or(PipelineError::BackendMismatch {
            expected: "D3D12",
            object: "shader module",
        })?;
    if module_d3d12.stage() != expected {
        return Err(PipelineError::InvalidShaderModuleForPipeline {
            entry_point: module_d3d12.entry_point().to_string(),
            pipeline_label: label_of(pipeline_label),
        });
    }
    Ok(module_d3d12.raw_bytecode())
}

#[derive(Debug, Clone)]
struct GraphicsStages {
    vs: ShaderBytecode,
    hs: Option<ShaderBytecode>,
    ds: Option<ShaderBytecode>,
    gs: Option<ShaderBytecode>,
    ps: ShaderBytecode,
}

impl GraphicsStages {
    fn resolve(desc: &RenderPipelineDescriptor) -> Result<Self, PipelineError> {
        let shaders = &desc.shaders;
        let optional = |module: &Option<Arc<dyn ShaderModule>>, stage| {
            module
                .as_ref()
                .map(|module| stage_bytecode(module, stage, &desc.label))
                .transpose()
        };
        Ok(Self {
            vs: stage_bytecode(&shaders.vertex, ShaderStage::Vertex, &desc.label)?,
            hs: optional(
                &shaders.tessellation_control,
                ShaderStage::TessellationControl,
            )?,
            ds: optional(
                &shaders.tessellation_evaluation,
                ShaderStage::TessellationEvaluation,
            )?,
            gs: optional(&shaders.geometry, ShaderStage::Geometry)?,
            ps: stage_bytecode(&shaders.fragment, ShaderStage::Fragment, &desc.label)?,
        })
    }
}

fn stencil_op_desc(face: &StencilFaceState) -> DepthStencilOpDesc {
    DepthStencilOpDesc {
        stencil_fail_op: face.fail_op.into_d3d12(),
        stencil_depth_fail_op: face.depth_fail_op.into_d3d12(),
        stencil_pass_op: face.pass_op.into_d3d12(),
        stencil_func: face.compare.into_d3d12(),
    }
}

/// Flattens the vertex buffers into input elements: buffers in slot order, then
/// attributes in declaration order.
pub fn input_elements(buffers: &[VertexInputBuffer]) -> Vec<InputElementDesc> {
    buffers
        .iter()
        .enumerate()
        .flat_map(|(slot, buffer)| {
            buffer.attributes.iter().map(move |attribute| InputElementDesc {
                semantic_name: attribute.semantic.semantic_name(),
                semantic_index: attribute.semantic.semantic_index(),
                format: attribute.format.into_d3d12(),
                input_slot: slot as u32,
                aligned_byte_offset: attribute.offset,
                input_slot_class: if buffer.per_instance {
                    InputClassification::PerInstanceData
                } else {
                    InputClassification::PerVertexData
                },
                instance_data_step_rate: u32::from(buffer.per_instance),
            })
        })
        .collect()
}

/// A rasterization pipeline. The PSO is (re)built by [`RenderPipeline::set_target_formats`].
#[derive(Debug)]
pub struct RenderPipelineD3D12 {
    // Declared before the root signature so the PSO is released first.
    pipeline: Option<ComPtr>,
    root_signature: ComPtr,
    topology: native::PrimitiveTopology,
    stages: GraphicsStages,
    desc: RenderPipelineDescriptor,
    shared: Arc<D3D12Shared>,
}

impl RenderPipelineD3D12 {
    pub(crate) fn new(
        shared: Arc<D3D12Shared>,
        desc: RenderPipelineDescriptor,
    ) -> Result<Self, PipelineError> {
        let stages = desc
            .validate()
            .and_then(|_| GraphicsStages::resolve(&desc))
            .map_err(|err| {
                shared
                    .logger
                    .critical(format!("Invalid render pipeline '{}': {err}", desc.label));
                err
            })?;
        let root_signature = create_root_signature(&shared, &desc.layout, true, &desc.label)?;
        Ok(Self {
            pipeline: None,
            root_signature,
            topology: native::PrimitiveTopology::Undefined,
            stages,
            desc,
            shared,
        })
    }

    /// The root signature handle.
    pub fn root_signature(&self) -> native::RawHandle {
        self.root_signature.raw()
    }

    /// The PSO handle, if compiled.
    pub fn raw_pipeline(&self) -> Option<native::RawHandle> {
        self.pipeline.as_ref().map(ComPtr::raw)
    }

    /// The exact topology to set on the input assembler. `Undefined` until compiled.
    pub fn primitive_topology(&self) -> native::PrimitiveTopology {
        self.topology
    }

    /// Assembles the full pipeline state description from the current descriptor.
    pub fn graphics_pipeline_state_desc(&self) -> GraphicsPipelineStateDesc {
        let desc = &self.desc;
        let attachments = &desc.color_target_state.attachments;

        let mut rtv_formats = [DxgiFormat::UNKNOWN; SIMULTANEOUS_RENDER_TARGET_COUNT];
        for (slot, attachment) in rtv_formats.iter_mut().zip(attachments) {
            *slot = attachment.format.into_d3d12();
        }

        let render_target = attachments
            .iter()
            .map(|attachment| RenderTargetBlendDesc {
                blend_enable: attachment.blend_enable,
                logic_op_enable: false,
                src_blend: attachment.src_blend_factor.into_d3d12(),
                dest_blend: attachment.dst_blend_factor.into_d3d12(),
                blend_op: attachment.blend_op.into_d3d12(),
                src_blend_alpha: attachment.src_alpha_blend_factor.into_d3d12(),
                dest_blend_alpha: attachment.dst_alpha_blend_factor.into_d3d12(),
                blend_op_alpha: attachment.alpha_blend_op.into_d3d12(),
                logic_op: native::LogicOp::Noop,
                render_target_write_mask: attachment.color_write_mask.into_d3d12(),
            })
            .collect();

        let primitive = &desc.primitive_state;
        let depth_stencil = &desc.depth_stencil_state;

        GraphicsPipelineStateDesc {
            root_signature: self.root_signature.raw(),
            vs: self.stages.vs.clone(),
            hs: self.stages.hs.clone(),
            ds: self.stages.ds.clone(),
            gs: self.stages.gs.clone(),
            ps: self.stages.ps.clone(),
            blend_state: BlendDesc {
                alpha_to_coverage_enable: false,
                independent_blend_enable: attachments.len() > 1,
                render_target,
            },
            sample_mask: u32::MAX,
            rasterizer_state: RasterizerDesc {
                fill_mode: primitive.polygon_mode.into_d3d12(),
                cull_mode: primitive.cull_mode.into_d3d12(),
                front_counter_clockwise: primitive.front_face == FrontFace::Ccw,
                depth_bias: 0,
                depth_bias_clamp: 0.0,
                slope_scaled_depth_bias: 0.0,
                depth_clip_enable: false,
                multisample_enable: false,
                antialiased_line_enable: false,
                forced_sample_count: 0,
                conservative_raster: if primitive.conservative {
                    native::ConservativeRasterizationMode::On
                } else {
                    native::ConservativeRasterizationMode::Off
                },
            },
            depth_stencil_state: DepthStencilDesc {
                depth_enable: depth_stencil.depth_test_active(),
                depth_write_mask: if depth_stencil.depth_write {
                    DepthWriteMask::All
                } else {
                    DepthWriteMask::Zero
                },
                depth_func: depth_stencil.depth_compare.into_d3d12(),
                stencil_enable: depth_stencil.stencil_test,
                stencil_read_mask: depth_stencil.stencil_read_mask,
                stencil_write_mask: depth_stencil.stencil_write_mask,
                front_face: stencil_op_desc(&depth_stencil.stencil_front),
                back_face: stencil_op_desc(&depth_stencil.stencil_back),
            },
            input_layout: input_elements(&desc.vertex_input_buffers),
            primitive_topology_type: primitive.topology.into_d3d12(),
            num_render_targets: attachments.len() as u32,
            rtv_formats,
            dsv_format: depth_stencil.format.into_d3d12(),
            sample_desc: SampleDesc {
                count: 1,
                quality: 0,
            },
            node_mask: 0,
        }
    }

    fn build(&mut self) -> Result<(), PipelineError> {
        let state_desc = self.graphics_pipeline_state_desc();
        let raw = self
            .shared
            .raw
            .create_graphics_pipeline_state(&state_desc)
            .map_err(|hr| {
                let err = PipelineError::CompilationFailed {
                    label: label_of(&self.desc.label),
                    details: hr.to_string(),
                };
                self.shared.logger.critical(format!(
                    "Failed to create graphics pipeline state '{}': {hr}",
                    self.desc.label
                ));
                err
            })?;
        let pipeline = ComPtr::new(self.shared.raw.clone(), raw);
        self.shared.name_object(pipeline.raw(), &self.desc.label);
        self.topology = self.desc.primitive_state.topology.into_d3d12();
        self.pipeline = Some(pipeline);
        log::debug!(
            "D3D12Device: Built graphics pipeline '{}' with {} render targets",
            self.desc.label,
            state_desc.num_render_targets
        );
        Ok(())
    }
}

impl RenderPipeline for RenderPipelineD3D12 {
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
pub struct ComputePipelineD3D12 {
    pipeline: ComPtr,
    root_signature: ComPtr,
    desc: ComputePipelineDescriptor,
}

impl ComputePipelineD3D12 {
    pub(crate) fn new(
        shared: Arc<D3D12Shared>,
        desc: ComputePipelineDescriptor,
    ) -> Result<Self, PipelineError> {
        let cs = stage_bytecode(&desc.compute, ShaderStage::Compute, &desc.label).map_err(|err| {
            shared
                .logger
                .critical(format!("Invalid compute pipeline '{}': {err}", desc.label));
            err
        })?;
        let root_signature = create_root_signature(&shared, &desc.layout, false, &desc.label)?;
        let state_desc = ComputePipelineStateDesc {
            root_signature: root_signature.raw(),
            cs,
            node_mask: 0,
        };
        let raw = shared
            .raw
            .create_compute_pipeline_state(&state_desc)
            .map_err(|hr| {
                shared.logger.critical(format!(
                    "Failed to create compute pipeline state '{}': {hr}",
                    desc.label
                ));
                PipelineError::CompilationFailed {
                    label: label_of(&desc.label),
                    details: hr.to_string(),
                }
            })?;
        let pipeline = ComPtr::new(shared.raw.clone(), raw);
        shared.name_object(pipeline.raw(), &desc.label);
        log::debug!("D3D12Device: Built compute pipeline '{}'", desc.label);
        Ok(Self {
            pipeline,
            root_signature,
            desc,
        })
    }

    /// The root signature handle.
    pub fn root_signature(&self) -> native::RawHandle {
        self.root_signature.raw()
    }

    /// The PSO handle.
    pub fn raw_pipeline(&self) -> native::RawHandle {
        self.pipeline.raw()
    }
}

impl ComputePipeline for ComputePipelineD3D12 {
    fn descriptor(&self) -> &ComputePipelineDescriptor {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_core::renderer::api::pipeline::enums::VertexSemantic;
    use aether_core::renderer::api::pipeline::state::VertexAttribute;

    #[test]
    fn input_elements_are_flattened_in_order() {
        let buffers = vec![
            VertexInputBuffer {
                stride: 20,
                per_instance: false,
                attributes: vec![
                    VertexAttribute {
                        semantic: VertexSemantic::Position,
                        format: ResourceFormat::Rgb32Float,
                        offset: 0,
                    },
                    VertexAttribute {
                        semantic: VertexSemantic::Texcoord0,
                        format: ResourceFormat::Rg32Float,
                        offset: 12,
                    },
                ],
            },
            VertexInputBuffer {
                stride: 16,
                per_instance: true,
                attributes: vec![VertexAttribute {
                    semantic: VertexSemantic::Texcoord3,
                    format: ResourceFormat::Rgba32Float,
                    offset: 0,
                }],
            },
        ];
        let elements = input_elements(&buffers);
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].semantic_name, "POSITION");
        assert_eq!(elements[1].semantic_index, 0);
        assert_eq!(elements[1].aligned_byte_offset, 12);
        assert_eq!(elements[2].semantic_name, "TEXCOORD");
        assert_eq!(elements[2].semantic_index, 3);
        assert_eq!(elements[2].input_slot, 1);
        assert_eq!(elements[2].input_slot_class, InputClassification::PerInstanceData);
        assert_eq!(elements[2].instance_data_step_rate, 1);
        assert_eq!(elements[0].instance_data_step_rate, 0);
    }
}
