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

//! Main pipeline descriptors.

use super::layout::PipelineLayout;
use super::state::*;
use crate::renderer::api::util::enums::{ResourceFormat, ShaderStage};
use crate::renderer::error::PipelineError;
use crate::renderer::traits::ShaderModule;
use std::sync::Arc;

/// The shader modules of a render pipeline.
///
/// Vertex and fragment stages are mandatory; the tessellation and geometry stages
/// are only compiled into the pipeline when present.
#[derive(Debug, Clone)]
pub struct PipelineShaders {
    /// The vertex shader.
    pub vertex: Arc<dyn ShaderModule>,
    /// The tessellation control (hull) shader, if any.
    pub tessellation_control: Option<Arc<dyn ShaderModule>>,
    /// The tessellation evaluation (domain) shader, if any.
    pub tessellation_evaluation: Option<Arc<dyn ShaderModule>>,
    /// The geometry shader, if any.
    pub geometry: Option<Arc<dyn ShaderModule>>,
    /// The fragment shader.
    pub fragment: Arc<dyn ShaderModule>,
}

impl PipelineShaders {
    /// A vertex + fragment pair.
    pub fn new(vertex: Arc<dyn ShaderModule>, fragment: Arc<dyn ShaderModule>) -> Self {
        Self {
            vertex,
            tessellation_control: None,
            tessellation_evaluation: None,
            geometry: None,
            fragment,
        }
    }

    /// Iterates over the present stages in pipeline order.
    pub fn stages(&self) -> impl Iterator<Item = (ShaderStage, &Arc<dyn ShaderModule>)> {
        [
            (ShaderStage::Vertex, Some(&self.vertex)),
            (
                ShaderStage::TessellationControl,
                self.tessellation_control.as_ref(),
            ),
            (
                ShaderStage::TessellationEvaluation,
                self.tessellation_evaluation.as_ref(),
            ),
            (ShaderStage::Geometry, self.geometry.as_ref()),
            (ShaderStage::Fragment, Some(&self.fragment)),
        ]
        .into_iter()
        .filter_map(|(stage, module)| module.map(|module| (stage, module)))
    }
}

/// A complete descriptor for a render pipeline.
///
/// Everything except the target formats is fixed once the pipeline is created.
/// Target formats change through [`RenderPipelineDescriptor::apply_target_formats`].
#[derive(Debug, Clone)]
pub struct RenderPipelineDescriptor {
    /// An optional debug label. Empty means no debug name.
    pub label: String,
    /// The shader stages.
    pub shaders: PipelineShaders,
    /// The resource layout.
    pub layout: PipelineLayout,
    /// The vertex buffers, indexed by input slot.
    pub vertex_input_buffers: Vec<VertexInputBuffer>,
    /// The state for primitive assembly and rasterization.
    pub primitive_state: PrimitiveState,
    /// The color targets.
    pub color_target_state: ColorTargetState,
    /// The depth and stencil state.
    pub depth_stencil_state: DepthStencilState,
}

impl RenderPipelineDescriptor {
    /// A descriptor with default fixed-function state and no targets.
    pub fn new(label: impl Into<String>, shaders: PipelineShaders, layout: PipelineLayout) -> Self {
        Self {
            label: label.into(),
            shaders,
            layout,
            vertex_input_buffers: Vec::new(),
            primitive_state: PrimitiveState::default(),
            color_target_state: ColorTargetState::default(),
            depth_stencil_state: DepthStencilState::default(),
        }
    }

    /// Writes new target formats into the descriptor and reports whether any changed.
    ///
    /// Only the first `min(color_formats.len(), attachments.len())` attachments are
    /// compared and updated. The formats are always written through, so the
    /// descriptor reflects the live targets even when nothing changed.
    pub fn apply_target_formats(
        &mut self,
        color_formats: &[ResourceFormat],
        depth_stencil_format: ResourceFormat,
    ) -> bool {
        let mut changed = false;
        for (attachment, &format) in self
            .color_target_state
            .attachments
            .iter_mut()
            .zip(color_formats)
        {
            changed |= attachment.format != format;
            attachment.format = format;
        }
        changed |= self.depth_stencil_state.format != depth_stencil_format;
        self.depth_stencil_state.format = depth_stencil_format;
        changed
    }

    /// Checks the descriptor against the limits every backend shares.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let count = self.color_target_state.attachments.len();
        if count > MAX_COLOR_ATTACHMENTS {
            return Err(PipelineError::IncompatibleColorTarget(format!(
                "pipeline '{}' declares {count} color attachments, the limit is {MAX_COLOR_ATTACHMENTS}",
                self.label
            )));
        }
        self.layout.validate()
    }
}

/// A complete descriptor for a compute pipeline.
#[derive(Debug, Clone)]
pub struct ComputePipelineDescriptor {
    /// An optional debug label. Empty means no debug name.
    pub label: String,
    /// The compute shader.
    pub compute: Arc<dyn ShaderModule>,
    /// The resource layout.
    pub layout: PipelineLayout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Debug)]
    struct Bytecode(ShaderStage);

    impl ShaderModule for Bytecode {
        fn stage(&self) -> ShaderStage {
            self.0
        }

        fn entry_point(&self) -> &str {
            "main"
        }

        fn bytecode(&self) -> &[u8] {
            &[]
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn descriptor_with_attachments(count: usize) -> RenderPipelineDescriptor {
        let shaders = PipelineShaders::new(
            Arc::new(Bytecode(ShaderStage::Vertex)),
            Arc::new(Bytecode(ShaderStage::Fragment)),
        );
        let mut desc = RenderPipelineDescriptor::new("test", shaders, PipelineLayout::default());
        desc.color_target_state.attachments = vec![ColorTargetAttachment::default(); count];
        desc
    }

    #[test]
    fn identical_formats_report_no_change() {
        let mut desc = descriptor_with_attachments(1);
        assert!(desc.apply_target_formats(&[ResourceFormat::Rgba8Unorm], ResourceFormat::Undefined));
        assert!(!desc.apply_target_formats(&[ResourceFormat::Rgba8Unorm], ResourceFormat::Undefined));
        assert_eq!(
            desc.color_target_state.attachments[0].format,
            ResourceFormat::Rgba8Unorm
        );
    }

    #[test]
    fn depth_change_alone_is_detected() {
        let mut desc = descriptor_with_attachments(1);
        desc.apply_target_formats(&[ResourceFormat::Rgba8Unorm], ResourceFormat::Undefined);
        assert!(desc.apply_target_formats(&[ResourceFormat::Rgba8Unorm], ResourceFormat::Depth32Float));
        assert_eq!(desc.depth_stencil_state.format, ResourceFormat::Depth32Float);
    }

    #[test]
    fn only_overlapping_attachments_are_compared() {
        let mut desc = descriptor_with_attachments(2);
        // Extra formats beyond the declared attachments are ignored.
        assert!(!desc.apply_target_formats(
            &[ResourceFormat::Undefined, ResourceFormat::Undefined, ResourceFormat::R32Float],
            ResourceFormat::Undefined
        ));
        // Fewer formats leave the trailing attachment untouched.
        assert!(desc.apply_target_formats(&[ResourceFormat::Bgra8Unorm], ResourceFormat::Undefined));
        assert_eq!(
            desc.color_target_state.attachments[1].format,
            ResourceFormat::Undefined
        );
    }

    #[test]
    fn stages_skip_absent_shaders() {
        let mut desc = descriptor_with_attachments(0);
        desc.shaders.geometry = Some(Arc::new(Bytecode(ShaderStage::Geometry)));
        let stages: Vec<_> = desc.shaders.stages().map(|(stage, _)| stage).collect();
        assert_eq!(
            stages,
            vec![ShaderStage::Vertex, ShaderStage::Geometry, ShaderStage::Fragment]
        );
    }

    #[test]
    fn too_many_attachments_fail_validation() {
        let desc = descriptor_with_attachments(MAX_COLOR_ATTACHMENTS + 1);
        assert!(matches!(
            desc.validate(),
            Err(PipelineError::IncompatibleColorTarget(_))
        ));
    }
}
