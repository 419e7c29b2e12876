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

//! State descriptors for the pipeline.

use super::enums::*;
use crate::renderer::api::util::enums::ResourceFormat;
use bitflags::bitflags;

/// The maximum number of color attachments a render pipeline can declare.
pub const MAX_COLOR_ATTACHMENTS: usize = 8;

/// Describes a single vertex attribute within a vertex input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// What the attribute means to the vertex shader.
    pub semantic: VertexSemantic,
    /// The format of the attribute's data.
    pub format: ResourceFormat,
    /// The byte offset of this attribute from the start of the element.
    pub offset: u32,
}

/// Describes the memory layout of a single vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexInputBuffer {
    /// The byte distance between consecutive elements in the buffer.
    pub stride: u32,
    /// If `true`, the buffer advances once per instance instead of once per vertex.
    pub per_instance: bool,
    /// The attributes contained within each element of the buffer.
    pub attributes: Vec<VertexAttribute>,
}

/// Describes the state for primitive assembly and rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PrimitiveState {
    /// The topology of the primitives.
    pub topology: PrimitiveTopology,
    /// The rasterization mode for polygons.
    pub polygon_mode: PolygonMode,
    /// The face culling mode.
    pub cull_mode: CullMode,
    /// The vertex winding order that determines the "front" face of a triangle.
    pub front_face: FrontFace,
    /// If `true`, enables conservative rasterization.
    pub conservative: bool,
}

/// Describes the stencil test and operations for a single face of a primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StencilFaceState {
    /// The operation to perform if the stencil test fails.
    pub fail_op: StencilOperation,
    /// The operation to perform if the stencil test passes but the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// The operation to perform if both the stencil and depth tests pass.
    pub pass_op: StencilOperation,
    /// The comparison function used for the stencil test.
    pub compare: CompareFunction,
}

/// Describes the state for depth and stencil testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    /// The format of the depth/stencil target. `Undefined` means no depth/stencil target.
    pub format: ResourceFormat,
    /// If `true`, fragments are tested against the depth buffer.
    pub depth_test: bool,
    /// If `true`, depth values will be written to the depth buffer.
    pub depth_write: bool,
    /// The comparison function used for the depth test.
    pub depth_compare: CompareFunction,
    /// If `true`, the stencil test is enabled.
    pub stencil_test: bool,
    /// The stencil state for front-facing primitives.
    pub stencil_front: StencilFaceState,
    /// The stencil state for back-facing primitives.
    pub stencil_back: StencilFaceState,
    /// A bitmask for reading from the stencil buffer.
    pub stencil_read_mask: u8,
    /// A bitmask for writing to the stencil buffer.
    pub stencil_write_mask: u8,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            format: ResourceFormat::Undefined,
            depth_test: false,
            depth_write: true,
            depth_compare: CompareFunction::Less,
            stencil_test: false,
            stencil_front: StencilFaceState::default(),
            stencil_back: StencilFaceState::default(),
            stencil_read_mask: 0xff,
            stencil_write_mask: 0xff,
        }
    }
}

impl DepthStencilState {
    /// Returns `true` if depth testing is actually performed: a depth target
    /// must be attached and the test requested.
    pub fn depth_test_active(&self) -> bool {
        self.format != ResourceFormat::Undefined && self.depth_test
    }
}

bitflags! {
    /// A bitmask to enable or disable writes to individual color channels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWrites: u8 {
        /// Enable writes to the Red channel.
        const R = 0b0001;
        /// Enable writes to the Green channel.
        const G = 0b0010;
        /// Enable writes to the Blue channel.
        const B = 0b0100;
        /// Enable writes to the Alpha channel.
        const A = 0b1000;
        /// Enable writes to all channels.
        const ALL = Self::R.bits() | Self::G.bits() | Self::B.bits() | Self::A.bits();
    }
}

impl Default for ColorWrites {
    fn default() -> Self {
        ColorWrites::ALL
    }
}

/// Describes a single color target of a render pipeline, including its blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorTargetAttachment {
    /// The format of this color target.
    pub format: ResourceFormat,
    /// If `true`, blending is enabled for this target.
    pub blend_enable: bool,
    /// The blend factor for the source color.
    pub src_blend_factor: BlendFactor,
    /// The blend factor for the destination color.
    pub dst_blend_factor: BlendFactor,
    /// The operation combining source and destination colors.
    pub blend_op: BlendOperation,
    /// The blend factor for the source alpha.
    pub src_alpha_blend_factor: BlendFactor,
    /// The blend factor for the destination alpha.
    pub dst_alpha_blend_factor: BlendFactor,
    /// The operation combining source and destination alpha.
    pub alpha_blend_op: BlendOperation,
    /// A bitmask controlling which color channels are written to.
    pub color_write_mask: ColorWrites,
}

impl Default for ColorTargetAttachment {
    fn default() -> Self {
        Self {
            format: ResourceFormat::Undefined,
            blend_enable: false,
            src_blend_factor: BlendFactor::One,
            dst_blend_factor: BlendFactor::Zero,
            blend_op: BlendOperation::Add,
            src_alpha_blend_factor: BlendFactor::One,
            dst_alpha_blend_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOperation::Add,
            color_write_mask: ColorWrites::ALL,
        }
    }
}

impl ColorTargetAttachment {
    /// An attachment of the given format with classic `src.a / 1 - src.a` alpha blending.
    pub fn alpha_blended(format: ResourceFormat) -> Self {
        Self {
            format,
            blend_enable: true,
            src_blend_factor: BlendFactor::SrcAlpha,
            dst_blend_factor: BlendFactor::OneMinusSrcAlpha,
            src_alpha_blend_factor: BlendFactor::One,
            dst_alpha_blend_factor: BlendFactor::OneMinusSrcAlpha,
            ..Default::default()
        }
    }
}

/// The set of color targets a render pipeline writes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ColorTargetState {
    /// The color attachments, in slot order. At most [`MAX_COLOR_ATTACHMENTS`].
    pub attachments: Vec<ColorTargetAttachment>,
}
