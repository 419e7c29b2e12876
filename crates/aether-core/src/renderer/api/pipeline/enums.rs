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

//! Enums for pipeline configuration.

/// The meaning of a vertex attribute, used to match it with a shader input.
///
/// The declaration order is significant: it is the attribute's ordinal, which
/// backends without semantic names use as the shader input location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexSemantic {
    /// Vertex position.
    Position,
    /// Vertex color.
    Color,
    /// Vertex normal.
    Normal,
    /// Vertex tangent.
    Tangent,
    /// Vertex bitangent (binormal).
    Bitangent,
    /// Texture coordinate set 0.
    Texcoord0,
    /// Texture coordinate set 1.
    Texcoord1,
    /// Texture coordinate set 2.
    Texcoord2,
    /// Texture coordinate set 3.
    Texcoord3,
    /// Texture coordinate set 4.
    Texcoord4,
    /// Texture coordinate set 5.
    Texcoord5,
    /// Texture coordinate set 6.
    Texcoord6,
    /// Texture coordinate set 7.
    Texcoord7,
}

impl VertexSemantic {
    /// The HLSL-style semantic name. All texture coordinate sets share `TEXCOORD`.
    pub fn semantic_name(&self) -> &'static str {
        match self {
            VertexSemantic::Position => "POSITION",
            VertexSemantic::Color => "COLOR",
            VertexSemantic::Normal => "NORMAL",
            VertexSemantic::Tangent => "TANGENT",
            VertexSemantic::Bitangent => "BINORMAL",
            VertexSemantic::Texcoord0
            | VertexSemantic::Texcoord1
            | VertexSemantic::Texcoord2
            | VertexSemantic::Texcoord3
            | VertexSemantic::Texcoord4
            | VertexSemantic::Texcoord5
            | VertexSemantic::Texcoord6
            | VertexSemantic::Texcoord7 => "TEXCOORD",
        }
    }

    /// The index paired with [`Self::semantic_name`]: `N` for `TexcoordN`, 0 otherwise.
    pub fn semantic_index(&self) -> u32 {
        self.location()
            .saturating_sub(VertexSemantic::Texcoord0.location())
    }

    /// The ordinal of this semantic, used as a shader input location.
    pub fn location(&self) -> u32 {
        *self as u32
    }
}

/// Defines how vertices are connected to form a geometric primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Vertices are rendered as a list of isolated points.
    PointList,
    /// Every two vertices form a line.
    LineList,
    /// Vertices are rendered as a connected line strip.
    LineStrip,
    /// Line list with adjacency information.
    LineListAdjacency,
    /// Line strip with adjacency information.
    LineStripAdjacency,
    /// Every three vertices form a triangle.
    #[default]
    TriangleList,
    /// Vertices are rendered as a connected triangle strip.
    TriangleStrip,
    /// Triangle list with adjacency information.
    TriangleListAdjacency,
    /// Triangle strip with adjacency information.
    TriangleStripAdjacency,
    /// Patches consumed by the tessellation stages.
    PatchList,
}

/// Defines which face of a triangle to cull (not render).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// No culling is performed.
    #[default]
    None,
    /// Cull front-facing triangles.
    Front,
    /// Cull back-facing triangles.
    Back,
}

/// Defines which vertex winding order considers a triangle to be "front-facing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    /// Counter-clockwise winding order is the front face (e.g., OpenGL default).
    #[default]
    Ccw,
    /// Clockwise winding order is the front face (e.g., DirectX default).
    Cw,
}

/// Defines how polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    /// Polygons are filled. This is the normal rendering mode.
    #[default]
    Fill,
    /// Polygons are rendered as outlines (wireframe).
    Line,
    /// Polygon vertices are rendered as points.
    Point,
}

/// The comparison function used for depth and stencil testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    /// The test never passes.
    Never,
    /// The test passes if the new value is less than the existing value.
    Less,
    /// The test passes if the new value is equal to the existing value.
    Equal,
    /// The test passes if the new value is less than or equal to the existing value.
    LessEqual,
    /// The test passes if the new value is greater than the existing value.
    Greater,
    /// The test passes if the new value is not equal to the existing value.
    NotEqual,
    /// The test passes if the new value is greater than or equal to the existing value.
    GreaterEqual,
    /// The test always passes.
    #[default]
    Always,
}

/// An operation to perform on a stencil buffer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOperation {
    /// Keep the existing stencil value.
    #[default]
    Keep,
    /// Set the stencil value to 0.
    Zero,
    /// Replace the stencil value with the reference value.
    Replace,
    /// Bitwise invert the stencil value.
    Invert,
    /// Increment the stencil value, clamping at the maximum value.
    IncrementClamp,
    /// Decrement the stencil value, clamping at 0.
    DecrementClamp,
    /// Increment the stencil value, wrapping to 0 on overflow.
    IncrementWrap,
    /// Decrement the stencil value, wrapping to the maximum value on underflow.
    DecrementWrap,
}

/// A factor in a blend equation, determining how much a source or destination color contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// The factor is `0.0`.
    Zero,
    /// The factor is `1.0`.
    One,
    /// The factor is the source color.
    Src,
    /// The factor is `1.0 - src`.
    OneMinusSrc,
    /// The factor is the source alpha component (`src.a`).
    SrcAlpha,
    /// The factor is `1.0 - src.a`.
    OneMinusSrcAlpha,
    /// The factor is the destination color.
    Dst,
    /// The factor is `1.0 - dst`.
    OneMinusDst,
    /// The factor is the destination alpha component (`dst.a`).
    DstAlpha,
    /// The factor is `1.0 - dst.a`.
    OneMinusDstAlpha,
    /// The factor is `min(src.a, 1.0 - dst.a)`.
    SrcAlphaSaturated,
    /// The factor is the constant blend color.
    Constant,
    /// The factor is `1.0 - constant`.
    OneMinusConstant,
}

/// The operation used to combine source and destination colors in a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOperation {
    /// The result is `source + destination`.
    #[default]
    Add,
    /// The result is `source - destination`.
    Subtract,
    /// The result is `destination - source`.
    ReverseSubtract,
    /// The result is `min(source, destination)`.
    Min,
    /// The result is `max(source, destination)`.
    Max,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texcoord_semantics_share_a_name() {
        assert_eq!(VertexSemantic::Texcoord3.semantic_name(), "TEXCOORD");
        assert_eq!(VertexSemantic::Texcoord3.semantic_index(), 3);
        assert_eq!(VertexSemantic::Texcoord0.semantic_index(), 0);
        assert_eq!(VertexSemantic::Texcoord7.semantic_index(), 7);
    }

    #[test]
    fn other_semantics_use_index_zero() {
        assert_eq!(VertexSemantic::Position.semantic_name(), "POSITION");
        assert_eq!(VertexSemantic::Position.semantic_index(), 0);
        assert_eq!(VertexSemantic::Bitangent.semantic_name(), "BINORMAL");
        assert_eq!(VertexSemantic::Bitangent.semantic_index(), 0);
    }

    #[test]
    fn locations_follow_declaration_order() {
        assert_eq!(VertexSemantic::Position.location(), 0);
        assert_eq!(VertexSemantic::Texcoord0.location(), 5);
        assert_eq!(VertexSemantic::Texcoord7.location(), 12);
    }
}
