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

use super::native;
use aether_core::renderer::api::pipeline::enums::{
    BlendFactor, BlendOperation, CompareFunction, CullMode, PolygonMode, PrimitiveTopology,
    StencilOperation,
};
use aether_core::renderer::api::pipeline::layout::DescriptorType;
use aether_core::renderer::api::pipeline::state::ColorWrites;
use aether_core::renderer::api::resource::buffer::MemoryLocation;
use aether_core::renderer::api::resource::sampler::{
    AddressMode, BorderColor, FilterMode, MipmapFilterMode,
};
use aether_core::renderer::api::resource::texture::{TextureDimension, TextureViewDimension};
use aether_core::renderer::api::util::enums::{FormatAspects, ResourceFormat, ShaderStage};

/// A local extension trait to convert our engine's types into D3D12 values.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_d3d12()` syntax.
pub trait IntoD3D12<T> {
    /// Consumes self and converts it into a D3D12-compatible value.
    fn into_d3d12(self) -> T;
}

// --- Blend state ---

impl IntoD3D12<native::BlendOp> for BlendOperation {
    fn into_d3d12(self) -> native::BlendOp {
        match self {
            BlendOperation::Add => native::BlendOp::Add,
            BlendOperation::Subtract => native::BlendOp::Subtract,
            BlendOperation::ReverseSubtract => native::BlendOp::RevSubtract,
            BlendOperation::Min => native::BlendOp::Min,
            BlendOperation::Max => native::BlendOp::Max,
        }
    }
}

impl IntoD3D12<native::Blend> for BlendFactor {
    fn into_d3d12(self) -> native::Blend {
        match self {
            BlendFactor::Zero => native::Blend::Zero,
            BlendFactor::One => native::Blend::One,
            BlendFactor::Src => native::Blend::SrcColor,
            BlendFactor::OneMinusSrc => native::Blend::InvSrcColor,
            BlendFactor::SrcAlpha => native::Blend::SrcAlpha,
            BlendFactor::OneMinusSrcAlpha => native::Blend::InvSrcAlpha,
            BlendFactor::Dst => native::Blend::DestColor,
            BlendFactor::OneMinusDst => native::Blend::InvDestColor,
            BlendFactor::DstAlpha => native::Blend::DestAlpha,
            BlendFactor::OneMinusDstAlpha => native::Blend::InvDestAlpha,
            BlendFactor::SrcAlphaSaturated => native::Blend::SrcAlphaSat,
            BlendFactor::Constant => native::Blend::BlendFactor,
            BlendFactor::OneMinusConstant => native::Blend::InvBlendFactor,
        }
    }
}

impl IntoD3D12<u8> for ColorWrites {
    fn into_d3d12(self) -> u8 {
        // D3D12_COLOR_WRITE_ENABLE uses the same R=1, G=2, B=4, A=8 bits.
        self.bits()
    }
}

// --- Rasterizer and depth-stencil state ---

impl IntoD3D12<native::FillMode> for PolygonMode {
    fn into_d3d12(self) -> native::FillMode {
        match self {
            PolygonMode::Fill => native::FillMode::Solid,
            // D3D12 has no point fill mode.
            PolygonMode::Line | PolygonMode::Point => native::FillMode::Wireframe,
        }
    }
}

impl IntoD3D12<native::CullMode> for CullMode {
    fn into_d3d12(self) -> native::CullMode {
        match self {
            CullMode::None => native::CullMode::None,
            CullMode::Front => native::CullMode::Front,
            CullMode::Back => native::CullMode::Back,
        }
    }
}

impl IntoD3D12<native::StencilOp> for StencilOperation {
    fn into_d3d12(self) -> native::StencilOp {
        match self {
            StencilOperation::Keep => native::StencilOp::Keep,
            StencilOperation::Zero => native::StencilOp::Zero,
            StencilOperation::Replace => native::StencilOp::Replace,
            StencilOperation::Invert => native::StencilOp::Invert,
            StencilOperation::IncrementClamp => native::StencilOp::IncrSat,
            StencilOperation::DecrementClamp => native::StencilOp::DecrSat,
            StencilOperation::IncrementWrap => native::StencilOp::Incr,
            StencilOperation::DecrementWrap => native::StencilOp::Decr,
        }
    }
}

impl IntoD3D12<native::ComparisonFunc> for CompareFunction {
    fn into_d3d12(self) -> native::ComparisonFunc {
        match self {
            CompareFunction::Never => native::ComparisonFunc::Never,
            CompareFunction::Less => native::ComparisonFunc::Less,
            CompareFunction::Equal => native::ComparisonFunc::Equal,
            CompareFunction::LessEqual => native::ComparisonFunc::LessEqual,
            CompareFunction::Greater => native::ComparisonFunc::Greater,
            CompareFunction::NotEqual => native::ComparisonFunc::NotEqual,
            CompareFunction::GreaterEqual => native::ComparisonFunc::GreaterEqual,
            CompareFunction::Always => native::ComparisonFunc::Always,
        }
    }
}

// --- Topology ---

impl IntoD3D12<native::PrimitiveTopologyType> for PrimitiveTopology {
    fn into_d3d12(self) -> native::PrimitiveTopologyType {
        match self {
            PrimitiveTopology::PointList => native::PrimitiveTopologyType::Point,
            PrimitiveTopology::LineList
            | PrimitiveTopology::LineStrip
            | PrimitiveTopology::LineListAdjacency
            | PrimitiveTopology::LineStripAdjacency => native::PrimitiveTopologyType::Line,
            PrimitiveTopology::TriangleList
            | PrimitiveTopology::TriangleStrip
            | PrimitiveTopology::TriangleListAdjacency
            | PrimitiveTopology::TriangleStripAdjacency => native::PrimitiveTopologyType::Triangle,
            PrimitiveTopology::PatchList => native::PrimitiveTopologyType::Patch,
        }
    }
}

impl IntoD3D12<native::PrimitiveTopology> for PrimitiveTopology {
    fn into_d3d12(self) -> native::PrimitiveTopology {
        match self {
            PrimitiveTopology::PointList => native::PrimitiveTopology::PointList,
            PrimitiveTopology::LineList => native::PrimitiveTopology::LineList,
            PrimitiveTopology::LineStrip => native::PrimitiveTopology::LineStrip,
            PrimitiveTopology::LineListAdjacency => native::PrimitiveTopology::LineListAdj,
            PrimitiveTopology::LineStripAdjacency => native::PrimitiveTopology::LineStripAdj,
            PrimitiveTopology::TriangleList => native::PrimitiveTopology::TriangleList,
            PrimitiveTopology::TriangleStrip => native::PrimitiveTopology::TriangleStrip,
            PrimitiveTopology::TriangleListAdjacency => native::PrimitiveTopology::TriangleListAdj,
            PrimitiveTopology::TriangleStripAdjacency => {
                native::PrimitiveTopology::TriangleStripAdj
            }
            // TODO: carry the control point count in PrimitiveState once hull shaders need more than one.
            PrimitiveTopology::PatchList => native::PrimitiveTopology::ControlPointPatchList1,
        }
    }
}

// --- Binding model ---

impl IntoD3D12<native::DescriptorRangeType> for DescriptorType {
    fn into_d3d12(self) -> native::DescriptorRangeType {
        match self {
            DescriptorType::None => {
                unreachable!("Reserved bindings never produce a descriptor range")
            }
            DescriptorType::Sampler => native::DescriptorRangeType::Sampler,
            DescriptorType::UniformBuffer => native::DescriptorRangeType::Cbv,
            DescriptorType::StorageBuffer
            | DescriptorType::SampledTexture
            | DescriptorType::StorageTexture => native::DescriptorRangeType::Srv,
            DescriptorType::RwStorageBuffer | DescriptorType::RwStorageTexture => {
                native::DescriptorRangeType::Uav
            }
        }
    }
}

impl IntoD3D12<native::ShaderVisibility> for ShaderStage {
    fn into_d3d12(self) -> native::ShaderVisibility {
        match self {
            ShaderStage::Vertex => native::ShaderVisibility::Vertex,
            ShaderStage::TessellationControl => native::ShaderVisibility::Hull,
            ShaderStage::TessellationEvaluation => native::ShaderVisibility::Domain,
            ShaderStage::Geometry => native::ShaderVisibility::Geometry,
            ShaderStage::Fragment => native::ShaderVisibility::Pixel,
            ShaderStage::Compute => native::ShaderVisibility::All,
        }
    }
}

// --- Samplers ---

impl IntoD3D12<native::FilterType> for FilterMode {
    fn into_d3d12(self) -> native::FilterType {
        match self {
            FilterMode::Nearest => native::FilterType::Point,
            FilterMode::Linear => native::FilterType::Linear,
        }
    }
}

impl IntoD3D12<native::FilterType> for MipmapFilterMode {
    fn into_d3d12(self) -> native::FilterType {
        match self {
            MipmapFilterMode::Nearest => native::FilterType::Point,
            MipmapFilterMode::Linear => native::FilterType::Linear,
        }
    }
}

impl IntoD3D12<native::TextureAddressMode> for AddressMode {
    fn into_d3d12(self) -> native::TextureAddressMode {
        match self {
            AddressMode::Repeat => native::TextureAddressMode::Wrap,
            AddressMode::MirrorRepeat => native::TextureAddressMode::Mirror,
            AddressMode::ClampToEdge => native::TextureAddressMode::Clamp,
            AddressMode::ClampToBorder => native::TextureAddressMode::Border,
        }
    }
}

impl IntoD3D12<native::StaticBorderColor> for BorderColor {
    fn into_d3d12(self) -> native::StaticBorderColor {
        match self {
            BorderColor::TransparentBlack => native::StaticBorderColor::TransparentBlack,
            BorderColor::OpaqueBlack => native::StaticBorderColor::OpaqueBlack,
            BorderColor::OpaqueWhite => native::StaticBorderColor::OpaqueWhite,
        }
    }
}

// --- Resources ---

impl IntoD3D12<native::DxgiFormat> for ResourceFormat {
    fn into_d3d12(self) -> native::DxgiFormat {
        use native::DxgiFormat as F;
        match self {
            ResourceFormat::Undefined => F::UNKNOWN,
            ResourceFormat::R8Unorm => F::R8_UNORM,
            ResourceFormat::R8Snorm => F::R8_SNORM,
            ResourceFormat::R8Uint => F::R8_UINT,
            ResourceFormat::R8Sint => F::R8_SINT,
            ResourceFormat::Rg8Unorm => F::R8G8_UNORM,
            ResourceFormat::Rg8Snorm => F::R8G8_SNORM,
            ResourceFormat::Rg8Uint => F::R8G8_UINT,
            ResourceFormat::Rg8Sint => F::R8G8_SINT,
            ResourceFormat::Rgba8Unorm => F::R8G8B8A8_UNORM,
            ResourceFormat::Rgba8UnormSrgb => F::R8G8B8A8_UNORM_SRGB,
            ResourceFormat::Rgba8Snorm => F::R8G8B8A8_SNORM,
            ResourceFormat::Rgba8Uint => F::R8G8B8A8_UINT,
            ResourceFormat::Rgba8Sint => F::R8G8B8A8_SINT,
            ResourceFormat::Bgra8Unorm => F::B8G8R8A8_UNORM,
            ResourceFormat::Bgra8UnormSrgb => F::B8G8R8A8_UNORM_SRGB,
            ResourceFormat::R16Float => F::R16_FLOAT,
            ResourceFormat::R16Uint => F::R16_UINT,
            ResourceFormat::R16Sint => F::R16_SINT,
            ResourceFormat::R16Unorm => F::R16_UNORM,
            ResourceFormat::Rg16Float => F::R16G16_FLOAT,
            ResourceFormat::Rg16Uint => F::R16G16_UINT,
            ResourceFormat::Rg16Sint => F::R16G16_SINT,
            ResourceFormat::Rgba16Float => F::R16G16B16A16_FLOAT,
            ResourceFormat::Rgba16Uint => F::R16G16B16A16_UINT,
            ResourceFormat::Rgba16Sint => F::R16G16B16A16_SINT,
            ResourceFormat::Rgba16Unorm => F::R16G16B16A16_UNORM,
            ResourceFormat::R32Float => F::R32_FLOAT,
            ResourceFormat::R32Uint => F::R32_UINT,
            ResourceFormat::R32Sint => F::R32_SINT,
            ResourceFormat::Rg32Float => F::R32G32_FLOAT,
            ResourceFormat::Rg32Uint => F::R32G32_UINT,
            ResourceFormat::Rg32Sint => F::R32G32_SINT,
            ResourceFormat::Rgb32Float => F::R32G32B32_FLOAT,
            ResourceFormat::Rgb32Uint => F::R32G32B32_UINT,
            ResourceFormat::Rgb32Sint => F::R32G32B32_SINT,
            ResourceFormat::Rgba32Float => F::R32G32B32A32_FLOAT,
            ResourceFormat::Rgba32Uint => F::R32G32B32A32_UINT,
            ResourceFormat::Rgba32Sint => F::R32G32B32A32_SINT,
            ResourceFormat::Rgb10A2Unorm => F::R10G10B10A2_UNORM,
            ResourceFormat::Rg11B10Float => F::R11G11B10_FLOAT,
            ResourceFormat::Depth16Unorm => F::D16_UNORM,
            ResourceFormat::Depth24UnormStencil8 => F::D24_UNORM_S8_UINT,
            ResourceFormat::Depth32Float => F::D32_FLOAT,
            ResourceFormat::Depth32FloatStencil8 => F::D32_FLOAT_S8X24_UINT,
        }
    }
}

/// The format a shader reads a texture through. Depth formats are not
/// readable as-is and map to their color-compatible equivalent. A view of the
/// stencil aspect alone reads the stencil plane.
pub fn shader_resource_format(format: ResourceFormat, aspects: FormatAspects) -> native::DxgiFormat {
    if aspects == FormatAspects::STENCIL {
        match format {
            ResourceFormat::Depth24UnormStencil8 => return native::DxgiFormat::X24_TYPELESS_G8_UINT,
            ResourceFormat::Depth32FloatStencil8 => {
                return native::DxgiFormat::X32_TYPELESS_G8X24_UINT
            }
            _ => {}
        }
    }
    match format {
        ResourceFormat::Depth16Unorm => native::DxgiFormat::R16_UNORM,
        ResourceFormat::Depth24UnormStencil8 => native::DxgiFormat::R24_UNORM_X8_TYPELESS,
        ResourceFormat::Depth32Float => native::DxgiFormat::R32_FLOAT,
        ResourceFormat::Depth32FloatStencil8 => native::DxgiFormat::R32_FLOAT_X8X24_TYPELESS,
        other => other.into_d3d12(),
    }
}

impl IntoD3D12<native::SrvDimension> for TextureViewDimension {
    fn into_d3d12(self) -> native::SrvDimension {
        match self {
            TextureViewDimension::D1 => native::SrvDimension::Texture1D,
            TextureViewDimension::D1Array => native::SrvDimension::Texture1DArray,
            TextureViewDimension::D2 => native::SrvDimension::Texture2D,
            TextureViewDimension::D2Array => native::SrvDimension::Texture2DArray,
            TextureViewDimension::Cube => native::SrvDimension::TextureCube,
            TextureViewDimension::CubeArray => native::SrvDimension::TextureCubeArray,
            TextureViewDimension::D3 => native::SrvDimension::Texture3D,
        }
    }
}

impl IntoD3D12<native::ResourceDimension> for TextureDimension {
    fn into_d3d12(self) -> native::ResourceDimension {
        match self {
            TextureDimension::D1 => native::ResourceDimension::Texture1D,
            TextureDimension::D2 => native::ResourceDimension::Texture2D,
            TextureDimension::D3 => native::ResourceDimension::Texture3D,
        }
    }
}

impl IntoD3D12<native::HeapType> for MemoryLocation {
    fn into_d3d12(self) -> native::HeapType {
        match self {
            MemoryLocation::GpuOnly => native::HeapType::Default,
            MemoryLocation::CpuToGpu => native::HeapType::Upload,
            MemoryLocation::GpuToCpu => native::HeapType::Readback,
        }
    }
}
