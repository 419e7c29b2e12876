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

use ash::vk;
use aether_core::renderer::api::pipeline::enums::{
    BlendFactor, BlendOperation, CompareFunction, CullMode, FrontFace, PolygonMode,
    PrimitiveTopology, StencilOperation,
};
use aether_core::renderer::api::pipeline::layout::DescriptorType;
use aether_core::renderer::api::pipeline::state::{ColorWrites, StencilFaceState};
use aether_core::renderer::api::resource::buffer::BufferUsage;
use aether_core::renderer::api::resource::sampler::{
    AddressMode, BorderColor, FilterMode, MipmapFilterMode,
};
use aether_core::renderer::api::resource::texture::{
    TextureDimension, TextureUsage, TextureViewDimension,
};
use aether_core::renderer::api::util::enums::{FormatAspects, ResourceFormat, ShaderStage};

/// A local extension trait to convert our engine's types into `ash::vk` values.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_vulkan()` syntax.
pub trait IntoVulkan<T> {
    /// Consumes self and converts it into a Vulkan-compatible value.
    fn into_vulkan(self) -> T;
}

// --- Blend state ---

impl IntoVulkan<vk::BlendOp> for BlendOperation {
    fn into_vulkan(self) -> vk::BlendOp {
        match self {
            BlendOperation::Add => vk::BlendOp::ADD,
            BlendOperation::Subtract => vk::BlendOp::SUBTRACT,
            BlendOperation::ReverseSubtract => vk::BlendOp::REVERSE_SUBTRACT,
            BlendOperation::Min => vk::BlendOp::MIN,
            BlendOperation::Max => vk::BlendOp::MAX,
        }
    }
}

impl IntoVulkan<vk::BlendFactor> for BlendFactor {
    fn into_vulkan(self) -> vk::BlendFactor {
        match self {
            BlendFactor::Zero => vk::BlendFactor::ZERO,
            BlendFactor::One => vk::BlendFactor::ONE,
            BlendFactor::Src => vk::BlendFactor::SRC_COLOR,
            BlendFactor::OneMinusSrc => vk::BlendFactor::ONE_MINUS_SRC_COLOR,
            BlendFactor::SrcAlpha => vk::BlendFactor::SRC_ALPHA,
            BlendFactor::OneMinusSrcAlpha => vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
            BlendFactor::Dst => vk::BlendFactor::DST_COLOR,
            BlendFactor::OneMinusDst => vk::BlendFactor::ONE_MINUS_DST_COLOR,
            BlendFactor::DstAlpha => vk::BlendFactor::DST_ALPHA,
            BlendFactor::OneMinusDstAlpha => vk::BlendFactor::ONE_MINUS_DST_ALPHA,
            BlendFactor::SrcAlphaSaturated => vk::BlendFactor::SRC_ALPHA_SATURATE,
            BlendFactor::Constant => vk::BlendFactor::CONSTANT_COLOR,
            BlendFactor::OneMinusConstant => vk::BlendFactor::ONE_MINUS_CONSTANT_COLOR,
        }
    }
}

impl IntoVulkan<vk::ColorComponentFlags> for ColorWrites {
    fn into_vulkan(self) -> vk::ColorComponentFlags {
        let mut flags = vk::ColorComponentFlags::empty();
        if self.contains(ColorWrites::R) {
            flags |= vk::ColorComponentFlags::R;
        }
        if self.contains(ColorWrites::G) {
            flags |= vk::ColorComponentFlags::G;
        }
        if self.contains(ColorWrites::B) {
            flags |= vk::ColorComponentFlags::B;
        }
        if self.contains(ColorWrites::A) {
            flags |= vk::ColorComponentFlags::A;
        }
        flags
    }
}

// --- Rasterizer ---

impl IntoVulkan<vk::PolygonMode> for PolygonMode {
    fn into_vulkan(self) -> vk::PolygonMode {
        match self {
            PolygonMode::Fill => vk::PolygonMode::FILL,
            PolygonMode::Line => vk::PolygonMode::LINE,
            PolygonMode::Point => vk::PolygonMode::POINT,
        }
    }
}

impl IntoVulkan<vk::CullModeFlags> for CullMode {
    fn into_vulkan(self) -> vk::CullModeFlags {
        match self {
            CullMode::None => vk::CullModeFlags::NONE,
            CullMode::Front => vk::CullModeFlags::FRONT,
            CullMode::Back => vk::CullModeFlags::BACK,
        }
    }
}

impl IntoVulkan<vk::FrontFace> for FrontFace {
    fn into_vulkan(self) -> vk::FrontFace {
        match self {
            FrontFace::Ccw => vk::FrontFace::COUNTER_CLOCKWISE,
            FrontFace::Cw => vk::FrontFace::CLOCKWISE,
        }
    }
}

// --- Depth / stencil ---

impl IntoVulkan<vk::StencilOp> for StencilOperation {
    fn into_vulkan(self) -> vk::StencilOp {
        match self {
            StencilOperation::Keep => vk::StencilOp::KEEP,
            StencilOperation::Zero => vk::StencilOp::ZERO,
            StencilOperation::Replace => vk::StencilOp::REPLACE,
            StencilOperation::Invert => vk::StencilOp::INVERT,
            StencilOperation::IncrementClamp => vk::StencilOp::INCREMENT_AND_CLAMP,
            StencilOperation::DecrementClamp => vk::StencilOp::DECREMENT_AND_CLAMP,
            StencilOperation::IncrementWrap => vk::StencilOp::INCREMENT_AND_WRAP,
            StencilOperation::DecrementWrap => vk::StencilOp::DECREMENT_AND_WRAP,
        }
    }
}

impl IntoVulkan<vk::CompareOp> for CompareFunction {
    fn into_vulkan(self) -> vk::CompareOp {
        match self {
            CompareFunction::Never => vk::CompareOp::NEVER,
            CompareFunction::Less => vk::CompareOp::LESS,
            CompareFunction::Equal => vk::CompareOp::EQUAL,
            CompareFunction::LessEqual => vk::CompareOp::LESS_OR_EQUAL,
            CompareFunction::Greater => vk::CompareOp::GREATER,
            CompareFunction::NotEqual => vk::CompareOp::NOT_EQUAL,
            CompareFunction::GreaterEqual => vk::CompareOp::GREATER_OR_EQUAL,
            CompareFunction::Always => vk::CompareOp::ALWAYS,
        }
    }
}

/// The stencil state of one face. Masks are shared by both faces; the reference
/// value is dynamic.
pub fn stencil_op_state(face: &StencilFaceState, read_mask: u8, write_mask: u8) -> vk::StencilOpState {
    vk::StencilOpState {
        fail_op: face.fail_op.into_vulkan(),
        pass_op: face.pass_op.into_vulkan(),
        depth_fail_op: face.depth_fail_op.into_vulkan(),
        compare_op: face.compare.into_vulkan(),
        compare_mask: u32::from(read_mask),
        write_mask: u32::from(write_mask),
        reference: 0,
    }
}

impl IntoVulkan<vk::PrimitiveTopology> for PrimitiveTopology {
    fn into_vulkan(self) -> vk::PrimitiveTopology {
        match self {
            PrimitiveTopology::PointList => vk::PrimitiveTopology::POINT_LIST,
            PrimitiveTopology::LineList => vk::PrimitiveTopology::LINE_LIST,
            PrimitiveTopology::LineStrip => vk::PrimitiveTopology::LINE_STRIP,
            PrimitiveTopology::LineListAdjacency => {
                vk::PrimitiveTopology::LINE_LIST_WITH_ADJACENCY
            }
            PrimitiveTopology::LineStripAdjacency => {
                vk::PrimitiveTopology::LINE_STRIP_WITH_ADJACENCY
            }
            PrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
            PrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
            PrimitiveTopology::TriangleListAdjacency => {
                vk::PrimitiveTopology::TRIANGLE_LIST_WITH_ADJACENCY
            }
            PrimitiveTopology::TriangleStripAdjacency => {
                vk::PrimitiveTopology::TRIANGLE_STRIP_WITH_ADJACENCY
            }
            PrimitiveTopology::PatchList => vk::PrimitiveTopology::PATCH_LIST,
        }
    }
}

// --- Layout ---

impl IntoVulkan<vk::DescriptorType> for DescriptorType {
    fn into_vulkan(self) -> vk::DescriptorType {
        match self {
            DescriptorType::Sampler => vk::DescriptorType::SAMPLER,
            DescriptorType::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
            DescriptorType::StorageBuffer | DescriptorType::RwStorageBuffer => {
                vk::DescriptorType::STORAGE_BUFFER
            }
            DescriptorType::SampledTexture => vk::DescriptorType::SAMPLED_IMAGE,
            DescriptorType::StorageTexture | DescriptorType::RwStorageTexture => {
                vk::DescriptorType::STORAGE_IMAGE
            }
            DescriptorType::None => unreachable!("reserved bindings have no descriptor type"),
        }
    }
}

impl IntoVulkan<vk::ShaderStageFlags> for ShaderStage {
    fn into_vulkan(self) -> vk::ShaderStageFlags {
        match self {
            ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
            ShaderStage::TessellationControl => vk::ShaderStageFlags::TESSELLATION_CONTROL,
            ShaderStage::TessellationEvaluation => vk::ShaderStageFlags::TESSELLATION_EVALUATION,
            ShaderStage::Geometry => vk::ShaderStageFlags::GEOMETRY,
            ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
            ShaderStage::Compute => vk::ShaderStageFlags::COMPUTE,
        }
    }
}

// --- Samplers ---

impl IntoVulkan<vk::Filter> for FilterMode {
    fn into_vulkan(self) -> vk::Filter {
        match self {
            FilterMode::Nearest => vk::Filter::NEAREST,
            FilterMode::Linear => vk::Filter::LINEAR,
        }
    }
}

impl IntoVulkan<vk::SamplerMipmapMode> for MipmapFilterMode {
    fn into_vulkan(self) -> vk::SamplerMipmapMode {
        match self {
            MipmapFilterMode::Nearest => vk::SamplerMipmapMode::NEAREST,
            MipmapFilterMode::Linear => vk::SamplerMipmapMode::LINEAR,
        }
    }
}

impl IntoVulkan<vk::SamplerAddressMode> for AddressMode {
    fn into_vulkan(self) -> vk::SamplerAddressMode {
        match self {
            AddressMode::Repeat => vk::SamplerAddressMode::REPEAT,
            AddressMode::MirrorRepeat => vk::SamplerAddressMode::MIRRORED_REPEAT,
            AddressMode::ClampToEdge => vk::SamplerAddressMode::CLAMP_TO_EDGE,
            AddressMode::ClampToBorder => vk::SamplerAddressMode::CLAMP_TO_BORDER,
        }
    }
}

impl IntoVulkan<vk::BorderColor> for BorderColor {
    fn into_vulkan(self) -> vk::BorderColor {
        match self {
            BorderColor::TransparentBlack => vk::BorderColor::FLOAT_TRANSPARENT_BLACK,
            BorderColor::OpaqueBlack => vk::BorderColor::FLOAT_OPAQUE_BLACK,
            BorderColor::OpaqueWhite => vk::BorderColor::FLOAT_OPAQUE_WHITE,
        }
    }
}

// --- Resources ---

impl IntoVulkan<vk::Format> for ResourceFormat {
    fn into_vulkan(self) -> vk::Format {
        match self {
            ResourceFormat::Undefined => vk::Format::UNDEFINED,
            ResourceFormat::R8Unorm => vk::Format::R8_UNORM,
            ResourceFormat::R8Snorm => vk::Format::R8_SNORM,
            ResourceFormat::R8Uint => vk::Format::R8_UINT,
            ResourceFormat::R8Sint => vk::Format::R8_SINT,
            ResourceFormat::Rg8Unorm => vk::Format::R8G8_UNORM,
            ResourceFormat::Rg8Snorm => vk::Format::R8G8_SNORM,
            ResourceFormat::Rg8Uint => vk::Format::R8G8_UINT,
            ResourceFormat::Rg8Sint => vk::Format::R8G8_SINT,
            ResourceFormat::Rgba8Unorm => vk::Format::R8G8B8A8_UNORM,
            ResourceFormat::Rgba8UnormSrgb => vk::Format::R8G8B8A8_SRGB,
            ResourceFormat::Rgba8Snorm => vk::Format::R8G8B8A8_SNORM,
            ResourceFormat::Rgba8Uint => vk::Format::R8G8B8A8_UINT,
            ResourceFormat::Rgba8Sint => vk::Format::R8G8B8A8_SINT,
            ResourceFormat::Bgra8Unorm => vk::Format::B8G8R8A8_UNORM,
            ResourceFormat::Bgra8UnormSrgb => vk::Format::B8G8R8A8_SRGB,
            ResourceFormat::R16Float => vk::Format::R16_SFLOAT,
            ResourceFormat::R16Uint => vk::Format::R16_UINT,
            ResourceFormat::R16Sint => vk::Format::R16_SINT,
            ResourceFormat::R16Unorm => vk::Format::R16_UNORM,
            ResourceFormat::Rg16Float => vk::Format::R16G16_SFLOAT,
            ResourceFormat::Rg16Uint => vk::Format::R16G16_UINT,
            ResourceFormat::Rg16Sint => vk::Format::R16G16_SINT,
            ResourceFormat::Rgba16Float => vk::Format::R16G16B16A16_SFLOAT,
            ResourceFormat::Rgba16Uint => vk::Format::R16G16B16A16_UINT,
            ResourceFormat::Rgba16Sint => vk::Format::R16G16B16A16_SINT,
            ResourceFormat::Rgba16Unorm => vk::Format::R16G16B16A16_UNORM,
            ResourceFormat::R32Float => vk::Format::R32_SFLOAT,
            ResourceFormat::R32Uint => vk::Format::R32_UINT,
            ResourceFormat::R32Sint => vk::Format::R32_SINT,
            ResourceFormat::Rg32Float => vk::Format::R32G32_SFLOAT,
            ResourceFormat::Rg32Uint => vk::Format::R32G32_UINT,
            ResourceFormat::Rg32Sint => vk::Format::R32G32_SINT,
            ResourceFormat::Rgb32Float => vk::Format::R32G32B32_SFLOAT,
            ResourceFormat::Rgb32Uint => vk::Format::R32G32B32_UINT,
            ResourceFormat::Rgb32Sint => vk::Format::R32G32B32_SINT,
            ResourceFormat::Rgba32Float => vk::Format::R32G32B32A32_SFLOAT,
            ResourceFormat::Rgba32Uint => vk::Format::R32G32B32A32_UINT,
            ResourceFormat::Rgba32Sint => vk::Format::R32G32B32A32_SINT,
            ResourceFormat::Rgb10A2Unorm => vk::Format::A2B10G10R10_UNORM_PACK32,
            ResourceFormat::Rg11B10Float => vk::Format::B10G11R11_UFLOAT_PACK32,
            ResourceFormat::Depth16Unorm => vk::Format::D16_UNORM,
            ResourceFormat::Depth24UnormStencil8 => vk::Format::D24_UNORM_S8_UINT,
            ResourceFormat::Depth32Float => vk::Format::D32_SFLOAT,
            ResourceFormat::Depth32FloatStencil8 => vk::Format::D32_SFLOAT_S8_UINT,
        }
    }
}

impl IntoVulkan<vk::ImageViewType> for TextureViewDimension {
    fn into_vulkan(self) -> vk::ImageViewType {
        match self {
            TextureViewDimension::D1 => vk::ImageViewType::TYPE_1D,
            TextureViewDimension::D1Array => vk::ImageViewType::TYPE_1D_ARRAY,
            TextureViewDimension::D2 => vk::ImageViewType::TYPE_2D,
            TextureViewDimension::D2Array => vk::ImageViewType::TYPE_2D_ARRAY,
            TextureViewDimension::Cube => vk::ImageViewType::CUBE,
            TextureViewDimension::CubeArray => vk::ImageViewType::CUBE_ARRAY,
            TextureViewDimension::D3 => vk::ImageViewType::TYPE_3D,
        }
    }
}

impl IntoVulkan<vk::ImageType> for TextureDimension {
    fn into_vulkan(self) -> vk::ImageType {
        match self {
            TextureDimension::D1 => vk::ImageType::TYPE_1D,
            TextureDimension::D2 => vk::ImageType::TYPE_2D,
            TextureDimension::D3 => vk::ImageType::TYPE_3D,
        }
    }
}

impl IntoVulkan<vk::BufferUsageFlags> for BufferUsage {
    fn into_vulkan(self) -> vk::BufferUsageFlags {
        let mut flags = vk::BufferUsageFlags::empty();
        if self.contains(BufferUsage::COPY_SRC) {
            flags |= vk::BufferUsageFlags::TRANSFER_SRC;
        }
        if self.contains(BufferUsage::COPY_DST) {
            flags |= vk::BufferUsageFlags::TRANSFER_DST;
        }
        if self.contains(BufferUsage::VERTEX) {
            flags |= vk::BufferUsageFlags::VERTEX_BUFFER;
        }
        if self.contains(BufferUsage::INDEX) {
            flags |= vk::BufferUsageFlags::INDEX_BUFFER;
        }
        if self.contains(BufferUsage::UNIFORM) {
            flags |= vk::BufferUsageFlags::UNIFORM_BUFFER;
        }
        if self.contains(BufferUsage::STORAGE) {
            flags |= vk::BufferUsageFlags::STORAGE_BUFFER;
        }
        if self.contains(BufferUsage::INDIRECT) {
            flags |= vk::BufferUsageFlags::INDIRECT_BUFFER;
        }
        flags
    }
}

impl IntoVulkan<vk::ImageUsageFlags> for TextureUsage {
    fn into_vulkan(self) -> vk::ImageUsageFlags {
        let mut flags = vk::ImageUsageFlags::empty();
        if self.contains(TextureUsage::COPY_SRC) {
            flags |= vk::ImageUsageFlags::TRANSFER_SRC;
        }
        if self.contains(TextureUsage::COPY_DST) {
            flags |= vk::ImageUsageFlags::TRANSFER_DST;
        }
        if self.contains(TextureUsage::TEXTURE_BINDING) {
            flags |= vk::ImageUsageFlags::SAMPLED;
        }
        if self.contains(TextureUsage::STORAGE_BINDING) {
            flags |= vk::ImageUsageFlags::STORAGE;
        }
        if self.contains(TextureUsage::RENDER_ATTACHMENT) {
            flags |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
        }
        if self.contains(TextureUsage::DEPTH_STENCIL_ATTACHMENT) {
            flags |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
        }
        flags
    }
}

impl IntoVulkan<vk::ImageAspectFlags> for FormatAspects {
    fn into_vulkan(self) -> vk::ImageAspectFlags {
        let mut flags = vk::ImageAspectFlags::empty();
        if self.contains(FormatAspects::COLOR) {
            flags |= vk::ImageAspectFlags::COLOR;
        }
        if self.contains(FormatAspects::DEPTH) {
            flags |= vk::ImageAspectFlags::DEPTH;
        }
        if self.contains(FormatAspects::STENCIL) {
            flags |= vk::ImageAspectFlags::STENCIL;
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_types_collapse_read_write_variants() {
        assert_eq!(
            DescriptorType::RwStorageBuffer.into_vulkan(),
            vk::DescriptorType::STORAGE_BUFFER
        );
        assert_eq!(
            DescriptorType::StorageTexture.into_vulkan(),
            vk::DescriptorType::STORAGE_IMAGE
        );
        assert_eq!(
            DescriptorType::SampledTexture.into_vulkan(),
            vk::DescriptorType::SAMPLED_IMAGE
        );
    }

    #[test]
    #[should_panic]
    fn reserved_binding_has_no_descriptor_type() {
        let _: vk::DescriptorType = DescriptorType::None.into_vulkan();
    }

    #[test]
    fn write_mask_translation() {
        let mask: vk::ColorComponentFlags = (ColorWrites::R | ColorWrites::A).into_vulkan();
        assert_eq!(mask, vk::ColorComponentFlags::R | vk::ColorComponentFlags::A);
        let all: vk::ColorComponentFlags = ColorWrites::ALL.into_vulkan();
        assert_eq!(all, vk::ColorComponentFlags::RGBA);
    }

    #[test]
    fn depth_stencil_aspects() {
        let aspects: vk::ImageAspectFlags =
            ResourceFormat::Depth24UnormStencil8.aspects().into_vulkan();
        assert_eq!(
            aspects,
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        );
    }
}
