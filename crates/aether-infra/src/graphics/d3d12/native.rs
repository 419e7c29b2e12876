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

//! Native D3D12 and DXGI descriptions.
//!
//! These mirror the layout and enumerant values of the corresponding `D3D12_*` and
//! `DXGI_*` structures. Pointers and counts are replaced by owned collections so that
//! a description can be recorded, compared and handed across the raw device boundary.

use bitflags::bitflags;
use std::fmt;
use std::sync::Arc;

/// An opaque native object (root signature, pipeline state, resource).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawHandle(pub u64);

/// A CPU descriptor handle inside one of the device's descriptor heaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorHandle(pub u64);

/// Compiled shader bytecode shared between a module and the pipelines using it.
pub type ShaderBytecode = Arc<[u8]>;

/// A failed `HRESULT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HResult(pub i32);

impl HResult {
    /// `E_INVALIDARG`
    pub const INVALID_ARG: HResult = HResult(0x8007_0057_u32 as i32);
    /// `E_OUTOFMEMORY`
    pub const OUT_OF_MEMORY: HResult = HResult(0x8007_000E_u32 as i32);
    /// `E_FAIL`
    pub const FAIL: HResult = HResult(0x8000_4005_u32 as i32);
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HRESULT 0x{:08X}", self.0 as u32)
    }
}

impl std::error::Error for HResult {}

/// `D3D12_DESCRIPTOR_RANGE_OFFSET_APPEND`
pub const DESCRIPTOR_RANGE_OFFSET_APPEND: u32 = 0xffff_ffff;

/// `D3D12_SIMULTANEOUS_RENDER_TARGET_COUNT`
pub const SIMULTANEOUS_RENDER_TARGET_COUNT: usize = 8;

// --- Formats ---

/// `DXGI_FORMAT`
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum DxgiFormat {
    #[default]
    UNKNOWN = 0,
    R32G32B32A32_FLOAT = 2,
    R32G32B32A32_UINT = 3,
    R32G32B32A32_SINT = 4,
    R32G32B32_FLOAT = 6,
    R32G32B32_UINT = 7,
    R32G32B32_SINT = 8,
    R16G16B16A16_FLOAT = 10,
    R16G16B16A16_UNORM = 11,
    R16G16B16A16_UINT = 12,
    R16G16B16A16_SINT = 14,
    R32G32_FLOAT = 16,
    R32G32_UINT = 17,
    R32G32_SINT = 18,
    D32_FLOAT_S8X24_UINT = 20,
    R32_FLOAT_X8X24_TYPELESS = 21,
    X32_TYPELESS_G8X24_UINT = 22,
    R10G10B10A2_UNORM = 24,
    R11G11B10_FLOAT = 26,
    R8G8B8A8_UNORM = 28,
    R8G8B8A8_UNORM_SRGB = 29,
    R8G8B8A8_UINT = 30,
    R8G8B8A8_SNORM = 31,
    R8G8B8A8_SINT = 32,
    R16G16_FLOAT = 34,
    R16G16_UINT = 36,
    R16G16_SINT = 38,
    D32_FLOAT = 40,
    R32_FLOAT = 41,
    R32_UINT = 42,
    R32_SINT = 43,
    D24_UNORM_S8_UINT = 45,
    R24_UNORM_X8_TYPELESS = 46,
    X24_TYPELESS_G8_UINT = 47,
    R8G8_UNORM = 49,
    R8G8_UINT = 50,
    R8G8_SNORM = 51,
    R8G8_SINT = 52,
    R16_FLOAT = 54,
    D16_UNORM = 55,
    R16_UNORM = 56,
    R16_UINT = 57,
    R16_SINT = 59,
    R8_UNORM = 61,
    R8_UINT = 62,
    R8_SNORM = 63,
    R8_SINT = 64,
    B8G8R8A8_UNORM = 87,
    B8G8R8A8_UNORM_SRGB = 91,
}

// --- Root signature ---

/// `D3D12_DESCRIPTOR_RANGE_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DescriptorRangeType {
    Srv = 0,
    Uav = 1,
    Cbv = 2,
    Sampler = 3,
}

/// `D3D12_SHADER_VISIBILITY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum ShaderVisibility {
    #[default]
    All = 0,
    Vertex = 1,
    Hull = 2,
    Domain = 3,
    Geometry = 4,
    Pixel = 5,
}

/// `D3D12_DESCRIPTOR_RANGE1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorRange {
    pub range_type: DescriptorRangeType,
    pub num_descriptors: u32,
    pub base_shader_register: u32,
    pub register_space: u32,
    pub offset_in_descriptors_from_table_start: u32,
}

/// `D3D12_ROOT_PARAMETER1`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootParameter {
    /// `D3D12_ROOT_PARAMETER_TYPE_DESCRIPTOR_TABLE`
    DescriptorTable {
        ranges: Vec<DescriptorRange>,
        visibility: ShaderVisibility,
    },
    /// `D3D12_ROOT_PARAMETER_TYPE_32BIT_CONSTANTS`
    Constants {
        shader_register: u32,
        register_space: u32,
        num_32bit_values: u32,
        visibility: ShaderVisibility,
    },
}

bitflags! {
    /// `D3D12_ROOT_SIGNATURE_FLAGS`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RootSignatureFlags: u32 {
        const ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT = 0x1;
    }
}

/// `D3D12_FILTER`, built with the `D3D12_ENCODE_*` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Filter(pub u32);

/// `D3D12_FILTER_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum FilterType {
    Point = 0,
    Linear = 1,
}

impl Filter {
    const REDUCTION_SHIFT: u32 = 7;
    const COMPARISON_REDUCTION: u32 = 1;
    const ANISOTROPIC_BITS: u32 = 0x55;

    /// `D3D12_ENCODE_BASIC_FILTER`
    pub fn basic(min: FilterType, mag: FilterType, mip: FilterType, comparison: bool) -> Self {
        let reduction = if comparison {
            Self::COMPARISON_REDUCTION
        } else {
            0
        };
        Filter(
            ((min as u32 & 3) << 4)
                | ((mag as u32 & 3) << 2)
                | (mip as u32 & 3)
                | (reduction << Self::REDUCTION_SHIFT),
        )
    }

    /// `D3D12_ENCODE_ANISOTROPIC_FILTER`
    pub fn anisotropic(comparison: bool) -> Self {
        let reduction = if comparison {
            Self::COMPARISON_REDUCTION
        } else {
            0
        };
        Filter(Self::ANISOTROPIC_BITS | (reduction << Self::REDUCTION_SHIFT))
    }
}

/// `D3D12_TEXTURE_ADDRESS_MODE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureAddressMode {
    Wrap = 1,
    Mirror = 2,
    Clamp = 3,
    Border = 4,
}

/// `D3D12_COMPARISON_FUNC`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ComparisonFunc {
    Never = 1,
    Less = 2,
    Equal = 3,
    LessEqual = 4,
    Greater = 5,
    NotEqual = 6,
    GreaterEqual = 7,
    Always = 8,
}

/// `D3D12_STATIC_BORDER_COLOR`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum StaticBorderColor {
    TransparentBlack = 0,
    OpaqueBlack = 1,
    OpaqueWhite = 2,
}

impl StaticBorderColor {
    /// The RGBA value used by runtime samplers.
    pub fn rgba(&self) -> [f32; 4] {
        match self {
            StaticBorderColor::TransparentBlack => [0.0, 0.0, 0.0, 0.0],
            StaticBorderColor::OpaqueBlack => [0.0, 0.0, 0.0, 1.0],
            StaticBorderColor::OpaqueWhite => [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// `D3D12_SAMPLER_DESC`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDesc {
    pub filter: Filter,
    pub address_u: TextureAddressMode,
    pub address_v: TextureAddressMode,
    pub address_w: TextureAddressMode,
    pub mip_lod_bias: f32,
    pub max_anisotropy: u32,
    pub comparison_func: ComparisonFunc,
    pub border_color: [f32; 4],
    pub min_lod: f32,
    pub max_lod: f32,
}

/// `D3D12_STATIC_SAMPLER_DESC`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticSamplerDesc {
    pub filter: Filter,
    pub address_u: TextureAddressMode,
    pub address_v: TextureAddressMode,
    pub address_w: TextureAddressMode,
    pub mip_lod_bias: f32,
    pub max_anisotropy: u32,
    pub comparison_func: ComparisonFunc,
    pub border_color: StaticBorderColor,
    pub min_lod: f32,
    pub max_lod: f32,
    pub shader_register: u32,
    pub register_space: u32,
    pub shader_visibility: ShaderVisibility,
}

/// `D3D12_VERSIONED_ROOT_SIGNATURE_DESC` at `D3D_ROOT_SIGNATURE_VERSION_1_1`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RootSignatureDesc {
    pub parameters: Vec<RootParameter>,
    pub static_samplers: Vec<StaticSamplerDesc>,
    pub flags: RootSignatureFlags,
}

// --- Pipeline state ---

/// `D3D12_BLEND`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Blend {
    Zero = 1,
    One = 2,
    SrcColor = 3,
    InvSrcColor = 4,
    SrcAlpha = 5,
    InvSrcAlpha = 6,
    DestAlpha = 7,
    InvDestAlpha = 8,
    DestColor = 9,
    InvDestColor = 10,
    SrcAlphaSat = 11,
    BlendFactor = 14,
    InvBlendFactor = 15,
}

/// `D3D12_BLEND_OP`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BlendOp {
    Add = 1,
    Subtract = 2,
    RevSubtract = 3,
    Min = 4,
    Max = 5,
}

/// `D3D12_LOGIC_OP`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum LogicOp {
    Noop = 4,
}

/// `D3D12_RENDER_TARGET_BLEND_DESC`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetBlendDesc {
    pub blend_enable: bool,
    pub logic_op_enable: bool,
    pub src_blend: Blend,
    pub dest_blend: Blend,
    pub blend_op: BlendOp,
    pub src_blend_alpha: Blend,
    pub dest_blend_alpha: Blend,
    pub blend_op_alpha: BlendOp,
    pub logic_op: LogicOp,
    pub render_target_write_mask: u8,
}

/// `D3D12_BLEND_DESC`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BlendDesc {
    pub alpha_to_coverage_enable: bool,
    pub independent_blend_enable: bool,
    pub render_target: Vec<RenderTargetBlendDesc>,
}

/// `D3D12_FILL_MODE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum FillMode {
    Wireframe = 2,
    Solid = 3,
}

/// `D3D12_CULL_MODE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CullMode {
    None = 1,
    Front = 2,
    Back = 3,
}

/// `D3D12_CONSERVATIVE_RASTERIZATION_MODE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ConservativeRasterizationMode {
    Off = 0,
    On = 1,
}

/// `D3D12_RASTERIZER_DESC`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerDesc {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_counter_clockwise: bool,
    pub depth_bias: i32,
    pub depth_bias_clamp: f32,
    pub slope_scaled_depth_bias: f32,
    pub depth_clip_enable: bool,
    pub multisample_enable: bool,
    pub antialiased_line_enable: bool,
    pub forced_sample_count: u32,
    pub conservative_raster: ConservativeRasterizationMode,
}

/// `D3D12_DEPTH_WRITE_MASK`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DepthWriteMask {
    Zero = 0,
    All = 1,
}

/// `D3D12_STENCIL_OP`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum StencilOp {
    Keep = 1,
    Zero = 2,
    Replace = 3,
    IncrSat = 4,
    DecrSat = 5,
    Invert = 6,
    Incr = 7,
    Decr = 8,
}

/// `D3D12_DEPTH_STENCILOP_DESC`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilOpDesc {
    pub stencil_fail_op: StencilOp,
    pub stencil_depth_fail_op: StencilOp,
    pub stencil_pass_op: StencilOp,
    pub stencil_func: ComparisonFunc,
}

/// `D3D12_DEPTH_STENCIL_DESC`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilDesc {
    pub depth_enable: bool,
    pub depth_write_mask: DepthWriteMask,
    pub depth_func: ComparisonFunc,
    pub stencil_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub front_face: DepthStencilOpDesc,
    pub back_face: DepthStencilOpDesc,
}

/// `D3D12_INPUT_CLASSIFICATION`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum InputClassification {
    PerVertexData = 0,
    PerInstanceData = 1,
}

/// `D3D12_INPUT_ELEMENT_DESC`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputElementDesc {
    pub semantic_name: &'static str,
    pub semantic_index: u32,
    pub format: DxgiFormat,
    pub input_slot: u32,
    pub aligned_byte_offset: u32,
    pub input_slot_class: InputClassification,
    pub instance_data_step_rate: u32,
}

/// `D3D12_PRIMITIVE_TOPOLOGY_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum PrimitiveTopologyType {
    #[default]
    Undefined = 0,
    Point = 1,
    Line = 2,
    Triangle = 3,
    Patch = 4,
}

/// `D3D_PRIMITIVE_TOPOLOGY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum PrimitiveTopology {
    #[default]
    Undefined = 0,
    PointList = 1,
    LineList = 2,
    LineStrip = 3,
    TriangleList = 4,
    TriangleStrip = 5,
    LineListAdj = 10,
    LineStripAdj = 11,
    TriangleListAdj = 12,
    TriangleStripAdj = 13,
    ControlPointPatchList1 = 33,
}

/// `DXGI_SAMPLE_DESC`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleDesc {
    pub count: u32,
    pub quality: u32,
}

/// `D3D12_GRAPHICS_PIPELINE_STATE_DESC`
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsPipelineStateDesc {
    pub root_signature: RawHandle,
    pub vs: ShaderBytecode,
    pub hs: Option<ShaderBytecode>,
    pub ds: Option<ShaderBytecode>,
    pub gs: Option<ShaderBytecode>,
    pub ps: ShaderBytecode,
    pub blend_state: BlendDesc,
    pub sample_mask: u32,
    pub rasterizer_state: RasterizerDesc,
    pub depth_stencil_state: DepthStencilDesc,
    pub input_layout: Vec<InputElementDesc>,
    pub primitive_topology_type: PrimitiveTopologyType,
    pub num_render_targets: u32,
    pub rtv_formats: [DxgiFormat; SIMULTANEOUS_RENDER_TARGET_COUNT],
    pub dsv_format: DxgiFormat,
    pub sample_desc: SampleDesc,
    pub node_mask: u32,
}

/// `D3D12_COMPUTE_PIPELINE_STATE_DESC`
#[derive(Debug, Clone, PartialEq)]
pub struct ComputePipelineStateDesc {
    pub root_signature: RawHandle,
    pub cs: ShaderBytecode,
    pub node_mask: u32,
}

// --- Resources ---

/// `D3D12_HEAP_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum HeapType {
    Default = 1,
    Upload = 2,
    Readback = 3,
}

impl HeapType {
    /// Returns `true` if resources in this heap can be mapped.
    pub fn is_cpu_accessible(&self) -> bool {
        !matches!(self, HeapType::Default)
    }
}

/// `D3D12_RESOURCE_DIMENSION`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResourceDimension {
    Buffer = 1,
    Texture1D = 2,
    Texture2D = 3,
    Texture3D = 4,
}

bitflags! {
    /// `D3D12_RESOURCE_FLAGS`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResourceFlags: u32 {
        const ALLOW_RENDER_TARGET = 0x1;
        const ALLOW_DEPTH_STENCIL = 0x2;
        const ALLOW_UNORDERED_ACCESS = 0x4;
        const DENY_SHADER_RESOURCE = 0x8;
    }
}

/// `D3D12_RESOURCE_DESC`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceDesc {
    pub dimension: ResourceDimension,
    pub width: u64,
    pub height: u32,
    pub depth_or_array_size: u16,
    pub mip_levels: u16,
    pub format: DxgiFormat,
    pub sample_desc: SampleDesc,
    pub flags: ResourceFlags,
}

/// `D3D12_SRV_DIMENSION`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SrvDimension {
    Texture1D = 2,
    Texture1DArray = 3,
    Texture2D = 4,
    Texture2DArray = 5,
    Texture3D = 8,
    TextureCube = 9,
    TextureCubeArray = 10,
}

/// `D3D12_DEFAULT_SHADER_4_COMPONENT_MAPPING`
pub const DEFAULT_SHADER_4_COMPONENT_MAPPING: u32 = 0x1688;

/// `D3D12_SHADER_RESOURCE_VIEW_DESC` for texture views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderResourceViewDesc {
    pub format: DxgiFormat,
    pub view_dimension: SrvDimension,
    pub shader_4_component_mapping: u32,
    pub most_detailed_mip: u32,
    pub mip_levels: u32,
    pub first_array_slice: u32,
    pub array_size: u32,
}
