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

//! Generic rendering enums.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A backend-agnostic representation of a native graphics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GraphicsBackendType {
    /// Microsoft's DirectX 12 API.
    Dx12,
    /// Vulkan API.
    #[default]
    Vulkan,
}

/// A programmable stage of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    /// The vertex shader stage.
    Vertex,
    /// The tessellation control (hull) stage.
    TessellationControl,
    /// The tessellation evaluation (domain) stage.
    TessellationEvaluation,
    /// The geometry shader stage.
    Geometry,
    /// The fragment (or pixel) shader stage.
    Fragment,
    /// The compute shader stage.
    Compute,
}

bitflags! {
    /// The aspects (color, depth, stencil) carried by a resource format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FormatAspects: u8 {
        /// The format stores color data.
        const COLOR = 1 << 0;
        /// The format stores depth data.
        const DEPTH = 1 << 1;
        /// The format stores stencil data.
        const STENCIL = 1 << 2;
    }
}

/// The memory format of texels and vertex attributes.
///
/// A single enum covers both usages so that a vertex attribute and a render target
/// go through the same translation table on every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResourceFormat {
    /// No format. Used for render targets whose format is not known yet.
    #[default]
    Undefined,

    // 8-bit formats
    /// One 8-bit unsigned normalized component.
    R8Unorm,
    /// One 8-bit signed normalized component.
    R8Snorm,
    /// One 8-bit unsigned integer component.
    R8Uint,
    /// One 8-bit signed integer component.
    R8Sint,
    /// Two 8-bit unsigned normalized components.
    Rg8Unorm,
    /// Two 8-bit signed normalized components.
    Rg8Snorm,
    /// Two 8-bit unsigned integer components.
    Rg8Uint,
    /// Two 8-bit signed integer components.
    Rg8Sint,
    /// Four 8-bit unsigned normalized components (RGBA).
    Rgba8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA) in the sRGB color space.
    Rgba8UnormSrgb,
    /// Four 8-bit signed normalized components.
    Rgba8Snorm,
    /// Four 8-bit unsigned integer components.
    Rgba8Uint,
    /// Four 8-bit signed integer components.
    Rgba8Sint,
    /// Four 8-bit unsigned normalized components (BGRA). A common swapchain format.
    Bgra8Unorm,
    /// Four 8-bit unsigned normalized components (BGRA) in the sRGB color space.
    Bgra8UnormSrgb,

    // 16-bit formats
    /// One 16-bit float component.
    R16Float,
    /// One 16-bit unsigned integer component.
    R16Uint,
    /// One 16-bit signed integer component.
    R16Sint,
    /// One 16-bit unsigned normalized component.
    R16Unorm,
    /// Two 16-bit float components.
    Rg16Float,
    /// Two 16-bit unsigned integer components.
    Rg16Uint,
    /// Two 16-bit signed integer components.
    Rg16Sint,
    /// Four 16-bit float components.
    Rgba16Float,
    /// Four 16-bit unsigned integer components.
    Rgba16Uint,
    /// Four 16-bit signed integer components.
    Rgba16Sint,
    /// Four 16-bit unsigned normalized components.
    Rgba16Unorm,

    // 32-bit formats
    /// One 32-bit float component.
    R32Float,
    /// One 32-bit unsigned integer component.
    R32Uint,
    /// One 32-bit signed integer component.
    R32Sint,
    /// Two 32-bit float components.
    Rg32Float,
    /// Two 32-bit unsigned integer components.
    Rg32Uint,
    /// Two 32-bit signed integer components.
    Rg32Sint,
    /// Three 32-bit float components. Vertex data only on most hardware.
    Rgb32Float,
    /// Three 32-bit unsigned integer components.
    Rgb32Uint,
    /// Three 32-bit signed integer components.
    Rgb32Sint,
    /// Four 32-bit float components.
    Rgba32Float,
    /// Four 32-bit unsigned integer components.
    Rgba32Uint,
    /// Four 32-bit signed integer components.
    Rgba32Sint,

    // Packed formats
    /// 10 bits per color channel and 2 alpha bits, unsigned normalized.
    Rgb10A2Unorm,
    /// Packed unsigned float with 11 bits red/green and 10 bits blue.
    Rg11B10Float,

    // Depth/stencil formats
    /// A 16-bit unsigned normalized depth format.
    Depth16Unorm,
    /// A 24-bit unsigned normalized depth format with an 8-bit stencil component.
    Depth24UnormStencil8,
    /// A 32-bit float depth format.
    Depth32Float,
    /// A 32-bit float depth format with an 8-bit stencil component.
    Depth32FloatStencil8,
}

impl ResourceFormat {
    /// Returns the size in bytes of a single texel (or vertex attribute) in this format.
    /// Returns 0 for [`ResourceFormat::Undefined`].
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            ResourceFormat::Undefined => 0,
            ResourceFormat::R8Unorm
            | ResourceFormat::R8Snorm
            | ResourceFormat::R8Uint
            | ResourceFormat::R8Sint => 1,
            ResourceFormat::Rg8Unorm
            | ResourceFormat::Rg8Snorm
            | ResourceFormat::Rg8Uint
            | ResourceFormat::Rg8Sint
            | ResourceFormat::R16Float
            | ResourceFormat::R16Uint
            | ResourceFormat::R16Sint
            | ResourceFormat::R16Unorm
            | ResourceFormat::Depth16Unorm => 2,
            ResourceFormat::Rgba8Unorm
            | ResourceFormat::Rgba8UnormSrgb
            | ResourceFormat::Rgba8Snorm
            | ResourceFormat::Rgba8Uint
            | ResourceFormat::Rgba8Sint
            | ResourceFormat::Bgra8Unorm
            | ResourceFormat::Bgra8UnormSrgb
            | ResourceFormat::Rg16Float
            | ResourceFormat::Rg16Uint
            | ResourceFormat::Rg16Sint
            | ResourceFormat::R32Float
            | ResourceFormat::R32Uint
            | ResourceFormat::R32Sint
            | ResourceFormat::Rgb10A2Unorm
            | ResourceFormat::Rg11B10Float
            | ResourceFormat::Depth24UnormStencil8
            | ResourceFormat::Depth32Float => 4,
            ResourceFormat::Depth32FloatStencil8 => 5,
            ResourceFormat::Rgba16Float
            | ResourceFormat::Rgba16Uint
            | ResourceFormat::Rgba16Sint
            | ResourceFormat::Rgba16Unorm
            | ResourceFormat::Rg32Float
            | ResourceFormat::Rg32Uint
            | ResourceFormat::Rg32Sint => 8,
            ResourceFormat::Rgb32Float | ResourceFormat::Rgb32Uint | ResourceFormat::Rgb32Sint => {
                12
            }
            ResourceFormat::Rgba32Float
            | ResourceFormat::Rgba32Uint
            | ResourceFormat::Rgba32Sint => 16,
        }
    }

    /// Returns `true` if this format carries a depth component.
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            ResourceFormat::Depth16Unorm
                | ResourceFormat::Depth24UnormStencil8
                | ResourceFormat::Depth32Float
                | ResourceFormat::Depth32FloatStencil8
        )
    }

    /// Returns `true` if this format carries a stencil component.
    pub fn has_stencil(&self) -> bool {
        matches!(
            self,
            ResourceFormat::Depth24UnormStencil8 | ResourceFormat::Depth32FloatStencil8
        )
    }

    /// Returns the aspects stored by this format.
    ///
    /// Depth formats report `DEPTH` (plus `STENCIL` when present); every other
    /// format, including `Undefined`, reports `COLOR`.
    pub fn aspects(&self) -> FormatAspects {
        if self.is_depth() {
            let mut aspects = FormatAspects::DEPTH;
            if self.has_stencil() {
                aspects |= FormatAspects::STENCIL;
            }
            aspects
        } else {
            FormatAspects::COLOR
        }
    }
}
