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

//! Defines data structures related to GPU texture resources and their views.

use super::buffer::MemoryLocation;
use crate::renderer::api::util::enums::{FormatAspects, ResourceFormat};
use crate::renderer::error::ResourceError;
use bitflags::bitflags;

/// The dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureDimension {
    /// A one-dimensional texture.
    D1,
    /// A two-dimensional texture.
    #[default]
    D2,
    /// A three-dimensional (volumetric) texture.
    D3,
}

/// The dimensionality of a texture view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureViewDimension {
    /// A view of a 1D texture.
    D1,
    /// A view of a 1D texture array.
    D1Array,
    /// A view of a 2D texture.
    #[default]
    D2,
    /// A view of a 2D texture array.
    D2Array,
    /// A view of a cubemap texture (6 faces of a 2D texture).
    Cube,
    /// A view of a cubemap texture array.
    CubeArray,
    /// A view of a 3D texture.
    D3,
}

bitflags! {
    /// A set of flags describing the allowed usages of a texture.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// The texture can be used as the source of a copy operation.
        const COPY_SRC = 1 << 0;
        /// The texture can be used as the destination of a copy operation.
        const COPY_DST = 1 << 1;
        /// The texture can be bound in a shader for sampling (reading).
        const TEXTURE_BINDING = 1 << 2;
        /// The texture can be used as a storage texture (read/write access from shaders).
        const STORAGE_BINDING = 1 << 3;
        /// The texture can be used as a color attachment in a render pass.
        const RENDER_ATTACHMENT = 1 << 4;
        /// The texture can be used as a depth/stencil target.
        const DEPTH_STENCIL_ATTACHMENT = 1 << 5;
    }
}

/// A descriptor used to create a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// An optional debug label. Empty means no name.
    pub label: String,
    /// The dimensionality of the texture.
    pub dimension: TextureDimension,
    /// The format of the texels in the texture.
    pub format: ResourceFormat,
    /// Width in texels.
    pub width: u32,
    /// Height in texels. 1 for 1D textures.
    pub height: u32,
    /// Depth of a 3D texture, or the number of array layers otherwise.
    pub depth_or_layers: u32,
    /// The number of mipmap levels.
    pub mip_levels: u32,
    /// A bitmask of [`TextureUsage`] flags describing how the texture will be used.
    pub usage: TextureUsage,
    /// Where the texture memory lives.
    pub location: MemoryLocation,
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            label: String::new(),
            dimension: TextureDimension::D2,
            format: ResourceFormat::Rgba8Unorm,
            width: 1,
            height: 1,
            depth_or_layers: 1,
            mip_levels: 1,
            usage: TextureUsage::TEXTURE_BINDING,
            location: MemoryLocation::GpuOnly,
        }
    }
}

impl TextureDescriptor {
    /// Splits `depth_or_layers` into `(depth, array_layers)`.
    ///
    /// A 3D texture is one layer of `depth_or_layers` slices; every other dimension
    /// is `depth_or_layers` layers of depth 1.
    pub fn depth_and_layers(&self) -> (u32, u32) {
        match self.dimension {
            TextureDimension::D3 => (self.depth_or_layers.max(1), 1),
            TextureDimension::D1 | TextureDimension::D2 => (1, self.depth_or_layers.max(1)),
        }
    }

    /// Returns `true` if the texture can be viewed as a cubemap.
    pub fn is_cube_compatible(&self) -> bool {
        self.dimension == TextureDimension::D2
            && self.width == self.height
            && self.depth_or_layers >= 6
            && self.depth_or_layers % 6 == 0
    }

    /// The length of a full mip chain for the texture's extent.
    pub fn max_mip_levels(&self) -> u32 {
        let depth = match self.dimension {
            TextureDimension::D3 => self.depth_or_layers,
            TextureDimension::D1 | TextureDimension::D2 => 1,
        };
        let largest = self.width.max(self.height).max(depth).max(1);
        u32::BITS - largest.leading_zeros()
    }

    /// Checks that every extent is non-zero and the mip chain fits the extent.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.width == 0 || self.height == 0 || self.depth_or_layers == 0 {
            return Err(ResourceError::InvalidDescriptor(format!(
                "texture '{}' has an empty extent {}x{}x{}",
                self.label, self.width, self.height, self.depth_or_layers
            )));
        }
        if self.mip_levels == 0 || self.mip_levels > self.max_mip_levels() {
            return Err(ResourceError::InvalidDescriptor(format!(
                "texture '{}' declares {} mip levels, its extent allows 1 to {}",
                self.label,
                self.mip_levels,
                self.max_mip_levels()
            )));
        }
        Ok(())
    }

    /// The view dimension that covers the whole texture.
    pub fn default_view_dimension(&self) -> TextureViewDimension {
        let (_, layers) = self.depth_and_layers();
        match (self.dimension, layers > 1) {
            (TextureDimension::D1, false) => TextureViewDimension::D1,
            (TextureDimension::D1, true) => TextureViewDimension::D1Array,
            (TextureDimension::D2, false) => TextureViewDimension::D2,
            (TextureDimension::D2, true) => TextureViewDimension::D2Array,
            (TextureDimension::D3, _) => TextureViewDimension::D3,
        }
    }
}

/// Describes one way of looking at a texture.
///
/// Views are cached per texture, keyed by this value: two equal descriptors always
/// resolve to the same native view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureViewDescriptor {
    /// The dimensionality of the view.
    pub dimension: TextureViewDimension,
    /// The format the view reinterprets the texels as.
    pub format: ResourceFormat,
    /// The first array layer visible through the view.
    pub base_array_layer: u32,
    /// The number of array layers visible through the view.
    pub array_layer_count: u32,
    /// The first mipmap level visible through the view.
    pub base_mip_level: u32,
    /// The number of mipmap levels visible through the view.
    pub mip_level_count: u32,
    /// The aspects of `format` the view reads. Defaults to all of them; sampled
    /// views of depth-stencil textures select a single aspect.
    pub aspects: FormatAspects,
}

impl TextureViewDescriptor {
    /// A view covering every layer and mip level of the texture.
    pub fn whole(texture: &TextureDescriptor) -> Self {
        let (_, layers) = texture.depth_and_layers();
        Self {
            dimension: texture.default_view_dimension(),
            format: texture.format,
            base_array_layer: 0,
            array_layer_count: layers,
            base_mip_level: 0,
            mip_level_count: texture.mip_levels.max(1),
            aspects: texture.format.aspects(),
        }
    }

    /// A view of a single mip level of a single layer.
    pub fn single(texture: &TextureDescriptor, mip_level: u32, layer: u32) -> Self {
        let dimension = match texture.dimension {
            TextureDimension::D1 => TextureViewDimension::D1,
            TextureDimension::D2 => TextureViewDimension::D2,
            TextureDimension::D3 => TextureViewDimension::D3,
        };
        Self {
            dimension,
            format: texture.format,
            base_array_layer: layer,
            array_layer_count: 1,
            base_mip_level: mip_level,
            mip_level_count: 1,
            aspects: texture.format.aspects(),
        }
    }

    /// Checks the view against the texture it looks into.
    ///
    /// The aspects must be a non-empty subset of the view format's aspects, the
    /// mip and layer ranges must lie inside the texture, and cube views must
    /// cover whole cubes.
    pub fn validate(&self, texture: &TextureDescriptor) -> Result<(), ResourceError> {
        let invalid = |reason: String| {
            Err(ResourceError::InvalidDescriptor(format!(
                "view of '{}' {reason}",
                texture.label
            )))
        };
        if self.aspects.is_empty() || !self.format.aspects().contains(self.aspects) {
            return invalid(format!(
                "reads aspects {:?} that {:?} does not have",
                self.aspects, self.format
            ));
        }
        let (_, layers) = texture.depth_and_layers();
        let mip_end = self.base_mip_level.checked_add(self.mip_level_count);
        if self.mip_level_count == 0 || mip_end.map_or(true, |end| end > texture.mip_levels.max(1)) {
            return invalid(format!(
                "covers mips {}+{} of {}",
                self.base_mip_level, self.mip_level_count, texture.mip_levels
            ));
        }
        let layer_end = self.base_array_layer.checked_add(self.array_layer_count);
        if self.array_layer_count == 0 || layer_end.map_or(true, |end| end > layers) {
            return invalid(format!(
                "covers layers {}+{} of {layers}",
                self.base_array_layer, self.array_layer_count
            ));
        }
        let whole_cubes = match self.dimension {
            TextureViewDimension::Cube => self.array_layer_count == 6,
            TextureViewDimension::CubeArray => self.array_layer_count % 6 == 0,
            _ => true,
        };
        if !whole_cubes {
            return invalid(format!(
                "is a {:?} view over {} layers",
                self.dimension, self.array_layer_count
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_depth_is_not_a_layer_count() {
        let desc = TextureDescriptor {
            dimension: TextureDimension::D3,
            depth_or_layers: 16,
            ..Default::default()
        };
        assert_eq!(desc.depth_and_layers(), (16, 1));
        assert_eq!(desc.default_view_dimension(), TextureViewDimension::D3);
    }

    #[test]
    fn layered_texture_reports_layers() {
        let desc = TextureDescriptor {
            depth_or_layers: 6,
            width: 128,
            height: 128,
            ..Default::default()
        };
        assert_eq!(desc.depth_and_layers(), (1, 6));
        assert!(desc.is_cube_compatible());
        let view = TextureViewDescriptor::whole(&desc);
        assert_eq!(view.dimension, TextureViewDimension::D2Array);
        assert_eq!(view.array_layer_count, 6);
    }

    #[test]
    fn mip_chain_is_bounded_by_the_extent() {
        let mut desc = TextureDescriptor {
            width: 256,
            height: 64,
            mip_levels: 9,
            ..Default::default()
        };
        assert_eq!(desc.max_mip_levels(), 9);
        assert!(desc.validate().is_ok());
        desc.mip_levels = 10;
        assert!(matches!(desc.validate(), Err(ResourceError::InvalidDescriptor(_))));
        desc.mip_levels = 0;
        assert!(desc.validate().is_err());
        desc.mip_levels = 1;
        desc.width = 0;
        assert!(desc.validate().is_err());
    }

    #[test]
    fn views_default_to_every_format_aspect() {
        let desc = TextureDescriptor {
            format: ResourceFormat::Depth24UnormStencil8,
            ..Default::default()
        };
        let whole = TextureViewDescriptor::whole(&desc);
        assert_eq!(whole.aspects, FormatAspects::DEPTH | FormatAspects::STENCIL);
        assert!(whole.validate(&desc).is_ok());

        let stencil = TextureViewDescriptor {
            aspects: FormatAspects::STENCIL,
            ..whole
        };
        assert!(stencil.validate(&desc).is_ok());
        let color = TextureViewDescriptor {
            aspects: FormatAspects::COLOR,
            ..whole
        };
        assert!(color.validate(&desc).is_err());
        let none = TextureViewDescriptor {
            aspects: FormatAspects::empty(),
            ..whole
        };
        assert!(none.validate(&desc).is_err());
    }

    #[test]
    fn views_must_stay_inside_the_texture() {
        let desc = TextureDescriptor {
            width: 16,
            height: 16,
            depth_or_layers: 12,
            mip_levels: 2,
            ..Default::default()
        };
        let whole = TextureViewDescriptor::whole(&desc);
        assert!(whole.validate(&desc).is_ok());
        assert!(TextureViewDescriptor::single(&desc, 2, 0).validate(&desc).is_err());
        assert!(TextureViewDescriptor::single(&desc, 0, 12).validate(&desc).is_err());
        let overflowing = TextureViewDescriptor {
            base_array_layer: u32::MAX,
            array_layer_count: 2,
            ..whole
        };
        assert!(overflowing.validate(&desc).is_err());
    }

    #[test]
    fn cube_views_cover_whole_cubes() {
        let desc = TextureDescriptor {
            width: 32,
            height: 32,
            depth_or_layers: 12,
            ..Default::default()
        };
        let cubes = TextureViewDescriptor {
            dimension: TextureViewDimension::CubeArray,
            ..TextureViewDescriptor::whole(&desc)
        };
        assert!(cubes.validate(&desc).is_ok());
        let ragged = TextureViewDescriptor {
            array_layer_count: 9,
            ..cubes
        };
        assert!(ragged.validate(&desc).is_err());
        let cube = TextureViewDescriptor {
            dimension: TextureViewDimension::Cube,
            ..cubes
        };
        assert!(cube.validate(&desc).is_err());
        let first_cube = TextureViewDescriptor {
            array_layer_count: 6,
            ..cube
        };
        assert!(first_cube.validate(&desc).is_ok());
    }

    #[test]
    fn single_view_differs_from_whole_view() {
        let desc = TextureDescriptor {
            mip_levels: 4,
            ..Default::default()
        };
        assert_ne!(
            TextureViewDescriptor::whole(&desc),
            TextureViewDescriptor::single(&desc, 0, 0)
        );
        assert_eq!(
            TextureViewDescriptor::single(&desc, 2, 0),
            TextureViewDescriptor::single(&desc, 2, 0)
        );
    }
}
