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

use super::conversions::IntoD3D12;
use super::native::{self, Filter, SamplerDesc, StaticSamplerDesc};
use super::raw::OwnedDescriptor;
use aether_core::renderer::api::pipeline::enums::CompareFunction;
use aether_core::renderer::api::resource::sampler::SamplerDescriptor;
use aether_core::renderer::traits::Sampler;
use std::any::Any;

/// The largest anisotropy D3D12 accepts.
const MAX_ANISOTROPY: u32 = 16;

fn filter_of(desc: &SamplerDescriptor) -> Filter {
    let comparison = desc.compare.is_some();
    if desc.is_anisotropic() {
        Filter::anisotropic(comparison)
    } else {
        Filter::basic(
            desc.min_filter.into_d3d12(),
            desc.mag_filter.into_d3d12(),
            desc.mipmap_filter.into_d3d12(),
            comparison,
        )
    }
}

/// Translates a sampler description into a runtime `D3D12_SAMPLER_DESC`.
pub fn sampler_desc(desc: &SamplerDescriptor) -> SamplerDesc {
    let border: native::StaticBorderColor = desc.border_color.into_d3d12();
    SamplerDesc {
        filter: filter_of(desc),
        address_u: desc.address_mode_u.into_d3d12(),
        address_v: desc.address_mode_v.into_d3d12(),
        address_w: desc.address_mode_w.into_d3d12(),
        mip_lod_bias: desc.mip_lod_bias,
        max_anisotropy: u32::from(desc.anisotropy_clamp).clamp(1, MAX_ANISOTROPY),
        comparison_func: desc.compare.unwrap_or(CompareFunction::Never).into_d3d12(),
        border_color: border.rgba(),
        min_lod: desc.lod_min_clamp,
        max_lod: desc.lod_max_clamp,
    }
}

/// Translates a sampler description into a root signature static sampler.
pub fn static_sampler_desc(desc: &SamplerDescriptor, binding: u32, set: u32) -> StaticSamplerDesc {
    let runtime = sampler_desc(desc);
    StaticSamplerDesc {
        filter: runtime.filter,
        address_u: runtime.address_u,
        address_v: runtime.address_v,
        address_w: runtime.address_w,
        mip_lod_bias: runtime.mip_lod_bias,
        max_anisotropy: runtime.max_anisotropy,
        comparison_func: runtime.comparison_func,
        border_color: desc.border_color.into_d3d12(),
        min_lod: runtime.min_lod,
        max_lod: runtime.max_lod,
        shader_register: binding,
        register_space: set,
        shader_visibility: native::ShaderVisibility::All,
    }
}

/// A sampler living in the device's sampler heap.
#[derive(Debug)]
pub struct SamplerD3D12 {
    desc: SamplerDescriptor,
    descriptor: OwnedDescriptor,
}

impl SamplerD3D12 {
    pub(crate) fn new(desc: SamplerDescriptor, descriptor: OwnedDescriptor) -> Self {
        Self { desc, descriptor }
    }

    /// The sampler heap slot.
    pub fn descriptor_handle(&self) -> native::DescriptorHandle {
        self.descriptor.handle()
    }

    /// The static sampler entry for this sampler bound at `binding` of `set`.
    pub fn static_sampler_desc(&self, binding: u32, set: u32) -> StaticSamplerDesc {
        static_sampler_desc(&self.desc, binding, set)
    }
}

impl Sampler for SamplerD3D12 {
    fn descriptor(&self) -> &SamplerDescriptor {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_core::renderer::api::resource::sampler::FilterMode;

    #[test]
    fn linear_filter_encoding() {
        // D3D12_FILTER_MIN_MAG_MIP_LINEAR
        assert_eq!(filter_of(&SamplerDescriptor::default()), Filter(0x15));
        // D3D12_FILTER_MIN_MAG_MIP_POINT
        assert_eq!(filter_of(&SamplerDescriptor::point_clamp()), Filter(0x0));
    }

    #[test]
    fn comparison_and_anisotropy_encoding() {
        let shadow = SamplerDescriptor {
            compare: Some(CompareFunction::LessEqual),
            ..Default::default()
        };
        // D3D12_FILTER_COMPARISON_MIN_MAG_MIP_LINEAR
        assert_eq!(filter_of(&shadow), Filter(0x95));

        let aniso = SamplerDescriptor {
            anisotropy_clamp: 64,
            mag_filter: FilterMode::Nearest,
            ..Default::default()
        };
        assert_eq!(filter_of(&aniso), Filter(0x55));
        assert_eq!(sampler_desc(&aniso).max_anisotropy, 16);
    }

    #[test]
    fn static_sampler_uses_binding_as_register() {
        let desc = static_sampler_desc(&SamplerDescriptor::default(), 3, 1);
        assert_eq!(desc.shader_register, 3);
        assert_eq!(desc.register_space, 1);
        assert_eq!(desc.border_color, native::StaticBorderColor::OpaqueBlack);
    }
}
