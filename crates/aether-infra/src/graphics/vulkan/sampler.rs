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

use super::conversions::IntoVulkan;
use super::raw::{Owned, SamplerInfo};
use aether_core::renderer::api::resource::sampler::SamplerDescriptor;
use aether_core::renderer::traits::Sampler;
use ash::vk;
use std::any::Any;

/// Translates a sampler description into sampler create info.
pub fn sampler_info(desc: &SamplerDescriptor) -> SamplerInfo {
    SamplerInfo {
        mag_filter: desc.mag_filter.into_vulkan(),
        min_filter: desc.min_filter.into_vulkan(),
        mipmap_mode: desc.mipmap_filter.into_vulkan(),
        address_mode_u: desc.address_mode_u.into_vulkan(),
        address_mode_v: desc.address_mode_v.into_vulkan(),
        address_mode_w: desc.address_mode_w.into_vulkan(),
        mip_lod_bias: desc.mip_lod_bias,
        max_anisotropy: desc
            .is_anisotropic()
            .then(|| f32::from(desc.anisotropy_clamp)),
        compare_op: desc.compare.map(IntoVulkan::into_vulkan),
        min_lod: desc.lod_min_clamp,
        max_lod: desc.lod_max_clamp.min(vk::LOD_CLAMP_NONE),
        border_color: desc.border_color.into_vulkan(),
    }
}

/// A `VkSampler`. Usable at runtime and as an immutable sampler of a layout.
#[derive(Debug)]
pub struct SamplerVulkan {
    desc: SamplerDescriptor,
    sampler: Owned<vk::Sampler>,
}

impl SamplerVulkan {
    pub(crate) fn new(desc: SamplerDescriptor, sampler: Owned<vk::Sampler>) -> Self {
        Self { desc, sampler }
    }

    /// The native sampler.
    pub fn raw(&self) -> vk::Sampler {
        self.sampler.raw()
    }
}

impl Sampler for SamplerVulkan {
    fn descriptor(&self) -> &SamplerDescriptor {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
