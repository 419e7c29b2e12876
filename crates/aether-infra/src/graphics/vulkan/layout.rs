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

//! Translation of a [`PipelineLayout`] into a `VkPipelineLayout`.
//!
//! Each descriptor set becomes one `VkDescriptorSetLayout` whose binding numbers are
//! the binding indices of the set. A non-empty push constant block becomes a single
//! range visible to every stage. Vulkan has no input layout flag on layouts.

use super::conversions::IntoVulkan;
use super::device::VulkanShared;
use super::raw::{Owned, PipelineLayoutInfo, SetLayoutBinding};
use super::sampler::SamplerVulkan;
use aether_core::renderer::api::pipeline::layout::{
    DescriptorSetLayout, DescriptorType, PipelineLayout,
};
use aether_core::renderer::error::PipelineError;
use ash::vk;

/// The bindings of one descriptor set layout.
pub fn set_layout_bindings(
    set_layout: &DescriptorSetLayout,
) -> Result<Vec<SetLayoutBinding>, PipelineError> {
    let mut bindings = Vec::with_capacity(set_layout.bindings.len());
    for (index, binding) in set_layout.bindings.iter().enumerate() {
        if binding.ty == DescriptorType::None {
            continue;
        }
        let immutable_samplers = binding
            .immutable_samplers
            .iter()
            .map(|sampler| {
                sampler
                    .as_any()
                    .downcast_ref::<SamplerVulkan>()
                    .map(SamplerVulkan::raw)
                    .ok_or(PipelineError::BackendMismatch {
                        expected: "Vulkan",
                        object: "immutable sampler",
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let (descriptor_type, descriptor_count) = if immutable_samplers.is_empty() {
            (binding.ty.into_vulkan(), binding.count)
        } else {
            (vk::DescriptorType::SAMPLER, immutable_samplers.len() as u32)
        };
        bindings.push(SetLayoutBinding {
            binding: index as u32,
            descriptor_type,
            descriptor_count,
            stage_flags: vk::ShaderStageFlags::ALL,
            immutable_samplers,
        });
    }
    Ok(bindings)
}

/// The push constant ranges of `layout`: empty, or one range rounded up to whole words.
pub fn push_constant_ranges(layout: &PipelineLayout) -> Vec<vk::PushConstantRange> {
    if layout.push_constants_size == 0 {
        return Vec::new();
    }
    vec![vk::PushConstantRange {
        stage_flags: vk::ShaderStageFlags::ALL,
        offset: 0,
        size: layout.push_constants_word_count() * 4,
    }]
}

/// A pipeline layout with the set layouts it was built from.
#[derive(Debug)]
pub struct PipelineLayoutVulkan {
    // Destroyed before the set layouts it references.
    layout: Owned<vk::PipelineLayout>,
    set_layouts: Vec<Owned<vk::DescriptorSetLayout>>,
}

impl PipelineLayoutVulkan {
    /// The native pipeline layout.
    pub fn raw(&self) -> vk::PipelineLayout {
        self.layout.raw()
    }

    /// The native set layouts, indexed by set number.
    pub fn set_layouts(&self) -> Vec<vk::DescriptorSetLayout> {
        self.set_layouts.iter().map(Owned::raw).collect()
    }
}

fn build(shared: &VulkanShared, layout: &PipelineLayout) -> Result<PipelineLayoutVulkan, PipelineError> {
    layout.validate()?;

    let mut set_layouts = Vec::with_capacity(layout.sets_layout.len());
    for set_layout in &layout.sets_layout {
        let bindings = set_layout_bindings(set_layout)?;
        let raw = shared
            .raw
            .create_descriptor_set_layout(&bindings)
            .map_err(|err| PipelineError::LayoutCreationFailed(err.to_string()))?;
        // Already created set layouts are destroyed if a later step fails.
        set_layouts.push(Owned::new(shared.raw.clone(), raw));
    }

    let info = PipelineLayoutInfo {
        set_layouts: set_layouts.iter().map(Owned::raw).collect(),
        push_constant_ranges: push_constant_ranges(layout),
    };
    let raw = shared
        .raw
        .create_pipeline_layout(&info)
        .map_err(|err| PipelineError::LayoutCreationFailed(err.to_string()))?;

    Ok(PipelineLayoutVulkan {
        layout: Owned::new(shared.raw.clone(), raw),
        set_layouts,
    })
}

/// Creates the pipeline layout of the pipeline called `label`.
///
/// Any failure is reported once on the device logger before it is returned.
pub(crate) fn create_pipeline_layout(
    shared: &VulkanShared,
    layout: &PipelineLayout,
    label: &str,
) -> Result<PipelineLayoutVulkan, PipelineError> {
    match build(shared, layout) {
        Ok(created) => {
            shared.name_object(created.raw(), label);
            log::debug!(
                "VulkanDevice: Created pipeline layout for '{label}' ({} set layouts)",
                created.set_layouts.len()
            );
            Ok(created)
        }
        Err(err) => {
            shared
                .logger
                .critical(format!("Failed to create pipeline layout for '{label}': {err}"));
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_core::renderer::api::pipeline::layout::DescriptorSetLayoutBinding;

    #[test]
    fn reserved_bindings_keep_their_neighbours_indices() {
        let set = DescriptorSetLayout::new(vec![
            DescriptorSetLayoutBinding::new(DescriptorType::UniformBuffer, 1),
            DescriptorSetLayoutBinding::reserved(),
            DescriptorSetLayoutBinding::new(DescriptorType::RwStorageTexture, 3),
        ]);
        let bindings = set_layout_bindings(&set).unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].binding, 0);
        assert_eq!(bindings[1].binding, 2);
        assert_eq!(bindings[1].descriptor_type, vk::DescriptorType::STORAGE_IMAGE);
        assert_eq!(bindings[1].descriptor_count, 3);
        assert_eq!(bindings[1].stage_flags, vk::ShaderStageFlags::ALL);
    }

    #[test]
    fn push_constants_round_up_to_words() {
        let mut layout = PipelineLayout::default();
        assert!(push_constant_ranges(&layout).is_empty());
        layout.push_constants_size = 10;
        let ranges = push_constant_ranges(&layout);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].size, 12);
        assert_eq!(ranges[0].offset, 0);
        assert_eq!(ranges[0].stage_flags, vk::ShaderStageFlags::ALL);
    }
}
