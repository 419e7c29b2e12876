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

//! Pipeline layout descriptors.
//!
//! A [`PipelineLayout`] is an ordered list of descriptor sets plus an optional block
//! of push constants. Backends translate it into their native layout object (a root
//! signature, a `VkPipelineLayout`, ...) when a pipeline is constructed.

use crate::renderer::error::PipelineError;
use crate::renderer::traits::Sampler;
use std::sync::Arc;

/// The kind of resource a binding exposes to shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DescriptorType {
    /// A reserved binding slot. It occupies no native slot.
    #[default]
    None,
    /// A sampler.
    Sampler,
    /// A uniform (constant) buffer.
    UniformBuffer,
    /// A read-only storage buffer.
    StorageBuffer,
    /// A read-write storage buffer.
    RwStorageBuffer,
    /// A texture read through a sampler.
    SampledTexture,
    /// A read-only storage texture.
    StorageTexture,
    /// A read-write storage texture.
    RwStorageTexture,
}

/// A single binding (slot or array of slots) within a descriptor set.
#[derive(Debug, Clone)]
pub struct DescriptorSetLayoutBinding {
    /// The type of resource bound here.
    pub ty: DescriptorType,
    /// The number of descriptors in this binding (array size).
    pub count: u32,
    /// Samplers baked into the layout. When non-empty the binding has no runtime slot.
    pub immutable_samplers: Vec<Arc<dyn Sampler>>,
}

impl DescriptorSetLayoutBinding {
    /// A binding of `count` descriptors of type `ty`.
    pub fn new(ty: DescriptorType, count: u32) -> Self {
        Self {
            ty,
            count,
            immutable_samplers: Vec::new(),
        }
    }

    /// A reserved binding that occupies no slot.
    pub fn reserved() -> Self {
        Self::new(DescriptorType::None, 0)
    }

    /// A sampler binding whose samplers are fixed at layout creation.
    pub fn immutable_samplers(samplers: Vec<Arc<dyn Sampler>>) -> Self {
        Self {
            ty: DescriptorType::Sampler,
            count: samplers.len() as u32,
            immutable_samplers: samplers,
        }
    }

    /// Returns `true` if this binding needs a runtime (table) slot.
    pub fn uses_table_slot(&self) -> bool {
        self.ty != DescriptorType::None && self.immutable_samplers.is_empty()
    }
}

/// The bindings of one descriptor set. The binding index is the position in `bindings`.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSetLayout {
    /// The bindings, indexed by binding number.
    pub bindings: Vec<DescriptorSetLayoutBinding>,
}

impl DescriptorSetLayout {
    /// Creates a set layout from its bindings.
    pub fn new(bindings: Vec<DescriptorSetLayoutBinding>) -> Self {
        Self { bindings }
    }
}

/// The complete resource interface of a pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineLayout {
    /// The descriptor set layouts, indexed by set number.
    pub sets_layout: Vec<DescriptorSetLayout>,
    /// Size in bytes of the push constant block. 0 means no push constants.
    pub push_constants_size: u32,
}

impl PipelineLayout {
    /// The number of 32-bit words needed to hold the push constant block.
    pub fn push_constants_word_count(&self) -> u32 {
        self.push_constants_size.div_ceil(4)
    }

    /// The number of runtime table slots across all sets.
    pub fn table_binding_count(&self) -> usize {
        self.sets_layout
            .iter()
            .flat_map(|set| set.bindings.iter())
            .filter(|binding| binding.uses_table_slot())
            .count()
    }

    /// Checks the invariants every backend relies on.
    ///
    /// - every real binding has a non-zero count;
    /// - a binding carrying immutable samplers is a `Sampler` binding whose count
    ///   matches its sampler list, so it never also claims a table slot.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (set, set_layout) in self.sets_layout.iter().enumerate() {
            for (index, binding) in set_layout.bindings.iter().enumerate() {
                if binding.ty == DescriptorType::None {
                    if !binding.immutable_samplers.is_empty() {
                        return Err(PipelineError::InvalidLayout(format!(
                            "binding {index} of set {set} is reserved but carries immutable samplers"
                        )));
                    }
                    continue;
                }
                if binding.count == 0 {
                    return Err(PipelineError::InvalidLayout(format!(
                        "binding {index} of set {set} has a descriptor count of 0"
                    )));
                }
                if !binding.immutable_samplers.is_empty() {
                    if binding.ty != DescriptorType::Sampler {
                        return Err(PipelineError::InvalidLayout(format!(
                            "binding {index} of set {set} carries immutable samplers but is typed {:?}",
                            binding.ty
                        )));
                    }
                    if binding.count as usize != binding.immutable_samplers.len() {
                        return Err(PipelineError::InvalidLayout(format!(
                            "binding {index} of set {set} declares {} descriptors but {} immutable samplers",
                            binding.count,
                            binding.immutable_samplers.len()
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
