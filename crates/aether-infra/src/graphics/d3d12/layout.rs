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

//! Translation of a [`PipelineLayout`] into a root signature.
//!
//! Each descriptor set becomes one descriptor table parameter. Within a set, the
//! binding index is the shader register and the set index is the register space.
//! Bindings with immutable samplers become static samplers and take no table range.
//! A non-empty push constant block is appended as a root constants parameter at
//! register 0, space 0.

use super::conversions::IntoD3D12;
use super::device::D3D12Shared;
use super::native::{
    DescriptorRange, RootParameter, RootSignatureDesc, RootSignatureFlags, ShaderVisibility,
    DESCRIPTOR_RANGE_OFFSET_APPEND,
};
use super::raw::ComPtr;
use super::sampler::SamplerD3D12;
use aether_core::renderer::api::pipeline::layout::{DescriptorType, PipelineLayout};
use aether_core::renderer::error::PipelineError;

/// Builds the root signature description for `layout`.
pub fn root_signature_desc(
    layout: &PipelineLayout,
    allow_input_layout: bool,
) -> Result<RootSignatureDesc, PipelineError> {
    layout.validate()?;

    let push_constants = layout.push_constants_size > 0;
    let mut parameters = Vec::with_capacity(layout.sets_layout.len() + usize::from(push_constants));
    let mut static_samplers = Vec::new();

    for (set, set_layout) in layout.sets_layout.iter().enumerate() {
        let set = set as u32;
        let mut ranges = Vec::new();
        for (binding, binding_layout) in set_layout.bindings.iter().enumerate() {
            let binding = binding as u32;
            if binding_layout.ty == DescriptorType::None {
                continue;
            }
            if binding_layout.immutable_samplers.is_empty() {
                ranges.push(DescriptorRange {
                    range_type: binding_layout.ty.into_d3d12(),
                    num_descriptors: binding_layout.count,
                    base_shader_register: binding,
                    register_space: set,
                    offset_in_descriptors_from_table_start: DESCRIPTOR_RANGE_OFFSET_APPEND,
                });
            } else {
                // Array elements take consecutive registers, as an HLSL sampler array does.
                for (element, sampler) in binding_layout.immutable_samplers.iter().enumerate() {
                    let sampler = sampler
                        .as_any()
                        .downcast_ref::<SamplerD3D12>()
                        .ok_or(PipelineError::BackendMismatch {
                            expected: "D3D12",
                            object: "immutable sampler",
                        })?;
                    static_samplers.push(sampler.static_sampler_desc(binding + element as u32, set));
                }
            }
        }
        parameters.push(RootParameter::DescriptorTable {
            ranges,
            visibility: ShaderVisibility::All,
        });
    }

    if push_constants {
        parameters.push(RootParameter::Constants {
            shader_register: 0,
            register_space: 0,
            num_32bit_values: layout.push_constants_word_count(),
            visibility: ShaderVisibility::All,
        });
    }

    let flags = if allow_input_layout {
        RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT
    } else {
        RootSignatureFlags::empty()
    };

    Ok(RootSignatureDesc {
        parameters,
        static_samplers,
        flags,
    })
}

/// Creates the root signature of the pipeline called `label`.
///
/// Any failure is reported once on the device logger before it is returned.
pub(crate) fn create_root_signature(
    shared: &D3D12Shared,
    layout: &PipelineLayout,
    allow_input_layout: bool,
    label: &str,
) -> Result<ComPtr, PipelineError> {
    let created = root_signature_desc(layout, allow_input_layout).and_then(|desc| {
        shared
            .raw
            .create_root_signature(&desc)
            .map(|raw| {
                log::debug!(
                    "D3D12Device: Created root signature for '{label}' ({} parameters, {} static samplers)",
                    desc.parameters.len(),
                    desc.static_samplers.len()
                );
                ComPtr::new(shared.raw.clone(), raw)
            })
            .map_err(|hr| PipelineError::LayoutCreationFailed(hr.to_string()))
    });
    if let Err(err) = &created {
        shared
            .logger
            .critical(format!("Failed to create root signature for '{label}': {err}"));
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::d3d12::native::DescriptorRangeType;
    use aether_core::renderer::api::pipeline::layout::{DescriptorSetLayout, DescriptorSetLayoutBinding};

    fn binding(ty: DescriptorType, count: u32) -> DescriptorSetLayoutBinding {
        DescriptorSetLayoutBinding::new(ty, count)
    }

    #[test]
    fn one_table_per_set_and_registers_follow_bindings() {
        let layout = PipelineLayout {
            sets_layout: vec![
                DescriptorSetLayout::new(vec![
                    binding(DescriptorType::UniformBuffer, 1),
                    DescriptorSetLayoutBinding::reserved(),
                    binding(DescriptorType::SampledTexture, 4),
                ]),
                DescriptorSetLayout::default(),
                DescriptorSetLayout::new(vec![binding(DescriptorType::RwStorageBuffer, 2)]),
            ],
            push_constants_size: 0,
        };
        let desc = root_signature_desc(&layout, true).unwrap();
        assert_eq!(desc.parameters.len(), 3);
        assert_eq!(desc.flags, RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT);

        let RootParameter::DescriptorTable { ranges, .. } = &desc.parameters[0] else {
            panic!("expected a descriptor table");
        };
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].range_type, DescriptorRangeType::Cbv);
        assert_eq!(ranges[0].base_shader_register, 0);
        assert_eq!(ranges[1].range_type, DescriptorRangeType::Srv);
        assert_eq!(ranges[1].base_shader_register, 2);
        assert_eq!(ranges[1].num_descriptors, 4);

        let RootParameter::DescriptorTable { ranges, .. } = &desc.parameters[1] else {
            panic!("expected a descriptor table");
        };
        assert!(ranges.is_empty());

        let RootParameter::DescriptorTable { ranges, .. } = &desc.parameters[2] else {
            panic!("expected a descriptor table");
        };
        assert_eq!(ranges[0].register_space, 2);
        assert_eq!(ranges[0].range_type, DescriptorRangeType::Uav);
    }

    #[test]
    fn push_constants_become_the_last_parameter() {
        let layout = PipelineLayout {
            sets_layout: vec![DescriptorSetLayout::default()],
            push_constants_size: 10,
        };
        let desc = root_signature_desc(&layout, false).unwrap();
        assert_eq!(desc.parameters.len(), 2);
        assert_eq!(desc.flags, RootSignatureFlags::empty());
        assert_eq!(
            desc.parameters[1],
            RootParameter::Constants {
                shader_register: 0,
                register_space: 0,
                num_32bit_values: 3,
                visibility: ShaderVisibility::All,
            }
        );
    }

    #[test]
    fn invalid_layout_is_rejected_before_translation() {
        let layout = PipelineLayout {
            sets_layout: vec![DescriptorSetLayout::new(vec![binding(
                DescriptorType::UniformBuffer,
                0,
            )])],
            push_constants_size: 0,
        };
        assert!(matches!(
            root_signature_desc(&layout, true),
            Err(PipelineError::InvalidLayout(_))
        ));
    }
}
