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
use super::raw::{Owned, ShaderStageInfo};
use aether_core::renderer::api::util::enums::ShaderStage;
use aether_core::renderer::traits::ShaderModule;
use ash::vk;
use std::any::Any;
use std::ffi::CString;

/// A `VkShaderModule` holding SPIR-V for one stage.
#[derive(Debug)]
pub struct ShaderModuleVulkan {
    label: String,
    stage: ShaderStage,
    entry_point: String,
    entry_point_c: CString,
    bytecode: Vec<u8>,
    module: Owned<vk::ShaderModule>,
}

impl ShaderModuleVulkan {
    pub(crate) fn new(
        label: String,
        stage: ShaderStage,
        entry_point: String,
        entry_point_c: CString,
        bytecode: Vec<u8>,
        module: Owned<vk::ShaderModule>,
    ) -> Self {
        Self {
            label,
            stage,
            entry_point,
            entry_point_c,
            bytecode,
            module,
        }
    }

    /// The debug label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The native module.
    pub fn raw(&self) -> vk::ShaderModule {
        self.module.raw()
    }

    /// The pipeline stage description using this module.
    pub fn stage_info(&self) -> ShaderStageInfo {
        ShaderStageInfo {
            stage: self.stage.into_vulkan(),
            module: self.module.raw(),
            entry_point: self.entry_point_c.clone(),
        }
    }
}

impl ShaderModule for ShaderModuleVulkan {
    fn stage(&self) -> ShaderStage {
        self.stage
    }

    fn entry_point(&self) -> &str {
        &self.entry_point
    }

    fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
