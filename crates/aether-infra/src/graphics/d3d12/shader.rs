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

use super::native::ShaderBytecode;
use aether_core::renderer::api::util::enums::ShaderStage;
use aether_core::renderer::traits::ShaderModule;
use std::any::Any;

/// DXIL bytecode for one stage. D3D12 has no shader module object; the bytecode
/// is embedded in every pipeline state description that uses it.
#[derive(Debug)]
pub struct ShaderModuleD3D12 {
    label: String,
    stage: ShaderStage,
    entry_point: String,
    bytecode: ShaderBytecode,
}

impl ShaderModuleD3D12 {
    pub(crate) fn new(
        label: String,
        stage: ShaderStage,
        entry_point: String,
        bytecode: ShaderBytecode,
    ) -> Self {
        Self {
            label,
            stage,
            entry_point,
            bytecode,
        }
    }

    /// The debug label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// A shared handle to the bytecode, as embedded into pipeline descriptions.
    pub fn raw_bytecode(&self) -> ShaderBytecode {
        self.bytecode.clone()
    }
}

impl ShaderModule for ShaderModuleD3D12 {
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
