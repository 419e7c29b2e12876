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

//! Shader module and shader compilation descriptors.

use crate::renderer::api::util::enums::ShaderStage;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Describes a shader module to be created by a `GraphicsDevice`.
///
/// The bytecode is handed to the backend unmodified (DXIL for D3D12, SPIR-V for Vulkan).
#[derive(Debug, Clone)]
pub struct ShaderModuleDescriptor {
    /// An optional debug label. Empty means no name.
    pub label: String,
    /// The stage the module is compiled for.
    pub stage: ShaderStage,
    /// The entry point function name.
    pub entry_point: String,
    /// The compiled bytecode.
    pub bytecode: Vec<u8>,
}

/// A request to compile one entry point of a shader source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderCompileRequest {
    /// Path of the source file.
    pub source_path: PathBuf,
    /// The entry point function name.
    pub entry_point: String,
    /// The stage to compile for. Selects the target profile.
    pub stage: ShaderStage,
    /// Preprocessor defines. An empty value defines the name without a value.
    pub defines: BTreeMap<String, String>,
    /// Extra include directories, searched in order.
    pub include_dirs: Vec<PathBuf>,
}

impl ShaderCompileRequest {
    /// A request without defines or include directories.
    pub fn new(
        source_path: impl Into<PathBuf>,
        entry_point: impl Into<String>,
        stage: ShaderStage,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            entry_point: entry_point.into(),
            stage,
            defines: BTreeMap::new(),
            include_dirs: Vec::new(),
        }
    }

    /// Adds a preprocessor define.
    pub fn with_define(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.insert(name.into(), value.into());
        self
    }

    /// Adds an include directory.
    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dirs.push(dir.into());
        self
    }
}
