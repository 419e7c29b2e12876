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

//! Global settings for the rendering hardware interface.

use crate::renderer::api::util::enums::GraphicsBackendType;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings handed to the shader compilation adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderCompilerSettings {
    /// The shader model appended to every target profile, e.g. `6_5` gives `vs_6_5`.
    pub shader_model: String,
    /// If `true`, debug and reflection data are stripped from the bytecode.
    pub strip_debug_info: bool,
    /// Include directories added to every compilation, after the per-request ones.
    pub include_dirs: Vec<PathBuf>,
    /// The compiler executable used by the process-backed front-end.
    pub compiler_path: PathBuf,
}

impl Default for ShaderCompilerSettings {
    fn default() -> Self {
        Self {
            shader_model: "6_5".to_string(),
            strip_debug_info: !cfg!(debug_assertions),
            include_dirs: Vec::new(),
            compiler_path: PathBuf::from("dxc"),
        }
    }
}

/// A collection of global settings for device creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhiSettings {
    /// The native API to create the device on.
    pub backend: GraphicsBackendType,
    /// If `true`, labels are applied to native objects as debug names.
    pub debug_names: bool,
    /// The name fatal graphics messages are reported under.
    pub logger_name: String,
    /// Shader compilation settings.
    pub shader: ShaderCompilerSettings,
}

impl Default for RhiSettings {
    fn default() -> Self {
        Self {
            backend: GraphicsBackendType::default(),
            debug_names: cfg!(debug_assertions),
            logger_name: "Graphics".to_string(),
            shader: ShaderCompilerSettings::default(),
        }
    }
}

impl RhiSettings {
    /// Parses settings from a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads and parses a JSON settings file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read RHI settings from '{}'", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Failed to parse RHI settings in '{}'", path.display()))
    }
}
