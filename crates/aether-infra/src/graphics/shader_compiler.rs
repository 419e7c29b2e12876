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

//! The shader compilation adapter.
//!
//! [`DxcShaderCompiler`] turns a [`ShaderCompileRequest`] into a DXC command line and
//! hands it to a [`CompilerFrontend`]. DXIL is produced for D3D12 and SPIR-V for
//! Vulkan. [`DxcProcess`] runs the `dxc` executable.

use aether_core::renderer::api::*;
use aether_core::renderer::error::ShaderError;
use aether_core::renderer::logging::GraphicsLogger;
use aether_core::renderer::traits::ShaderCompiler;
use anyhow::Context;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The bytecode a compilation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderTarget {
    /// DXIL, for the D3D12 backend.
    Dxil,
    /// SPIR-V, for the Vulkan backend.
    Spirv,
}

impl From<GraphicsBackendType> for ShaderTarget {
    fn from(backend: GraphicsBackendType) -> Self {
        match backend {
            GraphicsBackendType::Dx12 => ShaderTarget::Dxil,
            GraphicsBackendType::Vulkan => ShaderTarget::Spirv,
        }
    }
}

/// What a compiler front-end reports for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontendOutput {
    /// `true` if the compiler reported success.
    pub success: bool,
    /// The compiled object. Empty on failure.
    pub object: Vec<u8>,
    /// Warnings and errors printed by the compiler.
    pub diagnostics: String,
}

/// A DXC-compatible compiler.
pub trait CompilerFrontend: Send + Sync {
    /// Runs the compiler with `arguments`, which start with the source path.
    /// ## Errors
    /// Only when the compiler could not be run at all. A rejected source is a
    /// successful call with `success == false`.
    fn invoke(&self, arguments: &[OsString]) -> anyhow::Result<FrontendOutput>;

    /// Returns `true` if `path` names an existing source file.
    fn source_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// The DXC target profile prefix of a stage.
fn profile_prefix(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => "vs",
        ShaderStage::TessellationControl => "hs",
        ShaderStage::TessellationEvaluation => "ds",
        ShaderStage::Geometry => "gs",
        ShaderStage::Fragment => "ps",
        ShaderStage::Compute => "cs",
    }
}

/// A [`ShaderCompiler`] speaking the DXC command line.
#[derive(Debug)]
pub struct DxcShaderCompiler<F: CompilerFrontend> {
    frontend: F,
    settings: ShaderCompilerSettings,
    target: ShaderTarget,
    logger: GraphicsLogger,
}

impl<F: CompilerFrontend> DxcShaderCompiler<F> {
    /// Creates a compiler producing `target` bytecode through `frontend`.
    pub fn new(
        frontend: F,
        settings: ShaderCompilerSettings,
        target: ShaderTarget,
        logger: GraphicsLogger,
    ) -> Self {
        Self {
            frontend,
            settings,
            target,
            logger,
        }
    }

    /// The front-end the compiler drives.
    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    /// The bytecode this compiler produces.
    pub fn target(&self) -> ShaderTarget {
        self.target
    }

    /// The target profile for `stage`, e.g. `ps_6_5`.
    pub fn profile(&self, stage: ShaderStage) -> String {
        format!("{}_{}", profile_prefix(stage), self.settings.shader_model)
    }

    /// Builds the argument list for `request`.
    ///
    /// Defines come in key order. Include directories of the request are searched
    /// before the configured ones.
    pub fn arguments(&self, request: &ShaderCompileRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            request.source_path.clone().into_os_string(),
            "-E".into(),
            request.entry_point.clone().into(),
            "-T".into(),
            self.profile(request.stage).into(),
        ];
        if self.settings.strip_debug_info {
            args.push("-Qstrip_debug".into());
            args.push("-Qstrip_reflect".into());
        }
        if self.target == ShaderTarget::Spirv {
            args.push("-spirv".into());
        }
        for (name, value) in &request.defines {
            args.push("-D".into());
            if value.is_empty() {
                args.push(name.into());
            } else {
                args.push(format!("{name}={value}").into());
            }
        }
        for dir in request.include_dirs.iter().chain(&self.settings.include_dirs) {
            args.push("-I".into());
            args.push(dir.clone().into_os_string());
        }
        args
    }
}

impl DxcShaderCompiler<DxcProcess> {
    /// A compiler running the configured `dxc` executable for the configured backend.
    pub fn from_settings(settings: &RhiSettings, logger: GraphicsLogger) -> Self {
        Self::new(
            DxcProcess::new(&settings.shader.compiler_path),
            settings.shader.clone(),
            settings.backend.into(),
            logger,
        )
    }
}

impl<F: CompilerFrontend> ShaderCompiler for DxcShaderCompiler<F> {
    fn compile(&self, request: &ShaderCompileRequest) -> Result<Vec<u8>, ShaderError> {
        let source = request.source_path.display().to_string();
        if !self.frontend.source_exists(&request.source_path) {
            self.logger
                .critical(format!("Shader file '{source}' doesn't exist"));
            return Err(ShaderError::LoadError {
                path: source,
                source_error: "file not found".to_string(),
            });
        }

        let args = self.arguments(request);
        log::debug!(
            "DxcShaderCompiler: Compiling '{source}' ({}, entry point '{}')",
            self.profile(request.stage),
            request.entry_point
        );
        let details = match self.frontend.invoke(&args) {
            Ok(output) if output.success => {
                if !output.diagnostics.is_empty() {
                    log::warn!("DxcShaderCompiler: '{source}': {}", output.diagnostics);
                }
                log::debug!(
                    "DxcShaderCompiler: Compiled '{source}' into {} bytes",
                    output.object.len()
                );
                return Ok(output.object);
            }
            Ok(output) => output.diagnostics,
            Err(err) => format!("{err:#}"),
        };
        self.logger.critical(format!(
            "Failed to compile shader '{source}' (entry point '{}'), info:\n{details}",
            request.entry_point
        ));
        Err(ShaderError::CompilationError {
            label: source,
            details,
        })
    }
}

/// A [`CompilerFrontend`] that runs a DXC executable.
#[derive(Debug, Clone)]
pub struct DxcProcess {
    executable: PathBuf,
}

impl DxcProcess {
    /// Runs `executable`, resolved through `PATH` if it is a bare name.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl CompilerFrontend for DxcProcess {
    fn invoke(&self, arguments: &[OsString]) -> anyhow::Result<FrontendOutput> {
        let out_dir = tempfile::tempdir().context("Failed to create a scratch directory")?;
        let object_path = out_dir.path().join("shader.bin");
        let output = Command::new(&self.executable)
            .args(arguments)
            .arg("-Fo")
            .arg(&object_path)
            .output()
            .with_context(|| format!("Failed to run '{}'", self.executable.display()))?;

        let mut diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        if diagnostics.trim().is_empty() {
            diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        }
        if !output.status.success() {
            return Ok(FrontendOutput {
                success: false,
                object: Vec::new(),
                diagnostics,
            });
        }
        let object = std::fs::read(&object_path).with_context(|| {
            format!("Failed to read compiler output '{}'", object_path.display())
        })?;
        Ok(FrontendOutput {
            success: true,
            object,
            diagnostics,
        })
    }
}
