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

mod common;

use aether_core::renderer::api::*;
use aether_core::renderer::error::ShaderError;
use aether_core::renderer::logging::Severity;
use aether_core::renderer::traits::ShaderCompiler;
use aether_infra::{CompilerFrontend, DxcProcess, DxcShaderCompiler, FrontendOutput, ShaderTarget};
use common::*;
use std::ffi::OsString;
use std::io::Write;
use std::sync::Mutex;

/// A front-end that answers every invocation with a fixed output.
struct Canned {
    output: FrontendOutput,
    calls: Mutex<Vec<Vec<OsString>>>,
}

impl Canned {
    fn new(output: FrontendOutput) -> Self {
        Self {
            output,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Vec<OsString>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CompilerFrontend for Canned {
    fn invoke(&self, arguments: &[OsString]) -> anyhow::Result<FrontendOutput> {
        self.calls.lock().unwrap().push(arguments.to_vec());
        Ok(self.output.clone())
    }
}

fn source_file() -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".hlsl").tempfile()?;
    writeln!(file, "float4 main() : SV_Target {{ return 1; }}")?;
    Ok(file)
}

#[test]
fn compiles_an_existing_source() -> anyhow::Result<()> {
    init_logging();
    let source = source_file()?;
    let (sink, logger) = recording_logger();
    let frontend = Canned::new(FrontendOutput {
        success: true,
        object: vec![0x44, 0x58, 0x42, 0x43],
        diagnostics: "warning: unused variable".to_string(),
    });
    let compiler = DxcShaderCompiler::new(
        frontend,
        ShaderCompilerSettings::default(),
        ShaderTarget::Spirv,
        logger,
    );
    let request = ShaderCompileRequest::new(source.path(), "main", ShaderStage::Fragment);
    let object = compiler.compile(&request)?;
    assert_eq!(object, vec![0x44, 0x58, 0x42, 0x43]);

    let calls = compiler.frontend().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0][0].as_os_str(), source.path().as_os_str());
    assert!(calls[0].iter().any(|arg| arg == "-spirv"));
    assert!(calls[0].iter().any(|arg| arg == "ps_6_5"));
    // Warnings do not reach the fatal channel.
    assert!(sink.records().is_empty());
    Ok(())
}

#[test]
fn missing_source_is_not_handed_to_the_compiler() {
    init_logging();
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing.hlsl");
    let (sink, logger) = recording_logger();
    let compiler = DxcShaderCompiler::new(
        Canned::new(FrontendOutput::default()),
        ShaderCompilerSettings::default(),
        ShaderTarget::Dxil,
        logger,
    );
    let err = compiler
        .compile(&ShaderCompileRequest::new(&missing, "main", ShaderStage::Vertex))
        .unwrap_err();
    assert!(matches!(err, ShaderError::LoadError { .. }));
    assert_eq!(sink.count(Severity::Critical), 1);
    let records = sink.records();
    assert!(records[0].1.contains("doesn't exist"));
    assert!(compiler.frontend().calls().is_empty());
}

#[test]
fn rejected_source_reports_diagnostics_once() -> anyhow::Result<()> {
    init_logging();
    let source = source_file()?;
    let (sink, logger) = recording_logger();
    let compiler = DxcShaderCompiler::new(
        Canned::new(FrontendOutput {
            success: false,
            object: Vec::new(),
            diagnostics: "error: undeclared identifier 'albedo'".to_string(),
        }),
        ShaderCompilerSettings::default(),
        ShaderTarget::Dxil,
        logger,
    );
    let err = compiler
        .compile(&ShaderCompileRequest::new(source.path(), "PSMain", ShaderStage::Fragment))
        .unwrap_err();
    let ShaderError::CompilationError { details, .. } = err else {
        panic!("expected a compilation error");
    };
    assert!(details.contains("undeclared identifier"));
    assert_eq!(sink.count(Severity::Critical), 1);
    assert!(sink.records()[0].1.contains("PSMain"));
    Ok(())
}

#[test]
fn unavailable_compiler_is_a_compilation_error() -> anyhow::Result<()> {
    init_logging();
    let source = source_file()?;
    let dir = tempfile::tempdir()?;
    let (sink, logger) = recording_logger();
    let compiler = DxcShaderCompiler::new(
        DxcProcess::new(dir.path().join("no-such-dxc")),
        ShaderCompilerSettings::default(),
        ShaderTarget::Dxil,
        logger,
    );
    let err = compiler
        .compile(&ShaderCompileRequest::new(source.path(), "main", ShaderStage::Compute))
        .unwrap_err();
    assert!(matches!(err, ShaderError::CompilationError { .. }));
    assert_eq!(sink.count(Severity::Critical), 1);
    assert!(sink.records()[0].1.contains("no-such-dxc"));
    Ok(())
}

#[test]
fn compiler_follows_configured_backend() {
    let settings = RhiSettings {
        backend: GraphicsBackendType::Vulkan,
        ..Default::default()
    };
    let compiler = DxcShaderCompiler::from_settings(&settings, Default::default());
    assert_eq!(compiler.target(), ShaderTarget::Spirv);
    assert_eq!(compiler.profile(ShaderStage::Compute), "cs_6_5");
}
