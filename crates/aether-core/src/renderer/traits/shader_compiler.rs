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

use crate::renderer::api::ShaderCompileRequest;
use crate::renderer::error::ShaderError;

/// Turns shader source files into bytecode for one backend.
pub trait ShaderCompiler: Send + Sync {
    /// Compiles one entry point.
    /// ## Errors
    /// * `ShaderError::LoadError` - If the source file does not exist.
    /// * `ShaderError::CompilationError` - If the compiler rejects the source.
    fn compile(&self, request: &ShaderCompileRequest) -> Result<Vec<u8>, ShaderError>;
}
