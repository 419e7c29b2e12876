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

//! Defines the hierarchy of error types for the rendering subsystem.

use std::fmt;

/// An error related to the loading or compilation of a shader.
#[derive(Debug)]
pub enum ShaderError {
    /// An error occurred while trying to load the shader source from a path.
    LoadError {
        /// The path of the file that failed to load.
        path: String,
        /// The underlying I/O or source error.
        source_error: String,
    },
    /// The shader source failed to compile into bytecode.
    CompilationError {
        /// A descriptive label for the shader, usually its source path.
        label: String,
        /// Detailed error messages from the shader compiler.
        details: String,
    },
    /// The specified entry point is not valid for the shader module.
    InvalidEntryPoint {
        /// The label of the shader module.
        label: String,
        /// The entry point name that was rejected.
        entry_point: String,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::LoadError { path, source_error } => {
                write!(
                    f,
                    "Failed to load shader source from '{path}': {source_error}"
                )
            }
            ShaderError::CompilationError { label, details } => {
                write!(f, "Shader compilation failed for '{label}': {details}")
            }
            ShaderError::InvalidEntryPoint { label, entry_point } => {
                write!(
                    f,
                    "Invalid entry point '{entry_point}' for shader module '{label}'"
                )
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation of a pipeline or its layout.
#[derive(Debug)]
pub enum PipelineError {
    /// The pipeline layout breaks one of the layout rules.
    InvalidLayout(String),
    /// The backend failed to create the native layout object.
    LayoutCreationFailed(String),
    /// The graphics backend failed to compile the full pipeline state object.
    CompilationFailed {
        /// A descriptive label for the pipeline, if available.
        label: Option<String>,
        /// Detailed error messages from the backend.
        details: String,
    },
    /// A shader module provided for the pipeline was invalid for its stage.
    InvalidShaderModuleForPipeline {
        /// The entry point of the offending shader module.
        entry_point: String,
        /// The label of the pipeline being created.
        pipeline_label: Option<String>,
    },
    /// The color target configuration is not compatible with the pipeline or device.
    IncompatibleColorTarget(String),
    /// An object created by another backend was handed to this backend.
    BackendMismatch {
        /// The backend that rejected the object.
        expected: &'static str,
        /// What kind of object was rejected.
        object: &'static str,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidLayout(msg) => {
                write!(f, "Invalid pipeline layout: {msg}")
            }
            PipelineError::LayoutCreationFailed(msg) => {
                write!(f, "Pipeline layout creation failed: {msg}")
            }
            PipelineError::CompilationFailed { label, details } => {
                write!(
                    f,
                    "Pipeline compilation failed for '{}': {}",
                    label.as_deref().unwrap_or("Unknown"),
                    details
                )
            }
            PipelineError::InvalidShaderModuleForPipeline {
                entry_point,
                pipeline_label,
            } => {
                write!(
                    f,
                    "Invalid shader module '{}' for pipeline '{}'",
                    entry_point,
                    pipeline_label.as_deref().unwrap_or("Unknown")
                )
            }
            PipelineError::IncompatibleColorTarget(msg) => {
                write!(f, "Incompatible color target: {msg}")
            }
            PipelineError::BackendMismatch { expected, object } => {
                write!(f, "The {object} was not created by the {expected} backend")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// An error related to the creation or use of a GPU resource (buffers, textures, etc.).
#[derive(Debug)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// A pipeline-specific error occurred.
    Pipeline(PipelineError),
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
    /// An attempt was made to access a resource out of its bounds (e.g., in a buffer).
    OutOfBounds,
    /// The resource lives in memory the host cannot map.
    NotMappable,
    /// The device memory allocator refused the request.
    Allocation(String),
    /// A texture or view descriptor lies outside what the texture or backend supports.
    InvalidDescriptor(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::Pipeline(err) => write!(f, "Pipeline resource error: {err}"),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
            ResourceError::OutOfBounds => {
                write!(f, "Resource access out of bounds.")
            }
            ResourceError::NotMappable => {
                write!(f, "Resource memory is not visible to the host.")
            }
            ResourceError::Allocation(msg) => {
                write!(f, "Device memory allocation failed: {msg}")
            }
            ResourceError::InvalidDescriptor(msg) => {
                write!(f, "Invalid resource descriptor: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            ResourceError::Pipeline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

impl From<PipelineError> for ResourceError {
    fn from(err: PipelineError) -> Self {
        ResourceError::Pipeline(err)
    }
}

/// A high-level error that can occur while setting up or driving a graphics device.
#[derive(Debug)]
pub enum RenderError {
    /// A failure occurred during the initialization of the graphics backend.
    InitializationFailed(String),
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize graphics backend: {msg}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

impl From<PipelineError> for RenderError {
    fn from(err: PipelineError) -> Self {
        RenderError::ResourceError(err.into())
    }
}

impl From<ShaderError> for RenderError {
    fn from(err: ShaderError) -> Self {
        RenderError::ResourceError(err.into())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn shader_error_display() {
        let err = ShaderError::LoadError {
            path: "shaders/missing.hlsl".to_string(),
            source_error: "File not found".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Failed to load shader source from 'shaders/missing.hlsl': File not found"
        );

        let err_comp = ShaderError::CompilationError {
            label: "MyShader".to_string(),
            details: "Syntax error at line 5".to_string(),
        };
        assert_eq!(
            format!("{err_comp}"),
            "Shader compilation failed for 'MyShader': Syntax error at line 5"
        );
    }

    #[test]
    fn resource_error_display_wrapping_shader_error() {
        let shader_err = ShaderError::InvalidEntryPoint {
            label: "lit.vs".to_string(),
            entry_point: "ma\0in".to_string(),
        };
        let res_err: ResourceError = shader_err.into();
        assert_eq!(
            format!("{res_err}"),
            "Shader resource error: Invalid entry point 'ma\0in' for shader module 'lit.vs'"
        );
        assert!(res_err.source().is_some());
    }

    #[test]
    fn render_error_chains_pipeline_error() {
        let render_err: RenderError = PipelineError::LayoutCreationFailed("E_INVALIDARG".into()).into();
        assert_eq!(
            format!("{render_err}"),
            "Graphics resource operation failed: Pipeline resource error: Pipeline layout creation failed: E_INVALIDARG"
        );
        assert!(render_err.source().is_some());
        assert!(render_err.source().and_then(|e| e.source()).is_some());
    }

    #[test]
    fn backend_mismatch_display() {
        let err = PipelineError::BackendMismatch {
            expected: "Vulkan",
            object: "shader module",
        };
        assert_eq!(
            err.to_string(),
            "The shader module was not created by the Vulkan backend"
        );
    }
}
