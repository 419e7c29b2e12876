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

//! Provides the public, backend-agnostic rendering contracts.
//!
//! This module defines the "common language" for all rendering operations: the
//! abstract `traits` (like [`GraphicsDevice`]), descriptors (like
//! [`RenderPipelineDescriptor`]), the logging boundary and the error types.
//!
//! The 'how' is handled by the concrete backends in the `aether-infra` crate,
//! which implement these traits on top of D3D12 and Vulkan.

pub mod api;
pub mod error;
pub mod logging;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{PipelineError, RenderError, ResourceError, ShaderError};
pub use self::logging::{FacadeSink, GraphicsLogger, LogSink, MemorySink, Severity};
pub use self::traits::{
    Buffer, ComputePipeline, GraphicsDevice, RenderPipeline, Sampler, ShaderCompiler,
    ShaderModule, Texture,
};
