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

use crate::renderer::api::*;
use crate::renderer::error::PipelineError;
use std::any::Any;
use std::fmt::Debug;

/// A rasterization pipeline whose native state object is built lazily.
///
/// A new pipeline is not compiled. It compiles on the first call to
/// [`set_target_formats`](RenderPipeline::set_target_formats) and recompiles
/// only when the target formats change.
pub trait RenderPipeline: Send + Sync + Debug {
    /// The descriptor, including the latest target formats.
    fn descriptor(&self) -> &RenderPipelineDescriptor;

    /// Updates the render target formats and rebuilds the native pipeline if needed.
    ///
    /// Returns `Ok(true)` if a build happened.
    /// ## Errors
    /// * `PipelineError::CompilationFailed` - The pipeline is left uncompiled.
    fn set_target_formats(
        &mut self,
        color_formats: &[ResourceFormat],
        depth_stencil_format: ResourceFormat,
    ) -> Result<bool, PipelineError>;

    /// Returns `true` if a native pipeline state object exists.
    fn is_compiled(&self) -> bool;

    /// The primitive topology the pipeline assembles.
    fn topology(&self) -> PrimitiveTopology {
        self.descriptor().primitive_state.topology
    }

    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}

/// A compute pipeline, built once at creation.
pub trait ComputePipeline: Send + Sync + Debug {
    /// The descriptor the pipeline was built from.
    fn descriptor(&self) -> &ComputePipelineDescriptor;

    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}
