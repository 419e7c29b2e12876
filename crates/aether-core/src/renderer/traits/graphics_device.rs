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
use crate::renderer::error::ResourceError;
use crate::renderer::logging::GraphicsLogger;
use crate::renderer::traits::{Buffer, ComputePipeline, RenderPipeline, Sampler, ShaderModule, Texture};
use std::fmt::Debug;
use std::sync::Arc;

/// The main interface for creating GPU objects on one native backend.
///
/// Every object keeps the device alive; dropping the device handle while objects
/// exist only drops the last reference once they are gone.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// The native API this device drives.
    fn backend_type(&self) -> GraphicsBackendType;

    /// The settings the device was created with.
    fn settings(&self) -> &RhiSettings;

    /// The logger fatal conditions are reported to.
    fn logger(&self) -> &GraphicsLogger;

    /// Creates a shader module from already compiled bytecode.
    /// ## Errors
    /// * `ResourceError` - If the bytecode is rejected.
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<Arc<dyn ShaderModule>, ResourceError>;

    /// Creates a sampler. The result can also be used as an immutable sampler in a layout.
    fn create_sampler(&self, descriptor: &SamplerDescriptor)
        -> Result<Arc<dyn Sampler>, ResourceError>;

    /// Creates a buffer and its backing allocation.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<Arc<dyn Buffer>, ResourceError>;

    /// Creates a texture and its backing allocation.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
    ) -> Result<Arc<dyn Texture>, ResourceError>;

    /// Creates a render pipeline.
    ///
    /// The native layout is built immediately; the pipeline state object is built
    /// on the first call to [`RenderPipeline::set_target_formats`].
    /// ## Errors
    /// * `ResourceError::Pipeline` - If the layout or a shader module is invalid.
    fn create_render_pipeline(
        &self,
        descriptor: RenderPipelineDescriptor,
    ) -> Result<Box<dyn RenderPipeline>, ResourceError>;

    /// Creates a compute pipeline. The pipeline state object is built immediately.
    fn create_compute_pipeline(
        &self,
        descriptor: ComputePipelineDescriptor,
    ) -> Result<Box<dyn ComputePipeline>, ResourceError>;
}
