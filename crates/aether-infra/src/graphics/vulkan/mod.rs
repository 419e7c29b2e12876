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

//! The Vulkan backend.
//!
//! Pipelines use dynamic rendering, so no render pass objects exist. The backend
//! drives the device through [`VulkanRawDevice`] and draws memory from a
//! [`DeviceAllocator`]; both are implemented for `ash` in [`ash_device`].

pub mod ash_device;
pub mod conversions;
mod device;
mod headless;
pub mod layout;
mod pipeline;
pub mod raw;
mod resource;
mod sampler;
mod shader;

pub use self::ash_device::{AshDevice, GpuAllocator};
pub use self::device::{VulkanDevice, SPIRV_MAGIC};
pub use self::headless::{HeadlessVulkanDevice, HeadlessVulkanLog};
pub use self::layout::PipelineLayoutVulkan;
pub use self::pipeline::{vertex_input, ComputePipelineVulkan, RenderPipelineVulkan};
pub use self::raw::{DeviceAllocator, VulkanRawDevice};
pub use self::resource::{buffer_info, image_info, image_view_info, BufferVulkan, TextureVulkan};
pub use self::sampler::{sampler_info, SamplerVulkan};
pub use self::shader::ShaderModuleVulkan;
