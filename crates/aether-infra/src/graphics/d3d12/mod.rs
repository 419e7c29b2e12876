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

//! The D3D12 backend.
//!
//! The backend drives a native device through [`D3D12RawDevice`]. Root signatures,
//! pipeline states and resources are described with the plain values in [`native`]
//! and released through owning wrappers.

pub mod conversions;
mod device;
mod headless;
pub mod layout;
pub mod native;
mod pipeline;
mod raw;
mod resource;
mod sampler;
mod shader;

pub use self::device::D3D12Device;
pub use self::headless::{HeadlessD3D12Device, HeadlessD3D12Log};
pub use self::pipeline::{input_elements, ComputePipelineD3D12, RenderPipelineD3D12};
pub use self::raw::{ComPtr, D3D12RawDevice, OwnedDescriptor};
pub use self::resource::{
    buffer_resource_desc, shader_resource_view_desc, texture_resource_desc, BufferD3D12,
    TextureD3D12,
};
pub use self::sampler::{sampler_desc, static_sampler_desc, SamplerD3D12};
pub use self::shader::ShaderModuleD3D12;
