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

//! The boundary between the backend and a native D3D12 device.

use super::native::*;
use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

/// The subset of `ID3D12Device` the backend drives.
///
/// Every `create_*` call returns a reference the caller owns; it is given back
/// exactly once through [`release`](D3D12RawDevice::release) or
/// [`free_descriptor`](D3D12RawDevice::free_descriptor).
pub trait D3D12RawDevice: Send + Sync + fmt::Debug {
    /// Serializes `desc` and creates a root signature from the blob.
    fn create_root_signature(&self, desc: &RootSignatureDesc) -> Result<RawHandle, HResult>;

    /// `CreateGraphicsPipelineState`
    fn create_graphics_pipeline_state(
        &self,
        desc: &GraphicsPipelineStateDesc,
    ) -> Result<RawHandle, HResult>;

    /// `CreateComputePipelineState`
    fn create_compute_pipeline_state(
        &self,
        desc: &ComputePipelineStateDesc,
    ) -> Result<RawHandle, HResult>;

    /// `CreateCommittedResource`
    fn create_committed_resource(
        &self,
        heap: HeapType,
        desc: &ResourceDesc,
    ) -> Result<RawHandle, HResult>;

    /// `ID3D12Resource::Map` of subresource 0.
    fn map(&self, resource: RawHandle) -> Result<NonNull<u8>, HResult>;

    /// `ID3D12Resource::Unmap` of subresource 0.
    fn unmap(&self, resource: RawHandle);

    /// Allocates a CBV/SRV/UAV heap slot and writes a shader resource view into it.
    fn create_shader_resource_view(
        &self,
        resource: RawHandle,
        desc: &ShaderResourceViewDesc,
    ) -> Result<DescriptorHandle, HResult>;

    /// Allocates a sampler heap slot and writes a sampler into it.
    fn create_sampler(&self, desc: &SamplerDesc) -> Result<DescriptorHandle, HResult>;

    /// Returns a heap slot to its allocator.
    fn free_descriptor(&self, handle: DescriptorHandle);

    /// `SetPrivateData(WKPDID_D3DDebugObjectName, ...)`
    fn set_name(&self, object: RawHandle, name: &str);

    /// `IUnknown::Release`
    fn release(&self, object: RawHandle);
}

/// An owned reference to a native object, released on drop.
pub struct ComPtr {
    device: Arc<dyn D3D12RawDevice>,
    raw: RawHandle,
}

impl ComPtr {
    /// Takes ownership of `raw`.
    pub fn new(device: Arc<dyn D3D12RawDevice>, raw: RawHandle) -> Self {
        Self { device, raw }
    }

    /// The native handle. Valid as long as `self` is alive.
    pub fn raw(&self) -> RawHandle {
        self.raw
    }
}

impl fmt::Debug for ComPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComPtr").field(&self.raw).finish()
    }
}

impl Drop for ComPtr {
    fn drop(&mut self) {
        self.device.release(self.raw);
    }
}

/// An owned descriptor heap slot, freed on drop.
pub struct OwnedDescriptor {
    device: Arc<dyn D3D12RawDevice>,
    handle: DescriptorHandle,
}

impl OwnedDescriptor {
    /// Takes ownership of `handle`.
    pub fn new(device: Arc<dyn D3D12RawDevice>, handle: DescriptorHandle) -> Self {
        Self { device, handle }
    }

    /// The heap slot.
    pub fn handle(&self) -> DescriptorHandle {
        self.handle
    }
}

impl fmt::Debug for OwnedDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedDescriptor").field(&self.handle).finish()
    }
}

impl Drop for OwnedDescriptor {
    fn drop(&mut self) {
        self.device.free_descriptor(self.handle);
    }
}
