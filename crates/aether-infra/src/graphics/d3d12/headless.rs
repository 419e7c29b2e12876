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

//! A D3D12 raw device that needs no GPU.
//!
//! Every description handed to [`HeadlessD3D12Device`] is recorded and answered
//! with a fresh synthetic handle. Upload and readback resources get real host
//! memory so mapping and writes can be observed.

use super::native::*;
use super::raw::D3D12RawDevice;
use std::collections::HashMap;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Everything a [`HeadlessD3D12Device`] has been asked to do.
#[derive(Debug, Default)]
pub struct HeadlessD3D12Log {
    /// Created root signatures.
    pub root_signatures: Vec<(RawHandle, RootSignatureDesc)>,
    /// Created graphics pipeline states.
    pub graphics_pipelines: Vec<(RawHandle, GraphicsPipelineStateDesc)>,
    /// Created compute pipeline states.
    pub compute_pipelines: Vec<(RawHandle, ComputePipelineStateDesc)>,
    /// Created committed resources.
    pub resources: Vec<(RawHandle, HeapType, ResourceDesc)>,
    /// Created shader resource views, with the resource they view.
    pub shader_resource_views: Vec<(DescriptorHandle, RawHandle, ShaderResourceViewDesc)>,
    /// Created samplers.
    pub samplers: Vec<(DescriptorHandle, SamplerDesc)>,
    /// Debug names, in the order they were set.
    pub names: Vec<(RawHandle, String)>,
    /// Released objects, in release order.
    pub released: Vec<RawHandle>,
    /// Freed descriptor heap slots, in free order.
    pub freed_descriptors: Vec<DescriptorHandle>,
    /// Number of successful `map` calls.
    pub map_calls: usize,
    /// Number of `unmap` calls.
    pub unmap_calls: usize,
}

/// A recording [`D3D12RawDevice`].
#[derive(Debug, Default)]
pub struct HeadlessD3D12Device {
    next_handle: AtomicU64,
    fail_root_signatures: AtomicBool,
    fail_graphics_pipelines: AtomicBool,
    log: Mutex<HeadlessD3D12Log>,
    memory: Mutex<HashMap<RawHandle, Box<[u8]>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl HeadlessD3D12Device {
    /// Creates a device with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following root signature creation fail with `E_INVALIDARG`.
    pub fn fail_root_signatures(&self, fail: bool) {
        self.fail_root_signatures.store(fail, Ordering::SeqCst);
    }

    /// Makes every following graphics pipeline creation fail with `E_INVALIDARG`.
    pub fn fail_graphics_pipelines(&self, fail: bool) {
        self.fail_graphics_pipelines.store(fail, Ordering::SeqCst);
    }

    /// Locks and returns the record of everything the device was asked to do.
    pub fn log(&self) -> MutexGuard<'_, HeadlessD3D12Log> {
        lock(&self.log)
    }

    /// A copy of the host memory behind an upload or readback resource.
    pub fn memory(&self, resource: RawHandle) -> Option<Vec<u8>> {
        lock(&self.memory).get(&resource).map(|bytes| bytes.to_vec())
    }

    /// Returns `true` if `object` was created and not yet released.
    pub fn is_alive(&self, object: RawHandle) -> bool {
        let log = self.log();
        let created = log.root_signatures.iter().any(|(h, _)| *h == object)
            || log.graphics_pipelines.iter().any(|(h, _)| *h == object)
            || log.compute_pipelines.iter().any(|(h, _)| *h == object)
            || log.resources.iter().any(|(h, _, _)| *h == object);
        created && !log.released.contains(&object)
    }

    fn next(&self) -> u64 {
        self.next_handle.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl D3D12RawDevice for HeadlessD3D12Device {
    fn create_root_signature(&self, desc: &RootSignatureDesc) -> Result<RawHandle, HResult> {
        if self.fail_root_signatures.load(Ordering::SeqCst) {
            return Err(HResult::INVALID_ARG);
        }
        let handle = RawHandle(self.next());
        self.log().root_signatures.push((handle, desc.clone()));
        Ok(handle)
    }

    fn create_graphics_pipeline_state(
        &self,
        desc: &GraphicsPipelineStateDesc,
    ) -> Result<RawHandle, HResult> {
        if self.fail_graphics_pipelines.load(Ordering::SeqCst) {
            return Err(HResult::INVALID_ARG);
        }
        let handle = RawHandle(self.next());
        self.log().graphics_pipelines.push((handle, desc.clone()));
        Ok(handle)
    }

    fn create_compute_pipeline_state(
        &self,
        desc: &ComputePipelineStateDesc,
    ) -> Result<RawHandle, HResult> {
        let handle = RawHandle(self.next());
        self.log().compute_pipelines.push((handle, desc.clone()));
        Ok(handle)
    }

    fn create_committed_resource(
        &self,
        heap: HeapType,
        desc: &ResourceDesc,
    ) -> Result<RawHandle, HResult> {
        let handle = RawHandle(self.next());
        if heap.is_cpu_accessible() {
            let len = usize::try_from(desc.width).map_err(|_| HResult::OUT_OF_MEMORY)?;
            lock(&self.memory).insert(handle, vec![0; len].into_boxed_slice());
        }
        self.log().resources.push((handle, heap, *desc));
        Ok(handle)
    }

    fn map(&self, resource: RawHandle) -> Result<NonNull<u8>, HResult> {
        let mut memory = lock(&self.memory);
        let bytes = memory.get_mut(&resource).ok_or(HResult::INVALID_ARG)?;
        // The boxed slice never moves while it stays in the map.
        let ptr = NonNull::new(bytes.as_mut_ptr()).ok_or(HResult::FAIL)?;
        self.log().map_calls += 1;
        Ok(ptr)
    }

    fn unmap(&self, _resource: RawHandle) {
        self.log().unmap_calls += 1;
    }

    fn create_shader_resource_view(
        &self,
        resource: RawHandle,
        desc: &ShaderResourceViewDesc,
    ) -> Result<DescriptorHandle, HResult> {
        let handle = DescriptorHandle(self.next());
        self.log()
            .shader_resource_views
            .push((handle, resource, *desc));
        Ok(handle)
    }

    fn create_sampler(&self, desc: &SamplerDesc) -> Result<DescriptorHandle, HResult> {
        let handle = DescriptorHandle(self.next());
        self.log().samplers.push((handle, *desc));
        Ok(handle)
    }

    fn free_descriptor(&self, handle: DescriptorHandle) {
        self.log().freed_descriptors.push(handle);
    }

    fn set_name(&self, object: RawHandle, name: &str) {
        self.log().names.push((object, name.to_string()));
    }

    fn release(&self, object: RawHandle) {
        lock(&self.memory).remove(&object);
        self.log().released.push(object);
    }
}
