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

//! Defines data structures related to GPU buffer resources.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// A set of flags describing the allowed usages of a buffer.
    ///
    /// Backends use them to pick native usage bits and to validate binding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// The buffer can be used as the source of a copy operation.
        const COPY_SRC = 1 << 0;
        /// The buffer can be used as the destination of a copy operation.
        const COPY_DST = 1 << 1;
        /// The buffer can be bound as a vertex buffer.
        const VERTEX = 1 << 2;
        /// The buffer can be bound as an index buffer.
        const INDEX = 1 << 3;
        /// The buffer can be bound as a uniform buffer.
        const UNIFORM = 1 << 4;
        /// The buffer can be bound as a storage buffer (read/write access from shaders).
        const STORAGE = 1 << 5;
        /// The buffer can be used for indirect draw or dispatch commands.
        const INDIRECT = 1 << 6;
    }
}

/// Where the memory backing a resource lives, and who can see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MemoryLocation {
    /// Device-local memory. The host cannot map it.
    #[default]
    GpuOnly,
    /// Host-visible memory written by the CPU and read by the GPU (uploads).
    CpuToGpu,
    /// Host-visible memory written by the GPU and read back by the CPU.
    GpuToCpu,
}

impl MemoryLocation {
    /// Returns `true` if the host can map memory in this location.
    pub fn is_host_visible(&self) -> bool {
        !matches!(self, MemoryLocation::GpuOnly)
    }
}

/// A descriptor used to create a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDescriptor {
    /// An optional debug label for the buffer. Empty means no name.
    pub label: String,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// A bitmask of [`BufferUsage`] flags describing how the buffer will be used.
    pub usage: BufferUsage,
    /// Where the buffer memory lives.
    pub location: MemoryLocation,
    /// If `true` and the memory is host-visible, the buffer stays mapped for its whole
    /// lifetime and [`unmap`](crate::renderer::traits::Buffer::unmap) becomes a no-op.
    pub persistently_mapped: bool,
}

impl BufferDescriptor {
    /// A host-visible upload buffer that stays mapped.
    pub fn upload(label: impl Into<String>, size: u64, usage: BufferUsage) -> Self {
        Self {
            label: label.into(),
            size,
            usage,
            location: MemoryLocation::CpuToGpu,
            persistently_mapped: true,
        }
    }

    /// A device-local buffer.
    pub fn device_local(label: impl Into<String>, size: u64, usage: BufferUsage) -> Self {
        Self {
            label: label.into(),
            size,
            usage,
            location: MemoryLocation::GpuOnly,
            persistently_mapped: false,
        }
    }

    /// Returns `true` if the buffer is mapped once at creation and never unmapped.
    pub fn keeps_persistent_mapping(&self) -> bool {
        self.persistently_mapped && self.location.is_host_visible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistent_mapping_requires_host_visible_memory() {
        let mut desc = BufferDescriptor::device_local("vb", 64, BufferUsage::VERTEX);
        desc.persistently_mapped = true;
        assert!(!desc.keeps_persistent_mapping());

        let upload = BufferDescriptor::upload("staging", 64, BufferUsage::COPY_SRC);
        assert!(upload.keeps_persistent_mapping());
    }
}
