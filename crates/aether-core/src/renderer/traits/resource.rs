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

//! Capability traits for the objects a device hands out.
//!
//! Each backend has one concrete type per trait. Backend code that needs the native
//! object behind a trait object recovers it with `as_any().downcast_ref()`.

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use bytemuck::Pod;
use std::any::Any;
use std::fmt::Debug;
use std::ptr::NonNull;

/// A compiled shader stage.
pub trait ShaderModule: Send + Sync + Debug {
    /// The stage this module was compiled for.
    fn stage(&self) -> ShaderStage;

    /// The entry point function name.
    fn entry_point(&self) -> &str;

    /// The bytecode, exactly as handed to the device.
    fn bytecode(&self) -> &[u8];

    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}

/// A sampler object.
pub trait Sampler: Send + Sync + Debug {
    /// The description the sampler was created from.
    fn descriptor(&self) -> &SamplerDescriptor;

    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}

/// A linear block of GPU memory.
pub trait Buffer: Send + Sync + Debug {
    /// The description the buffer was created from.
    fn descriptor(&self) -> &BufferDescriptor;

    /// The size of the buffer in bytes.
    fn size(&self) -> u64 {
        self.descriptor().size
    }

    /// Maps the buffer into host memory.
    ///
    /// If a mapping is already active (persistent or outstanding), the same pointer is
    /// returned without mapping again.
    /// ## Errors
    /// * `ResourceError::NotMappable` - If the buffer lives in device-local memory.
    fn map(&self) -> Result<NonNull<u8>, ResourceError>;

    /// Releases the host mapping. Does nothing for persistently mapped buffers.
    fn unmap(&self);

    /// Returns `true` if the buffer currently has a host mapping.
    fn is_mapped(&self) -> bool;

    /// Copies `data` into the buffer at `offset`.
    ///
    /// An active mapping is reused and left in place; otherwise the buffer is
    /// mapped for the duration of the copy.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If the write does not fit in the buffer.
    fn write_bytes(&self, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let end = offset
            .checked_add(data.len() as u64)
            .ok_or(ResourceError::OutOfBounds)?;
        if end > self.size() {
            return Err(ResourceError::OutOfBounds);
        }
        let was_mapped = self.is_mapped();
        let base = self.map()?;
        // SAFETY: `map` returns a pointer to at least `size()` bytes and the range
        // `offset..end` was checked against it.
        unsafe {
            std::ptr::copy_nonoverlapping(
                data.as_ptr(),
                base.as_ptr().add(offset as usize),
                data.len(),
            );
        }
        if !was_mapped {
            self.unmap();
        }
        Ok(())
    }

    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Buffer {
    /// Copies a slice of plain-old-data values into the buffer at `offset`.
    pub fn write_pod<T: Pod>(&self, offset: u64, values: &[T]) -> Result<(), ResourceError> {
        self.write_bytes(offset, bytemuck::cast_slice(values))
    }
}

/// An image with a cache of derived views.
pub trait Texture: Send + Sync + Debug {
    /// The description the texture was created from.
    fn descriptor(&self) -> &TextureDescriptor;

    /// The aspects covered by the texture format.
    fn aspect(&self) -> FormatAspects {
        self.descriptor().format.aspects()
    }

    /// Splits `depth_or_layers` into `(depth, array_layers)`.
    fn depth_and_layers(&self) -> (u32, u32) {
        self.descriptor().depth_and_layers()
    }

    /// Returns `true` if the image is owned by someone else (e.g. a swapchain).
    fn is_external(&self) -> bool;

    /// Returns the native view for `view`, creating and caching it on first use.
    ///
    /// The returned value is the raw native handle. Equal descriptors always return
    /// the same handle.
    fn view_handle(&self, view: &TextureViewDescriptor) -> Result<u64, ResourceError>;

    /// The number of views currently cached.
    fn cached_view_count(&self) -> usize;

    /// Allows downcasting to the backend type.
    fn as_any(&self) -> &dyn Any;
}
