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

//! Buffers and images bound to allocator memory.

use super::conversions::IntoVulkan;
use super::device::VulkanShared;
use super::raw::{
    AllocationRequest, BufferInfo, ImageInfo, ImageViewInfo, Owned, OwnedAllocation,
};
use aether_core::renderer::api::resource::{
    BufferDescriptor, TextureDescriptor, TextureDimension, TextureViewDescriptor,
};
use aether_core::renderer::error::ResourceError;
use aether_core::renderer::traits::{Buffer, Texture};
use ash::vk;
use std::any::Any;
use std::collections::HashMap;
use std::ptr::NonNull;
use std::sync::{Arc, Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug, Clone, Copy)]
struct MappedPtr(NonNull<u8>);

// SAFETY: the pointer targets allocator-owned memory that stays valid until `unmap`,
// and every access to it goes through the owning buffer's mutex.
unsafe impl Send for MappedPtr {}
unsafe impl Sync for MappedPtr {}

/// The create info of a buffer. Zero-sized buffers are rounded up to one byte.
pub fn buffer_info(desc: &BufferDescriptor) -> BufferInfo {
    BufferInfo {
        size: desc.size.max(1),
        usage: desc.usage.into_vulkan(),
    }
}

/// A buffer with a dedicated block of allocator memory.
#[derive(Debug)]
pub struct BufferVulkan {
    mapped: Mutex<Option<MappedPtr>>,
    // Destroyed before its memory is freed.
    buffer: Owned<vk::Buffer>,
    memory: OwnedAllocation,
    desc: BufferDescriptor,
}

impl BufferVulkan {
    pub(crate) fn new(shared: &VulkanShared, desc: &BufferDescriptor) -> Result<Self, ResourceError> {
        let report = |what: &str, err: vk::Result| {
            shared
                .logger
                .critical(format!("Failed to {what} for buffer '{}': {err}", desc.label));
            ResourceError::Allocation(err.to_string())
        };

        let raw = shared
            .raw
            .create_buffer(&buffer_info(desc))
            .map_err(|err| report("create the buffer", err))?;
        let buffer = Owned::new(shared.raw.clone(), raw);

        let request = AllocationRequest {
            label: &desc.label,
            requirements: shared.raw.buffer_memory_requirements(raw),
            location: desc.location,
            linear: true,
        };
        let allocation = shared
            .allocator
            .allocate(&request)
            .map_err(|err| report("allocate memory", err))?;
        let memory = OwnedAllocation::new(shared.allocator.clone(), allocation);
        shared
            .raw
            .bind_buffer_memory(raw, allocation.memory, allocation.offset)
            .map_err(|err| report("bind memory", err))?;
        shared.name_object(raw, &desc.label);

        let buffer = Self {
            mapped: Mutex::new(None),
            buffer,
            memory,
            desc: desc.clone(),
        };
        if desc.keeps_persistent_mapping() {
            buffer.map()?;
        }
        Ok(buffer)
    }

    /// The native buffer.
    pub fn raw(&self) -> vk::Buffer {
        self.buffer.raw()
    }

    /// The memory block backing the buffer.
    pub fn memory(&self) -> &OwnedAllocation {
        &self.memory
    }
}

impl Buffer for BufferVulkan {
    fn descriptor(&self) -> &BufferDescriptor {
        &self.desc
    }

    fn map(&self) -> Result<NonNull<u8>, ResourceError> {
        if !self.desc.location.is_host_visible() {
            return Err(ResourceError::NotMappable);
        }
        let mut mapped = lock(&self.mapped);
        if let Some(ptr) = *mapped {
            return Ok(ptr.0);
        }
        let ptr = self
            .memory
            .allocator()
            .map(self.memory.allocation())
            .map_err(|err| {
                ResourceError::BackendError(format!("failed to map '{}': {err}", self.desc.label))
            })?;
        *mapped = Some(MappedPtr(ptr));
        Ok(ptr)
    }

    fn unmap(&self) {
        if self.desc.keeps_persistent_mapping() {
            return;
        }
        if lock(&self.mapped).take().is_some() {
            self.memory.allocator().unmap(self.memory.allocation());
        }
    }

    fn is_mapped(&self) -> bool {
        lock(&self.mapped).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for BufferVulkan {
    fn drop(&mut self) {
        if lock(&self.mapped).take().is_some() {
            self.memory.allocator().unmap(self.memory.allocation());
        }
    }
}

/// The create info of an image.
pub fn image_info(desc: &TextureDescriptor) -> ImageInfo {
    let (depth, array_layers) = desc.depth_and_layers();
    let flags = if desc.is_cube_compatible() {
        vk::ImageCreateFlags::CUBE_COMPATIBLE
    } else {
        vk::ImageCreateFlags::empty()
    };
    ImageInfo {
        flags,
        image_type: desc.dimension.into_vulkan(),
        format: desc.format.into_vulkan(),
        width: desc.width.max(1),
        height: if desc.dimension == TextureDimension::D1 {
            1
        } else {
            desc.height.max(1)
        },
        depth: depth.max(1),
        mip_levels: desc.mip_levels.max(1),
        array_layers: array_layers.max(1),
        usage: desc.usage.into_vulkan(),
    }
}

/// The create info of a view of `image`.
pub fn image_view_info(image: vk::Image, view: &TextureViewDescriptor) -> ImageViewInfo {
    ImageViewInfo {
        image,
        view_type: view.dimension.into_vulkan(),
        format: view.format.into_vulkan(),
        aspect_mask: view.aspects.into_vulkan(),
        base_mip_level: view.base_mip_level,
        level_count: view.mip_level_count,
        base_array_layer: view.base_array_layer,
        layer_count: view.array_layer_count,
    }
}

#[derive(Debug)]
enum Image {
    Owned {
        // Destroyed before its memory is freed.
        image: Owned<vk::Image>,
        _memory: OwnedAllocation,
    },
    External(vk::Image),
}

impl Image {
    fn raw(&self) -> vk::Image {
        match self {
            Image::Owned { image, .. } => image.raw(),
            Image::External(raw) => *raw,
        }
    }
}

/// An image with its cache of views.
#[derive(Debug)]
pub struct TextureVulkan {
    // Views are destroyed before the image they point into.
    views: Mutex<HashMap<TextureViewDescriptor, Owned<vk::ImageView>>>,
    image: Image,
    desc: TextureDescriptor,
    shared: Arc<VulkanShared>,
}

impl TextureVulkan {
    pub(crate) fn new(
        shared: Arc<VulkanShared>,
        desc: &TextureDescriptor,
    ) -> Result<Self, ResourceError> {
        let report = |what: &str, err: vk::Result| {
            shared
                .logger
                .critical(format!("Failed to {what} for texture '{}': {err}", desc.label));
            ResourceError::Allocation(err.to_string())
        };
        desc.validate().map_err(|err| {
            shared.logger.critical(err.to_string());
            err
        })?;

        let raw = shared
            .raw
            .create_image(&image_info(desc))
            .map_err(|err| report("create the image", err))?;
        let image = Owned::new(shared.raw.clone(), raw);

        let request = AllocationRequest {
            label: &desc.label,
            requirements: shared.raw.image_memory_requirements(raw),
            location: desc.location,
            linear: false,
        };
        let allocation = shared
            .allocator
            .allocate(&request)
            .map_err(|err| report("allocate memory", err))?;
        let memory = OwnedAllocation::new(shared.allocator.clone(), allocation);
        shared
            .raw
            .bind_image_memory(raw, allocation.memory, allocation.offset)
            .map_err(|err| report("bind memory", err))?;
        shared.name_object(raw, &desc.label);

        Ok(Self {
            views: Mutex::new(HashMap::new()),
            image: Image::Owned {
                image,
                _memory: memory,
            },
            desc: desc.clone(),
            shared,
        })
    }

    /// Wraps an image owned elsewhere, e.g. a swapchain image. It is never destroyed.
    pub(crate) fn external(
        shared: Arc<VulkanShared>,
        raw: vk::Image,
        desc: &TextureDescriptor,
    ) -> Self {
        Self {
            views: Mutex::new(HashMap::new()),
            image: Image::External(raw),
            desc: desc.clone(),
            shared,
        }
    }

    /// The native image.
    pub fn raw(&self) -> vk::Image {
        self.image.raw()
    }

    /// The native format of the image.
    pub fn raw_format(&self) -> vk::Format {
        self.desc.format.into_vulkan()
    }

    /// Returns the image view for `view`, creating it on first use.
    pub fn view(&self, view: &TextureViewDescriptor) -> Result<vk::ImageView, ResourceError> {
        view.validate(&self.desc)?;
        let mut views = lock(&self.views);
        if let Some(existing) = views.get(view) {
            log::trace!("TextureVulkan: view cache hit on '{}'", self.desc.label);
            return Ok(existing.raw());
        }
        log::trace!("TextureVulkan: view cache miss on '{}'", self.desc.label);
        let raw = self
            .shared
            .raw
            .create_image_view(&image_view_info(self.image.raw(), view))
            .map_err(|err| {
                ResourceError::BackendError(format!(
                    "failed to create a view of '{}': {err}",
                    self.desc.label
                ))
            })?;
        views.insert(*view, Owned::new(self.shared.raw.clone(), raw));
        Ok(raw)
    }
}

impl Texture for TextureVulkan {
    fn descriptor(&self) -> &TextureDescriptor {
        &self.desc
    }

    fn is_external(&self) -> bool {
        matches!(self.image, Image::External(_))
    }

    fn view_handle(&self, view: &TextureViewDescriptor) -> Result<u64, ResourceError> {
        self.view(view).map(|raw| vk::Handle::as_raw(raw))
    }

    fn cached_view_count(&self) -> usize {
        lock(&self.views).len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_core::renderer::api::resource::{TextureUsage, TextureViewDimension};
    use aether_core::renderer::api::util::enums::{FormatAspects, ResourceFormat};

    #[test]
    fn cube_textures_are_cube_compatible() {
        let desc = TextureDescriptor {
            width: 64,
            height: 64,
            depth_or_layers: 6,
            usage: TextureUsage::TEXTURE_BINDING,
            ..Default::default()
        };
        assert!(desc.is_cube_compatible());
        let info = image_info(&desc);
        assert!(info.flags.contains(vk::ImageCreateFlags::CUBE_COMPATIBLE));
        assert_eq!(info.array_layers, 6);
        assert_eq!(info.depth, 1);
    }

    #[test]
    fn view_aspects_follow_the_descriptor() {
        let desc = TextureDescriptor {
            format: ResourceFormat::Depth24UnormStencil8,
            usage: TextureUsage::DEPTH_STENCIL_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
            ..Default::default()
        };
        let whole = TextureViewDescriptor::whole(&desc);
        let info = image_view_info(vk::Image::null(), &whole);
        assert_eq!(
            info.aspect_mask,
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        );
        let sampled = TextureViewDescriptor {
            aspects: FormatAspects::DEPTH,
            ..whole
        };
        let info = image_view_info(vk::Image::null(), &sampled);
        assert_eq!(info.aspect_mask, vk::ImageAspectFlags::DEPTH);
        assert_eq!(info.format, vk::Format::D24_UNORM_S8_UINT);
    }

    #[test]
    fn cube_views_count_faces() {
        let desc = TextureDescriptor {
            depth_or_layers: 12,
            ..Default::default()
        };
        let view = TextureViewDescriptor {
            dimension: TextureViewDimension::CubeArray,
            ..TextureViewDescriptor::whole(&desc)
        };
        let info = image_view_info(vk::Image::null(), &view);
        assert_eq!(info.view_type, vk::ImageViewType::CUBE_ARRAY);
        assert_eq!(info.layer_count, 12);
    }
}
