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

//! Committed buffers and textures.

use super::conversions::{shader_resource_format, IntoD3D12};
use super::device::D3D12Shared;
use super::native::{
    self, DxgiFormat, HeapType, RawHandle, ResourceDesc, ResourceDimension, ResourceFlags,
    SampleDesc, ShaderResourceViewDesc, SrvDimension, DEFAULT_SHADER_4_COMPONENT_MAPPING,
};
use super::raw::{ComPtr, OwnedDescriptor};
use aether_core::renderer::api::resource::{
    BufferDescriptor, TextureDescriptor, TextureUsage, TextureViewDescriptor,
};
use aether_core::renderer::error::ResourceError;
use aether_core::renderer::traits::{Buffer, Texture};
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

/// A host pointer into a mapped resource.
#[derive(Debug, Clone, Copy)]
struct MappedPtr(NonNull<u8>);

// SAFETY: the pointer targets driver-owned memory that stays valid until `unmap`,
// and every access to it goes through the owning buffer's mutex.
unsafe impl Send for MappedPtr {}
unsafe impl Sync for MappedPtr {}

/// The resource description of a linear buffer.
pub fn buffer_resource_desc(desc: &BufferDescriptor) -> ResourceDesc {
    ResourceDesc {
        dimension: ResourceDimension::Buffer,
        width: desc.size.max(1),
        height: 1,
        depth_or_array_size: 1,
        mip_levels: 1,
        format: DxgiFormat::UNKNOWN,
        sample_desc: SampleDesc {
            count: 1,
            quality: 0,
        },
        flags: ResourceFlags::empty(),
    }
}

/// A committed buffer resource.
#[derive(Debug)]
pub struct BufferD3D12 {
    mapped: Mutex<Option<MappedPtr>>,
    resource: ComPtr,
    heap: HeapType,
    desc: BufferDescriptor,
    shared: Arc<D3D12Shared>,
}

impl BufferD3D12 {
    pub(crate) fn new(
        shared: Arc<D3D12Shared>,
        desc: &BufferDescriptor,
    ) -> Result<Self, ResourceError> {
        let heap: HeapType = desc.location.into_d3d12();
        let raw = shared
            .raw
            .create_committed_resource(heap, &buffer_resource_desc(desc))
            .map_err(|hr| {
                shared
                    .logger
                    .critical(format!("Failed to create buffer '{}': {hr}", desc.label));
                ResourceError::Allocation(hr.to_string())
            })?;
        let resource = ComPtr::new(shared.raw.clone(), raw);
        shared.name_object(raw, &desc.label);

        let buffer = Self {
            mapped: Mutex::new(None),
            resource,
            heap,
            desc: desc.clone(),
            shared,
        };
        if desc.keeps_persistent_mapping() {
            buffer.map()?;
        }
        Ok(buffer)
    }

    /// The native resource handle.
    pub fn raw(&self) -> RawHandle {
        self.resource.raw()
    }
}

impl Buffer for BufferD3D12 {
    fn descriptor(&self) -> &BufferDescriptor {
        &self.desc
    }

    fn map(&self) -> Result<NonNull<u8>, ResourceError> {
        if !self.heap.is_cpu_accessible() {
            return Err(ResourceError::NotMappable);
        }
        let mut mapped = lock(&self.mapped);
        if let Some(ptr) = *mapped {
            return Ok(ptr.0);
        }
        let ptr = self.shared.raw.map(self.resource.raw()).map_err(|hr| {
            ResourceError::BackendError(format!("failed to map '{}': {hr}", self.desc.label))
        })?;
        *mapped = Some(MappedPtr(ptr));
        Ok(ptr)
    }

    fn unmap(&self) {
        if self.desc.keeps_persistent_mapping() {
            return;
        }
        if lock(&self.mapped).take().is_some() {
            self.shared.raw.unmap(self.resource.raw());
        }
    }

    fn is_mapped(&self) -> bool {
        lock(&self.mapped).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for BufferD3D12 {
    fn drop(&mut self) {
        if lock(&self.mapped).take().is_some() {
            self.shared.raw.unmap(self.resource.raw());
        }
    }
}

/// The resource description of a texture.
///
/// ## Errors
/// * `ResourceError::InvalidDescriptor` - If the depth or layer count does not fit
///   the 16-bit field of the resource description.
pub fn texture_resource_desc(desc: &TextureDescriptor) -> Result<ResourceDesc, ResourceError> {
    let depth_or_array_size = u16::try_from(desc.depth_or_layers).map_err(|_| {
        ResourceError::InvalidDescriptor(format!(
            "texture '{}' has {} layers, D3D12 allows at most {}",
            desc.label,
            desc.depth_or_layers,
            u16::MAX
        ))
    })?;
    // Bounded by the extent, so at most 32.
    let mip_levels = u16::try_from(desc.mip_levels).map_err(|_| {
        ResourceError::InvalidDescriptor(format!("texture '{}' has too many mip levels", desc.label))
    })?;
    let mut flags = ResourceFlags::empty();
    if desc.usage.contains(TextureUsage::RENDER_ATTACHMENT) {
        flags |= ResourceFlags::ALLOW_RENDER_TARGET;
    }
    if desc.usage.contains(TextureUsage::DEPTH_STENCIL_ATTACHMENT) {
        flags |= ResourceFlags::ALLOW_DEPTH_STENCIL;
        if !desc.usage.contains(TextureUsage::TEXTURE_BINDING) {
            flags |= ResourceFlags::DENY_SHADER_RESOURCE;
        }
    }
    if desc.usage.contains(TextureUsage::STORAGE_BINDING) {
        flags |= ResourceFlags::ALLOW_UNORDERED_ACCESS;
    }
    Ok(ResourceDesc {
        dimension: desc.dimension.into_d3d12(),
        width: u64::from(desc.width),
        height: desc.height,
        depth_or_array_size,
        mip_levels,
        format: desc.format.into_d3d12(),
        sample_desc: SampleDesc {
            count: 1,
            quality: 0,
        },
        flags,
    })
}

/// The shader resource view description for `view`.
///
/// The view is expected to have passed [`TextureViewDescriptor::validate`], so
/// cube views span whole cubes.
pub fn shader_resource_view_desc(view: &TextureViewDescriptor) -> ShaderResourceViewDesc {
    let view_dimension: SrvDimension = view.dimension.into_d3d12();
    // Cube views count cubes, not faces.
    let array_size = match view_dimension {
        SrvDimension::TextureCube | SrvDimension::TextureCubeArray => view.array_layer_count / 6,
        _ => view.array_layer_count,
    };
    ShaderResourceViewDesc {
        format: shader_resource_format(view.format, view.aspects),
        view_dimension,
        shader_4_component_mapping: DEFAULT_SHADER_4_COMPONENT_MAPPING,
        most_detailed_mip: view.base_mip_level,
        mip_levels: view.mip_level_count,
        first_array_slice: view.base_array_layer,
        array_size,
    }
}

#[derive(Debug)]
enum Image {
    Owned(ComPtr),
    External(RawHandle),
}

impl Image {
    fn raw(&self) -> RawHandle {
        match self {
            Image::Owned(resource) => resource.raw(),
            Image::External(raw) => *raw,
        }
    }
}

/// A texture resource with its cache of shader resource views.
#[derive(Debug)]
pub struct TextureD3D12 {
    // Views are freed before the image they point into.
    views: Mutex<HashMap<TextureViewDescriptor, OwnedDescriptor>>,
    image: Image,
    desc: TextureDescriptor,
    shared: Arc<D3D12Shared>,
}

impl TextureD3D12 {
    pub(crate) fn new(
        shared: Arc<D3D12Shared>,
        desc: &TextureDescriptor,
    ) -> Result<Self, ResourceError> {
        let resource_desc = desc
            .validate()
            .and_then(|()| texture_resource_desc(desc))
            .map_err(|err| {
                shared.logger.critical(err.to_string());
                err
            })?;
        let heap: HeapType = desc.location.into_d3d12();
        let raw = shared
            .raw
            .create_committed_resource(heap, &resource_desc)
            .map_err(|hr| {
                shared
                    .logger
                    .critical(format!("Failed to create texture '{}': {hr}", desc.label));
                ResourceError::Allocation(hr.to_string())
            })?;
        let image = Image::Owned(ComPtr::new(shared.raw.clone(), raw));
        shared.name_object(raw, &desc.label);
        Ok(Self {
            views: Mutex::new(HashMap::new()),
            image,
            desc: desc.clone(),
            shared,
        })
    }

    /// Wraps a resource owned elsewhere, e.g. a swapchain back buffer. It is never released.
    pub(crate) fn external(
        shared: Arc<D3D12Shared>,
        raw: RawHandle,
        desc: &TextureDescriptor,
    ) -> Self {
        Self {
            views: Mutex::new(HashMap::new()),
            image: Image::External(raw),
            desc: desc.clone(),
            shared,
        }
    }

    /// The native resource handle.
    pub fn raw(&self) -> RawHandle {
        self.image.raw()
    }

    /// The native format of the resource.
    pub fn raw_format(&self) -> DxgiFormat {
        self.desc.format.into_d3d12()
    }

    /// Returns the shader resource view for `view`, creating it on first use.
    pub fn view(
        &self,
        view: &TextureViewDescriptor,
    ) -> Result<native::DescriptorHandle, ResourceError> {
        view.validate(&self.desc)?;
        let mut views = lock(&self.views);
        if let Some(descriptor) = views.get(view) {
            log::trace!("TextureD3D12: view cache hit on '{}'", self.desc.label);
            return Ok(descriptor.handle());
        }
        log::trace!("TextureD3D12: view cache miss on '{}'", self.desc.label);
        let handle = self
            .shared
            .raw
            .create_shader_resource_view(self.image.raw(), &shader_resource_view_desc(view))
            .map_err(|hr| {
                ResourceError::BackendError(format!(
                    "failed to create a view of '{}': {hr}",
                    self.desc.label
                ))
            })?;
        views.insert(*view, OwnedDescriptor::new(self.shared.raw.clone(), handle));
        Ok(handle)
    }
}

impl Texture for TextureD3D12 {
    fn descriptor(&self) -> &TextureDescriptor {
        &self.desc
    }

    fn is_external(&self) -> bool {
        matches!(self.image, Image::External(_))
    }

    fn view_handle(&self, view: &TextureViewDescriptor) -> Result<u64, ResourceError> {
        self.view(view).map(|handle| handle.0)
    }

    fn cached_view_count(&self) -> usize {
        lock(&self.views).len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
