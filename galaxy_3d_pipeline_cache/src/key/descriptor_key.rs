/// Descriptor key: the resources bound to one descriptor bundle

use bytemuck::NoUninit;

use crate::device::{BufferHandle, ImageViewHandle, SamplerHandle};
use crate::key::{ImageLayout, SAMPLER_BINDING_COUNT, TARGET_BINDING_COUNT, UBUFFER_BINDING_COUNT};

/// "Whole buffer" sentinel for uniform buffer sizes stored in a `DescriptorKey`
pub const WHOLE_SIZE: u32 = u32::MAX;

/// "Whole buffer" sentinel understood by the device layer
pub const NATIVE_WHOLE_SIZE: u64 = u64::MAX;

/// Converts a key-side buffer size to a device-side descriptor range
pub fn to_native_range(size: u32) -> u64 {
    if size == WHOLE_SIZE {
        NATIVE_WHOLE_SIZE
    } else {
        size as u64
    }
}

/// Converts a device-side descriptor range back to a key-side size
///
/// # Panics
///
/// If `range` is not `NATIVE_WHOLE_SIZE` and does not fit below `WHOLE_SIZE`.
pub fn from_native_range(range: u64) -> u32 {
    if range == NATIVE_WHOLE_SIZE {
        return WHOLE_SIZE;
    }
    assert!(
        range < WHOLE_SIZE as u64,
        "uniform buffer range {} does not fit in 32 bits",
        range
    );
    range as u32
}

/// Sampler / image view / layout triple (24 bytes, explicit padding)
///
/// Used for sampler slots and, with a null sampler, for input attachment slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(C)]
pub struct DescriptorImageInfo {
    pub sampler: SamplerHandle,
    pub image_view: ImageViewHandle,
    pub image_layout: ImageLayout,
    padding: u32,
}

impl DescriptorImageInfo {
    pub fn new(sampler: SamplerHandle, image_view: ImageViewHandle, image_layout: ImageLayout) -> Self {
        Self {
            sampler,
            image_view,
            image_layout,
            padding: 0,
        }
    }

    /// Input attachment binding (no sampler)
    pub fn attachment(image_view: ImageViewHandle, image_layout: ImageLayout) -> Self {
        Self::new(SamplerHandle::NULL, image_view, image_layout)
    }

    pub fn is_empty(&self) -> bool {
        self.image_view.is_null()
    }
}

/// Full descriptor requirements (704 bytes, no padding)
///
/// An empty slot is the zero value. Empty slots are still written at
/// descriptor-update time, with the dummy resources.
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct DescriptorKey {
    pub uniform_buffers: [BufferHandle; UBUFFER_BINDING_COUNT],
    pub samplers: [DescriptorImageInfo; SAMPLER_BINDING_COUNT],
    pub input_attachments: [DescriptorImageInfo; TARGET_BINDING_COUNT],
    pub uniform_buffer_offsets: [u32; UBUFFER_BINDING_COUNT],
    /// `WHOLE_SIZE` binds the rest of the buffer from the offset
    pub uniform_buffer_sizes: [u32; UBUFFER_BINDING_COUNT],
}

// Arrays of non-`Pod` elements rule out the derive. Every field is
// `NoUninit` and the fields add up to the full size.
const _: () = assert!(std::mem::size_of::<DescriptorKey>() == 704);
const _: () = assert!(
    std::mem::size_of::<[BufferHandle; UBUFFER_BINDING_COUNT]>()
        + std::mem::size_of::<[DescriptorImageInfo; SAMPLER_BINDING_COUNT]>()
        + std::mem::size_of::<[DescriptorImageInfo; TARGET_BINDING_COUNT]>()
        + 2 * std::mem::size_of::<[u32; UBUFFER_BINDING_COUNT]>()
        == std::mem::size_of::<DescriptorKey>()
);
unsafe impl NoUninit for DescriptorKey {}

super::impl_bytewise_key!(DescriptorKey);
