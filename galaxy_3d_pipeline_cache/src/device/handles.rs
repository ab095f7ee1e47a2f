/// Opaque native handles and the GpuObject sum type
///
/// Every native object crosses the Device boundary as a `u64` wrapped in a
/// per-kind newtype. The value 0 is the null handle for every kind. The
/// newtypes are `#[repr(transparent)]` and `NoUninit` so that they can sit
/// inside byte-compared cache keys.

use bytemuck::NoUninit;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, NoUninit)]
        #[repr(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// The null handle
            pub const NULL: Self = Self(0);

            /// Wrap a raw native handle value
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Raw native handle value
            pub const fn as_raw(&self) -> u64 {
                self.0
            }

            pub const fn is_null(&self) -> bool {
                self.0 == 0
            }
        }
    };
}

define_handle!(
    /// Compiled shader module
    ShaderModuleHandle
);
define_handle!(
    /// Render pass the pipeline is compatible with
    RenderPassHandle
);
define_handle!(
    /// Graphics pipeline object
    PipelineHandle
);
define_handle!(
    /// Pipeline layout object
    PipelineLayoutHandle
);
define_handle!(
    /// Descriptor set layout object
    DescriptorSetLayoutHandle
);
define_handle!(
    /// Descriptor set (owned by a descriptor pool)
    DescriptorSetHandle
);
define_handle!(
    /// Descriptor pool
    DescriptorPoolHandle
);
define_handle!(
    /// Buffer (uniform buffers, dummy buffer)
    BufferHandle
);
define_handle!(
    /// Image (dummy image)
    ImageHandle
);
define_handle!(
    /// Image view (sampled textures, input attachments)
    ImageViewHandle
);
define_handle!(
    /// Sampler object
    SamplerHandle
);
define_handle!(
    /// Command buffer being recorded
    CommandBufferHandle
);

/// A native object owned by the pipeline cache, tagged by kind
///
/// All cache-driven destruction goes through `Device::destroy` with one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuObject {
    Pipeline(PipelineHandle),
    PipelineLayout(PipelineLayoutHandle),
    DescriptorSetLayout(DescriptorSetLayoutHandle),
    /// Destroying a pool implicitly frees every set allocated from it
    DescriptorPool(DescriptorPoolHandle),
}

impl GpuObject {
    /// Raw handle value regardless of kind
    pub fn as_raw(&self) -> u64 {
        match self {
            GpuObject::Pipeline(h) => h.as_raw(),
            GpuObject::PipelineLayout(h) => h.as_raw(),
            GpuObject::DescriptorSetLayout(h) => h.as_raw(),
            GpuObject::DescriptorPool(h) => h.as_raw(),
        }
    }
}
