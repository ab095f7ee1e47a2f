/*!
# Galaxy 3D Pipeline Cache - Vulkan Backend

Vulkan implementation of the `Device` trait consumed by
`galaxy_3d_pipeline_cache::galaxy3d::PipelineCacheEngine`.

Uses the Ash library for Vulkan bindings and gpu-allocator for the memory
of the placeholder resources. The caller owns the `ash::Device` and the
allocator; the cache owns every pipeline, layout and descriptor pool it
creates through `VulkanDevice`.

## Usage

```no_run
use std::sync::{Arc, Mutex};
use galaxy_3d_pipeline_cache::galaxy3d::PipelineCacheEngine;
use galaxy_3d_pipeline_cache_vulkan::VulkanDevice;

# fn attach(device: ash::Device, allocator: Arc<Mutex<gpu_allocator::vulkan::Allocator>>)
#     -> galaxy_3d_pipeline_cache::galaxy3d::Result<()> {
let mut cache = PipelineCacheEngine::new();
cache.set_device(VulkanDevice::new(device, allocator))?;
# Ok(())
# }
```
*/

mod vulkan_convert;
mod vulkan_device;

pub use vulkan_device::VulkanDevice;

// Main galaxy3d namespace module
pub mod galaxy3d {
    pub use crate::vulkan_device::VulkanDevice;
}
