/*!
# Galaxy 3D Pipeline Cache

Backend-agnostic pipeline and descriptor set cache for the Galaxy 3D engine.

Turns per-draw state changes (shaders, vertex layout, raster state, bound
buffers and textures) into the minimum number of native pipeline, pipeline
layout and descriptor set creations, and destroys cached objects only once
no in-flight command buffer can still reference them.

## Architecture

- **key**: Byte-comparable state vectors (`PipelineKey`, `PipelineLayoutKey`, `DescriptorKey`)
- **cache**: Epoch-stamped caches (`PipelineCache`, `PipelineLayoutCache`, `DescriptorSetCache`)
  plus the descriptor pool manager and per-layout arenas
- **device**: The `Device` trait every native call goes through
- **PipelineCacheEngine**: Façade driven by the renderer once per draw and once per submission

Backend implementations (e.g. `galaxy_3d_pipeline_cache_vulkan`) implement `Device`.
*/

// Internal modules
mod error;
mod config;
mod pipeline_cache_engine;
pub mod log;
pub mod key;
pub mod device;
pub mod cache;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Façade and its configuration
    pub use crate::config::{PipelineCacheConfig, PipelineCacheStats};
    pub use crate::pipeline_cache_engine::PipelineCacheEngine;

    // Backend contract
    pub use crate::device::Device;

    // Logging sub-module (Log is needed by the exported engine_* macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, Log};
    }

    // State-vector keys
    pub mod key {
        pub use crate::key::*;
    }

    // Handles, descriptors and the Device trait
    pub mod device {
        pub use crate::device::*;
    }

    // Individual caches
    pub mod cache {
        pub use crate::cache::*;
    }
}
