/// Cache module - content-addressed caches of pipelines, layouts and descriptor sets
///
/// Every cache maps a state-vector key to native objects stamped with the
/// epoch of their last use, and is swept once per submitted command buffer.

pub mod resource_pool;
pub mod descriptor_arena;
pub mod pipeline_layout_cache;
pub mod descriptor_pool;
pub mod descriptor_set_cache;
pub mod pipeline_cache;

pub use resource_pool::*;
pub use descriptor_arena::*;
pub use pipeline_layout_cache::*;
pub use descriptor_pool::*;
pub use descriptor_set_cache::*;
pub use pipeline_cache::*;
