/// Pipeline cache configuration and statistics

use crate::cache::MAX_DESCRIPTOR_POOL_SIZE;
use crate::error::{Error, Result};

/// Pipeline cache configuration
///
/// Ages are counted in epochs (submitted command buffers). An entry is
/// considered unused by the GPU once `last_used + age < epoch`, so both ages
/// must cover the number of command buffers that can be in flight at once.
#[derive(Debug, Clone)]
pub struct PipelineCacheConfig {
    /// Staleness threshold for pipelines and pipeline layouts
    pub max_pipeline_age: u64,
    /// Staleness threshold for descriptor bundles and extinct pools
    pub max_descriptor_set_age: u64,
    /// Maximum number of command buffers the renderer keeps in flight
    pub max_in_flight_command_buffers: u64,
    /// Capacity of the first descriptor pool, in descriptor bundles
    pub initial_descriptor_pool_size: u32,
    /// Call `Device::wait_idle` before any sweep destroys or frees an object
    pub wait_idle_before_destroy: bool,
}

impl Default for PipelineCacheConfig {
    fn default() -> Self {
        Self {
            max_pipeline_age: 10,
            max_descriptor_set_age: 10,
            max_in_flight_command_buffers: 10,
            initial_descriptor_pool_size: 512,
            wait_idle_before_destroy: false,
        }
    }
}

impl PipelineCacheConfig {
    /// Check the eviction window against the in-flight depth
    ///
    /// # Errors
    ///
    /// `Error::InitializationFailed` if an age is shorter than the number of
    /// in-flight command buffers, or the initial pool is empty or too large
    /// for its descriptor counts to fit in 32 bits.
    pub fn validate(&self) -> Result<()> {
        if self.max_pipeline_age < self.max_in_flight_command_buffers {
            return Err(Error::InitializationFailed(format!(
                "max_pipeline_age ({}) must be >= max_in_flight_command_buffers ({})",
                self.max_pipeline_age, self.max_in_flight_command_buffers
            )));
        }
        if self.max_descriptor_set_age < self.max_in_flight_command_buffers {
            return Err(Error::InitializationFailed(format!(
                "max_descriptor_set_age ({}) must be >= max_in_flight_command_buffers ({})",
                self.max_descriptor_set_age, self.max_in_flight_command_buffers
            )));
        }
        if self.initial_descriptor_pool_size == 0 {
            return Err(Error::InitializationFailed(
                "initial_descriptor_pool_size must be at least 1".to_string(),
            ));
        }
        if self.initial_descriptor_pool_size > MAX_DESCRIPTOR_POOL_SIZE {
            return Err(Error::InitializationFailed(format!(
                "initial_descriptor_pool_size ({}) must be <= {}",
                self.initial_descriptor_pool_size, MAX_DESCRIPTOR_POOL_SIZE
            )));
        }
        Ok(())
    }
}

/// Pipeline cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineCacheStats {
    /// Cached pipelines
    pub pipelines: usize,
    /// Cached pipeline layouts
    pub layouts: usize,
    /// Descriptor bundles in the active map
    pub active_bundles: usize,
    /// Descriptor bundles waiting in arenas
    pub arena_bundles: usize,
    /// Retired pools not yet destroyed
    pub extinct_pools: usize,
    /// Capacity of the serving pool, in bundles
    pub pool_capacity: u32,
    /// Current epoch
    pub epoch: u64,

    // Cumulative counters
    pub pipelines_created: u64,
    pub layouts_created: u64,
    pub bundles_allocated: u64,
    pub bundles_reclaimed: u64,
    pub bundles_reused: u64,
    pub pool_growths: u64,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
