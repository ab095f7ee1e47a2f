/// Descriptor pool manager
///
/// Owns the serving descriptor pool. When the pool would overflow it is
/// retired to the extinct list and replaced by one twice as large; retired
/// pools are destroyed once their tag falls out of the eviction window.

use crate::cache::is_expired;
use crate::device::{DescriptorPoolDesc, DescriptorPoolHandle, Device, GpuObject};
use crate::error::{Error, Result};
use crate::key::{DESCRIPTOR_TYPE_COUNT, SAMPLER_BINDING_COUNT, TARGET_BINDING_COUNT, UBUFFER_BINDING_COUNT};
use crate::{engine_debug, engine_error, engine_info, engine_trace};

const SOURCE: &str = "galaxy3d::DescriptorPoolManager";

/// A retired pool waiting for the GPU to stop using its sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtinctPool {
    pub pool: DescriptorPoolHandle,
    /// Latest epoch any bundle allocated from this pool was used in
    pub tag: u64,
    /// Active bundles retired with the pool
    pub bundle_count: usize,
}

/// Largest pool, in bundles, whose descriptor counts fit in 32 bits
pub const MAX_DESCRIPTOR_POOL_SIZE: u32 = u32::MAX / SAMPLER_BINDING_COUNT as u32;

/// Pool sizing for `capacity` descriptor bundles
///
/// # Errors
///
/// `Error::InvalidResource` if a descriptor count overflows `u32`.
pub fn descriptor_pool_desc(capacity: u32) -> Result<DescriptorPoolDesc> {
    let scaled = |per_bundle: usize| {
        capacity.checked_mul(per_bundle as u32).ok_or_else(|| {
            Error::InvalidResource(format!(
                "descriptor pool of {} bundles exceeds {} bundles",
                capacity, MAX_DESCRIPTOR_POOL_SIZE
            ))
        })
    };
    Ok(DescriptorPoolDesc {
        max_sets: scaled(DESCRIPTOR_TYPE_COUNT)?,
        uniform_buffer_count: scaled(UBUFFER_BINDING_COUNT)?,
        combined_image_sampler_count: scaled(SAMPLER_BINDING_COUNT)?,
        input_attachment_count: scaled(TARGET_BINDING_COUNT)?,
        free_individual_sets: true,
    })
}

#[derive(Debug)]
pub struct DescriptorPoolManager {
    pool: DescriptorPoolHandle,
    /// In bundles
    capacity: u32,
    extinct: Vec<ExtinctPool>,
    growths: u64,
}

impl DescriptorPoolManager {
    /// Create the first serving pool
    ///
    /// # Arguments
    ///
    /// * `device` - Device to allocate the pool on
    /// * `capacity` - Number of descriptor bundles the pool must hold
    pub fn new<D: Device>(device: &mut D, capacity: u32) -> Result<Self> {
        let pool = Self::create_descriptor_pool(device, capacity)?;
        Ok(Self {
            pool,
            capacity,
            extinct: Vec::new(),
            growths: 0,
        })
    }

    /// Create a native pool sized for `capacity` bundles
    pub fn create_descriptor_pool<D: Device>(device: &mut D, capacity: u32) -> Result<DescriptorPoolHandle> {
        let desc = descriptor_pool_desc(capacity).map_err(|err| {
            engine_error!(SOURCE, "Descriptor pool sizing failed: {}", err);
            err
        })?;
        let pool = device.create_descriptor_pool(&desc).map_err(|err| {
            engine_error!(SOURCE, "Descriptor pool creation failed ({} bundles): {}", capacity, err);
            err
        })?;
        engine_debug!(SOURCE, "Created descriptor pool {:?} ({} bundles)", pool, capacity);
        Ok(pool)
    }

    /// The pool serving new allocations
    pub fn pool(&self) -> DescriptorPoolHandle {
        self.pool
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn extinct_pools(&self) -> &[ExtinctPool] {
        &self.extinct
    }

    pub fn growths(&self) -> u64 {
        self.growths
    }

    /// True if holding `in_use` bundles plus one more exceeds the serving pool
    pub fn would_overflow(&self, in_use: usize) -> bool {
        in_use + 1 > self.capacity as usize
    }

    /// Replace the serving pool with one of twice the capacity
    ///
    /// The new pool is created first; on failure nothing changes. The old
    /// pool moves to the extinct list tagged with `tag`.
    ///
    /// # Arguments
    ///
    /// * `tag` - Latest epoch a bundle of the old pool was used in
    /// * `bundle_count` - Active bundles retired with the old pool
    pub fn grow_descriptor_pool<D: Device>(
        &mut self,
        device: &mut D,
        tag: u64,
        bundle_count: usize,
    ) -> Result<DescriptorPoolHandle> {
        let capacity = self.capacity.checked_mul(2).ok_or_else(|| {
            engine_error!(SOURCE, "Descriptor pool capacity overflow ({} bundles)", self.capacity);
            Error::InvalidResource(format!("cannot double a pool of {} bundles", self.capacity))
        })?;
        let pool = Self::create_descriptor_pool(device, capacity)?;

        self.extinct.push(ExtinctPool {
            pool: self.pool,
            tag,
            bundle_count,
        });
        engine_info!(
            SOURCE,
            "Descriptor pool grown {} -> {} bundles ({} bundles retired, tag {})",
            self.capacity,
            capacity,
            bundle_count,
            tag
        );

        self.pool = pool;
        self.capacity = capacity;
        self.growths += 1;
        Ok(pool)
    }

    /// True if the next sweep with these parameters destroys a pool
    pub fn has_expired(&self, epoch: u64, max_age: u64) -> bool {
        self.extinct.iter().any(|p| is_expired(p.tag, epoch, max_age))
    }

    /// Destroy every extinct pool past the eviction window
    ///
    /// Destroying a pool frees its sets; no per-set free is issued.
    pub fn sweep<D: Device>(&mut self, device: &mut D, epoch: u64, max_age: u64) -> usize {
        let before = self.extinct.len();
        self.extinct.retain(|extinct| {
            if is_expired(extinct.tag, epoch, max_age) {
                device.destroy(GpuObject::DescriptorPool(extinct.pool));
                false
            } else {
                true
            }
        });

        let destroyed = before - self.extinct.len();
        if destroyed > 0 {
            engine_trace!(SOURCE, "Epoch {}: destroyed {} extinct descriptor pools", epoch, destroyed);
        }
        destroyed
    }

    /// Destroy the serving pool and every extinct pool
    pub fn destroy_all<D: Device>(&mut self, device: &mut D) {
        for extinct in self.extinct.drain(..) {
            device.destroy(GpuObject::DescriptorPool(extinct.pool));
        }
        device.destroy(GpuObject::DescriptorPool(self.pool));
        self.pool = DescriptorPoolHandle::NULL;
    }
}

#[cfg(test)]
#[path = "descriptor_pool_tests.rs"]
mod tests;
