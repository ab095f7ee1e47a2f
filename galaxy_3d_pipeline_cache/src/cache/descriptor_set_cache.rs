/// Descriptor set cache
///
/// Resolves a `DescriptorKey` (under a given pipeline layout) to a bundle of
/// three descriptor sets. Bundles that age out are parked in their layout's
/// arena and rewritten on reuse; fresh bundles come from the serving pool,
/// which grows before an allocation could overflow it.

use crate::cache::{DescriptorPoolManager, PipelineLayoutCache, ResourcePool};
use crate::device::{
    CommandBufferHandle, DescriptorBufferInfo, DescriptorBundle, DescriptorPoolHandle, DescriptorResource,
    DescriptorWrite,
    Device, DummyResources,
};
use crate::error::{Error, Result};
use crate::key::{
    to_native_range, DescriptorImageInfo, DescriptorKey, ImageLayout, PipelineLayoutKey,
    SAMPLER_BINDING_COUNT, TARGET_BINDING_COUNT, UBUFFER_BINDING_COUNT,
};
use crate::{engine_debug, engine_error, engine_trace, engine_warn};

const SOURCE: &str = "galaxy3d::DescriptorSetCache";

/// Descriptor requirements plus the layout the sets are allocated for
pub type BundleKey = (DescriptorKey, PipelineLayoutKey);

/// Writes for every slot of `sets`, dummies in the empty ones
///
/// Always `UBUFFER_BINDING_COUNT + SAMPLER_BINDING_COUNT + TARGET_BINDING_COUNT`
/// writes: a reused set must not keep stale descriptors.
pub fn build_descriptor_writes(
    sets: &DescriptorBundle,
    key: &DescriptorKey,
    dummy: &DummyResources,
) -> Vec<DescriptorWrite> {
    let mut writes =
        Vec::with_capacity(UBUFFER_BINDING_COUNT + SAMPLER_BINDING_COUNT + TARGET_BINDING_COUNT);

    for binding in 0..UBUFFER_BINDING_COUNT {
        let buffer = key.uniform_buffers[binding];
        let info = if buffer.is_null() {
            DescriptorBufferInfo {
                buffer: dummy.buffer,
                offset: 0,
                range: dummy.buffer_size,
            }
        } else {
            DescriptorBufferInfo {
                buffer,
                offset: key.uniform_buffer_offsets[binding] as u64,
                range: to_native_range(key.uniform_buffer_sizes[binding]),
            }
        };
        writes.push(DescriptorWrite {
            dst_set: sets[0],
            dst_binding: binding as u32,
            resource: DescriptorResource::UniformBuffer(info),
        });
    }

    for binding in 0..SAMPLER_BINDING_COUNT {
        let info = key.samplers[binding];
        let info = if info.is_empty() {
            DescriptorImageInfo::new(dummy.sampler, dummy.image_view, ImageLayout::ShaderReadOnly)
        } else {
            info
        };
        writes.push(DescriptorWrite {
            dst_set: sets[1],
            dst_binding: binding as u32,
            resource: DescriptorResource::CombinedImageSampler(info),
        });
    }

    for binding in 0..TARGET_BINDING_COUNT {
        let info = key.input_attachments[binding];
        let info = if info.is_empty() {
            DescriptorImageInfo::attachment(dummy.image_view, ImageLayout::General)
        } else {
            info
        };
        writes.push(DescriptorWrite {
            dst_set: sets[2],
            dst_binding: binding as u32,
            resource: DescriptorResource::InputAttachment(info),
        });
    }

    writes
}

#[derive(Debug, Default)]
pub struct DescriptorSetCache {
    bundles: ResourcePool<BundleKey, DescriptorBundle>,
    bound: Option<BundleKey>,
    bundles_allocated: u64,
    bundles_reclaimed: u64,
    bundles_reused: u64,
}

impl DescriptorSetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundles in the active map
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn bundles_allocated(&self) -> u64 {
        self.bundles_allocated
    }

    pub fn bundles_reclaimed(&self) -> u64 {
        self.bundles_reclaimed
    }

    pub fn bundles_reused(&self) -> u64 {
        self.bundles_reused
    }

    /// Forget the last bound bundle (command buffer state is undefined)
    pub fn unbind(&mut self) {
        self.bound = None;
    }

    /// True if an active bundle was allocated for `layout`
    pub fn references_layout(&self, layout: &PipelineLayoutKey) -> bool {
        self.bundles.iter().any(|((_, bundle_layout), _)| bundle_layout == layout)
    }

    /// Bind the bundle matching `key` under `layout_key`
    ///
    /// Binding the same bundle twice in a row only refreshes timestamps.
    ///
    /// # Errors
    ///
    /// Returns the device error if the layout, the pool growth or the
    /// descriptor allocation fails. Nothing is bound in that case.
    #[allow(clippy::too_many_arguments)]
    pub fn bind_descriptors<D: Device>(
        &mut self,
        device: &mut D,
        layouts: &mut PipelineLayoutCache,
        pools: &mut DescriptorPoolManager,
        dummy: &DummyResources,
        cmd: CommandBufferHandle,
        key: &DescriptorKey,
        layout_key: PipelineLayoutKey,
        epoch: u64,
    ) -> Result<()> {
        let bundle_key = (*key, layout_key);
        if self.bound.as_ref() == Some(&bundle_key) && self.bundles.touch(&bundle_key, epoch).is_some() {
            layouts.touch(&layout_key, epoch);
            return Ok(());
        }

        let layout = layouts.get_or_create_pipeline_layout(device, layout_key, epoch)?;
        let sets = self.get_or_create_descriptors(device, layouts, pools, dummy, &bundle_key, epoch)?;

        device.cmd_bind_descriptor_sets(cmd, layout, &sets);
        self.bound = Some(bundle_key);
        Ok(())
    }

    /// Look up the bundle for `bundle_key`, or recycle/allocate and write one
    ///
    /// The layout of `bundle_key` must already be cached.
    pub fn get_or_create_descriptors<D: Device>(
        &mut self,
        device: &mut D,
        layouts: &mut PipelineLayoutCache,
        pools: &mut DescriptorPoolManager,
        dummy: &DummyResources,
        bundle_key: &BundleKey,
        epoch: u64,
    ) -> Result<DescriptorBundle> {
        if let Some(sets) = self.bundles.touch(bundle_key, epoch) {
            return Ok(*sets);
        }

        let sets = self.create_descriptor_sets(device, layouts, pools, &bundle_key.1)?;

        let writes = build_descriptor_writes(&sets, &bundle_key.0, dummy);
        device.update_descriptor_sets(&writes);

        self.bundles.insert(*bundle_key, sets, epoch);
        Ok(sets)
    }

    /// Pop a bundle from the layout's arena, or allocate a fresh one
    fn create_descriptor_sets<D: Device>(
        &mut self,
        device: &mut D,
        layouts: &mut PipelineLayoutCache,
        pools: &mut DescriptorPoolManager,
        layout_key: &PipelineLayoutKey,
    ) -> Result<DescriptorBundle> {
        if let Some(sets) = layouts.take_from_arena(layout_key) {
            self.bundles_reused += 1;
            return Ok(sets);
        }

        if pools.would_overflow(self.bundles.len() + layouts.arena_resident()) {
            self.grow_descriptor_pool(device, layouts, pools)?;
        }

        let set_layouts = layouts
            .get(layout_key)
            .map(|entry| entry.set_layouts)
            .ok_or_else(|| Error::InvalidResource(format!("pipeline layout {:#x} is not cached", layout_key.0)))?;

        let sets = match device.allocate_descriptor_sets(pools.pool(), &set_layouts) {
            Err(Error::OutOfPoolMemory) => {
                // Fragmented below its nominal capacity
                engine_warn!(SOURCE, "Descriptor pool exhausted early, growing");
                self.grow_descriptor_pool(device, layouts, pools)?;
                device.allocate_descriptor_sets(pools.pool(), &set_layouts)
            }
            result => result,
        }
        .map_err(|err| {
            engine_error!(SOURCE, "Descriptor set allocation failed: {}", err);
            err
        })?;
        self.bundles_allocated += 1;
        Ok(sets)
    }

    /// Retire the serving pool together with every bundle allocated from it
    ///
    /// Arenas are emptied and the active map cleared: the retired bundles
    /// stay valid on the GPU until the extinct pool is destroyed.
    pub fn grow_descriptor_pool<D: Device>(
        &mut self,
        device: &mut D,
        layouts: &mut PipelineLayoutCache,
        pools: &mut DescriptorPoolManager,
    ) -> Result<()> {
        let tag = self.bundles.max_last_used().unwrap_or(0);
        let retired = self.bundles.len();

        pools.grow_descriptor_pool(device, tag, retired)?;

        layouts.clear_arenas();
        self.bundles.clear();
        self.bound = None;
        engine_debug!(SOURCE, "Retired {} active descriptor bundles", retired);
        Ok(())
    }

    /// Move every bundle past the eviction window into its layout's arena
    ///
    /// # Returns
    ///
    /// The number of bundles reclaimed
    pub fn sweep<D: Device>(
        &mut self,
        device: &mut D,
        layouts: &mut PipelineLayoutCache,
        pool: DescriptorPoolHandle,
        epoch: u64,
        max_age: u64,
    ) -> usize {
        let expired = self.bundles.evict_expired(epoch, max_age);
        let count = expired.len();

        for ((_, layout_key), entry) in expired {
            let orphan = layouts.reclaim(&layout_key, entry.value);
            debug_assert!(orphan.is_none(), "descriptor bundle outlived its pipeline layout");
            if let Some(orphan) = orphan {
                engine_warn!(SOURCE, "Descriptor bundle outlived layout {:#x}, freeing it", layout_key.0);
                if let Err(err) = device.free_descriptor_sets(pool, &orphan) {
                    engine_warn!(SOURCE, "Failed to free orphan descriptor sets: {}", err);
                }
            }
        }

        self.bundles_reclaimed += count as u64;
        if count > 0 {
            engine_trace!(SOURCE, "Epoch {}: reclaimed {} descriptor bundles", epoch, count);
        }
        count
    }

    /// Drop every active bundle; their sets die with the pools
    pub fn clear(&mut self) {
        self.bundles.clear();
        self.bound = None;
    }
}

#[cfg(test)]
#[path = "descriptor_set_cache_tests.rs"]
mod tests;
