/// Pipeline layout cache
///
/// Maps a `PipelineLayoutKey` to a pipeline layout, its three descriptor set
/// layouts and the arena recycling descriptor bundles allocated for it.

use crate::cache::{DescriptorArena, ResourcePool};
use crate::device::{
    DescriptorBundle, DescriptorPoolHandle, DescriptorSetLayoutBinding, DescriptorSetLayoutHandle,
    DescriptorSetLayouts, DescriptorType, Device, GpuObject, PipelineLayoutHandle, ShaderStageFlags,
};
use crate::error::Result;
use crate::key::{PipelineLayoutKey, SAMPLER_BINDING_COUNT, TARGET_BINDING_COUNT, UBUFFER_BINDING_COUNT};
use crate::{engine_debug, engine_error, engine_trace, engine_warn};

const SOURCE: &str = "galaxy3d::PipelineLayoutCache";

/// Cached pipeline layout
#[derive(Debug)]
pub struct PipelineLayoutEntry {
    pub handle: PipelineLayoutHandle,
    /// Uniform buffer, sampler and input attachment set layouts
    pub set_layouts: DescriptorSetLayouts,
    pub arena: DescriptorArena,
}

#[derive(Debug, Default)]
pub struct PipelineLayoutCache {
    layouts: ResourcePool<PipelineLayoutKey, PipelineLayoutEntry>,
    /// Bundles sitting in all arenas combined
    arena_resident: usize,
    layouts_created: u64,
}

/// Descriptor set layout bindings for the three sets of `key`
///
/// Uniform buffers are visible to both stages, input attachments to the
/// fragment stage. Sampler visibility comes from the key; a sampler no stage
/// reads still gets a binding, with empty stage flags.
pub fn descriptor_set_layout_bindings(
    key: PipelineLayoutKey,
) -> [Vec<DescriptorSetLayoutBinding>; 3] {
    let uniform_buffers = (0..UBUFFER_BINDING_COUNT)
        .map(|binding| DescriptorSetLayoutBinding {
            binding: binding as u32,
            descriptor_type: DescriptorType::UniformBuffer,
            count: 1,
            stage_flags: ShaderStageFlags::VERTEX_FRAGMENT,
        })
        .collect();

    let samplers = (0..SAMPLER_BINDING_COUNT)
        .map(|binding| DescriptorSetLayoutBinding {
            binding: binding as u32,
            descriptor_type: DescriptorType::CombinedImageSampler,
            count: 1,
            stage_flags: key.sampler_stages(binding),
        })
        .collect();

    let input_attachments = (0..TARGET_BINDING_COUNT)
        .map(|binding| DescriptorSetLayoutBinding {
            binding: binding as u32,
            descriptor_type: DescriptorType::InputAttachment,
            count: 1,
            stage_flags: ShaderStageFlags::FRAGMENT,
        })
        .collect();

    [uniform_buffers, samplers, input_attachments]
}

impl PipelineLayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Bundles waiting in arenas, across every layout
    pub fn arena_resident(&self) -> usize {
        self.arena_resident
    }

    pub fn layouts_created(&self) -> u64 {
        self.layouts_created
    }

    pub fn get(&self, key: &PipelineLayoutKey) -> Option<&PipelineLayoutEntry> {
        self.layouts.get(key).map(|entry| &entry.value)
    }

    /// Refresh the timestamp of a layout that is (re)bound this epoch
    pub fn touch(&mut self, key: &PipelineLayoutKey, epoch: u64) {
        self.layouts.touch(key, epoch);
    }

    /// Look up or build the pipeline layout for `key`
    ///
    /// # Errors
    ///
    /// Returns the device error if a descriptor set layout or the pipeline
    /// layout cannot be created. Nothing is cached and every object created
    /// before the failure is destroyed.
    pub fn get_or_create_pipeline_layout<D: Device>(
        &mut self,
        device: &mut D,
        key: PipelineLayoutKey,
        epoch: u64,
    ) -> Result<PipelineLayoutHandle> {
        if let Some(entry) = self.layouts.touch(&key, epoch) {
            return Ok(entry.handle);
        }

        let mut set_layouts: DescriptorSetLayouts = [DescriptorSetLayoutHandle::NULL; 3];
        for (index, bindings) in descriptor_set_layout_bindings(key).iter().enumerate() {
            match device.create_descriptor_set_layout(bindings) {
                Ok(set_layout) => set_layouts[index] = set_layout,
                Err(err) => {
                    engine_error!(SOURCE, "Descriptor set layout {} creation failed: {}", index, err);
                    destroy_set_layouts(device, &set_layouts[..index]);
                    return Err(err);
                }
            }
        }

        let handle = match device.create_pipeline_layout(&set_layouts) {
            Ok(handle) => handle,
            Err(err) => {
                engine_error!(SOURCE, "Pipeline layout creation failed: {}", err);
                destroy_set_layouts(device, &set_layouts);
                return Err(err);
            }
        };

        engine_debug!(SOURCE, "Created pipeline layout {:?} (sampler usage {:#x})", handle, key.0);
        self.layouts.insert(
            key,
            PipelineLayoutEntry {
                handle,
                set_layouts,
                arena: DescriptorArena::new(),
            },
            epoch,
        );
        self.layouts_created += 1;
        Ok(handle)
    }

    /// Park a bundle that aged out in the arena of its layout
    ///
    /// Returns the bundle back if the layout is gone.
    pub fn reclaim(&mut self, key: &PipelineLayoutKey, bundle: DescriptorBundle) -> Option<DescriptorBundle> {
        match self.layouts.get_mut(key) {
            Some(entry) => {
                entry.value.arena.push(bundle);
                self.arena_resident += 1;
                None
            }
            None => Some(bundle),
        }
    }

    /// Pop a recycled bundle for `key`, if its arena has one
    pub fn take_from_arena(&mut self, key: &PipelineLayoutKey) -> Option<DescriptorBundle> {
        let bundle = self.layouts.get_mut(key)?.value.arena.pop()?;
        self.arena_resident -= 1;
        Some(bundle)
    }

    /// Forget every arena-resident handle (their pool was retired)
    pub fn clear_arenas(&mut self) {
        for entry in self.layouts.values_mut() {
            entry.value.arena.clear();
        }
        self.arena_resident = 0;
    }

    /// True if the next sweep with these parameters destroys a layout
    pub fn has_expired(&self, epoch: u64, max_age: u64) -> bool {
        self.layouts.has_expired(epoch, max_age)
    }

    /// Destroy every layout past the eviction window
    ///
    /// Arena-resident sets of a destroyed layout are freed back to `pool`.
    /// `is_referenced` reports whether an active descriptor bundle still
    /// uses a layout; that must never be the case for an expired one.
    ///
    /// # Returns
    ///
    /// The number of layouts destroyed
    pub fn sweep<D: Device>(
        &mut self,
        device: &mut D,
        pool: DescriptorPoolHandle,
        epoch: u64,
        max_age: u64,
        is_referenced: impl Fn(&PipelineLayoutKey) -> bool,
    ) -> usize {
        let expired = self.layouts.evict_expired(epoch, max_age);
        let count = expired.len();

        for (key, mut entry) in expired {
            debug_assert!(
                !is_referenced(&key),
                "expired pipeline layout {:#x} still referenced by an active descriptor bundle",
                key.0
            );

            let layout = &mut entry.value;
            if !layout.arena.is_empty() {
                self.arena_resident -= layout.arena.len();
                let sets = layout.arena.drain_sets();
                if let Err(err) = device.free_descriptor_sets(pool, &sets) {
                    engine_warn!(SOURCE, "Failed to free {} arena descriptor sets: {}", sets.len(), err);
                }
            }
            device.destroy(GpuObject::PipelineLayout(layout.handle));
            destroy_set_layouts(device, &layout.set_layouts);
        }

        if count > 0 {
            engine_trace!(SOURCE, "Epoch {}: destroyed {} pipeline layouts", epoch, count);
        }
        count
    }

    /// Destroy every layout, ignoring age
    ///
    /// Arena handles are not freed individually: the caller destroys the
    /// pool they came from.
    pub fn destroy_all<D: Device>(&mut self, device: &mut D) {
        for (_, entry) in self.layouts.drain() {
            device.destroy(GpuObject::PipelineLayout(entry.value.handle));
            destroy_set_layouts(device, &entry.value.set_layouts);
        }
        self.arena_resident = 0;
    }
}

fn destroy_set_layouts<D: Device>(device: &mut D, set_layouts: &[DescriptorSetLayoutHandle]) {
    for set_layout in set_layouts {
        device.destroy(GpuObject::DescriptorSetLayout(*set_layout));
    }
}

#[cfg(test)]
#[path = "pipeline_layout_cache_tests.rs"]
mod tests;
