/// Pipeline cache engine - the façade the renderer drives once per draw
///
/// The renderer mutates the current requirements with the `bind_*` calls
/// (no native work), then calls `bind_pipeline` / `bind_descriptors` before
/// each draw and `on_command_buffer` after each submission. Everything tied to
/// a device lives in one context created by `set_device` and destroyed by
/// `destroy_cache`.

use crate::cache::{DescriptorPoolManager, DescriptorSetCache, PipelineCache, PipelineLayoutCache};
use crate::config::{PipelineCacheConfig, PipelineCacheStats};
use crate::device::{
    BufferHandle, CommandBufferHandle, Device, DummyResources, ImageViewHandle, Rect2D,
    RenderPassHandle, ShaderModuleHandle,
};
use crate::error::{Error, Result};
use crate::key::{
    from_native_range, DescriptorImageInfo, DescriptorKey, PipelineKey, PipelineLayoutKey,
    PrimitiveTopology, RasterState, VertexAttribute, VertexBinding, SAMPLER_BINDING_COUNT,
    TARGET_BINDING_COUNT, UBUFFER_BINDING_COUNT, VERTEX_ATTRIBUTE_COUNT,
};
use crate::{engine_error, engine_info, engine_trace, engine_warn};

const SOURCE: &str = "galaxy3d::PipelineCacheEngine";

// ===== INTERNAL STATE =====

/// State that only exists while a device is attached
struct CacheContext<D: Device> {
    device: D,
    /// Placeholders written into empty descriptor slots
    dummy: DummyResources,
    /// Submitted command buffers since `set_device`
    epoch: u64,
    pipelines: PipelineCache,
    layouts: PipelineLayoutCache,
    descriptors: DescriptorSetCache,
    pools: DescriptorPoolManager,
    bound_scissor: Option<Rect2D>,
}

// ===== PUBLIC API =====

/// Pipeline and descriptor set cache for one device
///
/// Single-threaded: every call must come from the thread recording command
/// buffers for the device.
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_pipeline_cache::galaxy3d::PipelineCacheEngine;
/// # use galaxy_3d_pipeline_cache::galaxy3d::device::*;
/// # fn frame<D: Device>(device: D, vs: ShaderModuleHandle, fs: ShaderModuleHandle,
/// #     pass: RenderPassHandle, cmd: CommandBufferHandle) -> galaxy_3d_pipeline_cache::galaxy3d::Result<()> {
/// let mut cache = PipelineCacheEngine::new();
/// cache.set_device(device)?;
///
/// cache.bind_program(vs, fs);
/// cache.bind_render_pass(pass, 0);
/// cache.bind_pipeline(cmd)?;
/// cache.bind_descriptors(cmd)?;
/// // ... record the draw, submit ...
/// cache.on_command_buffer(cmd);
///
/// cache.destroy_cache();
/// # Ok(())
/// # }
/// ```
pub struct PipelineCacheEngine<D: Device> {
    config: PipelineCacheConfig,
    context: Option<CacheContext<D>>,
    pipeline_requirements: PipelineKey,
    descriptor_requirements: DescriptorKey,
}

impl<D: Device> Default for PipelineCacheEngine<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Device> PipelineCacheEngine<D> {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::with_config(PipelineCacheConfig::default())
    }

    /// Create an engine with a custom configuration
    ///
    /// The configuration is validated by `set_device`.
    pub fn with_config(config: PipelineCacheConfig) -> Self {
        Self {
            config,
            context: None,
            pipeline_requirements: PipelineKey::default(),
            descriptor_requirements: DescriptorKey::default(),
        }
    }

    pub fn config(&self) -> &PipelineCacheConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    pub fn device(&self) -> Option<&D> {
        self.context.as_ref().map(|ctx| &ctx.device)
    }

    pub fn device_mut(&mut self) -> Option<&mut D> {
        self.context.as_mut().map(|ctx| &mut ctx.device)
    }

    /// Current epoch (0 without a device)
    pub fn epoch(&self) -> u64 {
        self.context.as_ref().map_or(0, |ctx| ctx.epoch)
    }

    // ===== LIFECYCLE =====

    /// Attach the device and create the dummy resources and the first pool
    ///
    /// # Panics
    ///
    /// If a device is already attached.
    ///
    /// # Errors
    ///
    /// `Error::InitializationFailed` if the configuration is invalid or the
    /// dummy resources or first descriptor pool cannot be created. Nothing
    /// stays allocated on failure.
    pub fn set_device(&mut self, mut device: D) -> Result<()> {
        assert!(self.context.is_none(), "PipelineCacheEngine::set_device called twice");

        self.config.validate().map_err(|err| {
            engine_error!(SOURCE, "Invalid pipeline cache configuration: {}", err);
            err
        })?;

        let dummy = device.create_dummy_resources().map_err(|err| {
            engine_error!(SOURCE, "Dummy resource creation failed: {}", err);
            Error::InitializationFailed(format!("dummy resources: {}", err))
        })?;

        let pools = match DescriptorPoolManager::new(&mut device, self.config.initial_descriptor_pool_size) {
            Ok(pools) => pools,
            Err(err) => {
                device.destroy_dummy_resources(dummy);
                return Err(Error::InitializationFailed(format!("descriptor pool: {}", err)));
            }
        };

        self.context = Some(CacheContext {
            device,
            dummy,
            epoch: 0,
            pipelines: PipelineCache::new(),
            layouts: PipelineLayoutCache::new(),
            descriptors: DescriptorSetCache::new(),
            pools,
            bound_scissor: None,
        });

        engine_info!(
            SOURCE,
            "Pipeline cache attached (pipeline age {}, descriptor age {}, pool {} bundles)",
            self.config.max_pipeline_age,
            self.config.max_descriptor_set_age,
            self.config.initial_descriptor_pool_size
        );
        Ok(())
    }

    /// Destroy every cached object, the pools and the dummy resources
    ///
    /// The engine is ready for `set_device` again afterwards.
    ///
    /// # Returns
    ///
    /// The detached device, or None if none was attached
    pub fn destroy_cache(&mut self) -> Option<D> {
        let mut ctx = self.context.take()?;

        if self.config.wait_idle_before_destroy {
            if let Err(err) = ctx.device.wait_idle() {
                engine_error!(SOURCE, "wait_idle before teardown failed: {}", err);
            }
        }

        ctx.pipelines.destroy_all(&mut ctx.device);
        ctx.descriptors.clear();
        ctx.layouts.destroy_all(&mut ctx.device);
        ctx.pools.destroy_all(&mut ctx.device);
        ctx.device.destroy_dummy_resources(ctx.dummy);

        self.pipeline_requirements = PipelineKey::default();
        self.descriptor_requirements = DescriptorKey::default();

        engine_info!(SOURCE, "Pipeline cache destroyed at epoch {}", ctx.epoch);
        Some(ctx.device)
    }

    // ===== PIPELINE REQUIREMENTS =====

    pub fn pipeline_requirements(&self) -> &PipelineKey {
        &self.pipeline_requirements
    }

    /// Set the shader pair; a null fragment module selects a depth-only pipeline
    pub fn bind_program(&mut self, vertex: ShaderModuleHandle, fragment: ShaderModuleHandle) {
        self.pipeline_requirements.shaders = [vertex, fragment];
    }

    pub fn bind_raster_state(&mut self, state: RasterState) {
        self.pipeline_requirements.raster_state = state;
    }

    pub fn bind_render_pass(&mut self, render_pass: RenderPassHandle, subpass_index: u16) {
        self.pipeline_requirements.render_pass = render_pass;
        self.pipeline_requirements.subpass_index = subpass_index;
    }

    pub fn bind_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.pipeline_requirements.topology = topology;
    }

    /// Set the vertex layout; attribute `i` reads from vertex buffer `i`
    ///
    /// Slots past the given slices are cleared.
    ///
    /// # Panics
    ///
    /// If either slice holds more than `VERTEX_ATTRIBUTE_COUNT` entries.
    pub fn bind_vertex_array(&mut self, attributes: &[VertexAttribute], buffers: &[VertexBinding]) {
        assert!(
            attributes.len() <= VERTEX_ATTRIBUTE_COUNT && buffers.len() <= VERTEX_ATTRIBUTE_COUNT,
            "too many vertex attributes ({}) or buffers ({}), max {}",
            attributes.len(),
            buffers.len(),
            VERTEX_ATTRIBUTE_COUNT
        );
        let key = &mut self.pipeline_requirements;
        key.vertex_attributes = [VertexAttribute::default(); VERTEX_ATTRIBUTE_COUNT];
        key.vertex_buffers = [VertexBinding::default(); VERTEX_ATTRIBUTE_COUNT];
        key.vertex_attributes[..attributes.len()].copy_from_slice(attributes);
        key.vertex_buffers[..buffers.len()].copy_from_slice(buffers);
    }

    // ===== DESCRIPTOR REQUIREMENTS =====

    pub fn descriptor_requirements(&self) -> &DescriptorKey {
        &self.descriptor_requirements
    }

    /// Bind a uniform buffer range
    ///
    /// # Arguments
    ///
    /// * `binding` - Uniform buffer slot (< `UBUFFER_BINDING_COUNT`)
    /// * `buffer` - Buffer handle
    /// * `offset` - Byte offset (must fit in 32 bits)
    /// * `range` - Byte size, or `NATIVE_WHOLE_SIZE` for the rest of the buffer
    ///
    /// # Panics
    ///
    /// If `binding` is out of range, or `offset` or `range` does not fit in 32 bits.
    pub fn bind_uniform_buffer(&mut self, binding: usize, buffer: BufferHandle, offset: u64, range: u64) {
        assert!(
            binding < UBUFFER_BINDING_COUNT,
            "uniform buffer binding {} out of range (max {})",
            binding,
            UBUFFER_BINDING_COUNT
        );
        assert!(offset <= u32::MAX as u64, "uniform buffer offset {} does not fit in 32 bits", offset);
        let key = &mut self.descriptor_requirements;
        key.uniform_buffers[binding] = buffer;
        key.uniform_buffer_offsets[binding] = offset as u32;
        key.uniform_buffer_sizes[binding] = from_native_range(range);
    }

    /// Replace all sampler slots and the sampler usage of the pipeline layout
    ///
    /// Slots past `samplers.len()` are cleared.
    pub fn bind_samplers(&mut self, samplers: &[DescriptorImageInfo], usage: PipelineLayoutKey) {
        assert!(
            samplers.len() <= SAMPLER_BINDING_COUNT,
            "too many samplers ({}), max {}",
            samplers.len(),
            SAMPLER_BINDING_COUNT
        );
        let key = &mut self.descriptor_requirements;
        key.samplers = [DescriptorImageInfo::default(); SAMPLER_BINDING_COUNT];
        key.samplers[..samplers.len()].copy_from_slice(samplers);
        self.pipeline_requirements.layout = usage;
    }

    pub fn bind_input_attachment(&mut self, binding: usize, attachment: DescriptorImageInfo) {
        assert!(
            binding < TARGET_BINDING_COUNT,
            "input attachment binding {} out of range (max {})",
            binding,
            TARGET_BINDING_COUNT
        );
        self.descriptor_requirements.input_attachments[binding] = attachment;
    }

    /// Clear every uniform buffer slot referring to `buffer`
    pub fn unbind_uniform_buffer(&mut self, buffer: BufferHandle) {
        let key = &mut self.descriptor_requirements;
        for binding in 0..UBUFFER_BINDING_COUNT {
            if key.uniform_buffers[binding] == buffer {
                key.uniform_buffers[binding] = BufferHandle::NULL;
                key.uniform_buffer_offsets[binding] = 0;
                key.uniform_buffer_sizes[binding] = 0;
            }
        }
    }

    /// Clear every sampler and input attachment slot referring to `view`
    pub fn unbind_image_view(&mut self, view: ImageViewHandle) {
        let key = &mut self.descriptor_requirements;
        for sampler in key.samplers.iter_mut().filter(|s| s.image_view == view) {
            *sampler = DescriptorImageInfo::default();
        }
        for attachment in key.input_attachments.iter_mut().filter(|a| a.image_view == view) {
            *attachment = DescriptorImageInfo::default();
        }
    }

    // ===== COMMAND BUFFER =====

    /// Bind the pipeline matching the current requirements
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` without a device, otherwise the device error
    /// of a failed creation. The draw should be skipped.
    pub fn bind_pipeline(&mut self, cmd: CommandBufferHandle) -> Result<()> {
        let ctx = self.context.as_mut().ok_or(Error::NotInitialized)?;
        ctx.pipelines
            .bind_pipeline(&mut ctx.device, &mut ctx.layouts, cmd, &self.pipeline_requirements, ctx.epoch)
            .map_err(|err| {
                engine_error!(SOURCE, "bind_pipeline failed, skipping draw: {}", err);
                err
            })
    }

    /// Bind the descriptor sets matching the current requirements
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` without a device, otherwise the device error
    /// of a failed layout creation, pool growth or allocation.
    pub fn bind_descriptors(&mut self, cmd: CommandBufferHandle) -> Result<()> {
        let ctx = self.context.as_mut().ok_or(Error::NotInitialized)?;
        ctx.descriptors
            .bind_descriptors(
                &mut ctx.device,
                &mut ctx.layouts,
                &mut ctx.pools,
                &ctx.dummy,
                cmd,
                &self.descriptor_requirements,
                self.pipeline_requirements.layout,
                ctx.epoch,
            )
            .map_err(|err| {
                engine_error!(SOURCE, "bind_descriptors failed, skipping draw: {}", err);
                err
            })
    }

    /// Set the dynamic scissor, skipping the command if it is unchanged
    pub fn bind_scissor(&mut self, cmd: CommandBufferHandle, scissor: Rect2D) -> Result<()> {
        let ctx = self.context.as_mut().ok_or(Error::NotInitialized)?;
        if ctx.bound_scissor != Some(scissor) {
            ctx.device.cmd_set_scissor(cmd, scissor);
            ctx.bound_scissor = Some(scissor);
        }
        Ok(())
    }

    /// Advance the epoch after a command buffer submission and sweep the caches
    ///
    /// Order: forget bound state, reclaim aged descriptor bundles into their
    /// arenas, destroy aged pipelines, destroy aged layouts (freeing their
    /// arena sets), destroy aged extinct pools.
    pub fn on_command_buffer(&mut self, cmd: CommandBufferHandle) {
        let Some(ctx) = self.context.as_mut() else {
            engine_warn!(SOURCE, "on_command_buffer called without a device");
            return;
        };

        ctx.epoch += 1;
        let epoch = ctx.epoch;

        ctx.pipelines.unbind();
        ctx.descriptors.unbind();
        ctx.bound_scissor = None;

        let pipeline_age = self.config.max_pipeline_age;
        let descriptor_age = self.config.max_descriptor_set_age;
        // A layout outlives every pipeline and bundle built on it
        let layout_age = pipeline_age.max(descriptor_age);

        if self.config.wait_idle_before_destroy
            && (ctx.pipelines.has_expired(epoch, pipeline_age)
                || ctx.layouts.has_expired(epoch, layout_age)
                || ctx.pools.has_expired(epoch, descriptor_age))
        {
            if let Err(err) = ctx.device.wait_idle() {
                engine_error!(SOURCE, "wait_idle before sweep failed: {}", err);
            }
        }

        let pool = ctx.pools.pool();
        let reclaimed = ctx
            .descriptors
            .sweep(&mut ctx.device, &mut ctx.layouts, pool, epoch, descriptor_age);
        let pipelines = ctx.pipelines.sweep(&mut ctx.device, epoch, pipeline_age);
        let descriptors = &ctx.descriptors;
        let layouts = ctx.layouts.sweep(&mut ctx.device, pool, epoch, layout_age, |key| {
            descriptors.references_layout(key)
        });
        let pools = ctx.pools.sweep(&mut ctx.device, epoch, descriptor_age);

        engine_trace!(
            SOURCE,
            "Command buffer {:?} -> epoch {}: {} bundles reclaimed, {} pipelines, {} layouts, {} pools destroyed",
            cmd,
            epoch,
            reclaimed,
            pipelines,
            layouts,
            pools
        );
    }

    /// Snapshot of cache sizes and cumulative counters
    pub fn stats(&self) -> PipelineCacheStats {
        let Some(ctx) = self.context.as_ref() else {
            return PipelineCacheStats::default();
        };
        PipelineCacheStats {
            pipelines: ctx.pipelines.len(),
            layouts: ctx.layouts.len(),
            active_bundles: ctx.descriptors.len(),
            arena_bundles: ctx.layouts.arena_resident(),
            extinct_pools: ctx.pools.extinct_pools().len(),
            pool_capacity: ctx.pools.capacity(),
            epoch: ctx.epoch,
            pipelines_created: ctx.pipelines.pipelines_created(),
            layouts_created: ctx.layouts.layouts_created(),
            bundles_allocated: ctx.descriptors.bundles_allocated(),
            bundles_reclaimed: ctx.descriptors.bundles_reclaimed(),
            bundles_reused: ctx.descriptors.bundles_reused(),
            pool_growths: ctx.pools.growths(),
        }
    }
}

impl<D: Device> Drop for PipelineCacheEngine<D> {
    fn drop(&mut self) {
        if self.context.is_some() {
            self.destroy_cache();
        }
    }
}

#[cfg(test)]
#[path = "pipeline_cache_engine_tests.rs"]
mod tests;
