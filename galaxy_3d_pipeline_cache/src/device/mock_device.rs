/// Mock Device for unit tests (no GPU required)
///
/// Hands out sequential fake handles, records every call the caches make and
/// can be told to fail the next creation of a given kind. Descriptor pools
/// enforce their `max_sets` so that a missing pool growth shows up as an
/// allocation failure.

use rustc_hash::FxHashMap;

use crate::device::{
    CommandBufferHandle, DescriptorBundle, DescriptorPoolDesc, DescriptorPoolHandle,
    DescriptorSetHandle, DescriptorSetLayoutBinding, DescriptorSetLayoutHandle,
    DescriptorSetLayouts, DescriptorWrite, Device, DummyResources, GpuObject,
    GraphicsPipelineDesc, PipelineHandle, PipelineLayoutHandle, Rect2D, BufferHandle,
    ImageHandle, ImageViewHandle, SamplerHandle,
};
use crate::error::{Error, Result};

/// Command recorded into a mock command buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCommand {
    BindPipeline(CommandBufferHandle, PipelineHandle),
    BindDescriptorSets(CommandBufferHandle, PipelineLayoutHandle, DescriptorBundle),
    SetScissor(CommandBufferHandle, Rect2D),
}

#[derive(Debug, Default)]
pub struct MockPool {
    pub desc: Option<DescriptorPoolDesc>,
    pub allocated_sets: u32,
}

#[derive(Debug, Default)]
pub struct MockDevice {
    next_handle: u64,

    pub pipeline_descs: Vec<GraphicsPipelineDesc>,
    pub set_layout_bindings: Vec<Vec<DescriptorSetLayoutBinding>>,
    pub pipeline_layouts_created: Vec<(PipelineLayoutHandle, DescriptorSetLayouts)>,
    pub pools_created: Vec<(DescriptorPoolHandle, DescriptorPoolDesc)>,
    pub pools: FxHashMap<DescriptorPoolHandle, MockPool>,
    pub allocations: Vec<(DescriptorPoolHandle, DescriptorBundle)>,
    pub freed_sets: Vec<(DescriptorPoolHandle, Vec<DescriptorSetHandle>)>,
    pub write_batches: Vec<Vec<DescriptorWrite>>,
    pub destroyed: Vec<GpuObject>,
    pub dummies_created: Vec<DummyResources>,
    pub dummies_destroyed: Vec<DummyResources>,
    pub wait_idle_calls: usize,
    pub commands: Vec<MockCommand>,

    pub fail_next_pipeline: bool,
    pub fail_next_set_layout: bool,
    pub fail_next_pipeline_layout: bool,
    pub fail_next_allocation: bool,
    /// Next allocation reports a fragmented pool regardless of capacity
    pub fragment_next_allocation: bool,
    pub fail_next_pool: bool,
    pub fail_dummy: bool,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn pipelines_created(&self) -> usize {
        self.pipeline_descs.len()
    }

    pub fn pipeline_binds(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, MockCommand::BindPipeline(..))).count()
    }

    pub fn descriptor_binds(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, MockCommand::BindDescriptorSets(..))).count()
    }

    pub fn scissor_sets(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, MockCommand::SetScissor(..))).count()
    }

    pub fn is_destroyed(&self, object: GpuObject) -> bool {
        self.destroyed.contains(&object)
    }

    pub fn destroyed_pipelines(&self) -> usize {
        self.destroyed.iter().filter(|o| matches!(o, GpuObject::Pipeline(_))).count()
    }

    pub fn destroyed_pools(&self) -> Vec<DescriptorPoolHandle> {
        self.destroyed
            .iter()
            .filter_map(|o| match o {
                GpuObject::DescriptorPool(pool) => Some(*pool),
                _ => None,
            })
            .collect()
    }
}

impl Device for MockDevice {
    fn create_graphics_pipeline(&mut self, desc: &GraphicsPipelineDesc) -> Result<PipelineHandle> {
        if std::mem::take(&mut self.fail_next_pipeline) {
            return Err(Error::BackendError("mock pipeline creation failure".to_string()));
        }
        self.pipeline_descs.push(desc.clone());
        Ok(PipelineHandle(self.handle()))
    }

    fn create_descriptor_set_layout(
        &mut self,
        bindings: &[DescriptorSetLayoutBinding],
    ) -> Result<DescriptorSetLayoutHandle> {
        if std::mem::take(&mut self.fail_next_set_layout) {
            return Err(Error::OutOfMemory);
        }
        self.set_layout_bindings.push(bindings.to_vec());
        Ok(DescriptorSetLayoutHandle(self.handle()))
    }

    fn create_pipeline_layout(&mut self, set_layouts: &DescriptorSetLayouts) -> Result<PipelineLayoutHandle> {
        if std::mem::take(&mut self.fail_next_pipeline_layout) {
            return Err(Error::OutOfMemory);
        }
        let layout = PipelineLayoutHandle(self.handle());
        self.pipeline_layouts_created.push((layout, *set_layouts));
        Ok(layout)
    }

    fn create_descriptor_pool(&mut self, desc: &DescriptorPoolDesc) -> Result<DescriptorPoolHandle> {
        if std::mem::take(&mut self.fail_next_pool) {
            return Err(Error::OutOfMemory);
        }
        let pool = DescriptorPoolHandle(self.handle());
        self.pools_created.push((pool, *desc));
        self.pools.insert(pool, MockPool { desc: Some(*desc), allocated_sets: 0 });
        Ok(pool)
    }

    fn allocate_descriptor_sets(
        &mut self,
        pool: DescriptorPoolHandle,
        set_layouts: &DescriptorSetLayouts,
    ) -> Result<DescriptorBundle> {
        if std::mem::take(&mut self.fail_next_allocation) {
            return Err(Error::OutOfMemory);
        }
        if std::mem::take(&mut self.fragment_next_allocation) {
            return Err(Error::OutOfPoolMemory);
        }
        let count = set_layouts.len() as u32;
        let state = self
            .pools
            .get_mut(&pool)
            .ok_or_else(|| Error::InvalidResource(format!("unknown pool {:?}", pool)))?;
        let max_sets = state.desc.map(|d| d.max_sets).unwrap_or(0);
        if state.allocated_sets + count > max_sets {
            return Err(Error::OutOfPoolMemory);
        }
        state.allocated_sets += count;

        let bundle = [
            DescriptorSetHandle(self.handle()),
            DescriptorSetHandle(self.handle()),
            DescriptorSetHandle(self.handle()),
        ];
        self.allocations.push((pool, bundle));
        Ok(bundle)
    }

    fn free_descriptor_sets(&mut self, pool: DescriptorPoolHandle, sets: &[DescriptorSetHandle]) -> Result<()> {
        if let Some(state) = self.pools.get_mut(&pool) {
            state.allocated_sets = state.allocated_sets.saturating_sub(sets.len() as u32);
        }
        self.freed_sets.push((pool, sets.to_vec()));
        Ok(())
    }

    fn update_descriptor_sets(&mut self, writes: &[DescriptorWrite]) {
        self.write_batches.push(writes.to_vec());
    }

    fn create_dummy_resources(&mut self) -> Result<DummyResources> {
        if self.fail_dummy {
            return Err(Error::OutOfMemory);
        }
        let dummy = DummyResources {
            buffer: BufferHandle(self.handle()),
            buffer_size: 16,
            image: ImageHandle(self.handle()),
            image_view: ImageViewHandle(self.handle()),
            sampler: SamplerHandle(self.handle()),
        };
        self.dummies_created.push(dummy);
        Ok(dummy)
    }

    fn destroy_dummy_resources(&mut self, dummy: DummyResources) {
        self.dummies_destroyed.push(dummy);
    }

    fn destroy(&mut self, object: GpuObject) {
        if let GpuObject::DescriptorPool(pool) = object {
            self.pools.remove(&pool);
        }
        self.destroyed.push(object);
    }

    fn wait_idle(&mut self) -> Result<()> {
        self.wait_idle_calls += 1;
        Ok(())
    }

    fn cmd_bind_pipeline(&mut self, cmd: CommandBufferHandle, pipeline: PipelineHandle) {
        self.commands.push(MockCommand::BindPipeline(cmd, pipeline));
    }

    fn cmd_bind_descriptor_sets(
        &mut self,
        cmd: CommandBufferHandle,
        layout: PipelineLayoutHandle,
        sets: &DescriptorBundle,
    ) {
        self.commands.push(MockCommand::BindDescriptorSets(cmd, layout, *sets));
    }

    fn cmd_set_scissor(&mut self, cmd: CommandBufferHandle, scissor: Rect2D) {
        self.commands.push(MockCommand::SetScissor(cmd, scissor));
    }
}
