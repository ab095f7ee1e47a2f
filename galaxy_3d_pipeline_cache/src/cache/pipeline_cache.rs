/// Pipeline cache
///
/// Resolves a `PipelineKey` to a graphics pipeline. The key is expanded into a
/// full `GraphicsPipelineDesc` only on a miss; rebinding the pipeline that is
/// already bound costs one key comparison.

use crate::cache::{PipelineLayoutCache, ResourcePool};
use crate::device::{
    ColorBlendAttachment, CommandBufferHandle, DepthBias, DepthStencilDesc, Device, DynamicState,
    GpuObject, GraphicsPipelineDesc, MultisampleDesc, PipelineHandle, PipelineLayoutHandle,
    RasterizationDesc, ShaderStage, ShaderStageDesc,
};
use crate::error::Result;
use crate::key::PipelineKey;
use crate::{engine_debug, engine_error, engine_trace};

const SOURCE: &str = "galaxy3d::PipelineCache";

/// Expand a compact pipeline key into a creation descriptor
///
/// A null fragment module yields a depth-only pipeline: one shader stage and
/// no color attachments. Vertex attribute `i` is paired with vertex buffer
/// `i`; inactive attributes are skipped. Viewport and scissor stay dynamic.
pub fn build_pipeline_desc(key: &PipelineKey, layout: PipelineLayoutHandle) -> GraphicsPipelineDesc {
    let raster = &key.raster_state;
    let has_fragment = !key.fragment_shader().is_null();

    let mut stages = vec![ShaderStageDesc {
        stage: ShaderStage::Vertex,
        module: key.vertex_shader(),
    }];
    if has_fragment {
        stages.push(ShaderStageDesc {
            stage: ShaderStage::Fragment,
            module: key.fragment_shader(),
        });
    }

    let mut vertex_attributes = Vec::new();
    let mut vertex_bindings = Vec::new();
    for (attribute, binding) in key.vertex_attributes.iter().zip(key.vertex_buffers.iter()) {
        if attribute.is_active() {
            vertex_attributes.push(*attribute);
            vertex_bindings.push(*binding);
        }
    }

    let color_target_count = if has_fragment { raster.color_target_count as usize } else { 0 };
    let blend = ColorBlendAttachment {
        blend_enable: raster.blend_enable,
        src_color_factor: raster.src_color_blend_factor,
        dst_color_factor: raster.dst_color_blend_factor,
        color_blend_op: raster.color_blend_op,
        src_alpha_factor: raster.src_alpha_blend_factor,
        dst_alpha_factor: raster.dst_alpha_blend_factor,
        alpha_blend_op: raster.alpha_blend_op,
        color_write_mask: raster.color_write_mask(),
    };

    GraphicsPipelineDesc {
        stages,
        vertex_attributes,
        vertex_bindings,
        topology: key.topology,
        rasterization: RasterizationDesc {
            cull_mode: raster.cull_mode,
            front_face: raster.front_face,
            depth_bias: raster.depth_bias_enable.then_some(DepthBias {
                constant_factor: raster.depth_bias_constant_factor,
                slope_factor: raster.depth_bias_slope_factor,
            }),
        },
        multisample: MultisampleDesc {
            sample_count: raster.sample_count,
            alpha_to_coverage: raster.alpha_to_coverage_enable,
        },
        depth_stencil: DepthStencilDesc {
            depth_test_enable: true,
            depth_write_enable: raster.depth_write_enable,
            depth_compare_op: raster.depth_compare_op,
        },
        color_blend_attachments: vec![blend; color_target_count],
        dynamic_states: vec![DynamicState::Viewport, DynamicState::Scissor],
        layout,
        render_pass: key.render_pass,
        subpass: key.subpass_index as u32,
    }
}

#[derive(Debug, Default)]
pub struct PipelineCache {
    pipelines: ResourcePool<PipelineKey, PipelineHandle>,
    bound: Option<PipelineKey>,
    pipelines_created: u64,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    pub fn pipelines_created(&self) -> u64 {
        self.pipelines_created
    }

    /// Forget the last bound pipeline (command buffer state is undefined)
    pub fn unbind(&mut self) {
        self.bound = None;
    }

    /// Bind the pipeline matching `key`
    ///
    /// # Errors
    ///
    /// Returns the device error if the layout or the pipeline cannot be
    /// created. Nothing is bound or cached in that case.
    pub fn bind_pipeline<D: Device>(
        &mut self,
        device: &mut D,
        layouts: &mut PipelineLayoutCache,
        cmd: CommandBufferHandle,
        key: &PipelineKey,
        epoch: u64,
    ) -> Result<()> {
        // Fast path: already bound on this command buffer
        if self.bound.as_ref() == Some(key) && self.pipelines.touch(key, epoch).is_some() {
            layouts.touch(&key.layout, epoch);
            return Ok(());
        }

        let pipeline = self.get_or_create_pipeline(device, layouts, key, epoch)?;
        device.cmd_bind_pipeline(cmd, pipeline);
        self.bound = Some(*key);
        Ok(())
    }

    /// Look up or create the pipeline for `key`
    pub fn get_or_create_pipeline<D: Device>(
        &mut self,
        device: &mut D,
        layouts: &mut PipelineLayoutCache,
        key: &PipelineKey,
        epoch: u64,
    ) -> Result<PipelineHandle> {
        if let Some(pipeline) = self.pipelines.touch(key, epoch) {
            let pipeline = *pipeline;
            layouts.touch(&key.layout, epoch);
            return Ok(pipeline);
        }

        let layout = layouts.get_or_create_pipeline_layout(device, key.layout, epoch)?;
        let desc = build_pipeline_desc(key, layout);
        let pipeline = device.create_graphics_pipeline(&desc).map_err(|err| {
            engine_error!(SOURCE, "Graphics pipeline creation failed: {}", err);
            err
        })?;

        engine_debug!(
            SOURCE,
            "Created pipeline {:?} ({} stages, {} attributes, {} color targets)",
            pipeline,
            desc.stages.len(),
            desc.vertex_attributes.len(),
            desc.color_blend_attachments.len()
        );
        self.pipelines.insert(*key, pipeline, epoch);
        self.pipelines_created += 1;
        Ok(pipeline)
    }

    /// True if the next sweep with these parameters destroys a pipeline
    pub fn has_expired(&self, epoch: u64, max_age: u64) -> bool {
        self.pipelines.has_expired(epoch, max_age)
    }

    /// Destroy every pipeline past the eviction window
    pub fn sweep<D: Device>(&mut self, device: &mut D, epoch: u64, max_age: u64) -> usize {
        let expired = self.pipelines.evict_expired(epoch, max_age);
        for (_, entry) in &expired {
            device.destroy(GpuObject::Pipeline(entry.value));
        }
        if !expired.is_empty() {
            engine_trace!(SOURCE, "Epoch {}: destroyed {} pipelines", epoch, expired.len());
        }
        expired.len()
    }

    pub fn destroy_all<D: Device>(&mut self, device: &mut D) {
        for (_, entry) in self.pipelines.drain() {
            device.destroy(GpuObject::Pipeline(entry.value));
        }
        self.bound = None;
    }
}

#[cfg(test)]
#[path = "pipeline_cache_tests.rs"]
mod tests;
