/// Tests for PipelineCache
///
/// These tests use MockDevice to check key expansion, lookup and sweeping
/// without requiring a GPU.

use super::*;
use crate::device::mock_device::MockDevice;
use crate::device::{RenderPassHandle, ShaderModuleHandle, ShaderStageFlags};
use crate::key::{
    BlendFactor, CompareOp, PipelineLayoutKey, VertexAttribute, VertexBinding, VertexFormat,
    VertexInputRate,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn create_key() -> PipelineKey {
    let mut key = PipelineKey::default();
    key.shaders = [ShaderModuleHandle(100), ShaderModuleHandle(101)];
    key.render_pass = RenderPassHandle(200);
    key.layout = PipelineLayoutKey::EMPTY.with_sampler_stages(0, ShaderStageFlags::FRAGMENT);
    key.vertex_attributes[0] = VertexAttribute {
        location: 0,
        binding: 0,
        format: VertexFormat::R32G32B32_SFLOAT,
        offset: 0,
    };
    key.vertex_buffers[0] = VertexBinding {
        binding: 0,
        input_rate: VertexInputRate::Vertex,
        stride: 12,
    };
    key
}

// ============================================================================
// Key expansion
// ============================================================================

#[test]
fn test_build_desc_full_pipeline() {
    let mut key = create_key();
    key.raster_state.color_target_count = 2;
    key.raster_state.depth_compare_op = CompareOp::GreaterOrEqual;
    key.subpass_index = 1;

    let desc = build_pipeline_desc(&key, PipelineLayoutHandle(9));

    assert_eq!(desc.stages.len(), 2);
    assert_eq!(desc.stages[1].stage, ShaderStage::Fragment);
    assert_eq!(desc.stages[1].module, ShaderModuleHandle(101));
    assert_eq!(desc.vertex_attributes.len(), 1);
    assert_eq!(desc.vertex_bindings.len(), 1);
    assert_eq!(desc.vertex_bindings[0].stride, 12);
    assert_eq!(desc.color_blend_attachments.len(), 2);
    assert!(desc.depth_stencil.depth_test_enable);
    assert_eq!(desc.depth_stencil.depth_compare_op, CompareOp::GreaterOrEqual);
    assert_eq!(desc.dynamic_states, vec![DynamicState::Viewport, DynamicState::Scissor]);
    assert_eq!(desc.layout, PipelineLayoutHandle(9));
    assert_eq!(desc.render_pass, RenderPassHandle(200));
    assert_eq!(desc.subpass, 1);
    assert!(desc.rasterization.depth_bias.is_none());
}

#[test]
fn test_build_desc_depth_only_pipeline() {
    let mut key = create_key();
    key.shaders[1] = ShaderModuleHandle::NULL;
    key.raster_state.color_target_count = 1;

    let desc = build_pipeline_desc(&key, PipelineLayoutHandle(9));

    assert_eq!(desc.stages.len(), 1);
    assert_eq!(desc.stages[0].stage, ShaderStage::Vertex);
    assert!(desc.color_blend_attachments.is_empty());
}

#[test]
fn test_build_desc_skips_inactive_attributes() {
    let mut key = create_key();
    key.vertex_attributes[3] = VertexAttribute {
        location: 3,
        binding: 3,
        format: VertexFormat::R8G8B8A8_UNORM,
        offset: 0,
    };
    key.vertex_buffers[3] = VertexBinding {
        binding: 3,
        input_rate: VertexInputRate::Instance,
        stride: 4,
    };

    let desc = build_pipeline_desc(&key, PipelineLayoutHandle(1));

    assert_eq!(desc.vertex_attributes.len(), 2);
    assert_eq!(desc.vertex_attributes[1].location, 3);
    assert_eq!(desc.vertex_bindings[1].input_rate, VertexInputRate::Instance);
}

#[test]
fn test_build_desc_blend_and_bias() {
    let mut key = create_key();
    key.raster_state.blend_enable = true;
    key.raster_state.src_color_blend_factor = BlendFactor::SrcAlpha;
    key.raster_state.dst_color_blend_factor = BlendFactor::OneMinusSrcAlpha;
    key.raster_state.depth_bias_enable = true;
    key.raster_state.depth_bias_constant_factor = 1.5;
    key.raster_state.depth_bias_slope_factor = 2.0;

    let desc = build_pipeline_desc(&key, PipelineLayoutHandle(1));

    let blend = desc.color_blend_attachments[0];
    assert!(blend.blend_enable);
    assert_eq!(blend.src_color_factor, BlendFactor::SrcAlpha);
    assert_eq!(blend.dst_color_factor, BlendFactor::OneMinusSrcAlpha);
    assert_eq!(
        desc.rasterization.depth_bias,
        Some(DepthBias {
            constant_factor: 1.5,
            slope_factor: 2.0
        })
    );
}

// ============================================================================
// Binding
// ============================================================================

#[test]
fn test_bind_creates_layout_and_pipeline() {
    let mut device = MockDevice::new();
    let mut layouts = PipelineLayoutCache::new();
    let mut cache = PipelineCache::new();

    cache
        .bind_pipeline(&mut device, &mut layouts, CommandBufferHandle(1), &create_key(), 0)
        .unwrap();

    assert_eq!(device.pipelines_created(), 1);
    assert_eq!(device.pipeline_binds(), 1);
    assert_eq!(layouts.len(), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(device.pipeline_descs[0].layout, device.pipeline_layouts_created[0].0);
}

#[test]
fn test_rebind_is_idempotent() {
    let mut device = MockDevice::new();
    let mut layouts = PipelineLayoutCache::new();
    let mut cache = PipelineCache::new();
    let key = create_key();

    cache.bind_pipeline(&mut device, &mut layouts, CommandBufferHandle(1), &key, 0).unwrap();
    cache.bind_pipeline(&mut device, &mut layouts, CommandBufferHandle(1), &key, 0).unwrap();

    assert_eq!(device.pipelines_created(), 1);
    assert_eq!(device.pipeline_binds(), 1);
}

#[test]
fn test_different_keys_create_different_pipelines() {
    let mut device = MockDevice::new();
    let mut layouts = PipelineLayoutCache::new();
    let mut cache = PipelineCache::new();
    let a = create_key();
    let mut b = create_key();
    b.raster_state.cull_mode = crate::key::CullMode::None;

    cache.bind_pipeline(&mut device, &mut layouts, CommandBufferHandle(1), &a, 0).unwrap();
    cache.bind_pipeline(&mut device, &mut layouts, CommandBufferHandle(1), &b, 0).unwrap();
    cache.bind_pipeline(&mut device, &mut layouts, CommandBufferHandle(1), &a, 0).unwrap();

    assert_eq!(device.pipelines_created(), 2);
    assert_eq!(device.pipeline_binds(), 3);
    // Both share one layout
    assert_eq!(layouts.len(), 1);
}

#[test]
fn test_creation_failure_caches_nothing() {
    let mut device = MockDevice::new();
    let mut layouts = PipelineLayoutCache::new();
    let mut cache = PipelineCache::new();
    device.fail_next_pipeline = true;

    let result = cache.bind_pipeline(&mut device, &mut layouts, CommandBufferHandle(1), &create_key(), 0);

    assert!(result.is_err());
    assert!(cache.is_empty());
    assert_eq!(device.pipeline_binds(), 0);

    cache
        .bind_pipeline(&mut device, &mut layouts, CommandBufferHandle(1), &create_key(), 0)
        .unwrap();
    assert_eq!(cache.pipelines_created(), 1);
}

// ============================================================================
// Sweep
// ============================================================================

#[test]
fn test_sweep_respects_eviction_window() {
    let mut device = MockDevice::new();
    let mut layouts = PipelineLayoutCache::new();
    let mut cache = PipelineCache::new();
    cache.bind_pipeline(&mut device, &mut layouts, CommandBufferHandle(1), &create_key(), 2).unwrap();

    assert!(!cache.has_expired(12, 10));
    assert_eq!(cache.sweep(&mut device, 12, 10), 0);
    assert_eq!(cache.sweep(&mut device, 13, 10), 1);
    assert_eq!(device.destroyed_pipelines(), 1);
    assert!(cache.is_empty());
}

#[test]
fn test_destroy_all() {
    let mut device = MockDevice::new();
    let mut layouts = PipelineLayoutCache::new();
    let mut cache = PipelineCache::new();
    cache.bind_pipeline(&mut device, &mut layouts, CommandBufferHandle(1), &create_key(), 0).unwrap();

    cache.destroy_all(&mut device);

    assert!(cache.is_empty());
    assert_eq!(device.destroyed_pipelines(), 1);
}
