//! Unit tests for Vulkan conversion functions
//!
//! Pure mappings only, no GPU required.

use super::*;
use galaxy_3d_pipeline_cache::galaxy3d::device::{
    ImageViewHandle, PipelineHandle, SamplerHandle,
};

// ============================================================================
// HANDLE CONVERSION TESTS
// ============================================================================

#[test]
fn test_handle_raw_value_is_preserved() {
    let pipeline: vk::Pipeline = raw_to_vk(PipelineHandle(0xDEAD_BEEF).as_raw());
    assert_eq!(vk_to_raw(pipeline), 0xDEAD_BEEF);
}

#[test]
fn test_null_handle_maps_to_vk_null() {
    let sampler: vk::Sampler = raw_to_vk(SamplerHandle::NULL.as_raw());
    assert_eq!(sampler, vk::Sampler::null());
}

// ============================================================================
// ERROR MAPPING TESTS
// ============================================================================

#[test]
fn test_pool_exhaustion_maps_to_out_of_pool_memory() {
    assert_eq!(
        vk_result_to_error("alloc", vk::Result::ERROR_OUT_OF_POOL_MEMORY),
        Error::OutOfPoolMemory
    );
    assert_eq!(
        vk_result_to_error("alloc", vk::Result::ERROR_FRAGMENTED_POOL),
        Error::OutOfPoolMemory
    );
}

#[test]
fn test_memory_exhaustion_maps_to_out_of_memory() {
    assert_eq!(
        vk_result_to_error("create", vk::Result::ERROR_OUT_OF_DEVICE_MEMORY),
        Error::OutOfMemory
    );
    assert_eq!(
        vk_result_to_error("create", vk::Result::ERROR_OUT_OF_HOST_MEMORY),
        Error::OutOfMemory
    );
}

#[test]
fn test_other_results_map_to_backend_error() {
    match vk_result_to_error("Failed to create graphics pipeline", vk::Result::ERROR_INITIALIZATION_FAILED) {
        Error::BackendError(message) => {
            assert!(message.starts_with("Failed to create graphics pipeline"));
            assert!(message.contains("ERROR_INITIALIZATION_FAILED"));
        }
        other => panic!("expected BackendError, got {:?}", other),
    }
}

// ============================================================================
// PIPELINE STATE CONVERSION TESTS
// ============================================================================

#[test]
fn test_topology_to_vk() {
    assert_eq!(topology_to_vk(PrimitiveTopology::PointList), vk::PrimitiveTopology::POINT_LIST);
    assert_eq!(topology_to_vk(PrimitiveTopology::LineStrip), vk::PrimitiveTopology::LINE_STRIP);
    assert_eq!(topology_to_vk(PrimitiveTopology::TriangleList), vk::PrimitiveTopology::TRIANGLE_LIST);
    assert_eq!(topology_to_vk(PrimitiveTopology::TriangleStrip), vk::PrimitiveTopology::TRIANGLE_STRIP);
}

#[test]
fn test_cull_mode_to_vk() {
    assert_eq!(cull_mode_to_vk(CullMode::None), vk::CullModeFlags::NONE);
    assert_eq!(cull_mode_to_vk(CullMode::Back), vk::CullModeFlags::BACK);
    assert_eq!(cull_mode_to_vk(CullMode::FrontAndBack), vk::CullModeFlags::FRONT_AND_BACK);
}

#[test]
fn test_compare_op_to_vk() {
    assert_eq!(compare_op_to_vk(CompareOp::Less), vk::CompareOp::LESS);
    assert_eq!(compare_op_to_vk(CompareOp::GreaterOrEqual), vk::CompareOp::GREATER_OR_EQUAL);
    assert_eq!(compare_op_to_vk(CompareOp::Always), vk::CompareOp::ALWAYS);
}

#[test]
fn test_blend_state_to_vk() {
    assert_eq!(blend_factor_to_vk(BlendFactor::OneMinusSrcAlpha), vk::BlendFactor::ONE_MINUS_SRC_ALPHA);
    assert_eq!(blend_factor_to_vk(BlendFactor::SrcAlphaSaturate), vk::BlendFactor::SRC_ALPHA_SATURATE);
    assert_eq!(blend_op_to_vk(BlendOp::ReverseSubtract), vk::BlendOp::REVERSE_SUBTRACT);
    assert_eq!(blend_op_to_vk(BlendOp::Max), vk::BlendOp::MAX);
}

#[test]
fn test_color_write_mask_to_vk() {
    assert_eq!(color_write_mask_to_vk(ColorWriteMask::ALL), vk::ColorComponentFlags::R | vk::ColorComponentFlags::G | vk::ColorComponentFlags::B | vk::ColorComponentFlags::A);
    assert_eq!(
        color_write_mask_to_vk(ColorWriteMask::R | ColorWriteMask::A),
        vk::ColorComponentFlags::R | vk::ColorComponentFlags::A
    );
    assert_eq!(color_write_mask_to_vk(ColorWriteMask::empty()), vk::ColorComponentFlags::empty());
}

#[test]
fn test_sample_count_to_vk() {
    assert_eq!(sample_count_to_vk(SampleCount::S1), vk::SampleCountFlags::TYPE_1);
    assert_eq!(sample_count_to_vk(SampleCount::S8), vk::SampleCountFlags::TYPE_8);
}

#[test]
fn test_dynamic_states_to_vk() {
    assert_eq!(dynamic_state_to_vk(DynamicState::Viewport), vk::DynamicState::VIEWPORT);
    assert_eq!(dynamic_state_to_vk(DynamicState::Scissor), vk::DynamicState::SCISSOR);
}

// ============================================================================
// SHADER AND VERTEX INPUT CONVERSION TESTS
// ============================================================================

#[test]
fn test_stage_flags_to_vk() {
    assert_eq!(stage_flags_to_vk(ShaderStageFlags::empty()), vk::ShaderStageFlags::empty());
    assert_eq!(stage_flags_to_vk(ShaderStageFlags::FRAGMENT), vk::ShaderStageFlags::FRAGMENT);
    assert_eq!(
        stage_flags_to_vk(ShaderStageFlags::VERTEX_FRAGMENT),
        vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT
    );
    assert_eq!(shader_stage_to_vk(ShaderStage::Vertex), vk::ShaderStageFlags::VERTEX);
}

#[test]
fn test_vertex_format_to_vk() {
    assert_eq!(vertex_format_to_vk(VertexFormat::Undefined), vk::Format::UNDEFINED);
    assert_eq!(vertex_format_to_vk(VertexFormat::R32G32B32_SFLOAT), vk::Format::R32G32B32_SFLOAT);
    assert_eq!(vertex_format_to_vk(VertexFormat::R8G8B8A8_UNORM), vk::Format::R8G8B8A8_UNORM);
    assert_eq!(vertex_format_to_vk(VertexFormat::R16G16_SNORM), vk::Format::R16G16_SNORM);
    assert_eq!(input_rate_to_vk(VertexInputRate::Instance), vk::VertexInputRate::INSTANCE);
}

// ============================================================================
// VERTEX INPUT TESTS
// ============================================================================

fn attribute(location: u8, binding: u8, offset: u32) -> VertexAttribute {
    VertexAttribute {
        location,
        binding,
        format: VertexFormat::R32G32_SFLOAT,
        offset,
    }
}

fn buffer(binding: u16, stride: u32, input_rate: VertexInputRate) -> VertexBinding {
    VertexBinding { binding, input_rate, stride }
}

#[test]
fn test_vertex_input_shares_binding_descriptions() {
    let attributes = [attribute(0, 0, 0), attribute(1, 0, 8), attribute(2, 1, 0)];
    let buffers = [
        buffer(0, 16, VertexInputRate::Vertex),
        buffer(0, 16, VertexInputRate::Vertex),
        buffer(1, 8, VertexInputRate::Instance),
    ];

    let (bindings, attributes) = vertex_input_to_vk(&attributes, &buffers).unwrap();

    assert_eq!(bindings.len(), 2);
    assert_eq!((bindings[0].binding, bindings[0].stride), (0, 16));
    assert_eq!(bindings[1].binding, 1);
    assert_eq!(bindings[1].stride, 8);
    assert_eq!(bindings[1].input_rate, vk::VertexInputRate::INSTANCE);

    assert_eq!(attributes.len(), 3);
    assert_eq!(attributes[1].location, 1);
    assert_eq!(attributes[1].binding, 0);
    assert_eq!(attributes[1].offset, 8);
    assert_eq!(attributes[2].binding, 1);
}

#[test]
fn test_vertex_input_rejects_conflicting_strides() {
    let attributes = [attribute(0, 0, 0), attribute(1, 0, 8)];
    let buffers = [buffer(0, 16, VertexInputRate::Vertex), buffer(0, 24, VertexInputRate::Vertex)];

    assert!(matches!(vertex_input_to_vk(&attributes, &buffers), Err(Error::BackendError(_))));
}

#[test]
fn test_vertex_input_rejects_mismatched_pairing() {
    let attributes = [attribute(0, 1, 0)];
    let buffers = [buffer(0, 16, VertexInputRate::Vertex)];

    assert!(matches!(vertex_input_to_vk(&attributes, &buffers), Err(Error::BackendError(_))));
}

// ============================================================================
// DESCRIPTOR CONVERSION TESTS
// ============================================================================

#[test]
fn test_descriptor_type_to_vk() {
    assert_eq!(descriptor_type_to_vk(DescriptorType::UniformBuffer), vk::DescriptorType::UNIFORM_BUFFER);
    assert_eq!(
        descriptor_type_to_vk(DescriptorType::CombinedImageSampler),
        vk::DescriptorType::COMBINED_IMAGE_SAMPLER
    );
    assert_eq!(descriptor_type_to_vk(DescriptorType::InputAttachment), vk::DescriptorType::INPUT_ATTACHMENT);
}

#[test]
fn test_descriptor_range_whole_size() {
    assert_eq!(descriptor_range_to_vk(NATIVE_WHOLE_SIZE), vk::WHOLE_SIZE);
    assert_eq!(descriptor_range_to_vk(256), 256);
}

#[test]
fn test_image_info_to_vk() {
    let info = DescriptorImageInfo::new(SamplerHandle(7), ImageViewHandle(9), ImageLayout::ShaderReadOnly);
    let vk_info = image_info_to_vk(&info);
    assert_eq!(vk_to_raw(vk_info.sampler), 7);
    assert_eq!(vk_to_raw(vk_info.image_view), 9);
    assert_eq!(vk_info.image_layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);

    let attachment = image_info_to_vk(&DescriptorImageInfo::attachment(ImageViewHandle(3), ImageLayout::General));
    assert_eq!(attachment.sampler, vk::Sampler::null());
    assert_eq!(attachment.image_layout, vk::ImageLayout::GENERAL);
}
