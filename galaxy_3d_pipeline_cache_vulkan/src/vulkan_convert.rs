/// Conversions between the cache's backend-agnostic types and Vulkan types
///
/// Pure functions only: nothing here touches a `vk::Device`, so every
/// mapping is testable without a GPU.

use ash::vk;
use ash::vk::Handle;

use galaxy_3d_pipeline_cache::engine_debug;
use galaxy_3d_pipeline_cache::engine_err;
use galaxy_3d_pipeline_cache::engine_error;
use galaxy_3d_pipeline_cache::galaxy3d::device::{
    DescriptorType, DynamicState, ShaderStage, ShaderStageFlags,
};
use galaxy_3d_pipeline_cache::galaxy3d::key::{
    BlendFactor, BlendOp, ColorWriteMask, CompareOp, CullMode, DescriptorImageInfo, FrontFace, ImageLayout,
    PrimitiveTopology, SampleCount, VertexAttribute, VertexBinding, VertexFormat, VertexInputRate,
    NATIVE_WHOLE_SIZE,
};
use galaxy_3d_pipeline_cache::galaxy3d::{Error, Result};

// ===== Handles =====

/// Rebuild a Vulkan handle from the raw value carried by a cache handle
pub(crate) fn raw_to_vk<H: Handle>(raw: u64) -> H {
    H::from_raw(raw)
}

/// Raw value of a Vulkan handle, wrapped by the caller into a cache handle
pub(crate) fn vk_to_raw<H: Handle>(handle: H) -> u64 {
    handle.as_raw()
}

// ===== Errors =====

/// Map a `vk::Result` to a cache error
///
/// Pool exhaustion and fragmentation become `OutOfPoolMemory`, which the
/// descriptor cache answers by growing the pool.
pub(crate) fn vk_result_to_error(what: &str, result: vk::Result) -> Error {
    match result {
        vk::Result::ERROR_OUT_OF_POOL_MEMORY | vk::Result::ERROR_FRAGMENTED_POOL => {
            engine_debug!("galaxy3d::vulkan", "{}: descriptor pool exhausted ({:?})", what, result);
            Error::OutOfPoolMemory
        }
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            engine_error!("galaxy3d::vulkan", "{}: {:?}", what, result);
            Error::OutOfMemory
        }
        _ => engine_err!("galaxy3d::vulkan", "{}: {:?}", what, result),
    }
}

// ===== Pipeline state =====

pub(crate) fn topology_to_vk(topology: PrimitiveTopology) -> vk::PrimitiveTopology {
    match topology {
        PrimitiveTopology::PointList => vk::PrimitiveTopology::POINT_LIST,
        PrimitiveTopology::LineList => vk::PrimitiveTopology::LINE_LIST,
        PrimitiveTopology::LineStrip => vk::PrimitiveTopology::LINE_STRIP,
        PrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
        PrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
    }
}

pub(crate) fn cull_mode_to_vk(mode: CullMode) -> vk::CullModeFlags {
    match mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
        CullMode::FrontAndBack => vk::CullModeFlags::FRONT_AND_BACK,
    }
}

pub(crate) fn front_face_to_vk(face: FrontFace) -> vk::FrontFace {
    match face {
        FrontFace::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
        FrontFace::Clockwise => vk::FrontFace::CLOCKWISE,
    }
}

pub(crate) fn compare_op_to_vk(op: CompareOp) -> vk::CompareOp {
    match op {
        CompareOp::Never => vk::CompareOp::NEVER,
        CompareOp::Less => vk::CompareOp::LESS,
        CompareOp::Equal => vk::CompareOp::EQUAL,
        CompareOp::LessOrEqual => vk::CompareOp::LESS_OR_EQUAL,
        CompareOp::Greater => vk::CompareOp::GREATER,
        CompareOp::NotEqual => vk::CompareOp::NOT_EQUAL,
        CompareOp::GreaterOrEqual => vk::CompareOp::GREATER_OR_EQUAL,
        CompareOp::Always => vk::CompareOp::ALWAYS,
    }
}

pub(crate) fn blend_factor_to_vk(factor: BlendFactor) -> vk::BlendFactor {
    match factor {
        BlendFactor::Zero => vk::BlendFactor::ZERO,
        BlendFactor::One => vk::BlendFactor::ONE,
        BlendFactor::SrcColor => vk::BlendFactor::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => vk::BlendFactor::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => vk::BlendFactor::DST_COLOR,
        BlendFactor::OneMinusDstColor => vk::BlendFactor::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => vk::BlendFactor::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => vk::BlendFactor::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => vk::BlendFactor::ONE_MINUS_DST_ALPHA,
        BlendFactor::ConstantColor => vk::BlendFactor::CONSTANT_COLOR,
        BlendFactor::OneMinusConstantColor => vk::BlendFactor::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::SrcAlphaSaturate => vk::BlendFactor::SRC_ALPHA_SATURATE,
    }
}

pub(crate) fn blend_op_to_vk(op: BlendOp) -> vk::BlendOp {
    match op {
        BlendOp::Add => vk::BlendOp::ADD,
        BlendOp::Subtract => vk::BlendOp::SUBTRACT,
        BlendOp::ReverseSubtract => vk::BlendOp::REVERSE_SUBTRACT,
        BlendOp::Min => vk::BlendOp::MIN,
        BlendOp::Max => vk::BlendOp::MAX,
    }
}

pub(crate) fn sample_count_to_vk(count: SampleCount) -> vk::SampleCountFlags {
    match count {
        SampleCount::S1 => vk::SampleCountFlags::TYPE_1,
        SampleCount::S2 => vk::SampleCountFlags::TYPE_2,
        SampleCount::S4 => vk::SampleCountFlags::TYPE_4,
        SampleCount::S8 => vk::SampleCountFlags::TYPE_8,
    }
}

pub(crate) fn color_write_mask_to_vk(mask: ColorWriteMask) -> vk::ColorComponentFlags {
    let mut flags = vk::ColorComponentFlags::empty();
    if mask.contains(ColorWriteMask::R) { flags |= vk::ColorComponentFlags::R; }
    if mask.contains(ColorWriteMask::G) { flags |= vk::ColorComponentFlags::G; }
    if mask.contains(ColorWriteMask::B) { flags |= vk::ColorComponentFlags::B; }
    if mask.contains(ColorWriteMask::A) { flags |= vk::ColorComponentFlags::A; }
    flags
}

pub(crate) fn dynamic_state_to_vk(state: DynamicState) -> vk::DynamicState {
    match state {
        DynamicState::Viewport => vk::DynamicState::VIEWPORT,
        DynamicState::Scissor => vk::DynamicState::SCISSOR,
    }
}

// ===== Shaders and vertex input =====

pub(crate) fn shader_stage_to_vk(stage: ShaderStage) -> vk::ShaderStageFlags {
    match stage {
        ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
        ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
    }
}

pub(crate) fn stage_flags_to_vk(flags: ShaderStageFlags) -> vk::ShaderStageFlags {
    let mut vk_flags = vk::ShaderStageFlags::empty();
    if flags.contains(ShaderStageFlags::VERTEX) { vk_flags |= vk::ShaderStageFlags::VERTEX; }
    if flags.contains(ShaderStageFlags::FRAGMENT) { vk_flags |= vk::ShaderStageFlags::FRAGMENT; }
    vk_flags
}

pub(crate) fn input_rate_to_vk(rate: VertexInputRate) -> vk::VertexInputRate {
    match rate {
        VertexInputRate::Vertex => vk::VertexInputRate::VERTEX,
        VertexInputRate::Instance => vk::VertexInputRate::INSTANCE,
    }
}

pub(crate) fn vertex_format_to_vk(format: VertexFormat) -> vk::Format {
    match format {
        VertexFormat::Undefined => vk::Format::UNDEFINED,

        VertexFormat::R32_SFLOAT => vk::Format::R32_SFLOAT,
        VertexFormat::R32G32_SFLOAT => vk::Format::R32G32_SFLOAT,
        VertexFormat::R32G32B32_SFLOAT => vk::Format::R32G32B32_SFLOAT,
        VertexFormat::R32G32B32A32_SFLOAT => vk::Format::R32G32B32A32_SFLOAT,
        VertexFormat::R16G16_SFLOAT => vk::Format::R16G16_SFLOAT,
        VertexFormat::R16G16B16A16_SFLOAT => vk::Format::R16G16B16A16_SFLOAT,

        VertexFormat::R32_SINT => vk::Format::R32_SINT,
        VertexFormat::R32G32_SINT => vk::Format::R32G32_SINT,
        VertexFormat::R32G32B32A32_SINT => vk::Format::R32G32B32A32_SINT,
        VertexFormat::R32_UINT => vk::Format::R32_UINT,
        VertexFormat::R32G32_UINT => vk::Format::R32G32_UINT,
        VertexFormat::R32G32B32A32_UINT => vk::Format::R32G32B32A32_UINT,
        VertexFormat::R16G16_SINT => vk::Format::R16G16_SINT,
        VertexFormat::R16G16B16A16_SINT => vk::Format::R16G16B16A16_SINT,
        VertexFormat::R8G8B8A8_UINT => vk::Format::R8G8B8A8_UINT,

        VertexFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        VertexFormat::R8G8B8A8_SNORM => vk::Format::R8G8B8A8_SNORM,
        VertexFormat::R16G16_SNORM => vk::Format::R16G16_SNORM,
        VertexFormat::R16G16B16A16_SNORM => vk::Format::R16G16B16A16_SNORM,
    }
}

/// Vertex input descriptions for paired attributes and buffers
///
/// Attribute `i` reads from buffer `i`. Pairs sharing a binding index share
/// one binding description.
///
/// # Errors
///
/// `Error::BackendError` if an attribute names a binding other than its
/// buffer's, or two buffers give one binding different strides or rates.
pub(crate) fn vertex_input_to_vk(
    attributes: &[VertexAttribute],
    bindings: &[VertexBinding],
) -> Result<(Vec<vk::VertexInputBindingDescription>, Vec<vk::VertexInputAttributeDescription>)> {
    let mut binding_descriptions: Vec<vk::VertexInputBindingDescription> = Vec::new();
    let mut attribute_descriptions = Vec::with_capacity(attributes.len());

    for (attribute, binding) in attributes.iter().zip(bindings.iter()) {
        if attribute.binding as u16 != binding.binding {
            return Err(engine_err!(
                "galaxy3d::vulkan",
                "Vertex attribute at location {} reads binding {} but is paired with binding {}",
                attribute.location, attribute.binding, binding.binding
            ));
        }

        let description = vk::VertexInputBindingDescription {
            binding: binding.binding as u32,
            stride: binding.stride,
            input_rate: input_rate_to_vk(binding.input_rate),
        };
        match binding_descriptions.iter().find(|existing| existing.binding == description.binding) {
            None => binding_descriptions.push(description),
            Some(existing) if existing.stride == description.stride
                && existing.input_rate == description.input_rate => {}
            Some(existing) => {
                return Err(engine_err!(
                    "galaxy3d::vulkan",
                    "Vertex binding {} declared with stride {} ({:?}) and stride {} ({:?})",
                    description.binding, existing.stride, existing.input_rate,
                    description.stride, description.input_rate
                ));
            }
        }

        attribute_descriptions.push(vk::VertexInputAttributeDescription {
            location: attribute.location as u32,
            binding: binding.binding as u32,
            format: vertex_format_to_vk(attribute.format),
            offset: attribute.offset,
        });
    }

    Ok((binding_descriptions, attribute_descriptions))
}

// ===== Descriptors =====

pub(crate) fn descriptor_type_to_vk(descriptor_type: DescriptorType) -> vk::DescriptorType {
    match descriptor_type {
        DescriptorType::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
        DescriptorType::CombinedImageSampler => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
        DescriptorType::InputAttachment => vk::DescriptorType::INPUT_ATTACHMENT,
    }
}

pub(crate) fn image_layout_to_vk(layout: ImageLayout) -> vk::ImageLayout {
    match layout {
        ImageLayout::Undefined => vk::ImageLayout::UNDEFINED,
        ImageLayout::General => vk::ImageLayout::GENERAL,
        ImageLayout::ShaderReadOnly => vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        ImageLayout::DepthStencilReadOnly => vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL,
    }
}

/// Device-side descriptor range to `VkDescriptorBufferInfo::range`
pub(crate) fn descriptor_range_to_vk(range: u64) -> vk::DeviceSize {
    if range == NATIVE_WHOLE_SIZE {
        vk::WHOLE_SIZE
    } else {
        range
    }
}

/// Sampler, view and layout of a sampled or input-attachment descriptor
pub(crate) fn image_info_to_vk(info: &DescriptorImageInfo) -> vk::DescriptorImageInfo {
    vk::DescriptorImageInfo {
        sampler: raw_to_vk(info.sampler.as_raw()),
        image_view: raw_to_vk(info.image_view.as_raw()),
        image_layout: image_layout_to_vk(info.image_layout),
    }
}

#[cfg(test)]
#[path = "vulkan_convert_tests.rs"]
mod tests;
