/// Pipeline key: everything a graphics pipeline object is created from

use bytemuck::NoUninit;

use crate::device::{RenderPassHandle, ShaderModuleHandle};
use crate::key::{
    PipelineLayoutKey, PrimitiveTopology, RasterState, VertexFormat, VertexInputRate,
    SHADER_MODULE_COUNT, VERTEX_ATTRIBUTE_COUNT,
};

/// Vertex attribute description (8 bytes, no padding)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(C)]
pub struct VertexAttribute {
    /// Attribute location in shader
    pub location: u8,
    /// Vertex buffer binding index
    pub binding: u8,
    /// `Undefined` marks the slot as unused
    pub format: VertexFormat,
    /// Offset in bytes from the start of the vertex
    pub offset: u32,
}

impl VertexAttribute {
    pub fn is_active(&self) -> bool {
        self.format != VertexFormat::Undefined
    }
}

/// Vertex buffer binding description (8 bytes, no padding)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(C)]
pub struct VertexBinding {
    pub binding: u16,
    pub input_rate: VertexInputRate,
    /// Stride in bytes between consecutive elements
    pub stride: u32,
}

/// Full pipeline requirements
///
/// Rebuilt in place by the `bind_*` calls, compared against the last bound
/// key on every `bind_pipeline`, and used as the map key of the cached
/// pipeline. Vertex attribute `i` is paired with vertex buffer `i`.
///
/// Layout (320 bytes, explicit tail padding):
///
/// | field              | size | offset |
/// |--------------------|------|--------|
/// | shaders            | 16   | 0      |
/// | render_pass        | 8    | 16     |
/// | layout             | 8    | 24     |
/// | vertex_attributes  | 128  | 32     |
/// | vertex_buffers     | 128  | 160    |
/// | raster_state       | 24   | 288    |
/// | subpass_index      | 2    | 312    |
/// | topology           | 1    | 314    |
/// | padding            | 5    | 315    |
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct PipelineKey {
    /// Vertex and fragment modules; a null fragment module means depth-only
    pub shaders: [ShaderModuleHandle; SHADER_MODULE_COUNT],
    pub render_pass: RenderPassHandle,
    pub layout: PipelineLayoutKey,
    pub vertex_attributes: [VertexAttribute; VERTEX_ATTRIBUTE_COUNT],
    pub vertex_buffers: [VertexBinding; VERTEX_ATTRIBUTE_COUNT],
    pub raster_state: RasterState,
    pub subpass_index: u16,
    pub topology: PrimitiveTopology,
    padding: [u8; 5],
}

impl PipelineKey {
    pub fn vertex_shader(&self) -> ShaderModuleHandle {
        self.shaders[0]
    }

    pub fn fragment_shader(&self) -> ShaderModuleHandle {
        self.shaders[1]
    }

    /// Number of active vertex attributes
    pub fn active_attribute_count(&self) -> usize {
        self.vertex_attributes.iter().filter(|a| a.is_active()).count()
    }
}

// bytemuck only derives `NoUninit` for arrays of `Pod` elements. Every field
// here is `NoUninit` and the layout has no implicit padding.
const _: () = assert!(std::mem::size_of::<PipelineKey>() == 320);
const _: () = assert!(
    std::mem::size_of::<[ShaderModuleHandle; SHADER_MODULE_COUNT]>()
        + std::mem::size_of::<RenderPassHandle>()
        + std::mem::size_of::<PipelineLayoutKey>()
        + std::mem::size_of::<[VertexAttribute; VERTEX_ATTRIBUTE_COUNT]>()
        + std::mem::size_of::<[VertexBinding; VERTEX_ATTRIBUTE_COUNT]>()
        + std::mem::size_of::<RasterState>()
        + std::mem::size_of::<u16>()
        + std::mem::size_of::<PrimitiveTopology>()
        + 5
        == std::mem::size_of::<PipelineKey>()
);
unsafe impl NoUninit for PipelineKey {}

super::impl_bytewise_key!(PipelineKey);
