/// Device trait and the backend-agnostic creation descriptors it consumes
///
/// The caches never call a graphics API directly. Every native creation,
/// destruction and command-buffer call goes through `Device`; a backend
/// (e.g. `galaxy_3d_pipeline_cache_vulkan::VulkanDevice`) translates the
/// descriptors below into native structures.

use bitflags::bitflags;

use crate::device::{
    BufferHandle, CommandBufferHandle, DescriptorPoolHandle, DescriptorSetHandle,
    DescriptorSetLayoutHandle, GpuObject, ImageHandle, ImageViewHandle, PipelineHandle,
    PipelineLayoutHandle, RenderPassHandle, SamplerHandle, ShaderModuleHandle,
};
use crate::error::Result;
use crate::key::{
    BlendFactor, BlendOp, ColorWriteMask, CompareOp, CullMode, DescriptorImageInfo, FrontFace,
    PrimitiveTopology, SampleCount, VertexAttribute, VertexBinding, DESCRIPTOR_TYPE_COUNT,
};

/// One descriptor set per descriptor type: uniform buffers, samplers, input attachments
pub type DescriptorBundle = [DescriptorSetHandle; DESCRIPTOR_TYPE_COUNT];

/// Descriptor set layouts of one pipeline layout, same order as `DescriptorBundle`
pub type DescriptorSetLayouts = [DescriptorSetLayoutHandle; DESCRIPTOR_TYPE_COUNT];

bitflags! {
    /// Shader stage visibility flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 0x01;
        const FRAGMENT = 0x02;
        const VERTEX_FRAGMENT = Self::VERTEX.bits() | Self::FRAGMENT.bits();
    }
}

/// Shader stage of a pipeline stage entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

// ============================================================================
// Descriptor layouts, pools and writes
// ============================================================================

/// Type of resource bound at a descriptor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    UniformBuffer,
    CombinedImageSampler,
    InputAttachment,
}

/// One binding of a descriptor set layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorSetLayoutBinding {
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    pub count: u32,
    /// May be empty: the slot exists but no stage reads it
    pub stage_flags: ShaderStageFlags,
}

/// Descriptor pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorPoolDesc {
    pub max_sets: u32,
    pub uniform_buffer_count: u32,
    pub combined_image_sampler_count: u32,
    pub input_attachment_count: u32,
    /// Sets may be returned to the pool one by one
    pub free_individual_sets: bool,
}

/// Buffer range written into a uniform buffer descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorBufferInfo {
    pub buffer: BufferHandle,
    pub offset: u64,
    /// `NATIVE_WHOLE_SIZE` for the rest of the buffer
    pub range: u64,
}

/// Resource written into one descriptor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorResource {
    UniformBuffer(DescriptorBufferInfo),
    CombinedImageSampler(DescriptorImageInfo),
    InputAttachment(DescriptorImageInfo),
}

impl DescriptorResource {
    pub fn descriptor_type(&self) -> DescriptorType {
        match self {
            DescriptorResource::UniformBuffer(_) => DescriptorType::UniformBuffer,
            DescriptorResource::CombinedImageSampler(_) => DescriptorType::CombinedImageSampler,
            DescriptorResource::InputAttachment(_) => DescriptorType::InputAttachment,
        }
    }
}

/// One descriptor write, batched into `Device::update_descriptor_sets`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorWrite {
    pub dst_set: DescriptorSetHandle,
    pub dst_binding: u32,
    pub resource: DescriptorResource,
}

/// Placeholder resources written into every empty descriptor slot
///
/// Created once per device attach and destroyed once on cache teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DummyResources {
    pub buffer: BufferHandle,
    pub buffer_size: u64,
    pub image: ImageHandle,
    pub image_view: ImageViewHandle,
    pub sampler: SamplerHandle,
}

// ============================================================================
// Graphics pipeline descriptor
// ============================================================================

/// Shader stage entry of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderStageDesc {
    pub stage: ShaderStage,
    pub module: ShaderModuleHandle,
}

/// Depth bias parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthBias {
    pub constant_factor: f32,
    pub slope_factor: f32,
}

/// Rasterization fixed-function state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizationDesc {
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    /// None = disabled
    pub depth_bias: Option<DepthBias>,
}

/// Multisampling state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultisampleDesc {
    pub sample_count: SampleCount,
    pub alpha_to_coverage: bool,
}

/// Depth testing state (stencil is never enabled by the cache)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilDesc {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_op: CompareOp,
}

/// Blend state of one color target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBlendAttachment {
    pub blend_enable: bool,
    pub src_color_factor: BlendFactor,
    pub dst_color_factor: BlendFactor,
    pub color_blend_op: BlendOp,
    pub src_alpha_factor: BlendFactor,
    pub dst_alpha_factor: BlendFactor,
    pub alpha_blend_op: BlendOp,
    pub color_write_mask: ColorWriteMask,
}

/// State left dynamic in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicState {
    Viewport,
    Scissor,
}

/// Expanded graphics pipeline creation descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsPipelineDesc {
    /// Vertex stage, plus the fragment stage unless the pass is depth-only
    pub stages: Vec<ShaderStageDesc>,
    /// Active attributes only
    pub vertex_attributes: Vec<VertexAttribute>,
    /// Vertex buffers paired with the active attributes
    pub vertex_bindings: Vec<VertexBinding>,
    pub topology: PrimitiveTopology,
    pub rasterization: RasterizationDesc,
    pub multisample: MultisampleDesc,
    pub depth_stencil: DepthStencilDesc,
    /// One entry per color target (empty for depth-only passes)
    pub color_blend_attachments: Vec<ColorBlendAttachment>,
    pub dynamic_states: Vec<DynamicState>,
    pub layout: PipelineLayoutHandle,
    pub render_pass: RenderPassHandle,
    pub subpass: u32,
}

/// Scissor rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

// ============================================================================
// Device trait
// ============================================================================

/// Native graphics API contract consumed by the pipeline cache
///
/// All calls are synchronous. The cache calls a `Device` only from the thread
/// that records command buffers for it.
pub trait Device {
    /// Create a graphics pipeline
    ///
    /// # Errors
    ///
    /// Returns an error if the native pipeline creation fails.
    fn create_graphics_pipeline(&mut self, desc: &GraphicsPipelineDesc) -> Result<PipelineHandle>;

    /// Create a descriptor set layout
    fn create_descriptor_set_layout(
        &mut self,
        bindings: &[DescriptorSetLayoutBinding],
    ) -> Result<DescriptorSetLayoutHandle>;

    /// Create a pipeline layout over the three descriptor set layouts
    fn create_pipeline_layout(&mut self, set_layouts: &DescriptorSetLayouts) -> Result<PipelineLayoutHandle>;

    /// Create a descriptor pool
    fn create_descriptor_pool(&mut self, desc: &DescriptorPoolDesc) -> Result<DescriptorPoolHandle>;

    /// Allocate one descriptor set per layout from `pool`
    ///
    /// # Errors
    ///
    /// `Error::OutOfPoolMemory` when the pool is exhausted or fragmented.
    fn allocate_descriptor_sets(
        &mut self,
        pool: DescriptorPoolHandle,
        set_layouts: &DescriptorSetLayouts,
    ) -> Result<DescriptorBundle>;

    /// Return descriptor sets to `pool`
    fn free_descriptor_sets(&mut self, pool: DescriptorPoolHandle, sets: &[DescriptorSetHandle]) -> Result<()>;

    /// Apply a batch of descriptor writes
    fn update_descriptor_sets(&mut self, writes: &[DescriptorWrite]);

    /// Create the placeholder buffer, image, view and sampler
    fn create_dummy_resources(&mut self) -> Result<DummyResources>;

    /// Destroy the placeholder resources and release their memory
    fn destroy_dummy_resources(&mut self, dummy: DummyResources);

    /// Destroy a cache-owned native object
    fn destroy(&mut self, object: GpuObject);

    /// Block until the device has finished all submitted work
    fn wait_idle(&mut self) -> Result<()>;

    /// Record a pipeline bind
    fn cmd_bind_pipeline(&mut self, cmd: CommandBufferHandle, pipeline: PipelineHandle);

    /// Record a descriptor bundle bind (sets 0..3)
    fn cmd_bind_descriptor_sets(
        &mut self,
        cmd: CommandBufferHandle,
        layout: PipelineLayoutHandle,
        sets: &DescriptorBundle,
    );

    /// Record a dynamic scissor update
    fn cmd_set_scissor(&mut self, cmd: CommandBufferHandle, scissor: Rect2D);
}
