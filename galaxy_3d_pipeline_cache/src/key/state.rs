/// Fixed-function state enums and the packed raster state
///
/// Every type here is `#[repr(uN)]` / `#[repr(C)]` and `NoUninit`, so it can be
/// embedded in a cache key that is compared byte for byte.

use bitflags::bitflags;
use bytemuck::NoUninit;

/// Primitive topology
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(u8)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
}

/// Vertex input rate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(u16)]
pub enum VertexInputRate {
    /// Data is per-vertex
    #[default]
    Vertex,
    /// Data is per-instance
    Instance,
}

/// Vertex attribute format
///
/// `Undefined` marks an unused attribute slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum VertexFormat {
    #[default]
    Undefined,

    // Float formats
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,
    R16G16_SFLOAT,
    R16G16B16A16_SFLOAT,

    // Integer formats
    R32_SINT,
    R32G32_SINT,
    R32G32B32A32_SINT,
    R32_UINT,
    R32G32_UINT,
    R32G32B32A32_UINT,
    R16G16_SINT,
    R16G16B16A16_SINT,
    R8G8B8A8_UINT,

    // Normalized formats
    R8G8B8A8_UNORM,
    R8G8B8A8_SNORM,
    R16G16_SNORM,
    R16G16B16A16_SNORM,
}

impl VertexFormat {
    /// Returns size in bytes for this format (0 for `Undefined`)
    pub fn size_bytes(&self) -> u32 {
        match self {
            VertexFormat::Undefined => 0,
            VertexFormat::R32_SFLOAT | VertexFormat::R32_SINT | VertexFormat::R32_UINT => 4,
            VertexFormat::R16G16_SFLOAT | VertexFormat::R16G16_SINT | VertexFormat::R16G16_SNORM => 4,
            VertexFormat::R8G8B8A8_UINT | VertexFormat::R8G8B8A8_UNORM | VertexFormat::R8G8B8A8_SNORM => 4,
            VertexFormat::R32G32_SFLOAT | VertexFormat::R32G32_SINT | VertexFormat::R32G32_UINT => 8,
            VertexFormat::R16G16B16A16_SFLOAT
            | VertexFormat::R16G16B16A16_SINT
            | VertexFormat::R16G16B16A16_SNORM => 8,
            VertexFormat::R32G32B32_SFLOAT => 12,
            VertexFormat::R32G32B32A32_SFLOAT
            | VertexFormat::R32G32B32A32_SINT
            | VertexFormat::R32G32B32A32_UINT => 16,
        }
    }
}

/// Image layout recorded alongside an image view in a descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(u32)]
pub enum ImageLayout {
    #[default]
    Undefined,
    General,
    ShaderReadOnly,
    DepthStencilReadOnly,
}

// ===== RASTERIZATION ENUMS =====

/// Face culling mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(u8)]
pub enum CullMode {
    None,
    Front,
    #[default]
    Back,
    FrontAndBack,
}

/// Front face winding order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(u8)]
pub enum FrontFace {
    #[default]
    CounterClockwise,
    Clockwise,
}

/// Comparison operator for the depth test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(u8)]
pub enum CompareOp {
    Never,
    #[default]
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

// ===== COLOR BLEND ENUMS =====

/// Blend factor for color blending equations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, NoUninit)]
#[repr(u8)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    SrcAlphaSaturate,
}

/// Blend operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(u8)]
pub enum BlendOp {
    /// result = src * srcFactor + dst * dstFactor
    #[default]
    Add,
    /// result = src * srcFactor - dst * dstFactor
    Subtract,
    /// result = dst * dstFactor - src * srcFactor
    ReverseSubtract,
    /// result = min(src, dst)
    Min,
    /// result = max(src, dst)
    Max,
}

/// Multisample count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(u8)]
pub enum SampleCount {
    #[default]
    S1 = 1,
    S2 = 2,
    S4 = 4,
    S8 = 8,
}

bitflags! {
    /// Color channels written by a color target
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWriteMask: u8 {
        const R = 0x1;
        const G = 0x2;
        const B = 0x4;
        const A = 0x8;
        const ALL = Self::R.bits() | Self::G.bits() | Self::B.bits() | Self::A.bits();
    }
}

// ===== RASTER STATE =====

/// Packed rasterization, blend, multisample and depth state
///
/// 16 one-byte fields followed by the two depth-bias floats: no padding, so
/// two raster states are equal exactly when their bytes are.
#[derive(Debug, Clone, Copy, NoUninit)]
#[repr(C)]
pub struct RasterState {
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub depth_bias_enable: bool,
    pub blend_enable: bool,
    pub depth_write_enable: bool,
    pub alpha_to_coverage_enable: bool,
    pub src_color_blend_factor: BlendFactor,
    pub dst_color_blend_factor: BlendFactor,
    pub src_alpha_blend_factor: BlendFactor,
    pub dst_alpha_blend_factor: BlendFactor,
    pub color_blend_op: BlendOp,
    pub alpha_blend_op: BlendOp,
    /// `ColorWriteMask` bits
    pub color_write_mask: u8,
    pub sample_count: SampleCount,
    /// Number of color attachments in the subpass (0 for depth-only passes)
    pub color_target_count: u8,
    pub depth_compare_op: CompareOp,
    pub depth_bias_constant_factor: f32,
    pub depth_bias_slope_factor: f32,
}

impl RasterState {
    pub fn color_write_mask(&self) -> ColorWriteMask {
        ColorWriteMask::from_bits_truncate(self.color_write_mask)
    }
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
            depth_bias_enable: false,
            blend_enable: false,
            depth_write_enable: true,
            alpha_to_coverage_enable: false,
            src_color_blend_factor: BlendFactor::One,
            dst_color_blend_factor: BlendFactor::Zero,
            src_alpha_blend_factor: BlendFactor::One,
            dst_alpha_blend_factor: BlendFactor::Zero,
            color_blend_op: BlendOp::Add,
            alpha_blend_op: BlendOp::Add,
            color_write_mask: ColorWriteMask::ALL.bits(),
            sample_count: SampleCount::S1,
            color_target_count: 1,
            depth_compare_op: CompareOp::Less,
            depth_bias_constant_factor: 0.0,
            depth_bias_slope_factor: 0.0,
        }
    }
}

super::impl_bytewise_key!(RasterState);
