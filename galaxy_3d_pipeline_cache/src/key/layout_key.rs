/// Pipeline layout key: which shader stages use each sampler binding

use bytemuck::NoUninit;

use crate::device::ShaderStageFlags;
use crate::key::SAMPLER_BINDING_COUNT;

/// Sampler usage bitset
///
/// Bit `b` is set when sampler binding `b` is read by the vertex stage,
/// bit `SAMPLER_BINDING_COUNT + b` when it is read by the fragment stage.
/// Derived from shader usage only, never from the bound resources, so many
/// binding sets share one layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, NoUninit)]
#[repr(transparent)]
pub struct PipelineLayoutKey(pub u64);

impl PipelineLayoutKey {
    /// Layout with no sampler referenced by any stage
    pub const EMPTY: Self = Self(0);

    /// Returns `self` with `binding` marked as used by `stages`
    pub fn with_sampler_stages(self, binding: usize, stages: ShaderStageFlags) -> Self {
        assert!(
            binding < SAMPLER_BINDING_COUNT,
            "sampler binding {} out of range (max {})",
            binding,
            SAMPLER_BINDING_COUNT
        );
        let mut bits = self.0;
        if stages.contains(ShaderStageFlags::VERTEX) {
            bits |= 1u64 << binding;
        }
        if stages.contains(ShaderStageFlags::FRAGMENT) {
            bits |= 1u64 << (SAMPLER_BINDING_COUNT + binding);
        }
        Self(bits)
    }

    /// Shader stages that read sampler `binding`
    pub fn sampler_stages(&self, binding: usize) -> ShaderStageFlags {
        let mut stages = ShaderStageFlags::empty();
        if self.0 & (1u64 << binding) != 0 {
            stages |= ShaderStageFlags::VERTEX;
        }
        if self.0 & (1u64 << (SAMPLER_BINDING_COUNT + binding)) != 0 {
            stages |= ShaderStageFlags::FRAGMENT;
        }
        stages
    }
}
