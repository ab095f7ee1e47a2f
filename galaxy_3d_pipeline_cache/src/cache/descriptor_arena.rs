/// Per-layout stack of reclaimed descriptor bundles
///
/// One stack per descriptor set kind (uniform buffers, samplers, input
/// attachments). Bundles are pushed and popped as a whole, so the three
/// stacks always have the same depth.

use crate::device::{DescriptorBundle, DescriptorSetHandle};

#[derive(Debug, Default)]
pub struct DescriptorArena {
    uniform_buffer_sets: Vec<DescriptorSetHandle>,
    sampler_sets: Vec<DescriptorSetHandle>,
    input_attachment_sets: Vec<DescriptorSetHandle>,
}

impl DescriptorArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of whole bundles waiting for reuse
    pub fn len(&self) -> usize {
        self.uniform_buffer_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uniform_buffer_sets.is_empty()
    }

    /// Take ownership of a reclaimed bundle
    pub fn push(&mut self, bundle: DescriptorBundle) {
        self.uniform_buffer_sets.push(bundle[0]);
        self.sampler_sets.push(bundle[1]);
        self.input_attachment_sets.push(bundle[2]);
    }

    /// Hand the most recently reclaimed bundle back out
    pub fn pop(&mut self) -> Option<DescriptorBundle> {
        let uniform_buffers = self.uniform_buffer_sets.pop()?;
        let samplers = self.sampler_sets.pop()?;
        let input_attachments = self.input_attachment_sets.pop()?;
        Some([uniform_buffers, samplers, input_attachments])
    }

    /// Forget every handle (their pool is being retired)
    pub fn clear(&mut self) -> usize {
        let count = self.len();
        self.uniform_buffer_sets.clear();
        self.sampler_sets.clear();
        self.input_attachment_sets.clear();
        count
    }

    /// Empty the arena, returning every set handle so they can be freed
    pub fn drain_sets(&mut self) -> Vec<DescriptorSetHandle> {
        let mut sets = Vec::with_capacity(self.len() * 3);
        sets.append(&mut self.uniform_buffer_sets);
        sets.append(&mut self.sampler_sets);
        sets.append(&mut self.input_attachment_sets);
        sets
    }
}

#[cfg(test)]
#[path = "descriptor_arena_tests.rs"]
mod tests;
