/// State-vector keys: the "requirements" a pipeline, a pipeline layout and a
/// descriptor binding set are looked up by.
///
/// Keys are plain `#[repr(C)]` value types without implicit padding. Equality
/// and hashing work on their raw bytes, so comparing the current requirements
/// against the last bound ones is a single memcmp.

pub mod state;
pub mod layout_key;
pub mod pipeline_key;
pub mod descriptor_key;

pub use state::*;
pub use layout_key::*;
pub use pipeline_key::*;
pub use descriptor_key::*;

/// Uniform buffer binding slots per descriptor bundle
pub const UBUFFER_BINDING_COUNT: usize = 8;
/// Combined image sampler binding slots per descriptor bundle
pub const SAMPLER_BINDING_COUNT: usize = 16;
/// Input attachment binding slots per descriptor bundle
pub const TARGET_BINDING_COUNT: usize = 8;
/// Vertex attribute (and vertex buffer) slots per pipeline
pub const VERTEX_ATTRIBUTE_COUNT: usize = 16;
/// Vertex + fragment
pub const SHADER_MODULE_COUNT: usize = 2;
/// Uniform buffer set, sampler set, input attachment set
pub const DESCRIPTOR_TYPE_COUNT: usize = 3;

/// Implements `PartialEq`, `Eq` and `Hash` over the raw bytes of a `NoUninit` type
macro_rules! impl_bytewise_key {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PartialEq for $ty {
                #[inline]
                fn eq(&self, other: &Self) -> bool {
                    bytemuck::bytes_of(self) == bytemuck::bytes_of(other)
                }
            }

            impl Eq for $ty {}

            impl std::hash::Hash for $ty {
                #[inline]
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    state.write(bytemuck::bytes_of(self));
                }
            }
        )*
    };
}

pub(crate) use impl_bytewise_key;

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
