/// Device module - the narrow contract between the caches and a graphics API

pub mod handles;
pub mod device;

pub use handles::*;
pub use device::*;

// Mock device for tests (no GPU required)
#[cfg(test)]
pub mod mock_device;
