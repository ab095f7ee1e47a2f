//! Error types for the Galaxy3D pipeline cache
//!
//! Native failures (pipeline creation, layout creation, descriptor allocation,
//! pool growth) are reported as typed errors. The caches never insert a
//! partial entry when one of these is returned, so the caller may retry.

use std::fmt;

/// Result type for pipeline cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline cache errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (Vulkan, etc.)
    BackendError(String),

    /// Out of host or device memory
    OutOfMemory,

    /// The descriptor pool could not satisfy an allocation
    OutOfPoolMemory,

    /// Invalid resource (handle, descriptor, layout)
    InvalidResource(String),

    /// Initialization failed (device attach, dummy resources, first pool)
    InitializationFailed(String),

    /// An operation needing a device was called before `set_device`
    NotInitialized,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::OutOfPoolMemory => write!(f, "Out of descriptor pool memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::NotInitialized => write!(f, "Pipeline cache has no device (call set_device first)"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
