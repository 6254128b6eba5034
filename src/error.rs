//! Error types for the evergreen scene
//!
//! A single error enum covers both the (small) domain surface, such as
//! palette selection and configuration values, and the environment-level
//! failures that can occur while bringing up the window and GPU.

use thiserror::Error;

/// Errors produced by the evergreen library
#[derive(Debug, Error)]
pub enum EvergreenError {
    /// A palette was selected by an index outside the built-in palette list
    #[error("palette index {index} is out of range (expected 0..{len})")]
    PaletteIndexOutOfRange { index: usize, len: usize },

    /// A command line argument or environment variable had an unusable value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The window could not be created
    #[error("failed to create window: {0}")]
    Window(String),

    /// The rendering surface could not be created for the window
    #[error("failed to create rendering surface: {0}")]
    Surface(String),

    /// No GPU adapter compatible with the surface was found
    #[error("no compatible GPU adapter found")]
    AdapterUnavailable,

    /// The adapter refused to hand out a device
    #[error("failed to acquire GPU device: {0}")]
    Device(String),

    /// The surface ran out of memory while presenting; rendering cannot continue
    #[error("surface out of memory")]
    SurfaceOutOfMemory,

    /// The winit event loop failed to start or exited abnormally
    #[error("event loop error: {0}")]
    EventLoop(String),
}

/// Convenience result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EvergreenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_error_message() {
        let err = EvergreenError::PaletteIndexOutOfRange { index: 9, len: 8 };
        assert_eq!(
            err.to_string(),
            "palette index 9 is out of range (expected 0..8)"
        );
    }
}
