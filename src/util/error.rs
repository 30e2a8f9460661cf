//! Error types for the tracer.

use thiserror::Error;

/// Main error type for tracer operations.
///
/// Geometry problems (degenerate triangles, parallel rays) are never errors,
/// they are ordinary misses. Importing more faces than the store can hold is
/// clamped, not reported. What remains are configuration mistakes and
/// precondition violations.
#[derive(Error, Debug)]
pub enum Error {
    /// Tree storage is too small for the number of primitives
    #[error("BVH capacity {capacity} too small, {required} slots required")]
    TreeCapacity { required: usize, capacity: usize },

    /// Push onto a full traversal stack slot
    #[error("Traversal stack overflow (capacity: {capacity})")]
    StackOverflow { capacity: usize },

    /// Light sampling requested while no face emits
    #[error("No emissive faces to sample")]
    EmptyLightSet,

    /// Optional per-face attribute was written but is not tracked
    #[error("Face attribute not tracked: {0}")]
    AttributeNotTracked(&'static str),

    /// Flat buffer length is not a whole number of faces
    #[error("Invalid buffer layout: {len} floats is not a multiple of {stride}")]
    InvalidLayout { len: usize, stride: usize },

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type alias for tracer operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::EmptyLightSet;
        assert!(e.to_string().contains("emissive"));

        let e = Error::TreeCapacity { required: 64, capacity: 16 };
        assert!(e.to_string().contains("64"));
        assert!(e.to_string().contains("16"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
