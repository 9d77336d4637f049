//! Error types for evtensor-core.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for tensor construction.
#[derive(Error, Debug)]
pub enum Error {
    /// Payload length does not match the geometry.
    #[error("payload size mismatch: expected {expected} samples, got {actual}")]
    PayloadSizeMismatch { expected: usize, actual: usize },

    /// Dimensionality outside the supported 2..=3 range.
    #[error("unsupported tensor dimensionality: {0}")]
    UnsupportedDimension(u32),
}
