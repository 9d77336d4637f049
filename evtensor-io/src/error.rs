//! I/O error types.

use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Storage error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying HDF5 library error.
    #[error("hdf5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// `initialize` called on a group that already has members.
    #[error("attempt to initialize non-empty group {0}")]
    AlreadyInitialized(String),

    /// Row or event index past the end of a table.
    #[error("index {index} out of range for table of length {len}")]
    IndexOutOfRange { index: u64, len: u64 },

    /// Stored records that cannot be reconstructed.
    #[error("invalid stored format: {0}")]
    InvalidFormat(String),

    /// Core entity error.
    #[error("core error: {0}")]
    Core(#[from] evtensor_core::Error),
}
