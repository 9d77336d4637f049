//! Batch assembly error types.

use thiserror::Error;

/// Result type for batch assembly operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal batch assembly errors; callers are expected to stop the run.
#[derive(Error, Debug)]
pub enum Error {
    /// TensorType value outside {dense, sparse}.
    #[error("tensor type can only be dense or sparse, got {0:?}")]
    UnsupportedTensorType(String),

    /// Empty input tensor collection with AllowEmpty disabled.
    #[error("could not locate non-empty tensor data for producer {0:?}")]
    MissingData(String),

    /// Requested channel index exceeds the available object count.
    #[error("requested max channel {max_channel} exceeds available channels {available}")]
    ChannelOutOfRange { max_channel: usize, available: usize },

    /// Rows/cols changed relative to the established shape.
    #[error("tensor shape changed: (row,col) {expected:?} => {found:?}")]
    ShapeDrift {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Buffer shape change beyond the leading dimension.
    #[error("batch dimensions changed: {expected:?} => {found:?}")]
    DimMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Dense path invoked for a dimensionality other than 2.
    #[error("dense tensor filling only available in 2D, got {0}D")]
    UnsupportedDimension(u32),

    /// Voxel id outside the event's flat record.
    #[error("voxel id {id} out of range for entry of {len} elements")]
    VoxelOutOfRange { id: u64, len: usize },

    /// Entry written past the configured batch size.
    #[error("batch buffer full: {0} entries already written")]
    BatchFull(usize),

    /// Entry record length does not match the buffer shape.
    #[error("entry size mismatch: expected {expected}, got {actual}")]
    EntrySizeMismatch { expected: usize, actual: usize },

    /// Channels option present but empty.
    #[error("configured channel list is empty")]
    EmptyChannels,

    /// Filler name not present in the registry.
    #[error("unknown filler type {0:?}")]
    UnknownFiller(String),

    /// Storage error while materializing an event.
    #[error("storage error: {0}")]
    Store(#[from] evtensor_io::Error),
}
