//! Filler configuration surface.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Source layout of the producer's tensor stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TensorType {
    /// Dense per-channel grids.
    Dense,
    /// Sparse voxel lists addressed by projection id.
    Sparse,
}

impl TensorType {
    /// Parses the `TensorType` configuration value.
    ///
    /// # Errors
    /// Any value outside `"dense"`/`"sparse"` is a fatal configuration
    /// error.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "dense" => Ok(Self::Dense),
            "sparse" => Ok(Self::Sparse),
            other => Err(Error::UnsupportedTensorType(other.to_string())),
        }
    }
}

/// Fixed dimensionality of a filler instance. Exactly two variants exist;
/// no further extension is anticipated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Dimensionality {
    Two,
    Three,
}

impl Dimensionality {
    /// Tensor rank (2 or 3).
    #[must_use]
    pub fn rank(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

/// Batch filler configuration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FillerConfig {
    /// Name of the source event-tensor stream.
    pub tensor_producer: String,
    /// Source layout; defaults to sparse.
    pub tensor_type: TensorType,
    /// Ordered output channel ids; `None` means natural order `0..N-1`
    /// inferred from the first event's object count.
    pub channels: Option<Vec<usize>>,
    /// Baseline value for unset sparse positions.
    pub empty_voxel_value: f32,
    /// Permit events with an empty tensor collection.
    pub allow_empty: bool,
}

impl FillerConfig {
    /// Creates a configuration with defaults for the given producer.
    #[must_use]
    pub fn new(tensor_producer: impl Into<String>) -> Self {
        Self {
            tensor_producer: tensor_producer.into(),
            tensor_type: TensorType::Sparse,
            channels: None,
            empty_voxel_value: 0.0,
            allow_empty: false,
        }
    }

    /// Sets the source layout.
    #[must_use]
    pub fn with_tensor_type(mut self, tensor_type: TensorType) -> Self {
        self.tensor_type = tensor_type;
        self
    }

    /// Sets an explicit channel list.
    #[must_use]
    pub fn with_channels(mut self, channels: Vec<usize>) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Sets the sparse baseline fill value.
    #[must_use]
    pub fn with_empty_voxel_value(mut self, value: f32) -> Self {
        self.empty_voxel_value = value;
        self
    }

    /// Permits empty input collections.
    #[must_use]
    pub fn with_allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }
}
