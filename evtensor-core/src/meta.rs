//! Tensor geometry metadata.
//!
//! A [`TensorMeta`] is the fixed-size geometry descriptor stored alongside
//! every tensor object: the per-axis voxel counts, physical extents, and
//! origin, plus the caller-assigned projection id that distinguishes
//! logical sub-tensors (e.g. detector planes) within an event.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum dimensionality carried by a geometry descriptor.
pub const MAX_DIMS: usize = 3;

/// Fixed-size geometry descriptor for one tensor object.
///
/// Axis 0 counts rows, axis 1 counts columns. Axes beyond `n_dims` hold
/// zeros so the record serializes with a fixed layout.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TensorMeta {
    projection_id: i32,
    n_dims: u32,
    number_of_voxels: [u64; MAX_DIMS],
    image_size: [f64; MAX_DIMS],
    origin: [f64; MAX_DIMS],
}

impl TensorMeta {
    /// Creates a 2-D descriptor with unit physical extents at the origin.
    #[must_use]
    pub fn new_2d(projection_id: i32, rows: u64, cols: u64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let image_size = [rows as f64, cols as f64, 0.0];
        Self {
            projection_id,
            n_dims: 2,
            number_of_voxels: [rows, cols, 0],
            image_size,
            origin: [0.0; MAX_DIMS],
        }
    }

    /// Creates a 3-D descriptor with unit physical extents at the origin.
    #[must_use]
    pub fn new_3d(projection_id: i32, nx: u64, ny: u64, nz: u64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let image_size = [nx as f64, ny as f64, nz as f64];
        Self {
            projection_id,
            n_dims: 3,
            number_of_voxels: [nx, ny, nz],
            image_size,
            origin: [0.0; MAX_DIMS],
        }
    }

    /// Reconstructs a descriptor from raw stored fields.
    ///
    /// # Errors
    /// Returns `UnsupportedDimension` when `n_dims` is outside 2..=3.
    pub fn from_parts(
        projection_id: i32,
        n_dims: u32,
        number_of_voxels: [u64; MAX_DIMS],
        image_size: [f64; MAX_DIMS],
        origin: [f64; MAX_DIMS],
    ) -> Result<Self> {
        if !(2..=3).contains(&n_dims) {
            return Err(Error::UnsupportedDimension(n_dims));
        }
        Ok(Self {
            projection_id,
            n_dims,
            number_of_voxels,
            image_size,
            origin,
        })
    }

    /// Sets the physical extent and origin along one axis.
    pub fn set_axis(&mut self, axis: usize, image_size: f64, origin: f64) {
        self.image_size[axis] = image_size;
        self.origin[axis] = origin;
    }

    /// Caller-assigned channel/projection id.
    #[must_use]
    pub fn projection_id(&self) -> i32 {
        self.projection_id
    }

    /// Number of dimensions (2 or 3).
    #[must_use]
    pub fn n_dims(&self) -> u32 {
        self.n_dims
    }

    /// Voxel count along one axis.
    #[must_use]
    pub fn number_of_voxels(&self, axis: usize) -> u64 {
        self.number_of_voxels[axis]
    }

    /// Row count (axis 0).
    #[must_use]
    pub fn rows(&self) -> u64 {
        self.number_of_voxels[0]
    }

    /// Column count (axis 1).
    #[must_use]
    pub fn cols(&self) -> u64 {
        self.number_of_voxels[1]
    }

    /// Total voxel count over the active axes.
    #[must_use]
    pub fn total_voxels(&self) -> u64 {
        self.number_of_voxels
            .iter()
            .take(self.n_dims as usize)
            .product()
    }

    /// Physical extent along one axis.
    #[must_use]
    pub fn image_size(&self, axis: usize) -> f64 {
        self.image_size[axis]
    }

    /// Origin coordinate along one axis.
    #[must_use]
    pub fn origin(&self, axis: usize) -> f64 {
        self.origin[axis]
    }

    /// Raw per-axis voxel counts, including inactive axes.
    #[must_use]
    pub fn voxel_counts(&self) -> [u64; MAX_DIMS] {
        self.number_of_voxels
    }

    /// Raw per-axis physical extents, including inactive axes.
    #[must_use]
    pub fn image_sizes(&self) -> [f64; MAX_DIMS] {
        self.image_size
    }

    /// Raw per-axis origins, including inactive axes.
    #[must_use]
    pub fn origins(&self) -> [f64; MAX_DIMS] {
        self.origin
    }
}
