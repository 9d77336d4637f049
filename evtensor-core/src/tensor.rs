//! Dense and sparse tensor objects.
//!
//! Both variants are pure value types: constructed fresh per event by a
//! producer, appended once, never mutated in storage. Dense grids keep
//! their samples in the producer's native column-major order; layout
//! conversion is the batch filler's job, not theirs.

use crate::meta::TensorMeta;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A dense 2-D grid of samples plus its geometry.
///
/// Sample `(row, col)` lives at `data[col * rows + row]` (column-major).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DenseTensor {
    meta: TensorMeta,
    data: Vec<f32>,
}

impl DenseTensor {
    /// Creates a zero-filled grid sized by the geometry.
    #[must_use]
    pub fn new(meta: TensorMeta) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let len = meta.total_voxels() as usize;
        Self {
            meta,
            data: vec![0.0; len],
        }
    }

    /// Wraps an existing column-major sample vector.
    ///
    /// # Errors
    /// Returns `PayloadSizeMismatch` when the vector length does not equal
    /// the geometry's total voxel count.
    pub fn from_data(meta: TensorMeta, data: Vec<f32>) -> Result<Self> {
        #[allow(clippy::cast_possible_truncation)]
        let expected = meta.total_voxels() as usize;
        if data.len() != expected {
            return Err(Error::PayloadSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { meta, data })
    }

    /// Geometry descriptor.
    #[must_use]
    pub fn meta(&self) -> &TensorMeta {
        &self.meta
    }

    /// Sample at `(row, col)`.
    #[must_use]
    pub fn pixel(&self, row: usize, col: usize) -> f32 {
        #[allow(clippy::cast_possible_truncation)]
        let rows = self.meta.rows() as usize;
        self.data[col * rows + row]
    }

    /// Overwrites the sample at `(row, col)`.
    pub fn set_pixel(&mut self, row: usize, col: usize, value: f32) {
        #[allow(clippy::cast_possible_truncation)]
        let rows = self.meta.rows() as usize;
        self.data[col * rows + row] = value;
    }

    /// Flat column-major sample vector.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the grid holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One sparse sample: a position in a flattened grid and its value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Voxel {
    /// Flattened grid position.
    pub id: u64,
    /// Sample value.
    pub value: f32,
}

/// A sparse voxel list plus its geometry.
///
/// The voxel order is producer-defined and preserved verbatim through
/// storage. Objects are addressed externally by the projection id carried
/// in their geometry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SparseTensor {
    meta: TensorMeta,
    voxels: Vec<Voxel>,
}

impl SparseTensor {
    /// Creates an empty voxel list for the given geometry.
    #[must_use]
    pub fn new(meta: TensorMeta) -> Self {
        Self {
            meta,
            voxels: Vec::new(),
        }
    }

    /// Wraps an existing voxel list.
    #[must_use]
    pub fn from_voxels(meta: TensorMeta, voxels: Vec<Voxel>) -> Self {
        Self { meta, voxels }
    }

    /// Geometry descriptor.
    #[must_use]
    pub fn meta(&self) -> &TensorMeta {
        &self.meta
    }

    /// Channel/projection id carried by the geometry.
    #[must_use]
    pub fn projection_id(&self) -> i32 {
        self.meta.projection_id()
    }

    /// Appends one voxel, keeping producer order.
    pub fn push(&mut self, id: u64, value: f32) {
        self.voxels.push(Voxel { id, value });
    }

    /// Ordered voxel list.
    #[must_use]
    pub fn as_slice(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Number of voxels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Returns true if the list holds no voxels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dense_column_major_layout() {
        let meta = TensorMeta::new_2d(0, 2, 3);
        let dense = DenseTensor::from_data(meta, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        // data[col * rows + row]
        assert_relative_eq!(dense.pixel(0, 0), 0.0);
        assert_relative_eq!(dense.pixel(1, 0), 1.0);
        assert_relative_eq!(dense.pixel(0, 1), 2.0);
        assert_relative_eq!(dense.pixel(1, 2), 5.0);
    }

    #[test]
    fn test_dense_set_pixel() {
        let meta = TensorMeta::new_2d(0, 2, 2);
        let mut dense = DenseTensor::new(meta);
        dense.set_pixel(1, 1, 7.5);
        assert_relative_eq!(dense.pixel(1, 1), 7.5);
        assert_relative_eq!(dense.as_slice()[3], 7.5);
    }

    #[test]
    fn test_dense_rejects_wrong_payload_size() {
        let meta = TensorMeta::new_2d(0, 2, 3);
        let err = DenseTensor::from_data(meta, vec![0.0; 5]).unwrap_err();
        assert!(matches!(
            err,
            Error::PayloadSizeMismatch {
                expected: 6,
                actual: 5
            }
        ));
    }

    #[test]
    fn test_sparse_preserves_order() {
        let meta = TensorMeta::new_2d(2, 4, 4);
        let mut sparse = SparseTensor::new(meta);
        sparse.push(9, 1.0);
        sparse.push(3, 2.0);
        sparse.push(3, 3.0);
        assert_eq!(sparse.len(), 3);
        assert_eq!(sparse.projection_id(), 2);
        let ids: Vec<u64> = sparse.as_slice().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![9, 3, 3]);
    }
}
