//! On-disk record layouts for the four category tables.
//!
//! These compound types define the storage contract: `Extents` rows are
//! written exactly once per event at the event's own index, `IdExtents`
//! and `MetaRecord` rows are index-aligned one per tensor object, and the
//! payload table holds either raw `f32` samples (dense) or `VoxelRecord`
//! pairs (sparse).

use evtensor_core::meta::{TensorMeta, MAX_DIMS};
use hdf5::H5Type;

use crate::{Error, Result};

/// One event's slice of the object tables: `[first, first + n)`.
#[derive(H5Type, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct Extents {
    /// First object row belonging to the event.
    pub first: u64,
    /// Number of object rows.
    pub n: u64,
}

/// One tensor object's id and payload slice.
#[derive(H5Type, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct IdExtents {
    /// Positional index (dense) or projection id (sparse).
    pub id: i32,
    /// First payload element belonging to the object.
    pub first: u64,
    /// Number of payload elements.
    pub n: u64,
}

/// Flat geometry descriptor, index-aligned with [`IdExtents`].
#[derive(H5Type, Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct MetaRecord {
    pub projection_id: i32,
    pub n_dims: u32,
    pub number_of_voxels: [u64; MAX_DIMS],
    pub image_size: [f64; MAX_DIMS],
    pub origin: [f64; MAX_DIMS],
}

/// Sparse payload sample.
#[derive(H5Type, Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct VoxelRecord {
    pub id: u64,
    pub value: f32,
}

impl From<&TensorMeta> for MetaRecord {
    fn from(meta: &TensorMeta) -> Self {
        Self {
            projection_id: meta.projection_id(),
            n_dims: meta.n_dims(),
            number_of_voxels: meta.voxel_counts(),
            image_size: meta.image_sizes(),
            origin: meta.origins(),
        }
    }
}

impl TryFrom<MetaRecord> for TensorMeta {
    type Error = Error;

    fn try_from(record: MetaRecord) -> Result<Self> {
        Ok(TensorMeta::from_parts(
            record.projection_id,
            record.n_dims,
            record.number_of_voxels,
            record.image_size,
            record.origin,
        )?)
    }
}
