//! evtensor-core: Tensor entity types for per-event detector imaging data.
//!
//! This crate provides the pure in-memory data model: geometry metadata,
//! dense pixel/voxel grids, and sparse voxel lists. Serialization and
//! batch assembly live in `evtensor-io` and `evtensor-batch`.
//!

pub mod error;
pub mod meta;
pub mod tensor;

pub use error::{Error, Result};
pub use meta::{TensorMeta, MAX_DIMS};
pub use tensor::{DenseTensor, SparseTensor, Voxel};
