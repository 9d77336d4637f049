//! evtensor-io: HDF5 table storage for per-event tensor collections.
//!
//! Each tensor category lives in one HDF5 group holding four append-only,
//! cross-referenced tables: `extents` (one row per event), `object_extents`
//! and `metadata` (one row per tensor object, index-aligned), and `payload`
//! (all sample values, contiguous). The tables only grow; reads by event
//! index reconstruct independent tensor copies.
//!

mod error;
pub mod event;
pub mod records;
pub mod store;
pub mod table;

pub use error::{Error, Result};
pub use event::{StoreOptions, TensorReader, TensorRecord, TensorWriter};
pub use records::{Extents, IdExtents, MetaRecord, VoxelRecord};
pub use store::TensorStore;
pub use table::AppendTable;
