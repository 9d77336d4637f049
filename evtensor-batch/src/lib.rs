//! evtensor-batch: Assembles per-event tensors into fixed-shape batches.
//!
//! A [`TensorFiller`] consumes one event's dense or sparse tensor
//! collection from an [`EventSource`] and writes a flat per-event record
//! into its own reusable [`BatchData`] buffer, handling dense/sparse
//! layout conversion, channel remapping, and shape-drift detection.
//!

pub mod batch;
pub mod config;
mod error;
pub mod filler;
pub mod registry;
pub mod source;

pub use batch::BatchData;
pub use config::{Dimensionality, FillerConfig, TensorType};
pub use error::{Error, Result};
pub use filler::TensorFiller;
pub use registry::{FillerFactory, FillerRegistry};
pub use source::{EventSource, MemorySource, StoreSource};
