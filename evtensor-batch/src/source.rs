//! Event tensor sources feeding the filler.

use evtensor_core::{DenseTensor, SparseTensor};
use evtensor_io::TensorReader;
use std::collections::HashMap;

use crate::Result;

/// Named-product fetch for the current event's tensor collections.
///
/// An unknown producer yields an empty collection; whether that is fatal
/// is the filler's `allow_empty` decision.
pub trait EventSource {
    /// Dense tensor collection for the named producer.
    ///
    /// # Errors
    /// Returns an error when the source fails to materialize the event.
    fn dense_tensors(&self, producer: &str) -> Result<&[DenseTensor]>;

    /// Sparse tensor collection for the named producer.
    ///
    /// # Errors
    /// Returns an error when the source fails to materialize the event.
    fn sparse_tensors(&self, producer: &str) -> Result<&[SparseTensor]>;
}

/// In-memory source holding one event's collections, keyed by producer.
#[derive(Debug, Default)]
pub struct MemorySource {
    dense: HashMap<String, Vec<DenseTensor>>,
    sparse: HashMap<String, Vec<SparseTensor>>,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the dense collection for a producer.
    pub fn insert_dense(&mut self, producer: impl Into<String>, tensors: Vec<DenseTensor>) {
        self.dense.insert(producer.into(), tensors);
    }

    /// Replaces the sparse collection for a producer.
    pub fn insert_sparse(&mut self, producer: impl Into<String>, tensors: Vec<SparseTensor>) {
        self.sparse.insert(producer.into(), tensors);
    }
}

impl EventSource for MemorySource {
    fn dense_tensors(&self, producer: &str) -> Result<&[DenseTensor]> {
        Ok(self.dense.get(producer).map_or(&[], Vec::as_slice))
    }

    fn sparse_tensors(&self, producer: &str) -> Result<&[SparseTensor]> {
        Ok(self.sparse.get(producer).map_or(&[], Vec::as_slice))
    }
}

/// Store-backed source that materializes one event at a time from
/// category readers.
///
/// Each instance owns its readers and cache, so parallel loader workers
/// can each run their own source over the same container.
#[derive(Default)]
pub struct StoreSource {
    dense_readers: HashMap<String, TensorReader<DenseTensor>>,
    sparse_readers: HashMap<String, TensorReader<SparseTensor>>,
    dense_cache: HashMap<String, Vec<DenseTensor>>,
    sparse_cache: HashMap<String, Vec<SparseTensor>>,
}

impl StoreSource {
    /// Creates a source with no producers attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a dense category reader under a producer name.
    pub fn add_dense_producer(
        &mut self,
        producer: impl Into<String>,
        reader: TensorReader<DenseTensor>,
    ) {
        self.dense_readers.insert(producer.into(), reader);
    }

    /// Attaches a sparse category reader under a producer name.
    pub fn add_sparse_producer(
        &mut self,
        producer: impl Into<String>,
        reader: TensorReader<SparseTensor>,
    ) {
        self.sparse_readers.insert(producer.into(), reader);
    }

    /// Materializes every attached producer's collection for one event.
    ///
    /// # Errors
    /// Returns a storage error when any read fails, including an
    /// out-of-range event index.
    pub fn load_event(&mut self, event: u64) -> Result<()> {
        for (producer, reader) in &self.dense_readers {
            self.dense_cache.insert(producer.clone(), reader.read(event)?);
        }
        for (producer, reader) in &self.sparse_readers {
            self.sparse_cache
                .insert(producer.clone(), reader.read(event)?);
        }
        Ok(())
    }
}

impl EventSource for StoreSource {
    fn dense_tensors(&self, producer: &str) -> Result<&[DenseTensor]> {
        Ok(self.dense_cache.get(producer).map_or(&[], Vec::as_slice))
    }

    fn sparse_tensors(&self, producer: &str) -> Result<&[SparseTensor]> {
        Ok(self.sparse_cache.get(producer).map_or(&[], Vec::as_slice))
    }
}
