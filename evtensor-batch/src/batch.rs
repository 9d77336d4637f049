//! Reusable multi-event output buffer.

use crate::{Error, Result};

/// Flat numeric buffer holding one batch of per-event records.
///
/// The leading dimension is the batch size; the remaining dimensions are
/// fixed once established. Exclusively owned by one filler instance.
#[derive(Debug, Clone)]
pub struct BatchData {
    batch_size: usize,
    dim: Vec<usize>,
    dense_dim: Vec<usize>,
    data: Vec<f32>,
    cursor: usize,
}

impl BatchData {
    /// Creates an unshaped buffer for `batch_size` events.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            dim: Vec::new(),
            dense_dim: Vec::new(),
            data: Vec::new(),
            cursor: 0,
        }
    }

    /// Configured number of events per batch.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Buffer shape; empty until the first event establishes it.
    #[must_use]
    pub fn dim(&self) -> &[usize] {
        &self.dim
    }

    /// Dense-equivalent shape declared by the sparse path.
    #[must_use]
    pub fn dense_dim(&self) -> &[usize] {
        &self.dense_dim
    }

    /// Flat buffer contents.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Total element count of the buffer.
    #[must_use]
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Element count of one per-event record.
    #[must_use]
    pub fn entry_data_size(&self) -> usize {
        if self.dim.is_empty() {
            0
        } else {
            self.dim.iter().skip(1).product()
        }
    }

    /// Number of entries written into the current batch.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.cursor
    }

    /// One filled per-event record, or `None` for an out-of-range slot.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&[f32]> {
        if index >= self.batch_size {
            return None;
        }
        let size = self.entry_data_size();
        self.data.get(index * size..(index + 1) * size)
    }

    /// Declares the buffer shape.
    ///
    /// The first call allocates. Later calls with an identical shape are
    /// no-ops; a change confined to the leading dimension resizes in place
    /// and preserves already-filled records.
    ///
    /// # Errors
    /// Returns `DimMismatch` when a non-leading dimension changes.
    pub fn set_dim(&mut self, dim: &[usize]) -> Result<()> {
        if self.dim == dim {
            return Ok(());
        }
        if self.dim.is_empty() {
            self.dim = dim.to_vec();
            self.data = vec![0.0; dim.iter().product()];
            return Ok(());
        }
        if self.dim.len() == dim.len() && self.dim[1..] == dim[1..] {
            log::info!("batch size changed {} => {}", self.dim[0], dim[0]);
            self.dim[0] = dim[0];
            self.data.resize(dim.iter().product(), 0.0);
            return Ok(());
        }
        Err(Error::DimMismatch {
            expected: self.dim.clone(),
            found: dim.to_vec(),
        })
    }

    /// Declares the dense-equivalent shape of a sparse batch.
    pub fn set_dense_dim(&mut self, dim: &[usize]) {
        self.dense_dim = dim.to_vec();
    }

    /// Starts a new batch, applying a leading-dimension change if the
    /// configured batch size moved since the shape was established.
    ///
    /// # Errors
    /// Returns `DimMismatch` only on an internal shape inconsistency.
    pub fn begin_batch(&mut self, batch_size: usize) -> Result<()> {
        self.batch_size = batch_size;
        self.cursor = 0;
        if !self.dim.is_empty() && self.dim[0] != batch_size {
            let mut dim = self.dim.clone();
            dim[0] = batch_size;
            self.set_dim(&dim)?;
            if !self.dense_dim.is_empty() {
                self.dense_dim[0] = batch_size;
            }
        }
        Ok(())
    }

    /// Copies one completed per-event record into the next batch slot.
    ///
    /// # Errors
    /// Returns `BatchFull` when the batch already holds `batch_size`
    /// entries, or `EntrySizeMismatch` for a wrong record length.
    pub fn set_entry_data(&mut self, entry: &[f32]) -> Result<()> {
        let size = self.entry_data_size();
        if entry.len() != size {
            return Err(Error::EntrySizeMismatch {
                expected: size,
                actual: entry.len(),
            });
        }
        if self.cursor >= self.batch_size {
            return Err(Error::BatchFull(self.cursor));
        }
        let start = self.cursor * size;
        self.data[start..start + size].copy_from_slice(entry);
        self.cursor += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_dim_allocates_once() {
        let mut batch = BatchData::new(2);
        batch.set_dim(&[2, 3, 4]).unwrap();
        assert_eq!(batch.data_size(), 24);
        assert_eq!(batch.entry_data_size(), 12);
        // Identical shape is a no-op.
        batch.set_dim(&[2, 3, 4]).unwrap();
        assert_eq!(batch.data_size(), 24);
    }

    #[test]
    fn test_leading_dim_resize_preserves_entries() {
        let mut batch = BatchData::new(2);
        batch.set_dim(&[2, 4]).unwrap();
        batch.set_entry_data(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        batch.set_entry_data(&[5.0, 6.0, 7.0, 8.0]).unwrap();

        batch.begin_batch(4).unwrap();
        assert_eq!(batch.dim(), &[4, 4]);
        assert_eq!(batch.data_size(), 16);
        // Previously-filled records keep their byte layout.
        assert_eq!(batch.entry(0).unwrap(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(batch.entry(1).unwrap(), &[5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_entry_out_of_range_is_none() {
        let mut batch = BatchData::new(2);
        batch.set_dim(&[2, 4]).unwrap();
        assert!(batch.entry(0).is_some());
        assert!(batch.entry(2).is_none());

        // An unshaped buffer yields empty records, never a panic.
        let unshaped = BatchData::new(2);
        assert!(unshaped.entry(0).unwrap().is_empty());
    }

    #[test]
    fn test_non_leading_dim_change_rejected() {
        let mut batch = BatchData::new(2);
        batch.set_dim(&[2, 4]).unwrap();
        let err = batch.set_dim(&[2, 5]).unwrap_err();
        assert!(matches!(err, Error::DimMismatch { .. }));
    }

    #[test]
    fn test_entry_bookkeeping() {
        let mut batch = BatchData::new(1);
        batch.set_dim(&[1, 2]).unwrap();
        let err = batch.set_entry_data(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::EntrySizeMismatch {
                expected: 2,
                actual: 1
            }
        ));
        batch.set_entry_data(&[1.0, 2.0]).unwrap();
        let err = batch.set_entry_data(&[3.0, 4.0]).unwrap_err();
        assert!(matches!(err, Error::BatchFull(1)));
    }
}
