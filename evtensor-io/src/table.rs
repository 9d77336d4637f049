//! Append-only table over one chunked HDF5 dataset.
//!
//! All four category tables share this shape: a 1-D dataset that starts
//! empty with unlimited capacity and is extended by exactly the amount
//! newly needed on each append. Chunk granularity affects I/O efficiency
//! only, never correctness.

use hdf5::types::H5Type;
use hdf5::{Dataset, Group};
use ndarray::{s, ArrayView1};
use std::marker::PhantomData;

use crate::{Error, Result};

/// An appendable, randomly-readable sequence of fixed-size records.
#[derive(Debug)]
pub struct AppendTable<T: H5Type + Copy> {
    dataset: Dataset,
    len: u64,
    _marker: PhantomData<T>,
}

impl<T: H5Type + Copy> AppendTable<T> {
    /// Creates an empty table inside `group`.
    ///
    /// # Errors
    /// Returns an error if the dataset cannot be created.
    pub fn create(
        group: &Group,
        name: &str,
        chunk: usize,
        compression: Option<u8>,
    ) -> Result<Self> {
        let mut builder = group.new_dataset::<T>().shape((0..,)).chunk((chunk,));
        if let Some(level) = compression {
            builder = builder.deflate(level);
        }
        let dataset = builder.create(name)?;
        Ok(Self {
            dataset,
            len: 0,
            _marker: PhantomData,
        })
    }

    /// Opens an existing table.
    ///
    /// # Errors
    /// Returns an error if the dataset does not exist.
    pub fn open(group: &Group, name: &str) -> Result<Self> {
        let dataset = group.dataset(name)?;
        let len = dataset.shape().first().copied().unwrap_or(0) as u64;
        Ok(Self {
            dataset,
            len,
            _marker: PhantomData,
        })
    }

    /// Current row count.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends rows at the end of the table.
    ///
    /// # Errors
    /// Returns an error if the dataset cannot be extended or written.
    pub fn append_rows(&mut self, rows: &[T]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        #[allow(clippy::cast_possible_truncation)]
        let first = self.len as usize;
        let new_len = first + rows.len();
        self.dataset.resize((new_len,))?;
        self.dataset
            .write_slice(ArrayView1::from(rows), s![first..new_len])?;
        self.len = new_len as u64;
        Ok(())
    }

    /// Reads the row slice `[first, first + n)`.
    ///
    /// `n == 0` returns an empty vector without touching the dataset.
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` when the slice extends past the table.
    pub fn read_slice(&self, first: u64, n: u64) -> Result<Vec<T>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let end = first
            .checked_add(n)
            .ok_or(Error::IndexOutOfRange {
                index: u64::MAX,
                len: self.len,
            })?;
        if end > self.len {
            return Err(Error::IndexOutOfRange {
                index: end - 1,
                len: self.len,
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        let range = first as usize..end as usize;
        let rows = self.dataset.read_slice_1d::<T, _>(s![range])?;
        Ok(rows.to_vec())
    }

    /// Reads a single row.
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` when `index` is past the table end.
    pub fn read_row(&self, index: u64) -> Result<T> {
        self.read_slice(index, 1)?
            .pop()
            .ok_or_else(|| Error::InvalidFormat("empty row slice".to_string()))
    }
}
