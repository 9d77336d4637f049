//! Batch tensor filler.
//!
//! Converts one-event-at-a-time dense or sparse tensor reads into a
//! pre-shaped multi-event buffer: dense grids are transposed from the
//! producer's column-major layout and interleaved channel-innermost;
//! sparse voxels overwrite a baseline-filled record in place.

use evtensor_core::DenseTensor;

use crate::batch::BatchData;
use crate::config::{Dimensionality, FillerConfig, TensorType};
use crate::source::EventSource;
use crate::{Error, Result};

/// Assembles per-event tensors into a shared batch buffer.
///
/// Rows/cols are established on the first processed event and fixed for
/// the instance's lifetime; later events must match or the run aborts.
#[derive(Debug)]
pub struct TensorFiller {
    config: FillerConfig,
    dimension: Dimensionality,
    channels: Vec<usize>,
    num_channels: usize,
    max_ch: usize,
    rows: Option<usize>,
    cols: Option<usize>,
    entry_data: Vec<f32>,
    batch: BatchData,
}

impl TensorFiller {
    /// Creates a filler for `batch_size` events per batch.
    ///
    /// # Errors
    /// Returns `EmptyChannels` when an explicit channel list is empty.
    pub fn new(
        config: FillerConfig,
        dimension: Dimensionality,
        batch_size: usize,
    ) -> Result<Self> {
        let channels = match &config.channels {
            Some(channels) if channels.is_empty() => return Err(Error::EmptyChannels),
            Some(channels) => channels.clone(),
            None => Vec::new(),
        };
        Ok(Self {
            config,
            dimension,
            channels,
            num_channels: 0,
            max_ch: 0,
            rows: None,
            cols: None,
            entry_data: Vec::new(),
            batch: BatchData::new(batch_size),
        })
    }

    /// The batch buffer owned by this instance.
    #[must_use]
    pub fn batch_data(&self) -> &BatchData {
        &self.batch
    }

    /// Resolved output channel list.
    #[must_use]
    pub fn channels(&self) -> &[usize] {
        &self.channels
    }

    /// Starts a new batch. A changed batch size resizes the buffer's
    /// leading dimension in place; this is informational, not an error.
    ///
    /// # Errors
    /// Returns `DimMismatch` only on an internal shape inconsistency.
    pub fn begin_batch(&mut self, batch_size: usize) -> Result<()> {
        self.batch.begin_batch(batch_size)
    }

    /// Finishes the current batch.
    pub fn end_batch(&self) {
        log::info!("total batch data size: {}", self.batch.data_size());
    }

    /// Fills the next batch slot from the current event of `source`.
    ///
    /// # Errors
    /// Propagates the fatal conditions of the configured path: missing
    /// data, channel mismatches, shape drift, unsupported dimensionality.
    pub fn fill<S: EventSource>(&mut self, source: &S) -> Result<()> {
        match self.config.tensor_type {
            TensorType::Dense => self.fill_dense(source),
            TensorType::Sparse => self.fill_sparse(source),
        }
    }

    fn fill_dense<S: EventSource>(&mut self, source: &S) -> Result<()> {
        if self.dimension == Dimensionality::Three {
            return Err(Error::UnsupportedDimension(3));
        }

        let images = source.dense_tensors(&self.config.tensor_producer)?;
        if images.is_empty() {
            if !self.config.allow_empty || self.batch.dim().is_empty() {
                return Err(Error::MissingData(self.config.tensor_producer.clone()));
            }
            self.entry_data.resize(self.batch.entry_data_size(), 0.0);
            self.entry_data.fill(0.0);
            return self.batch.set_entry_data(&self.entry_data);
        }

        if self.batch.dim().is_empty() {
            self.set_image_size(images)?;
            let (Some(rows), Some(cols)) = (self.rows, self.cols) else {
                return Err(Error::MissingData(self.config.tensor_producer.clone()));
            };
            self.batch
                .set_dim(&[self.batch.batch_size(), rows, cols, self.num_channels])?;
        } else {
            self.assert_dimension(images)?;
        }

        let (Some(rows), Some(cols)) = (self.rows, self.cols) else {
            return Err(Error::MissingData(self.config.tensor_producer.clone()));
        };

        let size = self.batch.entry_data_size();
        if self.entry_data.len() != size {
            self.entry_data.resize(size, 0.0);
        }
        self.entry_data.fill(0.0);

        for (ch, &input_ch) in self.channels.iter().enumerate() {
            let source_image = images[input_ch].as_slice();

            // Transpose-and-interleave: the source is column-major per
            // channel, the output enumerates (row, col) in row-major order
            // with channels at the innermost stride.
            let mut idx = 0;
            for row in 0..rows {
                for col in 0..cols {
                    self.entry_data[idx * self.num_channels + ch] =
                        source_image[col * rows + row];
                    idx += 1;
                }
            }
        }

        self.batch.set_entry_data(&self.entry_data)
    }

    fn fill_sparse<S: EventSource>(&mut self, source: &S) -> Result<()> {
        let voxel_sets = source.sparse_tensors(&self.config.tensor_producer)?;
        if voxel_sets.is_empty() {
            if !self.config.allow_empty || self.batch.dim().is_empty() {
                return Err(Error::MissingData(self.config.tensor_producer.clone()));
            }
            self.entry_data.resize(self.batch.entry_data_size(), 0.0);
            self.entry_data.fill(self.config.empty_voxel_value);
            return self.batch.set_entry_data(&self.entry_data);
        }

        if self.channels.is_empty() {
            self.channels = (0..voxel_sets.len()).collect();
        }
        self.num_channels = self.channels.len();

        let meta = voxel_sets[0].meta();
        let rank = self.dimension.rank();
        let mut dim = Vec::with_capacity(rank + 2);
        dim.push(self.batch.batch_size());
        for axis in 0..rank {
            #[allow(clippy::cast_possible_truncation)]
            dim.push(meta.number_of_voxels(axis) as usize);
        }
        dim.push(self.num_channels);
        self.batch.set_dim(&dim)?;
        self.batch.set_dense_dim(&dim);

        let size = self.batch.entry_data_size();
        if self.entry_data.len() != size {
            self.entry_data.resize(size, 0.0);
        }
        self.entry_data.fill(self.config.empty_voxel_value);

        for voxel_set in voxel_sets {
            if self
                .check_projection(voxel_set.projection_id())
                .is_some()
            {
                for voxel in voxel_set.as_slice() {
                    // The voxel id is the flat output index as stored; the
                    // producer pre-bakes any channel offset into the id.
                    let idx = usize::try_from(voxel.id).map_err(|_| Error::VoxelOutOfRange {
                        id: voxel.id,
                        len: self.entry_data.len(),
                    })?;
                    let slot =
                        self.entry_data
                            .get_mut(idx)
                            .ok_or(Error::VoxelOutOfRange {
                                id: voxel.id,
                                len: size,
                            })?;
                    *slot = voxel.value;
                }
            }

            // Only the first voxel set is consumed in 3D.
            if self.dimension == Dimensionality::Three {
                break;
            }
        }

        self.batch.set_entry_data(&self.entry_data)
    }

    /// Establishes rows/cols and the resolved channel list from the first
    /// processed event.
    fn set_image_size(&mut self, images: &[DenseTensor]) -> Result<()> {
        if images.is_empty() {
            return Err(Error::MissingData(self.config.tensor_producer.clone()));
        }

        if self.channels.is_empty() {
            self.channels = (0..images.len()).collect();
        }
        self.num_channels = self.channels.len();
        self.max_ch = self.channels.iter().copied().max().unwrap_or(0);

        if images.len() <= self.max_ch {
            return Err(Error::ChannelOutOfRange {
                max_channel: self.max_ch,
                available: images.len(),
            });
        }

        let meta = images[self.channels[0]].meta();
        #[allow(clippy::cast_possible_truncation)]
        {
            self.rows = Some(meta.rows() as usize);
            self.cols = Some(meta.cols() as usize);
        }
        log::info!("rows = {} ... cols = {}", meta.rows(), meta.cols());
        Ok(())
    }

    /// Re-validates a later event against the established shape.
    fn assert_dimension(&self, images: &[DenseTensor]) -> Result<()> {
        let (Some(rows), Some(cols)) = (self.rows, self.cols) else {
            log::warn!("dimension check invoked before any shape was established");
            return Ok(());
        };

        if images.len() <= self.max_ch {
            return Err(Error::ChannelOutOfRange {
                max_channel: self.max_ch,
                available: images.len(),
            });
        }

        for &input_ch in &self.channels {
            let meta = images[input_ch].meta();
            #[allow(clippy::cast_possible_truncation)]
            let found = (meta.rows() as usize, meta.cols() as usize);
            if found != (rows, cols) {
                return Err(Error::ShapeDrift {
                    expected: (rows, cols),
                    found,
                });
            }
        }
        Ok(())
    }

    /// Maps a projection id to its output channel slot.
    ///
    /// In 3D every object matches (only the first is ever consumed); in
    /// 2D the first channel list entry equal to the id wins, and an id
    /// absent from the list matches nothing.
    fn check_projection(&self, projection_id: i32) -> Option<usize> {
        if self.dimension == Dimensionality::Three {
            return Some(0);
        }
        let id = usize::try_from(projection_id).ok()?;
        self.channels.iter().position(|&ch| ch == id)
    }
}
