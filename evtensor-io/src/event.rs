//! Per-event tensor serialization over the four category tables.
//!
//! Append path: one `extents` row per event, then one `object_extents`
//! and one `metadata` row per tensor object in input order, then all
//! payloads contiguously at offsets computed from the running payload
//! length. Read path walks the same references in reverse. A failure
//! mid-append leaves the group inconsistent; no rollback is attempted.

use evtensor_core::meta::TensorMeta;
use evtensor_core::tensor::{DenseTensor, SparseTensor, Voxel};
use hdf5::types::H5Type;
use hdf5::Group;

use crate::records::{Extents, IdExtents, MetaRecord, VoxelRecord};
use crate::table::AppendTable;
use crate::{Error, Result};

/// Growth chunk for the per-event extents table.
pub const EXTENTS_CHUNK: usize = 1;
/// Growth chunk for the per-object extents table.
pub const OBJECT_EXTENTS_CHUNK: usize = 1000;
/// Growth chunk for the metadata table.
pub const METADATA_CHUNK: usize = 1000;
/// Growth chunk for the payload table, in elements.
pub const PAYLOAD_CHUNK: usize = 25_000_000;

const EXTENTS_NAME: &str = "extents";
const OBJECT_EXTENTS_NAME: &str = "object_extents";
const METADATA_NAME: &str = "metadata";
const PAYLOAD_NAME: &str = "payload";

/// Category storage options.
#[derive(Clone, Copy, Debug)]
pub struct StoreOptions {
    /// Deflate level for the payload table; `None` disables compression.
    pub payload_compression: Option<u8>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            payload_compression: Some(1),
        }
    }
}

/// A tensor object that can live in a category group.
///
/// Implemented by [`DenseTensor`] (payload = raw `f32` samples, extent id =
/// positional index) and [`SparseTensor`] (payload = voxel records, extent
/// id = projection id).
pub trait TensorRecord: Sized {
    /// Payload element type of the category's payload table.
    type Sample: H5Type + Copy;

    /// Geometry descriptor stored in the metadata table.
    fn meta(&self) -> &TensorMeta;

    /// Extent-table id for an object at `position` within its event.
    fn extent_id(&self, position: usize) -> i32;

    /// Payload element count.
    fn payload_len(&self) -> u64;

    /// Appends the object's payload elements to `out`.
    fn encode_payload(&self, out: &mut Vec<Self::Sample>);

    /// Reconstructs an object from its stored geometry and payload.
    ///
    /// # Errors
    /// Returns an error when the payload does not match the geometry.
    fn decode_payload(meta: TensorMeta, payload: Vec<Self::Sample>) -> Result<Self>;
}

impl TensorRecord for DenseTensor {
    type Sample = f32;

    fn meta(&self) -> &TensorMeta {
        DenseTensor::meta(self)
    }

    fn extent_id(&self, position: usize) -> i32 {
        i32::try_from(position).unwrap_or(i32::MAX)
    }

    fn payload_len(&self) -> u64 {
        self.len() as u64
    }

    fn encode_payload(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(self.as_slice());
    }

    fn decode_payload(meta: TensorMeta, payload: Vec<f32>) -> Result<Self> {
        Ok(DenseTensor::from_data(meta, payload)?)
    }
}

impl TensorRecord for SparseTensor {
    type Sample = VoxelRecord;

    fn meta(&self) -> &TensorMeta {
        SparseTensor::meta(self)
    }

    fn extent_id(&self, _position: usize) -> i32 {
        self.projection_id()
    }

    fn payload_len(&self) -> u64 {
        self.len() as u64
    }

    fn encode_payload(&self, out: &mut Vec<VoxelRecord>) {
        out.extend(self.as_slice().iter().map(|v| VoxelRecord {
            id: v.id,
            value: v.value,
        }));
    }

    fn decode_payload(meta: TensorMeta, payload: Vec<VoxelRecord>) -> Result<Self> {
        let voxels = payload
            .into_iter()
            .map(|r| Voxel {
                id: r.id,
                value: r.value,
            })
            .collect();
        Ok(SparseTensor::from_voxels(meta, voxels))
    }
}

/// Single-writer append handle for one tensor category.
#[derive(Debug)]
pub struct TensorWriter<T: TensorRecord> {
    extents: AppendTable<Extents>,
    object_extents: AppendTable<IdExtents>,
    metadata: AppendTable<MetaRecord>,
    payload: AppendTable<T::Sample>,
}

impl<T: TensorRecord> TensorWriter<T> {
    /// Creates the four empty tables inside an empty group.
    ///
    /// # Errors
    /// Returns `AlreadyInitialized` when the group has members, or an HDF5
    /// error if a dataset cannot be created.
    pub fn initialize(group: &Group, options: StoreOptions) -> Result<Self> {
        if group.len() != 0 {
            return Err(Error::AlreadyInitialized(group.name()));
        }
        let extents = AppendTable::create(group, EXTENTS_NAME, EXTENTS_CHUNK, None)?;
        let object_extents =
            AppendTable::create(group, OBJECT_EXTENTS_NAME, OBJECT_EXTENTS_CHUNK, None)?;
        let metadata = AppendTable::create(group, METADATA_NAME, METADATA_CHUNK, None)?;
        let payload = AppendTable::create(
            group,
            PAYLOAD_NAME,
            PAYLOAD_CHUNK,
            options.payload_compression,
        )?;
        Ok(Self {
            extents,
            object_extents,
            metadata,
            payload,
        })
    }

    /// Reopens an initialized group for continued appends.
    ///
    /// # Errors
    /// Returns an error when any of the four tables is missing.
    pub fn open(group: &Group) -> Result<Self> {
        Ok(Self {
            extents: AppendTable::open(group, EXTENTS_NAME)?,
            object_extents: AppendTable::open(group, OBJECT_EXTENTS_NAME)?,
            metadata: AppendTable::open(group, METADATA_NAME)?,
            payload: AppendTable::open(group, PAYLOAD_NAME)?,
        })
    }

    /// Number of events appended so far.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.extents.len()
    }

    /// Returns true if no events have been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    /// Appends one event's ordered tensor collection, returning its index.
    ///
    /// A zero-object event writes only the extents row; the child tables
    /// are untouched.
    ///
    /// # Errors
    /// Returns an error on any failed table write. The group is left
    /// inconsistent on mid-sequence failure (fail-fast, no rollback).
    pub fn append(&mut self, tensors: &[T]) -> Result<u64> {
        let event = self.extents.len();
        self.extents.append_rows(&[Extents {
            first: self.object_extents.len(),
            n: tensors.len() as u64,
        }])?;
        if tensors.is_empty() {
            return Ok(event);
        }

        let mut cursor = self.payload.len();
        let mut object_rows = Vec::with_capacity(tensors.len());
        let mut meta_rows = Vec::with_capacity(tensors.len());
        let mut samples: Vec<T::Sample> = Vec::new();
        for (position, tensor) in tensors.iter().enumerate() {
            let n = tensor.payload_len();
            object_rows.push(IdExtents {
                id: tensor.extent_id(position),
                first: cursor,
                n,
            });
            meta_rows.push(MetaRecord::from(tensor.meta()));
            tensor.encode_payload(&mut samples);
            cursor += n;
        }

        self.object_extents.append_rows(&object_rows)?;
        self.metadata.append_rows(&meta_rows)?;
        self.payload.append_rows(&samples)?;
        Ok(event)
    }
}

/// Shared-read handle for one tensor category.
///
/// Reads take `&self` and hold no mutable cursor; separate handles on the
/// same group may be used from parallel loader workers.
pub struct TensorReader<T: TensorRecord> {
    extents: AppendTable<Extents>,
    object_extents: AppendTable<IdExtents>,
    metadata: AppendTable<MetaRecord>,
    payload: AppendTable<T::Sample>,
}

impl<T: TensorRecord> TensorReader<T> {
    /// Opens an initialized category group.
    ///
    /// # Errors
    /// Returns an error when any of the four tables is missing.
    pub fn open(group: &Group) -> Result<Self> {
        Ok(Self {
            extents: AppendTable::open(group, EXTENTS_NAME)?,
            object_extents: AppendTable::open(group, OBJECT_EXTENTS_NAME)?,
            metadata: AppendTable::open(group, METADATA_NAME)?,
            payload: AppendTable::open(group, PAYLOAD_NAME)?,
        })
    }

    /// Number of stored events.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.extents.len()
    }

    /// Returns true if no events are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    /// Materializes the ordered tensor collection of one event.
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` for an event index past the end, or an
    /// error when stored records cannot be reconstructed.
    pub fn read(&self, event: u64) -> Result<Vec<T>> {
        if event >= self.extents.len() {
            return Err(Error::IndexOutOfRange {
                index: event,
                len: self.extents.len(),
            });
        }
        let extent = self.extents.read_row(event)?;
        if extent.n == 0 {
            return Ok(Vec::new());
        }

        let object_rows = self.object_extents.read_slice(extent.first, extent.n)?;
        let meta_rows = self.metadata.read_slice(extent.first, extent.n)?;

        let mut tensors = Vec::with_capacity(object_rows.len());
        for (row, meta_row) in object_rows.iter().zip(&meta_rows) {
            // Offsets are explicit per row, never recomputed.
            let samples = self.payload.read_slice(row.first, row.n)?;
            let meta = TensorMeta::try_from(*meta_row)?;
            tensors.push(T::decode_payload(meta, samples)?);
        }
        Ok(tensors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TensorStore;
    use tempfile::NamedTempFile;

    fn dense_event(projection: i32, rows: u64, cols: u64, seed: f32) -> DenseTensor {
        let meta = TensorMeta::new_2d(projection, rows, cols);
        let data = (0..rows * cols)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                {
                    seed + i as f32
                }
            })
            .collect();
        DenseTensor::from_data(meta, data).unwrap()
    }

    fn sparse_event(projection: i32, ids: &[u64]) -> SparseTensor {
        let meta = TensorMeta::new_2d(projection, 8, 8);
        let mut tensor = SparseTensor::new(meta);
        for (i, &id) in ids.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            tensor.push(id, 0.5 + i as f32);
        }
        tensor
    }

    #[test]
    fn test_dense_roundtrip_varying_shapes() {
        let tmp = NamedTempFile::new().unwrap();
        let store = TensorStore::create(tmp.path()).unwrap();
        let group = store.create_category("image").unwrap();

        let events = vec![
            vec![dense_event(0, 2, 3, 0.0), dense_event(1, 2, 3, 10.0)],
            vec![dense_event(0, 4, 4, 100.0)],
            vec![],
            vec![
                dense_event(0, 3, 2, 7.0),
                dense_event(1, 3, 2, 8.0),
                dense_event(2, 3, 2, 9.0),
            ],
        ];

        let mut writer = TensorWriter::<DenseTensor>::initialize(&group, StoreOptions::default())
            .unwrap();
        for (i, event) in events.iter().enumerate() {
            assert_eq!(writer.append(event).unwrap(), i as u64);
        }

        let reader = TensorReader::<DenseTensor>::open(&group).unwrap();
        assert_eq!(reader.len(), 4);
        for (i, event) in events.iter().enumerate() {
            let read = reader.read(i as u64).unwrap();
            assert_eq!(&read, event);
        }
    }

    #[test]
    fn test_sparse_roundtrip_preserves_voxel_order() {
        let tmp = NamedTempFile::new().unwrap();
        let store = TensorStore::create(tmp.path()).unwrap();
        let group = store.create_category("voxels").unwrap();

        let event = vec![sparse_event(2, &[9, 1, 5]), sparse_event(0, &[3])];

        let mut writer = TensorWriter::<SparseTensor>::initialize(&group, StoreOptions::default())
            .unwrap();
        writer.append(&event).unwrap();

        let reader = TensorReader::<SparseTensor>::open(&group).unwrap();
        let read = reader.read(0).unwrap();
        assert_eq!(read, event);
        let ids: Vec<u64> = read[0].as_slice().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![9, 1, 5]);
    }

    #[test]
    fn test_read_is_idempotent() {
        let tmp = NamedTempFile::new().unwrap();
        let store = TensorStore::create(tmp.path()).unwrap();
        let group = store.create_category("image").unwrap();

        let event = vec![dense_event(0, 2, 2, 1.0)];
        let mut writer = TensorWriter::<DenseTensor>::initialize(&group, StoreOptions::default())
            .unwrap();
        writer.append(&event).unwrap();

        let reader = TensorReader::<DenseTensor>::open(&group).unwrap();
        let first = reader.read(0).unwrap();
        let second = reader.read(0).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, event);
    }

    #[test]
    fn test_zero_object_event_reads_empty() {
        let tmp = NamedTempFile::new().unwrap();
        let store = TensorStore::create(tmp.path()).unwrap();
        let group = store.create_category("image").unwrap();

        let mut writer = TensorWriter::<DenseTensor>::initialize(&group, StoreOptions::default())
            .unwrap();
        writer.append(&[]).unwrap();
        writer.append(&[dense_event(0, 2, 2, 0.0)]).unwrap();

        let reader = TensorReader::<DenseTensor>::open(&group).unwrap();
        assert!(reader.read(0).unwrap().is_empty());
        assert_eq!(reader.read(1).unwrap().len(), 1);
    }

    #[test]
    fn test_read_out_of_range() {
        let tmp = NamedTempFile::new().unwrap();
        let store = TensorStore::create(tmp.path()).unwrap();
        let group = store.create_category("image").unwrap();

        let mut writer = TensorWriter::<DenseTensor>::initialize(&group, StoreOptions::default())
            .unwrap();
        writer.append(&[dense_event(0, 2, 2, 0.0)]).unwrap();

        let reader = TensorReader::<DenseTensor>::open(&group).unwrap();
        let err = reader.read(5).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 5, len: 1 }));
    }

    #[test]
    fn test_initialize_rejects_non_empty_group() {
        let tmp = NamedTempFile::new().unwrap();
        let store = TensorStore::create(tmp.path()).unwrap();
        let group = store.create_category("image").unwrap();

        TensorWriter::<DenseTensor>::initialize(&group, StoreOptions::default()).unwrap();
        let err =
            TensorWriter::<DenseTensor>::initialize(&group, StoreOptions::default()).unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialized(_)));
    }

    #[test]
    fn test_writer_reopen_continues_appends() {
        let tmp = NamedTempFile::new().unwrap();
        {
            let store = TensorStore::create(tmp.path()).unwrap();
            let group = store.create_category("image").unwrap();
            let mut writer =
                TensorWriter::<DenseTensor>::initialize(&group, StoreOptions::default()).unwrap();
            writer.append(&[dense_event(0, 2, 2, 0.0)]).unwrap();
        }
        {
            let store = TensorStore::open_rw(tmp.path()).unwrap();
            let group = store.category("image").unwrap();
            let mut writer = TensorWriter::<DenseTensor>::open(&group).unwrap();
            assert_eq!(writer.len(), 1);
            assert_eq!(writer.append(&[dense_event(0, 2, 2, 4.0)]).unwrap(), 1);
        }
        let store = TensorStore::open(tmp.path()).unwrap();
        let group = store.category("image").unwrap();
        let reader = TensorReader::<DenseTensor>::open(&group).unwrap();
        assert_eq!(reader.len(), 2);
        assert_eq!(reader.read(1).unwrap()[0], dense_event(0, 2, 2, 4.0));
    }
}
