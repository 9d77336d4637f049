//! End-to-end: append events to a container, materialize them through a
//! store-backed source, and assemble a batch.

use evtensor_batch::{
    Dimensionality, FillerConfig, FillerRegistry, StoreSource, TensorFiller, TensorType,
};
use evtensor_core::{DenseTensor, SparseTensor, TensorMeta};
use evtensor_io::{StoreOptions, TensorReader, TensorStore, TensorWriter};
use tempfile::NamedTempFile;

fn dense_event(event: u64, rows: u64, cols: u64) -> Vec<DenseTensor> {
    (0..2u64)
        .map(|projection| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let meta = TensorMeta::new_2d(projection as i32, rows, cols);
            #[allow(clippy::cast_precision_loss)]
            let data = (0..rows * cols)
                .map(|i| (event * 1000 + projection * 100 + i) as f32)
                .collect();
            DenseTensor::from_data(meta, data).unwrap()
        })
        .collect()
}

#[test]
fn test_store_to_batch_dense() {
    let tmp = NamedTempFile::new().unwrap();
    let (rows, cols) = (2, 3);

    {
        let store = TensorStore::create(tmp.path()).unwrap();
        let group = store.create_category("image").unwrap();
        let mut writer =
            TensorWriter::<DenseTensor>::initialize(&group, StoreOptions::default()).unwrap();
        for event in 0..4 {
            writer.append(&dense_event(event, rows, cols)).unwrap();
        }
    }

    let store = TensorStore::open(tmp.path()).unwrap();
    let group = store.category("image").unwrap();
    let mut source = StoreSource::new();
    source.add_dense_producer("image", TensorReader::open(&group).unwrap());

    let config = FillerConfig::new("image").with_tensor_type(TensorType::Dense);
    let mut filler = TensorFiller::new(config, Dimensionality::Two, 4).unwrap();
    filler.begin_batch(4).unwrap();
    for event in 0..4 {
        source.load_event(event).unwrap();
        filler.fill(&source).unwrap();
    }
    filler.end_batch();

    let batch = filler.batch_data();
    assert_eq!(batch.dim(), &[4, 2, 3, 2]);
    assert_eq!(batch.entry_count(), 4);

    // Spot check the transpose for event 1, output position (row=1, col=2),
    // channel 1: source sample index col*rows + row = 5, so the value is
    // 1*1000 + 1*100 + 5.
    let entry = batch.entry(1).unwrap();
    let (row, col, num_channels, ch) = (1, 2, 2, 1);
    let idx = (row * 3 + col) * num_channels + ch;
    assert!((entry[idx] - 1105.0).abs() < f32::EPSILON);
}

#[test]
fn test_store_to_batch_sparse_via_registry() {
    let tmp = NamedTempFile::new().unwrap();

    {
        let store = TensorStore::create(tmp.path()).unwrap();
        let group = store.create_category("voxels").unwrap();
        let mut writer =
            TensorWriter::<SparseTensor>::initialize(&group, StoreOptions::default()).unwrap();

        let mut plane0 = SparseTensor::new(TensorMeta::new_2d(0, 4, 4));
        plane0.push(3, 1.5);
        plane0.push(10, 2.5);
        let mut plane1 = SparseTensor::new(TensorMeta::new_2d(1, 4, 4));
        plane1.push(16, 9.0);
        writer.append(&[plane0, plane1]).unwrap();
    }

    let store = TensorStore::open(tmp.path()).unwrap();
    let group = store.category("voxels").unwrap();
    let mut source = StoreSource::new();
    source.add_sparse_producer("voxels", TensorReader::open(&group).unwrap());
    source.load_event(0).unwrap();

    let registry = FillerRegistry::with_defaults();
    let config = FillerConfig::new("voxels").with_channels(vec![0, 1]);
    let mut filler = registry.build("batch_tensor2d", config, 1).unwrap();
    filler.begin_batch(1).unwrap();
    filler.fill(&source).unwrap();

    let batch = filler.batch_data();
    assert_eq!(batch.dim(), &[1, 4, 4, 2]);
    let entry = batch.entry(0).unwrap();
    assert!((entry[3] - 1.5).abs() < f32::EPSILON);
    assert!((entry[10] - 2.5).abs() < f32::EPSILON);
    assert!((entry[16] - 9.0).abs() < f32::EPSILON);
    assert!(entry[0].abs() < f32::EPSILON);
}
