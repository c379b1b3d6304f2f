use std::io::Cursor;

use dyaa_core::RunProvenance;
use dyaa_grid::persist::{read_from, write_to, MAGIC, SCHEMA_VERSION};
use dyaa_grid::{
    canonical_hash, lumi_entry, BinLimits, GridAccumulator, Ntuple, NtupleGrid, Order,
};
use tempfile::tempdir;

fn filled_grid() -> NtupleGrid {
    let mut grid = NtupleGrid::new(
        vec![lumi_entry![22, 22, 1.0].unwrap()],
        vec![Order::new(0, 2, 0, 0)],
        BinLimits::new((0..=24).map(|x| x as f64 / 10.0).collect()).unwrap(),
    )
    .unwrap();
    for i in 0..50 {
        let y = i as f64 * 0.047;
        grid.fill(0, y, 0, &Ntuple::new(0.01 + 0.001 * i as f64, 0.02, 8100.0, 1e-3 * i as f64))
            .unwrap();
    }
    grid.set_provenance(RunProvenance {
        seed: 7,
        calls: 50,
        mmin: 10.0,
        mmax: 7000.0,
        created_by: "persist_roundtrip".into(),
        ..RunProvenance::default()
    });
    grid
}

#[test]
fn grid_round_trips_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("DY-LO-AA.dyaa");
    let grid = filled_grid();

    grid.write(&path).unwrap();
    let restored = NtupleGrid::read(&path).unwrap();

    assert_eq!(canonical_hash(&restored), canonical_hash(&grid));
    assert_eq!(restored.provenance(), grid.provenance());
    assert_eq!(restored, grid);
}

#[test]
fn convolution_survives_round_trip() {
    let grid = filled_grid();
    let mut buffer = Cursor::new(Vec::new());
    write_to(&grid, &mut buffer).unwrap();
    buffer.set_position(0);
    let restored = read_from(&mut buffer).unwrap();

    let xfx = |_: i32, x: f64, _: f64| x * (1.0 - x).powi(3);
    let alphas = |_: f64| 0.118;
    let before = grid
        .convolute(&xfx, &xfx, &alphas, &Default::default())
        .unwrap();
    let after = restored
        .convolute(&xfx, &xfx, &alphas, &Default::default())
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn foreign_payload_is_rejected() {
    let err = read_from(Cursor::new(vec![0u8; 64])).unwrap_err();
    assert!(matches!(err, dyaa_core::GenError::Serde(_)));
    assert_eq!(err.info().code, "grid-magic");

    let err = read_from(Cursor::new(b"DYAA".to_vec())).unwrap_err();
    assert_eq!(err.info().code, "bincode-deserialize");
}

/// Header and provenance scalars followed by a `created_by` length prefix.
fn header_with_label_length(magic: &[u8; 8], major: u32, label_len: u64) -> Vec<u8> {
    let mut bytes = magic.to_vec();
    for part in [major, 0, 0] {
        bytes.extend_from_slice(&part.to_le_bytes());
    }
    bytes.extend_from_slice(&7u64.to_le_bytes());
    bytes.extend_from_slice(&50u64.to_le_bytes());
    bytes.extend_from_slice(&10.0f64.to_le_bytes());
    bytes.extend_from_slice(&7000.0f64.to_le_bytes());
    bytes.extend_from_slice(&label_len.to_le_bytes());
    bytes
}

#[test]
fn oversized_length_prefix_is_an_error() {
    let bytes = header_with_label_length(&MAGIC, SCHEMA_VERSION.major, 1 << 62);
    let err = read_from(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, dyaa_core::GenError::Serde(_)));
    assert_eq!(err.info().code, "bincode-deserialize");
}

#[test]
fn header_is_checked_before_the_body() {
    let foreign = header_with_label_length(b"NOTAGRID", 1, 1 << 62);
    assert_eq!(read_from(Cursor::new(foreign)).unwrap_err().info().code, "grid-magic");

    let future = header_with_label_length(&MAGIC, SCHEMA_VERSION.major + 1, 1 << 62);
    let err = read_from(Cursor::new(future)).unwrap_err();
    assert_eq!(err.info().code, "grid-schema");
    assert_eq!(err.info().context["found"], "2.0.0");
}

#[test]
fn truncated_file_is_an_error() {
    let mut buffer = Cursor::new(Vec::new());
    write_to(&filled_grid(), &mut buffer).unwrap();
    let mut bytes = buffer.into_inner();
    bytes.truncate(bytes.len() / 2);
    let err = read_from(Cursor::new(bytes)).unwrap_err();
    assert_eq!(err.info().code, "bincode-deserialize");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = NtupleGrid::read(&dir.path().join("absent.dyaa")).unwrap_err();
    assert_eq!(err.info().code, "grid-read");
}
