//! Whole-matrix operations: transposition and projection.
//!
//! Tests that depend on the default storage variant run serially because
//! it is global configuration.

use ggmat::commands::{ConvertCommand, ProjectCommand, TransposeCommand};
use ggmat::config;
use ggmat::matrix::{Element, ElementKind, MatrixHandle, MatrixInfo, StorageVariant};
use ggmat::ErrorCode;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serial_test::serial;
use std::path::Path;
use tempfile::tempdir;

fn random_matrix(seed: u64, info: MatrixInfo) -> Vec<Vec<Vec<i32>>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..info.levels)
        .map(|_| {
            (0..info.lines)
                .map(|_| {
                    (0..info.columns)
                        .map(|_| {
                            // Mostly small counts with the occasional spike.
                            if rng.gen_bool(0.05) {
                                rng.gen_range(-100_000..100_000)
                            } else {
                                rng.gen_range(0..4)
                            }
                        })
                        .collect()
                })
                .collect()
        })
        .collect()
}

fn write_matrix<T: Element>(path: &Path, info: MatrixInfo, data: &[Vec<Vec<T>>]) {
    let mut h = MatrixHandle::create(path, info).unwrap();
    for (level, rows) in data.iter().enumerate() {
        for (line, row) in rows.iter().enumerate() {
            h.write_line(row, level as u32, line as u32).unwrap();
        }
    }
    h.close().unwrap();
}

fn read_matrix<T: Element>(path: &Path) -> Vec<Vec<Vec<T>>> {
    let mut h = MatrixHandle::open(path).unwrap();
    let info = *h.info();
    (0..info.levels)
        .map(|level| {
            (0..info.lines)
                .map(|line| {
                    let mut buf = vec![T::default(); info.columns as usize];
                    h.read_line(&mut buf, level, line).unwrap();
                    buf
                })
                .collect()
        })
        .collect()
}

fn grand_total(path: &Path) -> f64 {
    read_matrix::<f64>(path)
        .into_iter()
        .flatten()
        .flatten()
        .sum()
}

/// Overwrite the first byte of the last stored line with an invalid token.
fn corrupt_last_line(path: &Path) {
    let mut bytes = std::fs::read(path).unwrap();
    // The last index entry is the final 12 bytes: offset u64, length u32.
    let entry = bytes.len() - 12;
    let mut offset = [0u8; 8];
    offset.copy_from_slice(&bytes[entry..entry + 8]);
    let offset = u64::from_le_bytes(offset) as usize;
    bytes[offset] = 0xc0;
    std::fs::write(path, bytes).unwrap();
}

// ============================================================================
// Transposition
// ============================================================================

#[test]
fn test_transpose_involution_single_block() {
    let dir = tempdir().unwrap();
    let info = MatrixInfo::new(2, 17, 31);
    let data = random_matrix(1, info);
    let src = dir.path().join("m.ggm");
    write_matrix(&src, info, &data);

    let t = dir.path().join("t.ggm");
    let tt = dir.path().join("tt.ggm");
    let stats = TransposeCommand::new().run(&src, &t).unwrap();
    assert_eq!(stats.blocks, 2);
    TransposeCommand::new().run(&t, &tt).unwrap();

    let transposed = read_matrix::<i32>(&t);
    assert_eq!(transposed[1][30][16], data[1][16][30]);
    assert_eq!(read_matrix::<i32>(&tt), data);
}

#[test]
fn test_transpose_involution_many_blocks() {
    let dir = tempdir().unwrap();
    let info = MatrixInfo::new(1, 40, 57);
    let data = random_matrix(2, info);
    let src = dir.path().join("m.ggm");
    write_matrix(&src, info, &data);

    // Budget for 5 destination lines of 40 i32 each, then of 57.
    let t = dir.path().join("t.ggm");
    let tt = dir.path().join("tt.ggm");
    let stats = TransposeCommand::new()
        .with_budget(5 * 40 * 4)
        .run(&src, &t)
        .unwrap();
    assert_eq!(stats.block_width, 5);
    assert_eq!(stats.blocks, 12);
    TransposeCommand::new()
        .with_budget(5 * 57 * 4)
        .run(&t, &tt)
        .unwrap();
    assert_eq!(read_matrix::<i32>(&tt), data);
}

#[test]
fn test_transpose_budget_below_one_line() {
    let dir = tempdir().unwrap();
    let info = MatrixInfo::new(1, 9, 4);
    let data = random_matrix(3, info);
    let src = dir.path().join("m.ggm");
    write_matrix(&src, info, &data);

    let t = dir.path().join("t.ggm");
    let stats = TransposeCommand::new().with_budget(1).run(&src, &t).unwrap();
    assert_eq!(stats.block_width, 1);
    assert_eq!(stats.blocks, 4);
    assert_eq!(read_matrix::<i32>(&t)[0][3][8], data[0][8][3]);
}

#[test]
fn test_transpose_every_variant_and_kind() {
    let dir = tempdir().unwrap();
    let rows = vec![vec![vec![0.5f64, -1.25, 3.0], vec![4.0, 5.5, -6.0]]];
    for kind in [ElementKind::Float32, ElementKind::Float64] {
        let info = MatrixInfo::new(1, 2, 3)
            .with_kind(kind)
            .with_variant(StorageVariant::Raw);
        let src = dir.path().join(format!("{}.ggm", kind));
        write_matrix(&src, info, &rows);
        let t = dir.path().join(format!("{}_t.ggm", kind));
        TransposeCommand::new()
            .with_variant(StorageVariant::Raw)
            .run(&src, &t)
            .unwrap();
        let back = read_matrix::<f64>(&t);
        assert_eq!(back[0][2], vec![3.0, -6.0]);
    }

    let info = MatrixInfo::new(1, 30, 20);
    let data = random_matrix(4, info);
    for variant in [
        StorageVariant::Raw,
        StorageVariant::LineCompressedV1,
        StorageVariant::LineCompressedV2,
    ] {
        let src = dir.path().join(format!("{}.ggm", variant));
        write_matrix(&src, info.with_variant(variant), &data);
        let t = dir.path().join(format!("{}_t.ggm", variant));
        let tt = dir.path().join(format!("{}_tt.ggm", variant));
        TransposeCommand::new().with_variant(variant).run(&src, &t).unwrap();
        TransposeCommand::new().with_variant(variant).run(&t, &tt).unwrap();
        assert_eq!(read_matrix::<i32>(&tt), data, "variant {}", variant);
    }
}

#[test]
#[serial]
fn test_transpose_uses_configured_variant() {
    let dir = tempdir().unwrap();
    let info = MatrixInfo::new(1, 3, 3);
    let src = dir.path().join("m.ggm");
    write_matrix(&src, info, &random_matrix(5, info));

    config::set_default_variant(StorageVariant::LineCompressedV1);
    let t = dir.path().join("t.ggm");
    let result = TransposeCommand::new().run(&src, &t);
    config::reset_default_variant();
    result.unwrap();

    let h = MatrixHandle::open(&t).unwrap();
    assert_eq!(h.info().variant, StorageVariant::LineCompressedV1);
}

#[test]
#[serial]
fn test_float_transpose_involution_with_default_variant() {
    let dir = tempdir().unwrap();
    let data = vec![vec![vec![0.5f32, -1.25, 3.0], vec![4.0, 5.5, -6.0]]];
    for (kind, variant) in [
        (ElementKind::Float32, StorageVariant::Raw),
        (ElementKind::Float64, StorageVariant::Raw),
    ] {
        let info = MatrixInfo::new(1, 2, 3).with_kind(kind).with_variant(variant);
        let src = dir.path().join(format!("{}.ggm", kind));
        let t = dir.path().join(format!("{}_t.ggm", kind));
        let tt = dir.path().join(format!("{}_tt.ggm", kind));
        write_matrix(&src, info, &data);

        let (src, t, tt) = (
            src.to_str().unwrap(),
            t.to_str().unwrap(),
            tt.to_str().unwrap(),
        );
        assert_eq!(ggmat::transpose(src, t), ErrorCode::Success);
        assert_eq!(ggmat::transpose(t, tt), ErrorCode::Success);

        let h = MatrixHandle::open(t).unwrap();
        assert_eq!(h.info().kind, kind);
        assert_eq!(h.info().variant, StorageVariant::Raw);
        assert_eq!(read_matrix::<f32>(Path::new(tt)), data);
    }
}

#[test]
fn test_transpose_matches_column_cache_conversion() {
    let dir = tempdir().unwrap();
    let info = MatrixInfo::new(2, 25, 13);
    let src = dir.path().join("m.ggm");
    write_matrix(&src, info, &random_matrix(6, info));

    let a = dir.path().join("a.ggm");
    let b = dir.path().join("b.ggm");
    TransposeCommand::new().run(&src, &a).unwrap();
    ConvertCommand::new()
        .with_variant(StorageVariant::LineCompressedV2)
        .with_transpose(true)
        .run(&src, &b)
        .unwrap();
    assert_eq!(read_matrix::<i32>(&a), read_matrix::<i32>(&b));
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn test_projection_conservation() {
    let dir = tempdir().unwrap();
    for (seed, levels) in [(10u64, 1u32), (11, 2)] {
        let info = MatrixInfo::new(levels, 23, 19);
        let data: Vec<Vec<Vec<i32>>> = random_matrix(seed, info)
            .into_iter()
            .map(|level| {
                level
                    .into_iter()
                    .map(|row| row.into_iter().map(i32::abs).collect())
                    .collect()
            })
            .collect();
        let src = dir.path().join(format!("m{}.ggm", seed));
        write_matrix(&src, info, &data);

        let rows = dir.path().join(format!("rows{}.ggm", seed));
        let cols = dir.path().join(format!("cols{}.ggm", seed));
        let stats = ProjectCommand::new()
            .run(&src, Some(rows.as_path()), Some(cols.as_path()))
            .unwrap();

        let total = grand_total(&src);
        assert_eq!(stats.total, total);
        assert_eq!(grand_total(&rows), total);
        assert_eq!(grand_total(&cols), total);

        let row_info = *MatrixHandle::open(&rows).unwrap().info();
        let col_info = *MatrixHandle::open(&cols).unwrap().info();
        assert_eq!((row_info.levels, row_info.lines, row_info.columns), (levels, 1, 19));
        assert_eq!((col_info.levels, col_info.lines, col_info.columns), (levels, 1, 23));
    }
}

#[test]
fn test_projection_per_level_values() {
    let dir = tempdir().unwrap();
    let info = MatrixInfo::new(2, 2, 3);
    let data = vec![
        vec![vec![1, 2, 3], vec![4, 5, 6]],
        vec![vec![0, 0, 1], vec![1, 0, 0]],
    ];
    let src = dir.path().join("m.ggm");
    write_matrix(&src, info, &data);

    let rows = dir.path().join("rows.ggm");
    let cols = dir.path().join("cols.ggm");
    ProjectCommand::new()
        .run(&src, Some(rows.as_path()), Some(cols.as_path()))
        .unwrap();
    assert_eq!(
        read_matrix::<i32>(&rows),
        vec![vec![vec![5, 7, 9]], vec![vec![1, 0, 1]]]
    );
    assert_eq!(
        read_matrix::<i32>(&cols),
        vec![vec![vec![6, 15]], vec![vec![1, 1]]]
    );
}

#[test]
fn test_projection_of_three_levels_fails() {
    let dir = tempdir().unwrap();
    let info = MatrixInfo::new(3, 4, 4);
    let src = dir.path().join("m.ggm");
    write_matrix(&src, info, &random_matrix(12, info));

    let rows = dir.path().join("rows.ggm");
    let err = ProjectCommand::new()
        .run(&src, Some(rows.as_path()), None)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProjectFailed);
    assert!(!rows.exists());
}

#[test]
#[serial]
fn test_float_projection_with_default_variant() {
    let dir = tempdir().unwrap();
    let info = MatrixInfo::new(1, 2, 3)
        .with_kind(ElementKind::Float32)
        .with_variant(StorageVariant::Raw);
    let src = dir.path().join("f.ggm");
    write_matrix(&src, info, &[vec![vec![0.5f32, 1.0, 2.0], vec![0.25, 0.0, 1.0]]]);

    let rows = dir.path().join("rows.ggm");
    let code = ggmat::project(src.to_str().unwrap(), rows.to_str().unwrap(), "");
    assert_eq!(code, ErrorCode::Success);
    assert_eq!(read_matrix::<f32>(&rows), vec![vec![vec![0.75, 1.0, 3.0]]]);
}

#[test]
fn test_projection_of_float_matrix() {
    let dir = tempdir().unwrap();
    let info = MatrixInfo::new(1, 2, 2)
        .with_kind(ElementKind::Float32)
        .with_variant(StorageVariant::Raw);
    let src = dir.path().join("f.ggm");
    write_matrix(&src, info, &[vec![vec![0.5f32, 0.25], vec![1.0, 2.0]]]);

    let cols = dir.path().join("cols.ggm");
    ProjectCommand::new()
        .with_variant(StorageVariant::Raw)
        .run(&src, None, Some(cols.as_path()))
        .unwrap();
    let h = MatrixHandle::open(&cols).unwrap();
    assert_eq!(h.info().kind, ElementKind::Float32);
    assert_eq!(read_matrix::<f32>(&cols), vec![vec![vec![0.75, 3.0]]]);
}

#[test]
fn test_failed_line_read_aborts_projection() {
    let dir = tempdir().unwrap();
    let info = MatrixInfo::new(1, 6, 5).with_variant(StorageVariant::LineCompressedV2);
    let src = dir.path().join("bad.ggm");
    write_matrix(&src, info, &random_matrix(13, info));
    corrupt_last_line(&src);

    let rows = dir.path().join("rows.ggm");
    let cols = dir.path().join("cols.ggm");
    let err = ProjectCommand::new()
        .run(&src, Some(rows.as_path()), Some(cols.as_path()))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProjectFailed);
}
