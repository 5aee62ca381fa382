//! End-to-end extraction tests on synthetic tiles written to a temp dir.

use demcrop_extract::{
    extract_grid, extract_hgt, BoundingBoxResolver, BoundsPolicy, CellWindow, ExtractConfig,
    ExtractError, GeoBoundingBox, Lambert93Resolver, ProjectedBoundingBox, TileHeader,
    HGT_FILE_LEN, HGT_SIZE,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CELLSIZE: f64 = 250.0;

/// Grenoble area, well inside the Lambert-93 domain.
fn grenoble() -> GeoBoundingBox {
    GeoBoundingBox::new(45.10, 5.70, 45.12, 5.73).unwrap()
}

/// Elevation at a lattice point, stable across tile boundaries.
fn elevation(x: f64, y: f64) -> f64 {
    ((x / CELLSIZE) as i64 % 1000 + (y / CELLSIZE) as i64 % 1000) as f64
}

fn write_grid(dir: &Path, name: &str, xll: f64, yll: f64, ncols: usize, nrows: usize) -> PathBuf {
    let mut text = format!(
        "ncols {ncols}\nnrows {nrows}\nxllcorner {xll}\nyllcorner {yll}\ncellsize {CELLSIZE}\n"
    );
    for i in 0..nrows {
        let y = yll + (nrows - i) as f64 * CELLSIZE;
        let row: Vec<String> = (0..ncols)
            .map(|j| elevation(xll + j as f64 * CELLSIZE, y).to_string())
            .collect();
        text.push_str(&row.join(" "));
        text.push('\n');
    }
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

/// Tile origin and size covering `bbox` with a margin on every side.
fn covering_tile(bbox: &ProjectedBoundingBox) -> (f64, f64, usize, usize) {
    let xll = (bbox.x_min / 1000.0).floor() * 1000.0 - 1000.0;
    let yll = (bbox.y_min / 1000.0).floor() * 1000.0 - 1000.0;
    let ncols = ((bbox.x_max - xll) / CELLSIZE).ceil() as usize + 8;
    let nrows = ((bbox.y_max - yll) / CELLSIZE).ceil() as usize + 8;
    // Even column count so the tile can be split in two halves
    (xll, yll, ncols + ncols % 2, nrows)
}

fn data_lines(out: &[u8]) -> Vec<String> {
    let text = String::from_utf8(out.to_vec()).unwrap();
    let mut lines = text.split('\n');
    assert_eq!(lines.next(), Some("X\tY\tZ"));
    lines.map(str::to_string).collect()
}

fn parse_line(line: &str) -> (f64, f64, f64) {
    let fields: Vec<f64> = line.split('\t').map(|f| f.parse().unwrap()).collect();
    assert_eq!(fields.len(), 3, "bad line {line:?}");
    (fields[0], fields[1], fields[2])
}

#[test]
fn test_grid_extraction_reads_covering_tile() {
    let dir = TempDir::new().unwrap();
    let geo = grenoble();
    let bbox = Lambert93Resolver::new().unwrap().resolve(&geo).unwrap();
    let (xll, yll, ncols, nrows) = covering_tile(&bbox);
    let tile = write_grid(dir.path(), "tile.asc", xll, yll, ncols, nrows);
    write_grid(dir.path(), "far_away.asc", xll + 100_000.0, yll, 4, 4);
    fs::write(dir.path().join("tile.prj"), "LAMBERT93").unwrap();

    let mut out = Vec::<u8>::new();
    let report = extract_grid(dir.path(), &geo, &ExtractConfig::default(), &mut out).unwrap();

    assert_eq!(report.tiles, vec![tile.clone()]);
    let expected = CellWindow::for_bbox(&TileHeader::from_file(&tile).unwrap(), &bbox).len();
    assert!(expected > 0);
    assert_eq!(report.samples, expected);

    let lines = data_lines(&out);
    assert_eq!(lines.len(), expected);

    let mut previous_y = f64::INFINITY;
    for line in &lines {
        let (x, y, z) = parse_line(line);
        assert!(x >= bbox.x_min - CELLSIZE && x < bbox.x_max, "x {x} outside box");
        assert!(y > bbox.y_min && y <= bbox.y_max + CELLSIZE, "y {y} outside box");
        assert!(y <= previous_y, "rows must run north to south");
        previous_y = y;
        assert_eq!(z, elevation(x, y));
    }
}

#[test]
fn test_grid_extraction_is_independent_of_tiling() {
    let geo = grenoble();
    let bbox = Lambert93Resolver::new().unwrap().resolve(&geo).unwrap();
    let (xll, yll, ncols, nrows) = covering_tile(&bbox);

    let whole = TempDir::new().unwrap();
    write_grid(whole.path(), "whole.asc", xll, yll, ncols, nrows);

    let split = TempDir::new().unwrap();
    let half = ncols / 2;
    write_grid(split.path(), "west.asc", xll, yll, half, nrows);
    write_grid(split.path(), "east.asc", xll + half as f64 * CELLSIZE, yll, half, nrows);

    let config = ExtractConfig::default();
    let mut whole_out = Vec::<u8>::new();
    extract_grid(whole.path(), &geo, &config, &mut whole_out).unwrap();
    let mut split_out = Vec::<u8>::new();
    let report = extract_grid(split.path(), &geo, &config, &mut split_out).unwrap();

    let whole_set: BTreeSet<String> = data_lines(&whole_out).into_iter().collect();
    let split_lines = data_lines(&split_out);
    let split_set: BTreeSet<String> = split_lines.iter().cloned().collect();

    assert_eq!(split_lines.len(), split_set.len(), "duplicate samples");
    assert_eq!(whole_set, split_set);
    assert!(!report.tiles.is_empty());
}

#[test]
fn test_grid_no_match_writes_header_only() {
    let dir = TempDir::new().unwrap();
    write_grid(dir.path(), "elsewhere.asc", 0.0, 0.0, 4, 4);

    let mut out = Vec::<u8>::new();
    let report = extract_grid(dir.path(), &grenoble(), &ExtractConfig::default(), &mut out).unwrap();

    assert!(report.no_matching_data());
    assert_eq!(report.samples, 0);
    assert_eq!(out, b"X\tY\tZ");
}

#[test]
fn test_grid_missing_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    let err = extract_grid(&missing, &grenoble(), &ExtractConfig::default(), &mut Vec::<u8>::new())
        .unwrap_err();
    assert!(matches!(err, ExtractError::Io(_)));
}

fn encoded(row: i64, col: i64) -> i16 {
    ((row * 7 + col) % 30_000) as i16
}

fn write_hgt(dir: &Path, name: &str) -> PathBuf {
    let mut bytes = Vec::with_capacity(HGT_FILE_LEN as usize);
    for row in 1..=HGT_SIZE as i64 {
        for col in 1..=HGT_SIZE as i64 {
            bytes.extend_from_slice(&encoded(row, col).to_be_bytes());
        }
    }
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_hgt_extraction() {
    let dir = TempDir::new().unwrap();
    let path = write_hgt(dir.path(), "N45E006.hgt");
    let geo = GeoBoundingBox::new(45.5, 6.2, 45.501, 6.201).unwrap();

    let mut out = Vec::<u8>::new();
    let report = extract_hgt(&path, &geo, &ExtractConfig::default(), &mut out).unwrap();

    assert_eq!(report.samples, 4);
    assert_eq!(report.tiles, vec![path]);
    let expected = format!(
        "X\tY\tZ\n240\t601\t{}\n241\t601\t{}\n240\t600\t{}\n241\t600\t{}",
        encoded(601, 240),
        encoded(601, 241),
        encoded(600, 240),
        encoded(600, 241),
    );
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn test_hgt_swapped_corners_give_same_output() {
    let dir = TempDir::new().unwrap();
    let path = write_hgt(dir.path(), "N45E006.hgt");
    let config = ExtractConfig::default();

    let mut sorted = Vec::<u8>::new();
    extract_hgt(
        &path,
        &GeoBoundingBox::new(45.3, 6.4, 45.31, 6.42).unwrap(),
        &config,
        &mut sorted,
    )
    .unwrap();

    let mut swapped = Vec::<u8>::new();
    extract_hgt(
        &path,
        &GeoBoundingBox::new(45.31, 6.42, 45.3, 6.4).unwrap(),
        &config,
        &mut swapped,
    )
    .unwrap();

    assert_eq!(sorted, swapped);
}

#[test]
fn test_hgt_box_outside_named_tile_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_hgt(dir.path(), "N45E006.hgt");
    let geo = GeoBoundingBox::new(47.5, 6.2, 47.6, 6.3).unwrap();

    let err = extract_hgt(&path, &geo, &ExtractConfig::default(), &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, ExtractError::OutsideTile { .. }));

    // Without the name check only the fractional degrees matter
    let config = ExtractConfig {
        check_hgt_filename: false,
        ..ExtractConfig::default()
    };
    let report = extract_hgt(&path, &geo, &config, &mut Vec::<u8>::new()).unwrap();
    assert!(report.samples > 0);
}

#[test]
fn test_hgt_western_edge_follows_bounds_policy() {
    let dir = TempDir::new().unwrap();
    let path = write_hgt(dir.path(), "N45E006.hgt");
    // Longitude 6.0 maps to column 0, one left of the first pixel
    let geo = GeoBoundingBox::new(45.5, 6.0, 45.5, 6.001).unwrap();

    let err = extract_hgt(&path, &geo, &ExtractConfig::default(), &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, ExtractError::OutOfTileBounds { col_min: 0, .. }));

    let config = ExtractConfig {
        raster_bounds: BoundsPolicy::Clamp,
        ..ExtractConfig::default()
    };
    let mut out = Vec::<u8>::new();
    let report = extract_hgt(&path, &geo, &config, &mut out).unwrap();
    assert_eq!(report.samples, 1);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!("X\tY\tZ\n1\t601\t{}", encoded(601, 1))
    );
}

#[test]
fn test_hgt_box_on_north_edge_reads_top_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_hgt(dir.path(), "N45E006.hgt");
    let geo = GeoBoundingBox::new(45.99, 6.5, 46.0, 6.501).unwrap();

    let mut out = Vec::<u8>::new();
    let report = extract_hgt(&path, &geo, &ExtractConfig::default(), &mut out).unwrap();

    assert_eq!((report.bbox.y_min, report.bbox.y_max), (1.0, 13.0));
    assert_eq!(report.samples, 13 * 2);
    let lines = data_lines(&out);
    assert_eq!(lines.first().unwrap(), &format!("600\t13\t{}", encoded(13, 600)));
    assert_eq!(lines.last().unwrap(), &format!("601\t1\t{}", encoded(1, 601)));
}

#[test]
fn test_hgt_box_on_east_edge_reads_eastern_columns() {
    let dir = TempDir::new().unwrap();
    let path = write_hgt(dir.path(), "N45E006.hgt");
    let geo = GeoBoundingBox::new(45.5, 6.5, 45.5, 7.0).unwrap();

    for policy in [BoundsPolicy::Reject, BoundsPolicy::Clamp] {
        let config = ExtractConfig {
            raster_bounds: policy,
            ..ExtractConfig::default()
        };
        let mut out = Vec::<u8>::new();
        let report = extract_hgt(&path, &geo, &config, &mut out).unwrap();

        assert_eq!((report.bbox.x_min, report.bbox.x_max), (600.0, 1200.0));
        assert_eq!(report.samples, 601);
        let lines = data_lines(&out);
        assert!(lines.first().unwrap().starts_with("600\t601\t"));
        assert!(lines.last().unwrap().starts_with("1200\t601\t"));
    }
}

#[test]
fn test_hgt_box_crossing_tiles_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_hgt(dir.path(), "N45E006.hgt");
    let geo = GeoBoundingBox::new(45.5, 6.5, 46.5, 6.6).unwrap();

    let err = extract_hgt(&path, &geo, &ExtractConfig::default(), &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, ExtractError::OutsideTile { .. }));

    let config = ExtractConfig {
        check_hgt_filename: false,
        ..ExtractConfig::default()
    };
    let err = extract_hgt(&path, &geo, &config, &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, ExtractError::OutOfTileBounds { row_min: -599, .. }));
}

#[test]
fn test_hgt_truncated_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("N45E006.hgt");
    fs::write(&path, vec![0u8; 1024]).unwrap();
    let geo = GeoBoundingBox::new(45.5, 6.2, 45.501, 6.201).unwrap();

    let err = extract_hgt(&path, &geo, &ExtractConfig::default(), &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, ExtractError::InvalidRasterSize { actual: 1024, .. }));
}
