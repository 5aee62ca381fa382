//! Error types for the extraction crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting elevation data.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// I/O error reading a source file or directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A bounding box coordinate is NaN or infinite.
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// The grid header is missing a line or holds an unparseable value.
    #[error("Invalid grid header in {path}: {reason}")]
    InvalidHeader {
        /// File being parsed.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A data row holds a value that is not a number, or too few values.
    #[error("Invalid data in {path} at row {row}: {reason}")]
    InvalidData {
        /// File being parsed.
        path: PathBuf,
        /// Zero-based data row (header lines not counted).
        row: usize,
        /// What went wrong.
        reason: String,
    },

    /// The file ended before the requested window was fully read.
    #[error("{path} ends after {found} data rows, window needs {expected}")]
    ShortFile {
        /// File being parsed.
        path: PathBuf,
        /// Number of data rows the window requires.
        expected: usize,
        /// Number of data rows actually present.
        found: usize,
    },

    /// Raster file does not have the fixed SRTM3 size.
    #[error("Raster {path} is {actual} bytes, expected {expected}")]
    InvalidRasterSize {
        /// File being read.
        path: PathBuf,
        /// Size the raster layout requires.
        expected: u64,
        /// Size found on disk.
        actual: u64,
    },

    /// Pixel window reaches outside the 1..=1201 raster extent.
    #[error("Window rows {row_min}..={row_max}, columns {col_min}..={col_max} exceeds tile extent 1..={size}")]
    OutOfTileBounds {
        /// First requested row.
        row_min: i64,
        /// Last requested row.
        row_max: i64,
        /// First requested column.
        col_min: i64,
        /// Last requested column.
        col_max: i64,
        /// Raster side length.
        size: i64,
    },

    /// Query box lies outside the tile named by the raster file name.
    #[error("Bounding box ({lat_min}, {lng_min})-({lat_max}, {lng_max}) is outside tile {tile} ({min_lat}-{max_lat}, {min_lon}-{max_lon})")]
    OutsideTile {
        /// Tile file name.
        tile: String,
        /// Requested southern latitude.
        lat_min: f64,
        /// Requested western longitude.
        lng_min: f64,
        /// Requested northern latitude.
        lat_max: f64,
        /// Requested eastern longitude.
        lng_max: f64,
        /// Tile minimum latitude.
        min_lat: f64,
        /// Tile maximum latitude.
        max_lat: f64,
        /// Tile minimum longitude.
        min_lon: f64,
        /// Tile maximum longitude.
        max_lon: f64,
    },

    /// Raster file name does not follow the `N45E006.hgt` convention.
    #[error("Invalid tile filename: {0}")]
    InvalidFilename(String),

    /// Coordinate transform could not be built or applied.
    #[error("Projection error: {0}")]
    Projection(String),

    /// Configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    Config(#[from] serde_yaml::Error),
}
