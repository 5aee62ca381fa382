//! SRTM3 `.hgt` raster tiles.
//!
//! An SRTM3 tile covers 1x1 degree with 1201x1201 samples on a 3 arc-second
//! pitch. Samples are big-endian `i16`, stored row by row from the northern
//! edge. There is no header; the tile origin is encoded in the file name,
//! e.g. `N45E006.hgt` covers latitude 45°N to 46°N and longitude 6°E to 7°E.

use crate::bbox::{GeoBoundingBox, ProjectedBoundingBox, Sample};
use crate::config::BoundsPolicy;
use crate::{ExtractError, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Side length of an SRTM3 tile in samples.
pub const HGT_SIZE: usize = 1201;

/// Samples per degree (3600 arc-seconds / 3 arc-seconds).
pub const HGT_SAMPLES_PER_DEGREE: f64 = 3600.0 / 3.0;

/// Size of an SRTM3 file in bytes.
pub const HGT_FILE_LEN: u64 = (HGT_SIZE * HGT_SIZE * 2) as u64;

/// Value SRTM uses for voids.
pub const HGT_VOID: i16 = i16::MIN;

/// Geographic bounds of a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    /// Minimum latitude (south edge).
    pub min_lat: f64,
    /// Maximum latitude (north edge).
    pub max_lat: f64,
    /// Minimum longitude (west edge).
    pub min_lon: f64,
    /// Maximum longitude (east edge).
    pub max_lon: f64,
}

impl TileBounds {
    /// Check if a coordinate is within the bounds.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Check if the whole box is within the bounds.
    pub fn contains_box(&self, bbox: &GeoBoundingBox) -> bool {
        self.contains(bbox.lat_min, bbox.lng_min) && self.contains(bbox.lat_max, bbox.lng_max)
    }

    /// Parse tile bounds from an SRTM file name like `N45E006.hgt`.
    ///
    /// The name gives the south-west corner of the tile.
    pub fn from_filename(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ExtractError::InvalidFilename(path.display().to_string()))?;
        let invalid = || ExtractError::InvalidFilename(filename.to_string());

        let stem = filename.split('.').next().unwrap_or_default().to_ascii_uppercase();
        if stem.len() != 7 || !stem.is_ascii() {
            return Err(invalid());
        }

        let lat_sign = match &stem[0..1] {
            "N" => 1.0,
            "S" => -1.0,
            _ => return Err(invalid()),
        };
        let lon_sign = match &stem[3..4] {
            "E" => 1.0,
            "W" => -1.0,
            _ => return Err(invalid()),
        };
        let lat: u32 = stem[1..3].parse().map_err(|_| invalid())?;
        let lon: u32 = stem[4..7].parse().map_err(|_| invalid())?;

        let min_lat = lat_sign * f64::from(lat);
        let min_lon = lon_sign * f64::from(lon);
        Ok(Self {
            min_lat,
            max_lat: min_lat + 1.0,
            min_lon,
            max_lon: min_lon + 1.0,
        })
    }
}

/// Inclusive 1-based pixel window `[row_min, row_max] x [col_min, col_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    /// Northernmost row.
    pub row_min: i64,
    /// Southernmost row.
    pub row_max: i64,
    /// Westernmost column.
    pub col_min: i64,
    /// Easternmost column.
    pub col_max: i64,
}

impl PixelWindow {
    /// Window for a box resolved into pixel coordinates (`x` = column,
    /// `y` = row), checked against the tile extent according to `policy`.
    pub fn from_bbox(bbox: &ProjectedBoundingBox, policy: BoundsPolicy) -> Result<Self> {
        let window = Self {
            row_min: bbox.y_min.round() as i64,
            row_max: bbox.y_max.round() as i64,
            col_min: bbox.x_min.round() as i64,
            col_max: bbox.x_max.round() as i64,
        };

        let size = HGT_SIZE as i64;
        let inside = |v: i64| (1..=size).contains(&v);
        if [window.row_min, window.row_max, window.col_min, window.col_max]
            .into_iter()
            .all(inside)
        {
            return Ok(window);
        }

        match policy {
            BoundsPolicy::Reject => Err(ExtractError::OutOfTileBounds {
                row_min: window.row_min,
                row_max: window.row_max,
                col_min: window.col_min,
                col_max: window.col_max,
                size,
            }),
            BoundsPolicy::Clamp => Ok(Self {
                row_min: window.row_min.clamp(1, size),
                row_max: window.row_max.clamp(1, size),
                col_min: window.col_min.clamp(1, size),
                col_max: window.col_max.clamp(1, size),
            }),
        }
    }

    /// Number of pixels in the window.
    pub fn len(&self) -> usize {
        let rows = (self.row_max - self.row_min + 1).max(0) as usize;
        let cols = (self.col_max - self.col_min + 1).max(0) as usize;
        rows * cols
    }

    /// True if the window holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Byte offset of the sample at 1-based `(row, col)`.
pub fn sample_offset(row: i64, col: i64) -> u64 {
    (((row - 1) * HGT_SIZE as i64 + (col - 1)) * 2) as u64
}

/// An open SRTM3 tile.
#[derive(Debug)]
pub struct HgtTile<R> {
    reader: R,
    path: PathBuf,
}

impl HgtTile<BufReader<File>> {
    /// Open an `.hgt` file and check its size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), path)
    }
}

impl<R: Read + Seek> HgtTile<R> {
    /// Wrap `reader`, checking it holds exactly one SRTM3 tile.
    pub fn from_reader(mut reader: R, path: &Path) -> Result<Self> {
        let actual = reader.seek(SeekFrom::End(0))?;
        if actual != HGT_FILE_LEN {
            return Err(ExtractError::InvalidRasterSize {
                path: path.to_path_buf(),
                expected: HGT_FILE_LEN,
                actual,
            });
        }
        Ok(Self {
            reader,
            path: path.to_path_buf(),
        })
    }

    /// Read a single sample at 1-based `(row, col)`.
    pub fn read_sample(&mut self, row: i64, col: i64) -> Result<i16> {
        self.reader.seek(SeekFrom::Start(sample_offset(row, col)))?;
        let mut buf = [0u8; 2];
        self.reader.read_exact(&mut buf)?;
        Ok(i16::from_be_bytes(buf))
    }

    /// Lazily read the samples in `window`.
    ///
    /// Rows run from `row_max` (south) up to `row_min` (north), columns
    /// west to east. When `drop_void` is set, SRTM voids are skipped.
    pub fn samples(self, window: PixelWindow, drop_void: bool) -> HgtSamples<R> {
        debug!(
            path = %self.path.display(),
            rows = ?(window.row_min..=window.row_max),
            cols = ?(window.col_min..=window.col_max),
            "Reading raster window"
        );
        HgtSamples {
            tile: self,
            window,
            drop_void,
            row: window.row_max,
            col: window.col_min,
            buffer: Vec::new(),
            done: window.is_empty(),
        }
    }
}

/// Iterator over the samples of one raster window.
#[derive(Debug)]
pub struct HgtSamples<R> {
    tile: HgtTile<R>,
    window: PixelWindow,
    drop_void: bool,
    row: i64,
    col: i64,
    buffer: Vec<u8>,
    done: bool,
}

impl<R: Read + Seek> HgtSamples<R> {
    /// Read the window's span of the current row into the buffer.
    fn load_row(&mut self) -> Result<()> {
        let width = (self.window.col_max - self.window.col_min + 1) as usize;
        self.buffer.resize(width * 2, 0);
        self.tile
            .reader
            .seek(SeekFrom::Start(sample_offset(self.row, self.window.col_min)))?;
        self.tile.reader.read_exact(&mut self.buffer)?;
        Ok(())
    }
}

impl<R: Read + Seek> Iterator for HgtSamples<R> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.row < self.window.row_min {
                self.done = true;
                return None;
            }

            if self.col == self.window.col_min {
                if let Err(e) = self.load_row() {
                    self.done = true;
                    return Some(Err(e));
                }
            }

            let (row, col) = (self.row, self.col);
            let index = ((col - self.window.col_min) * 2) as usize;
            let value = i16::from_be_bytes([self.buffer[index], self.buffer[index + 1]]);

            if col == self.window.col_max {
                self.col = self.window.col_min;
                self.row -= 1;
            } else {
                self.col += 1;
            }

            if self.drop_void && value == HGT_VOID {
                continue;
            }
            return Some(Ok(Sample {
                x: col as f64,
                y: row as f64,
                z: f64::from(value),
            }));
        }
    }
}
