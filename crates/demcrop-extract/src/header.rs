//! Arc/Info ASCII grid header parsing.
//!
//! A grid file starts with five `<key> <value>` lines in a fixed order:
//!
//! ```text
//! ncols        1000
//! nrows        1000
//! xllcorner    899987.5
//! yllcorner    6350012.5
//! cellsize     25
//! ```
//!
//! An optional `NODATA_value` line may follow. The value of each line is its
//! last whitespace-separated field.

use crate::{ExtractError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::iter::Peekable;
use std::path::Path;

/// Geometry of one grid tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileHeader {
    /// Number of columns.
    pub ncols: usize,
    /// Number of data rows.
    pub nrows: usize,
    /// X of the lower-left corner, projected meters.
    pub xllcorner: f64,
    /// Y of the lower-left corner, projected meters.
    pub yllcorner: f64,
    /// Cell side length, projected meters.
    pub cellsize: f64,
    /// Value marking missing cells, if the header declares one.
    pub nodata: Option<f64>,
}

impl TileHeader {
    /// Read only the header of the grid file at `path`.
    ///
    /// The file is closed again before returning.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut lines = BufReader::new(file).lines().peekable();
        Self::read_from(&mut lines, path)
    }

    /// Parse the header from the start of `lines`.
    ///
    /// On success the iterator is positioned on the first data row.
    pub fn read_from<R: BufRead>(lines: &mut Peekable<Lines<R>>, path: &Path) -> Result<Self> {
        let ncols = parse_entry(lines, path, "ncols")?;
        let nrows = parse_entry(lines, path, "nrows")?;
        let xllcorner = parse_entry(lines, path, "xllcorner")?;
        let yllcorner = parse_entry(lines, path, "yllcorner")?;
        let cellsize: f64 = parse_entry(lines, path, "cellsize")?;

        let has_nodata = matches!(lines.peek(), Some(Ok(line)) if is_key(line, "nodata_value"));
        let nodata = if has_nodata {
            Some(parse_entry(lines, path, "nodata_value")?)
        } else {
            None
        };

        if !(cellsize.is_finite() && cellsize > 0.0) {
            return Err(invalid(path, format!("cellsize must be positive, got {cellsize}")));
        }

        Ok(Self {
            ncols,
            nrows,
            xllcorner,
            yllcorner,
            cellsize,
            nodata,
        })
    }

    /// X extent of the tile.
    pub fn x_range(&self) -> (f64, f64) {
        (
            self.xllcorner,
            self.xllcorner + self.cellsize * self.ncols as f64,
        )
    }

    /// Y extent of the tile.
    pub fn y_range(&self) -> (f64, f64) {
        (
            self.yllcorner,
            self.yllcorner + self.cellsize * self.nrows as f64,
        )
    }
}

fn is_key(line: &str, key: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|token| token.eq_ignore_ascii_case(key))
}

fn parse_entry<R, T>(lines: &mut Peekable<Lines<R>>, path: &Path, key: &str) -> Result<T>
where
    R: BufRead,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let line = lines
        .next()
        .transpose()?
        .ok_or_else(|| invalid(path, format!("missing `{key}` line")))?;

    if !is_key(&line, key) {
        return Err(invalid(path, format!("expected `{key}`, found `{}`", line.trim())));
    }

    let value = line
        .split_whitespace()
        .last()
        .ok_or_else(|| invalid(path, format!("`{key}` has no value")))?;

    value
        .parse()
        .map_err(|e| invalid(path, format!("bad `{key}` value `{value}`: {e}")))
}

fn invalid(path: &Path, reason: String) -> ExtractError {
    ExtractError::InvalidHeader {
        path: path.to_path_buf(),
        reason,
    }
}
