//! Windowed reads from Arc/Info ASCII grid tiles.
//!
//! Rows are stored north to south starting at the tile's northern edge, so
//! a projected Y range maps to rows in reverse. Columns run west to east from
//! `xllcorner`.

use crate::bbox::{ProjectedBoundingBox, Sample};
use crate::header::TileHeader;
use crate::{ExtractError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Half-open range of cell indices `[row_start, row_end) x [col_start, col_end)`.
///
/// Always lies inside the tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellWindow {
    /// First row (0 = northern edge).
    pub row_start: usize,
    /// One past the last row.
    pub row_end: usize,
    /// First column (0 = western edge).
    pub col_start: usize,
    /// One past the last column.
    pub col_end: usize,
}

impl CellWindow {
    /// Cells of the tile covered by `bbox`.
    ///
    /// A box that does not overlap the tile footprint with positive area
    /// gives an empty window.
    pub fn for_bbox(header: &TileHeader, bbox: &ProjectedBoundingBox) -> Self {
        if !bbox.overlaps(header.x_range(), header.y_range()) {
            return Self::empty();
        }

        let cellsize = header.cellsize;
        let nrows = header.nrows as f64;

        let col_min = ((bbox.x_min - header.xllcorner) / cellsize).floor();
        let col_max = ((bbox.x_max - header.xllcorner) / cellsize).ceil();
        // Row 0 is the northern edge, so the top of the box gives the first row
        let row_min = nrows - ((bbox.y_max - header.yllcorner) / cellsize).ceil();
        let row_max = nrows - ((bbox.y_min - header.yllcorner) / cellsize).floor();

        Self {
            row_start: clamp_index(row_min, header.nrows),
            row_end: clamp_index(row_max, header.nrows),
            col_start: clamp_index(col_min, header.ncols),
            col_end: clamp_index(col_max, header.ncols),
        }
    }

    fn empty() -> Self {
        Self {
            row_start: 0,
            row_end: 0,
            col_start: 0,
            col_end: 0,
        }
    }

    /// Number of rows in the window.
    pub fn rows(&self) -> usize {
        self.row_end.saturating_sub(self.row_start)
    }

    /// Number of columns in the window.
    pub fn cols(&self) -> usize {
        self.col_end.saturating_sub(self.col_start)
    }

    /// Number of cells in the window.
    pub fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    /// True if the window holds no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn clamp_index(value: f64, upper: usize) -> usize {
    value.clamp(0.0, upper as f64) as usize
}

/// A grid tile whose header has been read.
#[derive(Debug)]
pub struct GridTile<R: BufRead> {
    header: TileHeader,
    lines: Peekable<Lines<R>>,
    path: PathBuf,
}

impl GridTile<BufReader<File>> {
    /// Open a grid file and parse its header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), path)
    }
}

impl<R: BufRead> GridTile<R> {
    /// Parse the header from `reader`. `path` is used in error messages.
    pub fn from_reader(reader: R, path: &Path) -> Result<Self> {
        let mut lines = reader.lines().peekable();
        let header = TileHeader::read_from(&mut lines, path)?;
        Ok(Self {
            header,
            lines,
            path: path.to_path_buf(),
        })
    }

    /// Tile geometry.
    pub fn header(&self) -> &TileHeader {
        &self.header
    }

    /// Lazily read the samples of this tile covered by `bbox`.
    ///
    /// Samples come row by row from north to south, west to east within a
    /// row. When `drop_nodata` is set, cells equal to the header's
    /// `NODATA_value` are skipped.
    pub fn samples(self, bbox: &ProjectedBoundingBox, drop_nodata: bool) -> GridSamples<R> {
        let window = CellWindow::for_bbox(&self.header, bbox);
        debug!(
            path = %self.path.display(),
            rows = ?(window.row_start..window.row_end),
            cols = ?(window.col_start..window.col_end),
            "Reading grid window"
        );

        let nodata = if drop_nodata { self.header.nodata } else { None };
        GridSamples {
            header: self.header,
            lines: self.lines,
            path: self.path,
            window,
            nodata,
            next_row: 0,
            current: None,
            col: window.col_start,
            done: window.is_empty(),
        }
    }
}

/// Iterator over the samples of one grid window.
///
/// Stops reading the file after the last row of the window. After an error
/// the iterator is exhausted.
#[derive(Debug)]
pub struct GridSamples<R: BufRead> {
    header: TileHeader,
    lines: Peekable<Lines<R>>,
    path: PathBuf,
    window: CellWindow,
    nodata: Option<f64>,
    next_row: usize,
    current: Option<(usize, Vec<f64>)>,
    col: usize,
    done: bool,
}

impl<R: BufRead> GridSamples<R> {
    /// Window being read.
    pub fn window(&self) -> CellWindow {
        self.window
    }

    fn next_line(&mut self) -> Result<String> {
        let line = self.lines.next().transpose()?.ok_or(ExtractError::ShortFile {
            path: self.path.clone(),
            expected: self.window.row_end,
            found: self.next_row,
        })?;
        self.next_row += 1;
        Ok(line)
    }

    fn load_row(&mut self) -> Result<(usize, Vec<f64>)> {
        while self.next_row < self.window.row_start {
            self.next_line()?;
        }

        let row = self.next_row;
        let line = self.next_line()?;
        let values = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|e| ExtractError::InvalidData {
                    path: self.path.clone(),
                    row,
                    reason: format!("`{token}` is not a number: {e}"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if values.len() < self.window.col_end {
            return Err(ExtractError::InvalidData {
                path: self.path.clone(),
                row,
                reason: format!(
                    "{} values, window needs {}",
                    values.len(),
                    self.window.col_end
                ),
            });
        }

        Ok((row, values))
    }

    fn sample_at(&self, row: usize, col: usize, z: f64) -> Sample {
        let header = &self.header;
        Sample {
            x: header.xllcorner + col as f64 * header.cellsize,
            y: header.yllcorner + (header.nrows - row) as f64 * header.cellsize,
            z,
        }
    }
}

impl<R: BufRead> Iterator for GridSamples<R> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            if let Some((row, values)) = &self.current {
                if self.col < self.window.col_end {
                    let col = self.col;
                    self.col += 1;
                    let z = values[col];
                    if self.nodata == Some(z) {
                        continue;
                    }
                    return Some(Ok(self.sample_at(*row, col, z)));
                }
                self.current = None;
            }

            if self.next_row >= self.window.row_end {
                self.done = true;
                return None;
            }

            match self.load_row() {
                Ok(row) => {
                    self.current = Some(row);
                    self.col = self.window.col_start;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
