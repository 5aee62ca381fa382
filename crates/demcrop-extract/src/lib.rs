//! # demcrop-extract
//!
//! Crop a rectangular region out of digital elevation datasets and emit it
//! as a tab-separated XYZ point grid.
//!
//! Two source formats are supported:
//! - Arc/Info ASCII grid tiles in Lambert-93 (EPSG:2154) meters, as shipped by
//!   the IGN BD ALTI database (`.asc` files with a `ncols`/`nrows`/
//!   `xllcorner`/`yllcorner`/`cellsize` header)
//! - SRTM3 `.hgt` tiles: headerless 1201x1201 big-endian `i16` rasters
//!   covering one degree at 3 arc-seconds
//!
//! ## Overview
//!
//! Both formats go through the same stages:
//!
//! 1. [`BoundingBoxResolver`]: WGS84 box to native coordinates
//! 2. [`select_tiles`]: grid tiles whose footprint overlaps the box
//! 3. [`GridTile`] / [`HgtTile`]: lazy windowed reads
//! 4. [`XyzWriter`]: `X\tY\tZ` output
//!
//! ## Examples
//!
//! ### ASCII grid tiles
//!
//! ```no_run
//! use demcrop_extract::{extract_grid, ExtractConfig, GeoBoundingBox};
//!
//! let bbox = GeoBoundingBox::new(45.10, 5.70, 45.20, 5.80)?;
//! let mut out = Vec::<u8>::new();
//! let report = extract_grid("bdalti", &bbox, &ExtractConfig::default(), &mut out)?;
//! println!("{} samples from {} tiles", report.samples, report.tiles.len());
//! # Ok::<(), demcrop_extract::ExtractError>(())
//! ```
//!
//! ### SRTM3 tiles
//!
//! ```no_run
//! use demcrop_extract::{extract_hgt, ExtractConfig, GeoBoundingBox};
//!
//! let bbox = GeoBoundingBox::new(45.10, 6.10, 45.20, 6.20)?;
//! let mut out = Vec::<u8>::new();
//! extract_hgt("srtm/N45E006.hgt", &bbox, &ExtractConfig::default(), &mut out)?;
//! # Ok::<(), demcrop_extract::ExtractError>(())
//! ```

mod bbox;
mod config;
mod error;
mod grid;
mod header;
mod hgt;
mod pipeline;
mod resolve;
mod selector;
mod serializer;

pub use bbox::{has_overlap, GeoBoundingBox, ProjectedBoundingBox, Sample};
pub use config::{BoundsPolicy, ExtractConfig, TileOrder};
pub use error::ExtractError;
pub use grid::{CellWindow, GridSamples, GridTile};
pub use header::TileHeader;
pub use hgt::{
    sample_offset, HgtSamples, HgtTile, PixelWindow, TileBounds, HGT_FILE_LEN,
    HGT_SAMPLES_PER_DEGREE, HGT_SIZE, HGT_VOID,
};
pub use pipeline::{extract_grid, extract_hgt, ExtractionReport};
pub use resolve::{
    resolve, BoundingBoxResolver, HgtPixelResolver, Lambert93Resolver, TargetSystem,
    LAMBERT93_PROJ, WGS84_PROJ,
};
pub use selector::select_tiles;
pub use serializer::{to_xyz_string, XyzWriter, XYZ_HEADER};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
