//! End-to-end extraction for both source formats.
//!
//! Both pipelines run the same stages in order: resolve the geographic box
//! into native coordinates, pick the source tiles, read the matching window
//! of each tile, and stream the samples into an [`XyzWriter`].

use crate::bbox::{GeoBoundingBox, ProjectedBoundingBox};
use crate::config::ExtractConfig;
use crate::grid::GridTile;
use crate::hgt::{HgtTile, PixelWindow, TileBounds};
use crate::resolve::{resolve, BoundingBoxResolver, HgtPixelResolver, TargetSystem};
use crate::selector::select_tiles;
use crate::serializer::XyzWriter;
use crate::{ExtractError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of one extraction run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    /// Query box in the dataset's native coordinates.
    pub bbox: ProjectedBoundingBox,
    /// Source files that were read, in reading order.
    pub tiles: Vec<PathBuf>,
    /// Number of samples written.
    pub samples: usize,
}

impl ExtractionReport {
    /// True if no source tile matched the query.
    pub fn no_matching_data(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Extract `geo` from the Lambert-93 ASCII grid tiles in `dir` into `out`.
///
/// When no tile overlaps the box, `out` receives only the header line and
/// the report lists no tiles.
pub fn extract_grid<P, W>(
    dir: P,
    geo: &GeoBoundingBox,
    config: &ExtractConfig,
    out: &mut W,
) -> Result<ExtractionReport>
where
    P: AsRef<Path>,
    W: Write,
{
    log_query(geo);

    let bbox = resolve(geo, TargetSystem::Lambert93)?;
    info!(
        "Looking for data between map coordinates ({}, {}) and ({}, {})",
        bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max
    );

    let tiles = select_tiles(dir.as_ref(), &bbox, config)?;
    if tiles.is_empty() {
        warn!(dir = %dir.as_ref().display(), "No matching dataset found");
    } else {
        info!(count = tiles.len(), "Matching datasets found");
        for tile in &tiles {
            info!("  {}", tile.display());
        }
    }

    let mut writer = XyzWriter::new(out)?;
    for path in &tiles {
        let tile = GridTile::open(path)?;
        let written = writer.write_all(tile.samples(&bbox, config.drop_nodata))?;
        debug!(path = %path.display(), samples = written, "Tile extracted");
    }
    let samples = writer.count();
    writer.finish()?;

    Ok(ExtractionReport {
        bbox,
        tiles,
        samples,
    })
}

/// Extract `geo` from the SRTM3 tile at `path` into `out`.
///
/// Output X and Y are the pixel column and row. When the file name is
/// checked, pixels are measured from the named tile's corner, so a box
/// ending on its northern or eastern edge reads the edge row or column.
pub fn extract_hgt<P, W>(
    path: P,
    geo: &GeoBoundingBox,
    config: &ExtractConfig,
    out: &mut W,
) -> Result<ExtractionReport>
where
    P: AsRef<Path>,
    W: Write,
{
    let path = path.as_ref();
    log_query(geo);

    let named_tile = if config.check_hgt_filename {
        check_tile_name(path, geo)?
    } else {
        None
    };
    let resolver = named_tile
        .as_ref()
        .map_or_else(HgtPixelResolver::new, HgtPixelResolver::for_tile);

    let bbox = resolver.resolve(geo)?;
    let window = PixelWindow::from_bbox(&bbox, config.raster_bounds)?;
    info!(
        "Corresponding rectangle in the image is ({}, {}), ({}, {})",
        window.row_min, window.col_min, window.row_max, window.col_max
    );

    let tile = HgtTile::open(path)?;
    let mut writer = XyzWriter::new(out)?;
    writer.write_all(tile.samples(window, config.drop_nodata))?;
    let samples = writer.count();
    writer.finish()?;

    Ok(ExtractionReport {
        bbox,
        tiles: vec![path.to_path_buf()],
        samples,
    })
}

fn log_query(geo: &GeoBoundingBox) {
    info!(
        "Looking for data between latitudes and longitudes ({}, {}) and ({}, {})",
        geo.lat_min, geo.lng_min, geo.lat_max, geo.lng_max
    );
}

/// Fail if the file name names a tile that does not contain `geo`.
///
/// Returns the named tile, or `None` when the name does not follow the SRTM
/// convention.
fn check_tile_name(path: &Path, geo: &GeoBoundingBox) -> Result<Option<TileBounds>> {
    let bounds = match TileBounds::from_filename(path) {
        Ok(bounds) => bounds,
        Err(e) => {
            warn!(error = %e, "Cannot check bounding box against tile name");
            return Ok(None);
        }
    };

    if bounds.contains_box(geo) {
        return Ok(Some(bounds));
    }

    Err(ExtractError::OutsideTile {
        tile: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        lat_min: geo.lat_min,
        lng_min: geo.lng_min,
        lat_max: geo.lat_max,
        lng_max: geo.lng_max,
        min_lat: bounds.min_lat,
        max_lat: bounds.max_lat,
        min_lon: bounds.min_lon,
        max_lon: bounds.max_lon,
    })
}
