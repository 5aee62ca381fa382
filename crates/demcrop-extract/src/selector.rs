//! Selection of grid tiles overlapping a bounding box.

use crate::bbox::ProjectedBoundingBox;
use crate::config::{ExtractConfig, TileOrder};
use crate::header::TileHeader;
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Scan `dir` for grid tiles whose footprint overlaps `bbox`.
///
/// Only files with one of the configured grid extensions are considered;
/// each candidate has its header read and is closed again. Tiles that only
/// touch the box along an edge are not selected. An empty result is not an
/// error.
pub fn select_tiles<P: AsRef<Path>>(
    dir: P,
    bbox: &ProjectedBoundingBox,
    config: &ExtractConfig,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut selected = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type()?.is_dir() || !config.is_grid_file(&path) {
            trace!(path = %path.display(), "Skipping non-grid entry");
            continue;
        }

        let header = TileHeader::from_file(&path)?;
        if bbox.overlaps(header.x_range(), header.y_range()) {
            debug!(path = %path.display(), "Tile overlaps bounding box");
            selected.push(path);
        }
    }

    if config.tile_order == TileOrder::Sorted {
        selected.sort();
    }

    Ok(selected)
}
