//! Extraction settings, loadable from YAML.
//!
//! Every field is optional; a missing file or an empty document gives the
//! defaults:
//!
//! ```yaml
//! grid_extensions: [asc]
//! tile_order: sorted        # or: directory
//! raster_bounds: reject     # or: clamp
//! check_hgt_filename: true
//! drop_nodata: false
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Order in which matching grid tiles are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileOrder {
    /// Sort tile paths lexicographically.
    #[default]
    Sorted,
    /// Keep the order the directory listing returns.
    Directory,
}

/// What to do when a raster pixel window reaches outside the tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// Fail with an out-of-bounds error.
    #[default]
    Reject,
    /// Clamp the window to the tile.
    Clamp,
}

/// Settings shared by both extraction pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// File extensions recognized as grid tiles, without the dot.
    pub grid_extensions: Vec<String>,
    /// Order of matching grid tiles.
    pub tile_order: TileOrder,
    /// Raster window policy.
    pub raster_bounds: BoundsPolicy,
    /// Check the query box against the tile named by the `.hgt` file name.
    pub check_hgt_filename: bool,
    /// Skip cells holding the dataset's no-data value.
    pub drop_nodata: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            grid_extensions: vec!["asc".to_string()],
            tile_order: TileOrder::default(),
            raster_bounds: BoundsPolicy::default(),
            check_hgt_filename: true,
            drop_nodata: false,
        }
    }
}

impl ExtractConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// True if `path` has one of the grid extensions (case-insensitive).
    pub fn is_grid_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.grid_extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}
