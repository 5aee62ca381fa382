//! Conversion of geographic bounding boxes into dataset coordinates.
//!
//! Each source format has exactly one native coordinate system:
//!
//! - ASCII grid tiles (BD ALTI) are in Lambert-93 (EPSG:2154) meters.
//! - SRTM3 `.hgt` tiles are addressed by 1-based pixel row and column.
//!
//! The transforms are plain values; nothing here holds global state.

use crate::bbox::{GeoBoundingBox, ProjectedBoundingBox};
use crate::hgt::{TileBounds, HGT_SAMPLES_PER_DEGREE, HGT_SIZE};
use crate::{ExtractError, Result};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

/// WGS84 geographic coordinates.
pub const WGS84_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// RGF93 / Lambert-93 (EPSG:2154).
pub const LAMBERT93_PROJ: &str = "+proj=lcc +lat_0=46.5 +lon_0=3 +lat_1=49 +lat_2=44 \
    +x_0=700000 +y_0=6600000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

/// Coordinate system a bounding box is resolved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSystem {
    /// Lambert-93 projected meters.
    Lambert93,
    /// SRTM3 pixel row/column inside one 1-degree tile.
    HgtPixels,
}

impl TargetSystem {
    /// Build the resolver for this system.
    pub fn resolver(self) -> Result<Box<dyn BoundingBoxResolver>> {
        let resolver: Box<dyn BoundingBoxResolver> = match self {
            TargetSystem::Lambert93 => Box::new(Lambert93Resolver::new()?),
            TargetSystem::HgtPixels => Box::new(HgtPixelResolver::new()),
        };
        Ok(resolver)
    }
}

/// Maps a geographic box into the native coordinates of a dataset.
///
/// Implementations must return a box with `x_min <= x_max` and
/// `y_min <= y_max`.
pub trait BoundingBoxResolver {
    /// Resolve `bbox` into native coordinates.
    fn resolve(&self, bbox: &GeoBoundingBox) -> Result<ProjectedBoundingBox>;
}

/// Resolve `bbox` into `target` coordinates.
pub fn resolve(bbox: &GeoBoundingBox, target: TargetSystem) -> Result<ProjectedBoundingBox> {
    target.resolver()?.resolve(bbox)
}

/// WGS84 degrees to Lambert-93 meters, via proj4rs.
pub struct Lambert93Resolver {
    source: Proj,
    target: Proj,
}

impl std::fmt::Debug for Lambert93Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lambert93Resolver").finish_non_exhaustive()
    }
}

impl Lambert93Resolver {
    /// Build the WGS84 and Lambert-93 projection definitions.
    pub fn new() -> Result<Self> {
        let source = Proj::from_proj_string(WGS84_PROJ)
            .map_err(|e| ExtractError::Projection(format!("invalid WGS84 definition: {e:?}")))?;
        let target = Proj::from_proj_string(LAMBERT93_PROJ).map_err(|e| {
            ExtractError::Projection(format!("invalid Lambert-93 definition: {e:?}"))
        })?;
        Ok(Self { source, target })
    }

    /// Project one point given in degrees; returns `(x, y)` in meters.
    pub fn project(&self, lat: f64, lng: f64) -> Result<(f64, f64)> {
        // proj4rs takes geographic input in radians, longitude first
        let mut point = (lng.to_radians(), lat.to_radians(), 0.0);
        transform(&self.source, &self.target, &mut point).map_err(|e| {
            ExtractError::Projection(format!("cannot project ({lat}, {lng}): {e:?}"))
        })?;
        Ok((point.0, point.1))
    }
}

impl BoundingBoxResolver for Lambert93Resolver {
    fn resolve(&self, bbox: &GeoBoundingBox) -> Result<ProjectedBoundingBox> {
        let lower = self.project(bbox.lat_min, bbox.lng_min)?;
        let upper = self.project(bbox.lat_max, bbox.lng_max)?;
        Ok(ProjectedBoundingBox::from_corners(lower, upper))
    }
}

/// WGS84 degrees to SRTM3 pixel coordinates.
///
/// Both corners are measured from the south-west corner of one tile, so a
/// box ending on the tile's northern or eastern edge maps to row 1 or column
/// 1200 instead of wrapping into the next tile. Without an explicit tile the
/// one holding the box's south-west corner is used. Rows count down from the
/// northern edge: the southern edge of a tile is row 1201.
#[derive(Debug, Clone, Copy, Default)]
pub struct HgtPixelResolver {
    origin: Option<(f64, f64)>,
}

impl HgtPixelResolver {
    /// Resolver anchored on the tile holding each query's south-west corner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver anchored on `bounds`.
    pub fn for_tile(bounds: &TileBounds) -> Self {
        Self {
            origin: Some((bounds.min_lat, bounds.min_lon)),
        }
    }

    /// Map one point to `(column, row)` using only its fractional degrees.
    pub fn pixel(lat: f64, lng: f64) -> (f64, f64) {
        Self::pixel_at(lat.rem_euclid(1.0), lng.rem_euclid(1.0))
    }

    /// Map degrees north and east of a tile corner to `(column, row)`.
    fn pixel_at(lat_offset: f64, lng_offset: f64) -> (f64, f64) {
        let col = (lng_offset * HGT_SAMPLES_PER_DEGREE).round_ties_even();
        let row = HGT_SIZE as f64 - (lat_offset * HGT_SAMPLES_PER_DEGREE).round_ties_even();
        (col, row)
    }
}

impl BoundingBoxResolver for HgtPixelResolver {
    fn resolve(&self, bbox: &GeoBoundingBox) -> Result<ProjectedBoundingBox> {
        let (lat0, lng0) = self
            .origin
            .unwrap_or((bbox.lat_min.floor(), bbox.lng_min.floor()));
        let lower = Self::pixel_at(bbox.lat_min - lat0, bbox.lng_min - lng0);
        let upper = Self::pixel_at(bbox.lat_max - lat0, bbox.lng_max - lng0);
        Ok(ProjectedBoundingBox::from_corners(lower, upper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lambert93_false_origin() {
        let resolver = Lambert93Resolver::new().unwrap();
        let (x, y) = resolver.project(46.5, 3.0).unwrap();
        assert_abs_diff_eq!(x, 700_000.0, epsilon = 0.01);
        assert_abs_diff_eq!(y, 6_600_000.0, epsilon = 0.01);
    }

    #[test]
    fn test_lambert93_paris() {
        let resolver = Lambert93Resolver::new().unwrap();
        // Notre-Dame de Paris, roughly (652 000, 6 862 000)
        let (x, y) = resolver.project(48.853, 2.3499).unwrap();
        assert_abs_diff_eq!(x, 652_000.0, epsilon = 2_000.0);
        assert_abs_diff_eq!(y, 6_862_000.0, epsilon = 2_000.0);
    }

    #[test]
    fn test_lambert93_swapped_corners_resolve_identically() {
        let resolver = Lambert93Resolver::new().unwrap();
        let swapped = GeoBoundingBox::new(45.2, 6.0, 45.1, 5.9).unwrap();
        let sorted = GeoBoundingBox::new(45.1, 5.9, 45.2, 6.0).unwrap();
        let a = resolver.resolve(&swapped).unwrap();
        let b = resolver.resolve(&sorted).unwrap();
        assert_eq!(a, b);
        assert!(a.x_min <= a.x_max);
        assert!(a.y_min <= a.y_max);
    }

    #[test]
    fn test_hgt_pixel_mapping() {
        assert_eq!(HgtPixelResolver::pixel(45.0, 6.0), (0.0, 1201.0));
        assert_eq!(HgtPixelResolver::pixel(45.5, 6.25), (300.0, 601.0));
        assert_eq!(HgtPixelResolver::pixel(45.999, 6.999), (1199.0, 2.0));
    }

    #[test]
    fn test_hgt_pixel_negative_coordinates_use_positive_fraction() {
        // -0.75 lies a quarter degree into the tile starting at -1
        assert_eq!(HgtPixelResolver::pixel(-0.75, -0.75), (300.0, 901.0));
    }

    #[test]
    fn test_hgt_resolve_sorts_rows_and_columns() {
        let bbox = GeoBoundingBox::new(45.1, 6.1, 45.2, 6.2).unwrap();
        let window = resolve(&bbox, TargetSystem::HgtPixels).unwrap();
        // Higher latitude maps to a lower row number
        assert_eq!(window.y_min, 961.0);
        assert_eq!(window.y_max, 1081.0);
        assert_eq!(window.x_min, 120.0);
        assert_eq!(window.x_max, 240.0);
    }

    #[test]
    fn test_hgt_box_ending_on_north_edge_maps_to_first_row() {
        let bbox = GeoBoundingBox::new(45.99, 6.5, 46.0, 6.501).unwrap();
        let window = HgtPixelResolver::new().resolve(&bbox).unwrap();
        assert_eq!(window.y_min, 1.0);
        assert_eq!(window.y_max, 13.0);
        assert_eq!(window.x_min, 600.0);
        assert_eq!(window.x_max, 601.0);
    }

    #[test]
    fn test_hgt_box_ending_on_east_edge_maps_to_last_column() {
        let bbox = GeoBoundingBox::new(45.5, 6.5, 45.5, 7.0).unwrap();
        let window = HgtPixelResolver::new().resolve(&bbox).unwrap();
        assert_eq!(window.x_min, 600.0);
        assert_eq!(window.x_max, 1200.0);
        assert_eq!(window.y_min, 601.0);
    }

    #[test]
    fn test_hgt_box_crossing_tiles_leaves_raster_extent() {
        let bbox = GeoBoundingBox::new(45.5, 6.5, 46.5, 6.6).unwrap();
        let window = HgtPixelResolver::new().resolve(&bbox).unwrap();
        assert_eq!(window.y_min, -599.0);
        assert_eq!(window.y_max, 601.0);
    }

    #[test]
    fn test_hgt_tile_origin_anchors_edge_corners() {
        // A point on the shared edge of N45E006 and N46E006
        let bounds = TileBounds::from_filename(std::path::Path::new("N45E006.hgt")).unwrap();
        let bbox = GeoBoundingBox::new(46.0, 6.5, 46.0, 6.5).unwrap();

        let anchored = HgtPixelResolver::for_tile(&bounds).resolve(&bbox).unwrap();
        assert_eq!((anchored.y_min, anchored.y_max), (1.0, 1.0));

        let floating = HgtPixelResolver::new().resolve(&bbox).unwrap();
        assert_eq!((floating.y_min, floating.y_max), (1201.0, 1201.0));
    }
}
