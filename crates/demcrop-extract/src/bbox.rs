//! Bounding box types and interval overlap.

use crate::{ExtractError, Result};

/// Geographic bounding box in WGS84 degrees.
///
/// Corners may be supplied in any order; construction swaps them so that
/// `lat_min <= lat_max` and `lng_min <= lng_max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBoundingBox {
    /// Southern latitude.
    pub lat_min: f64,
    /// Western longitude.
    pub lng_min: f64,
    /// Northern latitude.
    pub lat_max: f64,
    /// Eastern longitude.
    pub lng_max: f64,
}

impl GeoBoundingBox {
    /// Build a normalized box from two opposing corners.
    ///
    /// Fails if any coordinate is NaN or infinite.
    pub fn new(lat_min: f64, lng_min: f64, lat_max: f64, lng_max: f64) -> Result<Self> {
        for (name, value) in [
            ("lat_min", lat_min),
            ("lng_min", lng_min),
            ("lat_max", lat_max),
            ("lng_max", lng_max),
        ] {
            if !value.is_finite() {
                return Err(ExtractError::InvalidBoundingBox(format!(
                    "{name} is not a finite number ({value})"
                )));
            }
        }

        let (lat_min, lat_max) = ordered(lat_min, lat_max);
        let (lng_min, lng_max) = ordered(lng_min, lng_max);
        Ok(Self {
            lat_min,
            lng_min,
            lat_max,
            lng_max,
        })
    }
}

/// Bounding box in the native coordinates of a dataset.
///
/// Projected meters for the ASCII grid format, pixel row/column for the
/// raster format (`x` is the column, `y` the row).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedBoundingBox {
    /// Minimum X (or column).
    pub x_min: f64,
    /// Minimum Y (or row).
    pub y_min: f64,
    /// Maximum X (or column).
    pub x_max: f64,
    /// Maximum Y (or row).
    pub y_max: f64,
}

impl ProjectedBoundingBox {
    /// Build a box from two transformed corners, sorting each axis.
    ///
    /// A transform can invert the order on one axis, so the axes are sorted
    /// independently.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        let (x_min, x_max) = ordered(a.0, b.0);
        let (y_min, y_max) = ordered(a.1, b.1);
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// X extent as an interval.
    pub fn x_range(&self) -> (f64, f64) {
        (self.x_min, self.x_max)
    }

    /// Y extent as an interval.
    pub fn y_range(&self) -> (f64, f64) {
        (self.y_min, self.y_max)
    }

    /// True if the box overlaps the rectangle with strictly positive area
    /// on both axes.
    pub fn overlaps(&self, x: (f64, f64), y: (f64, f64)) -> bool {
        has_overlap(self.x_range(), x) && has_overlap(self.y_range(), y)
    }
}

/// True if the closed intervals `a` and `b` share a segment of positive length.
///
/// Intervals that only touch at an end point do not overlap.
pub fn has_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.1.min(b.1) - a.0.max(b.0)).max(0.0) > 0.0
}

/// One elevation point.
///
/// For the grid format `x`/`y` are projected coordinates; for the raster
/// format they are the pixel column and row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// X coordinate or column.
    pub x: f64,
    /// Y coordinate or row.
    pub y: f64,
    /// Elevation.
    pub z: f64,
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}
