//! Plate geometry: stage coordinates and the four-corner description of a
//! scanned region.

use serde::{Deserialize, Serialize};

/// A stage position in machine units (usually millimetres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise `self + (other - self) * t`.
    #[inline]
    pub fn lerp(&self, other: &Point3, t: f64) -> Point3 {
        Point3 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    pub fn distance(&self, other: &Point3) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// The four measured corners of a plate, as seen from above the stage.
///
/// No check is made that the corners span a proper quadrilateral; collinear
/// or crossed corners give a degenerate or folded path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerSet {
    #[serde(rename = "TL")]
    pub top_left: Point3,
    #[serde(rename = "TR")]
    pub top_right: Point3,
    #[serde(rename = "BL")]
    pub bottom_left: Point3,
    #[serde(rename = "BR")]
    pub bottom_right: Point3,
}

impl CornerSet {
    pub fn new(top_left: Point3, top_right: Point3, bottom_left: Point3, bottom_right: Point3) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// Axis-aligned rectangle at constant height.
    pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64, z: f64) -> Self {
        Self::new(
            Point3::new(x0, y0, z),
            Point3::new(x1, y0, z),
            Point3::new(x0, y1, z),
            Point3::new(x1, y1, z),
        )
    }

    /// Point at normalized position `(r_ratio, c_ratio)` inside the region.
    pub fn point_at(&self, r_ratio: f64, c_ratio: f64) -> Point3 {
        bilinear_point(self, r_ratio, c_ratio)
    }
}

/// Bilinear interpolation over the corner set.
///
/// The top and bottom edges are interpolated with `c_ratio` first, then the
/// result is interpolated between them with `r_ratio`. Keep this order: it
/// fixes the floating-point rounding of every emitted waypoint. Ratios
/// outside `[0, 1]` extrapolate.
pub fn bilinear_point(corners: &CornerSet, r_ratio: f64, c_ratio: f64) -> Point3 {
    let top = corners.top_left.lerp(&corners.top_right, c_ratio);
    let bot = corners.bottom_left.lerp(&corners.bottom_right, c_ratio);
    top.lerp(&bot, r_ratio)
}
