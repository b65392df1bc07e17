//! Snake (boustrophedon) path planning over a four-corner plate.
//!
//! Rows are walked top to bottom. Even rows run left to right, odd rows run
//! right to left, so the last cell of one row sits directly above the first
//! cell of the next and the stage never travels back across the plate.

use crate::errors::ScanError;
use crate::geometry::{bilinear_point, CornerSet, Point3};
use crate::path_table;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of rows and columns to visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
}

impl GridSpec {
    /// Build a grid from possibly non-positive counts (CLI and config input).
    pub fn new(rows: i64, cols: i64) -> Result<Self, ScanError> {
        if rows < 1 || cols < 1 || rows > u32::MAX as i64 || cols > u32::MAX as i64 {
            return Err(ScanError::InvalidGridSpecification { rows, cols });
        }
        Ok(Self {
            rows: rows as u32,
            cols: cols as u32,
        })
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ScanError::InvalidGridSpecification {
                rows: self.rows as i64,
                cols: self.cols as i64,
            });
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Normalized row position; 0 for a single-row grid.
    pub fn row_ratio(&self, row: u32) -> f64 {
        if self.rows > 1 {
            row as f64 / (self.rows - 1) as f64
        } else {
            0.0
        }
    }

    /// Normalized column position; 0 for a single-column grid.
    pub fn col_ratio(&self, col: u32) -> f64 {
        if self.cols > 1 {
            col as f64 / (self.cols - 1) as f64
        } else {
            0.0
        }
    }
}

/// One stop on the scan path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Position in visiting order, starting at 0.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Waypoint {
    pub fn new(index: usize, point: Point3) -> Self {
        Self {
            index,
            x: point.x,
            y: point.y,
            z: point.z,
        }
    }

    pub fn position(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }
}

/// Check a Z override before any planning happens.
pub fn validate_z_override(z_override: Option<f64>) -> Result<(), ScanError> {
    match z_override {
        Some(z) if !z.is_finite() => Err(ScanError::invalid_argument(format!(
            "z_override must be a finite number, got {z}"
        ))),
        _ => Ok(()),
    }
}

/// Parse a textual Z override. Empty or `none` means no override.
pub fn parse_z_override(raw: &str) -> Result<Option<f64>, ScanError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let z: f64 = trimmed.parse().map_err(|_| {
        ScanError::invalid_argument(format!("z_override is not a number: {trimmed:?}"))
    })?;
    validate_z_override(Some(z))?;
    Ok(Some(z))
}

/// `(row, col)` cells in snake order.
pub fn snake_order(grid: GridSpec) -> impl Iterator<Item = (u32, u32)> {
    let cols = grid.cols;
    (0..grid.rows).flat_map(move |r| {
        (0..cols).map(move |i| if r % 2 == 0 { (r, i) } else { (r, cols - 1 - i) })
    })
}

/// Lazily generated snake path.
pub struct SnakePath {
    corners: CornerSet,
    grid: GridSpec,
    z_override: Option<f64>,
    next: usize,
}

impl SnakePath {
    pub fn new(corners: CornerSet, grid: GridSpec, z_override: Option<f64>) -> Result<Self, ScanError> {
        grid.validate()?;
        validate_z_override(z_override)?;
        Ok(Self {
            corners,
            grid,
            z_override,
            next: 0,
        })
    }

    fn cell(&self, index: usize) -> (u32, u32) {
        let cols = self.grid.cols as usize;
        let r = (index / cols) as u32;
        let i = (index % cols) as u32;
        if r % 2 == 0 {
            (r, i)
        } else {
            (r, self.grid.cols - 1 - i)
        }
    }
}

impl Iterator for SnakePath {
    type Item = Waypoint;

    fn next(&mut self) -> Option<Waypoint> {
        if self.next >= self.grid.cell_count() {
            return None;
        }
        let index = self.next;
        let (r, c) = self.cell(index);
        let mut point = bilinear_point(&self.corners, self.grid.row_ratio(r), self.grid.col_ratio(c));
        if let Some(z) = self.z_override {
            point.z = z;
        }
        self.next += 1;
        Some(Waypoint::new(index, point))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.cell_count() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SnakePath {}

/// Compute the full snake path over `corners`.
///
/// Fails with [`ScanError::InvalidGridSpecification`] or
/// [`ScanError::InvalidArgument`] before any waypoint is produced. A Z
/// override of NaN or ±infinity is an `InvalidArgument`: the table only
/// carries finite fixed-point coordinates, so `nan`/`inf` rows are never
/// written.
pub fn generate_snake_path(
    corners: &CornerSet,
    grid: GridSpec,
    z_override: Option<f64>,
) -> Result<Vec<Waypoint>, ScanError> {
    let path = SnakePath::new(*corners, grid, z_override)?;
    log::debug!(
        "Planning {}x{} snake path (z_override={:?})",
        grid.rows,
        grid.cols,
        z_override
    );
    Ok(path.collect())
}

/// Plan the path and persist it as a waypoint table at `outfile`.
pub fn generate_snake_csv(
    corners: &CornerSet,
    grid: GridSpec,
    outfile: impl AsRef<Path>,
    z_override: Option<f64>,
) -> Result<Vec<Waypoint>, ScanError> {
    let waypoints = generate_snake_path(corners, grid, z_override)?;
    path_table::save_waypoints(outfile.as_ref(), &waypoints)?;
    log::info!(
        "Saved {} waypoints to {}",
        waypoints.len(),
        outfile.as_ref().display()
    );
    Ok(waypoints)
}

/// Total straight-line travel along the path.
pub fn path_length(waypoints: &[Waypoint]) -> f64 {
    waypoints
        .windows(2)
        .map(|w| w[0].position().distance(&w[1].position()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> CornerSet {
        CornerSet::rectangle(0.0, 0.0, 10.0, 10.0, 0.0)
    }

    #[test]
    fn test_two_by_two_scenario() {
        let grid = GridSpec::new(2, 2).unwrap();
        let path = generate_snake_path(&square(), grid, None).unwrap();
        let got: Vec<(usize, f64, f64, f64)> =
            path.iter().map(|w| (w.index, w.x, w.y, w.z)).collect();
        assert_eq!(
            got,
            vec![
                (0, 0.0, 0.0, 0.0),
                (1, 10.0, 0.0, 0.0),
                (2, 10.0, 10.0, 0.0),
                (3, 0.0, 10.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_rejects_empty_grid() {
        assert!(matches!(
            GridSpec::new(0, 4),
            Err(ScanError::InvalidGridSpecification { rows: 0, cols: 4 })
        ));
        assert!(matches!(
            GridSpec::new(3, -1),
            Err(ScanError::InvalidGridSpecification { .. })
        ));
        let raw = GridSpec { rows: 2, cols: 0 };
        assert!(generate_snake_path(&square(), raw, None).is_err());
    }

    #[test]
    fn test_non_finite_override_rejected() {
        let grid = GridSpec::new(2, 2).unwrap();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = generate_snake_path(&square(), grid, Some(bad)).unwrap_err();
            assert!(matches!(err, ScanError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_parse_z_override() {
        assert_eq!(parse_z_override("").unwrap(), None);
        assert_eq!(parse_z_override("None").unwrap(), None);
        assert_eq!(parse_z_override(" 5.5 ").unwrap(), Some(5.5));
        assert!(matches!(
            parse_z_override("high"),
            Err(ScanError::InvalidArgument(_))
        ));
        assert!(parse_z_override("nan").is_err());
    }

    #[test]
    fn test_single_row_has_no_division_by_zero() {
        let corners = CornerSet::new(
            Point3::new(0.0, 7.0, 1.0),
            Point3::new(20.0, 7.0, 1.0),
            Point3::new(0.0, 7.0, 1.0),
            Point3::new(20.0, 7.0, 1.0),
        );
        let path = generate_snake_path(&corners, GridSpec::new(1, 5).unwrap(), None).unwrap();
        assert_eq!(path.len(), 5);
        let xs: Vec<f64> = path.iter().map(|w| w.x).collect();
        assert_eq!(xs, vec![0.0, 5.0, 10.0, 15.0, 20.0]);
        assert!(path.iter().all(|w| w.y == 7.0));
    }

    #[test]
    fn test_single_cell_is_top_left() {
        let corners = CornerSet::rectangle(3.0, 4.0, 30.0, 40.0, 2.0);
        let path = generate_snake_path(&corners, GridSpec::new(1, 1).unwrap(), None).unwrap();
        assert_eq!(path, vec![Waypoint::new(0, corners.top_left)]);
    }

    #[test]
    fn test_snake_order_three_by_three() {
        let order: Vec<(u32, u32)> = snake_order(GridSpec::new(3, 3).unwrap()).collect();
        assert_eq!(
            order,
            vec![
                (0, 0),
                (0, 1),
                (0, 2),
                (1, 2),
                (1, 1),
                (1, 0),
                (2, 0),
                (2, 1),
                (2, 2),
            ]
        );
    }

    #[test]
    fn test_iterator_matches_order() {
        let grid = GridSpec::new(4, 3).unwrap();
        let path = SnakePath::new(square(), grid, None).unwrap();
        assert_eq!(path.len(), 12);
        for (wp, (r, c)) in path.zip(snake_order(grid)) {
            let expected = square().point_at(grid.row_ratio(r), grid.col_ratio(c));
            assert_eq!(wp.position(), expected);
        }
    }

    #[test]
    fn test_snake_is_shorter_than_raster() {
        let grid = GridSpec::new(4, 5).unwrap();
        let path = generate_snake_path(&square(), grid, None).unwrap();
        // 4 rows of 10mm plus 3 row steps of 10/3mm.
        let expected = 4.0 * 10.0 + 10.0;
        assert!((path_length(&path) - expected).abs() < 1e-9);
    }
}
