use crate::commands::run_blocking;
use crate::errors::ScanError;
use crate::gcode;
use crate::geometry::CornerSet;
use crate::path_table;
use crate::planner::{generate_snake_path, GridSpec, Waypoint};
use std::path::PathBuf;

/// Plan a snake path for the given plate.
pub async fn plan_path(
    corners: CornerSet,
    rows: i64,
    cols: i64,
    z_override: Option<f64>,
) -> Result<Vec<Waypoint>, ScanError> {
    let grid = GridSpec::new(rows, cols)?;
    let waypoints = generate_snake_path(&corners, grid, z_override)?;
    log::debug!("Planned {} waypoints for {}x{} grid", waypoints.len(), rows, cols);
    Ok(waypoints)
}

/// Plan a path and persist it as a waypoint table at `path`.
pub async fn save_path_table(
    corners: CornerSet,
    rows: i64,
    cols: i64,
    z_override: Option<f64>,
    path: PathBuf,
) -> Result<Vec<Waypoint>, ScanError> {
    let waypoints = plan_path(corners, rows, cols, z_override).await?;
    let to_write = waypoints.clone();
    run_blocking(move || {
        path_table::save_waypoints(&path, &to_write)?;
        log::info!("Saved {} waypoints to {}", to_write.len(), path.display());
        Ok(())
    })
    .await?;
    Ok(waypoints)
}

/// Read a previously saved waypoint table.
pub async fn load_path_table(path: PathBuf) -> Result<Vec<Waypoint>, ScanError> {
    run_blocking(move || path_table::load_waypoints(&path)).await
}

/// Motion commands for a planned path.
pub async fn plan_gcode(waypoints: Vec<Waypoint>, feed_rate: Option<u32>) -> Result<Vec<String>, ScanError> {
    Ok(gcode::path_commands(&waypoints, feed_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plan_path_rejects_bad_grid() {
        let result = plan_path(CornerSet::rectangle(0.0, 0.0, 1.0, 1.0, 0.0), 0, 3, None).await;
        assert!(matches!(
            result,
            Err(ScanError::InvalidGridSpecification { rows: 0, cols: 3 })
        ));
    }

    #[tokio::test]
    async fn test_save_and_load_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("path.csv");
        let corners = CornerSet::rectangle(0.0, 0.0, 20.0, 10.0, 1.0);
        let planned = save_path_table(corners, 3, 2, Some(2.5), path.clone()).await.unwrap();
        let loaded = load_path_table(path).await.unwrap();
        assert_eq!(planned, loaded);
        assert!(loaded.iter().all(|wp| wp.z == 2.5));
    }

    #[tokio::test]
    async fn test_plan_gcode_preamble() {
        let waypoints = plan_path(CornerSet::rectangle(0.0, 0.0, 1.0, 1.0, 0.0), 1, 1, None)
            .await
            .unwrap();
        let commands = plan_gcode(waypoints, None).await.unwrap();
        assert_eq!(commands, vec!["G90", "G0 X0.00 Y0.00 Z0.00"]);
    }
}
