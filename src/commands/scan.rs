use crate::capture_log::CaptureLog;
use crate::commands::run_blocking;
use crate::errors::ScanError;
use crate::planner::Waypoint;
use crate::printer::CommandChannel;
use crate::scan::{ScanReport, ScanRunner};
use std::path::PathBuf;

/// Run a full scan on the blocking pool.
///
/// Homes first when `home` is set. The runner is handed back so the caller
/// can close the printer or scan again.
pub async fn run_scan<C>(
    mut runner: ScanRunner<C>,
    waypoints: Vec<Waypoint>,
    capture_log: Option<PathBuf>,
    home: bool,
) -> Result<(ScanReport, ScanRunner<C>), ScanError>
where
    C: CommandChannel + 'static,
{
    run_blocking(move || {
        let mut capture = capture_log.as_deref().map(CaptureLog::create).transpose()?;

        if home && !runner.home()? {
            log::info!("Stopped while homing");
            let report = ScanReport {
                planned: waypoints.len(),
                cancelled: true,
                ..ScanReport::default()
            };
            return Ok((report, runner));
        }

        let report = runner.run(&waypoints, capture.as_mut())?;
        Ok((report, runner))
    })
    .await
}
