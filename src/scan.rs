//! Motion executor: visit every waypoint, dwell, capture.
//!
//! Strictly sequential. A stop request is honoured before each move and
//! again before each capture; an interrupted scan is reported, not treated
//! as an error.

use crate::camera::{CameraService, Resolution};
use crate::capture_log::{CaptureLog, CaptureRecord};
use crate::config::PlatescanConfig;
use crate::errors::ScanError;
use crate::gcode;
use crate::planner::Waypoint;
use crate::printer::{CommandChannel, PrinterService};
use crate::timing::{sleep_with_stop, SettlePolicy, StopFlag};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const STILL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Per-run parameters for [`ScanRunner`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    pub dwell: Duration,
    pub output_dir: PathBuf,
    pub image_prefix: String,
    pub still_resolution: Option<Resolution>,
    pub feed_rate: Option<u32>,
    /// Wait for camera gain to settle before each capture.
    pub settle: Option<SettlePolicy>,
}

impl ScanSettings {
    pub fn from_config(config: &PlatescanConfig) -> Self {
        Self {
            dwell: config.scan.dwell(),
            output_dir: config.storage.output_dir(),
            image_prefix: config.storage.image_prefix.clone(),
            still_resolution: Some(config.camera.still_resolution),
            feed_rate: config.printer.feed_rate,
            settle: config.camera.settle_policy(),
        }
    }
}

/// Outcome of a scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub planned: usize,
    pub visited: usize,
    pub captures: Vec<PathBuf>,
    pub cancelled: bool,
}

impl ScanReport {
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.captures.len() == self.planned
    }
}

/// `{prefix}_{index:04}_{timestamp}.jpg`
pub fn still_file_name(prefix: &str, index: usize, at: &DateTime<Local>) -> String {
    format!("{}_{:04}_{}.jpg", prefix, index, at.format(STILL_TIMESTAMP_FORMAT))
}

pub struct ScanRunner<C: CommandChannel> {
    printer: PrinterService<C>,
    camera: CameraService,
    settings: ScanSettings,
    stop: StopFlag,
}

impl<C: CommandChannel> ScanRunner<C> {
    pub fn new(printer: PrinterService<C>, camera: CameraService, settings: ScanSettings, stop: StopFlag) -> Self {
        Self {
            printer,
            camera,
            settings,
            stop,
        }
    }

    pub fn into_printer(self) -> PrinterService<C> {
        self.printer
    }

    /// Home the stage, honouring the stop flag during the reboot wait.
    pub fn home(&mut self) -> Result<bool, ScanError> {
        log::info!("Homing printer at {}", self.printer.device_path().display());
        self.printer.home(&self.stop)
    }

    /// Visit `waypoints` in order, capturing a still at each one.
    ///
    /// Each capture is appended to `capture_log` when one is given.
    pub fn run(&mut self, waypoints: &[Waypoint], mut capture_log: Option<&mut CaptureLog>) -> Result<ScanReport, ScanError> {
        let mut report = ScanReport {
            planned: waypoints.len(),
            ..ScanReport::default()
        };

        std::fs::create_dir_all(&self.settings.output_dir)
            .map_err(|e| ScanError::io(&self.settings.output_dir, e))?;

        log::info!(
            "Starting scan of {} waypoints into {}",
            waypoints.len(),
            self.settings.output_dir.display()
        );
        self.printer.run_gcode(gcode::ABSOLUTE_POSITIONING)?;

        for waypoint in waypoints {
            if self.stop.is_stopped() {
                report.cancelled = true;
                break;
            }

            let command = gcode::move_to(waypoint, self.settings.feed_rate);
            log::debug!("Waypoint {}/{}: {}", waypoint.index + 1, waypoints.len(), command);
            self.printer.run_gcode(&command)?;
            report.visited += 1;

            if !sleep_with_stop(self.settings.dwell, &self.stop) || self.stop.is_stopped() {
                report.cancelled = true;
                break;
            }

            match self.capture(waypoint, capture_log.as_deref_mut())? {
                Some(path) => report.captures.push(path),
                None => {
                    report.cancelled = true;
                    break;
                }
            }
        }

        if report.cancelled {
            log::info!(
                "Scan stopped after {} of {} waypoints ({} captures)",
                report.visited,
                report.planned,
                report.captures.len()
            );
        } else {
            log::info!("Scan finished: {} captures", report.captures.len());
        }
        Ok(report)
    }

    /// Capture at `waypoint`; `None` when a stop arrived while waiting for gain.
    fn capture(&mut self, waypoint: &Waypoint, capture_log: Option<&mut CaptureLog>) -> Result<Option<PathBuf>, ScanError> {
        if let Some(policy) = self.settings.settle {
            match self.camera.wait_for_gain_settle(policy, &self.stop) {
                Ok(_) => {}
                Err(ScanError::Timeout(msg)) => log::warn!("Capturing without settled gain: {}", msg),
                Err(e) => return Err(e),
            }
            if self.stop.is_stopped() {
                return Ok(None);
            }
        }

        let captured_at = Local::now();
        let path = self
            .settings
            .output_dir
            .join(still_file_name(&self.settings.image_prefix, waypoint.index, &captured_at));

        self.camera
            .capture_still(&path, self.settings.still_resolution)
            .map_err(|e| {
                log::error!("Capture failed at waypoint {}: {}", waypoint.index, e);
                e
            })?;

        if let Some(log) = capture_log {
            log.append(&CaptureRecord {
                waypoint: *waypoint,
                file: path.clone(),
                captured_at,
            })?;
        }
        Ok(Some(path))
    }
}
