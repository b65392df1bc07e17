//! Configuration management for platescan
//!
//! Everything the rig needs at run time (printer port, camera setup, plate
//! geometry, dwell times, output folders) lives in one TOML file that is
//! loaded once and passed down explicitly.

use crate::camera::{PreviewWindow, Resolution, Rotation};
use crate::errors::ScanError;
use crate::geometry::CornerSet;
use crate::overlay::CrosshairStyle;
use crate::planner::GridSpec;
use crate::timing::SettlePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatescanConfig {
    pub printer: PrinterConfig,
    pub camera: CameraConfig,
    pub scan: ScanConfig,
    pub overlay: CrosshairStyle,
    pub storage: StorageConfig,
}

/// Serial stage controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterConfig {
    /// Serial device node, e.g. /dev/ttyUSB0
    pub device_path: String,
    /// Line speed the device node has been configured for
    pub baud_rate: u32,
    /// Seconds to wait after homing before sending moves
    pub reboot_wait_secs: f64,
    /// Optional feed rate appended to moves (mm/min)
    pub feed_rate: Option<u32>,
}

impl PrinterConfig {
    pub fn reboot_wait(&self) -> Duration {
        Duration::from_secs_f64(self.reboot_wait_secs.max(0.0))
    }
}

/// Camera setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Camera index for the native backend
    pub device_index: u32,
    /// Sensor rotation in degrees (multiple of 90)
    pub rotation: Rotation,
    pub preview_resolution: Resolution,
    pub still_resolution: Resolution,
    pub preview_window: PreviewWindow,
    /// Poll interval while waiting for digital gain to settle
    pub settle_interval_ms: u64,
    /// Give up waiting for gain to settle after this long; 0 disables the wait
    pub settle_timeout_ms: u64,
}

impl CameraConfig {
    pub fn settle_policy(&self) -> Option<SettlePolicy> {
        if self.settle_timeout_ms == 0 {
            return None;
        }
        Some(SettlePolicy {
            interval: Duration::from_millis(self.settle_interval_ms),
            timeout: Duration::from_millis(self.settle_timeout_ms),
        })
    }
}

/// Plate geometry and scan timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub rows: u32,
    pub cols: u32,
    pub corners: CornerSet,
    /// Fixed Z for every waypoint; omit to interpolate Z from the corners
    pub z_override: Option<f64>,
    /// Seconds to wait after each move before capturing
    pub dwell_secs: f64,
}

impl ScanConfig {
    pub fn grid(&self) -> Result<GridSpec, ScanError> {
        GridSpec::new(self.rows as i64, self.cols as i64)
    }

    pub fn dwell(&self) -> Duration {
        Duration::from_secs_f64(self.dwell_secs.max(0.0))
    }
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Folder for captured stills and logs
    pub output_directory: String,
    /// Waypoint table file name, inside output_directory
    pub path_file_name: String,
    /// Capture log file name, inside output_directory
    pub capture_log_file_name: String,
    /// Prefix for still file names
    pub image_prefix: String,
}

impl StorageConfig {
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output_directory)
    }

    pub fn path_file(&self) -> PathBuf {
        self.output_dir().join(&self.path_file_name)
    }

    pub fn capture_log_file(&self) -> PathBuf {
        self.output_dir().join(&self.capture_log_file_name)
    }
}

impl Default for PlatescanConfig {
    fn default() -> Self {
        Self {
            printer: PrinterConfig {
                device_path: "/dev/ttyUSB0".to_string(),
                baud_rate: 115_200,
                reboot_wait_secs: 5.0,
                feed_rate: None,
            },
            camera: CameraConfig {
                device_index: 0,
                rotation: Rotation::Deg0,
                preview_resolution: Resolution::new(960, 720),
                still_resolution: Resolution::hq_still(),
                preview_window: PreviewWindow::new(0, 0, 640, 480),
                settle_interval_ms: 500,
                settle_timeout_ms: 10_000,
            },
            scan: ScanConfig {
                rows: 8,
                cols: 12,
                corners: CornerSet::rectangle(0.0, 0.0, 99.0, 63.0, 0.0),
                z_override: None,
                dwell_secs: 2.0,
            },
            overlay: CrosshairStyle::default(),
            storage: StorageConfig {
                output_directory: "./captures".to_string(),
                path_file_name: "snake_path.csv".to_string(),
                capture_log_file_name: "captures.csv".to_string(),
                image_prefix: "well".to_string(),
            },
        }
    }
}

impl PlatescanConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        let config = Self::from_toml_str(&contents)?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ScanError> {
        toml::from_str(contents)
            .map_err(|e| ScanError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ScanError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ScanError::io(parent, e))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ScanError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string).map_err(|e| ScanError::io(path, e))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("platescan.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ScanError> {
        self.scan.grid()?;
        crate::planner::validate_z_override(self.scan.z_override)?;

        if self.printer.device_path.trim().is_empty() {
            return Err(ScanError::Config("Printer device path is empty".to_string()));
        }
        if self.printer.baud_rate == 0 {
            return Err(ScanError::Config("Baud rate must be non-zero".to_string()));
        }
        if !self.printer.reboot_wait_secs.is_finite() || self.printer.reboot_wait_secs < 0.0 {
            return Err(ScanError::Config("Reboot wait must be a non-negative number".to_string()));
        }
        if !self.scan.dwell_secs.is_finite() || self.scan.dwell_secs < 0.0 {
            return Err(ScanError::Config("Dwell must be a non-negative number".to_string()));
        }
        if self.camera.settle_timeout_ms > 0 && self.camera.settle_interval_ms == 0 {
            return Err(ScanError::Config(
                "Settle interval must be non-zero when settling is enabled".to_string(),
            ));
        }
        self.overlay.validate()?;
        if self.storage.image_prefix.is_empty()
            || self
                .storage
                .image_prefix
                .chars()
                .any(|c| matches!(c, ',' | '"' | '\r' | '\n' | '/' | '\\'))
        {
            return Err(ScanError::Config(format!(
                "Image prefix {:?} must be non-empty and free of commas, quotes, line breaks and path separators",
                self.storage.image_prefix
            )));
        }
        if self.storage.path_file_name.trim().is_empty()
            || self.storage.capture_log_file_name.trim().is_empty()
        {
            return Err(ScanError::Config("Output file names must not be empty".to_string()));
        }

        Ok(())
    }
}
