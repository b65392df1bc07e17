//! platescan: automated image capture for a well-plate sampling rig
//!
//! A serial-connected 3D printer carries a camera over a plate; this crate
//! plans the boustrophedon ("snake") path across an R×C grid from the four
//! plate corners, drives the printer along it and captures a still at every
//! stop.
//!
//! # Features
//! - Snake-path planning by bilinear interpolation between plate corners
//! - Waypoint tables compatible with the rig's existing CSV tooling
//! - G-code generation and a cancellable move/dwell/capture executor
//! - Crosshair overlay for manual alignment
//! - Optional native camera backend (`native-camera` feature, via nokhwa)
//!
//! # Usage
//! ```rust
//! use platescan::{generate_snake_path, CornerSet, GridSpec};
//!
//! let corners = CornerSet::rectangle(0.0, 0.0, 99.0, 63.0, 0.0);
//! let path = generate_snake_path(&corners, GridSpec::new(8, 12).unwrap(), None).unwrap();
//! assert_eq!(path.len(), 96);
//! ```
pub mod camera;
pub mod capture_log;
pub mod commands;
pub mod config;
pub mod errors;
pub mod gcode;
pub mod geometry;
pub mod overlay;
pub mod path_table;
pub mod planner;
pub mod printer;
pub mod scan;
pub mod timing;

// Testing utilities - mock camera and recording channel for offline testing
pub mod testing;

// Re-exports for convenience
pub use camera::{CameraBackend, CameraService, Resolution, Rotation};
pub use config::PlatescanConfig;
pub use errors::{CameraError, ScanError};
pub use geometry::{bilinear_point, CornerSet, Point3};
pub use planner::{generate_snake_csv, generate_snake_path, GridSpec, Waypoint};
pub use scan::{ScanReport, ScanRunner, ScanSettings};
pub use timing::StopFlag;

/// Initialize logging for the rig
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "platescan=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        native_camera: cfg!(feature = "native-camera"),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub native_camera: bool,
}
