//! Camera capability layer.
//!
//! The rig only needs a handful of operations from a camera: preview on/off,
//! resolution and rotation, still capture and a single alignment overlay.
//! [`CameraBackend`] is that capability set; each SDK gets one
//! implementation, and [`CameraService`] serializes access from the scan
//! loop and the operator front end.

#[cfg(feature = "native-camera")]
pub mod native;
pub mod service;

use crate::errors::{CameraError, ScanError};
use crate::overlay::Overlay;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use service::CameraService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 640x480 preview, as used for operator alignment.
    pub const fn vga() -> Self {
        Self::new(640, 480)
    }

    /// Full 12MP still from the HQ sensor.
    pub const fn hq_still() -> Self {
        Self::new(4056, 3040)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| ScanError::invalid_argument(format!("resolution should be WIDTHxHEIGHT, got {s:?}")))?;
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| ScanError::invalid_argument(format!("invalid width in {s:?}")))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| ScanError::invalid_argument(format!("invalid height in {s:?}")))?;
        if width == 0 || height == 0 {
            return Err(ScanError::invalid_argument(format!("resolution must be non-zero, got {s:?}")));
        }
        Ok(Self { width, height })
    }
}

/// Sensor rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Accepts any multiple of 90, normalized into `0..360`.
    pub fn from_degrees(degrees: i32) -> Result<Self, ScanError> {
        match degrees.rem_euclid(360) {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err(ScanError::invalid_argument(format!(
                "rotation must be a multiple of 90 degrees, got {degrees}"
            ))),
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

impl TryFrom<i32> for Rotation {
    type Error = ScanError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_degrees(value)
    }
}

impl From<Rotation> for i32 {
    fn from(r: Rotation) -> i32 {
        r.degrees()
    }
}

/// On-screen placement of the preview, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewWindow {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PreviewWindow {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Identifies an overlay installed on a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayHandle(pub u64);

/// Narrow camera capability set.
///
/// Installing an overlay replaces any overlay already shown.
/// `capture_still` with an explicit resolution restores the previous
/// resolution afterwards.
pub trait CameraBackend: Send {
    fn name(&self) -> &str;

    fn start_preview(&mut self, window: PreviewWindow, alpha: u8) -> Result<(), CameraError>;

    fn stop_preview(&mut self) -> Result<(), CameraError>;

    fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CameraError>;

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), CameraError>;

    fn capture_still(&mut self, path: &Path, resolution: Option<Resolution>) -> Result<(), CameraError>;

    fn add_overlay(&mut self, overlay: &Overlay) -> Result<OverlayHandle, CameraError>;

    /// Remove `handle`, or the current overlay when `None`.
    fn remove_overlay(&mut self, handle: Option<OverlayHandle>) -> Result<(), CameraError>;

    /// Current digital gain, if the backend can report it.
    fn digital_gain(&mut self) -> Result<Option<f64>, CameraError> {
        Ok(None)
    }
}
