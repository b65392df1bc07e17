//! Testing utilities for platescan
//!
//! In-memory stand-ins for the camera and the printer's serial line, so the
//! scan loop can be exercised offline.

pub mod synthetic_data;

pub use synthetic_data::synthetic_still;

use crate::camera::{CameraBackend, OverlayHandle, PreviewWindow, Resolution, Rotation};
use crate::errors::{CameraError, ScanError};
use crate::overlay::Overlay;
use crate::printer::CommandChannel;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A call received by [`MockCameraBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum CameraCall {
    StartPreview(PreviewWindow, u8),
    StopPreview,
    SetResolution(Resolution),
    SetRotation(Rotation),
    CaptureStill(PathBuf, Option<Resolution>),
    AddOverlay(OverlayHandle),
    RemoveOverlay(Option<OverlayHandle>),
}

/// Shared view of the calls a mock has received.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<CameraCall>>>,
}

impl CallLog {
    fn push(&self, call: CameraCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    pub fn snapshot(&self) -> Vec<CameraCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn captures(&self) -> Vec<PathBuf> {
        self.snapshot()
            .into_iter()
            .filter_map(|call| match call {
                CameraCall::CaptureStill(path, _) => Some(path),
                _ => None,
            })
            .collect()
    }
}

/// Camera backend that records calls and writes synthetic stills.
pub struct MockCameraBackend {
    calls: CallLog,
    resolution: Resolution,
    overlay: Option<OverlayHandle>,
    next_overlay: u64,
    captured: u64,
    fail_capture_at: Option<u64>,
    gain_readings: VecDeque<f64>,
    last_gain: Option<f64>,
}

impl Default for MockCameraBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCameraBackend {
    pub fn new() -> Self {
        Self {
            calls: CallLog::default(),
            resolution: Resolution::new(64, 48),
            overlay: None,
            next_overlay: 1,
            captured: 0,
            fail_capture_at: None,
            gain_readings: VecDeque::new(),
            last_gain: None,
        }
    }

    /// Digital gain readings to report, one per query; the last one repeats.
    pub fn with_gain_readings(mut self, readings: Vec<f64>) -> Self {
        self.gain_readings = readings.into();
        self
    }

    /// Make the capture with this zero-based number fail.
    pub fn failing_capture_at(mut self, capture_number: u64) -> Self {
        self.fail_capture_at = Some(capture_number);
        self
    }

    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }

    pub fn current_overlay(&self) -> Option<OverlayHandle> {
        self.overlay
    }
}

impl CameraBackend for MockCameraBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn start_preview(&mut self, window: PreviewWindow, alpha: u8) -> Result<(), CameraError> {
        self.calls.push(CameraCall::StartPreview(window, alpha));
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), CameraError> {
        self.calls.push(CameraCall::StopPreview);
        Ok(())
    }

    fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CameraError> {
        self.calls.push(CameraCall::SetResolution(resolution));
        self.resolution = resolution;
        Ok(())
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), CameraError> {
        self.calls.push(CameraCall::SetRotation(rotation));
        Ok(())
    }

    fn capture_still(&mut self, path: &Path, resolution: Option<Resolution>) -> Result<(), CameraError> {
        self.calls.push(CameraCall::CaptureStill(path.to_path_buf(), resolution));
        let number = self.captured;
        self.captured += 1;
        if self.fail_capture_at == Some(number) {
            return Err(CameraError::CaptureError(format!("simulated failure on capture {number}")));
        }

        // Stills are written small regardless of the requested size.
        let size = resolution.unwrap_or(self.resolution);
        let frame = synthetic_still(number, size.width.min(64), size.height.min(48));
        frame
            .save(path)
            .map_err(|e| CameraError::CaptureError(format!("Failed to save {}: {e}", path.display())))
    }

    fn add_overlay(&mut self, _overlay: &Overlay) -> Result<OverlayHandle, CameraError> {
        let handle = OverlayHandle(self.next_overlay);
        self.next_overlay += 1;
        self.overlay = Some(handle);
        self.calls.push(CameraCall::AddOverlay(handle));
        Ok(handle)
    }

    fn remove_overlay(&mut self, handle: Option<OverlayHandle>) -> Result<(), CameraError> {
        self.calls.push(CameraCall::RemoveOverlay(handle));
        if handle.is_none() || handle == self.overlay {
            self.overlay = None;
        }
        Ok(())
    }

    fn digital_gain(&mut self) -> Result<Option<f64>, CameraError> {
        if let Some(next) = self.gain_readings.pop_front() {
            self.last_gain = Some(next);
        }
        Ok(self.last_gain)
    }
}

/// Command channel that keeps every line it is sent.
///
/// Clones share the same line buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingChannel {
    lines: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<bool>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.lock().map(|c| *c).unwrap_or(false)
    }
}

impl CommandChannel for RecordingChannel {
    fn send_line(&mut self, line: &str) -> Result<(), ScanError> {
        if self.is_closed() {
            return Err(ScanError::Transport("recording channel is closed".to_string()));
        }
        self.lines
            .lock()
            .map_err(|_| ScanError::Transport("recording channel poisoned".to_string()))?
            .push(line.to_string());
        Ok(())
    }

    fn close(&mut self) -> Result<(), ScanError> {
        if let Ok(mut closed) = self.closed.lock() {
            *closed = true;
        }
        Ok(())
    }
}
