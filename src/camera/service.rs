use super::{CameraBackend, OverlayHandle, PreviewWindow, Resolution, Rotation};
use crate::errors::{CameraError, ScanError};
use crate::overlay::Overlay;
use crate::timing::{wait_until_stable, SettlePolicy, StopFlag};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Thread-safe façade over a camera backend.
///
/// Clones share the same backend; every call holds the lock for the whole
/// backend operation.
#[derive(Clone)]
pub struct CameraService {
    backend: Arc<Mutex<Box<dyn CameraBackend>>>,
}

impl CameraService {
    pub fn new<B: CameraBackend + 'static>(backend: B) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    pub fn from_boxed(backend: Box<dyn CameraBackend>) -> Self {
        log::info!("Camera service using backend '{}'", backend.name());
        Self {
            backend: Arc::new(Mutex::new(backend)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Box<dyn CameraBackend>>, CameraError> {
        self.backend
            .lock()
            .map_err(|_| CameraError::Backend("camera lock poisoned by previous panic".to_string()))
    }

    pub fn start_preview(&self, window: PreviewWindow, alpha: u8) -> Result<(), CameraError> {
        self.lock()?.start_preview(window, alpha)
    }

    pub fn stop_preview(&self) -> Result<(), CameraError> {
        self.lock()?.stop_preview()
    }

    pub fn set_resolution(&self, resolution: Resolution) -> Result<(), CameraError> {
        self.lock()?.set_resolution(resolution)
    }

    pub fn set_rotation(&self, rotation: Rotation) -> Result<(), CameraError> {
        self.lock()?.set_rotation(rotation)
    }

    pub fn capture_still(&self, path: &Path, resolution: Option<Resolution>) -> Result<(), CameraError> {
        log::debug!("Capturing still to {}", path.display());
        self.lock()?.capture_still(path, resolution)
    }

    pub fn add_overlay(&self, overlay: &Overlay) -> Result<OverlayHandle, CameraError> {
        self.lock()?.add_overlay(overlay)
    }

    pub fn remove_overlay(&self, handle: Option<OverlayHandle>) -> Result<(), CameraError> {
        self.lock()?.remove_overlay(handle)
    }

    /// Wait for the backend's digital gain to stop changing.
    ///
    /// Returns `Ok(None)` straight away for backends that cannot report gain.
    pub fn wait_for_gain_settle(&self, policy: SettlePolicy, stop: &StopFlag) -> Result<Option<f64>, ScanError> {
        if self.lock()?.digital_gain()?.is_none() {
            log::debug!("Backend reports no digital gain; skipping settle wait");
            return Ok(None);
        }
        let settled = wait_until_stable(
            || -> Result<f64, ScanError> {
                self.lock()?
                    .digital_gain()?
                    .ok_or_else(|| CameraError::Backend("digital gain became unavailable".to_string()).into())
            },
            policy,
            stop,
        )?;
        log::info!("Digital gain settled at {settled}");
        Ok(Some(settled))
    }
}
