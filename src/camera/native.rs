//! Native camera backend built on nokhwa (V4L2 / Media Foundation /
//! AVFoundation).
//!
//! nokhwa has no on-screen preview or overlay plane, so preview state and the
//! current overlay are tracked here and stills are rotated in software.

use super::{CameraBackend, OverlayHandle, PreviewWindow, Resolution, Rotation};
use crate::errors::CameraError;
use crate::overlay::Overlay;
use image::{DynamicImage, RgbImage};
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraIndex, RequestedFormat, RequestedFormatType},
    CallbackCamera,
};
use std::path::Path;

pub struct NokhwaBackend {
    camera: CallbackCamera,
    device_index: u32,
    resolution: Resolution,
    rotation: Rotation,
    previewing: bool,
    stream_open: bool,
    overlay: Option<(OverlayHandle, Overlay)>,
    next_overlay: u64,
}

impl NokhwaBackend {
    pub fn open(device_index: u32, rotation: Rotation, preview: Resolution) -> Result<Self, CameraError> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::None);
        let camera = CallbackCamera::new(CameraIndex::Index(device_index), requested, |_| {})
            .map_err(|e| CameraError::InitializationError(format!("Failed to initialize camera {device_index}: {e}")))?;

        let mut backend = Self {
            camera,
            device_index,
            resolution: preview,
            rotation,
            previewing: false,
            stream_open: false,
            overlay: None,
            next_overlay: 1,
        };
        backend.apply_resolution(preview)?;
        log::info!("Opened camera {} at {}", device_index, preview);
        Ok(backend)
    }

    fn apply_resolution(&mut self, resolution: Resolution) -> Result<(), CameraError> {
        self.camera
            .set_resolution(nokhwa::utils::Resolution::new(resolution.width, resolution.height))
            .map_err(|e| CameraError::ControlError(format!("Failed to set resolution {resolution}: {e}")))?;
        self.resolution = resolution;
        Ok(())
    }

    fn ensure_stream(&mut self) -> Result<(), CameraError> {
        if !self.stream_open {
            self.camera
                .open_stream()
                .map_err(|e| CameraError::InitializationError(format!("Failed to start stream: {e}")))?;
            self.stream_open = true;
        }
        Ok(())
    }

    fn grab(&mut self) -> Result<RgbImage, CameraError> {
        self.ensure_stream()?;
        let buffer = self
            .camera
            .poll_frame()
            .map_err(|e| CameraError::CaptureError(format!("Failed to capture frame: {e}")))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureError(format!("Failed to decode frame: {e}")))?;
        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| CameraError::CaptureError("Frame buffer size mismatch".to_string()))
    }

    fn rotate(&self, frame: RgbImage) -> DynamicImage {
        let img = DynamicImage::ImageRgb8(frame);
        match self.rotation {
            Rotation::Deg0 => img,
            Rotation::Deg90 => img.rotate90(),
            Rotation::Deg180 => img.rotate180(),
            Rotation::Deg270 => img.rotate270(),
        }
    }
}

impl CameraBackend for NokhwaBackend {
    fn name(&self) -> &str {
        "nokhwa"
    }

    fn start_preview(&mut self, window: PreviewWindow, _alpha: u8) -> Result<(), CameraError> {
        self.ensure_stream()?;
        self.previewing = true;
        log::debug!(
            "Preview on camera {} at {}x{}+{}+{}",
            self.device_index,
            window.width,
            window.height,
            window.x,
            window.y
        );
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), CameraError> {
        if !self.previewing {
            log::debug!("Preview already stopped on camera {}", self.device_index);
            return Ok(());
        }
        self.previewing = false;
        Ok(())
    }

    fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CameraError> {
        self.apply_resolution(resolution)
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), CameraError> {
        self.rotation = rotation;
        Ok(())
    }

    fn capture_still(&mut self, path: &Path, resolution: Option<Resolution>) -> Result<(), CameraError> {
        let previous = self.resolution;
        if let Some(res) = resolution {
            self.apply_resolution(res)?;
        }
        let grabbed = self.grab();
        if resolution.is_some() {
            self.apply_resolution(previous)?;
        }

        let image = self.rotate(grabbed?);
        image
            .save(path)
            .map_err(|e| CameraError::CaptureError(format!("Failed to save {}: {e}", path.display())))
    }

    fn add_overlay(&mut self, overlay: &Overlay) -> Result<OverlayHandle, CameraError> {
        let handle = OverlayHandle(self.next_overlay);
        self.next_overlay += 1;
        self.overlay = Some((handle, overlay.clone()));
        Ok(handle)
    }

    fn remove_overlay(&mut self, handle: Option<OverlayHandle>) -> Result<(), CameraError> {
        match (handle, &self.overlay) {
            (Some(h), Some((current, _))) if h != *current => Ok(()),
            _ => {
                self.overlay = None;
                Ok(())
            }
        }
    }
}

impl Drop for NokhwaBackend {
    fn drop(&mut self) {
        if self.stream_open {
            if let Err(e) = self.camera.stop_stream() {
                log::warn!("Failed to stop camera stream: {}", e);
            }
        }
    }
}

// Only ever driven from behind CameraService's mutex.
unsafe impl Send for NokhwaBackend {}
