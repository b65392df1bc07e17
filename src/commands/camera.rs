use crate::camera::{CameraService, OverlayHandle};
use crate::commands::run_blocking;
use crate::config::CameraConfig;
use crate::errors::ScanError;
use crate::overlay::{render_crosshair, CrosshairStyle};

/// Apply rotation and preview resolution, start the preview and show the
/// alignment crosshair on top of it.
pub async fn start_alignment_preview(
    camera: CameraService,
    config: CameraConfig,
    style: CrosshairStyle,
) -> Result<OverlayHandle, ScanError> {
    style.validate()?;
    run_blocking(move || {
        camera.set_rotation(config.rotation)?;
        camera.set_resolution(config.preview_resolution)?;
        camera.start_preview(config.preview_window, 255)?;
        let overlay = render_crosshair(&style, config.preview_window);
        let handle = camera.add_overlay(&overlay)?;
        log::info!(
            "Alignment preview started at {} with crosshair radius {}",
            config.preview_resolution,
            style.radius
        );
        Ok(handle)
    })
    .await
}

/// Replace the crosshair with one drawn in `style`.
pub async fn update_crosshair(
    camera: CameraService,
    config: CameraConfig,
    style: CrosshairStyle,
    current: Option<OverlayHandle>,
) -> Result<OverlayHandle, ScanError> {
    style.validate()?;
    run_blocking(move || {
        camera.remove_overlay(current)?;
        Ok(camera.add_overlay(&render_crosshair(&style, config.preview_window))?)
    })
    .await
}

pub async fn stop_alignment_preview(camera: CameraService, overlay: Option<OverlayHandle>) -> Result<(), ScanError> {
    run_blocking(move || {
        camera.remove_overlay(overlay)?;
        camera.stop_preview()?;
        log::info!("Alignment preview stopped");
        Ok(())
    })
    .await
}
