#[cfg(test)]
mod error_tests {
    use platescan::errors::{CameraError, ScanError};
    use std::error::Error;

    #[test]
    fn test_camera_error_display() {
        let error = CameraError::CaptureError("Display test".to_string());
        assert_eq!(format!("{}", error), "Capture error: Display test");
    }

    #[test]
    fn test_grid_error_names_dimensions() {
        let error = ScanError::InvalidGridSpecification { rows: 0, cols: 5 };
        let text = error.to_string();
        assert!(text.contains("rows=0"));
        assert!(text.contains("cols=5"));
    }

    #[test]
    fn test_camera_error_is_transparent() {
        let error: ScanError = CameraError::ControlError("no focus".to_string()).into();
        assert_eq!(error.to_string(), "Camera control error: no focus");
    }

    #[test]
    fn test_io_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = ScanError::io("/tmp/out.csv", io);
        assert!(error.to_string().contains("/tmp/out.csv"));
        assert!(error.source().is_some());
    }
}
