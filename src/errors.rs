use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a camera backend.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Camera initialization error: {0}")]
    InitializationError(String),
    #[error("Capture error: {0}")]
    CaptureError(String),
    #[error("Camera control error: {0}")]
    ControlError(String),
    #[error("Camera backend error: {0}")]
    Backend(String),
}

/// Errors raised while planning, persisting or executing a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid grid specification: rows={rows}, cols={cols} (both must be >= 1)")]
    InvalidGridSpecification { rows: i64, cols: i64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timed out: {0}")]
    Timeout(String),
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_grid_error_display() {
        let err = ScanError::InvalidGridSpecification { rows: 0, cols: 3 };
        assert_eq!(
            err.to_string(),
            "Invalid grid specification: rows=0, cols=3 (both must be >= 1)"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = ScanError::io(
            "/nope/path.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("/nope/path.csv"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_camera_error_converts() {
        let err: ScanError = CameraError::CaptureError("sensor offline".to_string()).into();
        assert_eq!(err.to_string(), "Capture error: sensor offline");
    }
}
