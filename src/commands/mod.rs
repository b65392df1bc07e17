//! Async entry points over the blocking core.
//!
//! Planning is cheap and runs inline; anything that touches the filesystem,
//! the printer or the camera is moved onto tokio's blocking pool.

pub mod camera;
pub mod plan;
pub mod scan;

use crate::errors::ScanError;

pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T, ScanError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ScanError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ScanError::Transport(format!("Task join error: {}", e)))?
}
