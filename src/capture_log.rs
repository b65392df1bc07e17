//! Append-only log of captured stills.
//!
//! One row per capture, written and flushed as soon as the still is on disk
//! so an interrupted scan still leaves a usable log.

use crate::errors::ScanError;
use crate::planner::Waypoint;
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const HEADER: &str = "image#,file_name,Xcoord,Ycoord,Zcoord,captured_at";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single logged capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    pub waypoint: Waypoint,
    pub file: PathBuf,
    pub captured_at: DateTime<Local>,
}

impl CaptureRecord {
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn to_row(&self) -> String {
        format!(
            "{},{},{:.2},{:.2},{:.2},{}",
            self.waypoint.index,
            self.file_name(),
            self.waypoint.x,
            self.waypoint.y,
            self.waypoint.z,
            self.captured_at.format(TIMESTAMP_FORMAT)
        )
    }
}

pub struct CaptureLog {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: usize,
}

impl CaptureLog {
    /// Create (or truncate) the log at `path` and write the header.
    pub fn create(path: &Path) -> Result<Self, ScanError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ScanError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| ScanError::io(path, e))?;

        let mut log = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            rows: 0,
        };
        log.write_line(HEADER)?;
        log::debug!("Capture log opened at {}", path.display());
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn append(&mut self, record: &CaptureRecord) -> Result<(), ScanError> {
        self.write_line(&record.to_row())?;
        self.rows += 1;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<(), ScanError> {
        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.write_all(b"\r\n"))
            .and_then(|_| self.writer.flush())
            .map_err(|e| ScanError::io(&self.path, e))
    }
}
