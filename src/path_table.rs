//! Waypoint table persistence.
//!
//! Format: header `image#,Xcoord,Ycoord,Zcoord`, then one `\r\n`-terminated
//! row per waypoint with the index as an integer and every coordinate fixed
//! to two decimals. Downstream tooling parses this byte for byte.

use crate::errors::ScanError;
use crate::planner::Waypoint;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const HEADER: [&str; 4] = ["image#", "Xcoord", "Ycoord", "Zcoord"];
const LINE_END: &str = "\r\n";

/// Format a single table row, without the line terminator.
pub fn format_row(waypoint: &Waypoint) -> String {
    format!(
        "{},{:.2},{:.2},{:.2}",
        waypoint.index, waypoint.x, waypoint.y, waypoint.z
    )
}

/// Write the table to any sink.
pub fn write_waypoints<W: Write>(mut out: W, waypoints: &[Waypoint]) -> std::io::Result<()> {
    write!(out, "{}{}", HEADER.join(","), LINE_END)?;
    for wp in waypoints {
        write!(out, "{}{}", format_row(wp), LINE_END)?;
    }
    out.flush()
}

/// Render the table to a string.
pub fn to_table_string(waypoints: &[Waypoint]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_waypoints(&mut buf, waypoints);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Save the table to `path`.
///
/// Rows go to a uniquely named temporary file in the same directory, which
/// replaces `path` only after every row has been synced. Concurrent saves to
/// the same target each use their own temporary; the last rename wins and
/// the target always holds one complete table.
pub fn save_waypoints(path: &Path, waypoints: &[Waypoint]) -> Result<(), ScanError> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| ScanError::io(parent, e))?;
            parent.to_path_buf()
        }
        None => PathBuf::from("."),
    };

    // A NamedTempFile that is dropped before persisting deletes itself.
    let written = NamedTempFile::new_in(&dir)
        .and_then(|tmp| {
            let mut out = BufWriter::new(tmp);
            write_waypoints(&mut out, waypoints)?;
            let tmp = out.into_inner().map_err(|e| e.into_error())?;
            tmp.as_file().sync_all()?;
            Ok(tmp)
        })
        .and_then(|tmp| tmp.persist(path).map(|_| ()).map_err(|e| e.error));

    if let Err(e) = written {
        log::error!("Failed to write waypoint table {}: {}", path.display(), e);
        return Err(ScanError::io(path, e));
    }
    Ok(())
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, name: &str, line_no: usize) -> Result<T, ScanError> {
    let raw = field
        .map(str::trim)
        .ok_or_else(|| ScanError::invalid_argument(format!("line {line_no}: missing {name}")))?;
    raw.parse().map_err(|_| {
        ScanError::invalid_argument(format!("line {line_no}: invalid {name} {raw:?}"))
    })
}

/// Parse a waypoint table.
pub fn read_waypoints<R: BufRead>(input: R) -> Result<Vec<Waypoint>, ScanError> {
    let mut lines = input.lines().enumerate();

    match lines.next() {
        Some((_, Ok(header))) if header.trim_end_matches('\r') == HEADER.join(",") => {}
        Some((_, Ok(header))) => {
            return Err(ScanError::invalid_argument(format!(
                "line 1: unexpected header {header:?}"
            )))
        }
        Some((_, Err(e))) => return Err(ScanError::io("<waypoint table>", e)),
        None => return Err(ScanError::invalid_argument("empty waypoint table")),
    }

    let mut waypoints = Vec::new();
    for (i, line) in lines {
        let line_no = i + 1;
        let line = line.map_err(|e| ScanError::io("<waypoint table>", e))?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split(',');
        let index = parse_field(fields.next(), "image#", line_no)?;
        let x = parse_field(fields.next(), "Xcoord", line_no)?;
        let y = parse_field(fields.next(), "Ycoord", line_no)?;
        let z = parse_field(fields.next(), "Zcoord", line_no)?;
        if fields.next().is_some() {
            return Err(ScanError::invalid_argument(format!(
                "line {line_no}: too many fields"
            )));
        }
        waypoints.push(Waypoint { index, x, y, z });
    }
    Ok(waypoints)
}

/// Load a waypoint table from disk.
pub fn load_waypoints(path: &Path) -> Result<Vec<Waypoint>, ScanError> {
    let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
    read_waypoints(BufReader::new(file))
}
