//! Motion command strings for the stage controller.

use crate::planner::Waypoint;

pub const HOME: &str = "G28";
pub const ABSOLUTE_POSITIONING: &str = "G90";

/// Rapid move to the waypoint, optionally at a fixed feed rate (mm/min).
pub fn move_to(waypoint: &Waypoint, feed_rate: Option<u32>) -> String {
    let mut cmd = format!(
        "G0 X{:.2} Y{:.2} Z{:.2}",
        waypoint.x, waypoint.y, waypoint.z
    );
    if let Some(feed) = feed_rate {
        cmd.push_str(&format!(" F{feed}"));
    }
    cmd
}

/// Commands for a full path: absolute positioning followed by one move per
/// waypoint, in path order.
pub fn path_commands(waypoints: &[Waypoint], feed_rate: Option<u32>) -> Vec<String> {
    std::iter::once(ABSOLUTE_POSITIONING.to_string())
        .chain(waypoints.iter().map(|wp| move_to(wp, feed_rate)))
        .collect()
}

/// Bytes sent on the wire for one command.
pub fn encode_line(command: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(command.len() + 1);
    bytes.extend_from_slice(command.trim_end().as_bytes());
    bytes.push(b'\n');
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_format() {
        let wp = Waypoint {
            index: 3,
            x: 12.5,
            y: -3.0,
            z: 0.126,
        };
        assert_eq!(move_to(&wp, None), "G0 X12.50 Y-3.00 Z0.13");
        assert_eq!(move_to(&wp, Some(1500)), "G0 X12.50 Y-3.00 Z0.13 F1500");
    }

    #[test]
    fn test_path_commands_start_absolute() {
        let wps = [
            Waypoint { index: 0, x: 0.0, y: 0.0, z: 1.0 },
            Waypoint { index: 1, x: 5.0, y: 0.0, z: 1.0 },
        ];
        let cmds = path_commands(&wps, None);
        assert_eq!(cmds, vec!["G90", "G0 X0.00 Y0.00 Z1.00", "G0 X5.00 Y0.00 Z1.00"]);
    }

    #[test]
    fn test_encode_line() {
        assert_eq!(encode_line("G28"), b"G28\n".to_vec());
        assert_eq!(encode_line("G28\n"), b"G28\n".to_vec());
    }
}
