//! Stage controller access over a line-oriented command channel.

use crate::config::PrinterConfig;
use crate::errors::ScanError;
use crate::gcode;
use crate::timing::{sleep_with_stop, StopFlag};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Transport that accepts one command per line.
pub trait CommandChannel: Send {
    fn send_line(&mut self, line: &str) -> Result<(), ScanError>;

    fn close(&mut self) -> Result<(), ScanError> {
        Ok(())
    }
}

/// Channel over any byte sink.
#[derive(Debug)]
pub struct WriteChannel<W: Write + Send> {
    sink: Option<W>,
    label: String,
}

impl<W: Write + Send> WriteChannel<W> {
    pub fn new(sink: W, label: impl Into<String>) -> Self {
        Self {
            sink: Some(sink),
            label: label.into(),
        }
    }

    pub fn into_inner(self) -> Option<W> {
        self.sink
    }
}

impl<W: Write + Send> CommandChannel for WriteChannel<W> {
    fn send_line(&mut self, line: &str) -> Result<(), ScanError> {
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| ScanError::Transport(format!("{} is closed", self.label)))?;
        sink.write_all(&gcode::encode_line(line))
            .and_then(|_| sink.flush())
            .map_err(|e| ScanError::Transport(format!("write to {} failed: {}", self.label, e)))
    }

    fn close(&mut self) -> Result<(), ScanError> {
        if let Some(mut sink) = self.sink.take() {
            sink.flush()
                .map_err(|e| ScanError::Transport(format!("flush of {} failed: {}", self.label, e)))?;
        }
        Ok(())
    }
}

/// Serial device node opened for writing. Line settings (baud rate) are
/// expected to be configured on the device beforehand.
pub type SerialChannel = WriteChannel<File>;

pub fn open_serial(device_path: &Path) -> Result<SerialChannel, ScanError> {
    let file = OpenOptions::new()
        .write(true)
        .open(device_path)
        .map_err(|e| ScanError::io(device_path, e))?;
    Ok(WriteChannel::new(file, device_path.display().to_string()))
}

/// A serial-connected 3D printer used as an XYZ stage.
pub struct PrinterService<C: CommandChannel> {
    channel: C,
    reboot_wait: Duration,
    device_path: PathBuf,
}

impl PrinterService<SerialChannel> {
    pub fn open(config: &PrinterConfig) -> Result<Self, ScanError> {
        let path = PathBuf::from(&config.device_path);
        log::info!(
            "Opening printer at {} ({} baud)",
            path.display(),
            config.baud_rate
        );
        let channel = open_serial(&path)?;
        Ok(Self::with_channel(channel, config.reboot_wait(), path))
    }
}

impl<C: CommandChannel> PrinterService<C> {
    pub fn with_channel(channel: C, reboot_wait: Duration, device_path: impl Into<PathBuf>) -> Self {
        Self {
            channel,
            reboot_wait,
            device_path: device_path.into(),
        }
    }

    pub fn device_path(&self) -> &Path {
        &self.device_path
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Home all axes, then give the controller `reboot_wait` to finish.
    ///
    /// Returns `false` if the wait was cut short by `stop`.
    pub fn home(&mut self, stop: &StopFlag) -> Result<bool, ScanError> {
        self.run_gcode(gcode::HOME)?;
        Ok(sleep_with_stop(self.reboot_wait, stop))
    }

    pub fn run_gcode(&mut self, gcode: &str) -> Result<(), ScanError> {
        log::debug!("-> {}", gcode);
        self.channel.send_line(gcode)
    }

    /// Send each command, dwelling after each one. Stops before the next
    /// command once `stop` is set; returns how many commands were sent.
    pub fn run_path<S: AsRef<str>>(
        &mut self,
        commands: &[S],
        dwell: Duration,
        stop: &StopFlag,
    ) -> Result<usize, ScanError> {
        let mut sent = 0;
        for cmd in commands {
            if stop.is_stopped() {
                log::info!("Path stopped after {} of {} commands", sent, commands.len());
                break;
            }
            self.run_gcode(cmd.as_ref())?;
            sent += 1;
            sleep_with_stop(dwell, stop);
        }
        Ok(sent)
    }

    pub fn close(&mut self) -> Result<(), ScanError> {
        self.channel.close()
    }
}
