//! Cancellable waits for the scan loop.
//!
//! Every blocking wait in the crate goes through [`sleep_with_stop`] so an
//! operator stop is honoured within one polling chunk.

use crate::errors::ScanError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest uninterrupted sleep between stop checks.
pub const STOP_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Shared stop request.
///
/// Clones observe the same flag; the CLI sets it from the Ctrl-C handler.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    flag: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Sleep for `total`, waking every [`STOP_POLL_INTERVAL`] to check `stop`.
///
/// Returns `true` if the full duration elapsed, `false` if stopped early.
pub fn sleep_with_stop(total: Duration, stop: &StopFlag) -> bool {
    sleep_with_stop_chunked(total, stop, STOP_POLL_INTERVAL)
}

pub fn sleep_with_stop_chunked(total: Duration, stop: &StopFlag, chunk: Duration) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if stop.is_stopped() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(chunk.min(deadline - now));
    }
}

/// How long to wait for a sensor reading to stop changing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettlePolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Poll `probe` until two consecutive readings are equal.
///
/// Returns the settled value, or [`ScanError::Timeout`] once
/// `policy.timeout` has passed without two matching readings. A stop request
/// returns the last reading seen so far.
pub fn wait_until_stable<F>(mut probe: F, policy: SettlePolicy, stop: &StopFlag) -> Result<f64, ScanError>
where
    F: FnMut() -> Result<f64, ScanError>,
{
    let started = Instant::now();
    let mut previous = probe()?;
    loop {
        if !sleep_with_stop(policy.interval, stop) {
            return Ok(previous);
        }
        let current = probe()?;
        log::debug!("settle probe: {current}");
        if current == previous {
            return Ok(current);
        }
        if started.elapsed() >= policy.timeout {
            return Err(ScanError::Timeout(format!(
                "reading did not settle within {:?} (last {current})",
                policy.timeout
            )));
        }
        previous = current;
    }
}
