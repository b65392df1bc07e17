//! End-to-end scan runs against the mock camera and a recording channel.

use platescan::camera::CameraService;
use platescan::capture_log::{CaptureLog, HEADER};
use platescan::config::PlatescanConfig;
use platescan::geometry::CornerSet;
use platescan::planner::{generate_snake_path, GridSpec};
use platescan::printer::PrinterService;
use platescan::scan::{ScanRunner, ScanSettings};
use platescan::testing::{MockCameraBackend, RecordingChannel};
use platescan::timing::StopFlag;
use std::time::Duration;

fn config_for(dir: &std::path::Path) -> PlatescanConfig {
    let mut config = PlatescanConfig::default();
    config.scan.dwell_secs = 0.0;
    config.camera.settle_timeout_ms = 0;
    config.printer.reboot_wait_secs = 0.0;
    config.storage.output_directory = dir.display().to_string();
    config
}

#[test]
fn test_full_plate_scan() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());
    let channel = RecordingChannel::new();
    let mock = MockCameraBackend::new();
    let calls = mock.calls();
    let printer = PrinterService::with_channel(channel.clone(), config.printer.reboot_wait(), "/dev/null");
    let mut runner = ScanRunner::new(
        printer,
        CameraService::new(mock),
        ScanSettings::from_config(&config),
        StopFlag::new(),
    );

    let waypoints = generate_snake_path(&config.scan.corners, config.scan.grid().unwrap(), None).unwrap();
    let mut log = CaptureLog::create(&config.storage.capture_log_file()).unwrap();

    assert!(runner.home().unwrap());
    let report = runner.run(&waypoints, Some(&mut log)).unwrap();

    assert!(report.is_complete());
    assert_eq!(report.planned, 96);
    assert_eq!(calls.captures().len(), 96);
    assert_eq!(log.rows(), 96);

    let lines = channel.lines();
    assert_eq!(lines.len(), 98);
    assert_eq!(lines[0], "G28");
    assert_eq!(lines[1], "G90");

    let text = std::fs::read_to_string(config.storage.capture_log_file()).unwrap();
    let mut rows = text.lines();
    assert_eq!(rows.next(), Some(HEADER));
    assert!(rows.next().unwrap().starts_with("0,well_0000_"));
}

#[test]
fn test_stop_mid_scan() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.scan.dwell_secs = 0.05;

    let channel = RecordingChannel::new();
    let stop = StopFlag::new();
    let printer = PrinterService::with_channel(channel.clone(), Duration::ZERO, "/dev/null");
    let mut runner = ScanRunner::new(
        printer,
        CameraService::new(MockCameraBackend::new()),
        ScanSettings::from_config(&config),
        stop.clone(),
    );
    let waypoints = generate_snake_path(
        &CornerSet::rectangle(0.0, 0.0, 50.0, 50.0, 0.0),
        GridSpec::new(10, 10).unwrap(),
        None,
    )
    .unwrap();

    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(120));
        stop.stop();
    });
    let report = runner.run(&waypoints, None).unwrap();
    stopper.join().unwrap();

    assert!(report.cancelled);
    assert!(report.visited < 100);
    assert!(report.captures.len() <= report.visited);
    // One G90 plus one move per visited waypoint.
    assert_eq!(channel.lines().len(), report.visited + 1);
}
