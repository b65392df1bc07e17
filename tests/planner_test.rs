use platescan::errors::ScanError;
use platescan::geometry::{CornerSet, Point3};
use platescan::planner::{generate_snake_csv, generate_snake_path, parse_z_override, GridSpec};
use platescan::path_table;

fn square() -> CornerSet {
    CornerSet::new(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 0.0, 0.0),
        Point3::new(0.0, 10.0, 0.0),
        Point3::new(10.0, 10.0, 0.0),
    )
}

#[test]
fn test_two_by_two_scenario() {
    let path = generate_snake_path(&square(), GridSpec::new(2, 2).unwrap(), None).unwrap();
    let got: Vec<(usize, f64, f64, f64)> = path.iter().map(|w| (w.index, w.x, w.y, w.z)).collect();
    assert_eq!(
        got,
        vec![
            (0, 0.0, 0.0, 0.0),
            (1, 10.0, 0.0, 0.0),
            (2, 10.0, 10.0, 0.0),
            (3, 0.0, 10.0, 0.0),
        ]
    );
}

#[test]
fn test_degenerate_single_cell() {
    let path = generate_snake_path(&square(), GridSpec::new(1, 1).unwrap(), None).unwrap();
    assert_eq!(path.len(), 1);
    assert_eq!((path[0].x, path[0].y, path[0].z), (0.0, 0.0, 0.0));
}

#[test]
fn test_single_row_uses_top_edge() {
    let path = generate_snake_path(&square(), GridSpec::new(1, 3).unwrap(), None).unwrap();
    let xs: Vec<f64> = path.iter().map(|w| w.x).collect();
    assert_eq!(xs, vec![0.0, 5.0, 10.0]);
    assert!(path.iter().all(|w| w.y == 0.0));
}

#[test]
fn test_invalid_grid_rejected() {
    assert!(matches!(
        GridSpec::new(0, 4),
        Err(ScanError::InvalidGridSpecification { rows: 0, cols: 4 })
    ));
    assert!(matches!(
        GridSpec::new(3, -1),
        Err(ScanError::InvalidGridSpecification { rows: 3, cols: -1 })
    ));
}

#[test]
fn test_non_finite_override_rejected() {
    let grid = GridSpec::new(2, 2).unwrap();
    assert!(matches!(
        generate_snake_path(&square(), grid, Some(f64::INFINITY)),
        Err(ScanError::InvalidArgument(_))
    ));
    assert!(parse_z_override("abc").is_err());
    assert_eq!(parse_z_override("none").unwrap(), None);
    assert_eq!(parse_z_override("4.25").unwrap(), Some(4.25));
}

#[test]
fn test_generate_snake_csv_bit_exact() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("snake.csv");
    let waypoints = generate_snake_csv(&square(), GridSpec::new(2, 2).unwrap(), &out, Some(1.0)).unwrap();
    assert_eq!(waypoints.len(), 4);

    let bytes = std::fs::read(&out).unwrap();
    let expected = "image#,Xcoord,Ycoord,Zcoord\r\n\
                    0,0.00,0.00,1.00\r\n\
                    1,10.00,0.00,1.00\r\n\
                    2,10.00,10.00,1.00\r\n\
                    3,0.00,10.00,1.00\r\n";
    assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    assert_eq!(path_table::load_waypoints(&out).unwrap(), waypoints);
}

#[test]
fn test_unwritable_destination_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"x").unwrap();
    let out = blocker.join("snake.csv");

    let result = generate_snake_csv(&square(), GridSpec::new(2, 2).unwrap(), &out, None);
    assert!(matches!(result, Err(ScanError::Io { .. })));
    assert!(!out.exists());
}
