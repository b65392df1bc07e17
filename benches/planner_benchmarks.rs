//! Planner benchmarks
//!
//! Run with: cargo bench --bench planner_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use platescan::geometry::{CornerSet, Point3};
use platescan::gcode;
use platescan::path_table;
use platescan::planner::{generate_snake_path, GridSpec};

fn skewed_plate() -> CornerSet {
    CornerSet::new(
        Point3::new(12.1, 9.8, 4.0),
        Point3::new(111.4, 10.6, 4.2),
        Point3::new(11.5, 73.0, 3.9),
        Point3::new(110.9, 73.9, 4.4),
    )
}

fn bench_generate(c: &mut Criterion) {
    let corners = skewed_plate();
    let mut group = c.benchmark_group("generate_snake_path");
    for (rows, cols) in [(8u32, 12u32), (16, 24), (32, 48), (100, 100)] {
        let grid = GridSpec::new(rows as i64, cols as i64).unwrap();
        group.throughput(Throughput::Elements(grid.cell_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(format!("{rows}x{cols}")), &grid, |b, &g| {
            b.iter(|| generate_snake_path(black_box(&corners), black_box(g), None).unwrap())
        });
    }
    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let waypoints = generate_snake_path(&skewed_plate(), GridSpec::new(32, 48).unwrap(), None).unwrap();
    c.bench_function("path_table_32x48", |b| b.iter(|| path_table::to_table_string(black_box(&waypoints))));
    c.bench_function("gcode_32x48", |b| b.iter(|| gcode::path_commands(black_box(&waypoints), Some(3000))));
}

criterion_group!(benches, bench_generate, bench_serialize);
criterion_main!(benches);
