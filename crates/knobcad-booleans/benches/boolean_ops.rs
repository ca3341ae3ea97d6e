use criterion::{black_box, criterion_group, criterion_main, Criterion};
use knobcad_booleans::subtract;
use knobcad_math::Point2;
use knobcad_mesh::build;

fn cylinder(radius: f64, height: f64, sides: u32) -> knobcad_mesh::TriangleMesh {
    let shape = [
        Point2::new(0.0, 0.0),
        Point2::new(radius, 0.0),
        Point2::new(radius, height),
        Point2::new(0.0, height),
    ];
    build::lathe(&shape, Some(sides))
}

fn bench_subtract(c: &mut Criterion) {
    let body = cylinder(15.0, 30.0, 64);
    let hole = cylinder(5.0, 10.0, 64);

    c.bench_function("subtract_cylinder_hole", |b| {
        b.iter(|| subtract(black_box(&body), black_box(&hole)))
    });

    let coarse_body = cylinder(15.0, 30.0, 16);
    let coarse_hole = cylinder(5.0, 10.0, 16);
    c.bench_function("subtract_coarse", |b| {
        b.iter(|| subtract(black_box(&coarse_body), black_box(&coarse_hole)))
    });
}

criterion_group!(benches, bench_subtract);
criterion_main!(benches);
