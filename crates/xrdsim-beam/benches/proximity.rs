use criterion::{criterion_group, criterion_main, Criterion};
use std::f64::consts::PI;
use std::hint::black_box;
use xrdsim_beam::{Beam, Sphere};
use xrdsim_math::{Point3, Vec3};
use xrdsim_polytope::IntersectOptions;

fn slab_beam() -> Beam {
    let wavelength = 0.3;
    let k = 2.0 * PI / wavelength;
    let mut vertices = Vec::new();
    for &x in &[-50.0, 50.0] {
        for &y in &[-2.0, 2.0] {
            for &z in &[-0.5, 0.5] {
                vertices.push(Point3::new(x, y, z));
            }
        }
    }
    let k2 = Vec3::new(0.2f64.cos(), 0.2f64.sin(), 0.0) * k;
    Beam::new(&vertices, wavelength, Vec3::x() * k, k2, Vec3::new(0.0, 0.0, 1.0)).unwrap()
}

fn sphere_grid(n: usize) -> Vec<Sphere> {
    (0..n * n)
        .map(|i| {
            let (a, b) = ((i / n) as f64, (i % n) as f64);
            Sphere::new(Point3::new(a - n as f64 / 2.0, b - n as f64 / 2.0, 0.3), 0.6)
        })
        .collect()
}

fn bench_proximity(c: &mut Criterion) {
    let mut group = c.benchmark_group("proximity");
    let beam = slab_beam();
    let spheres = sphere_grid(32);

    group.bench_function("single_sphere", |b| {
        b.iter(|| beam.proximity_intervals(black_box(&spheres[100]), 50))
    });

    group.bench_function("batch_1024", |b| {
        b.iter(|| beam.proximity_intervals_batch(black_box(&spheres), 50))
    });

    group.finish();
}

fn bench_intersection(c: &mut Criterion) {
    let beam = slab_beam();
    let geometry = beam.geometry_at(0.5).unwrap();
    let tetrahedron = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.2),
        Point3::new(0.0, 1.0, -0.3),
        Point3::new(0.2, 0.3, 1.0),
    ];
    let options = IntersectOptions::default();

    c.bench_function("beam_tetrahedron_intersection", |b| {
        b.iter(|| geometry.intersect(black_box(&tetrahedron), &options))
    });
}

criterion_group!(benches, bench_proximity, bench_intersection);
criterion_main!(benches);
