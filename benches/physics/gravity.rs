use bevy::math::Vec3;
use criterion::{black_box, criterion_group, Criterion};
use gravity_tools::physics::gravity::righting::SelfRightingBody;
use gravity_tools::physics::gravity::source::{GravitySource, PointMass};
use gravity_tools::physics::units::{Distance, Mass};

const CM: Distance = Distance::from_centimeters(1.0);

/// Sources spread out along the x axis
fn get_sources(count: usize) -> Vec<(GravitySource, Vec3)> {
    (0..count)
        .map(|i| {
            let source = GravitySource::new(
                Distance::from_meters(10.0),
                Mass::from_kilograms(1.0e12 * (i + 1) as f32),
            );
            (source, Vec3::X * 1000.0 * i as f32)
        })
        .collect()
}

fn bench_gravitational_vector(c: &mut Criterion) {
    let (source, at) = get_sources(1).remove(0);
    let body = PointMass::new(Vec3::new(2000.0, 300.0, -50.0), 80.0);
    c.bench_function("gravitational_vector_towards", |b| {
        b.iter(|| source.gravitational_vector_towards(black_box(at), black_box(&body), CM))
    });
}

fn bench_strongest_gravitational_vector(c: &mut Criterion) {
    let sources = get_sources(64);
    let body = PointMass::new(Vec3::new(500.0, 500.0, 0.0), 80.0);
    c.bench_function("strongest_gravitational_vector_64", |b| {
        b.iter(|| {
            SelfRightingBody::strongest_gravitational_vector(
                black_box(&body),
                Vec3::NEG_Y * 9.81,
                sources.iter().map(|(source, at)| (source, *at)),
                CM,
            )
        })
    });
}

criterion_group!(
    benches,
    bench_gravitational_vector,
    bench_strongest_gravitational_vector
);
