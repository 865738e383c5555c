use bevy::ecs::entity::Entity;
use criterion::{black_box, criterion_group, Criterion};
use gravity_tools::physics::gravity::relations::GravityRelations;

/// Every body inside every source
fn get_relations(sources: u32, bodies: u32) -> GravityRelations {
    let mut relations = GravityRelations::default();
    for source in 0..sources {
        for body in 0..bodies {
            let body = Entity::from_raw(sources + body);
            relations.track(Entity::from_raw(source), body, body, true);
        }
    }
    relations
}

fn bench_track_untrack(c: &mut Criterion) {
    let mut relations = get_relations(8, 256);
    let source = Entity::from_raw(0);
    let body = Entity::from_raw(10_000);
    c.bench_function("track_untrack", |b| {
        b.iter(|| {
            relations.track(black_box(source), black_box(body), black_box(body), true);
            relations.untrack(black_box(source), black_box(body));
        })
    });
}

fn bench_prune(c: &mut Criterion) {
    c.bench_function("prune_half_dead", |b| {
        b.iter_batched(
            || get_relations(8, 256),
            |mut relations| relations.prune(|_| true, |body| body.index() % 2 == 0, |_| true),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_track_untrack, bench_prune);
