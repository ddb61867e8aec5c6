use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crazy_road::player::{MoveDirection, MoveFinished, MoveIntent, PendingMove};
use crazy_road::simulation::traffic::vehicle_slots;
use crazy_road::world::vegetation::vegetation_layout;
use crazy_road::world::{LaneOdds, WorldConfig};
use crazy_road::CrossingPlugin;

fn core_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(WorldConfig {
            seed: Some(7),
            ..default()
        })
        // Bare grass so every forward hop is accepted.
        .insert_resource(LaneOdds {
            vegetation: u32::MAX,
            ..default()
        })
        .add_plugins(CrossingPlugin);
    app.update();
    app
}

fn hop_forward(app: &mut App) {
    app.world_mut().send_event(MoveIntent(MoveDirection::Forward));
    app.update();
    let ticket = app
        .world()
        .resource::<PendingMove>()
        .current()
        .map(|mv| mv.ticket);
    if let Some(ticket) = ticket {
        app.world_mut().send_event(MoveFinished { ticket });
    }
    app.update();
}

fn bench_populate(c: &mut Criterion) {
    c.bench_function("populate_world", |b| b.iter(|| black_box(core_app())));
}

fn bench_advance(c: &mut Criterion) {
    c.bench_function("hop_forward_x50", |b| {
        b.iter_batched(
            core_app,
            |mut app| {
                for _ in 0..50 {
                    hop_forward(&mut app);
                }
                app
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_layouts(c: &mut Criterion) {
    let odds = LaneOdds::default();
    let mut rng = StdRng::seed_from_u64(42);
    c.bench_function("vegetation_layout", |b| {
        b.iter(|| vegetation_layout(&mut rng, &odds, 21, black_box(-12), |_| false))
    });
    c.bench_function("vehicle_slots", |b| {
        b.iter(|| vehicle_slots(&mut rng, 21, odds.vehicle, black_box(4)))
    });
}

criterion_group!(benches, bench_populate, bench_advance, bench_layouts);
criterion_main!(benches);
