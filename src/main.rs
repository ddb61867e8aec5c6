//! Crazy Road - hop the chicken across endless roads.
//!
//! Set `CRAZY_ROAD_SEED` to replay the same world layout.

use bevy::prelude::*;

use crazy_road::presentation::PresentationPlugin;
use crazy_road::world::{parse_seed, WorldConfig};
use crazy_road::CrossingPlugin;

/// A `CRAZY_ROAD_SEED` that could not be used, reported once logging is up.
#[derive(Resource, Default)]
struct RejectedSeed(Option<String>);

fn report_rejected_seed(rejected: Res<RejectedSeed>) {
    if let Some(message) = &rejected.0 {
        warn!("{message}");
    }
}

fn main() {
    // Force Vulkan backend on Windows (DX12 causes crashes on some systems)
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");

    let raw = std::env::var("CRAZY_ROAD_SEED").ok();
    let (seed, rejected) = match parse_seed(raw.as_deref()) {
        Ok(seed) => (seed, None),
        Err(err) => (None, Some(format!("Ignoring CRAZY_ROAD_SEED={raw:?}: {err}"))),
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Crazy Road".into(),
                resolution: (450., 800.).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.55, 0.8, 0.95)))
        .insert_resource(WorldConfig {
            seed,
            ..default()
        })
        .insert_resource(RejectedSeed(rejected))
        .add_systems(Startup, report_rejected_seed)
        // Gameplay core
        .add_plugins(CrossingPlugin)
        // Rendering, input, animation, overlap detection
        .add_plugins(PresentationPlugin)
        .run();
}
