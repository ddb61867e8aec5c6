//! Crazy Road - an endless lane-hopping runner.
//!
//! The gameplay core (`CrossingPlugin`) streams procedural lanes around the
//! player, gates movement on directional probes, and runs the
//! menu/playing/game-over lifecycle. It needs only `MinimalPlugins` and the
//! `StatesPlugin`; rendering, input devices and asset loading live in
//! [`presentation`] and are added by the binary.

use bevy::prelude::*;

pub mod assets;
pub mod camera;
pub mod contact;
pub mod game_state;
pub mod player;
pub mod presentation;
pub mod simulation;
pub mod world;

/// Ordering of the per-frame gameplay work.
///
/// Contacts are applied before input so a chicken hit by a car in the same
/// frame as a swipe never hops.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CrossingSet {
    Contacts,
    Moves,
    Lanes,
    Traffic,
    Hud,
}

pub struct CrossingPlugin;

impl Plugin for CrossingPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                CrossingSet::Contacts,
                CrossingSet::Moves,
                CrossingSet::Lanes,
                CrossingSet::Traffic,
                CrossingSet::Hud,
            )
                .chain(),
        )
        .add_plugins(assets::AssetRegistryPlugin)
        .add_plugins(camera::CameraPlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(simulation::SimulationPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(game_state::GameStatePlugin);
    }
}
