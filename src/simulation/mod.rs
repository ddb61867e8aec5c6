//! Per-frame simulation: traffic motion and wraparound.
//!
//! Runs in every game state; traffic keeps moving behind the menu and the
//! game-over screen.

use bevy::prelude::*;

pub mod traffic;

use crate::CrossingSet;

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<traffic::TrafficConfig>().add_systems(
            Update,
            (traffic::drive_traffic, traffic::wrap_traffic)
                .chain()
                .in_set(CrossingSet::Traffic),
        );
    }
}
