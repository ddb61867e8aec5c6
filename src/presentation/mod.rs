//! Windowed presentation around the gameplay core.
//!
//! Everything here is a collaborator of the core: it turns keys and swipes
//! into `MoveIntent`s, animates `MoveStarted` and answers `MoveFinished`,
//! reports shape overlaps as `ContactEvent`s, dresses entities with their
//! glTF scenes and draws the HUD. Requires `DefaultPlugins`.

use bevy::prelude::*;

pub mod animation;
pub mod hud;
pub mod input;
pub mod physics;
pub mod scene;

pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PresentationConfig>()
            .add_plugins(input::InputPlugin)
            .add_plugins(animation::AnimationPlugin)
            .add_plugins(physics::OverlapPlugin)
            .add_plugins(scene::ScenePlugin)
            .add_plugins(hud::HudPlugin);
    }
}

/// Tuning for the presentation collaborators.
#[derive(Resource, Clone, Debug)]
pub struct PresentationConfig {
    /// Seconds per hop.
    pub hop_duration: f32,
    /// Peak height of the hop arc.
    pub hop_height: f32,
    /// Seconds for the squash-and-fall after being run over.
    pub death_duration: f32,
    /// Minimum swipe length in logical pixels.
    pub swipe_threshold: f32,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            hop_duration: 0.12,
            hop_height: 0.5,
            death_duration: 0.8,
            swipe_threshold: 40.0,
        }
    }
}
