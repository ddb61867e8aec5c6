//! Hop and death tweens for the chicken.
//!
//! Each `MoveStarted` becomes a tween on the player; when it runs out the
//! tween answers with `MoveFinished` for the same ticket. A newer move
//! replaces the running tween, whose ticket then simply never resolves.

use std::f32::consts::PI;

use bevy::prelude::*;

use crate::player::{ActiveMove, MoveFinished, MoveKind, MoveStarted, Player};
use crate::presentation::PresentationConfig;
use crate::CrossingSet;

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (start_tweens, run_tweens)
                .chain()
                .after(CrossingSet::Moves)
                .before(CrossingSet::Lanes),
        );
    }
}

#[derive(Component, Debug)]
struct Tween {
    active: ActiveMove,
    elapsed: f32,
    duration: f32,
}

impl Tween {
    fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }
}

fn start_tweens(
    mut commands: Commands,
    mut started: EventReader<MoveStarted>,
    players: Query<Entity, With<Player>>,
    config: Res<PresentationConfig>,
) {
    let Ok(player) = players.get_single() else {
        return;
    };
    for MoveStarted(active) in started.read() {
        let duration = match active.kind {
            MoveKind::Step(_) => config.hop_duration,
            MoveKind::Death => config.death_duration,
        };
        commands.entity(player).insert(Tween {
            active: *active,
            elapsed: 0.0,
            duration,
        });
    }
}

fn run_tweens(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<PresentationConfig>,
    mut tweens: Query<(Entity, &mut Tween, &mut Transform)>,
    mut finished: EventWriter<MoveFinished>,
) {
    for (entity, mut tween, mut transform) in tweens.iter_mut() {
        tween.elapsed += time.delta_secs();
        let t = tween.progress();
        let from = tween.active.from.to_translation(0.0);
        let to = tween.active.to.to_translation(0.0);

        match tween.active.kind {
            MoveKind::Step(_) => {
                transform.translation = from.lerp(to, t);
                transform.translation.y = (t * PI).sin() * config.hop_height;
            }
            MoveKind::Death => {
                // Flatten, then sink out of sight.
                transform.scale = Vec3::new(1.0 + t * 0.6, (1.0 - t).max(0.05), 1.0 + t * 0.6);
                transform.translation.y = -t * 2.0;
            }
        }

        if t >= 1.0 {
            finished.send(MoveFinished {
                ticket: tween.active.ticket,
            });
            commands.entity(entity).remove::<Tween>();
        }
    }
}
