//! Run lifecycle: menu, playing, game over, and the reset back to the menu.
//!
//! `Menu` is left by the first directional input, `Playing` by a vehicle
//! hitting the chicken, and `GameOver` by the end of the death move. Leaving
//! `GameOver` tears the whole world down; entering `Menu` builds a fresh one.

use bevy::prelude::*;

use crate::contact::{ContactEvent, ContactKind};
use crate::player::{PendingMove, Player};
use crate::world::lanes::{Lane, LaneCounter, LaneMember, LaneWindow};
use crate::CrossingSet;

pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<Score>()
            .init_resource::<Hud>()
            .add_event::<ContactEvent>()
            .add_systems(OnEnter(GameState::GameOver), announce_game_over)
            .add_systems(OnExit(GameState::GameOver), teardown_world)
            .add_systems(
                Update,
                end_run_on_vehicle_hit
                    .run_if(in_state(GameState::Playing))
                    .in_set(CrossingSet::Contacts),
            )
            .add_systems(Update, sync_hud.in_set(CrossingSet::Hud));
    }
}

/// High-level game state. Exactly one is active at a time.
#[derive(States, Default, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum GameState {
    /// Fresh world, waiting for the first swipe.
    #[default]
    Menu,
    /// Input accepted, score counting.
    Playing,
    /// Chicken was run over; input ignored until the reset completes.
    GameOver,
}

/// Forward hops since the last reset.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score(pub u32);

/// What the HUD should show. Only written when the contents change, so the
/// HUD can react to `Res<Hud>::is_changed`.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub score: u32,
    /// Show the menu overlay instead of the running score.
    pub menu: bool,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            score: 0,
            menu: true,
        }
    }
}

fn end_run_on_vehicle_hit(
    mut contacts: EventReader<ContactEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if contacts
        .read()
        .any(|contact| contact.kind() == ContactKind::VehicleHit)
    {
        next_state.set(GameState::GameOver);
    }
}

fn announce_game_over(score: Res<Score>) {
    info!("Run over with score {}", score.0);
}

/// Despawn every lane, lane member and the player; zero the counters.
fn teardown_world(
    mut commands: Commands,
    doomed: Query<Entity, Or<(With<Lane>, With<LaneMember>, With<Player>)>>,
    mut window: ResMut<LaneWindow>,
    mut counter: ResMut<LaneCounter>,
    mut score: ResMut<Score>,
    mut pending: ResMut<PendingMove>,
) {
    let mut despawned = 0;
    for entity in doomed.iter() {
        commands.entity(entity).despawn();
        despawned += 1;
    }
    window.clear();
    counter.0 = 0;
    score.0 = 0;
    pending.cancel();
    debug!("Tore down {despawned} entities");
}

fn sync_hud(score: Res<Score>, state: Res<State<GameState>>, mut hud: ResMut<Hud>) {
    hud.set_if_neq(Hud {
        score: score.0,
        menu: *state.get() == GameState::Menu,
    });
}
