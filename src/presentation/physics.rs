//! Lattice overlap detector, the default physics collaborator.
//!
//! Compares footprints on the ground plane every frame and reports a
//! `ContactEvent` when a chicken/vehicle or probe/vegetation pair starts
//! overlapping. Pairs that keep overlapping are not reported again.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::assets::Footprint;
use crate::contact::{Category, ContactEvent};
use crate::game_state::GameState;
use crate::player::gate::Probe;
use crate::player::Player;
use crate::simulation::traffic::Vehicle;
use crate::world::vegetation::Obstacle;
use crate::CrossingSet;

pub struct OverlapPlugin;

impl Plugin for OverlapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveOverlaps>()
            .add_systems(OnExit(GameState::GameOver), forget_overlaps)
            .add_systems(
                Update,
                detect_overlaps
                    .after(CrossingSet::Traffic)
                    .before(CrossingSet::Hud),
            );
    }
}

/// Half size of a probe zone on the ground plane.
const PROBE_HALF_EXTENT: f32 = 0.2;

#[derive(Resource, Default)]
struct ActiveOverlaps(HashSet<(Entity, Category)>);

/// Ground-plane rectangle overlap, centres and half extents in (x, z).
pub fn overlaps(a: Vec2, a_half: Vec2, b: Vec2, b_half: Vec2) -> bool {
    (a.x - b.x).abs() < a_half.x + b_half.x && (a.y - b.y).abs() < a_half.y + b_half.y
}

fn ground(translation: Vec3) -> Vec2 {
    translation.xz()
}

fn detect_overlaps(
    players: Query<(&Transform, &Footprint), With<Player>>,
    vehicles: Query<(Entity, &Transform, &Footprint), With<Vehicle>>,
    obstacles: Query<(Entity, &Transform, &Footprint), With<Obstacle>>,
    mut active: ResMut<ActiveOverlaps>,
    mut contacts: EventWriter<ContactEvent>,
) {
    let Ok((player, player_footprint)) = players.get_single() else {
        return;
    };
    let centre = ground(player.translation);
    let half = player_footprint.half_extents().xz();
    let mut current = HashSet::new();

    for (entity, transform, footprint) in vehicles.iter() {
        if overlaps(centre, half, ground(transform.translation), footprint.half_extents().xz()) {
            current.insert((entity, Category::Vehicle));
        }
    }

    for probe in Probe::ALL {
        let offset = probe.offset();
        let probe_centre = centre + Vec2::new(offset.x as f32, offset.z as f32);
        for (entity, transform, footprint) in obstacles.iter() {
            if overlaps(
                probe_centre,
                Vec2::splat(PROBE_HALF_EXTENT),
                ground(transform.translation),
                footprint.half_extents().xz(),
            ) {
                current.insert((entity, Category::Probe(probe)));
            }
        }
    }

    for &(_, category) in current.difference(&active.0) {
        let contact = match category {
            Category::Vehicle => ContactEvent::new(Category::Chicken, Category::Vehicle),
            probe => ContactEvent::new(Category::Vegetation, probe),
        };
        contacts.send(contact);
    }
    active.0 = current;
}

fn forget_overlaps(mut active: ResMut<ActiveOverlaps>) {
    active.0.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_overlap() {
        let half = Vec2::splat(0.5);
        assert!(overlaps(Vec2::ZERO, half, Vec2::new(0.9, 0.0), half));
        assert!(!overlaps(Vec2::ZERO, half, Vec2::new(1.0, 0.0), half));
        assert!(!overlaps(Vec2::ZERO, half, Vec2::new(0.0, -1.0), half));
    }

    #[test]
    fn probe_reaches_the_neighbouring_cell_only() {
        let probe = Vec2::splat(PROBE_HALF_EXTENT);
        let hedge = Vec2::splat(0.45);
        assert!(overlaps(Vec2::new(0.0, -1.0), probe, Vec2::new(0.0, -1.0), hedge));
        assert!(!overlaps(Vec2::new(0.0, -1.0), probe, Vec2::new(1.0, -1.0), hedge));
    }
}
