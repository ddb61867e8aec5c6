//! Lane streaming.
//!
//! The lane window is a ring of live lanes anchored to the player's progress.
//! Every accepted forward hop creates new lanes ahead; lanes that are both
//! behind the player and out of the follow camera's view are evicted, oldest
//! first, together with everything they own.

use std::collections::VecDeque;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::Rng;
use smallvec::SmallVec;

use crate::assets::{models_valid, ModelRegistry};
use crate::camera::frustum::FrustumPlanes;
use crate::camera::FollowCamera;
use crate::game_state::GameState;
use crate::player::Player;
use crate::simulation::traffic::{self, Traffic, TrafficConfig};
use crate::world::odds::random_bool;
use crate::world::vegetation;
use crate::world::{LaneOdds, WorldConfig, WorldRng};
use crate::CrossingSet;

pub struct LaneStreamPlugin;

impl Plugin for LaneStreamPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LaneWindow>()
            .init_resource::<LaneCounter>()
            .add_event::<AdvanceLanes>()
            .add_event::<LanesAdvanced>()
            .add_systems(
                OnEnter(GameState::Menu),
                populate_world.run_if(models_valid),
            )
            .add_systems(Update, advance_lanes.in_set(CrossingSet::Lanes));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaneKind {
    Grass,
    Road,
}

/// One strip of terrain. Owns its vegetation or traffic.
#[derive(Component, Debug)]
pub struct Lane {
    pub kind: LaneKind,
    /// Width in cells.
    pub width: u32,
    /// Creation order; strictly increasing across the session.
    pub z_index: u32,
    /// World z of the lane's centre line.
    pub z: i32,
    /// Vegetation planted on a grass lane.
    pub obstacles: SmallVec<[Entity; 8]>,
    /// Traffic driving on a road lane.
    pub traffic: Option<Traffic>,
}

impl Lane {
    /// Every entity the lane owns.
    pub fn members(&self) -> impl Iterator<Item = Entity> + '_ {
        self.obstacles.iter().copied().chain(
            self.traffic
                .iter()
                .flat_map(|traffic| traffic.vehicles.iter().copied()),
        )
    }

    /// Bounding box of the lane's strip.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let half_width = self.width as f32 / 2.0;
        let z = self.z as f32;
        (
            Vec3::new(-half_width, -0.4, z - 0.5),
            Vec3::new(half_width, 0.4, z + 0.5),
        )
    }
}

/// Owning lane of an obstacle or vehicle.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneMember(pub Entity);

/// Live lanes ordered by z-index, oldest at the front.
#[derive(Resource, Default, Debug)]
pub struct LaneWindow {
    lanes: VecDeque<Entity>,
}

impl LaneWindow {
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.lanes.iter().copied()
    }

    pub fn clear(&mut self) {
        self.lanes.clear();
    }

    fn push(&mut self, lane: Entity) {
        self.lanes.push_back(lane);
    }

    fn remove(&mut self, lane: Entity) {
        self.lanes.retain(|&live| live != lane);
    }
}

/// Number of lanes created since the last reset (`laneCount`).
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneCounter(pub u32);

/// Extend the window ahead and trim it behind. Sent once per accepted
/// forward hop.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct AdvanceLanes;

/// Outcome of one window advance.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LanesAdvanced {
    pub created: u32,
    pub evicted: u32,
}

/// Lane type for the lane with the given z-index. The first `safe_lanes` of
/// an initial population are always grass.
pub fn pick_lane_kind<R: Rng + ?Sized>(
    rng: &mut R,
    odds: &LaneOdds,
    z_index: u32,
    safe_lanes: u32,
    initial: bool,
) -> LaneKind {
    if initial && z_index < safe_lanes {
        return LaneKind::Grass;
    }
    if random_bool(rng, odds.grass) {
        LaneKind::Grass
    } else {
        LaneKind::Road
    }
}

/// A lane is evicted once it is behind the player and out of view.
pub fn should_evict(lane: &Lane, player_z: i32, frustum: &FrustumPlanes) -> bool {
    let (min, max) = lane.bounds();
    lane.z > player_z && !frustum.test_aabb(min, max)
}

/// Everything needed to create and destroy lanes.
#[derive(SystemParam)]
pub struct LaneFactory<'w, 's> {
    commands: Commands<'w, 's>,
    rng: ResMut<'w, WorldRng>,
    counter: ResMut<'w, LaneCounter>,
    window: ResMut<'w, LaneWindow>,
    config: Res<'w, WorldConfig>,
    odds: Res<'w, LaneOdds>,
    traffic: Res<'w, TrafficConfig>,
    models: Res<'w, ModelRegistry>,
}

impl LaneFactory<'_, '_> {
    /// Create the next lane ahead, stocked with vegetation or traffic.
    pub fn create_lane(&mut self, initial: bool) -> Entity {
        let z_index = self.counter.0;
        self.counter.0 += 1;
        let z = self.config.lane_z(z_index);
        let kind = pick_lane_kind(
            &mut self.rng.0,
            &self.odds,
            z_index,
            self.config.safe_lanes,
            initial,
        );

        let lane = self.commands.spawn_empty().id();
        let (obstacles, traffic) = match kind {
            LaneKind::Grass => (
                vegetation::plant(
                    &mut self.commands,
                    &mut self.rng.0,
                    &self.odds,
                    &self.models,
                    &self.config,
                    lane,
                    z,
                    initial,
                ),
                None,
            ),
            LaneKind::Road => (
                SmallVec::new(),
                Some(traffic::generate(
                    &mut self.commands,
                    &mut self.rng.0,
                    &self.traffic,
                    &self.odds,
                    &self.models,
                    &self.config,
                    lane,
                    z,
                )),
            ),
        };

        self.commands.entity(lane).insert((
            Lane {
                kind,
                width: self.config.lane_width,
                z_index,
                z,
                obstacles,
                traffic,
            },
            Transform::from_xyz(0.0, 0.0, z as f32),
            Name::new(format!("{kind:?} lane {z_index}")),
        ));
        self.window.push(lane);
        lane
    }

    /// Despawn a lane and everything it owns.
    pub fn destroy_lane(&mut self, entity: Entity, lane: &Lane) {
        for member in lane.members() {
            self.commands.entity(member).despawn();
        }
        self.commands.entity(entity).despawn();
        self.window.remove(entity);
    }
}

fn populate_world(mut factory: LaneFactory) {
    let count = factory.config.initial_lanes;
    for _ in 0..count {
        factory.create_lane(true);
    }
    info!(
        "Populated world with {} lanes ({} safe)",
        count,
        factory.config.safe_lanes.min(count)
    );
}

/// Creation is unconditional and eviction only trims behind the player, so
/// with two lanes per hop the lead ahead of the player grows by one lane per
/// hop. The count behind the player stays bounded by the camera frustum.
fn advance_lanes(
    mut requests: EventReader<AdvanceLanes>,
    mut factory: LaneFactory,
    lanes: Query<&Lane>,
    players: Query<&Player>,
    camera: Res<FollowCamera>,
    mut advanced: EventWriter<LanesAdvanced>,
) {
    for _ in requests.read() {
        let per_advance = factory.config.lanes_per_advance;
        for _ in 0..per_advance {
            factory.create_lane(false);
        }

        let Ok(player) = players.get_single() else {
            advanced.send(LanesAdvanced {
                created: per_advance,
                evicted: 0,
            });
            continue;
        };
        let frustum = camera.frustum_for(player.cell.to_translation(0.0));

        // Window order is z-index order, so eviction runs oldest first.
        let stale: Vec<(Entity, &Lane)> = factory
            .window
            .iter()
            .filter_map(|entity| lanes.get(entity).ok().map(|lane| (entity, lane)))
            .filter(|(_, lane)| should_evict(lane, player.cell.z, &frustum))
            .collect();

        let evicted = stale.len() as u32;
        for (entity, lane) in stale {
            factory.destroy_lane(entity, lane);
        }

        debug!(
            "Lane window advanced: +{} -{} (lane count {})",
            per_advance, evicted, factory.counter.0
        );
        advanced.send(LanesAdvanced {
            created: per_advance,
            evicted,
        });
    }
}
