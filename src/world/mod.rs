//! World layout: the unit lattice, lane streaming and vegetation.

use std::num::ParseIntError;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub mod lanes;
pub mod odds;
pub mod vegetation;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldConfig>()
            .init_resource::<LaneOdds>()
            .init_resource::<WorldRng>()
            .add_plugins(lanes::LaneStreamPlugin);
    }
}

/// Global world configuration.
#[derive(Resource, Clone, Debug)]
pub struct WorldConfig {
    /// Playable columns span `-x_bound..=x_bound`.
    pub x_bound: i32,
    /// Lane width in cells.
    pub lane_width: u32,
    /// World z of the lane with z-index 0.
    pub base_offset: i32,
    /// Lanes created when the world is populated.
    pub initial_lanes: u32,
    /// Leading initial lanes forced to grass.
    pub safe_lanes: u32,
    /// Lanes created per forward hop.
    pub lanes_per_advance: u32,
    /// Player spawn cell.
    pub spawn: Cell,
    /// Fixed RNG seed, entropy when unset.
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            x_bound: 10,
            lane_width: 21,
            base_offset: 5,
            initial_lanes: 20,
            safe_lanes: 10,
            lanes_per_advance: 2,
            spawn: Cell::new(0, 0),
            seed: None,
        }
    }
}

impl WorldConfig {
    /// World z of the lane with the given z-index.
    pub fn lane_z(&self, z_index: u32) -> i32 {
        self.base_offset - z_index as i32
    }

    pub fn in_bounds(&self, x: i32) -> bool {
        (-self.x_bound..=self.x_bound).contains(&x)
    }

    /// Cells kept free of vegetation while populating: the spawn cell and
    /// the one in front of it.
    pub fn is_spawn_clearance(&self, cell: Cell) -> bool {
        cell == self.spawn || cell == Cell::new(self.spawn.x, self.spawn.z - 1)
    }
}

/// Parse a seed override such as the `CRAZY_ROAD_SEED` variable. Unset or
/// blank means no override.
pub fn parse_seed(raw: Option<&str>) -> Result<Option<u64>, ParseIntError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

/// Independent one-in-N odds for each procedural decision.
#[derive(Resource, Clone, Debug)]
pub struct LaneOdds {
    /// A new lane is grass with probability 1/grass.
    pub grass: u32,
    /// Each grass cell holds vegetation with probability 1/vegetation.
    pub vegetation: u32,
    /// Vegetation is a tree with probability 1/tree, a hedge otherwise.
    pub tree: u32,
    /// Each free road cell starts a vehicle with probability 1/vehicle.
    pub vehicle: u32,
}

impl Default for LaneOdds {
    fn default() -> Self {
        Self {
            grass: 3,
            vegetation: 7,
            tree: 2,
            vehicle: 5,
        }
    }
}

/// Session RNG shared by every procedural factory.
#[derive(Resource)]
pub struct WorldRng(pub StdRng);

impl FromWorld for WorldRng {
    fn from_world(world: &mut World) -> Self {
        let seed = world.get_resource::<WorldConfig>().and_then(|config| config.seed);
        match seed {
            Some(seed) => {
                info!("World seed: {seed}");
                Self(StdRng::seed_from_u64(seed))
            }
            None => Self(StdRng::from_entropy()),
        }
    }
}

/// A position on the unit lattice. Forward is toward negative z.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn offset(self, by: Cell) -> Self {
        Self::new(self.x + by.x, self.z + by.z)
    }

    /// Nearest lattice cell to a world position.
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation.x.round() as i32, translation.z.round() as i32)
    }

    pub fn to_translation(self, y: f32) -> Vec3 {
        Vec3::new(self.x as f32, y, self.z as f32)
    }
}
