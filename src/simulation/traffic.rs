//! Road traffic: vehicle placement, one-directional driving and wraparound.
//!
//! Vehicles never leave their lane. A vehicle driving off one edge of the
//! world re-enters at the opposite edge, so traffic looks endless while the
//! number of vehicles per lane stays fixed.

use bevy::prelude::*;
use rand::Rng;
use smallvec::SmallVec;

use crate::assets::{ModelKey, ModelRegistry};
use crate::world::lanes::LaneMember;
use crate::world::odds::random_bool;
use crate::world::{Cell, LaneOdds, WorldConfig};

/// Configuration for road traffic.
#[derive(Resource, Clone, Debug)]
pub struct TrafficConfig {
    /// Number of vehicle types; tiers are `0..speed_tiers`.
    pub speed_tiers: u8,
    /// World units per second for a tier speed of 1.0.
    pub speed_scale: f32,
    /// Minimum distance in cells between vehicles on one lane.
    pub min_gap: u32,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            speed_tiers: 3,
            speed_scale: 2.0,
            min_gap: 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrafficDirection {
    Left,
    Right,
}

impl TrafficDirection {
    pub fn sign(self) -> f32 {
        match self {
            TrafficDirection::Left => -1.0,
            TrafficDirection::Right => 1.0,
        }
    }
}

/// Traffic owned by a road lane.
#[derive(Clone, Debug)]
pub struct Traffic {
    pub direction: TrafficDirection,
    pub speed_tier: u8,
    /// Vehicles in placement order (right edge first).
    pub vehicles: SmallVec<[Entity; 4]>,
}

impl Traffic {
    pub fn speed(&self) -> f32 {
        tier_speed(self.speed_tier)
    }

    /// Signed velocity along x for every vehicle in this lane.
    pub fn velocity(&self, config: &TrafficConfig) -> f32 {
        self.direction.sign() * self.speed() * config.speed_scale
    }
}

/// Relative speed of a vehicle tier. Never zero.
pub fn tier_speed(tier: u8) -> f32 {
    1.0 / (tier as f32 + 1.0) + 0.5
}

/// A vehicle on a road lane.
#[derive(Component, Clone, Copy, Debug)]
pub struct Vehicle {
    pub tier: u8,
}

/// Continuous one-directional motion. A vehicle carries at most one.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct TrafficDrive {
    /// Signed world units per second along x.
    pub velocity: f32,
}

/// Pick the x columns vehicles start at, scanning from the right edge.
///
/// Always yields at least one vehicle.
pub fn vehicle_slots<R: Rng + ?Sized>(
    rng: &mut R,
    width: u32,
    odds: u32,
    min_gap: u32,
) -> Vec<i32> {
    let right_edge = (width / 2) as i32;
    let mut slots: Vec<i32> = Vec::new();

    for index in 0..width as i32 {
        let x = right_edge - index;
        let too_close = slots
            .last()
            .is_some_and(|&last| last - x < min_gap as i32);
        if !too_close && random_bool(rng, odds) {
            slots.push(x);
        }
    }

    if slots.is_empty() {
        slots.push(rng.gen_range(-right_edge..=right_edge));
    }
    slots
}

/// Populate a road lane at `z` with traffic.
#[allow(clippy::too_many_arguments)]
pub fn generate<R: Rng + ?Sized>(
    commands: &mut Commands,
    rng: &mut R,
    config: &TrafficConfig,
    odds: &LaneOdds,
    models: &ModelRegistry,
    world: &WorldConfig,
    lane: Entity,
    z: i32,
) -> Traffic {
    let direction = if rng.gen_bool(0.5) {
        TrafficDirection::Left
    } else {
        TrafficDirection::Right
    };
    let speed_tier = rng.gen_range(0..config.speed_tiers.max(1));
    let mut traffic = Traffic {
        direction,
        speed_tier,
        vehicles: SmallVec::new(),
    };
    let model = ModelKey::Vehicle(speed_tier);
    let velocity = traffic.velocity(config);
    let facing = match direction {
        TrafficDirection::Right => Quat::IDENTITY,
        TrafficDirection::Left => Quat::from_rotation_y(std::f32::consts::PI),
    };

    traffic.vehicles = vehicle_slots(rng, world.lane_width, odds.vehicle, config.min_gap)
        .into_iter()
        .map(|x| {
            let vehicle = commands
                .spawn((
                    Vehicle { tier: speed_tier },
                    model,
                    models.footprint(model),
                    LaneMember(lane),
                    Transform::from_translation(Cell::new(x, z).to_translation(0.0))
                        .with_rotation(facing),
                    Name::new(format!("vehicle ({x}, {z})")),
                ))
                .id();
            set_drive(commands, vehicle, velocity);
            vehicle
        })
        .collect();

    traffic
}

/// Start a vehicle driving at `velocity` (signed, units per second).
pub fn set_drive(commands: &mut Commands, vehicle: Entity, velocity: f32) {
    commands.entity(vehicle).insert(TrafficDrive { velocity });
}

/// Wrap an x coordinate into `[-bound, bound]`, entering from the opposite edge.
pub fn wrap_position(x: f32, bound: f32) -> f32 {
    if x > bound {
        -bound
    } else if x < -bound {
        bound
    } else {
        x
    }
}

pub fn drive_traffic(
    time: Res<Time>,
    mut vehicles: Query<(&TrafficDrive, &mut Transform), With<Vehicle>>,
) {
    let dt = time.delta_secs();
    for (drive, mut transform) in vehicles.iter_mut() {
        transform.translation.x += drive.velocity * dt;
    }
}

/// Runs every frame, independent of how far a vehicle moved.
pub fn wrap_traffic(
    config: Res<WorldConfig>,
    mut vehicles: Query<&mut Transform, With<Vehicle>>,
) {
    let bound = config.x_bound as f32;
    for mut transform in vehicles.iter_mut() {
        let wrapped = wrap_position(transform.translation.x, bound);
        if wrapped != transform.translation.x {
            transform.translation.x = wrapped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn tier_speed_is_never_zero() {
        assert_eq!(tier_speed(0), 1.5);
        assert_eq!(tier_speed(1), 1.0);
        assert!((tier_speed(2) - (1.0 / 3.0 + 0.5)).abs() < f32::EPSILON);
        assert!(tier_speed(u8::MAX) > 0.5);
    }

    #[test]
    fn wrap_keeps_positions_in_bounds() {
        assert_eq!(wrap_position(10.0, 10.0), 10.0);
        assert_eq!(wrap_position(-10.0, 10.0), -10.0);
        assert_eq!(wrap_position(10.01, 10.0), -10.0);
        assert_eq!(wrap_position(-10.01, 10.0), 10.0);
        assert_eq!(wrap_position(3.5, 10.0), 3.5);

        let mut x = 9.0;
        for _ in 0..1000 {
            x = wrap_position(x + 0.37, 10.0);
            assert!((-10.0..=10.0).contains(&x));
        }
    }

    #[test]
    fn slots_respect_gap_and_are_never_empty() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..200 {
            let slots = vehicle_slots(&mut rng, 21, 3, 4);
            assert!(!slots.is_empty());
            assert!(slots.iter().all(|x| (-10..=10).contains(x)));
            assert!(slots.windows(2).all(|pair| pair[0] - pair[1] >= 4));
        }

        let lonely = vehicle_slots(&mut rng, 21, u32::MAX, 4);
        assert_eq!(lonely.len(), 1);
    }

    #[test]
    fn generated_vehicles_drive_at_the_lane_speed() {
        use bevy::ecs::world::CommandQueue;

        let mut world = World::new();
        let lane = world.spawn_empty().id();
        let config = TrafficConfig::default();
        let mut rng = StdRng::seed_from_u64(5);

        for z in -6..0 {
            let mut queue = CommandQueue::default();
            let traffic = {
                let mut commands = Commands::new(&mut queue, &world);
                generate(
                    &mut commands,
                    &mut rng,
                    &config,
                    &LaneOdds::default(),
                    &ModelRegistry::default(),
                    &WorldConfig::default(),
                    lane,
                    z,
                )
            };
            queue.apply(&mut world);

            assert!(!traffic.vehicles.is_empty());
            for &vehicle in &traffic.vehicles {
                let drive = world.get::<TrafficDrive>(vehicle).unwrap();
                assert_eq!(drive.velocity, traffic.velocity(&config));
                assert_eq!(drive.velocity.signum(), traffic.direction.sign());
                assert_eq!(world.get::<LaneMember>(vehicle).unwrap().0, lane);
            }
        }
    }

    #[test]
    fn traffic_moves_one_way_and_wraps_every_tick() {
        use std::time::Duration;

        let mut app = App::new();
        app.init_resource::<WorldConfig>()
            .init_resource::<Time>()
            .add_systems(Update, (drive_traffic, wrap_traffic).chain());

        let vehicle = app
            .world_mut()
            .spawn((
                Vehicle { tier: 0 },
                TrafficDrive { velocity: 3.0 },
                Transform::from_xyz(9.0, 0.0, -2.0),
            ))
            .id();

        let mut previous = 9.0;
        let mut wrapped = false;
        for _ in 0..20 {
            app.world_mut()
                .resource_mut::<Time>()
                .advance_by(Duration::from_millis(100));
            app.update();
            let x = app.world().get::<Transform>(vehicle).unwrap().translation.x;
            assert!((-10.0..=10.0).contains(&x), "x out of bounds: {x}");
            if x < previous {
                wrapped = true;
            }
            previous = x;
        }
        assert!(wrapped);
    }
}
