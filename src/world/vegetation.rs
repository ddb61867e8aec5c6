//! Static vegetation planted on grass lanes.

use bevy::prelude::*;
use rand::Rng;
use smallvec::SmallVec;

use crate::assets::{ModelKey, ModelRegistry};
use crate::world::lanes::LaneMember;
use crate::world::odds::random_bool;
use crate::world::{Cell, LaneOdds, WorldConfig};

/// Vegetation variety.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VegetationKind {
    Tree,
    Hedge,
}

impl VegetationKind {
    pub fn model(self) -> ModelKey {
        match self {
            VegetationKind::Tree => ModelKey::Tree,
            VegetationKind::Hedge => ModelKey::Hedge,
        }
    }
}

/// A static obstacle. Never moves once planted.
#[derive(Component, Clone, Copy, Debug)]
pub struct Obstacle {
    pub kind: VegetationKind,
    pub cell: Cell,
}

/// Decide which columns of a lane at `z` get vegetation, scanning from the
/// right edge. Columns for which `keep_clear` holds are skipped.
pub fn vegetation_layout<R: Rng + ?Sized>(
    rng: &mut R,
    odds: &LaneOdds,
    width: u32,
    z: i32,
    keep_clear: impl Fn(Cell) -> bool,
) -> Vec<(Cell, VegetationKind)> {
    let right_edge = (width / 2) as i32;
    (0..width as i32)
        .filter_map(|index| {
            if !random_bool(rng, odds.vegetation) {
                return None;
            }
            let cell = Cell::new(right_edge - index, z);
            let kind = if random_bool(rng, odds.tree) {
                VegetationKind::Tree
            } else {
                VegetationKind::Hedge
            };
            (!keep_clear(cell)).then_some((cell, kind))
        })
        .collect()
}

/// Plant vegetation on a freshly created grass lane.
#[allow(clippy::too_many_arguments)]
pub fn plant<R: Rng + ?Sized>(
    commands: &mut Commands,
    rng: &mut R,
    odds: &LaneOdds,
    models: &ModelRegistry,
    config: &WorldConfig,
    lane: Entity,
    z: i32,
    initial: bool,
) -> SmallVec<[Entity; 8]> {
    let layout = vegetation_layout(rng, odds, config.lane_width, z, |cell| {
        initial && config.is_spawn_clearance(cell)
    });

    layout
        .into_iter()
        .map(|(cell, kind)| {
            let model = kind.model();
            commands
                .spawn((
                    Obstacle { kind, cell },
                    model,
                    models.footprint(model),
                    LaneMember(lane),
                    Transform::from_translation(cell.to_translation(0.0)),
                    Name::new(format!("{kind:?} ({}, {})", cell.x, cell.z)),
                ))
                .id()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn layout_stays_on_lattice_within_lane() {
        let mut rng = StdRng::seed_from_u64(5);
        let odds = LaneOdds {
            vegetation: 1,
            ..default()
        };
        let layout = vegetation_layout(&mut rng, &odds, 21, -3, |_| false);

        assert_eq!(layout.len(), 21);
        assert_eq!(layout.first().map(|(cell, _)| *cell), Some(Cell::new(10, -3)));
        assert_eq!(layout.last().map(|(cell, _)| *cell), Some(Cell::new(-10, -3)));
    }

    #[test]
    fn cleared_cells_are_skipped() {
        let mut rng = StdRng::seed_from_u64(5);
        let odds = LaneOdds {
            vegetation: 1,
            ..default()
        };
        let layout = vegetation_layout(&mut rng, &odds, 21, 0, |cell| cell.x == 0);

        assert_eq!(layout.len(), 20);
        assert!(layout.iter().all(|(cell, _)| cell.x != 0));
    }

    #[test]
    fn tree_odds_pick_both_kinds() {
        let mut rng = StdRng::seed_from_u64(9);
        let odds = LaneOdds {
            vegetation: 1,
            tree: 2,
            ..default()
        };
        let layout = vegetation_layout(&mut rng, &odds, 201, 0, |_| false);
        let trees = layout
            .iter()
            .filter(|(_, kind)| *kind == VegetationKind::Tree)
            .count();
        assert!(trees > 60 && trees < 140, "trees: {trees}");
    }
}
