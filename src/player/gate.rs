//! Directional blocking gate.
//!
//! Three probe zones ride along with the player, one per movement direction.
//! Vegetation entering a probe closes that direction; it only reopens when a
//! recheck after a completed move finds the probe empty.

use bevy::prelude::*;

use crate::contact::{ContactEvent, ContactKind};
use crate::world::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Probe {
    Front,
    Left,
    Right,
}

impl Probe {
    pub const ALL: [Probe; 3] = [Probe::Front, Probe::Left, Probe::Right];

    fn index(self) -> usize {
        match self {
            Probe::Front => 0,
            Probe::Left => 1,
            Probe::Right => 2,
        }
    }

    /// Offset of the probe zone from the player's cell.
    pub fn offset(self) -> Cell {
        match self {
            Probe::Front => Cell::new(0, -1),
            Probe::Left => Cell::new(-1, 0),
            Probe::Right => Cell::new(1, 0),
        }
    }
}

/// Per-direction blocked flags, carried by the player.
#[derive(Component, Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockingGate {
    blocked: [bool; 3],
}

impl BlockingGate {
    pub fn block(&mut self, probe: Probe) {
        self.blocked[probe.index()] = true;
    }

    pub fn is_blocked(&self, probe: Probe) -> bool {
        self.blocked[probe.index()]
    }

    pub fn can_move(&self, probe: Probe) -> bool {
        !self.is_blocked(probe)
    }

    /// Reopen every blocked probe around `origin` that no longer overlaps an
    /// obstacle.
    pub fn recheck(&mut self, origin: Cell, occupied: impl Fn(Cell) -> bool) {
        for probe in Probe::ALL {
            if self.is_blocked(probe) && !occupied(origin.offset(probe.offset())) {
                self.blocked[probe.index()] = false;
            }
        }
    }
}

/// Close probes as vegetation contacts arrive, in arrival order.
pub fn apply_probe_contacts(
    mut contacts: EventReader<ContactEvent>,
    mut gates: Query<&mut BlockingGate>,
) {
    for contact in contacts.read() {
        match contact.kind() {
            ContactKind::ProbeBlocked(probe) => {
                for mut gate in gates.iter_mut() {
                    gate.block(probe);
                }
            }
            ContactKind::VehicleHit => {}
            ContactKind::Ignored => debug!("Ignoring contact {:?}", contact),
        }
    }
}
