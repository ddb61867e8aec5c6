//! Contact events reported by the physics collaborator.

use bevy::prelude::*;

use crate::player::gate::Probe;

/// Collision categories shapes are tagged with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Chicken,
    Vehicle,
    Vegetation,
    Probe(Probe),
}

/// Two shapes began overlapping. The pair is unordered.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactEvent {
    pub a: Category,
    pub b: Category,
}

/// What a contact means for gameplay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactKind {
    /// Vegetation entered a directional probe.
    ProbeBlocked(Probe),
    /// A vehicle ran over the chicken.
    VehicleHit,
    Ignored,
}

impl ContactEvent {
    pub fn new(a: Category, b: Category) -> Self {
        Self { a, b }
    }

    pub fn kind(&self) -> ContactKind {
        match (self.a, self.b) {
            (Category::Vegetation, Category::Probe(probe))
            | (Category::Probe(probe), Category::Vegetation) => ContactKind::ProbeBlocked(probe),
            (Category::Chicken, Category::Vehicle) | (Category::Vehicle, Category::Chicken) => {
                ContactKind::VehicleHit
            }
            _ => ContactKind::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_unordered() {
        let front = Category::Probe(Probe::Front);
        assert_eq!(
            ContactEvent::new(Category::Vegetation, front).kind(),
            ContactEvent::new(front, Category::Vegetation).kind()
        );
        assert_eq!(
            ContactEvent::new(Category::Vehicle, Category::Chicken).kind(),
            ContactKind::VehicleHit
        );
    }

    #[test]
    fn unrelated_pairs_are_ignored() {
        let ignored = [
            ContactEvent::new(Category::Vehicle, Category::Vegetation),
            ContactEvent::new(Category::Chicken, Category::Vegetation),
            ContactEvent::new(Category::Vehicle, Category::Probe(Probe::Left)),
            ContactEvent::new(Category::Probe(Probe::Left), Category::Probe(Probe::Right)),
        ];
        for contact in ignored {
            assert_eq!(contact.kind(), ContactKind::Ignored, "{contact:?}");
        }
    }
}
