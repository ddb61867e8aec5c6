//! Keyboard and swipe input, reported as `MoveIntent`s.

use bevy::prelude::*;

use crate::player::{MoveDirection, MoveIntent};
use crate::presentation::PresentationConfig;
use crate::CrossingSet;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (keyboard_intents, swipe_intents).before(CrossingSet::Contacts),
        );
    }
}

fn keyboard_intents(keyboard: Res<ButtonInput<KeyCode>>, mut intents: EventWriter<MoveIntent>) {
    let bindings = [
        (KeyCode::ArrowUp, MoveDirection::Forward),
        (KeyCode::KeyW, MoveDirection::Forward),
        (KeyCode::Space, MoveDirection::Forward),
        (KeyCode::ArrowLeft, MoveDirection::Left),
        (KeyCode::KeyA, MoveDirection::Left),
        (KeyCode::ArrowRight, MoveDirection::Right),
        (KeyCode::KeyD, MoveDirection::Right),
    ];

    for (key, direction) in bindings {
        if keyboard.just_pressed(key) {
            intents.send(MoveIntent(direction));
        }
    }
}

fn swipe_intents(
    touches: Res<Touches>,
    config: Res<PresentationConfig>,
    mut intents: EventWriter<MoveIntent>,
) {
    for touch in touches.iter_just_released() {
        if let Some(direction) = classify_swipe(touch.distance(), config.swipe_threshold) {
            intents.send(MoveIntent(direction));
        }
    }
}

/// Map a swipe vector (screen space, y down) to a direction. Short swipes
/// and downward swipes map to nothing.
pub fn classify_swipe(delta: Vec2, threshold: f32) -> Option<MoveDirection> {
    if delta.length() < threshold {
        return None;
    }
    if delta.y.abs() > delta.x.abs() {
        (delta.y < 0.0).then_some(MoveDirection::Forward)
    } else if delta.x > 0.0 {
        Some(MoveDirection::Right)
    } else {
        Some(MoveDirection::Left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swipes_map_to_directions() {
        assert_eq!(classify_swipe(Vec2::new(5.0, -80.0), 40.0), Some(MoveDirection::Forward));
        assert_eq!(classify_swipe(Vec2::new(90.0, 10.0), 40.0), Some(MoveDirection::Right));
        assert_eq!(classify_swipe(Vec2::new(-90.0, -10.0), 40.0), Some(MoveDirection::Left));
    }

    #[test]
    fn short_and_downward_swipes_are_ignored() {
        assert_eq!(classify_swipe(Vec2::new(10.0, -10.0), 40.0), None);
        assert_eq!(classify_swipe(Vec2::new(0.0, 120.0), 40.0), None);
    }
}
