//! Score counter and the menu overlay.

use bevy::prelude::*;

use crate::game_state::Hud;
use crate::CrossingSet;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_hud)
            .add_systems(Update, update_hud.after(CrossingSet::Hud));
    }
}

/// Marker for the score text entity.
#[derive(Component)]
struct ScoreText;

/// Marker for the menu overlay root.
#[derive(Component)]
struct MenuOverlay;

fn setup_hud(mut commands: Commands) {
    let ink = Color::WHITE;
    let shade = Color::srgba(0.0, 0.0, 0.0, 0.45);

    commands.spawn((
        Text::new("0"),
        TextFont {
            font_size: 48.0,
            ..default()
        },
        TextColor(ink),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(16.0),
            left: Val::Px(20.0),
            ..default()
        },
        ScoreText,
    ));

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(12.0),
                ..default()
            },
            MenuOverlay,
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        padding: UiRect::axes(Val::Px(24.0), Val::Px(14.0)),
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        row_gap: Val::Px(8.0),
                        ..default()
                    },
                    BackgroundColor(shade),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        Text::new("CRAZY ROAD"),
                        TextFont {
                            font_size: 40.0,
                            ..default()
                        },
                        TextColor(Color::srgb(1.0, 0.85, 0.2)),
                    ));
                    panel.spawn((
                        Text::new("Swipe to start"),
                        TextFont {
                            font_size: 22.0,
                            ..default()
                        },
                        TextColor(ink),
                    ));
                });
        });
}

fn update_hud(
    hud: Res<Hud>,
    mut score: Query<(&mut Text, &mut Visibility), With<ScoreText>>,
    mut overlay: Query<&mut Visibility, (With<MenuOverlay>, Without<ScoreText>)>,
) {
    if !hud.is_changed() {
        return;
    }

    for (mut text, mut visibility) in score.iter_mut() {
        text.0 = hud.score.to_string();
        *visibility = if hud.menu {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
    }

    for mut visibility in overlay.iter_mut() {
        *visibility = if hud.menu {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}
