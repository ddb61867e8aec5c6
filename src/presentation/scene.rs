//! Scene dressing: camera and light rig, lane strips, and glTF models.

use bevy::app::AppExit;
use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::transform::TransformSystem;

use crate::assets::{ModelKey, ModelRegistry, SessionError};
use crate::camera::FollowCamera;
use crate::player::Player;
use crate::world::lanes::{Lane, LaneKind};
use crate::CrossingSet;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene)
            .add_systems(
                Update,
                (dress_lanes, attach_models, check_player_model).after(CrossingSet::Lanes),
            )
            .add_systems(PostUpdate, follow_player.before(TransformSystem::TransformPropagate));
    }
}

/// Marker for the gameplay camera.
#[derive(Component)]
pub struct GameCamera;

/// Light rig kept at the camera's position.
#[derive(Component)]
pub struct FollowLight;

#[derive(Resource)]
struct LanePalette {
    grass_mesh: Handle<Mesh>,
    road_mesh: Handle<Mesh>,
    grass: Handle<StandardMaterial>,
    road: Handle<StandardMaterial>,
}

#[derive(Resource)]
struct PlayerScene(Handle<Scene>);

const GRASS_HEIGHT: f32 = 0.4;
const ROAD_HEIGHT: f32 = 0.05;

fn setup_scene(
    mut commands: Commands,
    rig: Res<FollowCamera>,
    models: Res<ModelRegistry>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let pose = rig.transform_for(Vec3::ZERO);
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: rig.fov_y.to_radians(),
            near: rig.near,
            far: rig.far,
            ..default()
        }),
        pose,
        GameCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
    });
    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(pose.translation + Vec3::new(-5.0, -5.0, 0.0))
            .with_rotation(Quat::from_euler(
                EulerRot::XYZ,
                0.0,
                -90_f32.to_radians(),
                -45_f32.to_radians(),
            )),
        FollowLight,
    ));

    let width = 21.0;
    commands.insert_resource(LanePalette {
        grass_mesh: meshes.add(Cuboid::new(width, GRASS_HEIGHT, 1.0)),
        road_mesh: meshes.add(Cuboid::new(width, ROAD_HEIGHT, 1.0)),
        grass: materials.add(StandardMaterial {
            base_color: Color::srgb(0.45, 0.75, 0.3),
            perceptual_roughness: 0.9,
            ..default()
        }),
        road: materials.add(StandardMaterial {
            base_color: Color::srgb(0.25, 0.25, 0.28),
            perceptual_roughness: 0.8,
            ..default()
        }),
    });

    // Chicken handle is kept so a failed load can end the session.
    if let Ok(prefab) = models.prefab(ModelKey::Chicken) {
        commands.insert_resource(PlayerScene(asset_server.load(prefab.scene.clone())));
    }
}

fn dress_lanes(
    mut commands: Commands,
    palette: Res<LanePalette>,
    lanes: Query<(Entity, &Lane), Added<Lane>>,
) {
    for (entity, lane) in lanes.iter() {
        let (mesh, material, height) = match lane.kind {
            LaneKind::Grass => (&palette.grass_mesh, &palette.grass, GRASS_HEIGHT),
            LaneKind::Road => (&palette.road_mesh, &palette.road, ROAD_HEIGHT),
        };
        commands.entity(entity).insert((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_xyz(0.0, -height / 2.0, lane.z as f32),
        ));
    }
}

fn attach_models(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    models: Res<ModelRegistry>,
    added: Query<(Entity, &ModelKey), Added<ModelKey>>,
) {
    for (entity, key) in added.iter() {
        match models.prefab(*key) {
            Ok(prefab) => {
                commands
                    .entity(entity)
                    .insert(SceneRoot(asset_server.load(prefab.scene.clone())));
            }
            Err(err) => warn!("{err}"),
        }
    }
}

/// The session cannot continue without the chicken model.
fn check_player_model(
    asset_server: Res<AssetServer>,
    models: Res<ModelRegistry>,
    scene: Option<Res<PlayerScene>>,
    mut exit: EventWriter<AppExit>,
    mut reported: Local<bool>,
) {
    let Some(scene) = scene else {
        return;
    };
    if *reported {
        return;
    }
    if let Some(LoadState::Failed(_)) = asset_server.get_load_state(&scene.0) {
        let path = models
            .prefab(ModelKey::Chicken)
            .map(|prefab| prefab.scene.clone())
            .unwrap_or_default();
        let err = SessionError::AssetLoadFailed {
            key: ModelKey::Chicken,
            path,
        };
        error!("Cannot continue session: {err}");
        exit.send(AppExit::error());
        *reported = true;
    }
}

fn follow_player(
    rig: Res<FollowCamera>,
    players: Query<&Transform, With<Player>>,
    mut cameras: Query<&mut Transform, (With<GameCamera>, Without<Player>, Without<FollowLight>)>,
    mut lights: Query<
        &mut Transform,
        (With<FollowLight>, Without<Player>, Without<GameCamera>),
    >,
) {
    let Ok(player) = players.get_single() else {
        return;
    };
    let pose = rig.transform_for(player.translation);
    for mut camera in cameras.iter_mut() {
        *camera = pose;
    }
    for mut light in lights.iter_mut() {
        light.translation = pose.translation + Vec3::new(-5.0, -5.0, 0.0);
    }
}
