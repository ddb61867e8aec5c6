//! Prefab registry for the models the world factories stamp onto entities.
//!
//! The core never loads assets itself. It only needs to know which model an
//! entity should wear and how large that model is, so the presentation layer
//! (and any physics collaborator) can resolve the rest.

use std::collections::HashMap;

use bevy::app::AppExit;
use bevy::prelude::*;
use thiserror::Error;

use crate::simulation::traffic::TrafficConfig;

pub struct AssetRegistryPlugin;

impl Plugin for AssetRegistryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelRegistry>()
            .add_systems(Startup, verify_models);
    }
}

/// Fatal session errors. Only raised while bringing the session up.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("no prefab registered for model {0:?}")]
    MissingModel(ModelKey),

    #[error("model {key:?} has unsupported scene path '{path}' (expected .glb or .gltf)")]
    InvalidModelPath { key: ModelKey, path: String },

    #[error("failed to load model {key:?} from '{path}'")]
    AssetLoadFailed { key: ModelKey, path: String },
}

/// Which prefab an entity is dressed with.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelKey {
    Chicken,
    Tree,
    Hedge,
    /// Vehicle model for a traffic speed tier.
    Vehicle(u8),
}

/// World-space extents (x, y, z) of a spawned model.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Footprint(pub Vec3);

impl Footprint {
    pub fn half_extents(&self) -> Vec3 {
        self.0 * 0.5
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Prefab {
    /// Asset path of the glTF scene, label included (`foo.glb#Scene0`).
    pub scene: String,
    pub footprint: Vec3,
}

impl Prefab {
    pub fn new(scene: impl Into<String>, footprint: Vec3) -> Self {
        Self {
            scene: scene.into(),
            footprint,
        }
    }

    fn has_gltf_path(&self) -> bool {
        let path = self.scene.split('#').next().unwrap_or_default();
        path.ends_with(".glb") || path.ends_with(".gltf")
    }
}

/// Session-owned table of prefabs, handed to the lane, obstacle and traffic
/// factories.
#[derive(Resource, Clone, Debug)]
pub struct ModelRegistry {
    prefabs: HashMap<ModelKey, Prefab>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        let mut registry = Self {
            prefabs: HashMap::new(),
        };
        registry
            .register(
                ModelKey::Chicken,
                Prefab::new("models/chicken.glb#Scene0", Vec3::new(0.6, 0.8, 0.6)),
            )
            .register(
                ModelKey::Tree,
                Prefab::new("models/tree.glb#Scene0", Vec3::new(0.9, 2.0, 0.9)),
            )
            .register(
                ModelKey::Hedge,
                Prefab::new("models/hedge.glb#Scene0", Vec3::new(0.9, 0.8, 0.9)),
            )
            .register(
                ModelKey::Vehicle(0),
                Prefab::new("models/car.glb#Scene0", Vec3::new(1.6, 0.9, 0.8)),
            )
            .register(
                ModelKey::Vehicle(1),
                Prefab::new("models/truck.glb#Scene0", Vec3::new(2.6, 1.3, 0.9)),
            )
            .register(
                ModelKey::Vehicle(2),
                Prefab::new("models/blue_truck.glb#Scene0", Vec3::new(2.6, 1.3, 0.9)),
            );
        registry
    }
}

impl ModelRegistry {
    pub fn empty() -> Self {
        Self {
            prefabs: HashMap::new(),
        }
    }

    pub fn register(&mut self, key: ModelKey, prefab: Prefab) -> &mut Self {
        self.prefabs.insert(key, prefab);
        self
    }

    pub fn remove(&mut self, key: ModelKey) -> Option<Prefab> {
        self.prefabs.remove(&key)
    }

    pub fn prefab(&self, key: ModelKey) -> Result<&Prefab, SessionError> {
        self.prefabs.get(&key).ok_or(SessionError::MissingModel(key))
    }

    /// Footprint for a key, a unit cube if the key was never registered.
    pub fn footprint(&self, key: ModelKey) -> Footprint {
        Footprint(
            self.prefabs
                .get(&key)
                .map(|prefab| prefab.footprint)
                .unwrap_or(Vec3::ONE),
        )
    }

    /// Every model the world can spawn must be registered with a glTF scene.
    pub fn validate(&self, vehicle_tiers: u8) -> Result<(), SessionError> {
        let required = [ModelKey::Chicken, ModelKey::Tree, ModelKey::Hedge]
            .into_iter()
            .chain((0..vehicle_tiers).map(ModelKey::Vehicle));

        for key in required {
            let prefab = self.prefab(key)?;
            if !prefab.has_gltf_path() {
                return Err(SessionError::InvalidModelPath {
                    key,
                    path: prefab.scene.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Run condition: the world may only be populated with a usable registry.
pub fn models_valid(registry: Res<ModelRegistry>, traffic: Res<TrafficConfig>) -> bool {
    registry.validate(traffic.speed_tiers).is_ok()
}

fn verify_models(
    registry: Res<ModelRegistry>,
    traffic: Res<TrafficConfig>,
    mut exit: EventWriter<AppExit>,
) {
    match registry.validate(traffic.speed_tiers) {
        Ok(()) => debug!("Model registry verified"),
        Err(err) => {
            error!("Cannot start session: {err}");
            exit.send(AppExit::error());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_is_valid() {
        assert_eq!(ModelRegistry::default().validate(3), Ok(()));
    }

    #[test]
    fn missing_chicken_is_reported() {
        let mut registry = ModelRegistry::default();
        registry.remove(ModelKey::Chicken);
        assert_eq!(
            registry.validate(3),
            Err(SessionError::MissingModel(ModelKey::Chicken))
        );
    }

    #[test]
    fn missing_vehicle_tier_is_reported() {
        let registry = ModelRegistry::default();
        assert_eq!(
            registry.validate(4),
            Err(SessionError::MissingModel(ModelKey::Vehicle(3)))
        );
    }

    #[test]
    fn non_gltf_scene_is_rejected() {
        let mut registry = ModelRegistry::default();
        registry.register(
            ModelKey::Hedge,
            Prefab::new("models/hedge.obj", Vec3::ONE),
        );
        assert!(matches!(
            registry.validate(3),
            Err(SessionError::InvalidModelPath { key: ModelKey::Hedge, .. })
        ));
    }

    #[test]
    fn unknown_footprint_falls_back_to_unit_cube() {
        let registry = ModelRegistry::empty();
        assert_eq!(registry.footprint(ModelKey::Tree), Footprint(Vec3::ONE));
    }

    #[test]
    fn session_without_player_model_spawns_nothing_and_exits() {
        use bevy::state::app::StatesPlugin;

        use crate::player::Player;
        use crate::world::lanes::Lane;

        let mut registry = ModelRegistry::default();
        registry.remove(ModelKey::Chicken);

        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .insert_resource(registry)
            .add_plugins(crate::CrossingPlugin);
        app.update();

        let world = app.world_mut();
        assert_eq!(world.query::<&Player>().iter(world).count(), 0);
        assert_eq!(world.query::<&Lane>().iter(world).count(), 0);
        assert!(!world.resource::<Events<AppExit>>().is_empty());
    }
}
