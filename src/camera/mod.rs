//! Follow camera rig.
//!
//! The camera pose is a pure function of the player position. The lane stream
//! uses the same rig to decide which lanes have scrolled out of view, and the
//! presentation layer copies the pose onto the real camera and light.

use bevy::prelude::*;

pub mod frustum;

use frustum::{extract_frustum_planes, FrustumPlanes};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FollowCamera>();
    }
}

/// Camera placement relative to the player.
#[derive(Resource, Clone, Debug)]
pub struct FollowCamera {
    /// Offset from the player's ground position.
    pub offset: Vec3,
    /// Pitch in degrees (negative looks down).
    pub pitch: f32,
    /// Yaw in degrees.
    pub yaw: f32,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    /// Viewport width / height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 10.0, 0.0),
            pitch: -72.0,
            yaw: 9.0,
            fov_y: 60.0,
            aspect: 9.0 / 16.0, // Portrait phone
            near: 0.1,
            far: 100.0,
        }
    }
}

impl FollowCamera {
    /// Camera pose when following a player standing at `focus`.
    pub fn transform_for(&self, focus: Vec3) -> Transform {
        Transform::from_translation(Vec3::new(focus.x, 0.0, focus.z) + self.offset).with_rotation(
            Quat::from_euler(
                EulerRot::YXZ,
                self.yaw.to_radians(),
                self.pitch.to_radians(),
                0.0,
            ),
        )
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn frustum_for(&self, focus: Vec3) -> FrustumPlanes {
        let view = self.transform_for(focus).compute_matrix().inverse();
        extract_frustum_planes(self.projection() * view)
    }
}
