//! Frustum plane extraction and visibility tests.
//!
//! Extracts the 6 frustum planes from a view-projection matrix so the lane
//! stream can tell which lanes the follow camera can still see.

use bevy::prelude::*;

/// A plane in 3D space represented as ax + by + cz + d = 0.
///
/// For frustum planes, the normal points inward (toward visible space).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane {
    pub coefficients: Vec4,
}

impl Plane {
    pub fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self {
            coefficients: Vec4::new(a, b, c, d),
        }
    }

    fn from_row(row: Vec4) -> Self {
        let mut plane = Self { coefficients: row };
        plane.normalize();
        plane
    }

    pub fn normal(&self) -> Vec3 {
        self.coefficients.truncate()
    }

    pub fn d(&self) -> f32 {
        self.coefficients.w
    }

    /// Normalize the plane (make normal unit length).
    pub fn normalize(&mut self) {
        let length = self.normal().length();
        if length > 0.0 {
            self.coefficients /= length;
        }
    }

    /// Signed distance from a point to the plane.
    ///
    /// Positive = in front of plane (visible side)
    /// Negative = behind plane (culled side)
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal().dot(point) + self.d()
    }

    /// Test if a sphere is in front of or intersecting the plane.
    pub fn test_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.signed_distance(center) >= -radius
    }
}

/// The 6 planes of a view frustum, normals pointing inward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrustumPlanes {
    pub left: Plane,
    pub right: Plane,
    pub bottom: Plane,
    pub top: Plane,
    pub near: Plane,
    pub far: Plane,
}

impl FrustumPlanes {
    pub fn as_array(&self) -> [Plane; 6] {
        [
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        ]
    }

    /// Returns true if any part of the sphere is visible.
    pub fn test_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.as_array()
            .iter()
            .all(|plane| plane.test_sphere(center, radius))
    }

    pub fn test_point(&self, point: Vec3) -> bool {
        self.test_sphere(point, 0.0)
    }

    /// Test if an axis-aligned bounding box is inside or intersecting the frustum.
    ///
    /// Conservative: a box near a frustum corner may be reported visible.
    pub fn test_aabb(&self, min: Vec3, max: Vec3) -> bool {
        self.as_array().iter().all(|plane| {
            // Positive vertex: the corner furthest along the plane normal
            let n = plane.normal();
            let p_vertex = Vec3::new(
                if n.x >= 0.0 { max.x } else { min.x },
                if n.y >= 0.0 { max.y } else { min.y },
                if n.z >= 0.0 { max.z } else { min.z },
            );
            plane.signed_distance(p_vertex) >= 0.0
        })
    }
}

/// Extract frustum planes from a view-projection matrix.
///
/// Gribb-Hartmann extraction for a depth range of [0, 1], which is what
/// `Mat4::perspective_rh` produces.
pub fn extract_frustum_planes(view_proj: Mat4) -> FrustumPlanes {
    let m = view_proj;
    let row0 = m.row(0);
    let row1 = m.row(1);
    let row2 = m.row(2);
    let row3 = m.row(3);

    FrustumPlanes {
        left: Plane::from_row(row3 + row0),
        right: Plane::from_row(row3 - row0),
        bottom: Plane::from_row(row3 + row1),
        top: Plane::from_row(row3 - row1),
        near: Plane::from_row(row2),
        far: Plane::from_row(row3 - row2),
    }
}
