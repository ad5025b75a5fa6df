//! View frustum planes for culling
//!
//! Planes are pulled straight out of the combined projection * view matrix
//! (Gribb/Hartmann). Clip-space depth runs from 0 at the near plane to w at
//! the far plane, so the near plane is row 2 on its own.

use crate::rasterizer::{Mat4, Vec3, Vec4};

/// Plane `normal . p + d = 0`, normal pointing into the frustum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    fn from_row(v: Vec4) -> Self {
        let normal = v.xyz();
        let len = normal.len();
        if len == 0.0 {
            return Self { normal, d: v.w };
        }
        Self {
            normal: normal.scale(1.0 / len),
            d: v.w / len,
        }
    }

    /// Signed distance, positive on the inside
    pub fn distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }
}

/// Six clip planes of a perspective camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFrustum {
    pub left: Plane,
    pub right: Plane,
    pub top: Plane,
    pub bottom: Plane,
    pub near: Plane,
    pub far: Plane,
}

impl ViewFrustum {
    /// Extract planes from `camera_to_projection * world_to_camera`
    pub fn from_matrix(m: &Mat4) -> Self {
        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));
        Self {
            left: Plane::from_row(r3 + r0),
            right: Plane::from_row(r3 - r0),
            top: Plane::from_row(r3 - r1),
            bottom: Plane::from_row(r3 + r1),
            near: Plane::from_row(r2),
            far: Plane::from_row(r3 - r2),
        }
    }

    pub fn planes(&self) -> [Plane; 6] {
        [self.left, self.right, self.top, self.bottom, self.near, self.far]
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.planes().iter().all(|plane| plane.distance(p) >= 0.0)
    }

    /// Conservative sphere test, true if any part may be visible
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes().iter().all(|plane| plane.distance(center) >= -radius)
    }
}
