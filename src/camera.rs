//! Orbit camera that supplies the viewer pose and pointer rays.

use glam::{Mat4, Vec2, Vec3};

use crate::focus::ViewerPose;
use crate::pointer::Ray;

/// Vertical field of view, in degrees.
pub const CAMERA_FOV: f32 = 42.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

/// Orbit camera looking at the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Width over height of the viewport.
    pub aspect: f32,
}

impl Camera {
    /// Camera 50 units in front of the tree, 2 units up.
    pub fn new() -> Self {
        let offset = Vec3::new(0.0, 2.0, 50.0);
        Self {
            yaw: 0.0,
            pitch: (offset.y / offset.z).atan(),
            distance: offset.length(),
            target: Vec3::ZERO,
            fov: CAMERA_FOV,
            aspect: 16.0 / 9.0,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn pose(&self) -> ViewerPose {
        ViewerPose::looking_at(self.position(), self.target)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, NEAR, FAR)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_proj().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
