//! Path-tracing camera.
//!
//! Unlike an orbit rig, the renderer's camera is a direct position +
//! Euler rotation pair straight out of the scene manifest: `rotation.y` is
//! yaw, `rotation.x` is pitch, `rotation.z` (roll) is unused. This keeps the
//! forward/right/up derivation a pure, deterministic function of the
//! manifest values, which the kernel and the debug-overlay view matrix both
//! depend on.

use glam::{Mat4, Vec3};
use serde::Deserialize;

/// World up vector used to derive the camera basis.
pub const WORLD_UP: Vec3 = Vec3::Y;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    /// Degrees; `.y` = yaw, `.x` = pitch, `.z` = roll (unused).
    pub rotation: Vec3,
    /// Vertical field of view, in degrees.
    pub fov: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            rotation: Vec3::ZERO,
            fov: 60.0,
            near_plane: 0.1,
            far_plane: 1000.0,
        }
    }
}

impl Camera {
    #[inline]
    pub fn yaw_radians(&self) -> f32 {
        self.rotation.y.to_radians()
    }

    #[inline]
    pub fn pitch_radians(&self) -> f32 {
        self.rotation.x.to_radians()
    }

    /// Forward vector: `R_y(yaw) * R_x(pitch) * (0, 0, -1)`.
    pub fn forward(&self) -> Vec3 {
        let rot = Mat4::from_rotation_y(self.yaw_radians()) * Mat4::from_rotation_x(self.pitch_radians());
        rot.transform_vector3(Vec3::new(0.0, 0.0, -1.0)).normalize()
    }

    /// Right vector: `normalize(forward x world_up)`.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(WORLD_UP).normalize()
    }

    /// Up vector: `right x forward`.
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    /// Focal length for the vertical FOV: `1 / tan(fov_rad / 2)`.
    pub fn focal_length(&self) -> f32 {
        1.0 / (self.fov.to_radians() * 0.5).tan()
    }

    /// View matrix used by the debug overlay, built from the same
    /// forward/right/up basis as the kernel (row layout per spec 4.6).
    pub fn view_matrix(&self) -> Mat4 {
        let fwd = self.forward();
        let right = self.right();
        let up = self.up();
        let pos = self.position;
        Mat4::from_cols_array(&[
            right.x, up.x, -fwd.x, 0.0,
            right.y, up.y, -fwd.y, 0.0,
            right.z, up.z, -fwd.z, 0.0,
            -right.dot(pos), -up.dot(pos), fwd.dot(pos), 1.0,
        ])
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near_plane, self.far_plane)
    }

    pub fn view_proj_matrix(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_rotation_looks_down_negative_z() {
        let cam = Camera::default();
        assert!((cam.forward() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn yaw_90_degrees_rotates_forward_to_negative_x() {
        let cam = Camera {
            rotation: Vec3::new(0.0, 90.0, 0.0),
            ..Camera::default()
        };
        assert!((cam.forward() - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn right_up_forward_are_orthonormal() {
        let cam = Camera {
            rotation: Vec3::new(17.0, -42.0, 0.0),
            ..Camera::default()
        };
        let (f, r, u) = (cam.forward(), cam.right(), cam.up());
        assert!((f.dot(r)).abs() < 1e-5);
        assert!((f.dot(u)).abs() < 1e-5);
        assert!((r.dot(u)).abs() < 1e-5);
        assert!((f.length() - 1.0).abs() < 1e-5);
    }
}
