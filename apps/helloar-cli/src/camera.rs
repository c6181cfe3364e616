use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Camera circling a target at fixed height, standing in for the AR
/// framework's per-frame view and projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    pub height: f32,
    /// Radians advanced per frame.
    pub step: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            radius: 1.5,
            height: 0.5,
            step: 15.0_f32.to_radians(),
            fov_degrees: 60.0,
            aspect: 9.0 / 16.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self, frame: u32) -> Vec3 {
        let angle = self.step * frame as f32;
        self.target + Vec3::new(angle.sin() * self.radius, self.height, angle.cos() * self.radius)
    }

    pub fn view_matrix(&self, frame: u32) -> Mat4 {
        Mat4::look_at_rh(self.eye(frame), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_looks_down_negative_z() {
        let cam = OrbitCamera {
            height: 0.0,
            ..OrbitCamera::default()
        };
        assert_eq!(cam.eye(0), Vec3::new(0.0, 0.0, 1.5));
        let target_in_view = cam.view_matrix(0).transform_point3(Vec3::ZERO);
        assert!((target_in_view - Vec3::new(0.0, 0.0, -1.5)).length() < 1e-5);
    }

    #[test]
    fn orbit_keeps_radius() {
        let cam = OrbitCamera::default();
        for frame in 0..24 {
            let eye = cam.eye(frame);
            let planar = Vec3::new(eye.x, 0.0, eye.z).length();
            assert!((planar - cam.radius).abs() < 1e-5);
            assert_eq!(eye.y, cam.height);
        }
    }

    #[test]
    fn projection_is_finite() {
        let p = OrbitCamera::default().projection_matrix();
        assert!(p.is_finite());
    }
}
