//! First-person camera built from a heading and a pitch angle.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Pitch stops just short of straight up/down so the view never flips.
pub const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

pub const NEAR_PLANE: f32 = 0.05;
pub const FAR_PLANE: f32 = 100.0;

/// Builds the world-to-view transform for an FPS style camera.
///
/// Heading 0 looks down -Z and positive heading turns to the right; positive
/// pitch looks up. Both angles are in radians.
pub fn fps_view_matrix(position: Vec3, heading: f32, pitch: f32) -> Mat4 {
    Mat4::from_rotation_x(-pitch)
        * Mat4::from_rotation_y(heading)
        * Mat4::from_translation(-position)
}

/// Right-handed perspective projection with a 0..1 depth range.
pub fn perspective(aspect: f32, fov_degrees: f32) -> Mat4 {
    Mat4::perspective_rh(fov_degrees.to_radians(), aspect.max(0.01), NEAR_PLANE, FAR_PLANE)
}

/// Movement intent for one frame, each axis in -1..=1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveInput {
    pub forward: f32,
    pub strafe: f32,
    pub lift: f32,
}

impl MoveInput {
    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.strafe == 0.0 && self.lift == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FpsCamera {
    pub position: Vec3,
    pub heading: f32,
    pub pitch: f32,
}

impl Default for FpsCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl FpsCamera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            heading: 0.0,
            pitch: 0.0,
        }
    }

    /// Direction the camera looks at, including pitch.
    pub fn forward(&self) -> Vec3 {
        let (sin_heading, cos_heading) = self.heading.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(sin_heading * cos_pitch, sin_pitch, -cos_heading * cos_pitch)
    }

    /// Horizontal direction to the camera's right.
    pub fn right(&self) -> Vec3 {
        let (sin_heading, cos_heading) = self.heading.sin_cos();
        Vec3::new(cos_heading, 0.0, sin_heading)
    }

    pub fn view_matrix(&self) -> Mat4 {
        fps_view_matrix(self.position, self.heading, self.pitch)
    }

    /// Applies a mouse delta in pixels. Moving the mouse down looks down.
    pub fn look(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.heading = (self.heading + dx * sensitivity).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch - dy * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Walks on the horizontal plane of the current heading; `lift` moves along world Y.
    pub fn travel(&mut self, input: MoveInput, speed: f32, dt: f32) {
        if input.is_idle() {
            return;
        }
        let (sin_heading, cos_heading) = self.heading.sin_cos();
        let ahead = Vec3::new(sin_heading, 0.0, -cos_heading);
        let direction = ahead * input.forward + self.right() * input.strafe + Vec3::Y * input.lift;
        self.position += direction.normalize_or_zero() * speed * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn view_at_rest_is_identity() {
        let view = fps_view_matrix(Vec3::ZERO, 0.0, 0.0);
        assert!(view.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn forward_maps_to_negative_z_in_view_space() {
        let mut camera = FpsCamera::new(Vec3::new(1.0, 2.0, 3.0));
        camera.heading = 0.7;
        camera.pitch = -0.3;
        let target = camera.position + camera.forward();
        let in_view = camera.view_matrix().transform_point3(target);
        assert!(close(in_view, Vec3::NEG_Z));
    }

    #[test]
    fn matches_look_to_for_the_same_angles() {
        let mut camera = FpsCamera::new(Vec3::new(-2.0, 0.5, 4.0));
        camera.heading = 2.1;
        camera.pitch = 0.4;
        let expected = Mat4::look_to_rh(camera.position, camera.forward(), Vec3::Y);
        assert!(camera.view_matrix().abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn positive_heading_turns_right() {
        let mut camera = FpsCamera::default();
        camera.look(FRAC_PI_2, 0.0, 1.0);
        assert!(close(camera.forward(), Vec3::X));
        assert!(close(camera.right(), Vec3::Z));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = FpsCamera::default();
        camera.look(0.0, -10_000.0, 0.01);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        camera.look(0.0, 10_000.0, 0.01);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn travel_ignores_pitch_and_uses_speed() {
        let mut camera = FpsCamera::default();
        camera.pitch = 1.0;
        camera.travel(
            MoveInput {
                forward: 1.0,
                ..Default::default()
            },
            2.0,
            0.5,
        );
        assert!(close(camera.position, Vec3::new(0.0, 0.0, -1.0)));

        camera.travel(
            MoveInput {
                forward: 1.0,
                strafe: 1.0,
                lift: 0.0,
            },
            1.0,
            1.0,
        );
        let step = camera.position - Vec3::new(0.0, 0.0, -1.0);
        assert!((step.length() - 1.0).abs() < 1e-5);
        assert!(step.x > 0.0 && step.z < 0.0);
    }
}
