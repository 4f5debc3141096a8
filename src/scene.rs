use glam::{Mat3, Mat4, Vec3};

use crate::camera::{perspective, FpsCamera, MoveInput};
use crate::config::LessonConfig;
use crate::geometry::ROOM_HALF_EXTENT;
use crate::input::InputState;
use crate::lesson::Lesson;
use crate::render::FrameUniforms;

/// The room turns at a quarter of the configured spin speed.
const ROOM_SPIN_FACTOR: f32 = 0.25;
/// Keeps the camera from walking through the room's walls.
const WALL_MARGIN: f32 = 0.25;

/// CPU-side state of the running lesson: the spin angle and the camera.
#[derive(Debug, Clone)]
pub struct LessonScene {
    lesson: Lesson,
    camera: FpsCamera,
    angle: f32,
    fov: f32,
    sensitivity: f32,
    speed: f32,
    spin: f32,
    light_direction: Vec3,
}

impl LessonScene {
    pub fn new(config: &LessonConfig) -> Self {
        let start = if config.lesson.uses_fps_camera() {
            config.start
        } else {
            Vec3::ZERO
        };
        let mut scene = Self {
            lesson: config.lesson,
            camera: FpsCamera::new(start),
            angle: 0.0,
            fov: config.fov,
            sensitivity: config.sensitivity,
            speed: config.speed,
            spin: config.spin,
            light_direction: Vec3::new(-0.4, -1.0, -0.6).normalize(),
        };
        scene.confine_camera();
        scene
    }

    pub fn lesson(&self) -> Lesson {
        self.lesson
    }

    pub fn camera(&self) -> &FpsCamera {
        &self.camera
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Advances animation by `dt` seconds and applies pending input.
    pub fn update(&mut self, dt: f32, input: &InputState) {
        if matches!(self.lesson, Lesson::Rotate | Lesson::Room | Lesson::Model) {
            self.angle = (self.angle + self.spin * dt).rem_euclid(std::f32::consts::TAU);
        }

        if self.lesson.uses_fps_camera() {
            let delta = input.take_mouse_delta();
            self.camera.look(delta.x, delta.y, self.sensitivity);
            self.camera
                .travel(MoveInput::from_state(input), self.speed, dt);
            self.confine_camera();
        }
    }

    fn confine_camera(&mut self) {
        if self.lesson == Lesson::Camera {
            let limit = ROOM_HALF_EXTENT - WALL_MARGIN;
            self.camera.position = self
                .camera
                .position
                .clamp(Vec3::splat(-limit), Vec3::splat(limit));
        }
    }

    /// Matrices for the current frame; `aspect` is width / height of the surface.
    pub fn frame_uniforms(&self, aspect: f32) -> FrameUniforms {
        let (view_proj, model) = match self.lesson {
            Lesson::Clear | Lesson::Triangle => (Mat4::IDENTITY, Mat4::IDENTITY),
            Lesson::Rotate => (Mat4::IDENTITY, Mat4::from_rotation_z(self.angle)),
            Lesson::Room => (
                perspective(aspect, self.fov),
                Mat4::from_rotation_y(self.angle * ROOM_SPIN_FACTOR),
            ),
            Lesson::Camera => (
                perspective(aspect, self.fov) * self.camera.view_matrix(),
                Mat4::IDENTITY,
            ),
            Lesson::Model => (
                perspective(aspect, self.fov) * self.camera.view_matrix(),
                Mat4::from_rotation_y(self.angle),
            ),
        };
        FrameUniforms {
            view_proj,
            model,
            normal: Mat3::from_mat4(model).inverse().transpose(),
            camera_position: self.camera.position,
            light_direction: self.light_direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;
    use glam::Vec2;

    fn scene(lesson: Lesson) -> LessonScene {
        LessonScene::new(&LessonConfig::for_lesson(lesson))
    }

    #[test]
    fn triangle_uses_identity_transforms() {
        let mut scene = scene(Lesson::Triangle);
        scene.update(1.0, &InputState::new());
        let frame = scene.frame_uniforms(1.5);
        assert_eq!(frame.view_proj, Mat4::IDENTITY);
        assert_eq!(frame.model, Mat4::IDENTITY);
    }

    #[test]
    fn rotate_spins_about_z() {
        let mut scene = scene(Lesson::Rotate);
        scene.update(0.5, &InputState::new());
        assert!((scene.angle() - 0.5).abs() < 1e-6);
        let frame = scene.frame_uniforms(1.0);
        let tip = frame.model.transform_point3(Vec3::X);
        assert!((tip - Vec3::new(0.5_f32.cos(), 0.5_f32.sin(), 0.0)).length() < 1e-5);
    }

    #[test]
    fn static_lessons_ignore_input() {
        let input = InputState::new();
        input.set_key_down(KeyCode::Character('W'));
        input.add_mouse_motion(Vec2::new(40.0, 0.0));
        let mut scene = scene(Lesson::Room);
        scene.update(1.0, &input);
        assert_eq!(scene.camera().position, Vec3::ZERO);
        assert_eq!(scene.camera().heading, 0.0);
    }

    #[test]
    fn camera_lesson_walks_and_looks() {
        let input = InputState::new();
        input.set_key_down(KeyCode::Character('W'));
        input.add_mouse_motion(Vec2::new(0.0, -100.0));
        let mut scene = scene(Lesson::Camera);
        let start = scene.camera().position;
        scene.update(0.5, &input);

        let camera = scene.camera();
        assert!((camera.position - (start + Vec3::new(0.0, 0.0, -1.5))).length() < 1e-5);
        assert!(camera.pitch > 0.0);
        // Motion was consumed by this frame.
        assert_eq!(input.take_mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn camera_stays_inside_the_room() {
        let input = InputState::new();
        input.set_key_down(KeyCode::Character('S'));
        let mut scene = scene(Lesson::Camera);
        for _ in 0..100 {
            scene.update(0.1, &input);
        }
        assert!(scene.camera().position.z <= ROOM_HALF_EXTENT - WALL_MARGIN + 1e-5);
    }

    #[test]
    fn model_normal_matrix_follows_rotation() {
        let mut scene = scene(Lesson::Model);
        scene.update(std::f32::consts::FRAC_PI_2, &InputState::new());
        let frame = scene.frame_uniforms(1.0);
        let normal = frame.normal * Vec3::X;
        assert!((normal - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!(frame.camera_position, Vec3::new(0.0, 0.0, 3.0));
    }
}
