use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

/// Transform and lighting state consumed by the renderer's uniform buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameUniforms {
    pub view_proj: Mat4,
    pub model: Mat4,
    pub normal: Mat3,
    pub camera_position: Vec3,
    /// Direction the light travels, world space.
    pub light_direction: Vec3,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            normal: Mat3::IDENTITY,
            camera_position: Vec3::ZERO,
            light_direction: Vec3::NEG_Y,
        }
    }
}

/// std140 mirror of the `Globals` struct declared by every lesson shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct GlobalUniform {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 3],
    camera_position: [f32; 4],
    light_direction: [f32; 4],
}

impl From<&FrameUniforms> for GlobalUniform {
    fn from(frame: &FrameUniforms) -> Self {
        Self {
            view_proj: frame.view_proj.to_cols_array_2d(),
            model: frame.model.to_cols_array_2d(),
            normal: mat3_to_3x4(frame.normal),
            camera_position: frame.camera_position.extend(1.0).into(),
            light_direction: frame.light_direction.extend(0.0).into(),
        }
    }
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    [
        matrix.x_axis.extend(0.0).into(),
        matrix.y_axis.extend(0.0).into(),
        matrix.z_axis.extend(0.0).into(),
    ]
}
