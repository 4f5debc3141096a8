//! Vertex data for the lessons' built-in shapes.

use glam::Vec3;

use crate::obj::ObjMesh;

/// Half the edge length of the textured room.
pub const ROOM_HALF_EXTENT: f32 = 5.0;
/// How many times the room texture repeats across one wall.
pub const ROOM_TILES: f32 = 4.0;

/// Attribute layout of an interleaved `f32` vertex stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    /// `position.xyz`, `color.rgb`
    PositionColor,
    /// `position.xyz`, `uv`
    PositionUv,
    /// `position.xyz`, `normal.xyz`
    PositionNormal,
}

impl VertexLayout {
    /// Component count of every attribute after the position.
    pub fn attribute_sizes(self) -> &'static [usize] {
        match self {
            VertexLayout::PositionColor | VertexLayout::PositionNormal => &[3, 3],
            VertexLayout::PositionUv => &[3, 2],
        }
    }

    pub fn floats_per_vertex(self) -> usize {
        self.attribute_sizes().iter().sum()
    }
}

/// Indexed vertex data ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexData {
    pub layout: VertexLayout,
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl VertexData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.floats_per_vertex()
    }
}

impl From<ObjMesh> for VertexData {
    fn from(mesh: ObjMesh) -> Self {
        Self {
            layout: VertexLayout::PositionNormal,
            vertices: mesh.vertices,
            indices: mesh.indices,
        }
    }
}

/// The red/green/blue triangle of the second lesson, in clip space.
pub fn triangle() -> VertexData {
    #[rustfmt::skip]
    let vertices = vec![
        // positions        // colors
         0.0,  0.5, 0.0,    1.0, 0.0, 0.0,
        -0.5, -0.5, 0.0,    0.0, 1.0, 0.0,
         0.5, -0.5, 0.0,    0.0, 0.0, 1.0,
    ];
    VertexData {
        layout: VertexLayout::PositionColor,
        vertices,
        indices: vec![0, 1, 2],
    }
}

/// Outward normal plus two in-plane axes with `u x v == normal`.
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

const QUAD_CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

fn quad_indices(face: u32) -> [u32; 6] {
    let base = face * 4;
    [base, base + 1, base + 2, base, base + 2, base + 3]
}

/// A cube seen from the inside, its walls tiled with the room texture.
///
/// Faces wind counter-clockwise when viewed from the centre.
pub fn room() -> VertexData {
    let h = ROOM_HALF_EXTENT;
    let mut vertices = Vec::with_capacity(6 * 4 * 5);
    let mut indices = Vec::with_capacity(6 * 6);
    for (face, (normal, u, v)) in CUBE_FACES.iter().enumerate() {
        // Mirroring u flips the winding towards the inside.
        let u = -*u;
        for (a, b) in QUAD_CORNERS {
            let position = (*normal + u * a + *v * b) * h;
            vertices.extend_from_slice(&position.to_array());
            vertices.push((a + 1.0) * 0.5 * ROOM_TILES);
            vertices.push((1.0 - b) * 0.5 * ROOM_TILES);
        }
        indices.extend_from_slice(&quad_indices(face as u32));
    }
    VertexData {
        layout: VertexLayout::PositionUv,
        vertices,
        indices,
    }
}

/// Unit cube with flat face normals, shown when no model file is available.
pub fn cube_mesh() -> ObjMesh {
    let mut vertices = Vec::with_capacity(6 * 4 * 6);
    let mut indices = Vec::with_capacity(6 * 6);
    for (face, (normal, u, v)) in CUBE_FACES.iter().enumerate() {
        for (a, b) in QUAD_CORNERS {
            let position = (*normal + *u * a + *v * b) * 0.5;
            vertices.extend_from_slice(&position.to_array());
            vertices.extend_from_slice(&normal.to_array());
        }
        indices.extend_from_slice(&quad_indices(face as u32));
    }
    ObjMesh { vertices, indices }
}
