use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Floats per interleaved vertex: `position.xyz` followed by `normal.xyz`.
pub const FLOATS_PER_VERTEX: usize = 6;

/// GPU ready mesh buffers produced from an OBJ file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjMesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

/// Reasons an OBJ document is rejected. Line numbers are 1-based.
#[derive(Debug, Error, PartialEq)]
pub enum ObjError {
    #[error("line {line}: `{value}` is not a number")]
    InvalidNumber { line: usize, value: String },
    #[error("line {line}: `{statement}` needs {expected} components")]
    MissingComponent {
        line: usize,
        statement: &'static str,
        expected: usize,
    },
    #[error("line {line}: faces must reference at least 3 vertices, found {corners}")]
    DegenerateFace { line: usize, corners: usize },
    #[error("line {line}: {kind} index {index} is out of range")]
    BadIndex {
        line: usize,
        kind: &'static str,
        index: i64,
    },
    #[error("OBJ file does not define any vertices")]
    NoVertices,
    #[error("OBJ file does not define any faces")]
    NoFaces,
}

/// Reads and parses an OBJ file from disk.
pub fn load_obj(path: impl AsRef<Path>) -> Result<ObjMesh> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("unable to read mesh {}", path.display()))?;
    let mesh = load_obj_from_str(&contents)
        .with_context(|| format!("failed to parse OBJ mesh {}", path.display()))?;
    Ok(mesh)
}

/// Parses an OBJ file from memory and returns interleaved vertex/index arrays.
///
/// Only geometry statements are understood (`v`, `vn`, `vt`, `f`); grouping
/// and material statements are skipped. Polygons are fan-triangulated and
/// corners without a normal reference receive a smoothed face normal.
pub fn load_obj_from_str(data: &str) -> Result<ObjMesh, ObjError> {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut texcoord_count = 0;
    let mut faces: Vec<[Corner; 3]> = Vec::new();

    for (line_no, line) in data.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        match tag {
            "v" => positions.push(parse_vec3(parts, "v", line_no)?),
            "vn" => normals.push(parse_vec3(parts, "vn", line_no)?),
            "vt" => {
                // Texture coordinates are validated but not carried into the mesh.
                parse_floats::<2>(parts, "vt", line_no)?;
                texcoord_count += 1;
            }
            "f" => {
                let counts = ElementCounts {
                    positions: positions.len(),
                    texcoords: texcoord_count,
                    normals: normals.len(),
                };
                let polygon = parse_face(parts, line_no, counts)?;
                triangulate_face(&polygon, &mut faces);
            }
            _ => {}
        }
    }

    if positions.is_empty() {
        return Err(ObjError::NoVertices);
    }
    if faces.is_empty() {
        return Err(ObjError::NoFaces);
    }

    build_mesh(&positions, &normals, &faces)
}

fn parse_floats<'a, const N: usize>(
    mut parts: impl Iterator<Item = &'a str>,
    statement: &'static str,
    line: usize,
) -> Result<[f32; N], ObjError> {
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        let value = parts.next().ok_or(ObjError::MissingComponent {
            line,
            statement,
            expected: N,
        })?;
        *slot = value.parse::<f32>().map_err(|_| ObjError::InvalidNumber {
            line,
            value: value.to_string(),
        })?;
    }
    Ok(out)
}

fn parse_vec3<'a>(
    parts: impl Iterator<Item = &'a str>,
    statement: &'static str,
    line: usize,
) -> Result<Vec3, ObjError> {
    parse_floats::<3>(parts, statement, line).map(Vec3::from_array)
}

/// Number of each element kind defined before the current face.
#[derive(Debug, Clone, Copy)]
struct ElementCounts {
    positions: usize,
    texcoords: usize,
    normals: usize,
}

fn parse_face<'a>(
    parts: impl Iterator<Item = &'a str>,
    line: usize,
    counts: ElementCounts,
) -> Result<Vec<Corner>, ObjError> {
    let mut corners = Vec::new();
    for part in parts {
        let mut segments = part.split('/');
        let v = segments.next().unwrap_or_default();
        let position = resolve_index(parse_index(v, line)?, counts.positions, line, "vertex")?;
        // Texture references must be valid even though the mesh drops them.
        if let Some(vt) = segments.next().filter(|vt| !vt.is_empty()) {
            resolve_index(parse_index(vt, line)?, counts.texcoords, line, "texture")?;
        }
        let normal = match segments.next() {
            Some(vn) if !vn.is_empty() => Some(resolve_index(
                parse_index(vn, line)?,
                counts.normals,
                line,
                "normal",
            )?),
            _ => None,
        };
        corners.push(Corner { position, normal });
    }
    if corners.len() < 3 {
        return Err(ObjError::DegenerateFace {
            line,
            corners: corners.len(),
        });
    }
    Ok(corners)
}

fn parse_index(value: &str, line: usize) -> Result<i64, ObjError> {
    value.parse::<i64>().map_err(|_| ObjError::InvalidNumber {
        line,
        value: value.to_string(),
    })
}

/// Resolves 1-based and negative (relative) indices against the elements read so far.
fn resolve_index(
    index: i64,
    len: usize,
    line: usize,
    kind: &'static str,
) -> Result<usize, ObjError> {
    let resolved = if index > 0 {
        Some(index as usize - 1)
    } else if index < 0 {
        len.checked_sub(index.unsigned_abs() as usize)
    } else {
        None
    };
    resolved
        .filter(|&i| i < len)
        .ok_or(ObjError::BadIndex { line, kind, index })
}

fn triangulate_face(polygon: &[Corner], faces: &mut Vec<[Corner; 3]>) {
    if polygon.len() < 3 {
        return;
    }
    for i in 1..(polygon.len() - 1) {
        faces.push([polygon[0], polygon[i], polygon[i + 1]]);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Corner {
    position: usize,
    normal: Option<usize>,
}

fn build_mesh(
    positions: &[Vec3],
    normals: &[Vec3],
    faces: &[[Corner; 3]],
) -> Result<ObjMesh, ObjError> {
    let mut lookup: HashMap<Corner, u32> = HashMap::new();
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut missing_normals = Vec::new();

    for face in faces {
        for corner in face {
            let next_index = (vertices.len() / FLOATS_PER_VERTEX) as u32;
            let entry = lookup.entry(*corner).or_insert_with(|| {
                let position = positions[corner.position];
                vertices.extend_from_slice(&position.to_array());
                match corner.normal {
                    Some(i) => vertices.extend_from_slice(&normals[i].to_array()),
                    None => {
                        vertices.extend_from_slice(&[0.0; 3]);
                        missing_normals.push(next_index as usize);
                    }
                }
                next_index
            });
            indices.push(*entry);
        }
    }

    let mut mesh = ObjMesh { vertices, indices };
    if !missing_normals.is_empty() {
        compute_normals(&mut mesh, &missing_normals);
    }
    Ok(mesh)
}

/// Fills the listed vertices with the normalized sum of their adjacent face normals.
fn compute_normals(mesh: &mut ObjMesh, targets: &[usize]) {
    let vertex_count = mesh.vertex_count();
    let mut accum = vec![Vec3::ZERO; vertex_count];

    for triangle in mesh.indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let p0 = mesh.position(i0);
        let p1 = mesh.position(i1);
        let p2 = mesh.position(i2);
        let normal = (p1 - p0).cross(p2 - p0);
        if normal.length_squared() > f32::EPSILON {
            let normal = normal.normalize();
            accum[i0] += normal;
            accum[i1] += normal;
            accum[i2] += normal;
        }
    }

    for &i in targets {
        let normal = accum[i].normalize_or_zero();
        let base = i * FLOATS_PER_VERTEX + 3;
        mesh.vertices[base..base + 3].copy_from_slice(&normal.to_array());
    }
}

impl ObjMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * FLOATS_PER_VERTEX;
        Vec3::from_slice(&self.vertices[base..base + 3])
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        let base = index * FLOATS_PER_VERTEX + 3;
        Vec3::from_slice(&self.vertices[base..base + 3])
    }

    /// Axis-aligned bounds of all positions, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        (0..self.vertex_count())
            .map(|i| self.position(i))
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((min, max)) => Some((min.min(p), max.max(p))),
            })
    }

    /// Returns a copy recentred on the origin and scaled to fit inside a unit sphere.
    pub fn normalized(&self) -> ObjMesh {
        let Some((min, max)) = self.bounds() else {
            return self.clone();
        };
        let center = (min + max) * 0.5;
        let radius = (0..self.vertex_count())
            .map(|i| (self.position(i) - center).length())
            .fold(0.0_f32, f32::max);
        let scale = if radius > f32::EPSILON { radius.recip() } else { 1.0 };

        let mut mesh = self.clone();
        for chunk in mesh.vertices.chunks_exact_mut(FLOATS_PER_VERTEX) {
            let p = (Vec3::from_slice(&chunk[..3]) - center) * scale;
            chunk[..3].copy_from_slice(&p.to_array());
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[test]
    fn parses_simple_triangle() {
        let mesh = load_obj_from_str(TRIANGLE).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices.len(), 18);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn computes_missing_normals() {
        let mesh = load_obj_from_str(TRIANGLE).unwrap();
        for i in 0..mesh.vertex_count() {
            assert!((mesh.normal(i) - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn keeps_explicit_normals() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 -1\nf 1//1 2//1 3//1\n";
        let mesh = load_obj_from_str(obj).unwrap();
        assert_eq!(mesh.normal(0), Vec3::NEG_Z);
        assert_eq!(mesh.normal(2), Vec3::NEG_Z);
    }

    #[test]
    fn quads_are_fan_triangulated_and_shared_corners_deduplicated() {
        let obj = "\
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vn 0 0 1
usemtl none
f 1/1/1 2/1/1 3/1/1 4/1/1
";
        let mesh = load_obj_from_str(obj).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn negative_indices_are_relative_to_the_current_line() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\nv 5 5 5\n";
        let mesh = load_obj_from_str(obj).unwrap();
        assert_eq!(mesh.position(2), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn reports_line_numbers() {
        let err = load_obj_from_str("v 0 0 0\nv 1 x 0\n").unwrap_err();
        assert_eq!(
            err,
            ObjError::InvalidNumber {
                line: 2,
                value: "x".into()
            }
        );

        let err = load_obj_from_str("v 0 0\n").unwrap_err();
        assert!(matches!(err, ObjError::MissingComponent { line: 1, .. }));

        let err = load_obj_from_str("v 0 0 0\nv 1 0 0\n\nf 1 2\n").unwrap_err();
        assert_eq!(err, ObjError::DegenerateFace { line: 4, corners: 2 });
    }

    #[test]
    fn rejects_bad_indices_and_empty_files() {
        let err = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n").unwrap_err();
        assert!(matches!(err, ObjError::BadIndex { line: 4, index: 4, .. }));
        let err = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, ObjError::BadIndex { index: 0, .. }));
        assert_eq!(load_obj_from_str("# nothing\n"), Err(ObjError::NoVertices));
    }

    #[test]
    fn rejects_files_without_faces() {
        let err = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap_err();
        assert_eq!(err, ObjError::NoFaces);
    }

    #[test]
    fn texture_references_are_checked() {
        let err = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/x 2/1 3/1\n")
            .unwrap_err();
        assert_eq!(
            err,
            ObjError::InvalidNumber {
                line: 5,
                value: "x".into()
            }
        );

        let err = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/2 3/1\n")
            .unwrap_err();
        assert_eq!(
            err,
            ObjError::BadIndex {
                line: 5,
                kind: "texture",
                index: 2
            }
        );
    }

    #[test]
    fn texture_only_corners_get_smoothed_normals() {
        let obj = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";
        let mesh = load_obj_from_str(obj).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        for i in 0..mesh.vertex_count() {
            assert!((mesh.normal(i) - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn negative_normal_indices_use_the_latest_normals() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
vn 0 1 0
vn 1 0 0
f 1//-3 2//-2 3//-1
";
        let mesh = load_obj_from_str(obj).unwrap();
        assert_eq!(mesh.normal(0), Vec3::Z);
        assert_eq!(mesh.normal(1), Vec3::Y);
        assert_eq!(mesh.normal(2), Vec3::X);
    }

    #[test]
    fn normalized_mesh_fits_unit_sphere() {
        let obj = "v 10 10 10\nv 14 10 10\nv 10 14 10\nf 1 2 3\n";
        let mesh = load_obj_from_str(obj).unwrap().normalized();
        let (min, max) = mesh.bounds().unwrap();
        let center = (min + max) * 0.5;
        assert!(center.length() < 1e-5);
        let furthest = (0..mesh.vertex_count())
            .map(|i| mesh.position(i).length())
            .fold(0.0_f32, f32::max);
        assert!((furthest - 1.0).abs() < 1e-5);
    }
}
