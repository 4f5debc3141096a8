use std::borrow::Cow;

use anyhow::Result;
use log::{info, warn};

use crate::config::LessonConfig;
use crate::geometry::{self, VertexData};
use crate::lesson::Lesson;
use crate::obj::load_obj;
use crate::shaders::ShaderKind;
use crate::texture::TextureData;

/// Everything a lesson reads from disk, gathered before any GPU work.
#[derive(Debug, Clone)]
pub struct LessonAssets {
    pub lesson: Lesson,
    pub shader: Option<(ShaderKind, Cow<'static, str>)>,
    pub geometry: Option<VertexData>,
    pub texture: Option<TextureData>,
    /// True when the model lesson shows the built-in cube instead of a file.
    pub fallback_mesh: bool,
}

impl LessonAssets {
    pub fn load(config: &LessonConfig) -> Result<Self> {
        let lesson = config.lesson;
        let shader = ShaderKind::for_lesson(lesson)
            .map(|kind| kind.load(&config.assets).map(|source| (kind, source)))
            .transpose()?;

        let mut fallback_mesh = false;
        let geometry = match lesson {
            Lesson::Clear => None,
            Lesson::Triangle | Lesson::Rotate => Some(geometry::triangle()),
            Lesson::Room | Lesson::Camera => Some(geometry::room()),
            Lesson::Model => {
                let path = config.mesh_path();
                let mesh = if config.mesh.is_none() && !path.exists() {
                    warn!(
                        "no mesh at {}; showing the built-in cube",
                        path.display()
                    );
                    fallback_mesh = true;
                    geometry::cube_mesh()
                } else {
                    let mesh = load_obj(&path)?;
                    info!(
                        "loaded mesh {} ({} vertices, {} triangles)",
                        path.display(),
                        mesh.vertex_count(),
                        mesh.triangle_count()
                    );
                    mesh.normalized()
                };
                Some(VertexData::from(mesh))
            }
        };

        let texture = lesson
            .uses_texture()
            .then(|| TextureData::load_or_checkerboard(config.texture_path()));

        Ok(Self {
            lesson,
            shader,
            geometry,
            texture,
            fallback_mesh,
        })
    }

    /// Human readable lines describing what the lesson will draw.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Lesson {}: {} ({})",
            self.lesson.number(),
            self.lesson.title(),
            self.lesson
        )];
        match &self.shader {
            Some((kind, _)) => lines.push(format!("Shader: {}", kind.file_name())),
            None => lines.push("Shader: none (clear only)".to_string()),
        }
        if let Some(geometry) = &self.geometry {
            let source = if self.fallback_mesh { " (built-in cube)" } else { "" };
            lines.push(format!(
                "Geometry: {} vertices, {} triangles{source}",
                geometry.vertex_count(),
                geometry.indices.len() / 3
            ));
        }
        if let Some(texture) = &self.texture {
            lines.push(format!("Texture: {}x{}", texture.width, texture.height));
        }
        lines
    }
}
