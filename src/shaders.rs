use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::lesson::Lesson;

/// The WGSL programs used across the lessons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    /// Per-vertex colors, used by the triangle lessons.
    Color,
    /// Texture lookup for the room.
    Textured,
    /// Directional diffuse + specular lighting from vertex normals.
    Lit,
}

impl ShaderKind {
    pub fn for_lesson(lesson: Lesson) -> Option<Self> {
        match lesson {
            Lesson::Clear => None,
            Lesson::Triangle | Lesson::Rotate => Some(Self::Color),
            Lesson::Room | Lesson::Camera => Some(Self::Textured),
            Lesson::Model => Some(Self::Lit),
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Color => "color.wgsl",
            Self::Textured => "textured.wgsl",
            Self::Lit => "lit.wgsl",
        }
    }

    pub fn bundled(self) -> &'static str {
        match self {
            Self::Color => include_str!("../assets/shaders/color.wgsl"),
            Self::Textured => include_str!("../assets/shaders/textured.wgsl"),
            Self::Lit => include_str!("../assets/shaders/lit.wgsl"),
        }
    }

    /// Reads `<assets>/shaders/<file>` when present so shaders can be edited
    /// without rebuilding; otherwise returns the copy compiled into the binary.
    pub fn load(self, assets: &Path) -> Result<Cow<'static, str>> {
        let path = assets.join("shaders").join(self.file_name());
        if !path.is_file() {
            return Ok(Cow::Borrowed(self.bundled()));
        }
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("unable to read shader {}", path.display()))?;
        info!("using shader override {}", path.display());
        Ok(Cow::Owned(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_sources_define_entry_points() {
        for kind in [ShaderKind::Color, ShaderKind::Textured, ShaderKind::Lit] {
            let source = kind.bundled();
            assert!(source.contains("fn vs_main"), "{kind:?}");
            assert!(source.contains("fn fs_main"), "{kind:?}");
        }
    }

    #[test]
    fn override_on_disk_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("shaders")).unwrap();
        std::fs::write(dir.path().join("shaders").join("lit.wgsl"), "// custom").unwrap();

        assert_eq!(ShaderKind::Lit.load(dir.path()).unwrap(), "// custom");
        assert_eq!(
            ShaderKind::Color.load(dir.path()).unwrap(),
            ShaderKind::Color.bundled()
        );
    }

    #[test]
    fn clear_lesson_has_no_shader() {
        assert_eq!(ShaderKind::for_lesson(Lesson::Clear), None);
        assert_eq!(ShaderKind::for_lesson(Lesson::Camera), Some(ShaderKind::Textured));
    }
}
