use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::lesson::Lesson;

/// Settings shared by every lesson. Values come from the defaults, an
/// optional XML file and finally the command line, in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonConfig {
    pub lesson: Lesson,
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Linear RGB in 0..1.
    pub clear_color: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Radians of rotation per pixel of mouse motion.
    pub sensitivity: f32,
    /// Units per second.
    pub speed: f32,
    /// Radians per second for the spinning lessons.
    pub spin: f32,
    pub start: Vec3,
    pub assets: PathBuf,
    pub mesh: Option<PathBuf>,
    pub texture: Option<PathBuf>,
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self {
            lesson: Lesson::Clear,
            title: None,
            width: 640,
            height: 480,
            clear_color: Vec3::ZERO,
            fov: 60.0,
            sensitivity: 0.0025,
            speed: 3.0,
            spin: 1.0,
            start: Vec3::new(0.0, 0.0, 3.0),
            assets: PathBuf::from("assets"),
            mesh: None,
            texture: None,
        }
    }
}

impl LessonConfig {
    pub fn for_lesson(lesson: Lesson) -> Self {
        Self {
            lesson,
            ..Self::default()
        }
    }

    pub fn window_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| {
            format!(
                "Lesson {}: {}",
                self.lesson.number(),
                self.lesson.title()
            )
        })
    }

    /// Explicit mesh path, or `<assets>/models/model.obj`.
    pub fn mesh_path(&self) -> PathBuf {
        self.mesh
            .clone()
            .unwrap_or_else(|| self.assets.join("models").join("model.obj"))
    }

    /// Explicit texture path, or `<assets>/textures/room.png`.
    pub fn texture_path(&self) -> PathBuf {
        self.texture
            .clone()
            .unwrap_or_else(|| self.assets.join("textures").join("room.png"))
    }

    pub fn load(path: impl AsRef<Path>, lesson: Lesson) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read config {}", path.display()))?;
        Self::from_xml(&xml, lesson)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses a `<lesson>` document. Missing tags keep their defaults.
    pub fn from_xml(xml: &str, lesson: Lesson) -> Result<Self> {
        let document = Document::parse(xml).context("invalid config XML")?;
        let root = document.root_element();
        if !root.has_tag_name("lesson") {
            return Err(anyhow!(
                "expected <lesson> root element, found <{}>",
                root.tag_name().name()
            ));
        }

        let mut config = Self::for_lesson(lesson);
        config.title = optional_text(&root, "title");
        config.width = parse_dimension(optional_text(&root, "width"), config.width)?;
        config.height = parse_dimension(optional_text(&root, "height"), config.height)?;
        config.clear_color = parse_color(optional_text(&root, "clear"), config.clear_color)?;
        config.fov = parse_f32(optional_text(&root, "fov"), config.fov)?;
        config.sensitivity = parse_f32(optional_text(&root, "sensitivity"), config.sensitivity)?;
        config.speed = parse_f32(optional_text(&root, "speed"), config.speed)?;
        config.spin = parse_f32(optional_text(&root, "spin"), config.spin)?;
        config.start = parse_vec3(optional_text(&root, "start"), config.start)?;
        if let Some(assets) = optional_text(&root, "assets") {
            config.assets = PathBuf::from(assets);
        }
        config.mesh = optional_text(&root, "mesh").map(PathBuf::from);
        config.texture = optional_text(&root, "texture").map(PathBuf::from);

        if !(1.0..179.0).contains(&config.fov) {
            return Err(anyhow!("fov must be between 1 and 179 degrees"));
        }
        Ok(config)
    }
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let numbers = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .map_err(|err| anyhow!("invalid vector component `{component}`: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    match numbers.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(anyhow!("vector needs exactly 3 components, got `{value}`")),
    }
}

/// Colors are written as 0-255 triples.
fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let is_set = value.is_some();
    let color = parse_vec3(value, default)?;
    if !is_set {
        return Ok(color);
    }
    if color.min_element() < 0.0 || color.max_element() > 255.0 {
        return Err(anyhow!("color components must be within 0-255"));
    }
    Ok(color / 255.0)
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

fn parse_dimension(value: Option<String>, default: u32) -> Result<u32> {
    match value {
        Some(value) => match value.parse::<u32>() {
            Ok(0) => Err(anyhow!("window dimensions must be positive")),
            Ok(size) => Ok(size),
            Err(err) => Err(anyhow!("failed to parse dimension `{value}`: {err}")),
        },
        None => Ok(default),
    }
}
