use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of the rendering series, in the order the steps build on each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lesson {
    Clear,
    Triangle,
    Rotate,
    Room,
    Camera,
    Model,
}

impl Lesson {
    pub const ALL: [Lesson; 6] = [
        Lesson::Clear,
        Lesson::Triangle,
        Lesson::Rotate,
        Lesson::Room,
        Lesson::Camera,
        Lesson::Model,
    ];

    /// Accepts the lesson name in any case or its 1-based position in the series.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Ok(number) = name.parse::<usize>() {
            return number
                .checked_sub(1)
                .and_then(|index| Self::ALL.get(index))
                .copied();
        }
        Self::ALL
            .iter()
            .copied()
            .find(|lesson| lesson.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Lesson::Clear => "clear",
            Lesson::Triangle => "triangle",
            Lesson::Rotate => "rotate",
            Lesson::Room => "room",
            Lesson::Camera => "camera",
            Lesson::Model => "model",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Lesson::Clear => "Opening a window",
            Lesson::Triangle => "Drawing a triangle",
            Lesson::Rotate => "Rotating the model matrix",
            Lesson::Room => "Texturing a cube room",
            Lesson::Camera => "First-person camera",
            Lesson::Model => "Loading an OBJ mesh",
        }
    }

    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub fn draws_geometry(self) -> bool {
        self != Lesson::Clear
    }

    pub fn uses_depth(self) -> bool {
        matches!(self, Lesson::Room | Lesson::Camera | Lesson::Model)
    }

    pub fn uses_texture(self) -> bool {
        matches!(self, Lesson::Room | Lesson::Camera)
    }

    pub fn uses_fps_camera(self) -> bool {
        matches!(self, Lesson::Camera | Lesson::Model)
    }

    pub fn uses_mesh(self) -> bool {
        self == Lesson::Model
    }
}

impl fmt::Display for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_numbers() {
        assert_eq!(Lesson::from_name("room"), Some(Lesson::Room));
        assert_eq!(Lesson::from_name("MODEL"), Some(Lesson::Model));
        assert_eq!(Lesson::from_name("2"), Some(Lesson::Triangle));
        assert_eq!(Lesson::from_name("0"), None);
        assert_eq!(Lesson::from_name("7"), None);
        assert_eq!(Lesson::from_name("teapot"), None);
    }

    #[test]
    fn numbers_follow_series_order() {
        for (index, lesson) in Lesson::ALL.iter().enumerate() {
            assert_eq!(lesson.number(), index + 1);
            assert_eq!(Lesson::from_name(lesson.name()), Some(*lesson));
        }
    }

    #[test]
    fn later_lessons_build_on_earlier_ones() {
        assert!(!Lesson::Clear.draws_geometry());
        assert!(!Lesson::Rotate.uses_depth());
        assert!(Lesson::Camera.uses_texture() && Lesson::Camera.uses_fps_camera());
        assert!(Lesson::Model.uses_mesh() && !Lesson::Model.uses_texture());
    }
}
