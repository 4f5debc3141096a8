//! Building blocks for a series of real-time rendering lessons.
//!
//! Each lesson adds one idea on top of the previous one: clearing a window,
//! drawing a triangle, rotating it through a model matrix, texturing a cube
//! room, walking through it with a first-person camera and finally lighting a
//! mesh loaded from an OBJ file. The CPU side (mesh parsing, camera math,
//! per-frame uniforms) is kept free of GPU types so it can be tested headless.

pub mod app;
pub mod assets;
pub mod camera;
pub mod config;
pub mod geometry;
pub mod input;
pub mod lesson;
pub mod obj;
pub mod render;
pub mod scene;
pub mod shaders;
pub mod texture;

pub use app::{run, WindowInitError};
pub use assets::LessonAssets;
pub use camera::{fps_view_matrix, FpsCamera, MoveInput};
pub use config::LessonConfig;
pub use geometry::{VertexData, VertexLayout};
pub use input::{InputState, KeyCode, MouseButton, NamedKey};
pub use lesson::Lesson;
pub use obj::{load_obj, load_obj_from_str, ObjError, ObjMesh};
pub use render::{FrameUniforms, Renderer};
pub use scene::LessonScene;
pub use shaders::ShaderKind;
pub use texture::TextureData;
