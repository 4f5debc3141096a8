mod common;
mod renderer;

pub use common::FrameUniforms;
pub use renderer::Renderer;
