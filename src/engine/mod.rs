//! The GPU-facing half of the previewer: application/context setup,
//! program management, mesh buffers, textures, and the render engine
//! that drives them every frame.

pub mod app;
pub mod mesh;
pub mod program;
pub mod renderer;
pub mod texture;

pub use app::*;
pub use mesh::*;
pub use program::*;
pub use renderer::*;
pub use texture::*;
