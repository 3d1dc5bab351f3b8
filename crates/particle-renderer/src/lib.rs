//! # Particle Renderer
//!
//! Orbit camera, apparatus mesh, particle billboards and the interference
//! overlay for the double-slit scene.

pub mod apparatus;
pub mod camera;
pub mod error;
pub mod labels;
pub mod palette;
pub mod pattern_renderer;
pub mod renderer;

pub use apparatus::*;
pub use camera::*;
pub use error::*;
pub use labels::*;
pub use palette::*;
pub use pattern_renderer::*;
pub use renderer::*;
