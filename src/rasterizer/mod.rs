//! Scanline software rasterizer
//!
//! Features:
//! - Flat constant-color fill, or any per-pixel shader
//! - Linear or perspective-correct (1/w) depth interpolation
//! - Top-left fill convention, so shared edges are drawn exactly once
//! - Depth buffer with a pluggable comparison

mod math;
mod types;
mod depth;
mod framebuffer;
mod render;

pub use math::*;
pub use types::*;
pub use depth::*;
pub use framebuffer::*;
pub use render::*;

/// Screen dimensions (authentic PS1 resolution)
pub const WIDTH: usize = 320;
pub const HEIGHT: usize = 240;
