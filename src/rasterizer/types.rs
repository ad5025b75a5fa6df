//! Core types for the rasterizer

use serde::{Serialize, Deserialize};
use super::math::{Vec3, Vec4, DEFAULT_TOLERANCE};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a 0xAARRGGBB value
    pub fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack as 0xAARRGGBB
    pub fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A vertex moving through the transform pipeline.
///
/// `position` is the world-space point; `transformed` is whatever the
/// camera produced for it. Only `transformed` is read by the rasterizer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub transformed: Vec4,
}

impl Vertex {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            transformed: Vec4::from_point(position),
        }
    }

    /// Vertex that is already in screen space
    pub fn screen(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            transformed: Vec4::new(x, y, z, w),
        }
    }
}

/// Rasterizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterSettings {
    /// Interpolate 1/w instead of w. The depth buffer then stores 1/w,
    /// so nearer fragments have larger values.
    pub perspective_correct: bool,
    /// Color used by the constant-fill variant
    pub fill_color: Color,
    /// Stroke all three edges in this color after the fill
    pub wireframe: Option<Color>,
    /// Stroke for triangles whose vertices are collinear
    pub collinear_stroke: Option<Color>,
    /// Float tolerance for the zero-height check
    pub tolerance: f32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            perspective_correct: false,
            fill_color: Color::WHITE,
            wireframe: None,
            collinear_stroke: Some(Color::BLACK),
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}
