//! Camera configuration loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable camera files.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use crate::rasterizer::Vec3;

/// How camera space is flattened onto the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    Orthographic,
    Perspective,
}

/// Everything a camera is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Up hint, doesn't need to be perpendicular to the view direction
    pub up: Vec3,
    /// Vertical field of view in degrees (perspective only)
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub screen_width: u32,
    pub screen_height: u32,
    pub screen_offset_x: i32,
    pub screen_offset_y: i32,
    pub projection: Projection,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -5.0),
            look_at: Vec3::ZERO,
            up: Vec3::UP,
            fov_y: 90.0,
            near: 1.0,
            far: 100.0,
            screen_width: 320,
            screen_height: 240,
            screen_offset_x: 0,
            screen_offset_y: 0,
            projection: Projection::Perspective,
        }
    }
}

/// Error type for camera construction and config files
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Field of view must be between 0 and 180 degrees, got {0}")]
    InvalidFieldOfView(f32),
    #[error("Near and far clip distances must differ (both {0})")]
    NearEqualsFar(f32),
    #[error("Screen size must be non-zero, got {width}x{height}")]
    InvalidScreen { width: u32, height: u32 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Load a camera config from a RON file
pub fn load_camera_config<P: AsRef<Path>>(path: P) -> Result<CameraConfig, CameraError> {
    let contents = fs::read_to_string(path)?;
    camera_config_from_str(&contents)
}

/// Parse a camera config from RON text
pub fn camera_config_from_str(s: &str) -> Result<CameraConfig, CameraError> {
    Ok(ron::from_str(s)?)
}

/// Save a camera config to a RON file
pub fn save_camera_config<P: AsRef<Path>>(config: &CameraConfig, path: P) -> Result<(), CameraError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());
    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}
