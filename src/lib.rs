//! Bonnie Raster: CPU camera pipeline and scanline triangle rasterizer
//!
//! A host renders a frame by building a [`camera::Camera`], pushing each
//! triangle's vertices through it, and handing the screen-space vertices to
//! [`rasterizer::fill_triangle`] together with a shared
//! [`rasterizer::DepthBuffer`] and [`rasterizer::PixelSink`].

pub mod camera;
pub mod rasterizer;
