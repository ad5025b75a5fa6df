//! Core rendering functions
//! Scanline triangle fill with per-pixel depth testing
//!
//! Coverage follows a top-left convention: a row is covered from
//! `ceil(y_top)` to `ceil(y_bottom) - 1` and a span from `ceil(x_left)` to
//! `ceil(x_right) - 1`. Every edge is walked from its upper endpoint with
//! the same start value and increment no matter which triangle owns it,
//! so triangles sharing an edge split the pixels along it exactly.

use std::cmp::Ordering;
use log::trace;
use super::depth::{DepthBuffer, DepthCompare};
use super::framebuffer::{draw_line, PixelSink};
use super::math::{approx_eq, Vec4};
use super::types::{Color, RasterSettings, Vertex};

/// A covered pixel that is about to be depth tested
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: i32,
    pub y: i32,
    /// Interpolated depth: w, or 1/w in perspective-correct mode
    pub depth: f32,
}

/// Per-pixel color strategy plugged into the scan core
pub trait PixelShader {
    fn shade(&self, frag: &Fragment) -> Color;
}

/// One uniform color for every covered pixel
#[derive(Debug, Clone, Copy)]
pub struct FlatShader {
    pub color: Color,
}

impl PixelShader for FlatShader {
    fn shade(&self, _frag: &Fragment) -> Color {
        self.color
    }
}

impl<F: Fn(&Fragment) -> Color> PixelShader for F {
    fn shade(&self, frag: &Fragment) -> Color {
        self(frag)
    }
}

/// What a fill call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// Scan ran; `pixels_written` fragments passed the depth test
    Filled { pixels_written: usize },
    /// No vertical extent, nothing drawn
    NoHeight,
    /// Vertices on one line; only the fallback stroke (if any) was drawn
    Collinear,
}

/// Walks one edge downwards, one row per step
struct Edge {
    x: f32,
    z: f32,
    dx: f32,
    dz: f32,
}

impl Edge {
    /// Edge from `top` to `bottom`, positioned on row `start_y`
    fn new(top: Vec4, top_z: f32, bottom: Vec4, bottom_z: f32, start_y: i32) -> Self {
        let dy = bottom.y - top.y;
        let dx = (bottom.x - top.x) / dy;
        let dz = (bottom_z - top_z) / dy;
        let sub_y = start_y as f32 - top.y;
        Self {
            x: top.x + dx * sub_y,
            z: top_z + dz * sub_y,
            dx,
            dz,
        }
    }

    fn step(&mut self) {
        self.x += self.dx;
        self.z += self.dz;
    }
}

/// Fill a triangle with `settings.fill_color`
pub fn fill_triangle<S, C>(
    sink: &mut S,
    zbuffer: &mut DepthBuffer<C>,
    vertices: [Vertex; 3],
    settings: &RasterSettings,
) -> FillOutcome
where
    S: PixelSink + ?Sized,
    C: DepthCompare,
{
    let shader = FlatShader { color: settings.fill_color };
    fill_triangle_shaded(sink, zbuffer, vertices, settings, &shader)
}

/// Fill a triangle, asking `shader` for the color of each fragment that
/// wins the depth test
pub fn fill_triangle_shaded<S, C, P>(
    sink: &mut S,
    zbuffer: &mut DepthBuffer<C>,
    vertices: [Vertex; 3],
    settings: &RasterSettings,
    shader: &P,
) -> FillOutcome
where
    S: PixelSink + ?Sized,
    C: DepthCompare,
    P: PixelShader + ?Sized,
{
    let [p1, p2, p3] = sort_by_y(vertices);

    let dy31 = p3.y - p1.y;
    if approx_eq(dy31, 0.0, settings.tolerance) {
        trace!("skipping triangle with no vertical extent at y={}", p1.y);
        return FillOutcome::NoHeight;
    }

    let dy21 = p2.y - p1.y;
    let dx31 = p3.x - p1.x;
    let dx21 = p2.x - p1.x;

    let cross = dx21 * dy31 - dy21 * dx31;
    if cross == 0.0 {
        trace!("collinear triangle, stroking long edge only");
        if let Some(color) = settings.collinear_stroke {
            stroke_edge(sink, p1, p3, color);
        }
        return FillOutcome::Collinear;
    }

    // v2 sits on the right of the long edge
    let right = cross > 0.0;

    let depth = |p: Vec4| if settings.perspective_correct { 1.0 / p.w } else { p.w };
    let (z1, z2, z3) = (depth(p1), depth(p2), depth(p3));

    let y_top = p1.y.ceil() as i32;
    let y_mid = p2.y.ceil() as i32;
    let y_bottom = p3.y.ceil() as i32;

    let mut written = 0;
    let mut long = Edge::new(p1, z1, p3, z3, y_top);

    // Upper half: long edge against v1 -> v2
    if y_mid > y_top {
        let mut short = Edge::new(p1, z1, p2, z2, y_top);
        for y in y_top..y_mid {
            let (l, r) = if right { (&long, &short) } else { (&short, &long) };
            written += scan_span(sink, zbuffer, shader, y, l, r);
            long.step();
            short.step();
        }
    }

    // Lower half: the long edge carries on through the seam row,
    // v2 -> v3 starts fresh
    if y_bottom > y_mid {
        let mut short = Edge::new(p2, z2, p3, z3, y_mid);
        for y in y_mid..y_bottom {
            let (l, r) = if right { (&long, &short) } else { (&short, &long) };
            written += scan_span(sink, zbuffer, shader, y, l, r);
            long.step();
            short.step();
        }
    }

    if let Some(color) = settings.wireframe {
        stroke_edge(sink, p1, p3, color);
        stroke_edge(sink, p1, p2, color);
        stroke_edge(sink, p2, p3, color);
    }

    FillOutcome::Filled { pixels_written: written }
}

/// Fill one row between two edges. Returns how many pixels were written.
fn scan_span<S, C, P>(
    sink: &mut S,
    zbuffer: &mut DepthBuffer<C>,
    shader: &P,
    y: i32,
    left: &Edge,
    right: &Edge,
) -> usize
where
    S: PixelSink + ?Sized,
    C: DepthCompare,
    P: PixelShader + ?Sized,
{
    let start_x = left.x.ceil() as i32;
    let end_x = right.x.ceil() as i32;
    if end_x <= start_x || y < 0 || y >= zbuffer.height() as i32 {
        return 0;
    }

    let dz = (right.z - left.z) / (right.x - left.x);

    // Pixels outside the depth buffer are skipped, not clamped
    let first = start_x.max(0);
    let last = end_x.min(zbuffer.width() as i32);

    let mut z = left.z + (first as f32 - left.x) * dz;
    let mut written = 0;
    for x in first..last {
        if zbuffer.test(x, y, z) {
            let frag = Fragment { x, y, depth: z };
            sink.set_pixel(x, y, shader.shade(&frag));
            zbuffer.set_z(x, y, z);
            written += 1;
        }
        z += dz;
    }
    written
}

/// Stable sort by screen Y, top first
fn sort_by_y(vertices: [Vertex; 3]) -> [Vec4; 3] {
    let mut p = vertices.map(|v| v.transformed);
    p.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal));
    p
}

fn stroke_edge<S: PixelSink + ?Sized>(sink: &mut S, a: Vec4, b: Vec4, color: Color) {
    draw_line(
        sink,
        a.x.round() as i32,
        a.y.round() as i32,
        b.x.round() as i32,
        b.y.round() as i32,
        color,
    );
}
