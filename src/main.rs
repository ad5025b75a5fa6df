//! Bonnie Raster viewer
//!
//! Spins a camera around a small scene and shows the software-rendered
//! framebuffer in a window.
//!
//! Keys:
//! - P: toggle perspective-correct depth
//! - W: toggle the wireframe overlay
//! - S: save a PNG snapshot
//!
//! An optional first argument names a RON camera config.

use bonnie_raster::camera::{load_camera_config, Camera, CameraConfig};
use bonnie_raster::rasterizer::{
    self as rast, fill_triangle, DepthBuffer, DepthCompare, FillOutcome, Framebuffer,
    GreaterWins, LessWins, RasterSettings, Vec3, Vertex, HEIGHT, WIDTH,
};
use log::{error, info, warn};
use macroquad::prelude::*;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Bonnie Raster v{}", VERSION),
        window_width: WIDTH as i32 * 3,
        window_height: HEIGHT as i32 * 3,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// A triangle in world space with its flat color
struct SceneTriangle {
    corners: [Vec3; 3],
    color: rast::Color,
}

/// Two quads crossing each other, each split along a diagonal
fn create_test_scene() -> Vec<SceneTriangle> {
    let quad = |a: Vec3, b: Vec3, c: Vec3, d: Vec3, color: rast::Color| {
        [
            SceneTriangle { corners: [a, b, c], color },
            SceneTriangle { corners: [a, c, d], color },
        ]
    };

    let mut scene = Vec::new();
    scene.extend(quad(
        Vec3::new(-2.0, -2.0, 0.0),
        Vec3::new(2.0, -2.0, 0.0),
        Vec3::new(2.0, 2.0, 0.0),
        Vec3::new(-2.0, 2.0, 0.0),
        rast::Color::new(200, 60, 60),
    ));
    scene.extend(quad(
        Vec3::new(0.0, -1.5, -2.5),
        Vec3::new(0.0, -1.5, 2.5),
        Vec3::new(0.0, 1.5, 2.5),
        Vec3::new(0.0, 1.5, -2.5),
        rast::Color::new(60, 120, 220),
    ));
    scene
}

fn load_config() -> CameraConfig {
    let Some(path) = std::env::args().nth(1) else {
        return CameraConfig {
            screen_width: WIDTH as u32,
            screen_height: HEIGHT as u32,
            ..Default::default()
        };
    };
    match load_camera_config(&path) {
        Ok(config) => {
            info!("Loaded camera config: {}", path);
            config
        }
        Err(e) => {
            warn!("Failed to load camera config {}: {}, using defaults", path, e);
            CameraConfig::default()
        }
    }
}

/// Project and fill every triangle. Returns the number of pixels written.
fn render_scene<C: DepthCompare>(
    fb: &mut Framebuffer,
    zbuffer: &mut DepthBuffer<C>,
    camera: &Camera,
    scene: &[SceneTriangle],
    settings: &RasterSettings,
) -> usize {
    zbuffer.clear();
    let mut total = 0;
    for tri in scene {
        let vertices = tri.corners.map(|p| camera.project_vertex(&Vertex::new(p)));
        let settings = RasterSettings { fill_color: tri.color, ..settings.clone() };
        if let FillOutcome::Filled { pixels_written } = fill_triangle(fb, zbuffer, vertices, &settings) {
            total += pixels_written;
        }
    }
    total
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let config = load_config();
    let mut camera = match Camera::new(config) {
        Ok(cam) => cam,
        Err(e) => {
            error!("Invalid camera config: {}", e);
            return;
        }
    };

    let (fb_w, fb_h) = (camera.config().screen_width as usize, camera.config().screen_height as usize);
    let mut fb = Framebuffer::new(fb_w, fb_h);
    // Linear mode stores view depth (smaller is nearer),
    // perspective-correct mode stores 1/w (larger is nearer)
    let mut zb_linear = DepthBuffer::new(fb_w, fb_h, LessWins);
    let mut zb_inverse = DepthBuffer::new(fb_w, fb_h, GreaterWins);

    let scene = create_test_scene();
    let mut settings = RasterSettings::default();
    let orbit_radius = camera.config().position.len().max(1.0);
    let mut angle: f32 = 0.0;

    loop {
        if is_key_pressed(KeyCode::P) {
            settings.perspective_correct = !settings.perspective_correct;
            info!("Perspective-correct depth: {}", settings.perspective_correct);
        }
        if is_key_pressed(KeyCode::W) {
            settings.wireframe = match settings.wireframe {
                Some(_) => None,
                None => Some(rast::Color::WHITE),
            };
        }

        angle += get_frame_time() * 0.6;
        let eye = Vec3::new(angle.sin() * orbit_radius, 1.5, -angle.cos() * orbit_radius);
        let target = camera.config().look_at;
        let up = camera.config().up;
        camera.set_view(eye, target, up);

        fb.clear(rast::Color::new(24, 24, 32));
        let written = if settings.perspective_correct {
            render_scene(&mut fb, &mut zb_inverse, &camera, &scene, &settings)
        } else {
            render_scene(&mut fb, &mut zb_linear, &camera, &scene, &settings)
        };

        if is_key_pressed(KeyCode::S) {
            match fb.save_png("snapshot.png") {
                Ok(()) => info!("Saved snapshot.png"),
                Err(e) => error!("Failed to save snapshot: {}", e),
            }
        }

        let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
        texture.set_filter(FilterMode::Nearest);

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        draw_text(
            &format!(
                "{} depth | wireframe {} | {} px",
                if settings.perspective_correct { "1/w" } else { "linear" },
                if settings.wireframe.is_some() { "on" } else { "off" },
                written,
            ),
            8.0,
            20.0,
            20.0,
            WHITE,
        );

        next_frame().await;
    }
}
