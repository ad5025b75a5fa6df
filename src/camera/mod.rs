//! Camera transform pipeline
//!
//! A camera owns three chained transforms, applied in this order:
//! world -> camera -> projection -> screen. Perspective cameras also keep
//! a view frustum for external culling.
//!
//! Transforms are only reachable through accessors. Every setter rebuilds
//! exactly the transforms it affects before returning, so a camera can't
//! hand out a stale matrix.

mod config;
mod frustum;

pub use config::*;
pub use frustum::*;

use log::debug;
use crate::rasterizer::{approx_eq, Mat4, Vec3, Vec4, Vertex, DEFAULT_TOLERANCE};

/// Orthonormal camera axes `(x, y, z)` for a look-at setup.
///
/// `z` points from `position` to `look_at`. `up` is only a hint: it is
/// re-orthogonalized against `z`, and nudged off-axis if it runs parallel
/// to the view direction.
pub fn camera_basis(position: Vec3, look_at: Vec3, up: Vec3, tolerance: f32) -> (Vec3, Vec3, Vec3) {
    let mut z_axis = (look_at - position).normalize();
    if z_axis == Vec3::ZERO {
        z_axis = Vec3::new(0.0, 0.0, 1.0);
    }

    let mut y_axis = up.normalize();
    if y_axis == Vec3::ZERO {
        y_axis = Vec3::UP;
    }

    if approx_eq(y_axis.dot(z_axis).abs(), 1.0, tolerance) {
        // Push up along the axis the view direction has least of
        let (ax, ay, az) = (z_axis.x.abs(), z_axis.y.abs(), z_axis.z.abs());
        if ax <= ay && ax <= az {
            y_axis.x += 0.5;
        } else if ay <= az {
            y_axis.y += 0.5;
        } else {
            y_axis.z += 0.5;
        }
        y_axis = y_axis.normalize();
    }

    let x_axis = y_axis.cross(z_axis).normalize();
    let y_axis = z_axis.cross(x_axis);

    (x_axis, y_axis, z_axis)
}

/// World -> camera: rotate into the camera basis, then move the eye to the origin
pub fn build_world_to_camera(position: Vec3, look_at: Vec3, up: Vec3, tolerance: f32) -> Mat4 {
    let (x, y, z) = camera_basis(position, look_at, up, tolerance);
    Mat4::from_rows([
        [x.x, x.y, x.z, -position.dot(x)],
        [y.x, y.y, y.z, -position.dot(y)],
        [z.x, z.y, z.z, -position.dot(z)],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Camera -> projection.
///
/// Perspective maps view depth `near..far` to clip z `0..far` (0..1 after
/// the divide), growing with z, via `A = f/(f-n)`, `B = -f*n/(f-n)`.
/// Orthographic is the identity.
pub fn build_camera_to_projection(
    projection: Projection,
    fov_y: f32,
    near: f32,
    far: f32,
    aspect_ratio: f32,
    tolerance: f32,
) -> Result<Mat4, CameraError> {
    match projection {
        Projection::Orthographic => Ok(Mat4::IDENTITY),
        Projection::Perspective => {
            let half_angle = (fov_y / 2.0).to_radians();
            if half_angle < 0.0
                || approx_eq(half_angle, 0.0, tolerance)
                || half_angle >= std::f32::consts::FRAC_PI_2
            {
                return Err(CameraError::InvalidFieldOfView(fov_y));
            }
            if approx_eq(near, far, tolerance) {
                return Err(CameraError::NearEqualsFar(near));
            }

            let d = 1.0 / half_angle.tan();
            let a = far / (far - near);
            let b = -far * near / (far - near);

            Ok(Mat4::from_rows([
                [d / aspect_ratio, 0.0, 0.0, 0.0],
                [0.0, d, 0.0, 0.0],
                [0.0, 0.0, a, b],
                [0.0, 0.0, 1.0, 0.0],
            ]))
        }
    }
}

/// Projection -> screen pixels, flipping Y so it grows downward
pub fn build_projection_to_screen(
    projection: Projection,
    width: u32,
    height: u32,
    offset_x: i32,
    offset_y: i32,
) -> Mat4 {
    let half_w = width as f32 / 2.0;
    let half_h = height as f32 / 2.0;
    let (sx, sy) = match projection {
        // Divided coordinates are in -1..1
        Projection::Perspective => (half_w, half_h),
        Projection::Orthographic => (1.0, 1.0),
    };

    Mat4::from_rows([
        [sx, 0.0, 0.0, half_w + offset_x as f32],
        [0.0, -sy, 0.0, half_h + offset_y as f32],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Camera with its derived transforms
#[derive(Debug, Clone)]
pub struct Camera {
    config: CameraConfig,
    aspect_ratio: f32,
    tolerance: f32,
    world_to_camera: Mat4,
    camera_to_projection: Mat4,
    projection_to_screen: Mat4,
    frustum: Option<ViewFrustum>,
}

impl Camera {
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        Self::with_tolerance(config, DEFAULT_TOLERANCE)
    }

    pub fn with_tolerance(config: CameraConfig, tolerance: f32) -> Result<Self, CameraError> {
        if config.screen_width == 0 || config.screen_height == 0 {
            return Err(CameraError::InvalidScreen {
                width: config.screen_width,
                height: config.screen_height,
            });
        }
        let aspect_ratio = config.screen_width as f32 / config.screen_height as f32;

        let mut cam = Self {
            config,
            aspect_ratio,
            tolerance,
            world_to_camera: Mat4::IDENTITY,
            camera_to_projection: Mat4::IDENTITY,
            projection_to_screen: Mat4::IDENTITY,
            frustum: None,
        };
        cam.camera_to_projection = cam.projection_matrix(&cam.config)?;
        cam.update_world_to_camera();
        cam.update_projection_to_screen();
        cam.update_frustum();
        debug!(
            "camera built: {:?} {}x{} aspect {:.3}",
            cam.config.projection, cam.config.screen_width, cam.config.screen_height, aspect_ratio
        );
        Ok(cam)
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn world_to_camera(&self) -> &Mat4 {
        &self.world_to_camera
    }

    pub fn camera_to_projection(&self) -> &Mat4 {
        &self.camera_to_projection
    }

    pub fn projection_to_screen(&self) -> &Mat4 {
        &self.projection_to_screen
    }

    /// Only perspective cameras have one
    pub fn frustum(&self) -> Option<&ViewFrustum> {
        self.frustum.as_ref()
    }

    /// camera_to_projection * world_to_camera
    pub fn view_projection(&self) -> Mat4 {
        self.camera_to_projection.multiply(&self.world_to_camera)
    }

    /// Move the image on screen. Rebuilds the screen transform only.
    pub fn set_screen_offset(&mut self, x: i32, y: i32) {
        self.config.screen_offset_x = x;
        self.config.screen_offset_y = y;
        self.update_projection_to_screen();
    }

    /// Re-aim the camera. Rebuilds world -> camera and the frustum.
    pub fn set_view(&mut self, position: Vec3, look_at: Vec3, up: Vec3) {
        self.config.position = position;
        self.config.look_at = look_at;
        self.config.up = up;
        self.update_world_to_camera();
        self.update_frustum();
    }

    /// Change field of view and clip distances. Rebuilds the projection and
    /// the frustum; on error the camera is left untouched.
    pub fn set_lens(&mut self, fov_y: f32, near: f32, far: f32) -> Result<(), CameraError> {
        let mut config = self.config.clone();
        config.fov_y = fov_y;
        config.near = near;
        config.far = far;
        self.camera_to_projection = self.projection_matrix(&config)?;
        self.config = config;
        self.update_frustum();
        Ok(())
    }

    /// Rebuild every transform from a new config. The aspect ratio stays the
    /// one picked at construction.
    pub fn rebuild(&mut self, config: CameraConfig) -> Result<(), CameraError> {
        self.camera_to_projection = self.projection_matrix(&config)?;
        self.config = config;
        self.update_world_to_camera();
        self.update_projection_to_screen();
        self.update_frustum();
        debug!("camera rebuilt: {:?}", self.config.projection);
        Ok(())
    }

    /// Push a world-space point through all three transforms.
    ///
    /// Returns pixel `x`/`y`, the projected depth in `z` (0..1 between near
    /// and far for perspective) and the view-space depth in `w`.
    pub fn world_to_screen(&self, p: Vec3) -> Vec4 {
        let cam = self.world_to_camera.transform(Vec4::from_point(p));
        let clip = self.camera_to_projection.transform(cam);
        let ndc = match self.config.projection {
            Projection::Perspective => clip.perspective_divide(),
            Projection::Orthographic => clip,
        };
        let screen = self
            .projection_to_screen
            .transform(Vec4::new(ndc.x, ndc.y, ndc.z, 1.0));
        Vec4::new(screen.x, screen.y, ndc.z, cam.z)
    }

    /// Copy of `v` with `transformed` set to its screen position
    pub fn project_vertex(&self, v: &Vertex) -> Vertex {
        Vertex {
            position: v.position,
            transformed: self.world_to_screen(v.position),
        }
    }

    fn projection_matrix(&self, config: &CameraConfig) -> Result<Mat4, CameraError> {
        build_camera_to_projection(
            config.projection,
            config.fov_y,
            config.near,
            config.far,
            self.aspect_ratio,
            self.tolerance,
        )
    }

    fn update_world_to_camera(&mut self) {
        self.world_to_camera = build_world_to_camera(
            self.config.position,
            self.config.look_at,
            self.config.up,
            self.tolerance,
        );
    }

    fn update_projection_to_screen(&mut self) {
        self.projection_to_screen = build_projection_to_screen(
            self.config.projection,
            self.config.screen_width,
            self.config.screen_height,
            self.config.screen_offset_x,
            self.config.screen_offset_y,
        );
    }

    fn update_frustum(&mut self) {
        self.frustum = match self.config.projection {
            Projection::Perspective => Some(ViewFrustum::from_matrix(&self.view_projection())),
            Projection::Orthographic => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_orthonormal(x: Vec3, y: Vec3, z: Vec3) {
        assert!((x.len() - 1.0).abs() < EPS, "x not unit: {:?}", x);
        assert!((y.len() - 1.0).abs() < EPS, "y not unit: {:?}", y);
        assert!((z.len() - 1.0).abs() < EPS, "z not unit: {:?}", z);
        assert!(x.dot(y).abs() < EPS);
        assert!(y.dot(z).abs() < EPS);
        assert!(z.dot(x).abs() < EPS);
    }

    fn square_camera() -> CameraConfig {
        CameraConfig {
            position: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, 10.0),
            up: Vec3::UP,
            fov_y: 90.0,
            near: 1.0,
            far: 100.0,
            screen_width: 100,
            screen_height: 100,
            screen_offset_x: 0,
            screen_offset_y: 0,
            projection: Projection::Perspective,
        }
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let cases = [
            (Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, Vec3::UP),
            (Vec3::new(3.0, 4.0, -2.0), Vec3::new(-1.0, 0.5, 7.0), Vec3::new(0.2, 1.0, 0.1)),
            (Vec3::new(1.0, 1.0, 1.0), Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)),
        ];
        for (pos, target, up) in cases {
            let (x, y, z) = camera_basis(pos, target, up, DEFAULT_TOLERANCE);
            assert_orthonormal(x, y, z);
        }
    }

    #[test]
    fn test_parallel_up_is_corrected() {
        for up in [Vec3::UP, Vec3::new(0.0, -3.0, 0.0)] {
            let (x, y, z) = camera_basis(Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0), up, DEFAULT_TOLERANCE);
            assert_orthonormal(x, y, z);
        }
        // Looking down x with up along x
        let (x, y, z) = camera_basis(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), DEFAULT_TOLERANCE);
        assert_orthonormal(x, y, z);
    }

    #[test]
    fn test_world_to_camera_moves_eye_to_origin() {
        let pos = Vec3::new(3.0, -2.0, 8.0);
        let m = build_world_to_camera(pos, Vec3::new(0.0, 1.0, 0.0), Vec3::UP, DEFAULT_TOLERANCE);
        let eye = m.transform(Vec4::from_point(pos));
        assert!(eye.xyz().len() < 1e-4);
        let target = m.transform(Vec4::from_point(Vec3::new(0.0, 1.0, 0.0)));
        assert!(target.x.abs() < 1e-4 && target.y.abs() < 1e-4);
        assert!(target.z > 0.0);
    }

    #[test]
    fn test_depth_mapping() {
        let cam = Camera::new(square_camera()).unwrap();
        let proj = cam.camera_to_projection();

        let at_near = proj.transform(Vec4::new(0.0, 0.0, 1.0, 1.0));
        assert!(at_near.z.abs() < EPS);
        assert!(at_near.perspective_divide().z.abs() < EPS);

        let at_far = proj.transform(Vec4::new(0.0, 0.0, 100.0, 1.0));
        assert!((at_far.z - 100.0).abs() < 1e-2);
        assert!((at_far.perspective_divide().z - 1.0).abs() < 1e-4);

        let mut last = f32::NEG_INFINITY;
        for i in 1..=99 {
            let z = 1.0 + i as f32;
            let depth = proj.transform(Vec4::new(0.0, 0.0, z, 1.0)).perspective_divide().z;
            assert!(depth > last);
            last = depth;
        }
    }

    #[test]
    fn test_perspective_screen_mapping() {
        let cam = Camera::new(square_camera()).unwrap();

        let center = cam.world_to_screen(Vec3::new(0.0, 0.0, 10.0));
        assert!((center.x - 50.0).abs() < 1e-3);
        assert!((center.y - 50.0).abs() < 1e-3);
        assert!((center.w - 10.0).abs() < 1e-3);

        // 45 degrees up and right hits the top-right corner
        let corner = cam.world_to_screen(Vec3::new(5.0, 5.0, 5.0));
        assert!((corner.x - 100.0).abs() < 1e-3);
        assert!(corner.y.abs() < 1e-3);
    }

    #[test]
    fn test_orthographic_screen_mapping() {
        let config = CameraConfig {
            projection: Projection::Orthographic,
            screen_width: 200,
            screen_height: 100,
            ..square_camera()
        };
        let cam = Camera::new(config).unwrap();
        assert_eq!(*cam.camera_to_projection(), Mat4::IDENTITY);
        assert!(cam.frustum().is_none());

        let p = cam.world_to_screen(Vec3::new(10.0, 20.0, 5.0));
        assert!((p.x - 110.0).abs() < 1e-3);
        assert!((p.y - 30.0).abs() < 1e-3);
        assert!((p.w - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_lens_is_rejected() {
        let zero_fov = CameraConfig { fov_y: 0.0, ..square_camera() };
        assert!(matches!(Camera::new(zero_fov), Err(CameraError::InvalidFieldOfView(_))));

        let negative_fov = CameraConfig { fov_y: -30.0, ..square_camera() };
        assert!(matches!(Camera::new(negative_fov), Err(CameraError::InvalidFieldOfView(_))));

        let flat = CameraConfig { near: 5.0, far: 5.0, ..square_camera() };
        assert!(matches!(Camera::new(flat), Err(CameraError::NearEqualsFar(_))));

        let no_screen = CameraConfig { screen_height: 0, ..square_camera() };
        assert!(matches!(Camera::new(no_screen), Err(CameraError::InvalidScreen { .. })));

        // Orthographic cameras don't care about the lens
        let ortho = CameraConfig { fov_y: 0.0, near: 5.0, far: 5.0, projection: Projection::Orthographic, ..square_camera() };
        assert!(Camera::new(ortho).is_ok());
    }

    #[test]
    fn test_screen_offset_only_touches_screen_transform() {
        let mut cam = Camera::new(square_camera()).unwrap();
        let view = *cam.world_to_camera();
        let proj = *cam.camera_to_projection();
        let before = cam.world_to_screen(Vec3::new(0.0, 0.0, 10.0));

        cam.set_screen_offset(7, -3);

        assert_eq!(*cam.world_to_camera(), view);
        assert_eq!(*cam.camera_to_projection(), proj);
        let after = cam.world_to_screen(Vec3::new(0.0, 0.0, 10.0));
        assert!((after.x - before.x - 7.0).abs() < 1e-3);
        assert!((after.y - before.y + 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_failed_lens_change_keeps_camera() {
        let mut cam = Camera::new(square_camera()).unwrap();
        let proj = *cam.camera_to_projection();
        assert!(cam.set_lens(60.0, 2.0, 2.0).is_err());
        assert_eq!(*cam.camera_to_projection(), proj);
        assert_eq!(cam.config().near, 1.0);

        cam.set_lens(60.0, 2.0, 50.0).unwrap();
        assert_ne!(*cam.camera_to_projection(), proj);
        let near_plane = cam.frustum().unwrap().near;
        assert!((near_plane.distance(Vec3::new(0.0, 0.0, 2.0))).abs() < 1e-3);
    }

    #[test]
    fn test_set_view_updates_frustum() {
        let mut cam = Camera::new(square_camera()).unwrap();
        let ahead = Vec3::new(0.0, 0.0, 10.0);
        assert!(cam.frustum().unwrap().contains_point(ahead));

        // Turn around
        cam.set_view(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0), Vec3::UP);
        assert!(!cam.frustum().unwrap().contains_point(ahead));
        assert!(cam.frustum().unwrap().contains_point(Vec3::new(0.0, 0.0, -10.0)));
    }

    #[test]
    fn test_frustum_planes() {
        let cam = Camera::new(square_camera()).unwrap();
        let f = cam.frustum().unwrap();

        assert!(f.contains_point(Vec3::new(0.0, 0.0, 50.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, 0.5)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, 150.0)));
        // 90 degree fov: x = z is the edge
        assert!(f.contains_point(Vec3::new(9.0, 0.0, 10.0)));
        assert!(!f.contains_point(Vec3::new(11.0, 0.0, 10.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 11.0, 10.0)));

        assert!((f.near.distance(Vec3::new(0.0, 0.0, 3.0)) - 2.0).abs() < 1e-3);
        assert!((f.far.distance(Vec3::new(0.0, 0.0, 90.0)) - 10.0).abs() < 1e-3);

        // Sphere poking in from behind the near plane
        assert!(f.intersects_sphere(Vec3::new(0.0, 0.0, 0.5), 1.0));
        assert!(!f.intersects_sphere(Vec3::new(0.0, 0.0, -5.0), 1.0));
    }

    #[test]
    fn test_rebuild_keeps_aspect() {
        let mut cam = Camera::new(square_camera()).unwrap();
        let wide = CameraConfig { screen_width: 400, screen_height: 100, ..square_camera() };
        cam.rebuild(wide).unwrap();
        assert!((cam.aspect_ratio() - 1.0).abs() < EPS);
        assert_eq!(cam.config().screen_width, 400);
    }

    #[test]
    fn test_project_vertex_keeps_world_position() {
        let cam = Camera::new(square_camera()).unwrap();
        let v = Vertex::new(Vec3::new(1.0, 2.0, 10.0));
        let p = cam.project_vertex(&v);
        assert_eq!(p.position, v.position);
        assert!((p.transformed.w - 10.0).abs() < 1e-3);
    }
}
