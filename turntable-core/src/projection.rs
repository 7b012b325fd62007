/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

/// Full-frame sensor width used to convert a focal length to a field of view
pub const DEFAULT_SENSOR_WIDTH: f32 = 36.0;

/// World up axis. Scenes are Z-up.
pub fn world_up() -> Vector3<f32> {
    Vector3::z()
}

/// Orientation whose local -Z axis points from `eye` at `target`, with local
/// +Y kept as close to world up as possible.
///
/// When the view direction is parallel to world up, world +Y is used as the
/// up hint instead.
pub fn look_at_rotation(eye: &Point3<f32>, target: &Point3<f32>) -> UnitQuaternion<f32> {
    let forward = target - eye;
    if forward.norm_squared() <= f32::EPSILON {
        return UnitQuaternion::identity();
    }

    let up = if forward.cross(&world_up()).norm_squared() <= f32::EPSILON {
        Vector3::y()
    } else {
        world_up()
    };

    // face_towards maps local +Z onto the given direction
    UnitQuaternion::face_towards(&-forward, &up)
}

/// Horizontal field of view (radians) for a focal length in millimetres
pub fn fov_from_lens(lens: f32, sensor_width: f32) -> f32 {
    2.0 * (sensor_width / (2.0 * lens)).atan()
}

/// Camera configuration for rasterizing a scene
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, -5.0, 0.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: world_up(),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Camera at `position` looking at `target`
    pub fn looking_at(position: Point3<f32>, target: Point3<f32>, width: u32, height: u32) -> Self {
        Self {
            position,
            target,
            ..Self::new(width, height)
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the perspective projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Project a 3D point to 2D screen space, returning `(x, y, depth)`
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let view = self.view_matrix();
        let projection = self.projection_matrix();
        let mvp = projection * view * model_matrix;

        // Reject points behind the camera before the perspective divide
        let clip = mvp * point.to_homogeneous();
        if clip.w <= 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        // Clip test
        if !(-1.0..=1.0).contains(&ndc_x) || !(-1.0..=1.0).contains(&ndc_y) {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }
}
