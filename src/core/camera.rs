//! Perspective camera and pointer ray generation

use crate::core::config::CameraConfig;
use crate::core::types::{Vec2, Vec3, Mat4, Quat};
use crate::math::Ray;

/// Smallest aspect ratio accepted on resize.
pub const MIN_ASPECT: f32 = 0.1;

/// Camera with position, rotation, and projection parameters
#[derive(Clone, Debug)]
pub struct Camera {
    /// World position
    pub position: Vec3,
    /// Rotation as quaternion
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl Camera {
    /// Create a new camera looking down -Z
    pub fn new(position: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Build a camera from config, aimed at the configured target
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(config.position, config.fov_y_degrees, aspect.max(MIN_ASPECT));
        camera.near = config.near;
        camera.far = config.far;
        camera.look_at(config.target);
        camera
    }

    /// Rotate the camera in place so it faces `target` with +Y up
    pub fn look_at(&mut self, target: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward == Vec3::ZERO {
            return;
        }
        let mut right = forward.cross(Vec3::Y);
        if right.length_squared() < 1e-8 {
            // Looking straight up or down
            right = Vec3::X;
        }
        let right = right.normalize();
        let up = right.cross(forward);
        self.rotation = Quat::from_mat3(&glam::Mat3::from_cols(right, up, -forward));
    }

    /// Get view matrix (world to camera space)
    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-self.position);
        rotation_matrix * translation_matrix
    }

    /// Get projection matrix (camera to clip space)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get inverse view-projection matrix (for ray generation)
    pub fn view_projection_inverse(&self) -> Mat4 {
        self.view_projection().inverse()
    }

    /// Get forward direction (negative Z in camera space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get right direction (positive X in camera space)
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get up direction (positive Y in camera space)
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// World-space ray through a pointer position in normalized device
    /// coordinates (x right, y up, both in [-1, 1]).
    pub fn screen_ray(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection_inverse();
        // perspective_rh maps depth to [0, 1]
        let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(self.position, (far - near).normalize())
    }

    /// Project a world point to normalized device coordinates
    pub fn project(&self, point: Vec3) -> Vec2 {
        let clip = self.view_projection().project_point3(point);
        Vec2::new(clip.x, clip.y)
    }

    /// Update aspect ratio (call on viewport resize)
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = (width / height.max(1.0)).max(MIN_ASPECT);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), 60.0, 16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions() {
        let camera = Camera::default();

        // Default camera looks down -Z
        let forward = camera.forward();
        assert!((forward.z - (-1.0)).abs() < 0.001);

        let right = camera.right();
        assert!((right.x - 1.0).abs() < 0.001);

        let up = camera.up();
        assert!((up.y - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_view_matrix_translation() {
        let mut camera = Camera::default();
        camera.position = Vec3::new(10.0, 0.0, 0.0);

        let view = camera.view_matrix();
        let origin_in_camera = view.transform_point3(Vec3::ZERO);
        assert!((origin_in_camera.x - (-10.0)).abs() < 0.001);
    }

    #[test]
    fn test_look_at_faces_target() {
        let camera = Camera::from_config(&CameraConfig::default(), 1.5);
        let expected = (Vec3::new(0.0, 8.0, 0.0) - Vec3::new(0.0, 8.0, 15.0)).normalize();
        assert!((camera.forward() - expected).length() < 1e-4);
        assert!((camera.up() - Vec3::Y).length() < 1e-4);
    }

    #[test]
    fn test_center_ray_follows_forward() {
        let camera = Camera::from_config(&CameraConfig::default(), 1.0);
        let ray = camera.screen_ray(Vec2::ZERO);
        assert_eq!(ray.origin, camera.position);
        assert!((ray.direction - camera.forward()).length() < 1e-4);
    }

    #[test]
    fn test_project_then_ray_hits_point() {
        let camera = Camera::from_config(&CameraConfig::default(), 4.0 / 3.0);
        let point = Vec3::new(2.0, 9.5, -1.0);
        let ndc = camera.project(point);
        let ray = camera.screen_ray(ndc);
        let t = (point - ray.origin).dot(ray.direction);
        assert!((ray.at(t) - point).length() < 1e-3);
    }

    #[test]
    fn test_aspect_is_clamped() {
        let mut camera = Camera::default();
        camera.set_aspect(10.0, 1000.0);
        assert_eq!(camera.aspect, MIN_ASPECT);
        camera.set_aspect(800.0, 0.0);
        assert_eq!(camera.aspect, 800.0);
    }
}
