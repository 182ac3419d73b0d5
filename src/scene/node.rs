//! Scene node transforms
//!
//! Leaves and roots are placed relative to the tree group, which is itself
//! rotated about +Y by the auto-rotate animation.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Local transform relative to the tree group.
///
/// Rotation is stored as XYZ Euler angles so per-axis animation and jitter can
/// be applied directly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl LocalTransform {
    /// Rotation as a quaternion.
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Convert to a 4x4 matrix.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }
}

/// World matrix of the tree group for a given yaw.
pub fn tree_matrix(yaw: f32) -> Mat4 {
    Mat4::from_rotation_y(yaw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let t = LocalTransform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.to_mat4(), Mat4::IDENTITY);
    }

    #[test]
    fn test_non_uniform_scale() {
        let t = LocalTransform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::ZERO,
            scale: Vec3::new(1.5, 1.0, 1.0),
        };
        let (scale, _, translation) = t.to_mat4().to_scale_rotation_translation();
        assert!((scale - Vec3::new(1.5, 1.0, 1.0)).length() < 1e-5);
        assert!((translation - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_yaw_rotation() {
        let t = LocalTransform {
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            ..Default::default()
        };
        let x = t.to_mat4().transform_vector3(Vec3::X);
        assert!((x - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        let x = tree_matrix(std::f32::consts::FRAC_PI_2).transform_vector3(Vec3::X);
        assert!((x - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }
}
