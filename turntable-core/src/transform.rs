/// Object transforms and XYZ Euler rotation state
use nalgebra::{Matrix4, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Rotation around three axes (in radians), applied X then Y then Z
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Build from angles in degrees
    pub fn from_degrees(x: f32, y: f32, z: f32) -> Self {
        Self::new(x.to_radians(), y.to_radians(), z.to_radians())
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Per-component linear blend between two rotation states
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Euler decomposition of a quaternion using the same X-Y-Z order
    pub fn from_quaternion(rotation: &UnitQuaternion<f32>) -> Self {
        let (x, y, z) = rotation.euler_angles();
        Self { x, y, z }
    }

    pub fn to_quaternion(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_euler_angles(self.x, self.y, self.z)
    }

    pub fn as_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Apply rotations in order: X, Y, Z
        rz * ry * rx
    }

    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    pub fn scale_matrix(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(scale)
    }

    /// Rotate a direction by a rotation state
    pub fn rotate_vector(rotation: &RotationState, v: &Vector3<f32>) -> Vector3<f32> {
        Rotation3::from_euler_angles(rotation.x, rotation.y, rotation.z) * v
    }
}

/// Location, rotation and scale of a scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    pub location: Vector3<f32>,
    pub rotation: RotationState,
    pub scale: Vector3<f32>,
}

impl ObjectTransform {
    pub fn identity() -> Self {
        Self {
            location: Vector3::zeros(),
            rotation: RotationState::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Model matrix: scale, then rotate, then translate
    pub fn matrix(&self) -> Matrix4<f32> {
        Transform::translation_matrix(&self.location)
            * Transform::rotation_matrix(&self.rotation)
            * Transform::scale_matrix(&self.scale)
    }
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert!(state.is_zero());

        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
        assert!((state.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = RotationState::zero();
        let matrix = Transform::rotation_matrix(&rotation);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_matrix_matches_quaternion() {
        let rotation = RotationState::new(0.3, -0.7, 1.1);
        let from_matrix = Transform::rotation_matrix(&rotation);
        let from_quat = rotation.to_quaternion().to_homogeneous();
        assert!((from_matrix - from_quat).norm() < 1e-5);

        let back = RotationState::from_quaternion(&rotation.to_quaternion());
        assert!((back.x - 0.3).abs() < 1e-5);
        assert!((back.y + 0.7).abs() < 1e-5);
        assert!((back.z - 1.1).abs() < 1e-5);
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = RotationState::zero();
        let b = RotationState::new(0.0, 0.0, 2.0);
        assert_eq!(a.lerp(&b, 0.5), RotationState::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_object_transform_order() {
        let transform = ObjectTransform {
            location: Vector3::new(10.0, 0.0, 0.0),
            rotation: RotationState::new(0.0, 0.0, FRAC_PI_2),
            scale: Vector3::new(2.0, 2.0, 2.0),
        };
        let p = transform.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        // scaled to x=2, rotated onto +y, then moved
        assert!((p - Point3::new(10.0, 2.0, 0.0)).norm() < 1e-5);
        assert!(!transform.is_identity());
        assert!(ObjectTransform::identity().is_identity());
    }
}
