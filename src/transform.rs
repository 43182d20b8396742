//! Rigid transform of a body: translation and rotation, no scale.

use glam::{Mat4, Quat, Vec3};

/// Body-to-world rigid transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    /// Create an identity transform.
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    /// Create a transform from a position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Create a transform from a position and a rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation: rotation.normalize(),
        }
    }

    /// Map a body-space point to world space.
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.position
    }

    /// Map a body-space direction to world space.
    #[inline]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    /// Map a world-space point into body space.
    #[inline]
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }

    /// Map a world-space direction into body space.
    #[inline]
    pub fn inverse_transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation.inverse() * vector
    }

    /// Convert to a 4x4 matrix (translation * rotation), for renderers.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_from_position() {
        let pos = Vec3::new(1.0, 2.0, 3.0);
        let t = Transform::from_position(pos);
        assert_eq!(t.position, pos);
        assert_eq!(t.transform_point(Vec3::ZERO), pos);
        assert_eq!(t.transform_vector(Vec3::X), Vec3::X);
    }

    #[test]
    fn test_point_roundtrip() {
        let t = Transform::from_position_rotation(
            Vec3::new(1.0, -2.0, 0.5),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_3),
        );
        let p = Vec3::new(0.3, 4.0, -1.2);

        let eps = 1e-5;
        let back = t.inverse_transform_point(t.transform_point(p));
        assert!((back - p).length() < eps);

        let v = Vec3::new(0.0, 1.0, 1.0);
        let back = t.inverse_transform_vector(t.transform_vector(v));
        assert!((back - v).length() < eps);
    }

    #[test]
    fn test_matrix_agrees_with_transform_point() {
        let t = Transform::from_position_rotation(
            Vec3::new(5.0, 0.0, -1.0),
            Quat::from_rotation_x(0.4),
        );
        let p = Vec3::new(1.0, 2.0, 3.0);
        let eps = 1e-5;
        assert!((t.to_matrix().transform_point3(p) - t.transform_point(p)).length() < eps);
    }

    #[test]
    fn test_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
    }
}
