use glam::Vec3;

use crate::tolerance::{PARALLEL_EPSILON, PLANE_THICKNESS};
use crate::transform::Transform;

/// Infinite plane through `point` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

/// Where a point lies relative to a thick plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Farther than the thickness along the normal.
    Front,
    /// Farther than the thickness against the normal.
    Behind,
    /// Within the thickness.
    On,
}

impl Plane {
    /// The normal is normalized, falling back to +Y when it has no length.
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.try_normalize().unwrap_or(Vec3::Y),
        }
    }

    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p - self.point)
    }

    /// Orthogonal projection of `p` onto the plane.
    #[inline]
    pub fn project(&self, p: Vec3) -> Vec3 {
        p - self.normal * self.signed_distance(p)
    }

    pub fn classify(&self, p: Vec3) -> PlaneSide {
        let d = self.signed_distance(p);
        if d > PLANE_THICKNESS {
            PlaneSide::Front
        } else if d < -PLANE_THICKNESS {
            PlaneSide::Behind
        } else {
            PlaneSide::On
        }
    }

    /// Intersection of the line through `a` and `b` with the plane.
    ///
    /// Returns `None` when the segment runs parallel to the plane.
    pub fn intersect_segment(&self, a: Vec3, b: Vec3) -> Option<Vec3> {
        let ab = b - a;
        let denom = self.normal.dot(ab);
        if denom.abs() < PARALLEL_EPSILON * ab.length() || denom == 0.0 {
            return None;
        }
        let t = self.normal.dot(self.point - a) / denom;
        Some(a + ab * t)
    }

    /// Plane carried from body space into world space.
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            point: transform.transform_point(self.point),
            normal: transform.transform_vector(self.normal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_new_normalizes() {
        let plane = Plane::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(plane.normal, Vec3::Z);
        let plane = Plane::new(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(plane.normal, Vec3::Y);
    }

    #[test]
    fn test_signed_distance_and_project() {
        let plane = Plane::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert_eq!(plane.signed_distance(Vec3::new(4.0, 3.0, 0.0)), 2.0);
        assert_eq!(plane.signed_distance(Vec3::new(4.0, -1.0, 0.0)), -2.0);
        assert_eq!(
            plane.project(Vec3::new(4.0, 3.0, -2.0)),
            Vec3::new(4.0, 1.0, -2.0)
        );
    }

    #[test]
    fn test_classify_uses_thickness() {
        let plane = Plane::new(Vec3::ZERO, Vec3::X);
        assert_eq!(plane.classify(Vec3::new(1.0, 0.0, 0.0)), PlaneSide::Front);
        assert_eq!(plane.classify(Vec3::new(-1.0, 0.0, 0.0)), PlaneSide::Behind);
        assert_eq!(
            plane.classify(Vec3::new(PLANE_THICKNESS * 0.5, 0.0, 0.0)),
            PlaneSide::On
        );
    }

    #[test]
    fn test_intersect_segment() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Y);
        let hit = plane
            .intersect_segment(Vec3::new(1.0, -1.0, 0.0), Vec3::new(1.0, 3.0, 0.0))
            .unwrap();
        assert!((hit - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);

        assert!(plane
            .intersect_segment(Vec3::new(0.0, 1.0, 0.0), Vec3::new(5.0, 1.0, 0.0))
            .is_none());
        assert!(plane.intersect_segment(Vec3::ONE, Vec3::ONE).is_none());
    }

    #[test]
    fn test_transformed() {
        let plane = Plane::new(Vec3::new(1.0, 0.0, 0.0), Vec3::X);
        let t = Transform::from_position_rotation(
            Vec3::new(0.0, 2.0, 0.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
        );
        let world = plane.transformed(&t);
        let eps = 1e-5;
        assert!((world.normal - Vec3::Y).length() < eps);
        assert!((world.point - Vec3::new(0.0, 3.0, 0.0)).length() < eps);
    }
}
