//! Contact data handed from the narrowphase to the solver.

use glam::Vec3;

use super::body::BodyHandle;

/// A single contact between two shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// Contact position in world space.
    pub point: Vec3,
    /// Unit contact normal, from shape A to shape B.
    pub normal: Vec3,
    /// Overlap depth along `normal`. Positive while the shapes interpenetrate.
    pub penetration: f32,
}

impl ContactPoint {
    pub fn new(point: Vec3, normal: Vec3, penetration: f32) -> Self {
        Self {
            point,
            normal,
            penetration,
        }
    }

    /// Same contact seen from the other body.
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// Contacts detected between two bodies in one step.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactManifold {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub points: Vec<ContactPoint>,
}

impl ContactManifold {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest penetration among the points, zero for an empty manifold.
    pub fn max_penetration(&self) -> f32 {
        self.points
            .iter()
            .map(|c| c.penetration)
            .fold(0.0, f32::max)
    }
}
