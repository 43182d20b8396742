//! Linear rigid-body state and its integration.

use glam::Vec3;

use crate::transform::Transform;

/// Motion state of a body. Orientation is not integrated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    pub velocity: Vec3,
    /// Acceleration applied during the last integration.
    pub acceleration: Vec3,
    pub force_accumulator: Vec3,
    /// Zero (or anything below the infinite-mass epsilon) makes the body static.
    pub inverse_mass: f32,
    /// Tracked for callers; the resolver does not touch it.
    pub angular_velocity: Vec3,
}

impl RigidBody {
    /// Create a dynamic body with the given mass. A non-positive mass yields a static body.
    pub fn new_dynamic(mass: f32) -> Self {
        Self {
            inverse_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            ..Self::new_static()
        }
    }

    /// Create an immovable body.
    pub fn new_static() -> Self {
        Self {
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            force_accumulator: Vec3::ZERO,
            inverse_mass: 0.0,
            angular_velocity: Vec3::ZERO,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn mass(&self) -> f32 {
        if self.inverse_mass > 0.0 {
            1.0 / self.inverse_mass
        } else {
            f32::INFINITY
        }
    }

    #[inline]
    pub fn is_static(&self, infinite_mass_epsilon: f32) -> bool {
        self.inverse_mass <= infinite_mass_epsilon
    }

    /// Accumulate a force for the next integration.
    pub fn add_force(&mut self, force: Vec3) {
        self.force_accumulator += force;
    }

    /// Semi-implicit step: position moves with the old velocity, then the
    /// velocity picks up gravity and forces and is damped by `frame_drag`.
    pub fn integrate(
        &mut self,
        transform: &mut Transform,
        gravity: Vec3,
        frame_drag: f32,
        dt: f32,
        infinite_mass_epsilon: f32,
    ) {
        if self.is_static(infinite_mass_epsilon) {
            return;
        }

        transform.position += self.velocity * dt;
        self.acceleration = gravity + self.force_accumulator * self.inverse_mass;
        self.velocity = (self.velocity + self.acceleration * dt) * frame_drag;
        self.force_accumulator = Vec3::ZERO;
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new_dynamic(1.0)
    }
}

/// Drag factor for one step: `drag^dt`.
pub fn frame_drag(drag: f32, dt: f32) -> f32 {
    drag.powf(dt)
}
