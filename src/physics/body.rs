use crate::transform::Transform;

use super::collider::Collider;
use super::rigid_body::RigidBody;

/// Stable index of a body inside a [`PhysicsWorld`](super::PhysicsWorld).
///
/// Handles are never reused, so a handle to a removed body stays dangling
/// instead of silently pointing at a newer body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

impl BodyHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Everything the simulation knows about one body.
#[derive(Debug, Clone)]
pub struct Body {
    pub transform: Transform,
    pub rigid_body: RigidBody,
    pub collider: Collider,
    /// Set when the body touched anything during the last fixed step.
    pub colliding: bool,
}

impl Body {
    pub fn new(transform: Transform, rigid_body: RigidBody, collider: Collider) -> Self {
        Self {
            transform,
            rigid_body,
            collider,
            colliding: false,
        }
    }
}
