//! Collide3d
//!
//! Narrowphase collision detection and impulse resolution for convex rigid bodies.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **transform** - Rigid body pose (position + rotation)
//! 2. **shape** - Triangle input, half-edge convex hulls, planes
//! 3. **physics** - Colliders, SAT and clipping, contact solver, simulation world
//!
//! Numeric tolerances live in [`tolerance`]; construction and configuration
//! failures are reported through [`error`].

pub mod error;
pub mod physics;
pub mod shape;
pub mod tolerance;
pub mod transform;

// Re-export commonly used types
pub use error::{ConfigError, ShapeError};

pub use physics::body::{Body, BodyHandle};
pub use physics::collider::{Collider, ColliderShape, ShapeKind};
pub use physics::contact::{ContactManifold, ContactPoint};
pub use physics::narrowphase::detect_collision;
pub use physics::rigid_body::RigidBody;
pub use physics::{PhysicsConfig, PhysicsWorld, StepReport};

pub use shape::{HalfEdgeMesh, Plane, TriangleMesh, WorldHull};

pub use transform::Transform;

pub use glam;
