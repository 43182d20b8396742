//! Error types.
//!
//! Only structural failures are errors: a mesh that cannot form a closed convex
//! half-edge structure, or a configuration outside its valid range. Degenerate
//! geometry met during a query is handled locally with sentinel values.

use thiserror::Error;

/// Failure to build a half-edge shape from triangle buffers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("mesh has no vertices or no indices")]
    EmptyMesh,

    #[error("index buffer length {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),

    #[error("vertex index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("every triangle of the mesh has a zero-length normal")]
    DegenerateMesh,

    #[error("directed edge {origin}->{dest} is used by more than one triangle")]
    DuplicateEdge { origin: u32, dest: u32 },

    #[error("half-edge {origin}->{dest} has no twin, the mesh is not closed")]
    UnmatchedEdge { origin: u32, dest: u32 },

    #[error("boundary of face {face} does not close into a loop")]
    BrokenFaceLoop { face: usize },
}

/// Invalid value in [`PhysicsConfig`](crate::physics::PhysicsConfig).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("drag must be in (0, 1], got {0}")]
    Drag(f32),

    #[error("restitution must be in [0, 1], got {0}")]
    Restitution(f32),

    #[error("infinite mass epsilon must be finite and non-negative, got {0}")]
    InfiniteMassEpsilon(f32),

    #[error("fixed timestep must be positive and finite, got {0}")]
    Timestep(f64),

    #[error("gravity must be finite, got {0}")]
    Gravity(glam::Vec3),
}
