//! Convex polyhedra: triangle input, the half-edge hull built from it, and its world-space pose.

mod half_edge;
mod mesh;
mod plane;
mod world;

pub use half_edge::{Face, HalfEdge, HalfEdgeMesh};
pub use mesh::TriangleMesh;
pub use plane::{Plane, PlaneSide};
pub use world::WorldHull;
