//! Collider shapes and their bounding volumes.

use std::sync::Arc;

use glam::Vec3;

use crate::error::ShapeError;
use crate::shape::{HalfEdgeMesh, Plane, TriangleMesh};
use crate::transform::Transform;

/// Geometry of a collider, in the body's local frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    /// Closed convex polyhedron. Shared so identical bodies reuse one hull.
    Polygon(Arc<HalfEdgeMesh>),
    /// Plane through the body origin; everything behind `normal` is solid.
    HalfPlane { normal: Vec3 },
}

/// Tag of a [`ColliderShape`] used to pick the narrowphase routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Sphere,
    Polygon,
    HalfPlane,
}

impl ColliderShape {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Build a convex polyhedron from triangle buffers.
    pub fn polygon(mesh: &TriangleMesh) -> Result<Self, ShapeError> {
        Ok(Self::Polygon(Arc::new(HalfEdgeMesh::from_triangles(mesh)?)))
    }

    /// Sphere enclosing every vertex of `mesh`, centered on the local origin.
    pub fn sphere_from_mesh(mesh: &TriangleMesh) -> Result<Self, ShapeError> {
        if mesh.positions.is_empty() {
            return Err(ShapeError::EmptyMesh);
        }
        let radius = mesh
            .positions
            .iter()
            .map(|p| p.length())
            .fold(0.0f32, f32::max);
        Ok(Self::Sphere { radius })
    }

    /// Half-space below a plane with the given local normal.
    pub fn half_plane(normal: Vec3) -> Self {
        Self::HalfPlane {
            normal: normal.try_normalize().unwrap_or(Vec3::Y),
        }
    }

    /// Half-space below a `+Y` plane.
    pub fn ground() -> Self {
        Self::half_plane(Vec3::Y)
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::Polygon(_) => ShapeKind::Polygon,
            Self::HalfPlane { .. } => ShapeKind::HalfPlane,
        }
    }

    /// World-space bounding sphere as `(center, radius)`. Half-planes are unbounded.
    pub fn bounding_sphere(&self, transform: &Transform) -> Option<(Vec3, f32)> {
        match self {
            Self::Sphere { radius } => Some((transform.position, *radius)),
            Self::Polygon(mesh) => Some((
                transform.transform_point(mesh.centroid()),
                mesh.bounding_radius(),
            )),
            Self::HalfPlane { .. } => None,
        }
    }

    /// World-space boundary plane of a half-plane collider.
    pub fn world_plane(&self, transform: &Transform) -> Option<Plane> {
        match self {
            Self::HalfPlane { normal } => Some(Plane {
                point: transform.position,
                normal: transform.transform_vector(*normal),
            }),
            _ => None,
        }
    }
}

/// Bounding spheres touch or overlap. Unbounded shapes always pass.
pub fn bounding_spheres_overlap(
    a: &ColliderShape,
    transform_a: &Transform,
    b: &ColliderShape,
    transform_b: &Transform,
) -> bool {
    match (a.bounding_sphere(transform_a), b.bounding_sphere(transform_b)) {
        (Some((ca, ra)), Some((cb, rb))) => ca.distance_squared(cb) <= (ra + rb) * (ra + rb),
        _ => true,
    }
}

/// Shape attached to a body.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub shape: ColliderShape,
    /// Sensors report contacts but are never pushed apart.
    pub is_sensor: bool,
}

impl Collider {
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            is_sensor: false,
        }
    }

    pub fn sensor(shape: ColliderShape) -> Self {
        Self {
            shape,
            is_sensor: true,
        }
    }
}
