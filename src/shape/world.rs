//! World-space view of a hull, computed once per query.

use glam::Vec3;

use super::half_edge::HalfEdgeMesh;
use super::plane::Plane;
use crate::transform::Transform;

/// A [`HalfEdgeMesh`] posed in world space.
///
/// Vertex positions and face normals are transformed once up front; the
/// queries then read them many times.
#[derive(Debug, Clone)]
pub struct WorldHull<'a> {
    pub mesh: &'a HalfEdgeMesh,
    pub transform: Transform,
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
}

impl<'a> WorldHull<'a> {
    pub fn new(mesh: &'a HalfEdgeMesh, transform: &Transform) -> Self {
        Self {
            mesh,
            transform: *transform,
            vertices: mesh
                .vertices()
                .iter()
                .map(|&v| transform.transform_point(v))
                .collect(),
            normals: mesh
                .faces()
                .iter()
                .map(|f| transform.transform_vector(f.normal))
                .collect(),
        }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    #[inline]
    pub fn vertex(&self, index: u32) -> Vec3 {
        self.vertices[index as usize]
    }

    #[inline]
    pub fn face_normal(&self, face: u32) -> Vec3 {
        self.normals[face as usize]
    }

    pub fn face_center(&self, face: u32) -> Vec3 {
        self.transform.transform_point(self.mesh.face(face).center)
    }

    pub fn face_plane(&self, face: u32) -> Plane {
        Plane {
            point: self.face_center(face),
            normal: self.face_normal(face),
        }
    }

    /// World positions of a face's polygon, counter-clockwise.
    pub fn face_points(&self, face: u32) -> Vec<Vec3> {
        self.mesh
            .face(face)
            .polygon
            .iter()
            .map(|&v| self.vertex(v))
            .collect()
    }

    pub fn side_planes(&self, face: u32) -> Vec<Plane> {
        self.mesh
            .face(face)
            .side_planes
            .iter()
            .map(|p| p.transformed(&self.transform))
            .collect()
    }

    /// World endpoints of a half-edge.
    pub fn edge_points(&self, edge: u32) -> (Vec3, Vec3) {
        let (a, b) = self.mesh.edge_vertices(edge);
        (self.vertex(a), self.vertex(b))
    }

    pub fn centroid(&self) -> Vec3 {
        self.transform.transform_point(self.mesh.centroid())
    }

    /// Vertex furthest along `direction`. The first one wins ties.
    pub fn support(&self, direction: Vec3) -> Vec3 {
        let mut best = self.vertices[0];
        let mut best_dot = best.dot(direction);
        for &v in &self.vertices[1..] {
            let d = v.dot(direction);
            if d > best_dot {
                best = v;
                best_dot = d;
            }
        }
        best
    }
}
