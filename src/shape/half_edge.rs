//! Arena-backed half-edge representation of a closed convex polyhedron.
//!
//! Every connectivity link is a `u32` index into one of the mesh's arrays.
//! Half-edges are stored in twin pairs: edges `2k` and `2k + 1` are twins,
//! so walking `(0..half_edge_count()).step_by(2)` visits each geometric edge
//! once.

use std::collections::HashMap;

use glam::Vec3;
use tracing::{debug, trace};

use super::mesh::TriangleMesh;
use super::plane::Plane;
use crate::error::ShapeError;
use crate::tolerance::{DEGENERATE_NORMAL_EPSILON, FACE_MERGE_EPSILON};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Vertex the half-edge starts from.
    pub origin: u32,
    /// Opposite half-edge, belonging to the neighbouring face.
    pub twin: u32,
    /// Following half-edge counter-clockwise around `face`.
    pub next: u32,
    pub face: u32,
}

/// Planar convex polygon of the hull. Everything here is in body space.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Outward unit normal.
    pub normal: Vec3,
    /// Mean of the polygon vertices.
    pub center: Vec3,
    /// One half-edge on the boundary loop.
    pub edge: u32,
    /// Vertex indices in counter-clockwise order seen from outside.
    pub polygon: Vec<u32>,
    /// One plane per boundary edge, normals pointing away from the face.
    pub side_planes: Vec<Plane>,
}

impl Face {
    pub fn plane(&self) -> Plane {
        Plane {
            point: self.center,
            normal: self.normal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HalfEdgeMesh {
    vertices: Vec<Vec3>,
    edges: Vec<HalfEdge>,
    faces: Vec<Face>,
    centroid: Vec3,
    radius: f32,
    aabb_min: Vec3,
    aabb_max: Vec3,
}

/// Triangle-level half-edge produced before coplanar faces are merged.
struct RawEdge {
    origin: u32,
    dest: u32,
    triangle: usize,
    next: usize,
    twin: usize,
}

fn find_root(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

impl HalfEdgeMesh {
    /// Build the hull from outward-wound triangles.
    ///
    /// Zero-area triangles are dropped. Adjacent triangles with (nearly) equal
    /// normals are merged into one polygonal face, and vertices that end up
    /// strictly inside a merged face (cap fan centers) are removed.
    pub fn from_triangles(mesh: &TriangleMesh) -> Result<Self, ShapeError> {
        mesh.validate()?;

        // Surviving triangles with their un-normalized normals.
        let mut triangles: Vec<([u32; 3], Vec3)> = Vec::with_capacity(mesh.triangle_count());
        for tri in mesh.triangles() {
            let [a, b, c] = tri.map(|i| mesh.positions[i as usize]);
            let cross = (b - a).cross(c - a);
            if cross.length() <= DEGENERATE_NORMAL_EPSILON {
                trace!(?tri, "Discarding degenerate triangle");
                continue;
            }
            triangles.push((tri, cross));
        }
        if triangles.is_empty() {
            return Err(ShapeError::DegenerateMesh);
        }

        let raw = Self::link_raw_edges(&triangles)?;
        let face_of_triangle = Self::merge_coplanar(&triangles, &raw);
        let face_count = face_of_triangle.iter().max().map_or(0, |&f| f + 1);
        let raw_face = |e: usize| face_of_triangle[raw[e].triangle];

        // Boundary loops of each merged face, in raw-edge indices.
        let is_boundary = |e: usize| raw_face(e) != raw_face(raw[e].twin);
        let mut loops: Vec<Vec<usize>> = vec![Vec::new(); face_count];
        let mut visited = vec![false; raw.len()];

        for start in 0..raw.len() {
            if !is_boundary(start) || visited[start] {
                continue;
            }
            let face = raw_face(start);
            if !loops[face].is_empty() {
                // A second loop means a hole or a non-convex face.
                return Err(ShapeError::BrokenFaceLoop { face });
            }

            let mut current = start;
            let mut steps = 0;
            loop {
                visited[current] = true;
                loops[face].push(current);

                // Rotate around the destination vertex until the next boundary edge.
                let mut candidate = raw[current].next;
                let mut turns = 0;
                while !is_boundary(candidate) {
                    candidate = raw[raw[candidate].twin].next;
                    turns += 1;
                    if turns > raw.len() {
                        return Err(ShapeError::BrokenFaceLoop { face });
                    }
                }

                current = candidate;
                steps += 1;
                if current == start {
                    break;
                }
                if steps > raw.len() || visited[current] {
                    return Err(ShapeError::BrokenFaceLoop { face });
                }
            }
        }

        if let Some(face) = loops.iter().position(|l| l.len() < 3) {
            return Err(ShapeError::BrokenFaceLoop { face });
        }

        // Keep only vertices on some face boundary, preserving their order.
        let mut vertex_map = vec![u32::MAX; mesh.positions.len()];
        for l in &loops {
            for &e in l {
                vertex_map[raw[e].origin as usize] = 0;
            }
        }
        let mut vertices = Vec::new();
        for (old, slot) in vertex_map.iter_mut().enumerate() {
            if *slot != u32::MAX {
                *slot = vertices.len() as u32;
                vertices.push(mesh.positions[old]);
            }
        }

        // Place every boundary half-edge right before or after its twin.
        let mut edge_map = vec![u32::MAX; raw.len()];
        let mut edge_count = 0u32;
        for e in 0..raw.len() {
            if visited[e] && edge_map[e] == u32::MAX {
                edge_map[e] = edge_count;
                edge_map[raw[e].twin] = edge_count + 1;
                edge_count += 2;
            }
        }

        let mut edges = vec![
            HalfEdge {
                origin: 0,
                twin: 0,
                next: 0,
                face: 0,
            };
            edge_count as usize
        ];
        for (face, l) in loops.iter().enumerate() {
            for (i, &e) in l.iter().enumerate() {
                let next = l[(i + 1) % l.len()];
                edges[edge_map[e] as usize] = HalfEdge {
                    origin: vertex_map[raw[e].origin as usize],
                    twin: edge_map[raw[e].twin],
                    next: edge_map[next],
                    face: face as u32,
                };
            }
        }

        // Area-weighted face normals.
        let mut normal_sums = vec![Vec3::ZERO; face_count];
        for (t, (_, cross)) in triangles.iter().enumerate() {
            normal_sums[face_of_triangle[t]] += *cross;
        }

        let faces = loops
            .iter()
            .zip(&normal_sums)
            .map(|(l, sum)| {
                let normal = sum.normalize();
                let polygon: Vec<u32> =
                    l.iter().map(|&e| vertex_map[raw[e].origin as usize]).collect();
                let center = polygon
                    .iter()
                    .map(|&v| vertices[v as usize])
                    .sum::<Vec3>()
                    / polygon.len() as f32;

                let side_planes = l
                    .iter()
                    .map(|&e| {
                        let a = mesh.positions[raw[e].origin as usize];
                        let b = mesh.positions[raw[e].dest as usize];
                        let mid = (a + b) * 0.5;
                        let mut side = (b - a).cross(normal).normalize();
                        if side.dot(mid - center) < 0.0 {
                            side = -side;
                        }
                        Plane {
                            point: mid,
                            normal: side,
                        }
                    })
                    .collect();

                Face {
                    normal,
                    center,
                    edge: edge_map[l[0]],
                    polygon,
                    side_planes,
                }
            })
            .collect::<Vec<_>>();

        let centroid = vertices.iter().sum::<Vec3>() / vertices.len() as f32;
        let radius = vertices
            .iter()
            .map(|v| v.distance(centroid))
            .fold(0.0f32, f32::max);
        let (aabb_min, aabb_max) = vertices.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(lo, hi), &v| (lo.min(v), hi.max(v)),
        );

        debug!(
            vertices = vertices.len(),
            half_edges = edges.len(),
            faces = faces.len(),
            "Built half-edge mesh"
        );

        Ok(Self {
            vertices,
            edges,
            faces,
            centroid,
            radius,
            aabb_min,
            aabb_max,
        })
    }

    fn link_raw_edges(triangles: &[([u32; 3], Vec3)]) -> Result<Vec<RawEdge>, ShapeError> {
        let mut raw = Vec::with_capacity(triangles.len() * 3);
        let mut lookup: HashMap<(u32, u32), usize> = HashMap::with_capacity(triangles.len() * 3);

        for (t, (tri, _)) in triangles.iter().enumerate() {
            let base = raw.len();
            for k in 0..3 {
                let (origin, dest) = (tri[k], tri[(k + 1) % 3]);
                if lookup.insert((origin, dest), base + k).is_some() {
                    return Err(ShapeError::DuplicateEdge { origin, dest });
                }
                raw.push(RawEdge {
                    origin,
                    dest,
                    triangle: t,
                    next: base + (k + 1) % 3,
                    twin: usize::MAX,
                });
            }
        }

        for e in &mut raw {
            e.twin = *lookup
                .get(&(e.dest, e.origin))
                .ok_or(ShapeError::UnmatchedEdge {
                    origin: e.origin,
                    dest: e.dest,
                })?;
        }
        Ok(raw)
    }

    /// Union adjacent coplanar triangles. Returns a dense face id per triangle.
    fn merge_coplanar(triangles: &[([u32; 3], Vec3)], raw: &[RawEdge]) -> Vec<usize> {
        let normals: Vec<Vec3> = triangles.iter().map(|(_, c)| c.normalize()).collect();
        let mut parent: Vec<usize> = (0..triangles.len()).collect();

        for e in raw {
            let (t1, t2) = (e.triangle, raw[e.twin].triangle);
            if normals[t1].dot(normals[t2]) > 1.0 - FACE_MERGE_EPSILON {
                let (r1, r2) = (find_root(&mut parent, t1), find_root(&mut parent, t2));
                if r1 != r2 {
                    parent[r2.max(r1)] = r1.min(r2);
                }
            }
        }

        let mut dense = vec![usize::MAX; triangles.len()];
        let mut next_id = 0;
        (0..triangles.len())
            .map(|t| {
                let root = find_root(&mut parent, t);
                if dense[root] == usize::MAX {
                    dense[root] = next_id;
                    next_id += 1;
                }
                dense[root]
            })
            .collect()
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn edges(&self) -> &[HalfEdge] {
        &self.edges
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex(&self, index: u32) -> Vec3 {
        self.vertices[index as usize]
    }

    pub fn edge(&self, index: u32) -> &HalfEdge {
        &self.edges[index as usize]
    }

    pub fn face(&self, index: u32) -> &Face {
        &self.faces[index as usize]
    }

    pub fn half_edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of geometric edges (twin pairs).
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Start and end vertex indices of a half-edge.
    pub fn edge_vertices(&self, index: u32) -> (u32, u32) {
        let edge = self.edge(index);
        (edge.origin, self.edge(edge.twin).origin)
    }

    /// Half-edges around a face, starting at its stored edge.
    pub fn face_edges(&self, face: u32) -> impl Iterator<Item = u32> + '_ {
        let start = self.face(face).edge;
        let len = self.face(face).polygon.len();
        std::iter::successors(Some(start), move |&e| Some(self.edge(e).next)).take(len)
    }

    /// Mean of the hull vertices.
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    /// Radius of the sphere around [`centroid`](Self::centroid) enclosing every vertex.
    pub fn bounding_radius(&self) -> f32 {
        self.radius
    }

    pub fn aabb(&self) -> (Vec3, Vec3) {
        (self.aabb_min, self.aabb_max)
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.aabb_max - self.aabb_min) * 0.5
    }

    pub fn aabb_center(&self) -> Vec3 {
        (self.aabb_max + self.aabb_min) * 0.5
    }
}
