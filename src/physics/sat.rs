//! Separating axis queries between two convex hulls.
//!
//! Face axes are tested for both hulls, then edge-edge axes. Edge pairs are
//! pruned with the Gauss-map test: two edges only produce a candidate axis
//! when their arcs on the unit sphere intersect, i.e. when they build a face
//! of the Minkowski difference.

use glam::Vec3;
use tracing::trace;

use crate::shape::WorldHull;
use crate::tolerance::{AXIS_TIE_TOLERANCE, PARALLEL_EDGE_EPSILON};

/// Deepest separation found along one hull's face normals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceQuery {
    pub face: u32,
    /// Signed distance of the other hull's support point to the face plane.
    pub separation: f32,
}

/// Best edge-edge axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeQuery {
    /// Half-edge on A and half-edge on B, if any pair passed the Gauss-map test.
    pub edges: Option<(u32, u32)>,
    pub separation: f32,
    /// Axis oriented away from A.
    pub normal: Vec3,
    /// Number of edge pairs that passed the Gauss-map test.
    pub minkowski_faces: usize,
}

/// Feature pair defining the axis of minimum penetration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeparatingFeature {
    /// A face of A is the reference face.
    FaceA(u32),
    /// A face of B is the reference face.
    FaceB(u32),
    Edges { edge_a: u32, edge_b: u32, normal: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatResult {
    pub feature: SeparatingFeature,
    /// Non-positive separation along the chosen axis.
    pub separation: f32,
}

/// Test every face normal of `a` against the support point of `b`.
///
/// Returns as soon as a separating face is found. The first maximum wins ties.
pub fn query_face_directions(a: &WorldHull, b: &WorldHull) -> FaceQuery {
    let mut best = FaceQuery {
        face: 0,
        separation: f32::NEG_INFINITY,
    };

    for face in 0..a.mesh.face_count() as u32 {
        let plane = a.face_plane(face);
        let support = b.support(-plane.normal);
        let separation = plane.signed_distance(support);

        if separation > best.separation {
            best = FaceQuery { face, separation };
            if separation > 0.0 {
                break;
            }
        }
    }
    best
}

/// Gauss-map test for the arcs `a-b` and `c-d`.
///
/// `a` and `b` are the normals of the faces adjacent to the first edge and
/// `ba` is that edge's direction; `c`, `d` and `dc` likewise for the negated
/// second hull.
pub fn is_minkowski_face(a: Vec3, b: Vec3, c: Vec3, d: Vec3, ba: Vec3, dc: Vec3) -> bool {
    let cba = c.dot(ba);
    let dba = d.dot(ba);
    let adc = a.dot(dc);
    let bdc = b.dot(dc);

    cba * dba < 0.0 && adc * bdc < 0.0 && cba * bdc > 0.0
}

/// Distance between two edges along their common normal, oriented away from
/// `centroid_a`. Parallel edges yield `NEG_INFINITY`.
pub fn edge_separation(
    point_a: Vec3,
    edge_a: Vec3,
    point_b: Vec3,
    edge_b: Vec3,
    centroid_a: Vec3,
) -> (f32, Vec3) {
    let cross = edge_a.normalize_or_zero().cross(edge_b.normalize_or_zero());
    let length = cross.length();
    if length < PARALLEL_EDGE_EPSILON {
        return (f32::NEG_INFINITY, Vec3::ZERO);
    }

    let mut normal = cross / length;
    if normal.dot(point_a - centroid_a) < 0.0 {
        normal = -normal;
    }
    (normal.dot(point_b - point_a), normal)
}

/// Test every Gauss-map-valid edge pair. Returns early on a separating axis.
pub fn query_edge_directions(a: &WorldHull, b: &WorldHull) -> EdgeQuery {
    let mut best = EdgeQuery {
        edges: None,
        separation: f32::NEG_INFINITY,
        normal: Vec3::ZERO,
        minkowski_faces: 0,
    };
    let centroid_a = a.centroid();

    for ia in (0..a.mesh.half_edge_count() as u32).step_by(2) {
        let edge_a = a.mesh.edge(ia);
        let (pa, qa) = a.edge_points(ia);
        let dir_a = qa - pa;
        let na = a.face_normal(edge_a.face);
        let nb = a.face_normal(a.mesh.edge(edge_a.twin).face);

        for ib in (0..b.mesh.half_edge_count() as u32).step_by(2) {
            let edge_b = b.mesh.edge(ib);
            let (pb, qb) = b.edge_points(ib);
            let dir_b = qb - pb;
            let nc = -b.face_normal(edge_b.face);
            let nd = -b.face_normal(b.mesh.edge(edge_b.twin).face);

            if !is_minkowski_face(na, nb, nc, nd, dir_a, dir_b) {
                continue;
            }
            best.minkowski_faces += 1;

            let (separation, normal) = edge_separation(pa, dir_a, pb, dir_b, centroid_a);
            if separation > best.separation {
                best.edges = Some((ia, ib));
                best.separation = separation;
                best.normal = normal;
                if separation > 0.0 {
                    return best;
                }
            }
        }
    }
    best
}

/// Full SAT between two hulls. `None` when a separating axis exists.
pub fn sat_polytope_polytope(a: &WorldHull, b: &WorldHull) -> Option<SatResult> {
    let face_a = query_face_directions(a, b);
    if face_a.separation > 0.0 {
        return None;
    }
    let face_b = query_face_directions(b, a);
    if face_b.separation > 0.0 {
        return None;
    }
    let edge = query_edge_directions(a, b);
    if edge.separation > 0.0 {
        return None;
    }

    let mut result = if face_b.separation.abs() + AXIS_TIE_TOLERANCE < face_a.separation.abs() {
        SatResult {
            feature: SeparatingFeature::FaceB(face_b.face),
            separation: face_b.separation,
        }
    } else {
        SatResult {
            feature: SeparatingFeature::FaceA(face_a.face),
            separation: face_a.separation,
        }
    };

    if let Some((edge_a, edge_b)) = edge.edges {
        if edge.separation.abs() + AXIS_TIE_TOLERANCE < result.separation.abs() {
            result = SatResult {
                feature: SeparatingFeature::Edges {
                    edge_a,
                    edge_b,
                    normal: edge.normal,
                },
                separation: edge.separation,
            };
        }
    }

    trace!(
        face_a = face_a.separation,
        face_b = face_b.separation,
        edge = edge.separation,
        minkowski_faces = edge.minkowski_faces,
        feature = ?result.feature,
        "SAT axes"
    );
    Some(result)
}
