//! Narrowphase collision detection: per shape-pair routines and their dispatch.
//!
//! Every routine reports contact normals pointing from the first shape to the
//! second. A `None` result means the shapes are apart; `Some` with an empty
//! list means they overlap but no contact point survived clipping.

use glam::Vec3;
use tracing::trace;

use crate::shape::{HalfEdgeMesh, Plane, WorldHull};
use crate::tolerance::{CONTACT_MERGE_DISTANCE, PLANE_THICKNESS};
use crate::transform::Transform;

use super::clip::{clip_against_planes, clip_polygon, closest_points_on_segments, point_in_face};
use super::collider::{bounding_spheres_overlap, ColliderShape};
use super::contact::ContactPoint;
use super::sat::{sat_polytope_polytope, SeparatingFeature};

/// Detect contacts between two posed shapes.
pub fn detect_collision(
    shape_a: &ColliderShape,
    transform_a: &Transform,
    shape_b: &ColliderShape,
    transform_b: &Transform,
) -> Option<Vec<ContactPoint>> {
    use ColliderShape::*;

    match (shape_a, shape_b) {
        (Sphere { radius: ra }, Sphere { radius: rb }) => {
            sphere_sphere(transform_a.position, *ra, transform_b.position, *rb).map(|c| vec![c])
        }
        (Sphere { radius }, Polygon(mesh)) => {
            if !bounding_spheres_overlap(shape_a, transform_a, shape_b, transform_b) {
                return None;
            }
            sphere_polygon(transform_a.position, *radius, mesh, transform_b).map(|c| vec![c])
        }
        (Polygon(mesh), Sphere { radius }) => {
            if !bounding_spheres_overlap(shape_a, transform_a, shape_b, transform_b) {
                return None;
            }
            sphere_polygon(transform_b.position, *radius, mesh, transform_a)
                .map(|c| vec![c.flipped()])
        }
        (Polygon(mesh_a), Polygon(mesh_b)) => {
            if !bounding_spheres_overlap(shape_a, transform_a, shape_b, transform_b) {
                return None;
            }
            polygon_polygon(mesh_a, transform_a, mesh_b, transform_b)
        }
        (HalfPlane { .. }, Sphere { radius }) => {
            let plane = shape_a.world_plane(transform_a)?;
            half_plane_sphere(&plane, transform_b.position, *radius).map(|c| vec![c])
        }
        (Sphere { radius }, HalfPlane { .. }) => {
            let plane = shape_b.world_plane(transform_b)?;
            half_plane_sphere(&plane, transform_a.position, *radius).map(|c| vec![c.flipped()])
        }
        (HalfPlane { .. }, Polygon(mesh)) => {
            let plane = shape_a.world_plane(transform_a)?;
            half_plane_polygon(&plane, &WorldHull::new(mesh, transform_b))
        }
        (Polygon(mesh), HalfPlane { .. }) => {
            let plane = shape_b.world_plane(transform_b)?;
            half_plane_polygon(&plane, &WorldHull::new(mesh, transform_a))
                .map(|points| points.into_iter().map(ContactPoint::flipped).collect())
        }
        (HalfPlane { .. }, HalfPlane { .. }) => None,
    }
}

/// Sphere-sphere test. Touching spheres collide with zero penetration.
pub fn sphere_sphere(
    center_a: Vec3,
    radius_a: f32,
    center_b: Vec3,
    radius_b: f32,
) -> Option<ContactPoint> {
    let delta = center_b - center_a;
    let radii = radius_a + radius_b;
    let distance_sq = delta.length_squared();
    if distance_sq > radii * radii {
        return None;
    }

    let distance = distance_sq.sqrt();
    let normal = if distance > f32::EPSILON {
        delta / distance
    } else {
        Vec3::Y
    };
    let penetration = radii - distance;
    // Middle of the overlapping segment, same point whichever sphere comes first.
    let point = center_a + normal * (radius_a - penetration * 0.5);

    Some(ContactPoint::new(point, normal, penetration))
}

/// Sphere (first) against a convex hull (second).
pub fn sphere_polygon(
    center: Vec3,
    radius: f32,
    mesh: &HalfEdgeMesh,
    transform: &Transform,
) -> Option<ContactPoint> {
    let local = transform.inverse_transform_point(center);

    let (best_face, best_distance) = mesh
        .faces()
        .iter()
        .enumerate()
        .map(|(i, f)| (i, f.normal.dot(local - f.center)))
        .fold((0, f32::NEG_INFINITY), |best, cur| {
            if cur.1 > best.1 {
                cur
            } else {
                best
            }
        });

    if best_distance >= radius {
        return None;
    }

    let (normal, penetration) = if best_distance <= 0.0 {
        // Center inside the hull: push out through the nearest face.
        let face_normal = mesh.faces()[best_face].normal;
        (-face_normal, radius - best_distance)
    } else {
        let closest = closest_point_on_hull(mesh, local);
        let offset = closest - local;
        let distance = offset.length();
        if distance >= radius {
            return None;
        }
        let normal = if distance > f32::EPSILON {
            offset / distance
        } else {
            -mesh.faces()[best_face].normal
        };
        (normal, radius - distance)
    };

    let world_normal = transform.transform_vector(normal);
    let point = center + world_normal * (radius - penetration * 0.5);
    Some(ContactPoint::new(point, world_normal, penetration))
}

/// Closest point on the surface of `mesh` to a local point outside it.
fn closest_point_on_hull(mesh: &HalfEdgeMesh, point: Vec3) -> Vec3 {
    let mut best = point;
    let mut best_distance = f32::INFINITY;

    for face in mesh.faces() {
        let distance = face.normal.dot(point - face.center);
        if distance <= 0.0 || distance >= best_distance {
            continue;
        }
        let projected = point - face.normal * distance;
        let polygon: Vec<Vec3> = face.polygon.iter().map(|&v| mesh.vertex(v)).collect();
        if point_in_face(projected, &polygon, face.normal, face.center) {
            best = projected;
            best_distance = distance;
        }
    }

    for e in (0..mesh.half_edge_count() as u32).step_by(2) {
        let (a, b) = mesh.edge_vertices(e);
        let (a, b) = (mesh.vertex(a), mesh.vertex(b));
        let ab = b - a;
        let t = ((point - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
        let candidate = a + ab * t;
        let distance = candidate.distance(point);
        if distance < best_distance {
            best = candidate;
            best_distance = distance;
        }
    }
    best
}

/// Half-space (first) against a sphere (second).
pub fn half_plane_sphere(plane: &Plane, center: Vec3, radius: f32) -> Option<ContactPoint> {
    let distance = plane.signed_distance(center);
    if distance > radius {
        return None;
    }

    let point = plane
        .intersect_segment(center, center - plane.normal * radius)
        .unwrap_or_else(|| plane.project(center));
    Some(ContactPoint::new(point, plane.normal, radius - distance))
}

/// Half-space (first) against a convex hull (second).
///
/// Every face of the hull is clipped against the plane; the surviving points
/// become contacts with their own depth.
pub fn half_plane_polygon(plane: &Plane, hull: &WorldHull) -> Option<Vec<ContactPoint>> {
    let deepest = hull.support(-plane.normal);
    if plane.signed_distance(deepest) > 0.0 {
        return None;
    }

    let mut contacts = Vec::new();
    for face in 0..hull.mesh.face_count() as u32 {
        for p in clip_polygon(&hull.face_points(face), plane) {
            let depth = -plane.signed_distance(p);
            if depth > -PLANE_THICKNESS {
                push_unique(
                    &mut contacts,
                    ContactPoint::new(p, plane.normal, depth.max(0.0)),
                );
            }
        }
    }
    Some(contacts)
}

/// Convex hull (first) against convex hull (second).
pub fn polygon_polygon(
    mesh_a: &HalfEdgeMesh,
    transform_a: &Transform,
    mesh_b: &HalfEdgeMesh,
    transform_b: &Transform,
) -> Option<Vec<ContactPoint>> {
    let a = WorldHull::new(mesh_a, transform_a);
    let b = WorldHull::new(mesh_b, transform_b);
    let result = sat_polytope_polytope(&a, &b)?;

    let contacts = match result.feature {
        SeparatingFeature::FaceA(face) => face_contacts(&a, face, &b, result.separation, true),
        SeparatingFeature::FaceB(face) => face_contacts(&b, face, &a, result.separation, false),
        SeparatingFeature::Edges {
            edge_a,
            edge_b,
            normal,
        } => vec![edge_contact(&a, edge_a, &b, edge_b, normal, result.separation)],
    };
    Some(contacts)
}

/// Clip the incident face of `incident` against the reference face of `reference`.
fn face_contacts(
    reference: &WorldHull,
    reference_face: u32,
    incident: &WorldHull,
    separation: f32,
    reference_is_a: bool,
) -> Vec<ContactPoint> {
    let reference_plane = reference.face_plane(reference_face);
    let reference_normal = reference_plane.normal;

    let mut incident_face = 0;
    let mut best_dot = f32::NEG_INFINITY;
    for face in 0..incident.mesh.face_count() as u32 {
        let d = incident.face_normal(face).dot(-reference_normal);
        if d > best_dot {
            best_dot = d;
            incident_face = face;
        }
    }

    let clipped = clip_against_planes(
        &incident.face_points(incident_face),
        &reference.side_planes(reference_face),
    );
    let reference_points = reference.face_points(reference_face);
    let normal = if reference_is_a {
        reference_normal
    } else {
        -reference_normal
    };
    let penetration = separation.abs();

    let mut contacts = Vec::with_capacity(clipped.len());
    for p in clipped {
        if -reference_plane.signed_distance(p) <= -PLANE_THICKNESS {
            continue;
        }
        let projected = reference_plane.project(p);
        if !point_in_face(
            projected,
            &reference_points,
            reference_normal,
            reference_plane.point,
        ) {
            continue;
        }
        push_unique(
            &mut contacts,
            ContactPoint::new(projected, normal, penetration),
        );
    }

    trace!(
        reference_face,
        incident_face,
        reference_is_a,
        contacts = contacts.len(),
        "Face contact"
    );
    contacts
}

/// Single contact between two crossing edges.
fn edge_contact(
    a: &WorldHull,
    edge_a: u32,
    b: &WorldHull,
    edge_b: u32,
    normal: Vec3,
    separation: f32,
) -> ContactPoint {
    let (pa, qa) = a.edge_points(edge_a);
    let (pb, qb) = b.edge_points(edge_b);

    let point = match closest_points_on_segments(pa, qa, pb, qb) {
        Some((on_a, on_b)) => (on_a + on_b) * 0.5,
        None => {
            // Fall back to the endpoint of B's edge reaching deepest into A.
            if normal.dot(pb) <= normal.dot(qb) {
                pb
            } else {
                qb
            }
        }
    };

    ContactPoint::new(point, normal, separation.abs())
}

fn push_unique(contacts: &mut Vec<ContactPoint>, contact: ContactPoint) {
    let merge_sq = CONTACT_MERGE_DISTANCE * CONTACT_MERGE_DISTANCE;
    if contacts
        .iter()
        .all(|c| c.point.distance_squared(contact.point) > merge_sq)
    {
        contacts.push(contact);
    }
}
