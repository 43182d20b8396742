//! Polygon clipping and small geometric helpers for contact generation.

use glam::{Vec2, Vec3};

use crate::shape::{Plane, PlaneSide};
use crate::tolerance::{INSIDE_TEST_OFFSET, SEGMENT_PARAM_SLACK, SINGULAR_EPSILON};

/// Sutherland–Hodgman step: keep the part of `polygon` behind `plane`.
///
/// Points within the plane thickness count as kept. Crossing edges
/// contribute their intersection with the plane; an edge parallel to the
/// plane contributes nothing extra.
pub fn clip_polygon(polygon: &[Vec3], plane: &Plane) -> Vec<Vec3> {
    let Some(&last) = polygon.last() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(polygon.len() + 1);
    let mut a = last;
    let mut side_a = plane.classify(a);

    for &b in polygon {
        let side_b = plane.classify(b);
        match side_b {
            PlaneSide::Behind => {
                if side_a == PlaneSide::Front {
                    out.extend(plane.intersect_segment(a, b));
                }
                out.push(b);
            }
            PlaneSide::On => out.push(b),
            PlaneSide::Front => {
                if side_a == PlaneSide::Behind {
                    out.extend(plane.intersect_segment(a, b));
                }
            }
        }
        a = b;
        side_a = side_b;
    }
    out
}

/// Clip `polygon` by every plane in turn.
pub fn clip_against_planes(polygon: &[Vec3], planes: &[Plane]) -> Vec<Vec3> {
    let mut current = polygon.to_vec();
    for plane in planes {
        if current.is_empty() {
            break;
        }
        current = clip_polygon(&current, plane);
    }
    current
}

/// Closest points between segments `a0-a1` and `b0-b1`.
///
/// Returns `None` when the lines are (nearly) parallel or the closest points
/// of the infinite lines fall outside either segment.
pub fn closest_points_on_segments(a0: Vec3, a1: Vec3, b0: Vec3, b1: Vec3) -> Option<(Vec3, Vec3)> {
    let p13 = a0 - b0;
    let p43 = b1 - b0;
    let p21 = a1 - a0;

    let d1343 = p13.dot(p43);
    let d4321 = p43.dot(p21);
    let d1321 = p13.dot(p21);
    let d4343 = p43.dot(p43);
    let d2121 = p21.dot(p21);

    if d4343 <= f32::EPSILON || d2121 <= f32::EPSILON {
        return None;
    }

    let denom = d2121 * d4343 - d4321 * d4321;
    if denom.abs() < SINGULAR_EPSILON * d2121 * d4343 {
        return None;
    }

    let mua = (d1343 * d4321 - d1321 * d4343) / denom;
    let mub = (d1343 + d4321 * mua) / d4343;

    let in_range = |t: f32| (-SEGMENT_PARAM_SLACK..=1.0 + SEGMENT_PARAM_SLACK).contains(&t);
    if !in_range(mua) || !in_range(mub) {
        return None;
    }

    Some((a0 + p21 * mua, b0 + p43 * mub))
}

#[inline]
fn cross2(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Parity test for a point lying in the plane of a convex face.
///
/// The point is first pulled towards `center` by a small offset so points
/// on the boundary count as inside, then a ray is cast towards the center
/// and the edge crossings are counted.
pub fn point_in_face(point: Vec3, polygon: &[Vec3], normal: Vec3, center: Vec3) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let u = normal.any_orthonormal_vector();
    let v = normal.cross(u);
    let to_2d = |p: Vec3| {
        let d = p - center;
        Vec2::new(d.dot(u), d.dot(v))
    };

    let mut p = to_2d(point);
    let distance = p.length();
    if distance <= INSIDE_TEST_OFFSET {
        return true;
    }
    p -= p / distance * INSIDE_TEST_OFFSET;
    let dir = -p;

    let mut crossings = 0;
    let mut a = to_2d(polygon[polygon.len() - 1]);
    for &vertex in polygon {
        let b = to_2d(vertex);
        let above_a = cross2(dir, a - p) >= 0.0;
        let above_b = cross2(dir, b - p) >= 0.0;
        if above_a != above_b {
            let edge = b - a;
            let t = cross2(a - p, edge) / cross2(dir, edge);
            if t > 0.0 {
                crossings += 1;
            }
        }
        a = b;
    }
    crossings % 2 == 1
}
