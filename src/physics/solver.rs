//! Sequential impulse resolution of the contacts between two bodies.
//!
//! Contact normals point from body A to body B. Velocities are corrected with
//! a single normal impulse per contact and overlap is removed by moving the
//! bodies directly, in proportion to their inverse masses.

use glam::Vec3;
use tracing::trace;

use crate::tolerance::{PENETRATION_EPSILON, VELOCITY_TIE_EPSILON};

use super::body::Body;
use super::contact::ContactPoint;
use super::rigid_body::RigidBody;

/// Per-step values the solver needs from the world configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParams {
    pub gravity: Vec3,
    pub restitution: f32,
    pub infinite_mass_epsilon: f32,
    pub dt: f32,
}

fn effective_inverse_mass(rb: &RigidBody, eps: f32) -> f32 {
    if rb.is_static(eps) {
        0.0
    } else {
        rb.inverse_mass
    }
}

/// Relative normal velocity of B with respect to A. Negative when closing.
///
/// Static bodies count as motionless whatever their stored velocity.
pub fn separating_velocity(a: &RigidBody, b: &RigidBody, normal: Vec3, eps: f32) -> f32 {
    let va = if a.is_static(eps) { Vec3::ZERO } else { a.velocity };
    let vb = if b.is_static(eps) { Vec3::ZERO } else { b.velocity };
    (vb - va).dot(normal)
}

/// Apply the normal impulse for one contact. Does nothing if the bodies separate.
pub fn resolve_velocity(
    a: &mut RigidBody,
    b: &mut RigidBody,
    contact: &ContactPoint,
    params: &SolverParams,
) {
    let eps = params.infinite_mass_epsilon;
    let inv_a = effective_inverse_mass(a, eps);
    let inv_b = effective_inverse_mass(b, eps);
    let total_inverse_mass = inv_a + inv_b;
    if total_inverse_mass <= 0.0 {
        return;
    }

    let normal = contact.normal;
    let separating = separating_velocity(a, b, normal, eps);
    if separating >= 0.0 {
        return;
    }

    let mut target = -separating * params.restitution;

    // Drop the closing speed gravity added this step so resting contacts stay at rest.
    let gravity_a = if inv_a > 0.0 { params.gravity } else { Vec3::ZERO };
    let gravity_b = if inv_b > 0.0 { params.gravity } else { Vec3::ZERO };
    let gravity_velocity = (gravity_b - gravity_a).dot(normal) * params.dt;
    if gravity_velocity < 0.0 {
        target = (target + params.restitution * gravity_velocity * 2.0).max(0.0);
    }

    let impulse = (target - separating) / total_inverse_mass;
    a.velocity -= normal * impulse * inv_a;
    b.velocity += normal * impulse * inv_b;
}

/// Push the bodies apart along the contact normal.
///
/// Returns the position change of A and of B.
pub fn resolve_interpenetration(
    a: &mut Body,
    b: &mut Body,
    contact: &ContactPoint,
    infinite_mass_epsilon: f32,
) -> (Vec3, Vec3) {
    if contact.penetration <= 0.0 {
        return (Vec3::ZERO, Vec3::ZERO);
    }

    let inv_a = effective_inverse_mass(&a.rigid_body, infinite_mass_epsilon);
    let inv_b = effective_inverse_mass(&b.rigid_body, infinite_mass_epsilon);
    let total_inverse_mass = inv_a + inv_b;
    if total_inverse_mass <= 0.0 {
        return (Vec3::ZERO, Vec3::ZERO);
    }

    let per_inverse_mass = contact.normal * (contact.penetration / total_inverse_mass);
    let delta_a = -per_inverse_mass * inv_a;
    let delta_b = per_inverse_mass * inv_b;
    a.transform.position += delta_a;
    b.transform.position += delta_b;
    (delta_a, delta_b)
}

/// Resolve every contact of a pair. Returns how many resolutions ran.
///
/// With several contacts the most negative separating velocity is handled
/// first, ties going to the deeper contact. After each resolution the
/// remaining depths are updated from the positional correction instead of
/// running detection again.
pub fn resolve_contacts(
    a: &mut Body,
    b: &mut Body,
    contacts: &mut [ContactPoint],
    params: &SolverParams,
) -> usize {
    let eps = params.infinite_mass_epsilon;
    if a.rigid_body.is_static(eps) && b.rigid_body.is_static(eps) {
        return 0;
    }

    if let [contact] = contacts {
        resolve_velocity(&mut a.rigid_body, &mut b.rigid_body, contact, params);
        resolve_interpenetration(a, b, contact, eps);
        return 1;
    }

    let mut resolved = 0;
    for _ in 0..2 * contacts.len() {
        let mut candidate: Option<(usize, f32)> = None;
        for (i, c) in contacts.iter().enumerate() {
            let velocity = separating_velocity(&a.rigid_body, &b.rigid_body, c.normal, eps);
            if velocity >= 0.0 && c.penetration <= PENETRATION_EPSILON {
                continue;
            }
            let better = match candidate {
                None => true,
                Some((best, best_velocity)) => {
                    if (velocity - best_velocity).abs() <= VELOCITY_TIE_EPSILON {
                        c.penetration > contacts[best].penetration
                    } else {
                        velocity < best_velocity
                    }
                }
            };
            if better {
                candidate = Some((i, velocity));
            }
        }

        let Some((index, velocity)) = candidate else {
            break;
        };
        trace!(index, velocity, penetration = contacts[index].penetration, "Resolving contact");

        let contact = contacts[index];
        resolve_velocity(&mut a.rigid_body, &mut b.rigid_body, &contact, params);
        let (delta_a, delta_b) = resolve_interpenetration(a, b, &contact, eps);

        let relative = delta_b - delta_a;
        for c in contacts.iter_mut() {
            c.penetration -= relative.dot(c.normal);
        }
        resolved += 1;
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collider::{Collider, ColliderShape};
    use crate::tolerance::DEFAULT_INFINITE_MASS_EPSILON;
    use crate::transform::Transform;

    const EPS: f32 = 1e-5;

    fn params(restitution: f32) -> SolverParams {
        SolverParams {
            gravity: Vec3::ZERO,
            restitution,
            infinite_mass_epsilon: DEFAULT_INFINITE_MASS_EPSILON,
            dt: 1.0 / 60.0,
        }
    }

    fn body(position: Vec3, rigid_body: RigidBody) -> Body {
        Body::new(
            Transform::from_position(position),
            rigid_body,
            Collider::new(ColliderShape::sphere(1.0)),
        )
    }

    #[test]
    fn test_elastic_head_on_swaps_velocities() {
        let v = 3.0;
        let mut a = RigidBody::new_dynamic(1.0).with_velocity(Vec3::new(v, 0.0, 0.0));
        let mut b = RigidBody::new_dynamic(1.0).with_velocity(Vec3::new(-v, 0.0, 0.0));
        let momentum = a.velocity + b.velocity;
        let contact = ContactPoint::new(Vec3::ZERO, Vec3::X, 0.1);

        resolve_velocity(&mut a, &mut b, &contact, &params(1.0));

        assert!((a.velocity - Vec3::new(-v, 0.0, 0.0)).length() < EPS);
        assert!((b.velocity - Vec3::new(v, 0.0, 0.0)).length() < EPS);
        assert!((a.velocity + b.velocity - momentum).length() < EPS);
    }

    #[test]
    fn test_separating_bodies_untouched() {
        let mut a = RigidBody::new_dynamic(1.0).with_velocity(Vec3::NEG_X);
        let mut b = RigidBody::new_dynamic(1.0).with_velocity(Vec3::X);
        let contact = ContactPoint::new(Vec3::ZERO, Vec3::X, 0.1);
        resolve_velocity(&mut a, &mut b, &contact, &params(1.0));
        assert_eq!(a.velocity, Vec3::NEG_X);
        assert_eq!(b.velocity, Vec3::X);
    }

    #[test]
    fn test_inelastic_against_static() {
        let mut ground = RigidBody::new_static();
        let mut ball = RigidBody::new_dynamic(2.0).with_velocity(Vec3::new(1.0, -4.0, 0.0));
        let contact = ContactPoint::new(Vec3::ZERO, Vec3::Y, 0.0);

        resolve_velocity(&mut ground, &mut ball, &contact, &params(0.5));

        assert!((ball.velocity - Vec3::new(1.0, 2.0, 0.0)).length() < EPS);
        assert_eq!(ground.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_gravity_buildup_removed_for_resting_contact() {
        let g = Vec3::new(0.0, -10.0, 0.0);
        let dt = 0.1;
        let mut ground = RigidBody::new_static();
        // Speed gained from one step of gravity.
        let mut ball = RigidBody::new_dynamic(1.0).with_velocity(g * dt);
        let contact = ContactPoint::new(Vec3::ZERO, Vec3::Y, 0.0);
        let p = SolverParams {
            gravity: g,
            restitution: 0.9,
            infinite_mass_epsilon: DEFAULT_INFINITE_MASS_EPSILON,
            dt,
        };

        resolve_velocity(&mut ground, &mut ball, &contact, &p);
        assert!(ball.velocity.length() < EPS);
    }

    #[test]
    fn test_static_velocity_is_ignored() {
        // A static body carrying a stale velocity must not count as moving.
        let a = RigidBody::new_static().with_velocity(Vec3::X * 10.0);
        let b = RigidBody::new_dynamic(1.0);
        assert_eq!(
            separating_velocity(&a, &b, Vec3::X, DEFAULT_INFINITE_MASS_EPSILON),
            0.0
        );
    }

    #[test]
    fn test_interpenetration_split_by_inverse_mass() {
        let mut a = body(Vec3::ZERO, RigidBody::new_dynamic(1.0));
        let mut b = body(Vec3::new(1.5, 0.0, 0.0), RigidBody::new_dynamic(3.0));
        let contact = ContactPoint::new(Vec3::ZERO, Vec3::X, 0.4);

        let (da, db) =
            resolve_interpenetration(&mut a, &mut b, &contact, DEFAULT_INFINITE_MASS_EPSILON);

        assert!((da - Vec3::new(-0.3, 0.0, 0.0)).length() < EPS);
        assert!((db - Vec3::new(0.1, 0.0, 0.0)).length() < EPS);
        assert!((b.transform.position.x - a.transform.position.x - 1.9).abs() < EPS);
    }

    #[test]
    fn test_interpenetration_noop_cases() {
        let mut a = body(Vec3::ZERO, RigidBody::new_static());
        let mut b = body(Vec3::X, RigidBody::new_static());
        let contact = ContactPoint::new(Vec3::ZERO, Vec3::X, 0.4);
        assert_eq!(
            resolve_interpenetration(&mut a, &mut b, &contact, DEFAULT_INFINITE_MASS_EPSILON),
            (Vec3::ZERO, Vec3::ZERO)
        );

        let mut b = body(Vec3::X, RigidBody::new_dynamic(1.0));
        let contact = ContactPoint::new(Vec3::ZERO, Vec3::X, -0.2);
        assert_eq!(
            resolve_interpenetration(&mut a, &mut b, &contact, DEFAULT_INFINITE_MASS_EPSILON),
            (Vec3::ZERO, Vec3::ZERO)
        );
        assert_eq!(b.transform.position, Vec3::X);
    }

    #[test]
    fn test_multi_contact_against_static_keeps_static_in_place() {
        let mut ground = body(Vec3::ZERO, RigidBody::new_static());
        let mut cube = body(
            Vec3::new(0.0, 0.9, 0.0),
            RigidBody::new_dynamic(1.0).with_velocity(Vec3::new(0.0, -2.0, 0.0)),
        );
        let mut contacts: Vec<ContactPoint> = [-1.0, 1.0]
            .iter()
            .flat_map(|&x| {
                [-1.0, 1.0].map(|z| ContactPoint::new(Vec3::new(x, -0.1, z), Vec3::Y, 0.1))
            })
            .collect();

        let resolved = resolve_contacts(&mut ground, &mut cube, &mut contacts, &params(0.5));

        assert!(resolved >= 1 && resolved <= 8);
        assert_eq!(ground.transform.position, Vec3::ZERO);
        assert_eq!(ground.rigid_body.velocity, Vec3::ZERO);
        assert!(cube.rigid_body.velocity.y >= 0.0);
        assert!((cube.transform.position.y - 1.0).abs() < EPS);
        for c in &contacts {
            assert!(c.penetration.abs() < EPS);
        }
    }

    #[test]
    fn test_single_contact_resolution() {
        let mut a = body(Vec3::ZERO, RigidBody::new_dynamic(1.0).with_velocity(Vec3::X));
        let mut b = body(Vec3::new(1.8, 0.0, 0.0), RigidBody::new_dynamic(1.0));
        let mut contacts = [ContactPoint::new(Vec3::new(0.9, 0.0, 0.0), Vec3::X, 0.2)];

        assert_eq!(resolve_contacts(&mut a, &mut b, &mut contacts, &params(1.0)), 1);
        assert!((a.rigid_body.velocity).length() < EPS);
        assert!((b.rigid_body.velocity - Vec3::X).length() < EPS);
        assert!((a.transform.position.x + 0.1).abs() < EPS);
        assert!((b.transform.position.x - 1.9).abs() < EPS);
    }

    #[test]
    fn test_both_static_is_noop() {
        let mut a = body(Vec3::ZERO, RigidBody::new_static());
        let mut b = body(Vec3::X, RigidBody::new_static());
        let mut contacts = [ContactPoint::new(Vec3::ZERO, Vec3::X, 1.0); 3];
        assert_eq!(resolve_contacts(&mut a, &mut b, &mut contacts, &params(1.0)), 0);
    }
}
