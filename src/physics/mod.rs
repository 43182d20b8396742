//! Rigid body simulation with narrowphase collision detection.
//!
//! # Architecture
//!
//! The pipeline runs in a fixed timestep loop:
//!
//! 1. Integrate every dynamic body (semi-implicit Euler with drag)
//! 2. Enumerate body pairs
//! 3. Narrowphase detection (bounding spheres, SAT, clipping)
//! 4. Resolve each colliding pair's contacts (sequential impulse)
//!
//! Contact normals always point from the first body of a pair to the second.

pub mod body;
pub mod broadphase;
pub mod clip;
pub mod collider;
pub mod contact;
pub mod narrowphase;
pub mod rigid_body;
pub mod sat;
pub mod solver;

use glam::Vec3;
use tracing::{debug, trace, warn};

use crate::error::ConfigError;
use crate::tolerance::DEFAULT_INFINITE_MASS_EPSILON;

use self::body::{Body, BodyHandle};
use self::broadphase::AllPairs;
use self::contact::{ContactManifold, ContactPoint};
use self::narrowphase::detect_collision;
use self::solver::{resolve_contacts, SolverParams};

/// Configuration for the physics simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsConfig {
    /// Gravity vector. Default: (0, -10, 0).
    pub gravity: Vec3,
    /// Fraction of velocity kept per second, in (0, 1]. Default: 0.995.
    pub drag: f32,
    /// Bounciness of every contact, in [0, 1]. Default: 0.95.
    pub restitution: f32,
    /// Bodies with an inverse mass at or below this are static. Default: 1e-4.
    pub infinite_mass_epsilon: f32,
    /// Fixed timestep for physics updates in seconds. Default: 1/60.
    pub fixed_timestep: f64,
    /// Maximum number of sub-steps per frame. Default: 4.
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -10.0, 0.0),
            drag: 0.995,
            restitution: 0.95,
            infinite_mass_epsilon: DEFAULT_INFINITE_MASS_EPSILON,
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() {
            return Err(ConfigError::Gravity(self.gravity));
        }
        if !(self.drag > 0.0 && self.drag <= 1.0) {
            return Err(ConfigError::Drag(self.drag));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ConfigError::Restitution(self.restitution));
        }
        if !(self.infinite_mass_epsilon.is_finite() && self.infinite_mass_epsilon >= 0.0) {
            return Err(ConfigError::InfiniteMassEpsilon(self.infinite_mass_epsilon));
        }
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(ConfigError::Timestep(self.fixed_timestep));
        }
        Ok(())
    }
}

/// What happened during one fixed step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub pairs_tested: usize,
    pub colliding_pairs: usize,
    /// Number of single-contact resolutions the solver ran.
    pub contacts_resolved: usize,
    /// Pairs that overlapped but produced no contact point. Their resolution was skipped.
    pub empty_manifolds: Vec<(BodyHandle, BodyHandle)>,
}

/// The simulation context: bodies, configuration and per-step state.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    accumulator: f64,
    broadphase: AllPairs,
    bodies: Vec<Option<Body>>,
    contacts: Vec<ContactManifold>,
    last_report: StepReport,
}

impl PhysicsWorld {
    /// Create a new physics world with the given configuration.
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            accumulator: 0.0,
            broadphase: AllPairs::new(),
            bodies: Vec::new(),
            contacts: Vec::new(),
            last_report: StepReport::default(),
        })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        debug!(?handle, kind = ?body.collider.shape.kind(), "Adding body");
        self.bodies.push(Some(body));
        handle
    }

    /// Remove a body. Its handle is not reused.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        let removed = self.bodies.get_mut(handle.index())?.take();
        if removed.is_some() {
            debug!(?handle, "Removed body");
        }
        removed
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.index())?.as_ref()
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle.index())?.as_mut()
    }

    /// Live bodies in slot order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.as_ref().map(|b| (BodyHandle(i as u32), b)))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.iter().flatten().count()
    }

    /// Whether the body touched anything during the last fixed step.
    pub fn is_colliding(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some_and(|b| b.colliding)
    }

    /// Contacts detected in the last fixed step, as they were before resolution.
    pub fn contacts(&self) -> &[ContactManifold] {
        &self.contacts
    }

    pub fn last_report(&self) -> &StepReport {
        &self.last_report
    }

    /// Step the simulation forward by `delta_time` seconds.
    ///
    /// Uses a fixed timestep accumulator. Returns the number of fixed steps run.
    pub fn step(&mut self, delta_time: f64) -> u32 {
        self.accumulator += delta_time;

        let mut substeps = 0u32;
        while self.accumulator >= self.config.fixed_timestep && substeps < self.config.max_substeps
        {
            self.fixed_step(self.config.fixed_timestep as f32);
            self.accumulator -= self.config.fixed_timestep;
            substeps += 1;
        }

        // Clamp accumulator to avoid spiral of death
        if self.accumulator > self.config.fixed_timestep * self.config.max_substeps as f64 {
            self.accumulator = 0.0;
        }
        substeps
    }

    /// Run exactly one integrate, detect and resolve cycle.
    pub fn fixed_step(&mut self, dt: f32) -> StepReport {
        let eps = self.config.infinite_mass_epsilon;

        // 1. Integrate
        let drag = rigid_body::frame_drag(self.config.drag, dt);
        for body in self.bodies.iter_mut().flatten() {
            body.rigid_body
                .integrate(&mut body.transform, self.config.gravity, drag, dt, eps);
            body.colliding = false;
        }

        // 2. Pairs
        self.contacts.clear();
        let pairs = self.broadphase.find_pairs(&self.bodies);

        let params = SolverParams {
            gravity: self.config.gravity,
            restitution: self.config.restitution,
            infinite_mass_epsilon: eps,
            dt,
        };
        let mut report = StepReport {
            pairs_tested: pairs.len(),
            ..StepReport::default()
        };

        // 3. Narrowphase and 4. resolution
        for &(handle_a, handle_b) in &pairs {
            let Some((a, b)) = pair_mut(&mut self.bodies, handle_a.index(), handle_b.index())
            else {
                continue;
            };

            let Some(points) =
                detect_collision(&a.collider.shape, &a.transform, &b.collider.shape, &b.transform)
            else {
                continue;
            };

            record_contacts(
                (handle_a, a),
                (handle_b, b),
                points,
                &params,
                &mut self.contacts,
                &mut report,
            );
        }

        self.last_report = report.clone();
        report
    }
}

/// Flag a detected pair, keep its contacts for inspection and resolve it.
///
/// An empty contact list is reported in `report.empty_manifolds` and left
/// unresolved. Sensor pairs are recorded but never resolved.
fn record_contacts(
    (handle_a, a): (BodyHandle, &mut Body),
    (handle_b, b): (BodyHandle, &mut Body),
    mut points: Vec<ContactPoint>,
    params: &SolverParams,
    contacts: &mut Vec<ContactManifold>,
    report: &mut StepReport,
) {
    report.colliding_pairs += 1;
    a.colliding = true;
    b.colliding = true;

    if points.is_empty() {
        warn!(
            ?handle_a,
            ?handle_b,
            "Bodies overlap but produced no contact points, skipping resolution"
        );
        report.empty_manifolds.push((handle_a, handle_b));
        return;
    }

    trace!(?handle_a, ?handle_b, contacts = points.len(), "Collision");
    contacts.push(ContactManifold {
        body_a: handle_a,
        body_b: handle_b,
        points: points.clone(),
    });

    if a.collider.is_sensor || b.collider.is_sensor {
        return;
    }
    report.contacts_resolved += resolve_contacts(a, b, &mut points, params);
}

/// Mutable references to two distinct live slots.
fn pair_mut(slots: &mut [Option<Body>], i: usize, j: usize) -> Option<(&mut Body, &mut Body)> {
    if i == j || i >= slots.len() || j >= slots.len() {
        return None;
    }
    if i < j {
        let (head, tail) = slots.split_at_mut(j);
        Some((head[i].as_mut()?, tail[0].as_mut()?))
    } else {
        let (head, tail) = slots.split_at_mut(i);
        Some((tail[0].as_mut()?, head[j].as_mut()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collider::{Collider, ColliderShape};
    use crate::physics::rigid_body::RigidBody;
    use crate::shape::TriangleMesh;
    use crate::transform::Transform;

    fn no_gravity() -> PhysicsConfig {
        PhysicsConfig {
            gravity: Vec3::ZERO,
            drag: 1.0,
            restitution: 1.0,
            ..PhysicsConfig::default()
        }
    }

    fn sphere(position: Vec3, rigid_body: RigidBody) -> Body {
        Body::new(
            Transform::from_position(position),
            rigid_body,
            Collider::new(ColliderShape::sphere(1.0)),
        )
    }

    #[test]
    fn test_config_validation() {
        assert!(PhysicsConfig::default().validate().is_ok());

        let bad = PhysicsConfig {
            drag: 0.0,
            ..PhysicsConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::Drag(0.0)));

        let bad = PhysicsConfig {
            restitution: 1.5,
            ..PhysicsConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::Restitution(1.5)));

        let bad = PhysicsConfig {
            infinite_mass_epsilon: -1.0,
            ..PhysicsConfig::default()
        };
        assert!(PhysicsWorld::new(bad).is_err());

        let bad = PhysicsConfig {
            fixed_timestep: 0.0,
            ..PhysicsConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::Timestep(0.0)));

        let bad = PhysicsConfig {
            gravity: Vec3::new(0.0, f32::NAN, 0.0),
            ..PhysicsConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::Gravity(_))));
    }

    #[test]
    fn test_physics_world_free_fall() {
        let mut physics = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let handle =
            physics.add_body(sphere(Vec3::new(0.0, 10.0, 0.0), RigidBody::new_dynamic(1.0)));

        // Simulate ~1 second
        for _ in 0..60 {
            physics.step(1.0 / 60.0);
        }

        let body = physics.body(handle).unwrap();
        assert!(
            body.transform.position.y < 10.0,
            "Body should have fallen: y = {}",
            body.transform.position.y
        );
        assert!(body.rigid_body.velocity.y < 0.0);
        assert!(!physics.is_colliding(handle));
    }

    #[test]
    fn test_step_accumulator() {
        let mut physics = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        assert_eq!(physics.step(2.5 / 60.0), 2);
        assert_eq!(physics.step(0.6 / 60.0), 1);
        // Large frames are capped at max_substeps.
        assert_eq!(physics.step(10.0), 4);
        assert_eq!(physics.step(0.0), 0);
    }

    #[test]
    fn test_sphere_rests_on_ground() {
        let mut physics = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let ground = physics.add_body(Body::new(
            Transform::identity(),
            RigidBody::new_static(),
            Collider::new(ColliderShape::ground()),
        ));
        let ball = physics.add_body(Body::new(
            Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
            RigidBody::new_dynamic(1.0),
            Collider::new(ColliderShape::sphere(0.5)),
        ));

        let mut touched = false;
        for _ in 0..180 {
            physics.fixed_step(1.0 / 60.0);
            touched |= physics.is_colliding(ball);
            let y = physics.body(ball).unwrap().transform.position.y;
            assert!(y > 0.49, "Ball sank into the ground: y = {y}");
        }
        assert!(touched);
        assert_eq!(physics.body(ground).unwrap().transform.position, Vec3::ZERO);
    }

    #[test]
    fn test_elastic_spheres_swap_velocities() {
        let mut physics = PhysicsWorld::new(no_gravity()).unwrap();
        let a = physics.add_body(sphere(
            Vec3::new(-0.95, 0.0, 0.0),
            RigidBody::new_dynamic(1.0).with_velocity(Vec3::X),
        ));
        let b = physics.add_body(sphere(
            Vec3::new(0.95, 0.0, 0.0),
            RigidBody::new_dynamic(1.0).with_velocity(Vec3::NEG_X),
        ));

        let report = physics.fixed_step(1.0 / 60.0);
        assert_eq!(report.pairs_tested, 1);
        assert_eq!(report.colliding_pairs, 1);
        assert_eq!(report.contacts_resolved, 1);

        let va = physics.body(a).unwrap().rigid_body.velocity;
        let vb = physics.body(b).unwrap().rigid_body.velocity;
        assert!((va - Vec3::NEG_X).length() < 1e-5);
        assert!((vb - Vec3::X).length() < 1e-5);
        assert!((va + vb).length() < 1e-5);
        assert!(physics.is_colliding(a) && physics.is_colliding(b));
    }

    #[test]
    fn test_contacts_are_recorded_before_resolution() {
        let mut physics = PhysicsWorld::new(no_gravity()).unwrap();
        physics.add_body(sphere(Vec3::ZERO, RigidBody::new_dynamic(1.0)));
        physics.add_body(sphere(Vec3::new(1.5, 0.0, 0.0), RigidBody::new_dynamic(1.0)));

        physics.fixed_step(1.0 / 60.0);

        let manifold = &physics.contacts()[0];
        assert_eq!(manifold.body_a, BodyHandle(0));
        assert_eq!(manifold.body_b, BodyHandle(1));
        assert!((manifold.points[0].penetration - 0.5).abs() < 1e-5);

        let gap = physics.body(BodyHandle(1)).unwrap().transform.position.x
            - physics.body(BodyHandle(0)).unwrap().transform.position.x;
        assert!((gap - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_sensor_is_not_resolved() {
        let mut physics = PhysicsWorld::new(no_gravity()).unwrap();
        let sensor = physics.add_body(Body::new(
            Transform::identity(),
            RigidBody::new_dynamic(1.0),
            Collider::sensor(ColliderShape::sphere(1.0)),
        ));
        let other = physics.add_body(sphere(
            Vec3::new(1.0, 0.0, 0.0),
            RigidBody::new_dynamic(1.0).with_velocity(Vec3::NEG_X),
        ));

        let report = physics.fixed_step(1.0 / 60.0);
        assert_eq!(report.colliding_pairs, 1);
        assert_eq!(report.contacts_resolved, 0);
        assert!(physics.is_colliding(sensor));
        assert_eq!(physics.contacts().len(), 1);
        assert_eq!(physics.body(other).unwrap().rigid_body.velocity, Vec3::NEG_X);
    }

    #[test]
    fn test_static_body_never_moves() {
        let mut physics = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let cube = ColliderShape::polygon(&TriangleMesh::cuboid(Vec3::ONE)).unwrap();
        let floor = physics.add_body(Body::new(
            Transform::identity(),
            RigidBody::new_static(),
            Collider::new(cube.clone()),
        ));
        let falling = physics.add_body(Body::new(
            Transform::from_position(Vec3::new(0.3, 2.5, -0.2)),
            RigidBody::new_dynamic(1.0),
            Collider::new(cube),
        ));

        for _ in 0..120 {
            physics.fixed_step(1.0 / 60.0);
            let floor_body = physics.body(floor).unwrap();
            assert_eq!(floor_body.transform.position, Vec3::ZERO);
            assert_eq!(floor_body.rigid_body.velocity, Vec3::ZERO);
        }
        let y = physics.body(falling).unwrap().transform.position.y;
        assert!(y > 1.9, "Box fell through the floor: y = {y}");
    }

    #[test]
    fn test_overlapping_static_bodies_report_colliding() {
        let mut physics = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        let cube = ColliderShape::polygon(&TriangleMesh::cuboid(Vec3::ONE)).unwrap();
        let a = physics.add_body(Body::new(
            Transform::identity(),
            RigidBody::new_static(),
            Collider::new(cube.clone()),
        ));
        let b = physics.add_body(Body::new(
            Transform::from_position(Vec3::new(1.5, 0.0, 0.0)),
            RigidBody::new_static(),
            Collider::new(cube),
        ));

        let report = physics.fixed_step(1.0 / 60.0);
        assert_eq!(report.pairs_tested, 1);
        assert_eq!(report.colliding_pairs, 1);
        assert_eq!(report.contacts_resolved, 0);
        assert!(physics.is_colliding(a));
        assert!(physics.is_colliding(b));
        assert_eq!(physics.contacts().len(), 1);
        assert_eq!(physics.body(a).unwrap().transform.position, Vec3::ZERO);
        assert_eq!(physics.body(b).unwrap().transform.position, Vec3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn test_empty_contact_list_is_reported_and_skipped() {
        let mut a = sphere(Vec3::ZERO, RigidBody::new_dynamic(1.0).with_velocity(Vec3::X));
        let mut b = sphere(
            Vec3::new(1.5, 0.0, 0.0),
            RigidBody::new_dynamic(1.0).with_velocity(Vec3::NEG_X),
        );
        let params = SolverParams {
            gravity: Vec3::ZERO,
            restitution: 1.0,
            infinite_mass_epsilon: DEFAULT_INFINITE_MASS_EPSILON,
            dt: 1.0 / 60.0,
        };
        let mut contacts = Vec::new();
        let mut report = StepReport::default();

        record_contacts(
            (BodyHandle(0), &mut a),
            (BodyHandle(1), &mut b),
            Vec::new(),
            &params,
            &mut contacts,
            &mut report,
        );

        assert_eq!(report.colliding_pairs, 1);
        assert_eq!(report.contacts_resolved, 0);
        assert_eq!(report.empty_manifolds, vec![(BodyHandle(0), BodyHandle(1))]);
        assert!(contacts.is_empty());
        assert!(a.colliding && b.colliding);
        assert_eq!(a.rigid_body.velocity, Vec3::X);
        assert_eq!(b.rigid_body.velocity, Vec3::NEG_X);
        assert_eq!(a.transform.position, Vec3::ZERO);
        assert_eq!(b.transform.position, Vec3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn test_remove_body() {
        let mut physics = PhysicsWorld::new(no_gravity()).unwrap();
        let a = physics.add_body(sphere(Vec3::ZERO, RigidBody::new_dynamic(1.0)));
        let b = physics.add_body(sphere(Vec3::new(1.0, 0.0, 0.0), RigidBody::new_dynamic(1.0)));

        assert!(physics.remove_body(a).is_some());
        assert!(physics.remove_body(a).is_none());
        assert_eq!(physics.body_count(), 1);

        let c = physics.add_body(sphere(Vec3::new(10.0, 0.0, 0.0), RigidBody::new_dynamic(1.0)));
        assert_ne!(a, c);
        assert_eq!(physics.bodies().map(|(h, _)| h).collect::<Vec<_>>(), vec![b, c]);

        let report = physics.fixed_step(1.0 / 60.0);
        assert_eq!(report.pairs_tested, 1);
        assert_eq!(report.colliding_pairs, 0);
        assert!(!physics.is_colliding(b));
    }
}
