//! Shared setup helpers for collide3d benchmarks.
//!
//! ## Running
//!
//! All groups (criterion):
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench physics
//!
//! Filter by group:
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench physics -- narrowphase
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench physics -- pipeline

use collide3d::physics::solver::SolverParams;
use collide3d::{
    Body, Collider, ColliderShape, ContactPoint, PhysicsConfig, PhysicsWorld, RigidBody,
    Transform, TriangleMesh,
};
use glam::{Quat, Vec3};

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

pub fn unit_cube() -> anyhow::Result<ColliderShape> {
    Ok(ColliderShape::polygon(&TriangleMesh::cuboid(Vec3::splat(0.5)))?)
}

pub fn cylinder(segments: u32) -> anyhow::Result<ColliderShape> {
    Ok(ColliderShape::polygon(&TriangleMesh::cylinder(0.5, 0.5, segments))?)
}

/// Two unit cubes overlapping face to face by 0.1 along X.
pub fn face_contact_pose() -> (Transform, Transform) {
    (
        Transform::identity(),
        Transform::from_position(Vec3::new(0.9, 0.0, 0.0)),
    )
}

/// Unit cubes crossed at 45 degrees so an edge of each meets, overlapping by 0.1.
pub fn edge_contact_pose() -> (Transform, Transform) {
    use std::f32::consts::{FRAC_PI_4, SQRT_2};
    (
        Transform::from_position_rotation(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_4)),
        Transform::from_position_rotation(
            Vec3::new(0.0, SQRT_2 - 0.1, 0.0),
            Quat::from_rotation_x(FRAC_PI_4),
        ),
    )
}

// ---------------------------------------------------------------------------
// Worlds
// ---------------------------------------------------------------------------

fn config() -> PhysicsConfig {
    PhysicsConfig::default()
}

/// Ground plus `n` dynamic spheres in a grid, spaced so neighbours overlap.
pub fn setup_sphere_world(n: usize) -> anyhow::Result<PhysicsWorld> {
    let mut world = PhysicsWorld::new(config())?;
    world.add_body(ground());

    let cols = (n as f32).sqrt().ceil() as usize;
    for i in 0..n {
        let x = (i % cols) as f32 * 0.9;
        let z = (i / cols) as f32 * 0.9;
        world.add_body(Body::new(
            Transform::from_position(Vec3::new(x, 0.45, z)),
            RigidBody::new_dynamic(1.0),
            Collider::new(ColliderShape::sphere(0.5)),
        ));
    }
    Ok(world)
}

/// Ground plus alternating cubes, cylinders and spheres dropped in columns.
pub fn setup_mixed_world(n: usize) -> anyhow::Result<PhysicsWorld> {
    let mut world = PhysicsWorld::new(config())?;
    world.add_body(ground());

    let cube = unit_cube()?;
    let cyl = cylinder(12)?;
    let cols = (n as f32).sqrt().ceil() as usize;
    for i in 0..n {
        let x = (i % cols) as f32 * 1.2;
        let z = (i / cols) as f32 * 1.2;
        let shape = match i % 3 {
            0 => cube.clone(),
            1 => cyl.clone(),
            _ => ColliderShape::sphere(0.5),
        };
        world.add_body(Body::new(
            Transform::from_position(Vec3::new(x, 0.45 + (i % 2) as f32 * 0.2, z)),
            RigidBody::new_dynamic(1.0),
            Collider::new(shape),
        ));
    }
    Ok(world)
}

/// Ground plus a single column of `n` unit cubes, each sunk into the one below.
pub fn setup_stack_world(n: usize) -> anyhow::Result<PhysicsWorld> {
    let mut world = PhysicsWorld::new(config())?;
    world.add_body(ground());

    let cube = unit_cube()?;
    for i in 0..n {
        world.add_body(Body::new(
            Transform::from_position(Vec3::new(0.0, 0.45 + i as f32 * 0.95, 0.0)),
            RigidBody::new_dynamic(1.0),
            Collider::new(cube.clone()),
        ));
    }
    Ok(world)
}

fn ground() -> Body {
    Body::new(
        Transform::identity(),
        RigidBody::new_static(),
        Collider::new(ColliderShape::ground()),
    )
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

pub fn solver_params() -> SolverParams {
    let config = config();
    SolverParams {
        gravity: config.gravity,
        restitution: config.restitution,
        infinite_mass_epsilon: config.infinite_mass_epsilon,
        dt: config.fixed_timestep as f32,
    }
}

/// A falling cube resting on static ground with `n` contact points on its bottom face.
pub fn setup_contact_pair(n: usize) -> anyhow::Result<(Body, Body, Vec<ContactPoint>)> {
    let ground = ground();
    let cube = Body::new(
        Transform::from_position(Vec3::new(0.0, 0.45, 0.0)),
        RigidBody::new_dynamic(1.0).with_velocity(Vec3::new(0.0, -2.0, 0.0)),
        Collider::new(unit_cube()?),
    );

    let contacts = (0..n)
        .map(|i| {
            let angle = i as f32 / n as f32 * std::f32::consts::TAU;
            let point = Vec3::new(angle.cos() * 0.5, -0.05, angle.sin() * 0.5);
            ContactPoint::new(point, Vec3::Y, 0.05)
        })
        .collect();
    Ok((ground, cube, contacts))
}
