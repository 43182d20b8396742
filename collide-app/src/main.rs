use collide3d::{
    Body, BodyHandle, Collider, ColliderShape, PhysicsConfig, PhysicsWorld, RigidBody, Transform,
    TriangleMesh,
};
use glam::{Quat, Vec3};
use tracing::{debug, info};

/// Frames per simulated second of wall-clock time.
const FRAME_RATE: f64 = 60.0;
const SECONDS: u32 = 5;

struct DropScene {
    tracked: Vec<(&'static str, BodyHandle)>,
    frame: u32,
}

impl DropScene {
    fn init(world: &mut PhysicsWorld) -> anyhow::Result<Self> {
        // Ground
        world.add_body(Body::new(
            Transform::identity(),
            RigidBody::new_static(),
            Collider::new(ColliderShape::ground()),
        ));

        // Static ramp block
        world.add_body(Body::new(
            Transform::from_position_rotation(Vec3::new(4.0, 0.5, 0.0), Quat::from_rotation_z(0.3)),
            RigidBody::new_static(),
            Collider::new(ColliderShape::polygon(&TriangleMesh::cuboid(Vec3::new(
                2.0, 0.5, 1.0,
            )))?),
        ));

        let cube = ColliderShape::polygon(&TriangleMesh::cuboid(Vec3::splat(0.5)))?;
        let cylinder = ColliderShape::polygon(&TriangleMesh::cylinder(0.4, 0.5, 16))?;
        let cone = ColliderShape::polygon(&TriangleMesh::cone(0.5, 0.5, 12))?;

        let mut tracked = Vec::new();
        tracked.push((
            "cube",
            world.add_body(Body::new(
                Transform::from_position_rotation(
                    Vec3::new(0.0, 3.0, 0.0),
                    Quat::from_rotation_y(0.4),
                ),
                RigidBody::new_dynamic(1.0),
                Collider::new(cube.clone()),
            )),
        ));
        tracked.push((
            "stacked cube",
            world.add_body(Body::new(
                Transform::from_position(Vec3::new(0.1, 5.0, 0.0)),
                RigidBody::new_dynamic(2.0),
                Collider::new(cube),
            )),
        ));
        tracked.push((
            "cylinder",
            world.add_body(Body::new(
                Transform::from_position(Vec3::new(-2.0, 2.0, 0.0)),
                RigidBody::new_dynamic(1.5).with_velocity(Vec3::new(1.0, 0.0, 0.0)),
                Collider::new(cylinder),
            )),
        ));
        tracked.push((
            "cone",
            world.add_body(Body::new(
                Transform::from_position(Vec3::new(4.0, 4.0, 0.0)),
                RigidBody::new_dynamic(1.0),
                Collider::new(cone),
            )),
        ));
        tracked.push((
            "sphere",
            world.add_body(Body::new(
                Transform::from_position(Vec3::new(-0.2, 8.0, 0.0)),
                RigidBody::new_dynamic(0.5),
                Collider::new(ColliderShape::sphere(0.5)),
            )),
        ));

        // Trigger volume around the landing spot
        world.add_body(Body::new(
            Transform::from_position(Vec3::new(0.0, 0.5, 0.0)),
            RigidBody::new_static(),
            Collider::sensor(ColliderShape::sphere(1.5)),
        ));

        Ok(Self { tracked, frame: 0 })
    }

    fn update(&mut self, world: &mut PhysicsWorld, delta_time: f64) {
        let steps = world.step(delta_time);
        self.frame += 1;

        let report = world.last_report();
        debug!(
            frame = self.frame,
            steps,
            pairs = report.pairs_tested,
            colliding = report.colliding_pairs,
            resolved = report.contacts_resolved,
            "Frame"
        );

        if self.frame % FRAME_RATE as u32 != 0 {
            return;
        }

        let contact_points: usize = world.contacts().iter().map(|m| m.points.len()).sum();
        info!(
            second = self.frame / FRAME_RATE as u32,
            manifolds = world.contacts().len(),
            contact_points,
            "Simulation time"
        );
        for (name, handle) in &self.tracked {
            let Some(body) = world.body(*handle) else {
                continue;
            };
            info!(
                body = name,
                position = ?body.transform.position,
                velocity = ?body.rigid_body.velocity,
                colliding = world.is_colliding(*handle),
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut world = PhysicsWorld::new(PhysicsConfig::default())?;
    let mut scene = DropScene::init(&mut world)?;
    info!(bodies = world.body_count(), "Scene ready");

    let delta_time = 1.0 / FRAME_RATE;
    for _ in 0..SECONDS * FRAME_RATE as u32 {
        scene.update(&mut world, delta_time);
    }

    Ok(())
}
