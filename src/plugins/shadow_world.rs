// Hidden physics world used only for what-if simulation of a pending shot.
// It is a standalone rapier pipeline, stepped in bursts by the trajectory
// predictor and never by the main fixed tick.
use bevy::prelude::*;
use bevy_rapier3d::rapier::na::Quaternion;
use bevy_rapier3d::rapier::prelude::*;
// bevy's prelude also exports a `Real` (the wall-clock marker).
use bevy_rapier3d::rapier::prelude::Real;

use crate::plugins::config::{BodyDef, BodyKind, GameConfig, ShapeDef};

/// Links a hidden-world entity to its rigid body inside [`ShadowWorld`].
#[derive(Component, Debug, Clone, Copy)]
pub struct ShadowBody {
    pub handle: RigidBodyHandle,
}

#[derive(Resource)]
pub struct ShadowWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    steps_taken: u64,
}

impl Default for ShadowWorld {
    fn default() -> Self { Self::new(Vec3::new(0.0, -9.81, 0.0), 1.0 / 50.0) }
}

impl ShadowWorld {
    pub fn new(gravity: Vec3, dt: f32) -> Self {
        let params = IntegrationParameters { dt, ..Default::default() };
        Self {
            gravity: to_vector(gravity),
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            steps_taken: 0,
        }
    }

    pub fn from_config(cfg: &GameConfig) -> Self {
        Self::new(cfg.physics.gravity.to_vec3(), cfg.fixed_time_step())
    }

    pub fn dt(&self) -> f32 { self.params.dt }
    pub fn steps_taken(&self) -> u64 { self.steps_taken }
    pub fn body_count(&self) -> usize { self.bodies.len() }

    /// Adds the physics half of `def` at `pose`.
    pub fn insert_body(&mut self, def: &BodyDef, pose: &Transform) -> RigidBodyHandle {
        let builder = match def.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
        };
        let body = builder.position(to_isometry(pose.translation, pose.rotation)).build();
        let handle = self.bodies.insert(body);

        let collider = match def.shape {
            ShapeDef::Ball { radius } => ColliderBuilder::ball(radius),
            ShapeDef::Cuboid { half_extents: h } => ColliderBuilder::cuboid(h.x, h.y, h.z),
        };
        let mut collider = collider.restitution(def.restitution).friction(def.friction);
        if def.kind == BodyKind::Dynamic {
            collider = collider.mass(def.mass);
        }
        self.colliders.insert_with_parent(collider.build(), handle, &mut self.bodies);
        // Impulses may be applied before the first step; mass must be current.
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }
        handle
    }

    /// Teleports `handle` to the given pose and discards all residual motion.
    pub fn sync_pose(&mut self, handle: RigidBodyHandle, translation: Vec3, rotation: Quat) -> bool {
        let Some(rb) = self.bodies.get_mut(handle) else { return false; };
        rb.set_position(to_isometry(translation, rotation), true);
        rb.set_linvel(Vector::zeros(), true);
        rb.set_angvel(Vector::zeros(), true);
        rb.reset_forces(true);
        rb.reset_torques(true);
        true
    }

    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec3) -> bool {
        let Some(rb) = self.bodies.get_mut(handle) else { return false; };
        rb.apply_impulse(to_vector(impulse), true);
        true
    }

    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
        self.steps_taken += 1;
    }

    pub fn translation(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|rb| {
            let t = rb.translation();
            Vec3::new(t.x, t.y, t.z)
        })
    }

    pub fn rotation(&self, handle: RigidBodyHandle) -> Option<Quat> {
        self.bodies.get(handle).map(|rb| {
            let q = rb.rotation();
            Quat::from_xyzw(q.i, q.j, q.k, q.w)
        })
    }

    pub fn linvel(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|rb| {
            let v = rb.linvel();
            Vec3::new(v.x, v.y, v.z)
        })
    }
}

fn to_vector(v: Vec3) -> Vector<Real> { vector![v.x, v.y, v.z] }

fn to_isometry(t: Vec3, r: Quat) -> Isometry<Real> {
    let rotation = Rotation::from_quaternion(Quaternion::new(r.w, r.x, r.y, r.z));
    Isometry::from_parts(Translation::new(t.x, t.y, t.z), rotation)
}

pub struct ShadowWorldPlugin;
impl Plugin for ShadowWorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>();
        let world = ShadowWorld::from_config(app.world().resource::<GameConfig>());
        app.insert_resource(world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::config::Vec3Def;

    fn ball_def() -> BodyDef {
        BodyDef {
            name: "hitBall".into(),
            shape: ShapeDef::Ball { radius: 0.25 },
            kind: BodyKind::Dynamic,
            position: Vec3Def::ZERO,
            rotation_deg: Vec3Def::ZERO,
            mass: 2.0,
            restitution: 0.0,
            friction: 0.5,
            color: (1.0, 1.0, 1.0, 1.0),
            decor: Vec::new(),
        }
    }

    #[test]
    fn impulse_before_first_step_moves_body() {
        let mut world = ShadowWorld::new(Vec3::ZERO, 0.02);
        let h = world.insert_body(&ball_def(), &Transform::default());
        assert!(world.apply_impulse(h, Vec3::new(4.0, 0.0, 0.0)));
        let v = world.linvel(h).unwrap();
        assert!((v.x - 2.0).abs() < 1e-4, "v={v:?}");
        world.step();
        assert_eq!(world.steps_taken(), 1);
        let p = world.translation(h).unwrap();
        assert!((p.x - 0.04).abs() < 1e-4, "p={p:?}");
    }

    #[test]
    fn sync_pose_discards_motion() {
        let mut world = ShadowWorld::new(Vec3::new(0.0, -9.81, 0.0), 0.02);
        let h = world.insert_body(&ball_def(), &Transform::default());
        for _ in 0..10 { world.step(); }
        assert!(world.linvel(h).unwrap().length() > 0.1);
        let rot = Quat::from_rotation_y(0.5);
        world.sync_pose(h, Vec3::new(1.0, 2.0, 3.0), rot);
        assert_eq!(world.linvel(h).unwrap(), Vec3::ZERO);
        assert!(world.translation(h).unwrap().distance(Vec3::new(1.0, 2.0, 3.0)) < 1e-6);
        assert!(world.rotation(h).unwrap().angle_between(rot) < 1e-4);
    }
}
