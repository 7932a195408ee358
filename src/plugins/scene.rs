// Scene instantiation: the configured scene root is spawned twice, once into
// the main (rendered, bevy_rapier) world and once under a hidden root whose
// bodies live in the ShadowWorld.
use bevy::prelude::*;
use bevy::ecs::system::EntityCommands;
use bevy::math::primitives::{Cuboid, Sphere};
use bevy_rapier3d::prelude::{
    Collider, ColliderMassProperties, ExternalImpulse, Friction, Restitution, RigidBody, Velocity,
};

use crate::plugins::config::{BodyDef, BodyKind, DecorDef, GameConfig, SceneDef, ShapeDef};
use crate::plugins::pairing::{ShotBody, WorldKind};
use crate::plugins::shadow_world::{ShadowBody, ShadowWorld};

/// Root of the duplicated hierarchy used for prediction.
#[derive(Component)]
pub struct HiddenSceneRoot;

/// Main-world body marker (for queries that should ignore the hidden copy).
#[derive(Component)]
pub struct VisualBody;

#[derive(Component)]
pub struct Decor;

pub struct ScenePlugin;
impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (spawn_main_scene, spawn_hidden_scene));
    }
}

// Mesh/material handles when rendering is available (absent in headless apps).
struct RenderKit<'a> {
    meshes: ResMut<'a, Assets<Mesh>>,
    materials: ResMut<'a, Assets<StandardMaterial>>,
}

impl RenderKit<'_> {
    fn pbr(&mut self, shape: ShapeDef, color: (f32, f32, f32, f32)) -> (Handle<Mesh>, Handle<StandardMaterial>) {
        let mesh = match shape {
            ShapeDef::Ball { radius } => self.meshes.add(Mesh::from(Sphere { radius })),
            ShapeDef::Cuboid { half_extents: h } => {
                self.meshes.add(Mesh::from(Cuboid::new(h.x * 2.0, h.y * 2.0, h.z * 2.0)))
            }
        };
        let material = self.materials.add(StandardMaterial {
            base_color: Color::srgba(color.0, color.1, color.2, color.3),
            perceptual_roughness: 0.7,
            ..default()
        });
        (mesh, material)
    }
}

fn render_kit<'a>(
    meshes: Option<ResMut<'a, Assets<Mesh>>>,
    materials: Option<ResMut<'a, Assets<StandardMaterial>>>,
) -> Option<RenderKit<'a>> {
    match (meshes, materials) {
        (Some(meshes), Some(materials)) => Some(RenderKit { meshes, materials }),
        _ => None,
    }
}

fn spawn_main_scene(
    mut commands: Commands,
    cfg: Res<GameConfig>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let mut kit = render_kit(meshes, materials);
    for def in &cfg.scene.bodies {
        let mut e = commands.spawn((
            SpatialBundle::from_transform(def.transform()),
            ShotBody { name: def.name.clone() },
            WorldKind::Main,
            VisualBody,
        ));
        e.insert(main_physics(def));
        if let Some(kit) = kit.as_mut() {
            e.insert(kit.pbr(def.shape, def.color));
        }
        spawn_decor(&mut e, &def.decor, kit.as_mut());
    }
    info!("SCENE main bodies={}", cfg.scene.bodies.len());
}

fn main_physics(def: &BodyDef) -> impl Bundle {
    let collider = match def.shape {
        ShapeDef::Ball { radius } => Collider::ball(radius),
        ShapeDef::Cuboid { half_extents: h } => Collider::cuboid(h.x, h.y, h.z),
    };
    let (body, mass) = match def.kind {
        BodyKind::Dynamic => (RigidBody::Dynamic, ColliderMassProperties::Mass(def.mass)),
        BodyKind::Fixed => (RigidBody::Fixed, ColliderMassProperties::default()),
    };
    (
        body,
        collider,
        mass,
        Restitution::coefficient(def.restitution),
        Friction::coefficient(def.friction),
        Velocity::zero(),
        ExternalImpulse::default(),
    )
}

fn spawn_hidden_scene(
    mut commands: Commands,
    cfg: Res<GameConfig>,
    mut shadow: ResMut<ShadowWorld>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let kit = render_kit(meshes, materials);
    let root = spawn_hidden_root(&mut commands, &cfg.scene, &mut shadow, kit);
    info!("SCENE hidden root={:?} shadow_bodies={}", root, shadow.body_count());
}

/// Instantiates `scene` under a new [`HiddenSceneRoot`]. Each body gets a
/// rigid body in `shadow`; render components are copied as-is and stripped
/// later by the hidden-scene sanitizer.
fn spawn_hidden_root(
    commands: &mut Commands,
    scene: &SceneDef,
    shadow: &mut ShadowWorld,
    mut kit: Option<RenderKit>,
) -> Entity {
    commands
        .spawn((SpatialBundle::default(), HiddenSceneRoot, Name::new("hidden-scene")))
        .with_children(|parent| {
            for def in &scene.bodies {
                let pose = def.transform();
                let handle = shadow.insert_body(def, &pose);
                let mut e = parent.spawn((
                    SpatialBundle::from_transform(pose),
                    ShotBody { name: def.name.clone() },
                    WorldKind::Hidden,
                    ShadowBody { handle },
                ));
                if let Some(kit) = kit.as_mut() {
                    e.insert(kit.pbr(def.shape, def.color));
                }
                spawn_decor(&mut e, &def.decor, kit.as_mut());
            }
        })
        .id()
}

fn spawn_decor(parent: &mut EntityCommands, decor: &[DecorDef], mut kit: Option<&mut RenderKit>) {
    if decor.is_empty() { return; }
    parent.with_children(|children| {
        for d in decor {
            let mut e = children.spawn((
                SpatialBundle::from_transform(Transform::from_translation(d.offset.to_vec3())),
                Decor,
            ));
            if let Some(kit) = kit.as_deref_mut() {
                e.insert(kit.pbr(d.shape, d.color));
            }
        }
    });
}
