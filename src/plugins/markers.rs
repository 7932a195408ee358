// Trajectory markers: transient spheres placed along the predicted path.
// The whole set is torn down and rebuilt on every prediction.
use bevy::prelude::*;
use bevy::math::primitives::Sphere;

use crate::plugins::config::GameConfig;

#[derive(Component, Debug, Clone, Copy)]
pub struct TrajectoryMarker {
    pub index: usize,
}

#[derive(Resource, Clone)]
pub struct MarkerAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

#[derive(Resource, Debug, Default)]
pub struct MarkerSet {
    markers: Vec<Entity>,
    warned_no_assets: bool,
}

impl MarkerSet {
    /// Spawns one marker at `position` and appends it to the set.
    pub fn create(&mut self, commands: &mut Commands, position: Vec3, assets: Option<&MarkerAssets>) -> Entity {
        let index = self.markers.len();
        let mut e = commands.spawn((
            SpatialBundle::from_transform(Transform::from_translation(position)),
            TrajectoryMarker { index },
        ));
        match assets {
            Some(a) => {
                e.insert((a.mesh.clone(), a.material.clone()));
            }
            None => {
                if !self.warned_no_assets {
                    warn!("MARKER render assets missing; spawning bare markers");
                    self.warned_no_assets = true;
                }
            }
        }
        let id = e.id();
        self.markers.push(id);
        id
    }

    /// Despawns every managed marker and empties the set.
    pub fn cleanup(&mut self, commands: &mut Commands) {
        for e in self.markers.drain(..) {
            if let Some(ec) = commands.get_entity(e) {
                ec.despawn_recursive();
            }
        }
    }

    pub fn len(&self) -> usize { self.markers.len() }
    pub fn is_empty(&self) -> bool { self.markers.is_empty() }
    pub fn entities(&self) -> &[Entity] { &self.markers }
}

pub struct MarkerPlugin;
impl Plugin for MarkerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MarkerSet>()
            .add_systems(Startup, build_marker_assets);
    }
}

fn build_marker_assets(
    mut commands: Commands,
    cfg: Res<GameConfig>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let (Some(mut meshes), Some(mut materials)) = (meshes, materials) else { return; };
    let (r, g, b, a) = cfg.markers.color;
    commands.insert_resource(MarkerAssets {
        mesh: meshes.add(Mesh::from(Sphere { radius: cfg.markers.radius })),
        material: materials.add(StandardMaterial {
            base_color: Color::srgba(r, g, b, a),
            emissive: LinearRgba::new(3.0, 2.0, 0.3, 1.0) * 0.3,
            unlit: true,
            ..default()
        }),
    });
}
