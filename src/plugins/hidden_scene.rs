// Strips render components from the hidden scene so the duplicated
// hierarchy used for prediction never draws. Runs once after startup.
use bevy::prelude::*;

use crate::plugins::scene::HiddenSceneRoot;

#[derive(Resource, Debug, Clone, Copy)]
pub struct HiddenSceneSanitized {
    pub stripped: usize,
}

pub struct HiddenScenePlugin;
impl Plugin for HiddenScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostStartup, sanitize_hidden_scene);
    }
}

pub fn sanitize_hidden_scene(
    mut commands: Commands,
    done: Option<Res<HiddenSceneSanitized>>,
    q_roots: Query<Entity, With<HiddenSceneRoot>>,
    q_children: Query<&Children>,
    q_render: Query<(), Or<(With<Handle<Mesh>>, With<Handle<StandardMaterial>>)>>,
) {
    if done.is_some() { return; }
    let mut visited = 0usize;
    let mut stripped = 0usize;
    for root in &q_roots {
        strip_recursive(root, &mut commands, &q_children, &q_render, &mut visited, &mut stripped);
    }
    info!("HIDDEN sanitized visited={} stripped={}", visited, stripped);
    commands.insert_resource(HiddenSceneSanitized { stripped });
}

fn strip_recursive(
    entity: Entity,
    commands: &mut Commands,
    q_children: &Query<&Children>,
    q_render: &Query<(), Or<(With<Handle<Mesh>>, With<Handle<StandardMaterial>>)>>,
    visited: &mut usize,
    stripped: &mut usize,
) {
    *visited += 1;
    if q_render.contains(entity) {
        commands
            .entity(entity)
            .remove::<(Handle<Mesh>, Handle<StandardMaterial>)>();
        *stripped += 1;
    }
    commands.entity(entity).insert(Visibility::Hidden);
    if let Ok(children) = q_children.get(entity) {
        for &child in children.iter() {
            strip_recursive(child, commands, q_children, q_render, visited, stripped);
        }
    }
}
