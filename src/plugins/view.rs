use bevy::prelude::*;

use crate::plugins::config::GameConfig;

pub struct ViewPlugin;
impl Plugin for ViewPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_view);
    }
}

// Fixed three-quarter view over the hit ball plus a sun.
fn spawn_view(mut commands: Commands, cfg: Res<GameConfig>) {
    let focus = cfg
        .scene
        .bodies
        .iter()
        .find(|b| b.name == cfg.scene.hit_ball)
        .map(|b| b.position.to_vec3())
        .unwrap_or(Vec3::ZERO);
    commands.spawn(Camera3dBundle {
        transform: Transform::from_translation(focus + Vec3::new(-6.0, 7.0, 9.0)).looking_at(focus, Vec3::Y),
        ..default()
    });
    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight { illuminance: 9000.0, shadows_enabled: true, ..default() },
        transform: Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
}
