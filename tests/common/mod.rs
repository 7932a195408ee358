#![allow(dead_code)]
use bevy::prelude::*;
use shadow_shot::prelude::*;

/// Free-floating hit ball (no ground within reach) so every step is pure
/// ballistic motion.
pub fn open_air_config() -> GameConfig {
    let mut cfg = GameConfig::default();
    cfg.scene.bodies.retain(|b| b.name == "hitBall");
    cfg.scene.bodies[0].position = Vec3Def::new(1.0, 5.0, -2.0);
    cfg.scene.bodies[0].mass = 2.0;
    cfg.shot.simulation_time = 1.0;
    cfg.physics.fixed_time_step = 0.02;
    cfg.shot.max_hit_force = 10.0;
    cfg
}

/// Headless app with the gameplay plugins; runs Startup and one Update so
/// both worlds are spawned and registered.
pub fn build_app(cfg: GameConfig) -> App {
    let mut app = App::new();
    app.insert_resource(cfg)
        .add_plugins(MinimalPlugins)
        .add_plugins(GameplayPlugins);
    app.update();
    app
}

pub fn marker_positions(app: &App) -> Vec<Vec3> {
    let set = app.world().resource::<MarkerSet>();
    set.entities()
        .iter()
        .map(|e| app.world().get::<Transform>(*e).expect("marker has a transform").translation)
        .collect()
}

pub fn marker_entity_count(app: &mut App) -> usize {
    let world = app.world_mut();
    let mut q = world.query::<&TrajectoryMarker>();
    q.iter(world).count()
}

pub fn send<E: Event>(app: &mut App, event: E) {
    app.world_mut().send_event(event);
}
