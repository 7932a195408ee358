use shadow_shot::prelude::*;
use bevy::prelude::*;
use bevy::time::Fixed;
use bevy_rapier3d::prelude::{RapierConfiguration, TimestepMode};

// Helper to build a minimal app (no assets/scene) for deterministic fixed tick tests.
fn build_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(CoreSimPlugin); // provides tick_state system in FixedUpdate
    app
}

#[test]
fn ticks_advance() {
    let mut app = build_app();
    // Directly run FixedUpdate schedule 5 times (bypasses time driver).
    for _ in 0..5 { app.world_mut().run_schedule(FixedUpdate); }
    let sim = app.world().get_resource::<SimState>().unwrap();
    assert_eq!(sim.tick, 5, "expected tick to be 5 after 5 fixed steps");
    assert!((sim.elapsed_seconds - 5.0 * 0.02).abs() < 1e-6);
}

#[test]
fn fixed_timestep_follows_config() {
    let mut app = App::new();
    let mut cfg = GameConfig::default();
    cfg.physics.fixed_time_step = 0.01;
    app.insert_resource(cfg)
        .add_plugins(MinimalPlugins)
        .add_plugins(CoreSimPlugin);
    let fixed = app.world().resource::<Time<Fixed>>();
    assert!((fixed.timestep().as_secs_f32() - 0.01).abs() < 1e-6);
    assert_eq!(app.world().resource::<SimState>().ticks_per_second(), 100);
}

#[test]
fn main_world_steps_with_configured_dt_and_gravity() {
    let mut app = App::new();
    let mut cfg = GameConfig::default();
    cfg.physics.fixed_time_step = 0.01;
    cfg.physics.gravity = Vec3Def::new(0.0, -3.0, 0.0);
    // what RapierPhysicsPlugin would insert (variable 1/60 step)
    app.insert_resource(RapierConfiguration::new(1.0))
        .insert_resource(cfg)
        .add_plugins(MinimalPlugins)
        .add_plugins(CoreSimPlugin);
    app.update();
    let rapier = app.world().resource::<RapierConfiguration>();
    assert_eq!(rapier.timestep_mode, TimestepMode::Fixed { dt: 0.01, substeps: 1 });
    assert_eq!(rapier.gravity, Vec3::new(0.0, -3.0, 0.0));
}
