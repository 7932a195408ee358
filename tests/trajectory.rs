mod common;

use bevy::prelude::*;
use bevy::ecs::event::Events;
use bevy::ecs::system::RunSystemOnce;
use bevy_rapier3d::prelude::ExternalImpulse;
use shadow_shot::prelude::*;

use common::{build_app, marker_entity_count, marker_positions, open_air_config, send};

#[test]
fn one_second_at_fifty_hz_yields_fifty_markers() {
    let mut app = build_app(open_air_config());
    assert_eq!(app.world().resource::<MarkerSet>().len(), 0);

    send(&mut app, AimInput::Force(0.5));
    app.update();

    assert_eq!(app.world().resource::<MarkerSet>().len(), 50);
    assert_eq!(marker_entity_count(&mut app), 50);
    assert_eq!(app.world().resource::<ShadowWorld>().steps_taken(), 50);
    assert_eq!(app.world().resource::<AimState>().phase, AimPhase::Predicted);

    let events = app.world().resource::<Events<MarkersUpdated>>();
    let mut reader = events.get_reader();
    let counts: Vec<usize> = reader.read(events).map(|e| e.count).collect();
    assert_eq!(counts, vec![50]);
}

#[test]
fn markers_follow_the_kicked_ball() {
    let mut app = build_app(open_air_config());
    send(&mut app, AimInput::Force(0.5));
    app.update();

    // direction 0.5 faces +X; impulse 0.5 * 10 on a 2 kg ball => 2.5 m/s.
    let points = marker_positions(&app);
    for (k, p) in points.iter().enumerate() {
        let t = (k + 1) as f32 * 0.02;
        assert!((p.x - (1.0 + 2.5 * t)).abs() < 1e-3, "step {k}: x={}", p.x);
        assert!((p.z + 2.0).abs() < 1e-4, "step {k}: z={}", p.z);
    }
    for w in points.windows(2) {
        assert!(w[1].y < w[0].y, "ball must keep falling in open air");
    }
    assert!(points[0].y < 5.0);
}

#[test]
fn repeated_prediction_is_idempotent() {
    let mut app = build_app(open_air_config());
    send(&mut app, AimInput::Force(0.8));
    app.update();
    let first = marker_positions(&app);

    send(&mut app, AimInput::Force(0.8));
    app.update();
    let second = marker_positions(&app);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert!(a.distance(*b) < 1e-5, "{a:?} != {b:?}");
    }
    // old markers were despawned, not left behind
    assert_eq!(marker_entity_count(&mut app), 50);
}

#[test]
fn cleanup_empties_the_marker_set() {
    let mut app = build_app(open_air_config());
    send(&mut app, AimInput::Force(0.4));
    app.update();
    assert_eq!(marker_entity_count(&mut app), 50);

    app.world_mut().run_system_once(|mut commands: Commands, mut markers: ResMut<MarkerSet>| {
        markers.cleanup(&mut commands);
    });

    let markers = app.world().resource::<MarkerSet>();
    assert_eq!(markers.len(), 0);
    assert!(markers.is_empty());
    assert_eq!(marker_entity_count(&mut app), 0);
}

#[test]
fn prediction_starts_from_current_visual_pose() {
    let mut app = build_app(open_air_config());
    let visual = app.world().resource::<PairingRegistry>().get("hitBall").and_then(|p| p.visual).unwrap();
    app.world_mut().get_mut::<Transform>(visual).unwrap().translation = Vec3::new(-4.0, 10.0, 3.0);

    send(&mut app, AimInput::Force(0.0));
    app.update();

    let points = marker_positions(&app);
    assert_eq!(points.len(), 50);
    // zero force: straight drop from the new pose
    assert!((points[0].x + 4.0).abs() < 1e-4);
    assert!((points[0].z - 3.0).abs() < 1e-4);
    assert!(points[0].y < 10.0 && points[0].y > 9.9);
}

#[test]
fn partial_step_is_truncated() {
    let mut cfg = open_air_config();
    cfg.shot.simulation_time = 0.05;
    let mut app = build_app(cfg);
    send(&mut app, AimInput::Direction(0.25));
    app.update();
    // 0.05 / 0.02 = 2.5 -> 2 steps (floor, not ceil)
    assert_eq!(app.world().resource::<MarkerSet>().len(), 2);
}

#[test]
fn step_cap_bounds_marker_count() {
    let mut cfg = open_air_config();
    cfg.shot.simulation_time = 100.0;
    cfg.shot.max_prediction_steps = 40;
    let mut app = build_app(cfg);
    send(&mut app, AimInput::Force(0.1));
    app.update();
    assert_eq!(app.world().resource::<MarkerSet>().len(), 40);
}

#[test]
fn missing_physics_half_skips_prediction() {
    let mut app = build_app(open_air_config());
    send(&mut app, AimInput::Force(0.3));
    app.update();
    assert_eq!(app.world().resource::<MarkerSet>().len(), 50);

    let hidden = app.world().resource::<PairingRegistry>().get("hitBall").and_then(|p| p.physics).unwrap();
    app.world_mut().despawn(hidden);
    send(&mut app, AimInput::Force(0.9));
    app.update();

    // previous trajectory stays; nothing new was predicted
    assert_eq!(app.world().resource::<MarkerSet>().len(), 50);
    assert_eq!(app.world().resource::<AimState>().phase, AimPhase::Idle);
    assert!(app.world().resource::<PairingRegistry>().get("hitBall").unwrap().physics.is_none());
}

#[test]
fn commit_applies_force_to_visual_ball_offline() {
    let mut app = build_app(open_air_config());
    send(&mut app, AimInput::Direction(0.75));
    send(&mut app, AimInput::Force(1.0));
    app.update();
    send(&mut app, CommitShot);
    app.update();

    let aim = app.world().resource::<AimState>();
    assert_eq!(aim.phase, AimPhase::Committed);
    assert_eq!(aim.shots_sent, 1);

    let visual = app.world().resource::<PairingRegistry>().get("hitBall").and_then(|p| p.visual).unwrap();
    let imp = app.world().get::<ExternalImpulse>(visual).unwrap();
    // heading +90 degrees: -Z at full force
    assert!(imp.impulse.distance(Vec3::new(0.0, 0.0, -10.0)) < 1e-4, "impulse={:?}", imp.impulse);

    // the hidden ball is never kicked by a commit
    let hidden = app.world().resource::<PairingRegistry>().get("hitBall").and_then(|p| p.physics).unwrap();
    assert!(app.world().get::<ExternalImpulse>(hidden).is_none());

    app.update();
    assert_eq!(app.world().resource::<AimState>().phase, AimPhase::Idle);
}
