use bevy::prelude::*;
use shadow_shot::prelude::*;

fn params(d: f32, f: f32) -> ShotParams {
    ShotParams { direction_fraction: d, force_fraction: f }
}

#[test]
fn direction_wraps_at_both_ends() {
    let start = params(0.0, 1.0).direction();
    let end = params(1.0, 1.0).direction();
    let mid = params(0.5, 1.0).direction();
    assert!(start.distance(end) < 1e-5, "{start:?} vs {end:?}");
    assert!(start.distance(-mid) < 1e-5, "d=0 must face away from d=0.5");
}

#[test]
fn direction_stays_horizontal_and_unit() {
    for i in 0..=20 {
        let d = params(i as f32 / 20.0, 1.0).direction();
        assert!(d.y.abs() < 1e-6);
        assert!((d.length() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn force_magnitude_is_fraction_times_max() {
    let max = 12.0;
    for fi in 0..=10 {
        for di in 0..=8 {
            let p = params(di as f32 / 8.0, fi as f32 / 10.0);
            let force = p.force(max);
            assert!((force.length() - p.force_fraction * max).abs() < 1e-4);
            if p.force_fraction > 0.0 {
                assert!(force.normalize().distance(p.direction()) < 1e-5);
            }
        }
    }
}

#[test]
fn default_aim_faces_positive_x_with_no_force() {
    let p = ShotParams::default();
    assert!(p.direction().distance(Vec3::X) < 1e-6);
    assert_eq!(p.force(12.0), Vec3::ZERO);
}
