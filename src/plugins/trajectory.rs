// Trajectory prediction: re-sync the shadow world from the visual world,
// kick the hit ball and step the shadow world in one burst, dropping a
// marker after every step.
use bevy::prelude::*;
use bevy_rapier3d::rapier::prelude::RigidBodyHandle;

use crate::error::{PairSide, ShotError};
use crate::plugins::config::GameConfig;
use crate::plugins::core_sim::ShotSet;
use crate::plugins::markers::{MarkerAssets, MarkerSet};
use crate::plugins::pairing::PairingRegistry;
use crate::plugins::shadow_world::{ShadowBody, ShadowWorld};
use crate::plugins::shot::{AimPhase, AimState, MarkersUpdated, ShotParams};

/// Number of hidden-world steps for a preview of `simulation_time` seconds.
/// Truncates (a trailing partial step is dropped) and never exceeds `cap`.
pub fn prediction_steps(simulation_time: f32, fixed_time_step: f32, cap: u32) -> usize {
    if !(simulation_time.is_finite() && fixed_time_step.is_finite()) || fixed_time_step <= 0.0 || simulation_time <= 0.0 {
        return 0;
    }
    let raw = (simulation_time / fixed_time_step) as usize;
    if raw > cap as usize {
        warn!("PREDICT step cap hit requested={} cap={}", raw, cap);
        return cap as usize;
    }
    raw
}

/// Pose to restore on a shadow body before a prediction run.
#[derive(Debug, Clone, Copy)]
pub struct ShadowPose {
    pub handle: RigidBodyHandle,
    pub translation: Vec3,
    pub rotation: Quat,
}

/// Runs one prediction on `shadow` and returns the hit body's position
/// after each of `steps` steps.
pub fn predict(
    shadow: &mut ShadowWorld,
    poses: &[ShadowPose],
    hit: RigidBodyHandle,
    impulse: Vec3,
    steps: usize,
) -> Vec<Vec3> {
    for p in poses {
        shadow.sync_pose(p.handle, p.translation, p.rotation);
    }
    shadow.apply_impulse(hit, impulse);
    let mut points = Vec::with_capacity(steps);
    for _ in 0..steps {
        shadow.step();
        if let Some(pos) = shadow.translation(hit) {
            points.push(pos);
        }
    }
    points
}

pub struct TrajectoryPlugin;
impl Plugin for TrajectoryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            predict_trajectory
                .in_set(ShotSet::Aim)
                .after(crate::plugins::shot::apply_aim_input)
                .before(crate::plugins::shot::commit_shots),
        );
    }
}

/// Collects the visual pose of every pairing, keyed to its shadow body, and
/// the shadow body of the hit ball.
fn gather_poses(
    registry: &PairingRegistry,
    hit_ball: &str,
    q_visual: &Query<&Transform, Without<ShadowBody>>,
    q_shadow: &Query<&ShadowBody>,
) -> Result<(Vec<ShadowPose>, RigidBodyHandle), ShotError> {
    let mut poses = Vec::with_capacity(registry.len());
    let mut hit = None;
    for (_, pair) in registry.iter() {
        let (visual, physics) = pair.require()?;
        let t = q_visual.get(visual).map_err(|_| ShotError::MissingPairing {
            name: pair.name.clone(),
            side: PairSide::Visual,
        })?;
        let body = q_shadow
            .get(physics)
            .map_err(|_| ShotError::MissingShadowBody(pair.name.clone()))?;
        if pair.name == hit_ball {
            hit = Some(body.handle);
        }
        poses.push(ShadowPose { handle: body.handle, translation: t.translation, rotation: t.rotation });
    }
    let hit = hit.ok_or_else(|| ShotError::MissingPairing { name: hit_ball.to_string(), side: PairSide::Physics })?;
    Ok((poses, hit))
}

#[allow(clippy::too_many_arguments)]
fn predict_trajectory(
    mut commands: Commands,
    cfg: Res<GameConfig>,
    params: Res<ShotParams>,
    mut aim: ResMut<AimState>,
    registry: Res<PairingRegistry>,
    mut shadow: ResMut<ShadowWorld>,
    mut markers: ResMut<MarkerSet>,
    marker_assets: Option<Res<MarkerAssets>>,
    q_visual: Query<&Transform, Without<ShadowBody>>,
    q_shadow: Query<&ShadowBody>,
    mut ev_updated: EventWriter<MarkersUpdated>,
) {
    if aim.phase != AimPhase::ParametersChanged { return; }

    let (poses, hit) = match gather_poses(&registry, &cfg.scene.hit_ball, &q_visual, &q_shadow) {
        Ok(v) => v,
        Err(e) => {
            error!("PREDICT skipped: {e}");
            aim.phase = AimPhase::Idle;
            return;
        }
    };

    markers.cleanup(&mut commands);

    let steps = prediction_steps(cfg.shot.simulation_time, shadow.dt(), cfg.shot.max_prediction_steps);
    let force = params.force(cfg.shot.max_hit_force);
    let points = predict(&mut shadow, &poses, hit, force, steps);

    let assets = marker_assets.as_deref();
    for p in &points {
        markers.create(&mut commands, *p, assets);
    }
    debug!(
        "PREDICT steps={} markers={} force=({:.2},{:.2},{:.2}) shadow_steps_total={}",
        steps, markers.len(), force.x, force.y, force.z, shadow.steps_taken()
    );
    aim.phase = AimPhase::Predicted;
    ev_updated.send(MarkersUpdated { count: markers.len() });
}
