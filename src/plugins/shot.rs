// Shot aiming state, commit and application of received shots.
//
// Aim cycle: Idle -> ParametersChanged -> Predicted -> Committed -> Idle.
// Input events drive transitions; prediction itself lives in trajectory.rs
// and replication in network.rs.
use bevy::prelude::*;
use bevy_rapier3d::prelude::ExternalImpulse;

use crate::plugins::config::GameConfig;
use crate::plugins::core_sim::ShotSet;
use crate::plugins::pairing::PairingRegistry;

/// Normalized aim inputs. Both fractions live in [0, 1].
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ShotParams {
    pub direction_fraction: f32,
    pub force_fraction: f32,
}
impl Default for ShotParams {
    fn default() -> Self { Self { direction_fraction: 0.5, force_fraction: 0.0 } }
}

impl ShotParams {
    /// Heading angle in degrees around +Y; 0.5 maps to 0 (facing +X).
    pub fn heading_degrees(&self) -> f32 { self.direction_fraction * 360.0 - 180.0 }

    /// Unit horizontal shot direction.
    pub fn direction(&self) -> Vec3 {
        Quat::from_rotation_y(self.heading_degrees().to_radians()) * Vec3::X
    }

    pub fn force(&self, max_hit_force: f32) -> Vec3 {
        self.direction() * self.force_fraction * max_hit_force
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AimPhase {
    #[default]
    Idle,
    ParametersChanged,
    Predicted,
    Committed,
}

#[derive(Resource, Debug, Default)]
pub struct AimState {
    pub phase: AimPhase,
    pub shots_sent: u32,
}

// ---------------- Events ----------------

/// Slider-style inputs; values outside [0, 1] are clamped.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum AimInput {
    Direction(f32),
    Force(f32),
}

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct CommitShot;

/// Emitted after a prediction has rebuilt the marker set.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkersUpdated {
    pub count: usize,
}

/// Emitted when a shot is committed locally; carries the force to replicate.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ShotSent {
    pub force: Vec3,
}

/// A replicated shot (remote or local echo) to apply to the main world.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ShootReceived {
    pub force: Vec3,
}

pub struct ShotPlugin;
impl Plugin for ShotPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ShotParams>()
            .init_resource::<AimState>()
            .add_event::<AimInput>()
            .add_event::<CommitShot>()
            .add_event::<MarkersUpdated>()
            .add_event::<ShotSent>()
            .add_event::<ShootReceived>()
            .add_systems(Update, (settle_committed, apply_aim_input).chain().in_set(ShotSet::Aim))
            .add_systems(Update, commit_shots.in_set(ShotSet::Aim).after(apply_aim_input))
            .add_systems(Update, apply_received_shots.in_set(ShotSet::Apply));
    }
}

// ---------------- Systems ----------------

fn settle_committed(mut aim: ResMut<AimState>) {
    if aim.phase == AimPhase::Committed {
        aim.phase = AimPhase::Idle;
    }
}

pub fn apply_aim_input(
    mut ev: EventReader<AimInput>,
    mut params: ResMut<ShotParams>,
    mut aim: ResMut<AimState>,
) {
    for input in ev.read() {
        match *input {
            AimInput::Direction(v) => params.direction_fraction = clamp_fraction(v),
            AimInput::Force(v) => params.force_fraction = clamp_fraction(v),
        }
        aim.phase = AimPhase::ParametersChanged;
    }
}

fn clamp_fraction(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

pub fn commit_shots(
    mut ev: EventReader<CommitShot>,
    cfg: Res<GameConfig>,
    params: Res<ShotParams>,
    mut aim: ResMut<AimState>,
    mut ev_sent: EventWriter<ShotSent>,
) {
    for _ in ev.read() {
        let force = params.force(cfg.shot.max_hit_force);
        aim.phase = AimPhase::Committed;
        aim.shots_sent += 1;
        info!("SHOT commit n={} force=({:.2},{:.2},{:.2})", aim.shots_sent, force.x, force.y, force.z);
        ev_sent.send(ShotSent { force });
    }
}

fn apply_received_shots(
    mut commands: Commands,
    mut ev: EventReader<ShootReceived>,
    cfg: Res<GameConfig>,
    registry: Res<PairingRegistry>,
    mut q_impulse: Query<&mut ExternalImpulse>,
) {
    for shot in ev.read() {
        let visual = match registry.require(&cfg.scene.hit_ball) {
            Ok((visual, _)) => visual,
            Err(e) => {
                error!("SHOT dropped: {e}");
                continue;
            }
        };
        match q_impulse.get_mut(visual) {
            Ok(mut imp) => imp.impulse += shot.force,
            Err(_) => {
                commands.entity(visual).insert(ExternalImpulse { impulse: shot.force, torque_impulse: Vec3::ZERO });
            }
        }
        info!("SHOT applied force=({:.2},{:.2},{:.2})", shot.force.x, shot.force.y, shot.force.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_faces_positive_x() {
        let p = ShotParams { direction_fraction: 0.5, force_fraction: 1.0 };
        assert!(p.direction().distance(Vec3::X) < 1e-6);
    }

    #[test]
    fn quarter_turn_faces_negative_z() {
        // +90 degrees around +Y takes +X to -Z.
        let p = ShotParams { direction_fraction: 0.75, force_fraction: 1.0 };
        assert!(p.direction().distance(Vec3::NEG_Z) < 1e-5);
    }

    #[test]
    fn clamp_handles_out_of_range() {
        assert_eq!(clamp_fraction(1.5), 1.0);
        assert_eq!(clamp_fraction(-0.2), 0.0);
        assert_eq!(clamp_fraction(f32::NAN), 0.0);
    }
}
