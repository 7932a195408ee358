use bevy::prelude::*;
use bevy::time::Fixed;
use bevy_rapier3d::prelude::{RapierConfiguration, TimestepMode};

use crate::plugins::config::GameConfig;
use crate::plugins::pairing::PairingRegistry;

// Core simulation timing & system ordering shared by the gameplay plugins.
// The main physics world (bevy_rapier) advances once per FixedUpdate tick.
#[derive(Resource, Default, Debug)]
pub struct SimState {
    pub tick: u64,
    pub elapsed_seconds: f32,
    pub fixed_time_step: f32,
}
impl SimState {
    pub fn new(fixed_time_step: f32) -> Self { Self { tick: 0, elapsed_seconds: 0.0, fixed_time_step } }
    pub fn advance_fixed(&mut self) {
        self.tick += 1;
        self.elapsed_seconds = self.tick as f32 * self.fixed_time_step;
    }
    pub fn ticks_per_second(&self) -> u64 {
        if self.fixed_time_step > 0.0 { (1.0 / self.fixed_time_step).round().max(1.0) as u64 } else { 1 }
    }
}

#[derive(Resource, Default)]
pub struct LogState { pub last_logged_second: u64 }

/// Ordering of the per-frame gameplay pipeline.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShotSet {
    /// New bodies enter the pairing registry.
    Register,
    /// Aim input, prediction and commit.
    Aim,
    /// Outbound shots and inbound network events.
    Dispatch,
    /// Received shots are applied to the main world.
    Apply,
}

pub struct CoreSimPlugin;
impl Plugin for CoreSimPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>(); // respect pre-inserted GameConfig (e.g. from --config)
        let dt = app.world().resource::<GameConfig>().fixed_time_step();
        app.insert_resource(SimState::new(dt))
            .insert_resource(LogState::default())
            .insert_resource(Time::<Fixed>::from_seconds(dt as f64))
            .configure_sets(
                Update,
                (ShotSet::Register, ShotSet::Aim, ShotSet::Dispatch, ShotSet::Apply).chain(),
            )
            .add_systems(Startup, configure_main_world)
            .add_systems(FixedUpdate, (tick_state, log_each_second).chain());
    }
}

// The main world takes exactly one configured step per fixed tick, with the
// same gravity as the shadow world, so committed shots follow the preview.
fn configure_main_world(cfg: Res<GameConfig>, rapier: Option<ResMut<RapierConfiguration>>) {
    let Some(mut rapier) = rapier else { return; };
    rapier.gravity = cfg.physics.gravity.to_vec3();
    rapier.timestep_mode = TimestepMode::Fixed { dt: cfg.fixed_time_step(), substeps: 1 };
    info!("SIM main world dt={} gravity={:?}", cfg.fixed_time_step(), rapier.gravity);
}

fn tick_state(mut sim: ResMut<SimState>) {
    sim.advance_fixed();
}

fn log_each_second(
    sim: Res<SimState>,
    cfg: Res<GameConfig>,
    registry: Option<Res<PairingRegistry>>,
    mut log_state: ResMut<LogState>,
    q_t: Query<&Transform>,
) {
    let per_second = sim.ticks_per_second();
    if sim.tick == 0 || sim.tick % per_second != 0 { return; }
    let current_second = sim.tick / per_second;
    if current_second == log_state.last_logged_second { return; }
    log_state.last_logged_second = current_second;
    let visual = registry.as_ref().and_then(|r| r.get(&cfg.scene.hit_ball)).and_then(|p| p.visual);
    if let Some(t) = visual.and_then(|e| q_t.get(e).ok()) {
        debug!("T+{}s tick={} ball=({:.2},{:.2},{:.2})",
            current_second, sim.tick,
            t.translation.x, t.translation.y, t.translation.z);
    }
}
