// Keyboard stand-in for the direction/force sliders and the hit button.
//   Left/Right : direction fraction
//   Up/Down    : force fraction
//   Space      : commit shot
use bevy::prelude::*;

use crate::plugins::core_sim::ShotSet;
use crate::plugins::shot::{AimInput, CommitShot, ShotParams};

/// Fraction change per second while a key is held.
const SLIDE_RATE: f32 = 0.35;

pub struct AimInputPlugin;
impl Plugin for AimInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, initial_prediction)
            .add_systems(Update, keyboard_aim.in_set(ShotSet::Register));
    }
}

// Show the resting trajectory as soon as the scene is up.
fn initial_prediction(params: Res<ShotParams>, mut ev_aim: EventWriter<AimInput>) {
    ev_aim.send(AimInput::Direction(params.direction_fraction));
}

fn keyboard_aim(
    time: Res<Time>,
    keys: Option<Res<ButtonInput<KeyCode>>>,
    params: Res<ShotParams>,
    mut ev_aim: EventWriter<AimInput>,
    mut ev_commit: EventWriter<CommitShot>,
) {
    let Some(keys) = keys else { return; };
    let step = SLIDE_RATE * time.delta_seconds();

    let mut dir = 0.0;
    if keys.pressed(KeyCode::ArrowLeft) { dir -= step; }
    if keys.pressed(KeyCode::ArrowRight) { dir += step; }
    if dir != 0.0 {
        ev_aim.send(AimInput::Direction(params.direction_fraction + dir));
    }

    let mut force = 0.0;
    if keys.pressed(KeyCode::ArrowDown) { force -= step; }
    if keys.pressed(KeyCode::ArrowUp) { force += step; }
    if force != 0.0 {
        ev_aim.send(AimInput::Force(params.force_fraction + force));
    }

    if keys.just_pressed(KeyCode::Space) {
        ev_commit.send(CommitShot);
    }
}
