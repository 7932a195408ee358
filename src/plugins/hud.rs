// HUD: status line plus a force bar mirroring the force slider.
use bevy::prelude::*;

use crate::plugins::core_sim::SimState;
use crate::plugins::markers::MarkerSet;
use crate::plugins::network::NetworkStatus;
use crate::plugins::shot::{AimState, ShotParams};

#[derive(Component)]
pub struct Hud;

#[derive(Component)]
pub struct ForceBar;
#[derive(Component)]
pub struct ForceBarFill;

pub struct HudPlugin;
impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud)
            .add_systems(Update, (update_hud, update_force_bar));
    }
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        TextBundle::from_section(
            "",
            TextStyle { font_size: 20.0, color: Color::WHITE, ..default() },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            top: Val::Px(8.0),
            ..default()
        }),
        Hud,
    ));

    commands
        .spawn((
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    right: Val::Px(12.0),
                    top: Val::Px(12.0),
                    width: Val::Px(180.0),
                    height: Val::Px(18.0),
                    padding: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                background_color: Color::srgb(0.08, 0.08, 0.10).into(),
                ..default()
            },
            ForceBar,
        ))
        .with_children(|parent| {
            parent.spawn((
                NodeBundle {
                    style: Style { width: Val::Percent(0.0), height: Val::Percent(100.0), ..default() },
                    background_color: Color::srgb(0.15, 0.60, 0.25).into(),
                    ..default()
                },
                ForceBarFill,
            ));
        });
}

fn update_hud(
    sim: Res<SimState>,
    params: Res<ShotParams>,
    aim: Res<AimState>,
    markers: Res<MarkerSet>,
    net: Res<NetworkStatus>,
    mut q_text: Query<&mut Text, With<Hud>>,
) {
    let Ok(mut text) = q_text.get_single_mut() else { return; };
    text.sections[0].value = format!(
        "Tick: {} (t={:.2}s) | Heading: {:+.0}° | Force: {:>3}% | Markers: {} | Shots: {} | Net: {}",
        sim.tick,
        sim.elapsed_seconds,
        params.heading_degrees(),
        (params.force_fraction * 100.0).round() as u32,
        markers.len(),
        aim.shots_sent,
        net.label,
    );
}

fn update_force_bar(
    params: Res<ShotParams>,
    mut q_fill: Query<(&mut Style, &mut BackgroundColor), With<ForceBarFill>>,
) {
    if !params.is_changed() { return; }
    let f = params.force_fraction;
    if let Ok((mut style, mut color)) = q_fill.get_single_mut() {
        style.width = Val::Percent(f * 100.0);
        // green -> yellow -> red
        let col = if f < 0.5 {
            let t = f / 0.5;
            Color::srgb(0.15 + 0.55 * t, 0.60 + 0.25 * t, 0.25 - 0.15 * t)
        } else {
            let t = (f - 0.5) / 0.5;
            Color::srgb(0.70 + 0.20 * t, 0.85 - 0.65 * t, 0.10 + 0.05 * t)
        };
        *color = col.into();
    }
}
