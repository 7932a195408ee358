use bevy::prelude::*;
use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy_rapier3d::prelude::*;

use shadow_shot::plugins::config::{GameConfig, DEFAULT_CONFIG_PATH};
use shadow_shot::prelude::*;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    // Logging is not up yet; report config problems on stderr.
    let mut config = match GameConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Config {config_path} unusable, using defaults: {e}");
            GameConfig::default()
        }
    };
    if let Some(url) = args.windows(2).find(|w| w[0] == "--relay").map(|w| w[1].clone()) {
        config.net.enabled = true;
        config.net.url = url;
    }
    if args.iter().any(|a| a == "--offline") {
        config.net.enabled = false;
    }
    let diagnostics = args.iter().any(|a| a == "--diagnostics");

    let mut app = App::new();
    app.insert_resource(ClearColor(Color::srgb(0.52, 0.80, 0.92)))
        .insert_resource(Msaa::Sample4)
        .insert_resource(AmbientLight { color: Color::srgb(0.55, 0.55, 0.60), brightness: 600.0 })
        .insert_resource(config)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window { title: "Shadow Shot".into(), ..default() }),
            ..default()
        }))
        .add_plugins(GameplayPlugins)     // timing, both worlds, prediction, replication
        // main world steps once per fixed tick
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
        .add_plugins(AimInputPlugin)      // keyboard sliders + hit
        .add_plugins(HudPlugin)
        .add_plugins(ViewPlugin);
    if diagnostics {
        app.add_plugins(FrameTimeDiagnosticsPlugin)
            .add_plugins(LogDiagnosticsPlugin::default());
    }
    app.run();
}
