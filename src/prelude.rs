//! Convenience re-exports for frequently used types & plugins.
pub use crate::error::{ConfigError, PairSide, ProtocolError, ShotError};
pub use crate::plugins::core_sim::{CoreSimPlugin, ShotSet, SimState};
pub use crate::plugins::config::{BodyDef, BodyKind, GameConfig, SceneDef, ShapeDef, Vec3Def};
pub use crate::plugins::pairing::{PairId, Pairing, PairingPlugin, PairingRegistry, ShotBody, WorldKind};
pub use crate::plugins::shadow_world::{ShadowBody, ShadowWorld, ShadowWorldPlugin};
pub use crate::plugins::scene::{HiddenSceneRoot, ScenePlugin, VisualBody};
pub use crate::plugins::hidden_scene::{HiddenScenePlugin, HiddenSceneSanitized};
pub use crate::plugins::markers::{MarkerPlugin, MarkerSet, TrajectoryMarker};
pub use crate::plugins::trajectory::{prediction_steps, TrajectoryPlugin};
pub use crate::plugins::shot::{
    AimInput, AimPhase, AimState, CommitShot, MarkersUpdated, ShootReceived, ShotParams, ShotPlugin, ShotSent,
};
pub use crate::plugins::network::{NetworkPlugin, NetworkStatus};
pub use crate::plugins::aim_input::AimInputPlugin;
pub use crate::plugins::hud::HudPlugin;
pub use crate::plugins::view::ViewPlugin;

use bevy::app::{PluginGroup, PluginGroupBuilder};

/// Everything except input, HUD and view: enough to run headless.
pub struct GameplayPlugins;
impl PluginGroup for GameplayPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(CoreSimPlugin)
            .add(ShadowWorldPlugin)
            .add(PairingPlugin)
            .add(ScenePlugin)
            .add(HiddenScenePlugin)
            .add(MarkerPlugin)
            .add(ShotPlugin)
            .add(TrajectoryPlugin)
            .add(NetworkPlugin)
    }
}
