// Game configuration (RON): shot tuning, physics step, markers, networking and
// the scene root prefab instantiated into both physics worlds.
use bevy::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "assets/config/game.ron";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct Vec3Def { pub x: f32, pub y: f32, pub z: f32 }
impl Vec3Def {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub fn new(x: f32, y: f32, z: f32) -> Self { Self { x, y, z } }
    pub fn to_vec3(self) -> Vec3 { Vec3::new(self.x, self.y, self.z) }
}
impl Default for Vec3Def { fn default() -> Self { Self::ZERO } }

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ShotDef {
    /// Impulse magnitude applied at force fraction 1.0.
    pub max_hit_force: f32,
    /// Seconds of motion previewed by each prediction.
    pub simulation_time: f32,
    /// Upper bound on hidden-world steps per prediction.
    pub max_prediction_steps: u32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PhysicsDef {
    pub fixed_time_step: f32,
    pub gravity: Vec3Def,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct MarkerDef {
    pub radius: f32,
    pub color: (f32, f32, f32, f32),
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetDef {
    pub enabled: bool,
    pub url: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub enum ShapeDef {
    Ball { radius: f32 },
    Cuboid { half_extents: Vec3Def },
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind { Dynamic, Fixed }

// Visual-only child of a body (never simulated).
#[derive(Debug, Deserialize, Clone)]
pub struct DecorDef {
    pub shape: ShapeDef,
    #[serde(default)]
    pub offset: Vec3Def,
    pub color: (f32, f32, f32, f32),
}

fn default_mass() -> f32 { 1.0 }
fn default_friction() -> f32 { 0.5 }
fn default_color() -> (f32, f32, f32, f32) { (0.8, 0.8, 0.8, 1.0) }

#[derive(Debug, Deserialize, Clone)]
pub struct BodyDef {
    pub name: String,
    pub shape: ShapeDef,
    pub kind: BodyKind,
    pub position: Vec3Def,
    /// Euler angles in degrees (YXZ order).
    #[serde(default)]
    pub rotation_deg: Vec3Def,
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default)]
    pub restitution: f32,
    #[serde(default = "default_friction")]
    pub friction: f32,
    #[serde(default = "default_color")]
    pub color: (f32, f32, f32, f32),
    #[serde(default)]
    pub decor: Vec<DecorDef>,
}
impl BodyDef {
    pub fn transform(&self) -> Transform {
        let r = self.rotation_deg;
        Transform::from_translation(self.position.to_vec3()).with_rotation(Quat::from_euler(
            EulerRot::YXZ,
            r.y.to_radians(),
            r.x.to_radians(),
            r.z.to_radians(),
        ))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SceneDef {
    /// Name of the body that receives shots.
    pub hit_ball: String,
    pub bodies: Vec<BodyDef>,
}

#[derive(Debug, Deserialize, Clone, Resource)]
pub struct GameConfig {
    pub shot: ShotDef,
    pub physics: PhysicsDef,
    pub markers: MarkerDef,
    pub net: NetDef,
    pub scene: SceneDef,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            shot: ShotDef { max_hit_force: 12.0, simulation_time: 1.0, max_prediction_steps: 600 },
            physics: PhysicsDef { fixed_time_step: 0.02, gravity: Vec3Def::new(0.0, -9.81, 0.0) },
            markers: MarkerDef { radius: 0.06, color: (1.0, 0.85, 0.10, 1.0) },
            net: NetDef { enabled: false, url: "ws://127.0.0.1:9002/ws".into() },
            scene: SceneDef {
                hit_ball: "hitBall".into(),
                bodies: vec![
                    BodyDef {
                        name: "ground".into(),
                        shape: ShapeDef::Cuboid { half_extents: Vec3Def::new(20.0, 0.5, 20.0) },
                        kind: BodyKind::Fixed,
                        position: Vec3Def::new(0.0, -0.5, 0.0),
                        rotation_deg: Vec3Def::ZERO,
                        mass: 0.0,
                        restitution: 0.2,
                        friction: 0.6,
                        color: (0.20, 0.45, 0.22, 1.0),
                        decor: Vec::new(),
                    },
                    BodyDef {
                        name: "hitBall".into(),
                        shape: ShapeDef::Ball { radius: 0.25 },
                        kind: BodyKind::Dynamic,
                        position: Vec3Def::new(0.0, 0.25, 0.0),
                        rotation_deg: Vec3Def::ZERO,
                        mass: 1.0,
                        restitution: 0.4,
                        friction: 0.5,
                        color: (0.95, 0.95, 0.95, 1.0),
                        decor: Vec::new(),
                    },
                ],
            },
        }
    }
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let cfg = Self::from_ron(&data)?;
        Ok(cfg)
    }

    pub fn from_ron(data: &str) -> Result<Self, ConfigError> {
        let cfg: Self = ron::from_str(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dt = self.physics.fixed_time_step;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ConfigError::Invalid(format!("fixed_time_step must be > 0, got {dt}")));
        }
        let s = self.shot.simulation_time;
        if !(s.is_finite() && s >= 0.0) {
            return Err(ConfigError::Invalid(format!("simulation_time must be >= 0, got {s}")));
        }
        let m = self.shot.max_hit_force;
        if !(m.is_finite() && m > 0.0) {
            return Err(ConfigError::Invalid(format!("max_hit_force must be > 0, got {m}")));
        }
        if !self.scene.bodies.iter().any(|b| b.name == self.scene.hit_ball) {
            return Err(ConfigError::Invalid(format!(
                "hit_ball '{}' is not part of the scene",
                self.scene.hit_ball
            )));
        }
        for body in &self.scene.bodies {
            if body.kind == BodyKind::Dynamic && !(body.mass > 0.0) {
                return Err(ConfigError::Invalid(format!("body '{}' needs a positive mass", body.name)));
            }
        }
        Ok(())
    }

    pub fn fixed_time_step(&self) -> f32 { self.physics.fixed_time_step }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn shipped_config_parses() {
        let data = include_str!("../../assets/config/game.ron");
        let cfg = GameConfig::from_ron(data).expect("shipped config must be valid");
        assert_eq!(cfg.scene.hit_ball, "hitBall");
        assert!((cfg.physics.fixed_time_step - 0.02).abs() < 1e-6);
    }

    #[test]
    fn rejects_missing_hit_ball() {
        let mut cfg = GameConfig::default();
        cfg.scene.hit_ball = "nope".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_step() {
        let mut cfg = GameConfig::default();
        cfg.physics.fixed_time_step = 0.0;
        assert!(cfg.validate().is_err());
    }
}
