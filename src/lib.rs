//! Library entry for integration tests & the relay binary.
//! Exposes plugin modules, networking and a prelude for common types.

pub mod plugins {
    pub mod core_sim;
    pub mod config;
    pub mod pairing;
    pub mod shadow_world;
    pub mod scene;
    pub mod hidden_scene;
    pub mod markers;
    pub mod trajectory;
    pub mod shot;
    pub mod network;
    pub mod aim_input;
    pub mod hud;
    pub mod view;
}
pub mod net;
pub mod error;
pub mod prelude;
