//! Error types shared by the gameplay plugins, the relay and its client.
use thiserror::Error;

/// Which half of a pairing entry a lookup needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    Visual,
    Physics,
}

impl std::fmt::Display for PairSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairSide::Visual => f.write_str("visual"),
            PairSide::Physics => f.write_str("physics"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ShotError {
    #[error("pairing '{name}' has no {side} representation")]
    MissingPairing { name: String, side: PairSide },
    #[error("body '{0}' has no shadow rigid body")]
    MissingShadowBody(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("force vector is not finite: {0:?}")]
    NonFiniteForce([f32; 3]),
    #[error("protocol version mismatch: server={server} client={client}")]
    VersionMismatch { server: u32, client: u32 },
}
