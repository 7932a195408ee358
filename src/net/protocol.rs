use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProtocolError;

pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMsg {
    #[serde(rename = "shoot")]
    Shoot { force: [f32; 3] },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome {
        #[serde(rename = "protocolVersion")]
        protocol_version: u32,
        #[serde(rename = "peerId")]
        peer_id: Uuid,
    },
    /// A shot from `from`, delivered to every peer including the sender.
    /// Replayed to late joiners from the relay's buffer.
    #[serde(rename = "shoot")]
    Shoot {
        from: Uuid,
        force: [f32; 3],
        #[serde(default)]
        buffered: bool,
    },
}

pub fn check_force(force: [f32; 3]) -> Result<[f32; 3], ProtocolError> {
    if force.iter().all(|c| c.is_finite()) {
        Ok(force)
    } else {
        Err(ProtocolError::NonFiniteForce(force))
    }
}

/// Accepts a relay's `Welcome` only when both sides speak the same version.
pub fn check_version(server: u32) -> Result<(), ProtocolError> {
    if server == PROTOCOL_VERSION {
        Ok(())
    } else {
        Err(ProtocolError::VersionMismatch { server, client: PROTOCOL_VERSION })
    }
}

pub fn decode_client(text: &str) -> Result<ClientMsg, ProtocolError> {
    let msg: ClientMsg = serde_json::from_str(text)?;
    match &msg {
        ClientMsg::Shoot { force } => {
            check_force(*force)?;
        }
    }
    Ok(msg)
}

pub fn decode_server(text: &str) -> Result<ServerMsg, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}
