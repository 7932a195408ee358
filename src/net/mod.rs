//! Shot replication over WebSockets: the wire protocol, the game-side client
//! connection and the relay server that fans shots out to every peer.

pub mod connection;
pub mod protocol;
pub mod relay;
