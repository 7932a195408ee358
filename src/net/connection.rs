use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::time::Duration;

use bevy::prelude::{Resource, Vec3};
use uuid::Uuid;

use super::protocol::{check_version, decode_server, ClientMsg, ServerMsg};
use crate::error::ProtocolError;

#[derive(Debug, Clone, PartialEq)]
pub enum NetEvent {
    Connected,
    Disconnected,
    Message(ServerMsg),
    ProtocolMismatch { server: u32, client: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

type CmdSender = tokio::sync::mpsc::UnboundedSender<ClientMsg>;

/// Game-side handle to the relay. The socket lives on a background thread
/// with its own tokio runtime; events are drained once per frame.
#[derive(Resource)]
pub struct ShotConnection {
    pub state: ConnectionState,
    pub peer_id: Option<Uuid>,
    pub protocol_mismatch: bool,
    event_rx: Mutex<Receiver<NetEvent>>,
    cmd_tx: Option<CmdSender>,
}

impl ShotConnection {
    pub fn connect(url: String) -> Self {
        let (event_tx, event_rx) = mpsc::channel::<NetEvent>();
        let cmd_tx = Some(spawn_network_thread(url, event_tx));
        Self::with_channels(event_rx, cmd_tx)
    }

    fn with_channels(event_rx: Receiver<NetEvent>, cmd_tx: Option<CmdSender>) -> Self {
        Self {
            state: ConnectionState::Connecting,
            peer_id: None,
            protocol_mismatch: false,
            event_rx: Mutex::new(event_rx),
            cmd_tx,
        }
    }

    pub fn poll_events(&mut self) -> Vec<NetEvent> {
        let mut out = Vec::new();
        if let Ok(rx) = self.event_rx.lock() {
            while let Ok(evt) = rx.try_recv() {
                out.push(evt);
            }
        }
        out
    }

    /// Queues a shot for the relay. Returns false if the network thread is gone.
    pub fn send_shoot(&self, force: Vec3) -> bool {
        self.send(ClientMsg::Shoot { force: force.to_array() })
    }

    fn send(&self, msg: ClientMsg) -> bool {
        match &self.cmd_tx {
            Some(tx) => tx.send(msg).is_ok(),
            None => false,
        }
    }

    pub fn label(&self) -> String {
        if self.protocol_mismatch {
            return "protocol mismatch".to_string();
        }
        match self.state {
            ConnectionState::Connecting => "connecting".to_string(),
            ConnectionState::Connected => "connected".to_string(),
            ConnectionState::Disconnected => "disconnected".to_string(),
        }
    }
}

/// A `Welcome` from a relay speaking another protocol version.
fn welcome_mismatch(msg: &ServerMsg) -> Option<NetEvent> {
    let ServerMsg::Welcome { protocol_version, .. } = msg else { return None; };
    match check_version(*protocol_version) {
        Err(ProtocolError::VersionMismatch { server, client }) => Some(NetEvent::ProtocolMismatch { server, client }),
        _ => None,
    }
}

fn spawn_network_thread(url: String, event_tx: Sender<NetEvent>) -> CmdSender {
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    let (cmd_tx, mut cmd_rx) = tokio::sync::mpsc::unbounded_channel::<ClientMsg>();

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_io()
            .enable_time()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                bevy::log::error!("NET runtime start failed: {e}");
                let _ = event_tx.send(NetEvent::Disconnected);
                return;
            }
        };

        rt.block_on(async move {
            let mut reconnect_delay = Duration::from_millis(1000);
            let max_delay = Duration::from_millis(30_000);

            loop {
                let connect = tokio_tungstenite::connect_async(url.as_str()).await;

                let (ws_stream, _) = match connect {
                    Ok(x) => x,
                    Err(e) => {
                        bevy::log::debug!("NET connect failed url={} error={}", url, e);
                        let _ = event_tx.send(NetEvent::Disconnected);
                        tokio::time::sleep(reconnect_delay).await;
                        reconnect_delay = (reconnect_delay.mul_f32(1.5)).min(max_delay);
                        continue;
                    }
                };

                reconnect_delay = Duration::from_millis(1000);
                let _ = event_tx.send(NetEvent::Connected);

                let (mut write, mut read) = ws_stream.split();

                loop {
                    tokio::select! {
                        biased;

                        cmd = cmd_rx.recv() => {
                            let Some(cmd) = cmd else {
                                // Game side dropped the connection handle.
                                let _ = write.close().await;
                                return;
                            };
                            if let Ok(text) = serde_json::to_string(&cmd) {
                                if write.send(Message::Text(text.into())).await.is_err() {
                                    break;
                                }
                            }
                        }

                        msg = read.next() => {
                            match msg {
                                Some(Ok(Message::Text(txt))) => {
                                    match decode_server(txt.as_str()) {
                                        Ok(server_msg) => {
                                            if let Some(mismatch) = welcome_mismatch(&server_msg) {
                                                bevy::log::warn!("NET rejecting relay: {:?}", mismatch);
                                                let _ = event_tx.send(mismatch);
                                                let _ = write.close().await;
                                                break;
                                            }
                                            let _ = event_tx.send(NetEvent::Message(server_msg));
                                        }
                                        Err(e) => bevy::log::warn!("NET bad server message: {e}"),
                                    }
                                }
                                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                                Some(Ok(_)) => {}
                            }
                        }
                    }
                }

                let _ = event_tx.send(NetEvent::Disconnected);
                tokio::time::sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay.mul_f32(1.5)).min(max_delay);
            }
        });
    });

    cmd_tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::protocol::PROTOCOL_VERSION;

    #[test]
    fn poll_drains_queued_events() {
        let (tx, rx) = mpsc::channel();
        let mut conn = ShotConnection::with_channels(rx, None);
        tx.send(NetEvent::Connected).unwrap();
        tx.send(NetEvent::Disconnected).unwrap();
        assert_eq!(conn.poll_events(), vec![NetEvent::Connected, NetEvent::Disconnected]);
        assert!(conn.poll_events().is_empty());
    }

    #[test]
    fn only_foreign_welcome_is_a_mismatch() {
        let welcome = |v| ServerMsg::Welcome { protocol_version: v, peer_id: Uuid::nil() };
        assert_eq!(welcome_mismatch(&welcome(PROTOCOL_VERSION)), None);
        assert_eq!(
            welcome_mismatch(&welcome(PROTOCOL_VERSION + 1)),
            Some(NetEvent::ProtocolMismatch { server: PROTOCOL_VERSION + 1, client: PROTOCOL_VERSION })
        );
        let shot = ServerMsg::Shoot { from: Uuid::nil(), force: [0.0; 3], buffered: false };
        assert_eq!(welcome_mismatch(&shot), None);
    }

    #[test]
    fn send_without_thread_reports_failure() {
        let (_tx, rx) = mpsc::channel();
        let conn = ShotConnection::with_channels(rx, None);
        assert!(!conn.send_shoot(Vec3::X));
    }
}
