// Shot replication: committed shots go to the relay (or straight back to
// this client when offline); shots from the relay become ShootReceived.
use bevy::prelude::*;

use crate::net::connection::{ConnectionState, NetEvent, ShotConnection};
use crate::net::protocol::{check_force, ServerMsg};
use crate::plugins::config::GameConfig;
use crate::plugins::core_sim::ShotSet;
use crate::plugins::shot::{ShootReceived, ShotSent};

pub struct NetworkPlugin;

#[derive(Resource, Debug)]
pub struct NetworkStatus {
    pub label: String,
    pub shots_received: u32,
}

impl Default for NetworkStatus {
    fn default() -> Self { Self { label: "offline".to_string(), shots_received: 0 } }
}

impl Plugin for NetworkPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NetworkStatus>()
            .add_systems(Startup, connect_if_enabled)
            .add_systems(Update, (poll_network, send_shots).chain().in_set(ShotSet::Dispatch));
    }
}

fn connect_if_enabled(mut commands: Commands, cfg: Res<GameConfig>, mut status: ResMut<NetworkStatus>) {
    if !cfg.net.enabled {
        info!("NET disabled; shots echo locally");
        return;
    }
    info!("NET connecting url={}", cfg.net.url);
    status.label = "connecting".to_string();
    commands.insert_resource(ShotConnection::connect(cfg.net.url.clone()));
}

fn poll_network(
    conn: Option<ResMut<ShotConnection>>,
    mut status: ResMut<NetworkStatus>,
    mut ev_received: EventWriter<ShootReceived>,
) {
    let Some(mut conn) = conn else { return; };
    for evt in conn.poll_events() {
        match evt {
            NetEvent::Connected => {
                info!("NET connected");
                conn.state = ConnectionState::Connected;
                conn.protocol_mismatch = false;
            }
            NetEvent::Disconnected => {
                if conn.state != ConnectionState::Disconnected {
                    warn!("NET disconnected");
                }
                conn.state = ConnectionState::Disconnected;
            }
            NetEvent::ProtocolMismatch { server, client } => {
                error!("NET protocol mismatch server={} client={}", server, client);
                conn.protocol_mismatch = true;
            }
            NetEvent::Message(ServerMsg::Welcome { peer_id, .. }) => {
                info!("NET welcome peer_id={}", peer_id);
                conn.peer_id = Some(peer_id);
            }
            NetEvent::Message(ServerMsg::Shoot { from, force, buffered }) => {
                match check_force(force) {
                    Ok(force) => {
                        debug!("NET shoot from={} buffered={}", from, buffered);
                        status.shots_received += 1;
                        ev_received.send(ShootReceived { force: Vec3::from_array(force) });
                    }
                    Err(e) => warn!("NET dropped shot from={}: {}", from, e),
                }
            }
        }
    }
    status.label = conn.label();
}

fn send_shots(
    conn: Option<Res<ShotConnection>>,
    mut ev_sent: EventReader<ShotSent>,
    mut ev_received: EventWriter<ShootReceived>,
) {
    for shot in ev_sent.read() {
        match conn.as_ref() {
            Some(conn) => {
                if !conn.send_shoot(shot.force) {
                    debug!("NET shot not queued; network thread gone");
                }
            }
            // Offline: the local echo stands in for the relay broadcast.
            None => {
                ev_received.send(ShootReceived { force: shot.force });
            }
        }
    }
}
