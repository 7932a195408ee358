use shadow_shot::net::relay::{serve, RelayConfig, RelayState};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RelayConfig::from_env();
    let state = RelayState::new(config.broadcast_capacity);

    let listener = match TcpListener::bind(&config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("shot relay listening on {}", config.listen_addr);

    if let Err(e) = serve(listener, state).await {
        tracing::error!("relay stopped: {}", e);
        std::process::exit(1);
    }
}
