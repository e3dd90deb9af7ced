use ackqueue::broker::Broker;
use ackqueue::config::load_config;
use ackqueue::transport::websocket::start_websocket_server;
use ackqueue::utils::logging;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = load_config().expect("Failed to load configuration");
    logging::init(&config.logging.level);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let broker = Broker::new(config.broker.ttl());
    info!(ttl_ms = config.broker.ttl_ms, "broker started");

    tokio::select! {
        result = start_websocket_server(&addr, broker.clone()) => {
            if let Err(e) = result {
                error!("WebSocket server failed on {addr}: {e}");
            }
        }
        _ = tokio::signal::ctrl_c() => info!("shutdown requested"),
    }

    if let Err(e) = broker.close() {
        error!("Failed to close broker: {e}");
    }
}
