// triage-server/src/main.rs
// Service entry point

use std::env;
use tracing::{error, info};
use triage_config::TriageConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Optional TOML file, then TRIAGE_* env overrides on top
    let mut config = match env::var("TRIAGE_CONFIG") {
        Ok(path) => TriageConfig::from_file(&path)?,
        Err(_) => TriageConfig::default(),
    };
    config.apply_env_overrides()?;

    info!("Starting triage server");
    info!("Bind address: {}", config.server.bind_address);
    info!(
        "Broker: {}:{} (key '{}')",
        config.broker.host, config.broker.port, config.broker.queue_key
    );
    info!("Snapshot path: {}", config.queue.snapshot_path);

    match triage_server::run(config).await {
        Ok(()) => {
            info!("Server stopped");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "Server error");
            Err(err)
        }
    }
}
