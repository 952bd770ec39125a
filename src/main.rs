use tracing::{info, warn};

use infobot::{BotManager, Config, DryRunTransport};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("infobot.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load infobot.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = infobot::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        infobot::logging::init_console_only(&config.logging.level);
    }

    info!("InfoBot - room presence counter");
    let manager = BotManager::from_config(&config);
    info!(nick = %manager.nick(), "starting");

    // No protocol client is built in; rooms run on the dry-run transport.
    let joined = manager.join_configured(&config, DryRunTransport::new).await;
    if joined.is_empty() {
        warn!("no rooms configured");
    }
    for (name, _) in &joined {
        info!(room = %name, "room ready");
    }
    drop(joined);

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to wait for shutdown signal: {}", e);
    }

    let stopped = manager.shutdown().await;
    info!(rooms = stopped.len(), "shut down");
}
