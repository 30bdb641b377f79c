use apm_demo::configuration::config::{CliArgs, Config};
use apm_demo::storage::database_storage::DatabaseStorage;
use apm_demo::web_interface::web_server::WebServer;
use clap::Parser;
use log::{error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // Logging is not up yet, so configuration errors go straight to stderr
    let config = Config::load(&args).unwrap_or_else(|e| {
        eprintln!("Unable to load configuration: {}", e);
        std::process::exit(1);
    });

    // RUST_LOG, when set, takes precedence over the configured level
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::new()
        .filter_level(config.level_filter().unwrap_or(log::LevelFilter::Info))
        .parse_default_env()
        .format_target(false)
        .init();

    println!(
        "
==============================================================================
                  APM demo service v{}
==============================================================================
",
        env!("CARGO_PKG_VERSION")
    );

    let addr = config.socket_addr().unwrap_or_else(|e| {
        error!("Invalid listen address: {}", e);
        std::process::exit(1);
    });

    info!("Opening database at {}", config.storage.database_path.display());
    let storage = DatabaseStorage::initialize(&config.storage.database_path)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        });

    let server = WebServer::new(Arc::new(storage), config.simulation.clone());
    if let Err(e) = server.start(addr).await {
        error!("Web server stopped with an error: {}", e);
        std::process::exit(1);
    }

    info!("Server stopped");
}
