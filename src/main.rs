//! MNEE API Gateway
//!
//! REST wrapper around the MNEE 1Sat token client.
//!
//! ## Overview
//!
//! The gateway:
//! 1. Loads configuration from `config/mnee-api.toml` (optional) and the environment
//! 2. Builds the MNEE client once, refusing to start without an API key
//! 3. Serves balance, UTXO, history, transfer and ticket endpoints
//!
//! Private keys (WIFs) arrive per request and are never stored.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use mnee_api::{init_mnee_client, ApiServer, Config, MneeApi};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging for debugging and monitoring
    tracing_subscriber::fmt::init();

    info!("Starting MNEE API gateway");

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("MNEE API gateway");
        println!();
        println!("Usage: mnee-api [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --config <path>   Use custom config file path");
        println!("  --help, -h        Show this help message");
        println!();
        println!("Environment variables:");
        println!("  MNEE_API_KEY           MNEE API key (required)");
        println!("  MNEE_ENV               production | sandbox (default: sandbox)");
        println!("  PORT                   Listener port (default: 8080)");
        println!("  API_HOST               Listener host (default: 0.0.0.0)");
        println!("  CORS_ORIGINS           Comma-separated allowed origins (default: *)");
        println!("  MNEE_API_URL           Override the MNEE API base URL");
        println!("  MNEE_API_CONFIG_PATH   Path to config file (overrides --config)");
        return Ok(());
    }

    if std::env::var(mnee_api::config::CONFIG_PATH_ENV).is_err() {
        if let Some(pos) = args.iter().position(|arg| arg == "--config") {
            if let Some(path) = args.get(pos + 1) {
                std::env::set_var(mnee_api::config::CONFIG_PATH_ENV, path);
                info!("Using custom config: {}", path);
            }
        }
    }

    let config = Config::load();

    let mnee: Arc<dyn MneeApi> = match init_mnee_client(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to initialize MNEE client: {:#}", e);
            return Err(e);
        }
    };

    // Run the service (this blocks until shutdown)
    let api_server = ApiServer::new(config, mnee);
    api_server.run().await?;

    Ok(())
}
