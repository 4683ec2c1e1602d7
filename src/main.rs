//! Multi-room TCP chat relay - Entry Point
//!
//! Parses configuration, initializes logging and runs the listener.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chat_relay::{ChatServer, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();

    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let server = ChatServer::bind(&config).await?;
    info!("Chat relay started");

    server.run().await?;
    Ok(())
}
