//! Server configuration
//!
//! Parsed from command-line flags, falling back to `CHAT_RELAY_*`
//! environment variables and then to built-in defaults.

use clap::Parser;

/// Relay server configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "chat_relay", version, about = "Multi-room TCP chat relay")]
pub struct ServerConfig {
    /// Host address to bind
    #[arg(long, env = "CHAT_RELAY_HOST", default_value = "localhost")]
    pub host: String,

    /// Port number to listen on
    #[arg(long, env = "CHAT_RELAY_PORT", default_value_t = 8090)]
    pub port: u16,

    /// Maximum number of concurrent sessions (unbounded when unset)
    #[arg(
        long,
        env = "CHAT_RELAY_MAX_CONNECTIONS",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_connections: Option<usize>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "CHAT_RELAY_LOG", default_value = "chat_relay=info")]
    pub log_filter: String,
}

impl ServerConfig {
    /// Bind address in `host:port` form
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8090,
            max_connections: None,
            log_filter: "chat_relay=info".to_string(),
        }
    }
}
