//! Multi-room TCP Chat Relay Library
//!
//! Clients connect over plain TCP, send a display name line and a room id
//! line, and then every further line they send is relayed as a JSON record
//! to all connections in the same room, the sender included.
//!
//! # Architecture
//! - `Registry` owns the set of live connections behind one mutex
//! - `Broadcaster` fans a serialized message out to a room under that lock
//! - `SessionHandler` runs one connection's handshake and receive loop
//! - `ChatServer` accepts sockets and spawns a session task for each
//!
//! # Example
//! ```ignore
//! use chat_relay::{ChatServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = ChatServer::bind(&ServerConfig::default()).await.unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod broadcaster;
pub mod config;
pub mod connection;
pub mod error;
pub mod message;
pub mod registry;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use broadcaster::{Broadcaster, Delivery};
pub use config::ServerConfig;
pub use connection::Connection;
pub use error::{AppError, InvalidColor, SendError};
pub use message::{Color, Message};
pub use registry::Registry;
pub use server::ChatServer;
pub use session::{SessionHandler, SessionState};
pub use types::{ConnectionId, RoomId};
