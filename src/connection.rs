//! Connection struct definition
//!
//! Represents a registered session: identity, room, display attributes and
//! the write half of its socket.

use std::fmt;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::SendError;
use crate::message::Color;
use crate::types::{ConnectionId, RoomId};

/// Boxed write half of a client socket
pub type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// Registered client connection
///
/// Owned by the registry from Add until Remove. Dropping it drops the
/// write half of the socket.
pub struct Connection {
    /// Unique identifier for this connection
    pub id: ConnectionId,
    /// Room this connection joined at handshake
    pub room: RoomId,
    /// Trimmed display name
    pub name: String,
    /// Author name color
    pub color: Color,
    writer: Writer,
}

impl Connection {
    /// Create a connection around an already-split writer
    pub fn new(
        id: ConnectionId,
        room: RoomId,
        name: String,
        color: Color,
        writer: Writer,
    ) -> Self {
        Self {
            id,
            room,
            name,
            color,
            writer,
        }
    }

    /// Write one serialized record to this connection
    pub async fn send(&mut self, line: &[u8]) -> Result<(), SendError> {
        self.writer.write_all(line).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("room", &self.room)
            .field("name", &self.name)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}
