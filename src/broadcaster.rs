//! Room fan-out and private delivery
//!
//! Serializes a message once and writes it to every registered connection
//! in a room while holding the registry lock. A failed recipient is logged
//! and skipped; the scan always continues to the end of the room.

use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::message::Message;
use crate::registry::Registry;
use crate::types::{ConnectionId, RoomId};

/// Outcome of one room broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Recipients that accepted the write
    pub delivered: usize,
    /// Recipients whose write failed
    pub failed: usize,
}

/// Delivers messages to registered connections
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<Registry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Deliver a message to every connection in `room`, sender included
    ///
    /// Only serialization fails the call. Write failures are counted in the
    /// returned [`Delivery`] and never cut the fan-out short.
    pub async fn broadcast_to_room(
        &self,
        room: RoomId,
        message: &Message,
        sender: ConnectionId,
    ) -> Result<Delivery, AppError> {
        let line = message.to_line()?;
        let mut delivery = Delivery::default();

        let mut registry = self.registry.lock().await;
        for conn in registry.connections_in_room(room) {
            match conn.send(&line).await {
                Ok(()) => delivery.delivered += 1,
                Err(e) => {
                    warn!(
                        "Failed to deliver to {} ({}) in room {}: {}",
                        conn.id, conn.name, room, e
                    );
                    delivery.failed += 1;
                }
            }
        }

        debug!(
            "Broadcast from {} to room {}: {} delivered, {} failed",
            sender, room, delivery.delivered, delivery.failed
        );
        Ok(delivery)
    }

    /// Write a message to one unregistered writer
    ///
    /// Used for handshake rejection notices only.
    pub async fn send_private<W>(&self, writer: &mut W, message: &Message) -> Result<(), AppError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let line = message.to_line()?;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}
