//! Connection registry
//!
//! The single shared piece of mutable state in the relay. One mutex guards
//! add, remove and room iteration, so a broadcast holding the lock always
//! sees a consistent set of members.
//!
//! The lock stays held for a broadcast's whole write sequence. A stalled
//! peer therefore delays delivery to the rest of its room.

use std::collections::HashMap;

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::connection::Connection;
use crate::types::{ConnectionId, RoomId};

/// Registry of active connections
#[derive(Debug, Default)]
pub struct Registry {
    connections: Mutex<HashMap<ConnectionId, Connection>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection
    ///
    /// Visible to broadcasts as soon as this returns. Returns false if a
    /// connection with the same id is already present, in which case the
    /// registry is left unchanged.
    pub async fn add(&self, conn: Connection) -> bool {
        let mut connections = self.connections.lock().await;
        if connections.contains_key(&conn.id) {
            return false;
        }
        debug!("Registering {} in room {}", conn.id, conn.room);
        connections.insert(conn.id, conn);
        debug!("Total connections: {}", connections.len());
        true
    }

    /// Deregister a connection by identity
    ///
    /// Removing an absent id is a no-op. Returns the removed connection so
    /// the caller decides when its writer is dropped.
    pub async fn remove(&self, id: ConnectionId) -> Option<Connection> {
        let mut connections = self.connections.lock().await;
        let removed = connections.remove(&id);
        if removed.is_some() {
            debug!(
                "Deregistered {}, total connections: {}",
                id,
                connections.len()
            );
        }
        removed
    }

    /// Acquire the registry lock
    ///
    /// The returned guard is the only way to reach registered connections'
    /// writers.
    pub async fn lock(&self) -> RegistryGuard<'_> {
        RegistryGuard {
            connections: self.connections.lock().await,
        }
    }

    /// Number of registered connections
    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.lock().await.contains_key(&id)
    }

    /// Snapshot of the ids registered in a room
    pub async fn room_members(&self, room: RoomId) -> Vec<ConnectionId> {
        let mut guard = self.lock().await;
        let members = guard.connections_in_room(room).map(|conn| conn.id).collect();
        members
    }
}

/// Exclusive view of the registry
pub struct RegistryGuard<'a> {
    connections: MutexGuard<'a, HashMap<ConnectionId, Connection>>,
}

impl RegistryGuard<'_> {
    /// All connections whose room matches
    pub fn connections_in_room(
        &mut self,
        room: RoomId,
    ) -> impl Iterator<Item = &mut Connection> + '_ {
        self.connections
            .values_mut()
            .filter(move |conn| conn.room == room)
    }
}
