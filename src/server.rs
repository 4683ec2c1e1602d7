//! TCP listener
//!
//! Accepts connections and spawns one `SessionHandler` task per socket.
//! Sessions are unbounded unless `max_connections` is configured, in which
//! case a semaphore permit is held for each session's lifetime and accept
//! waits for a free slot.

use std::net::SocketAddr;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::net::TcpListener;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info, warn};

use crate::broadcaster::Broadcaster;
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::registry::Registry;
use crate::session::SessionHandler;

/// The relay's listener and shared state
pub struct ChatServer {
    listener: TcpListener,
    broadcaster: Broadcaster,
    limit: Option<(Arc<Semaphore>, usize)>,
}

impl ChatServer {
    /// Bind to the configured address with a fresh registry
    pub async fn bind(config: &ServerConfig) -> Result<Self, AppError> {
        match config.max_connections {
            Some(0) => {
                return Err(AppError::InvalidConfig(
                    "max_connections must be at least 1".to_string(),
                ))
            }
            Some(max) if max > Semaphore::MAX_PERMITS => {
                return Err(AppError::InvalidConfig(format!(
                    "max_connections must not exceed {}",
                    Semaphore::MAX_PERMITS
                )))
            }
            _ => {}
        }

        let listener = TcpListener::bind(config.addr()).await?;
        info!("Chat relay listening on {}", listener.local_addr()?);

        let limit = config
            .max_connections
            .map(|max| (Arc::new(Semaphore::new(max)), max));
        if let Some((_, max)) = &limit {
            info!("Concurrent sessions limited to {}", max);
        }

        Ok(Self {
            listener,
            broadcaster: Broadcaster::new(Arc::new(Registry::new())),
            limit,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.broadcaster.registry().clone()
    }

    /// Number of sessions holding a slot, if a limit is configured
    pub fn active_connections(&self) -> Option<usize> {
        self.limit
            .as_ref()
            .map(|(semaphore, max)| max - semaphore.available_permits())
    }

    async fn acquire_slot(&self) -> Result<Option<OwnedSemaphorePermit>, AppError> {
        match &self.limit {
            Some((semaphore, _)) => semaphore
                .clone()
                .acquire_owned()
                .await
                .map(Some)
                .map_err(|_| AppError::ConnectionLimit),
            None => Ok(None),
        }
    }

    /// Accept connections until the slot semaphore is closed
    ///
    /// Accept errors are logged and the loop continues; no session's
    /// failure ends it.
    pub async fn run(self) -> Result<(), AppError> {
        loop {
            let permit = self.acquire_slot().await?;

            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    continue;
                }
            };
            info!("New connection from {}", addr);

            let broadcaster = self.broadcaster.clone();
            tokio::spawn(async move {
                let peer = addr.to_string();
                let mut session = SessionHandler::new(broadcaster, StdRng::from_entropy());
                match session.run(stream, &peer).await {
                    Ok(()) => debug!("Session for {} ended", peer),
                    Err(AppError::HandshakeAborted) => {
                        debug!("{} disconnected during handshake", peer)
                    }
                    Err(AppError::Io(e)) => debug!("Session for {} ended: {}", peer, e),
                    Err(e @ AppError::InvalidRoomId(_)) => {
                        warn!("Handshake rejected for {}: {}", peer, e)
                    }
                    Err(e) => error!("Session error for {}: {}", peer, e),
                }
                // Slot is released once the session is fully torn down
                drop(permit);
            });
        }
    }
}
