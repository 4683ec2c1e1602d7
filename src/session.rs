//! Per-connection session handler
//!
//! Drives one accepted socket through Handshaking, Active and Terminated:
//! reads the display name and room id, registers with the registry, turns
//! each received line into a chat message for the room, and deregisters
//! when the stream ends.

use rand::Rng;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::broadcaster::Broadcaster;
use crate::connection::Connection;
use crate::error::AppError;
use crate::message::{Color, Message};
use crate::types::{ConnectionId, RoomId};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the name and room id lines
    Handshaking,
    /// Registered and relaying chat lines
    Active,
    /// Deregistered; no further writes
    Terminated,
}

/// Result of a successful handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub name: String,
    pub room: RoomId,
}

/// Handles a single client connection
///
/// Owns the random generator used for color assignment, so no generator
/// state is shared between sessions.
pub struct SessionHandler<R> {
    broadcaster: Broadcaster,
    rng: R,
    state: SessionState,
}

impl<R: Rng + Send> SessionHandler<R> {
    pub fn new(broadcaster: Broadcaster, rng: R) -> Self {
        Self {
            broadcaster,
            rng,
            state: SessionState::Handshaking,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion
    ///
    /// Returns once the peer disconnects, the handshake is rejected, or a
    /// session-scoped error occurs. The connection is never left in the
    /// registry after this returns.
    pub async fn run<S>(&mut self, stream: S, peer: &str) -> Result<(), AppError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);

        let Handshake { name, room } = match read_handshake(&mut reader).await {
            Ok(handshake) => handshake,
            Err(AppError::InvalidRoomId(raw)) => {
                warn!("Rejecting {}: invalid room id {:?}", peer, raw);
                let notice = self
                    .broadcaster
                    .send_private(&mut writer, &Message::invalid_room_id())
                    .await;
                let _ = writer.shutdown().await;
                self.state = SessionState::Terminated;
                notice?;
                return Err(AppError::InvalidRoomId(raw));
            }
            Err(e) => {
                self.state = SessionState::Terminated;
                return Err(e);
            }
        };

        let id = ConnectionId::new();
        let color = Color::random(&mut self.rng);
        let conn = Connection::new(id, room, name.clone(), color, Box::new(writer));
        let added = self.broadcaster.registry().add(conn).await;
        debug_assert!(added, "connection id {} registered twice", id);
        self.state = SessionState::Active;
        info!("{} joined room {} as '{}' ({})", peer, room, name, id);

        let result = self
            .receive_loop(&mut reader, id, room, &name, color)
            .await;

        // Dropping the removed connection closes its write half
        self.broadcaster.registry().remove(id).await;
        self.state = SessionState::Terminated;
        info!("'{}' ({}) left room {}", name, id, room);

        result
    }

    async fn receive_loop<B>(
        &mut self,
        reader: &mut B,
        id: ConnectionId,
        room: RoomId,
        name: &str,
        color: Color,
    ) -> Result<(), AppError>
    where
        B: AsyncBufRead + Unpin,
    {
        while let Some(text) = read_line(reader).await? {
            debug!("Received from '{}' in room {}: {}", name, room, text);
            let message = Message::chat(name, text, color);
            self.broadcaster
                .broadcast_to_room(room, &message, id)
                .await?;
        }
        Ok(())
    }
}

/// Read the two handshake lines
///
/// The name is trimmed; the room id must parse as a base-10 integer.
pub async fn read_handshake<B>(reader: &mut B) -> Result<Handshake, AppError>
where
    B: AsyncBufRead + Unpin,
{
    let name = read_line(reader)
        .await?
        .ok_or(AppError::HandshakeAborted)?
        .trim()
        .to_string();
    let room = read_line(reader)
        .await?
        .ok_or(AppError::HandshakeAborted)?
        .parse::<RoomId>()?;
    Ok(Handshake { name, room })
}

/// Read one newline-terminated line
///
/// Returns `None` at end of stream. A trailing fragment without `\n` is
/// discarded. The terminator and an optional `\r` before it are stripped;
/// invalid UTF-8 is replaced rather than treated as an error.
///
/// Line length is unbounded: bytes are buffered until `\n` or end of stream.
pub async fn read_line<B>(reader: &mut B) -> Result<Option<String>, std::io::Error>
where
    B: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    reader.read_until(b'\n', &mut buf).await?;
    if buf.last() != Some(&b'\n') {
        return Ok(None);
    }
    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
