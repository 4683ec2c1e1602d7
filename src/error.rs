//! Error types for the chat relay
//!
//! Defines session-level errors and per-recipient send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Session-level errors
///
/// Every variant is scoped to the session that produced it. None of them
/// stop the accept loop or any other session.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error on the session's own socket (fatal to that session)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (fatal to that session)
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Room id line did not parse as a base-10 integer
    #[error("Invalid room ID: {0:?}")]
    InvalidRoomId(String),

    /// Peer closed the stream before sending both handshake lines
    #[error("Connection closed during handshake")]
    HandshakeAborted,

    /// Configuration value the server cannot run with
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Connection-limit semaphore was closed
    #[error("Connection limit closed")]
    ConnectionLimit,
}

/// Message send errors
///
/// Occurs when writing to a single recipient fails. Fan-out logs it and
/// moves on to the next recipient.
#[derive(Debug, Error)]
pub enum SendError {
    /// The recipient's socket rejected the write
    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Unknown color code on the wire
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid color code: {0}")]
pub struct InvalidColor(pub u8);
