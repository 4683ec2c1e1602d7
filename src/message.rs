//! Message protocol definitions
//!
//! One JSON object per line in both directions of the relay. Server to
//! client records carry `ok`, `author`, `text` and `color`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::InvalidColor;

/// Author used for notices generated by the relay itself
pub const SYSTEM_AUTHOR: &str = "System";

/// Text of the handshake rejection notice
pub const INVALID_ROOM_ID_TEXT: &str = "Invalid room ID";

/// Author name color
///
/// Encoded on the wire as the terminal background-color code the client
/// renders with. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Color {
    Black = 40,
    Red = 41,
    Green = 42,
    Yellow = 43,
    Blue = 44,
    Magenta = 45,
    Cyan = 46,
}

impl Color {
    /// Colors handed out to chat participants
    pub const PALETTE: [Color; 7] = [
        Color::Black,
        Color::Red,
        Color::Blue,
        Color::Cyan,
        Color::Green,
        Color::Yellow,
        Color::Magenta,
    ];

    /// Color of relay-generated notices
    pub const SYSTEM: Color = Color::Red;

    /// Pick a palette color with the given generator
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::PALETTE[rng.gen_range(0..Self::PALETTE.len())]
    }

    /// Wire code for this color
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<Color> for u8 {
    fn from(color: Color) -> Self {
        color.code()
    }
}

impl TryFrom<u8> for Color {
    type Error = InvalidColor;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            40 => Ok(Color::Black),
            41 => Ok(Color::Red),
            42 => Ok(Color::Green),
            43 => Ok(Color::Yellow),
            44 => Ok(Color::Blue),
            45 => Ok(Color::Magenta),
            46 => Ok(Color::Cyan),
            other => Err(InvalidColor(other)),
        }
    }
}

/// A single relayed record
///
/// `ok` is true for chat and false for system notices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub ok: bool,
    pub author: String,
    pub text: String,
    pub color: Color,
}

impl Message {
    /// Chat line from a participant
    pub fn chat(author: impl Into<String>, text: impl Into<String>, color: Color) -> Self {
        Self {
            ok: true,
            author: author.into(),
            text: text.into(),
            color,
        }
    }

    /// Notice sent to a client whose room id did not parse
    pub fn invalid_room_id() -> Self {
        Self {
            ok: false,
            author: SYSTEM_AUTHOR.to_string(),
            text: INVALID_ROOM_ID_TEXT.to_string(),
            color: Color::SYSTEM,
        }
    }

    /// Serialize to a newline-terminated wire record
    ///
    /// serde_json escapes embedded newlines, so the record always
    /// occupies exactly one line.
    pub fn to_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    /// Parse one wire record (trailing newline optional)
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim_end_matches(['\r', '\n']))
    }
}
