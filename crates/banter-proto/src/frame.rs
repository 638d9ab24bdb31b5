//! JSON frame types for both wire directions.
//!
//! Frames are single JSON objects with a `type` field beside the payload
//! fields (`{"type":"TALK","sender":"Alice",...}`). The inbound union is
//! closed: every tag the client understands has a variant, and anything
//! else decodes to [`ServerFrame::Unknown`] so a newer server never breaks
//! an older client.
//!
//! # Invariants
//!
//! - Decoding is total: any input string yields either a typed frame or a
//!   [`ProtocolError`], never a panic.
//! - A known tag with missing or mistyped required fields is a decode
//!   error (the frame is malformed); an unrecognized tag is not.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ProtocolError, Result};

/// Frames the client sends to the room service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    /// Entry announcement, sent once immediately after the socket opens.
    #[serde(rename = "ENTER")]
    Enter {
        /// Display name of the entering session.
        sender: String,
    },

    /// User chat message.
    #[serde(rename = "TALK")]
    Talk {
        /// Display name of the sending session.
        sender: String,
        /// Message text.
        content: String,
        /// Wall-clock display stamp (HH:MM).
        time: String,
    },
}

impl ClientFrame {
    /// Encode the frame as JSON text for the wire.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

/// Frames the room service sends to the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// Authoritative membership snapshot; replaces, never merges.
    #[serde(rename = "PARTICIPANTS")]
    Participants {
        /// Display names of everyone currently in the room.
        participants: Vec<String>,
    },

    /// A session entered the room.
    #[serde(rename = "ENTER")]
    Enter {
        /// Display name of the entering session.
        sender: String,
        /// Wall-clock display stamp, when the server supplied one.
        time: Option<String>,
    },

    /// A session left the room.
    #[serde(rename = "LEAVE")]
    Leave {
        /// Display name of the departing session.
        sender: String,
        /// Wall-clock display stamp, when the server supplied one.
        time: Option<String>,
    },

    /// Chat message broadcast to the room.
    #[serde(rename = "TALK")]
    Talk {
        /// Display name of the sending session.
        sender: String,
        /// Message text.
        content: String,
        /// Wall-clock display stamp, when the server supplied one.
        time: Option<String>,
        /// Cumulative profanity count, carried when the server recomputed
        /// it for this message.
        #[serde(rename = "badWordCount")]
        bad_word_count: Option<u64>,
    },

    /// Entry rejection (room at capacity or policy violation).
    #[serde(rename = "ERROR")]
    Error {
        /// Human-readable rejection notice, when the server supplied one.
        content: Option<String>,
    },

    /// A tag this client does not understand. Produced only by
    /// [`ServerFrame::decode`], never by serde.
    #[serde(skip)]
    Unknown {
        /// The unrecognized `type` tag, kept for diagnostics.
        kind: String,
    },
}

impl ServerFrame {
    /// Tags this client understands.
    const KNOWN_TAGS: [&'static str; 5] = ["PARTICIPANTS", "ENTER", "LEAVE", "TALK", "ERROR"];

    /// Decode one inbound text frame.
    ///
    /// Unrecognized tags decode to [`ServerFrame::Unknown`] rather than an
    /// error; only genuinely malformed input (not JSON, no `type` field,
    /// missing required fields for a known tag) fails.
    pub fn decode(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::Decode(e.to_string()))?;

        let Some(kind) = value.get("type").and_then(Value::as_str) else {
            return Err(ProtocolError::MissingTag);
        };

        if !Self::KNOWN_TAGS.contains(&kind) {
            return Ok(Self::Unknown { kind: kind.to_owned() });
        }

        serde_json::from_value(value).map_err(|e| ProtocolError::Decode(e.to_string()))
    }
}
