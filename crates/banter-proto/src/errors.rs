//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding wire frames.
///
/// A `Decode` error covers exactly one inbound frame; the connection it
/// arrived on is unaffected. Callers are expected to drop the frame with a
/// diagnostic and keep reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Inbound text was not a well-formed frame.
    #[error("frame decode failed: {0}")]
    Decode(String),

    /// Outbound frame could not be serialized.
    #[error("frame encode failed: {0}")]
    Encode(String),

    /// Inbound frame carried no string `type` discriminant.
    #[error("frame is missing the `type` discriminant")]
    MissingTag,
}
