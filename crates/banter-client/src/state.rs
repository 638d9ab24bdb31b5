//! Observable room state types.
//!
//! This module defines the data structures that represent the session's
//! current view of the room: the lifecycle phase, the message log, and the
//! snapshot type handed to the presentation layer.
//!
//! These structures are the "view model" of the client. They contain the
//! subset of state necessary for rendering without exposing the transport
//! or reducer internals.

/// Sentinel sender name for messages synthesized by the client.
pub const SYSTEM_SENDER: &str = "system";

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Connected, waiting for the server to echo our own entry.
    AwaitingEntry,
    /// Entry confirmed; the session is live in the room.
    Active,
    /// Session is over; all further events are discarded.
    Terminated,
}

/// A message in the room log.
///
/// Messages are append-only and immutable: once in the log they are never
/// reordered, deduplicated, or edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Display name of the sender, or [`SYSTEM_SENDER`].
    pub sender: String,
    /// Message text.
    pub content: String,
    /// Wall-clock display stamp as carried on the wire. Absent on frames
    /// that had none.
    pub time: Option<String>,
}

impl Message {
    /// Synthesize a system message (join/leave notices).
    pub fn system(content: impl Into<String>, time: Option<String>) -> Self {
        Self { sender: SYSTEM_SENDER.to_owned(), content: content.into(), time }
    }

    /// Whether this message was synthesized rather than typed by a user.
    pub fn is_system(&self) -> bool {
        self.sender == SYSTEM_SENDER
    }
}

/// Immutable projection of session state for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    /// Session lifecycle phase.
    pub phase: SessionPhase,
    /// Room members, sorted for stable display.
    pub participants: Vec<String>,
    /// Message log in arrival order.
    pub messages: Vec<Message>,
    /// Most recently reported profanity count.
    pub profanity_count: u64,
}
