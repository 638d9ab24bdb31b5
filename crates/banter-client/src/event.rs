//! Session events and actions.

use std::fmt;
use std::time::Instant;

use banter_proto::{ClientFrame, ServerFrame};

/// Events the caller feeds into the session.
///
/// The caller is responsible for:
/// - Receiving frames from the network
/// - Driving time forward via ticks
/// - Forwarding application intents (send message, etc.)
///
/// Generic over `I` (Instant type) so time-dependent behavior is testable
/// without sleeping.
#[derive(Debug, Clone)]
pub enum SessionEvent<I = Instant> {
    /// Frame received from the room service.
    FrameReceived(ServerFrame),

    /// User wants to send a chat message.
    SendMessage {
        /// Message text.
        content: String,
        /// Wall-clock display stamp (HH:MM) to put on the frame.
        time: String,
    },

    /// The one-shot profanity-count fetch completed.
    CountFetched {
        /// Cumulative count reported by the counter service.
        count: u64,
    },

    /// Time tick for timeout processing.
    ///
    /// The caller should send ticks periodically so the session can bound
    /// the wait for its own entry echo.
    Tick {
        /// Current time from the environment.
        now: I,
    },
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The server rejected the session with an ERROR frame.
    ServerRejected,
    /// The server never echoed our entry within the configured bound.
    EntryTimeout,
    /// The connection closed without a protocol-level goodbye.
    ConnectionClosed,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ServerRejected => "rejected by the server",
            Self::EntryTimeout => "entry confirmation timed out",
            Self::ConnectionClosed => "connection closed",
        };
        f.write_str(text)
    }
}

/// Actions the session produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Send a frame to the room service.
    Send(ClientFrame),

    /// Surface a user-facing notice.
    Notify {
        /// Notice text.
        message: String,
    },

    /// Tear the session down: close the transport and route the user back
    /// to the entry gate.
    Terminate {
        /// Why the session ended.
        reason: EndReason,
    },
}
