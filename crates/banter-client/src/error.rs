//! Client error types.

use thiserror::Error;

/// Errors returned by the room session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// A session needs a non-empty display name before it may open.
    #[error("display name must not be empty")]
    MissingDisplayName,

    /// The server has not confirmed this session's entry yet.
    #[error("entry has not been confirmed yet")]
    NotConnected,
}
