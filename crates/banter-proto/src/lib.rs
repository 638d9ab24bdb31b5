//! Wire protocol for the banter room service.
//!
//! The room service speaks JSON text frames over a single WebSocket, with
//! the `type` field as the discriminant. This crate defines the closed
//! tagged unions for both directions: [`ClientFrame`] (outbound) and
//! [`ServerFrame`] (inbound), plus the profanity-count conventions shared
//! with the HTTP counter endpoint.
//!
//! The crate is I/O-free. Transports live in `banter-client`; the sole job
//! here is turning wire text into well-typed frames and back.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
mod frame;

pub use errors::ProtocolError;
pub use frame::{ClientFrame, ServerFrame};
