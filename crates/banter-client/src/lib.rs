//! Room session client.
//!
//! Action-based client for the banter room protocol: one WebSocket session
//! per room entry, a pure reducer for room state, and a runtime actor that
//! bridges both to a presentation layer.
//!
//! # Architecture
//!
//! The client follows a Sans-IO, action-based pattern. [`RoomSession`]
//! receives events ([`SessionEvent`]), processes them through pure state
//! machine logic, and returns actions ([`SessionAction`]) for the caller
//! to execute. Room semantics are therefore testable without a socket.
//!
//! # Components
//!
//! - [`RoomSession`]: room state machine (membership, log, counter)
//! - [`SessionEvent`] / [`SessionAction`]: reducer interface
//! - [`Message`], [`RoomSnapshot`], [`SessionPhase`]: observable state
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::ConnectedSession`] / [`transport::connect`]: exclusive
//!   socket ownership behind typed frame channels
//! - [`runtime::start`]: the session actor wiring reducer, transport,
//!   count fetch, and presentation channels together
//! - [`count::fetch_profanity_count`]: the one-shot counter seed

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod event;
mod session;
mod state;

#[cfg(feature = "transport")]
pub mod clock;
#[cfg(feature = "transport")]
pub mod count;
#[cfg(feature = "transport")]
pub mod runtime;
#[cfg(feature = "transport")]
pub mod transport;

pub use banter_proto::{ClientFrame, ProtocolError, ServerFrame};
pub use error::ClientError;
pub use event::{EndReason, SessionAction, SessionEvent};
pub use session::{ENTRY_CONFIRM_TIMEOUT, RoomSession};
pub use state::{Message, RoomSnapshot, SYSTEM_SENDER, SessionPhase};
