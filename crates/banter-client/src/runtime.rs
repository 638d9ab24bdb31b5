//! Session runtime.
//!
//! The actor that owns one session end to end: it feeds transport frames,
//! user commands, the one-shot count fetch, and time ticks through the
//! pure [`RoomSession`] reducer, and streams snapshots back to the
//! presentation layer.
//!
//! The presentation side talks to the actor over two channels: commands in
//! ([`SessionCommand`]), updates out ([`SessionUpdate`]). Events are
//! processed to completion one at a time on a single task, so state
//! transitions can never race. Dropping the [`SessionHandle`] aborts the
//! actor, which releases the transport; queued events for a dead session
//! are discarded, never replayed.

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::clock;
use crate::count::fetch_profanity_count;
use crate::error::ClientError;
use crate::event::{EndReason, SessionAction, SessionEvent};
use crate::session::{ENTRY_CONFIRM_TIMEOUT, RoomSession};
use crate::state::RoomSnapshot;
use crate::transport::{self, ConnectedSession, TransportError};

/// Errors raised while starting a session.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The session precondition failed before any connection attempt.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The transport could not be established.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Tick period for timeout processing.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Default capacity of the update channel.
const DEFAULT_UPDATE_CAPACITY: usize = 256;

/// Capacity of the command channel.
const COMMAND_CAPACITY: usize = 32;

/// Session configuration.
///
/// Only the room endpoint is required; everything else has defaults.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebSocket endpoint of the room service.
    pub room_url: String,
    /// HTTP endpoint of the profanity-count service. `None` skips the
    /// fetch and the counter starts at zero.
    pub count_url: Option<String>,
    /// How long to wait for the server to echo our own entry.
    pub entry_timeout: Duration,
    /// Capacity of the presentation-facing update channel.
    pub update_capacity: usize,
}

impl SessionConfig {
    /// Configuration with defaults for everything but the room endpoint.
    pub fn new(room_url: impl Into<String>) -> Self {
        Self {
            room_url: room_url.into(),
            count_url: None,
            entry_timeout: ENTRY_CONFIRM_TIMEOUT,
            update_capacity: DEFAULT_UPDATE_CAPACITY,
        }
    }

    /// Set the profanity-count endpoint.
    pub fn with_count_url(mut self, url: impl Into<String>) -> Self {
        self.count_url = Some(url.into());
        self
    }

    /// Set the entry-confirmation bound.
    pub fn with_entry_timeout(mut self, timeout: Duration) -> Self {
        self.entry_timeout = timeout;
        self
    }
}

/// Commands the presentation layer sends into the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Send a chat message; the runtime stamps the wall-clock time.
    SendMessage {
        /// Message text.
        content: String,
    },
    /// Tear the session down.
    Shutdown,
}

/// Updates the runtime streams to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Fresh state snapshot; sent whenever an event changed the state.
    State(RoomSnapshot),
    /// User-facing notice.
    Notice {
        /// Notice text.
        message: String,
    },
    /// The session ended; re-entry through the gate is required.
    Ended {
        /// Why the session ended.
        reason: EndReason,
    },
}

/// Handle to a running session.
///
/// Dropping the handle aborts the runtime task, which in turn releases the
/// transport: navigating away from the room closes its connection.
pub struct SessionHandle {
    /// Send user intents into the session.
    pub commands: mpsc::Sender<SessionCommand>,
    /// Receive state snapshots and notices.
    pub updates: mpsc::Receiver<SessionUpdate>,
    abort_handle: tokio::task::AbortHandle,
}

impl SessionHandle {
    /// Stop the session.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Start a session: verify the display name, connect, and spawn the actor.
///
/// The display-name precondition is checked before any connection attempt;
/// a caller without a name belongs back at the entry gate, not here.
pub async fn start(
    config: SessionConfig,
    display_name: &str,
) -> Result<SessionHandle, RuntimeError> {
    let session = RoomSession::new(display_name, Instant::now())?
        .with_entry_timeout(config.entry_timeout);

    let connection = transport::connect(&config.room_url, session.display_name()).await?;

    let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
    let (update_tx, update_rx) = mpsc::channel(config.update_capacity.max(1));

    let task = tokio::spawn(run_session(
        session,
        connection,
        command_rx,
        update_tx,
        config.count_url,
    ));

    Ok(SessionHandle {
        commands: command_tx,
        updates: update_rx,
        abort_handle: task.abort_handle(),
    })
}

/// Drive one session to completion.
async fn run_session(
    mut session: RoomSession,
    mut connection: ConnectedSession,
    mut commands: mpsc::Receiver<SessionCommand>,
    updates: mpsc::Sender<SessionUpdate>,
    count_url: Option<String>,
) {
    // The one async operation whose lifecycle is independent of the
    // socket: fetch the counter seed in the background.
    let mut count_fetch: Option<JoinHandle<Option<u64>>> =
        count_url.map(|url| tokio::spawn(async move { fetch_profanity_count(&url).await }));

    let mut ticker = tokio::time::interval(TICK_PERIOD);

    // Baseline snapshot so the projection can render the entry-wait state.
    let snapshot = session.snapshot();
    let _ = updates.send(SessionUpdate::State(snapshot.clone())).await;
    let mut last_snapshot = snapshot;

    loop {
        let event = tokio::select! {
            fetched = join_count(&mut count_fetch) => {
                count_fetch = None;
                let Some(count) = fetched else { continue };
                SessionEvent::CountFetched { count }
            },
            command = commands.recv() => match command {
                Some(SessionCommand::SendMessage { content }) => SessionEvent::SendMessage {
                    content,
                    time: clock::now_display_time(),
                },
                // Shutdown or a dropped handle: the presentation layer is
                // gone, close up and discard whatever is still queued.
                Some(SessionCommand::Shutdown) | None => break,
            },
            frame = connection.from_server.recv() => match frame {
                Some(frame) => SessionEvent::FrameReceived(frame),
                None => {
                    let _ = updates
                        .send(SessionUpdate::Ended { reason: EndReason::ConnectionClosed })
                        .await;
                    break;
                },
            },
            _ = ticker.tick() => SessionEvent::Tick { now: Instant::now() },
        };

        let over = apply(&mut session, event, &connection, &updates, &mut last_snapshot).await;
        if over {
            break;
        }
    }

    if let Some(fetch) = count_fetch {
        fetch.abort();
    }
    connection.stop();
}

/// Wait on the pending count fetch, if any.
///
/// Once the fetch has resolved (or was never requested) this pends
/// forever, leaving the select to the other event sources.
async fn join_count(fetch: &mut Option<JoinHandle<Option<u64>>>) -> Option<u64> {
    match fetch {
        Some(handle) => handle.await.ok().flatten(),
        None => std::future::pending().await,
    }
}

/// Apply one event and execute the resulting actions.
///
/// Returns `true` when the session is over.
async fn apply(
    session: &mut RoomSession,
    event: SessionEvent,
    connection: &ConnectedSession,
    updates: &mpsc::Sender<SessionUpdate>,
    last_snapshot: &mut RoomSnapshot,
) -> bool {
    let actions = match session.handle(event) {
        Ok(actions) => actions,
        Err(error) => {
            let _ = updates.send(SessionUpdate::Notice { message: error.to_string() }).await;
            return false;
        },
    };

    let snapshot = session.snapshot();
    if snapshot != *last_snapshot {
        let _ = updates.send(SessionUpdate::State(snapshot.clone())).await;
        *last_snapshot = snapshot;
    }

    let mut over = false;
    for action in actions {
        match action {
            SessionAction::Send(frame) => {
                if connection.to_server.send(frame).await.is_err() {
                    tracing::warn!("transport gone, dropping outbound frame");
                }
            },
            SessionAction::Notify { message } => {
                let _ = updates.send(SessionUpdate::Notice { message }).await;
            },
            SessionAction::Terminate { reason } => {
                let _ = updates.send(SessionUpdate::Ended { reason }).await;
                over = true;
            },
        }
    }

    over
}
