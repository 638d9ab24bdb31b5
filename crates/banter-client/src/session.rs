//! Room session state machine.
//!
//! [`RoomSession`] is the pure reducer at the core of the client: it
//! consumes [`SessionEvent`]s and returns [`SessionAction`]s, with no I/O
//! dependencies. The runtime feeds it frames, commands, and ticks; tests
//! drive it directly without a connection.
//!
//! # Invariants
//!
//! - The message log is append-only in arrival order; entries are never
//!   reordered, deduplicated, or mutated.
//! - A name in the participant set was observed via ENTER, TALK, or an
//!   authoritative PARTICIPANTS snapshot, with no unmatched LEAVE since.
//! - The profanity counter only moves to values received from the server;
//!   the one-shot fetch never overwrites a TALK-carried count.
//! - After termination every event is discarded: no replay, no buffering.

use std::collections::HashSet;
use std::ops::Sub;
use std::time::{Duration, Instant};

use banter_proto::{ClientFrame, ServerFrame};

use crate::error::ClientError;
use crate::event::{EndReason, SessionAction, SessionEvent};
use crate::state::{Message, RoomSnapshot, SessionPhase};

/// How long we wait for the server to echo our own ENTER before giving up.
pub const ENTRY_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

/// Notice shown when the server rejects entry without a message.
const DEFAULT_REJECTION_NOTICE: &str = "the room is full, please try again later";

/// Notice shown when entry confirmation times out.
const ENTRY_TIMEOUT_NOTICE: &str = "no response from the room, please re-enter";

/// One client's live participation in the room.
///
/// Created once a display name is available, destroyed when the user
/// navigates away or the connection ends. Generic over `I` (Instant type)
/// to support both production time and fabricated instants in tests.
#[derive(Debug, Clone)]
pub struct RoomSession<I = Instant> {
    /// Our display name; entry is confirmed by its echo.
    display_name: String,
    phase: SessionPhase,
    participants: HashSet<String>,
    messages: Vec<Message>,
    profanity_count: u64,
    /// Set once a TALK frame carried a count; the initial fetch must not
    /// overwrite a fresher value.
    count_superseded: bool,
    /// When we started waiting for our own ENTER echo.
    awaiting_since: I,
    entry_timeout: Duration,
}

impl<I> RoomSession<I> {
    /// Create a session for `display_name`, waiting for entry confirmation
    /// as of `now`.
    ///
    /// # Errors
    ///
    /// `MissingDisplayName` if the name is empty after trimming. Callers
    /// must not open a connection in that case; the user belongs back at
    /// the entry gate.
    pub fn new(display_name: &str, now: I) -> Result<Self, ClientError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ClientError::MissingDisplayName);
        }

        Ok(Self {
            display_name: display_name.to_owned(),
            phase: SessionPhase::AwaitingEntry,
            participants: HashSet::new(),
            messages: Vec::new(),
            profanity_count: 0,
            count_superseded: false,
            awaiting_since: now,
            entry_timeout: ENTRY_CONFIRM_TIMEOUT,
        })
    }

    /// Override the entry-confirmation bound.
    pub fn with_entry_timeout(mut self, timeout: Duration) -> Self {
        self.entry_timeout = timeout;
        self
    }

    /// Display name this session entered with.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether the server has confirmed our entry.
    pub fn is_connected(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// Current room membership.
    pub fn participants(&self) -> &HashSet<String> {
        &self.participants
    }

    /// Message log in arrival order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Most recently reported profanity count.
    pub fn profanity_count(&self) -> u64 {
        self.profanity_count
    }

    /// Immutable projection of the current state for the presentation
    /// layer.
    pub fn snapshot(&self) -> RoomSnapshot {
        let mut participants: Vec<String> = self.participants.iter().cloned().collect();
        participants.sort_unstable();

        RoomSnapshot {
            phase: self.phase,
            participants,
            messages: self.messages.clone(),
            profanity_count: self.profanity_count,
        }
    }
}

impl<I> RoomSession<I>
where
    I: Copy + Sub<Output = Duration>,
{
    /// Process an event and return resulting actions.
    pub fn handle(&mut self, event: SessionEvent<I>) -> Result<Vec<SessionAction>, ClientError> {
        if self.phase == SessionPhase::Terminated {
            // The session is over: queued events are discarded, never
            // replayed into a later session.
            return Ok(Vec::new());
        }

        match event {
            SessionEvent::FrameReceived(frame) => Ok(self.apply_frame(frame)),
            SessionEvent::SendMessage { content, time } => self.handle_send(content, time),
            SessionEvent::CountFetched { count } => {
                if !self.count_superseded {
                    self.profanity_count = count;
                }
                Ok(Vec::new())
            },
            SessionEvent::Tick { now } => Ok(self.handle_tick(now)),
        }
    }

    fn apply_frame(&mut self, frame: ServerFrame) -> Vec<SessionAction> {
        match frame {
            ServerFrame::Enter { sender, time } => {
                if sender == self.display_name {
                    // Only our own echo confirms entry; everyone else's
                    // entries may legitimately arrive first.
                    self.phase = SessionPhase::Active;
                }
                self.participants.insert(sender.clone());
                self.messages.push(Message::system(format!("{sender} joined"), time));
                Vec::new()
            },
            ServerFrame::Leave { sender, time } => {
                self.participants.remove(&sender);
                self.messages.push(Message::system(format!("{sender} left"), time));
                Vec::new()
            },
            ServerFrame::Talk { sender, content, time, bad_word_count } => {
                self.messages.push(Message { sender: sender.clone(), content, time });
                // The server should have sent ENTER first; tolerate
                // out-of-order arrival.
                self.participants.insert(sender);
                if let Some(count) = bad_word_count {
                    self.profanity_count = count;
                    self.count_superseded = true;
                }
                Vec::new()
            },
            ServerFrame::Participants { participants } => {
                // Authoritative snapshot: replaces, never merges.
                self.participants = participants.into_iter().collect();
                Vec::new()
            },
            ServerFrame::Error { content } => {
                self.phase = SessionPhase::Terminated;
                let message = content
                    .filter(|content| !content.is_empty())
                    .unwrap_or_else(|| DEFAULT_REJECTION_NOTICE.to_owned());
                vec![
                    SessionAction::Notify { message },
                    SessionAction::Terminate { reason: EndReason::ServerRejected },
                ]
            },
            ServerFrame::Unknown { .. } => Vec::new(),
        }
    }

    fn handle_send(
        &mut self,
        content: String,
        time: String,
    ) -> Result<Vec<SessionAction>, ClientError> {
        if self.phase != SessionPhase::Active {
            return Err(ClientError::NotConnected);
        }

        // Blank input never goes on the wire.
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![SessionAction::Send(ClientFrame::Talk {
            sender: self.display_name.clone(),
            content,
            time,
        })])
    }

    fn handle_tick(&mut self, now: I) -> Vec<SessionAction> {
        if self.phase == SessionPhase::AwaitingEntry
            && now - self.awaiting_since >= self.entry_timeout
        {
            self.phase = SessionPhase::Terminated;
            return vec![
                SessionAction::Notify { message: ENTRY_TIMEOUT_NOTICE.to_owned() },
                SessionAction::Terminate { reason: EndReason::EntryTimeout },
            ];
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "alice";

    fn session() -> RoomSession {
        RoomSession::new(NAME, Instant::now()).unwrap()
    }

    fn active_session() -> RoomSession {
        let mut session = session();
        let _ = session
            .handle(SessionEvent::FrameReceived(ServerFrame::Enter {
                sender: NAME.into(),
                time: None,
            }))
            .unwrap();
        session
    }

    fn enter(sender: &str) -> SessionEvent {
        SessionEvent::FrameReceived(ServerFrame::Enter { sender: sender.into(), time: None })
    }

    fn talk(sender: &str, content: &str, count: Option<u64>) -> SessionEvent {
        SessionEvent::FrameReceived(ServerFrame::Talk {
            sender: sender.into(),
            content: content.into(),
            time: Some("10:00".into()),
            bad_word_count: count,
        })
    }

    #[test]
    fn rejects_empty_display_name() {
        assert_eq!(
            RoomSession::<Instant>::new("", Instant::now()).err(),
            Some(ClientError::MissingDisplayName)
        );
        assert_eq!(
            RoomSession::<Instant>::new("   ", Instant::now()).err(),
            Some(ClientError::MissingDisplayName)
        );
    }

    #[test]
    fn trims_display_name() {
        let session = RoomSession::<Instant>::new("  alice ", Instant::now()).unwrap();
        assert_eq!(session.display_name(), "alice");
    }

    #[test]
    fn own_enter_confirms_entry() {
        let mut session = session();
        assert!(!session.is_connected());

        let actions = session.handle(enter(NAME)).unwrap();

        assert!(actions.is_empty());
        assert_eq!(session.phase(), SessionPhase::Active);
        assert!(session.participants().contains(NAME));
        assert_eq!(session.messages(), [Message::system("alice joined", None)]);
    }

    #[test]
    fn foreign_enter_never_confirms_entry() {
        let mut session = session();

        let _ = session.handle(enter("bob")).unwrap();

        // Applied even before we are active, but the phase is untouched.
        assert_eq!(session.phase(), SessionPhase::AwaitingEntry);
        assert!(session.participants().contains("bob"));
        assert_eq!(session.messages(), [Message::system("bob joined", None)]);
    }

    #[test]
    fn participants_snapshot_replaces_wholesale() {
        let mut session = active_session();
        let _ = session.handle(enter("bob")).unwrap();

        let roster = ServerFrame::Participants { participants: vec!["carol".into(), "dan".into()] };
        let _ = session.handle(SessionEvent::FrameReceived(roster)).unwrap();

        let expected: HashSet<String> = ["carol".to_owned(), "dan".to_owned()].into();
        assert_eq!(session.participants(), &expected);
    }

    #[test]
    fn leave_for_absent_sender_still_logs() {
        let mut session = active_session();
        let before = session.participants().clone();

        let frame = ServerFrame::Leave { sender: "ghost".into(), time: Some("10:01".into()) };
        let _ = session.handle(SessionEvent::FrameReceived(frame)).unwrap();

        assert_eq!(session.participants(), &before);
        assert_eq!(
            session.messages().last(),
            Some(&Message::system("ghost left", Some("10:01".into())))
        );
    }

    #[test]
    fn talk_appends_verbatim_and_adds_sender() {
        let mut session = active_session();

        let _ = session.handle(talk("bob", "hello there", None)).unwrap();

        assert_eq!(
            session.messages().last(),
            Some(&Message {
                sender: "bob".into(),
                content: "hello there".into(),
                time: Some("10:00".into()),
            })
        );
        // No ENTER was ever seen for bob; TALK is enough to show him.
        assert!(session.participants().contains("bob"));
    }

    #[test]
    fn messages_stay_in_arrival_order() {
        let mut session = active_session();
        let _ = session.handle(enter("bob")).unwrap();
        let _ = session.handle(talk("bob", "one", None)).unwrap();
        let _ = session
            .handle(SessionEvent::FrameReceived(ServerFrame::Leave {
                sender: "bob".into(),
                time: None,
            }))
            .unwrap();
        let _ = session.handle(talk("carol", "two", None)).unwrap();

        let contents: Vec<&str> =
            session.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["alice joined", "bob joined", "one", "bob left", "two"]);
    }

    #[test]
    fn talk_count_supersedes_initial_fetch() {
        let mut session = active_session();

        let _ = session.handle(SessionEvent::CountFetched { count: 3 }).unwrap();
        assert_eq!(session.profanity_count(), 3);

        let _ = session.handle(talk("bob", "!!", Some(5))).unwrap();
        assert_eq!(session.profanity_count(), 5);

        // A TALK without a count leaves the counter alone.
        let _ = session.handle(talk("bob", "ok", None)).unwrap();
        assert_eq!(session.profanity_count(), 5);

        // A late fetch result must not roll a fresher value back.
        let _ = session.handle(SessionEvent::CountFetched { count: 4 }).unwrap();
        assert_eq!(session.profanity_count(), 5);
    }

    #[test]
    fn error_frame_terminates_and_notifies() {
        let mut session = active_session();

        let frame = ServerFrame::Error { content: Some("room full".into()) };
        let actions = session.handle(SessionEvent::FrameReceived(frame)).unwrap();

        assert_eq!(
            actions,
            [
                SessionAction::Notify { message: "room full".into() },
                SessionAction::Terminate { reason: EndReason::ServerRejected },
            ]
        );
        assert_eq!(session.phase(), SessionPhase::Terminated);
    }

    #[test]
    fn error_frame_without_content_uses_default_notice() {
        let mut session = session();

        let actions = session
            .handle(SessionEvent::FrameReceived(ServerFrame::Error { content: None }))
            .unwrap();

        let Some(SessionAction::Notify { message }) = actions.first() else {
            panic!("expected a notice");
        };
        assert!(!message.is_empty());
    }

    #[test]
    fn terminated_session_drops_everything() {
        let mut session = active_session();
        let _ = session
            .handle(SessionEvent::FrameReceived(ServerFrame::Error { content: None }))
            .unwrap();
        let log_len = session.messages().len();

        assert_eq!(session.handle(enter("bob")), Ok(Vec::new()));
        assert_eq!(session.handle(talk("bob", "hi", Some(9))), Ok(Vec::new()));
        assert_eq!(
            session.handle(SessionEvent::SendMessage {
                content: "hi".into(),
                time: "10:02".into()
            }),
            Ok(Vec::new())
        );

        assert_eq!(session.messages().len(), log_len);
        assert_eq!(session.profanity_count(), 0);
    }

    #[test]
    fn unknown_frame_is_ignored() {
        let mut session = active_session();
        let before = session.snapshot();

        let frame = ServerFrame::Unknown { kind: "TYPING".into() };
        assert_eq!(session.handle(SessionEvent::FrameReceived(frame)), Ok(Vec::new()));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn send_before_confirmation_is_an_error() {
        let mut session = session();

        let result = session.handle(SessionEvent::SendMessage {
            content: "hello".into(),
            time: "10:00".into(),
        });

        assert_eq!(result, Err(ClientError::NotConnected));
    }

    #[test]
    fn send_emits_talk_frame() {
        let mut session = active_session();

        let actions = session
            .handle(SessionEvent::SendMessage { content: "hello".into(), time: "10:00".into() })
            .unwrap();

        assert_eq!(
            actions,
            [SessionAction::Send(ClientFrame::Talk {
                sender: NAME.into(),
                content: "hello".into(),
                time: "10:00".into(),
            })]
        );
    }

    #[test]
    fn blank_send_is_a_no_op() {
        let mut session = active_session();

        let actions = session
            .handle(SessionEvent::SendMessage { content: "   ".into(), time: "10:00".into() })
            .unwrap();

        assert!(actions.is_empty());
    }

    #[test]
    fn entry_confirmation_times_out() {
        let start = Instant::now();
        let mut session = RoomSession::new(NAME, start)
            .unwrap()
            .with_entry_timeout(Duration::from_secs(5));

        let actions = session
            .handle(SessionEvent::Tick { now: start + Duration::from_secs(4) })
            .unwrap();
        assert!(actions.is_empty());

        let actions = session
            .handle(SessionEvent::Tick { now: start + Duration::from_secs(6) })
            .unwrap();
        assert_eq!(
            actions.last(),
            Some(&SessionAction::Terminate { reason: EndReason::EntryTimeout })
        );
        assert_eq!(session.phase(), SessionPhase::Terminated);
    }

    #[test]
    fn active_session_never_times_out() {
        let start = Instant::now();
        let mut session = RoomSession::new(NAME, start)
            .unwrap()
            .with_entry_timeout(Duration::from_secs(5));
        let _ = session.handle(enter(NAME)).unwrap();

        let actions = session
            .handle(SessionEvent::Tick { now: start + Duration::from_secs(3600) })
            .unwrap();

        assert!(actions.is_empty());
        assert_eq!(session.phase(), SessionPhase::Active);
    }

    #[test]
    fn snapshot_sorts_participants() {
        let mut session = active_session();
        let _ = session.handle(enter("zoe")).unwrap();
        let _ = session.handle(enter("bob")).unwrap();

        assert_eq!(session.snapshot().participants, ["alice", "bob", "zoe"]);
    }
}
