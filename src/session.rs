//! Chat session history
//!
//! This module implements the append-only message log behind one chat
//! conversation. Messages are immutable once created, ids are monotonic for
//! the lifetime of the session object, and clearing the log never recycles
//! an id. A generation counter tracks clears so that a reply captured before
//! a clear can be recognized as stale and dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing into the widget
    User,
    /// The ordering assistant
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bot => write!(f, "bot"),
        }
    }
}

/// One immutable chat message
///
/// `id` is unique within its session and strictly increasing in append
/// order. `text` is the raw message text; display formatting is derived from
/// it on demand and never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Session-scoped monotonic id, starting at 1
    pub id: u64,
    /// Message author
    pub sender: Sender,
    /// Raw message text as sent or received
    pub text: String,
    /// UTC creation time
    pub timestamp: DateTime<Utc>,
}

/// Ordered, append-only message log for one conversation
///
/// Insertion order is display order. The session owns its counter state:
/// `clear` empties the log but keeps the id sequence running, so ids stay
/// unique across the whole lifetime of the session object.
///
/// # Examples
///
/// ```
/// use bitebot::session::{ChatSession, Sender};
///
/// let mut session = ChatSession::new("guest");
/// let first = session.append(Sender::User, "Show restaurants");
/// let second = session.append(Sender::Bot, "Found 3 restaurants");
/// assert_eq!(first.id, 1);
/// assert_eq!(second.id, 2);
/// ```
#[derive(Debug, Clone)]
pub struct ChatSession {
    session_id: String,
    created_at: DateTime<Utc>,
    messages: Vec<ChatMessage>,
    next_id: u64,
    generation: u64,
}

impl ChatSession {
    /// Create an empty session for the given conversation id
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            created_at: Utc::now(),
            messages: Vec::new(),
            next_id: 1,
            generation: 0,
        }
    }

    /// Append a message and return the created record
    ///
    /// Assigns the next monotonic id and the current UTC timestamp. Never
    /// fails.
    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> ChatMessage {
        let message = ChatMessage {
            id: self.next_id,
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }

    /// Empty the log
    ///
    /// The id counter is NOT reset; the next `append` continues from the
    /// prior maximum. The generation counter advances so in-flight replies
    /// captured before the clear can be detected as stale.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.generation += 1;
    }

    /// Snapshot of the message history at call time
    ///
    /// The returned iterator owns its data: appending after the call does
    /// not affect a sequence already being consumed.
    pub fn history(&self) -> impl Iterator<Item = ChatMessage> {
        self.messages.clone().into_iter()
    }

    /// Borrow the messages in display order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages currently in the log
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the log holds no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Conversation id this session was created with
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// UTC time the session object was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current clear-generation of the session
    ///
    /// Capture this before dispatching a request; if the value has moved by
    /// the time the reply arrives, the session was cleared in between and
    /// the reply belongs to a stale conversation.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = ChatSession::new("guest");
        assert!(session.is_empty());
        assert_eq!(session.len(), 0);
        assert_eq!(session.session_id(), "guest");
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn test_append_assigns_monotonic_ids_regardless_of_sender() {
        let mut session = ChatSession::new("guest");
        let a = session.append(Sender::User, "one");
        let b = session.append(Sender::Bot, "two");
        let c = session.append(Sender::User, "three");

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut session = ChatSession::new("guest");
        session.append(Sender::User, "first");
        session.append(Sender::Bot, "second");

        let texts: Vec<String> = session.history().map(|m| m.text).collect();
        assert_eq!(texts, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_clear_empties_history() {
        let mut session = ChatSession::new("guest");
        session.append(Sender::User, "hello");
        session.append(Sender::Bot, "hi");

        session.clear();

        assert!(session.is_empty());
        assert_eq!(session.history().count(), 0);
    }

    #[test]
    fn test_clear_does_not_reset_id_counter() {
        let mut session = ChatSession::new("guest");
        session.append(Sender::User, "one");
        session.append(Sender::Bot, "two");
        session.clear();

        let next = session.append(Sender::User, "three");
        assert_eq!(next.id, 3);
    }

    #[test]
    fn test_clear_advances_generation() {
        let mut session = ChatSession::new("guest");
        let before = session.generation();
        session.clear();
        assert_eq!(session.generation(), before + 1);

        // Appending re-enters the active state without touching the
        // generation.
        session.append(Sender::User, "back again");
        assert_eq!(session.generation(), before + 1);
    }

    #[test]
    fn test_history_is_a_snapshot() {
        let mut session = ChatSession::new("guest");
        session.append(Sender::User, "one");

        let snapshot: Vec<ChatMessage> = session.history().collect();
        session.append(Sender::Bot, "two");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_messages_are_immutable_records() {
        let mut session = ChatSession::new("guest");
        let created = session.append(Sender::User, "hello");

        let stored = &session.messages()[0];
        assert_eq!(stored, &created);
        assert_eq!(stored.text, "hello");
    }

    #[test]
    fn test_sender_display() {
        assert_eq!(Sender::User.to_string(), "user");
        assert_eq!(Sender::Bot.to_string(), "bot");
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Sender::Bot).unwrap(), "\"bot\"");
    }
}
