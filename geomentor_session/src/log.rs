//! Append-only message log for a single session.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use geomentor_core::{ChatMessage, Role};

#[derive(Debug)]
struct LogState {
    messages: Vec<ChatMessage>,
    updated_at: DateTime<Utc>,
}

/// Ordered record of the messages exchanged in one session.
///
/// Messages are only ever appended; insertion order is conversation order.
/// The log is shared behind an `Arc`, so every handle observes the same
/// appends.
#[derive(Debug)]
pub struct MessageLog {
    session_id: String,
    created_at: DateTime<Utc>,
    state: RwLock<LogState>,
}

impl MessageLog {
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            created_at: now,
            state: RwLock::new(LogState {
                messages: Vec::new(),
                updated_at: now,
            }),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn append(&self, message: ChatMessage) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.messages.push(message);
        state.updated_at = Utc::now();
    }

    /// Append a user message and the assistant's reply under one lock, so no
    /// reader ever sees the user half of a turn without its reply.
    pub fn append_turn(&self, user: impl Into<String>, assistant: impl Into<String>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.messages.push(ChatMessage::new(Role::User, user));
        state.messages.push(ChatMessage::new(Role::Assistant, assistant));
        state.updated_at = Utc::now();
    }

    /// Snapshot of the log in chronological order.
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of completed user/assistant exchanges.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count()
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .updated_at
    }
}
