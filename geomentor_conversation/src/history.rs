//! Conversation history windowing and statistics.
//!
//! The window only decides which part of a session's log is sent with the
//! next request; the stored log itself is never shortened.

use geomentor_core::{ChatMessage, Role};

/// Selects the slice of history that accompanies a new request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryWindow {
    max_messages: Option<usize>,
}

impl HistoryWindow {
    /// A window that always sends the full history.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self { max_messages: None }
    }

    /// A window over at most `max` of the most recent messages.
    #[must_use]
    pub const fn last(max: usize) -> Self {
        Self {
            max_messages: Some(max),
        }
    }

    #[must_use]
    pub const fn from_limit(limit: Option<usize>) -> Self {
        Self {
            max_messages: limit,
        }
    }

    #[must_use]
    pub const fn max_messages(&self) -> Option<usize> {
        self.max_messages
    }

    /// Select the messages to include in context.
    ///
    /// A bounded window never starts on an assistant message, so the model
    /// is not shown a reply without the question that produced it.
    #[must_use]
    pub fn select<'a>(&self, messages: &'a [ChatMessage]) -> &'a [ChatMessage] {
        let Some(max) = self.max_messages else {
            return messages;
        };

        let mut start = messages.len().saturating_sub(max);
        while start < messages.len() && messages[start].role != Role::User {
            start += 1;
        }
        &messages[start..]
    }
}

/// Statistics about conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub total_characters: usize,
    pub estimated_tokens: usize,
}

impl HistoryStats {
    #[must_use]
    pub fn from_messages(history: &[ChatMessage]) -> Self {
        let total_characters: usize = history.iter().map(|m| m.content.chars().count()).sum();

        Self {
            total_messages: history.len(),
            user_messages: history.iter().filter(|m| m.role == Role::User).count(),
            assistant_messages: history.iter().filter(|m| m.role == Role::Assistant).count(),
            total_characters,
            estimated_tokens: total_characters / 4, // Rough estimate: 4 chars per token
        }
    }
}
