use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::{debug, info};

use crate::log::MessageLog;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session identifier must not be empty")]
    EmptySessionId,
}

/// In-memory mapping from session identifier to its message log.
///
/// Holds at most one log per identifier. Entries are never removed; they are
/// dropped together with the registry.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<MessageLog>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the log for `session_id`, creating an empty one on first use.
    ///
    /// Repeated calls with the same identifier return handles to the same
    /// log, never a copy.
    pub fn resolve_or_create(&self, session_id: &str) -> Result<Arc<MessageLog>, SessionError> {
        if session_id.trim().is_empty() {
            return Err(SessionError::EmptySessionId);
        }

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        match sessions.entry(session_id.to_owned()) {
            Entry::Occupied(entry) => {
                debug!("Resolved existing session: {}", session_id);
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => {
                info!("Created session: {}", session_id);
                Ok(Arc::clone(
                    entry.insert(Arc::new(MessageLog::new(session_id))),
                ))
            }
        }
    }

    /// Look up a session without creating it.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<Arc<MessageLog>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }

    #[must_use]
    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(session_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Known session identifiers, sorted.
    #[must_use]
    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geomentor_core::ChatMessage;

    #[test]
    fn resolve_twice_returns_same_log() {
        let registry = SessionRegistry::new();
        let first = registry.resolve_or_create("s1").unwrap();
        let second = registry.resolve_or_create("s1").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn appends_are_visible_through_later_lookups() {
        let registry = SessionRegistry::new();
        registry
            .resolve_or_create("s1")
            .unwrap()
            .append(ChatMessage::user("hello"));

        let log = registry.resolve_or_create("s1").unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn distinct_sessions_are_independent() {
        let registry = SessionRegistry::new();
        let a = registry.resolve_or_create("s1").unwrap();
        let b = registry.resolve_or_create("s2").unwrap();

        a.append_turn("question", "answer");

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 2);
        assert!(b.is_empty());
        assert_eq!(registry.session_ids(), ["s1", "s2"]);
    }

    #[test]
    fn empty_identifier_is_rejected() {
        let registry = SessionRegistry::new();
        assert_eq!(
            registry.resolve_or_create("").unwrap_err(),
            SessionError::EmptySessionId
        );
        assert_eq!(
            registry.resolve_or_create("   ").unwrap_err(),
            SessionError::EmptySessionId
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn get_does_not_create() {
        let registry = SessionRegistry::new();
        assert!(registry.get("missing").is_none());
        assert!(!registry.contains("missing"));
        assert!(registry.is_empty());

        registry.resolve_or_create("present").unwrap();
        assert!(registry.get("present").is_some());
        assert!(registry.contains("present"));
    }

    #[test]
    fn shared_across_threads() {
        let registry = Arc::new(SessionRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .resolve_or_create("shared")
                        .unwrap()
                        .append(ChatMessage::user(format!("m{i}")));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("shared").unwrap().len(), 8);
    }
}
