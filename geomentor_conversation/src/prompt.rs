//! Request rendering and reply extraction.

use geomentor_core::{ChatMessage, LLMResponse, MENTOR_PERSONA};

use crate::error::ConversationError;
use crate::history::HistoryWindow;

/// Fixed persona followed by the session history and the new user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    persona: String,
    window: HistoryWindow,
}

impl PromptTemplate {
    #[must_use]
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            window: HistoryWindow::unbounded(),
        }
    }

    #[must_use]
    pub const fn with_window(mut self, window: HistoryWindow) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// Render `[system persona] ++ history ++ [user input]`.
    #[must_use]
    pub fn render(&self, history: &[ChatMessage], input: &str) -> Vec<ChatMessage> {
        let history = self.window.select(history);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.persona.clone()));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(input));
        messages
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(MENTOR_PERSONA)
    }
}

/// Reply text from a provider response, passed through unchanged.
///
/// A reply with no visible text is rejected.
pub fn extract_text(response: &LLMResponse) -> Result<String, ConversationError> {
    if response.content.trim().is_empty() {
        return Err(ConversationError::EmptyResponse);
    }
    Ok(response.content.clone())
}
