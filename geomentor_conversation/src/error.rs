use geomentor_session::SessionError;
use thiserror::Error;

/// Errors that can occur while processing a conversation turn.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("LLM provider error: {0}")]
    LLMError(#[source] anyhow::Error),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("User message must not be empty")]
    EmptyInput,

    #[error("Empty response from LLM")]
    EmptyResponse,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
