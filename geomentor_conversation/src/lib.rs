#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Multi-turn conversation support with per-session memory.
//!
//! Each turn is a fixed pipeline:
//! - render: persona, session history and the new message become one request
//! - infer: the request goes to an [`LLMProvider`](geomentor_core::LLMProvider)
//! - extract: the reply text is pulled out of the provider response
//!
//! The user message and the reply are then appended to the session's log.

mod error;
mod history;
mod manager;
mod prompt;

pub use error::ConversationError;
pub use history::{HistoryStats, HistoryWindow};
pub use manager::{ConversationConfig, ConversationManager, TurnResult, TurnUsage};
pub use prompt::{PromptTemplate, extract_text};
