//! Conversation manager for multi-turn dialogue.
//!
//! The `ConversationManager` owns the session registry and runs each turn
//! through render, infer and extract before recording it.

use std::io::Write;
use std::sync::Arc;

use geomentor_core::{
    ChatMessage, ChatOptions, DEFAULT_TEMPERATURE, LLMProvider, MENTOR_PERSONA,
};
use geomentor_session::SessionRegistry;
use tracing::{debug, info};

use crate::error::ConversationError;
use crate::history::{HistoryStats, HistoryWindow};
use crate::prompt::{PromptTemplate, extract_text};

/// Configuration for conversation management.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Model to use for completions; `None` uses the provider's default
    pub model: Option<String>,
    /// System prompt
    pub system_prompt: String,
    /// Most recent messages sent with each request; `None` sends all of them
    pub history_limit: Option<usize>,
    /// Temperature for sampling
    pub temperature: f32,
    /// Max tokens in response
    pub max_tokens: Option<u32>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            model: None,
            system_prompt: MENTOR_PERSONA.to_string(),
            history_limit: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }
}

impl ConversationConfig {
    /// Set the model name.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Set the history limit.
    #[must_use]
    pub const fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn chat_options(&self, default_model: &str) -> ChatOptions {
        ChatOptions {
            model: self
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    fn template(&self) -> PromptTemplate {
        PromptTemplate::new(self.system_prompt.clone())
            .with_window(HistoryWindow::from_limit(self.history_limit))
    }
}

/// Result of processing a conversation turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Assistant's response
    pub response: String,
    /// Token usage information
    pub usage: Option<TurnUsage>,
    /// 1-based turn number within the session
    pub turn_number: usize,
}

/// Token usage information for a turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnUsage {
    pub prompt: u32,
    pub completion: u32,
    pub total: u32,
}

/// Multi-turn conversation manager.
pub struct ConversationManager<P = Arc<dyn LLMProvider>>
where
    P: Send + Sync,
{
    provider: P,
    registry: Arc<SessionRegistry>,
    template: PromptTemplate,
    options: ChatOptions,
}

impl<P> ConversationManager<P>
where
    P: LLMProvider + Send + Sync,
{
    /// Create a manager with its own, empty session registry.
    pub fn new(provider: P, config: &ConversationConfig) -> Self {
        Self::with_registry(provider, config, Arc::new(SessionRegistry::new()))
    }

    /// Create a manager over an existing registry.
    pub fn with_registry(
        provider: P,
        config: &ConversationConfig,
        registry: Arc<SessionRegistry>,
    ) -> Self {
        let options = config.chat_options(provider.get_default_model());
        info!(
            "Creating conversation manager: model={}, history_limit={:?}",
            options.model, config.history_limit
        );
        Self {
            provider,
            registry,
            template: config.template(),
            options,
        }
    }

    /// Answer `user_text` within `session_id` and return the reply text.
    pub async fn handle_turn(
        &self,
        session_id: &str,
        user_text: &str,
    ) -> Result<String, ConversationError> {
        Ok(self.process_turn(session_id, user_text).await?.response)
    }

    /// Process a single conversation turn.
    ///
    /// The user message and the reply are appended only once the reply is in
    /// hand; on any error the session log is left as it was.
    pub async fn process_turn(
        &self,
        session_id: &str,
        user_text: &str,
    ) -> Result<TurnResult, ConversationError> {
        if user_text.trim().is_empty() {
            return Err(ConversationError::EmptyInput);
        }

        let log = self.registry.resolve_or_create(session_id)?;
        let turn_number = log.turn_count() + 1;
        info!("Processing turn {turn_number} for session: {session_id}");

        let history = log.messages();
        let request = self.template.render(&history, user_text);

        let llm_response = self
            .provider
            .chat(&request, &self.options)
            .await
            .map_err(ConversationError::LLMError)?;

        let reply = extract_text(&llm_response)?;

        log.append_turn(user_text, reply.clone());
        debug!("Turn {turn_number} completed successfully");

        Ok(TurnResult {
            response: reply,
            usage: llm_response.usage.map(|u| TurnUsage {
                prompt: u.prompt_tokens,
                completion: u.completion_tokens,
                total: u.total_tokens,
            }),
            turn_number,
        })
    }

    /// Run an interactive conversation loop.
    ///
    /// This reads from stdin and writes to stdout. A failed turn is reported
    /// and the loop continues with the session unchanged.
    pub async fn run_interactive(&self, session_id: &str) -> Result<(), ConversationError> {
        // Surface an unusable session id before prompting for input.
        self.registry.resolve_or_create(session_id)?;

        println!("=== Conversation Session: {session_id} ===");
        println!("Type 'exit', 'quit', or Ctrl+C to end the session.\n");

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let mut input = String::new();
            if std::io::stdin().read_line(&mut input)? == 0 {
                break;
            }
            let input = input.trim();

            if matches!(input, "exit" | "quit" | "q") {
                break;
            }

            if input.is_empty() {
                continue;
            }

            match self.process_turn(session_id, input).await {
                Ok(result) => {
                    println!("\n{}\n", result.response);

                    if let Some(usage) = result.usage {
                        debug!(
                            "Tokens: {} prompt + {} completion = {} total",
                            usage.prompt, usage.completion, usage.total
                        );
                    }
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                }
            }
        }

        let stats = HistoryStats::from_messages(&self.history(session_id));
        println!(
            "\nSession ended. Total turns: {} (~{} tokens of history)",
            stats.assistant_messages, stats.estimated_tokens
        );
        Ok(())
    }

    /// Snapshot of a session's log; empty if the session was never used.
    #[must_use]
    pub fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        self.registry
            .get(session_id)
            .map(|log| log.messages())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ConversationConfig::default();
        assert!(config.history_limit.is_none());
        assert!(config.model.is_none());
        assert_eq!(config.system_prompt, MENTOR_PERSONA);
    }

    #[test]
    fn config_builds_options_and_template() {
        let config = ConversationConfig::default()
            .with_model("gpt-4o-mini".to_string())
            .with_system_prompt("Be brief.".to_string())
            .with_history_limit(Some(6))
            .with_temperature(0.2);

        let options = config.chat_options("provider-default");
        assert_eq!(options.model, "gpt-4o-mini");
        assert!((options.temperature - 0.2).abs() < f32::EPSILON);

        let fallback = ConversationConfig::default().chat_options("provider-default");
        assert_eq!(fallback.model, "provider-default");

        let template = config.template();
        assert_eq!(template.persona(), "Be brief.");
        let rendered = template.render(&[], "hi");
        assert_eq!(rendered.len(), 2);
    }
}
