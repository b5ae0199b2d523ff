//! Multi-turn conversation command.
//!
//! History lives only as long as the process, so a session spans one
//! interactive run (or a single `--message` turn).

use geomentor_conversation::ConversationManager;
use tracing::info;
use uuid::Uuid;

use super::{build_conversation_config, init_common_components};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
    /// Session identifier (a fresh UUID when not provided)
    pub session_id: Option<String>,
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional model override
    pub model: Option<String>,
    /// Number of most recent messages to send with each request
    pub history_limit: Option<usize>,
}

/// Strategy for executing the Chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components()?;

        let session_id = input
            .session_id
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        let conversation_config = build_conversation_config(
            &common.config,
            input.model,
            input.history_limit,
        );

        info!("Starting conversation session: {session_id}");

        let manager = ConversationManager::new(common.provider, &conversation_config);

        if let Some(msg) = input.message {
            let result = manager.process_turn(&session_id, &msg).await?;
            println!("{}", result.response);
            info!("Turn {} completed.", result.turn_number);
        } else {
            manager.run_interactive(&session_id).await?;
            info!(
                "Conversation ended: {} total messages",
                manager.history(&session_id).len()
            );
        }

        Ok(())
    }
}
