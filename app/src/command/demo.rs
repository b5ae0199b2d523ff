//! Runs the built-in mentor questions through one session.

use std::io::Write;

use geomentor_conversation::ConversationManager;
use geomentor_core::{DEMO_QUESTIONS, LLMProvider};
use tracing::info;

use super::{build_conversation_config, init_common_components};

#[derive(Debug, Clone, Default)]
pub struct DemoInput {
    /// Session to ask in (defaults to the configured session id)
    pub session_id: Option<String>,
    /// Optional model override
    pub model: Option<String>,
    /// Print the full session log after the last answer
    pub show_history: bool,
}

/// Asks each demo question in order, stopping at the first failure.
#[derive(Debug, Clone, Copy)]
pub struct DemoStrategy;

impl super::CommandStrategy for DemoStrategy {
    type Input = DemoInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components()?;

        let session_id = input
            .session_id
            .unwrap_or_else(|| common.config.session.default_id.clone());
        let conversation_config = build_conversation_config(&common.config, input.model, None);
        let manager = ConversationManager::new(common.provider, &conversation_config);

        let mut stdout = std::io::stdout();
        run_transcript(
            &manager,
            &session_id,
            &DEMO_QUESTIONS,
            input.show_history,
            &mut stdout,
        )
        .await
    }
}

async fn run_transcript<P, W>(
    manager: &ConversationManager<P>,
    session_id: &str,
    questions: &[&str],
    show_history: bool,
    out: &mut W,
) -> anyhow::Result<()>
where
    P: LLMProvider + Send + Sync,
    W: Write,
{
    writeln!(out, "--- Iniciando o GeoAI Mentor ---")?;
    writeln!(out, "Sessão ID: {session_id}\n")?;

    for question in questions {
        writeln!(out, "Usuário: {question}")?;
        out.flush()?;

        let reply = manager.handle_turn(session_id, question).await?;

        writeln!(out, "GeoAI Mentor: {reply}\n")?;
    }

    writeln!(out, "--- Fim da Conversa ---")?;

    if show_history {
        for message in manager.history(session_id) {
            writeln!(out, "[{}] {}", message.role, message.content)?;
        }
    }

    info!("Demo finished: {} turns in session {session_id}", questions.len());
    Ok(())
}
