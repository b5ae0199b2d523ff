//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input type, so
//! dispatch is resolved at compile time.

use geomentor_config::Config;
use geomentor_conversation::ConversationConfig;
use geomentor_providers::{OpenAiProvider, RetryPolicy};
use tracing::info;

mod chat;
mod demo;
mod init;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use demo::{DemoInput, DemoStrategy};
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Components shared by the commands that talk to the model.
struct CommonComponents {
    config: Config,
    provider: OpenAiProvider,
}

fn init_common_components() -> anyhow::Result<CommonComponents> {
    let config = Config::load()?;

    let retry = RetryPolicy::from_secs(&config.retry.delays_secs);
    info!(
        "Provider: base_url={}, max_attempts={}",
        config.provider.base_url,
        retry.max_attempts()
    );

    let provider = OpenAiProvider::new(config.provider.api_key_or_empty())
        .with_base_url(config.provider.base_url.clone())
        .with_default_model(config.agent.model.clone())
        .with_retry_policy(retry);

    Ok(CommonComponents { config, provider })
}

/// Build the conversation config from file/env settings and CLI overrides.
///
/// Without a `--model` override the provider's default model applies, which
/// `init_common_components` sets from the configured model.
fn build_conversation_config(
    config: &Config,
    model: Option<String>,
    history_limit: Option<usize>,
) -> ConversationConfig {
    let defaults = &config.agent;
    let mut conversation = ConversationConfig::default()
        .with_temperature(defaults.temperature)
        .with_history_limit(history_limit.or(defaults.history_limit));

    if let Some(model) = model {
        conversation = conversation.with_model(model);
    }
    if let Some(prompt) = &defaults.system_prompt {
        conversation = conversation.with_system_prompt(prompt.clone());
    }
    conversation.max_tokens = defaults.max_tokens;

    conversation
}
