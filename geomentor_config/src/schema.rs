use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use geomentor_core::{DEFAULT_MODEL, DEFAULT_SESSION_ID, DEFAULT_TEMPERATURE};

use crate::env::{API_KEY_VAR, BASE_URL_VAR, EnvVars, MODEL_VAR};

const CONFIG_DIR_NAME: &str = "geomentor";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentDefaults,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AgentDefaults {
    #[serde(default = "AgentDefaults::default_model")]
    pub model: String,
    #[serde(default = "AgentDefaults::default_temperature")]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            temperature: Self::default_temperature(),
            max_tokens: None,
            system_prompt: None,
            history_limit: None,
        }
    }
}

impl AgentDefaults {
    fn default_model() -> String {
        DEFAULT_MODEL.to_string()
    }

    const fn default_temperature() -> f32 {
        DEFAULT_TEMPERATURE
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "ProviderConfig::default_base_url")]
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::default_base_url(),
        }
    }
}

impl ProviderConfig {
    fn default_base_url() -> String {
        "https://api.openai.com/v1".to_string()
    }

    /// The configured key, or an empty string when none is set.
    #[must_use]
    pub fn api_key_or_empty(&self) -> String {
        self.api_key.clone().unwrap_or_default()
    }
}

/// Delays in seconds between provider attempts. Empty means a single attempt.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct RetryConfig {
    #[serde(default)]
    pub delays_secs: Vec<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default = "SessionConfig::default_id")]
    pub default_id: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_id: Self::default_id(),
        }
    }
}

impl SessionConfig {
    fn default_id() -> String {
        DEFAULT_SESSION_ID.to_string()
    }
}

impl Config {
    /// Load `~/geomentor/config.json` (if present), then apply `./.env` and
    /// the process environment on top.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = if config_path.exists() {
            info!("Loading config from {}", config_path.display());
            Self::from_file(&config_path)?
        } else {
            info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.apply_env(&EnvVars::collect(Path::new(".env")));

        if config.provider.api_key.is_none() {
            warn!("{API_KEY_VAR} is not set; requests will fail to authenticate");
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read config {}: {e}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Environment values override file values.
    pub fn apply_env(&mut self, env: &EnvVars) {
        if let Some(key) = env.get(API_KEY_VAR) {
            self.provider.api_key = Some(key.to_string());
        }
        if let Some(url) = env.get(BASE_URL_VAR) {
            self.provider.base_url = url.to_string();
        }
        if let Some(model) = env.get(MODEL_VAR) {
            self.agent.model = model.to_string();
        }
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR_NAME))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        Self::create_config_at(&config_path)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Export {API_KEY_VAR} or put it in a .env file");
        println!("   2. Run 'geomentor demo' to ask the built-in questions");
        println!("   3. Run 'geomentor chat' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - agent.model: chat model to use (gpt-3.5-turbo, gpt-4o-mini, etc.)");
        println!("   - agent.history_limit: most recent messages sent with each request");
        println!("   - retry.delays_secs: seconds to wait before each retry (empty = no retry)");
        println!();
        Ok(())
    }

    /// Write the default config template to `path`, refusing to overwrite.
    pub fn create_config_at(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                path.display()
            );
        }

        let template = serde_json::to_string_pretty(&Self::default())?;
        std::fs::write(path, template)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_mentor_setup() {
        let config = Config::default();
        assert_eq!(config.agent.model, "gpt-3.5-turbo");
        assert!((config.agent.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.session.default_id, "geo_mentor_session");
        assert!(config.retry.delays_secs.is_empty());
        assert!(config.agent.history_limit.is_none());
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"agent": {"model": "gpt-4o-mini", "history_limit": 8}}"#)
                .unwrap();
        assert_eq!(config.agent.model, "gpt-4o-mini");
        assert_eq!(config.agent.history_limit, Some(8));
        assert!((config.agent.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.provider.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn env_overrides_file() {
        let mut config = Config::default();
        config.provider.api_key = Some("from-file".to_string());

        config.apply_env(&EnvVars::from_pairs([
            (API_KEY_VAR, "sk-env"),
            (BASE_URL_VAR, "http://localhost:11434/v1"),
            (MODEL_VAR, "llama3"),
        ]));

        assert_eq!(config.provider.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.provider.base_url, "http://localhost:11434/v1");
        assert_eq!(config.agent.model, "llama3");
    }

    #[test]
    fn empty_env_leaves_file_values() {
        let mut config = Config::default();
        config.provider.api_key = Some("from-file".to_string());
        config.apply_env(&EnvVars::default());
        assert_eq!(config.provider.api_key_or_empty(), "from-file");
    }

    #[test]
    fn template_round_trips_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        Config::create_config_at(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, Config::default());

        let err = Config::create_config_at(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }
}
