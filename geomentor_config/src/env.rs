//! Environment variables with `.env` file fallback.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_VAR: &str = "GEOMENTOR_MODEL";

const KNOWN_VARS: [&str; 3] = [API_KEY_VAR, BASE_URL_VAR, MODEL_VAR];

/// Snapshot of the variables this application reads.
///
/// Values set in the process environment win over values from `.env`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    /// Read `dotenv_path` (if it exists) and overlay the process environment.
    #[must_use]
    pub fn collect(dotenv_path: &Path) -> Self {
        let mut vars = HashMap::new();

        if let Ok(contents) = std::fs::read_to_string(dotenv_path) {
            debug!("Loading environment from {}", dotenv_path.display());
            vars.extend(
                parse_dotenv(&contents)
                    .into_iter()
                    .filter(|(key, _)| KNOWN_VARS.contains(&key.as_str())),
            );
        }

        for key in KNOWN_VARS {
            if let Ok(value) = std::env::var(key) {
                vars.insert(key.to_string(), value);
            }
        }

        Self { vars }
    }

    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Non-empty value of `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Parse `KEY=VALUE` lines; blank lines and `#` comments are skipped.
#[must_use]
pub fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}
