//! Application configuration: JSON file, `.env` file and process environment.

mod env;
mod schema;

pub use env::{API_KEY_VAR, BASE_URL_VAR, EnvVars, MODEL_VAR, parse_dotenv};
pub use schema::{AgentDefaults, Config, ProviderConfig, RetryConfig, SessionConfig};
