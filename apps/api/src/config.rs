use anyhow::{Context, Result};

/// Settings for the external analysis endpoint, passed by value into the
/// AI client at startup. Nothing reads the process environment after this
/// is built.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Application configuration loaded from environment variables.
/// Fails startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub ai: AiConfig,
    /// Default balance granted when a user record is auto-provisioned.
    pub initial_credits: i32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            ai: AiConfig {
                endpoint: require_env("AI_MODEL_ENDPOINT")?,
                api_key: require_env("AI_MODEL_API_KEY")?,
                model: env_or("AI_MODEL_NAME", "deepseek-r1"),
                temperature: env_or("AI_MODEL_TEMPERATURE", "0.7")
                    .parse()
                    .context("AI_MODEL_TEMPERATURE must be a number")?,
                max_tokens: env_or("AI_MODEL_MAX_TOKENS", "2000")
                    .parse()
                    .context("AI_MODEL_MAX_TOKENS must be a positive integer")?,
            },
            initial_credits: env_or("INITIAL_CREDITS", "10")
                .parse()
                .context("INITIAL_CREDITS must be an integer")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
