//! Configuration resolution for feedback-synth
//!
//! Generation settings come from the `[generation]` TOML section with
//! compiled defaults; the API key additionally honours the environment.

use feedback_common::config::TomlConfig;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable holding the Anthropic API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_PORT: u16 = 5740;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Model selection passed with every generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl GenerationSettings {
    pub fn from_toml(toml_config: &TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            model: toml_config
                .generation
                .model
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(defaults.model),
            max_tokens: toml_config
                .generation
                .max_tokens
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_tokens),
        }
    }
}

/// HTTP timeout for the generation service
pub fn generation_timeout(toml_config: &TomlConfig) -> Duration {
    Duration::from_secs(
        toml_config
            .generation
            .timeout_secs
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
    )
}

/// Resolve the API key from 2-tier configuration
///
/// **Priority:** ENV → TOML
///
/// Returns `None` when unconfigured; startup continues and generation calls
/// report an authentication failure.
pub fn resolve_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .generation
        .api_key
        .clone()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "API key found in both environment and TOML config. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("API key loaded from environment variable");
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("API key loaded from TOML config");
        return Some(key);
    }

    warn!(
        "No API key configured; summary generation will fail until {} or generation.api_key is set",
        API_KEY_ENV
    );
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
