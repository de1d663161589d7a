//! Environment-driven configuration
//!
//! Binaries call `dotenv::dotenv()` first, then `AppConfig::from_env()`.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ChatError;
use crate::Result;

/// Upper bound on the turns fed to a summarization pass.
///
/// Each pass appends two turns, so a live window of at most this size keeps
/// every older turn covered by the summary.
pub const SUMMARY_WINDOW: usize = 6;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SUMMARY_DIR: &str = "summaries";
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a friendly, helpful assistant. Answer the user's questions clearly and accurately.";

/// Sizing of the in-memory transcript
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryConfig {
    /// Turns quoted verbatim in the answer prompt
    pub live_window: usize,
    /// Turns kept in memory after a summarization pass
    pub retained_turns: usize,
    /// Turns returned to the caller after an interaction; at most `retained_turns`
    pub display_turns: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            live_window: SUMMARY_WINDOW,
            retained_turns: 10,
            display_turns: 10,
        }
    }
}

impl MemoryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.live_window == 0 || self.live_window > SUMMARY_WINDOW {
            return Err(ChatError::Config(format!(
                "live_window must be between 1 and {}",
                SUMMARY_WINDOW
            )));
        }

        if self.retained_turns < self.live_window {
            return Err(ChatError::Config(
                "retained_turns must be >= live_window".to_string(),
            ));
        }

        if self.display_turns == 0 {
            return Err(ChatError::Config(
                "display_turns must be > 0".to_string(),
            ));
        }

        if self.display_turns > self.retained_turns {
            return Err(ChatError::Config(
                "display_turns must be <= retained_turns".to_string(),
            ));
        }

        Ok(())
    }
}

/// Settings for the chat-completions client
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub system_prompt: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub memory: MemoryConfig,
    pub summary_dir: PathBuf,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            memory: MemoryConfig::default(),
            summary_dir: PathBuf::from(DEFAULT_SUMMARY_DIR),
            port: 8080,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let model = ModelConfig {
            api_key,
            base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.model.base_url),
            model: env::var("OPENAI_MODEL").unwrap_or(defaults.model.model),
            temperature: parse_var("OPENAI_TEMPERATURE", defaults.model.temperature)?,
            system_prompt: env::var("CHAT_SYSTEM_PROMPT")
                .unwrap_or(defaults.model.system_prompt),
        };

        if !(0.0..=2.0).contains(&model.temperature) {
            return Err(ChatError::Config(
                "OPENAI_TEMPERATURE must be between 0.0 and 2.0".to_string(),
            ));
        }

        let memory = MemoryConfig {
            live_window: parse_var("LIVE_WINDOW", defaults.memory.live_window)?,
            retained_turns: parse_var("RETAINED_TURNS", defaults.memory.retained_turns)?,
            display_turns: parse_var("DISPLAY_TURNS", defaults.memory.display_turns)?,
        };
        memory.validate()?;

        let port_var = if env::var("PORT").is_ok() { "PORT" } else { "API_PORT" };

        Ok(Self {
            model,
            memory,
            summary_dir: env::var("SUMMARY_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.summary_dir),
            port: parse_var(port_var, defaults.port)?,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ChatError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_memory_config_is_valid() {
        assert!(MemoryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_live_window_bounded_by_summary_window() {
        let config = MemoryConfig {
            live_window: SUMMARY_WINDOW + 1,
            retained_turns: 20,
            display_turns: 10,
        };
        assert!(matches!(config.validate(), Err(ChatError::Config(_))));

        let config = MemoryConfig {
            live_window: 0,
            ..MemoryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retained_turns_cover_live_window() {
        let config = MemoryConfig {
            live_window: 6,
            retained_turns: 4,
            display_turns: 10,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_display_turns_within_retained_turns() {
        let config = MemoryConfig {
            live_window: 6,
            retained_turns: 10,
            display_turns: 20,
        };
        assert!(matches!(config.validate(), Err(ChatError::Config(_))));
    }

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let value: usize = parse_var("SUMMARY_MEMORY_CHAT_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }
}
