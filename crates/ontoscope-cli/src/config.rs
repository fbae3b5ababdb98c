//! CLI configuration
//!
//! Stored as TOML at `<config_dir>/ontoscope/config.toml`. The
//! `ONTOSCOPE_CONFIG_DIR` variable replaces `<config_dir>/ontoscope`.

use std::path::PathBuf;

use anyhow::Context;
use ontoscope_query::completion::{
    CompletionSettings, CLASSIFY_TEMPERATURE, DEFAULT_BASE_URL, DEFAULT_MODEL,
    DEFAULT_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};

/// Directory override, mainly for tests
pub const CONFIG_DIR_ENV: &str = "ONTOSCOPE_CONFIG_DIR";

const KEYS: &[&str] = &[
    "base_url",
    "api_key",
    "model",
    "temperature",
    "timeout_secs",
    "knowledge_base",
];

/// Directory holding the config file
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ontoscope")
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_base: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: CLASSIFY_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            knowledge_base: None,
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults if it is missing or unreadable
    pub fn load() -> Self {
        let path = config_file_path();
        let Ok(text) = std::fs::read_to_string(&path) else {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Self::default();
        };
        match toml::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring invalid config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)?;
        std::fs::write(&path, text)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        KEYS
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "base_url" => Some(self.base_url.clone()),
            "api_key" => Some(self.api_key.clone()),
            "model" => Some(self.model.clone()),
            "temperature" => Some(self.temperature.to_string()),
            "timeout_secs" => Some(self.timeout_secs.to_string()),
            "knowledge_base" => Some(
                self.knowledge_base
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            _ => None,
        }
    }

    /// Value as shown by `config list`, with the API key masked
    pub fn display_value(&self, key: &str) -> Option<String> {
        let value = self.get(key)?;
        if value.is_empty() {
            return Some("(not set)".to_string());
        }
        if key == "api_key" {
            return Some(mask_secret(&value));
        }
        Some(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "base_url" => self.base_url = value.to_string(),
            "api_key" => self.api_key = value.to_string(),
            "model" => self.model = value.to_string(),
            "temperature" => {
                let temperature: f32 = value
                    .parse()
                    .with_context(|| format!("Invalid temperature: {}", value))?;
                if !(0.0..=2.0).contains(&temperature) {
                    anyhow::bail!("Temperature must be between 0.0 and 2.0, got {}", value);
                }
                self.temperature = temperature;
            }
            "timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout: {}", value))?;
                if secs == 0 {
                    anyhow::bail!("Timeout must be at least one second");
                }
                self.timeout_secs = secs;
            }
            "knowledge_base" => {
                self.knowledge_base = if value.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            _ => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                key,
                KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Completion settings with `OPENAI_*` environment overrides applied
    pub fn completion_settings(&self) -> CompletionSettings {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        CompletionSettings {
            base_url: env("OPENAI_BASE_URL").unwrap_or_else(|| self.base_url.clone()),
            api_key: env("OPENAI_API_KEY").unwrap_or_else(|| self.api_key.clone()),
            model: env("OPENAI_MODEL").unwrap_or_else(|| self.model.clone()),
            timeout_secs: self.timeout_secs,
        }
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut config = Config::default();
        config.set("model", "gpt-4o").unwrap();
        config.set("temperature", "0.5").unwrap();
        config.set("knowledge_base", "/tmp/kb.json").unwrap();

        assert_eq!(config.get("model").as_deref(), Some("gpt-4o"));
        assert_eq!(config.get("temperature").as_deref(), Some("0.5"));
        assert_eq!(config.get("knowledge_base").as_deref(), Some("/tmp/kb.json"));

        config.set("knowledge_base", "").unwrap();
        assert!(config.knowledge_base.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("temperature", "hot").is_err());
        assert!(config.set("temperature", "3.5").is_err());
        assert!(config.set("timeout_secs", "0").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_api_key_is_masked() {
        let mut config = Config::default();
        assert_eq!(config.display_value("api_key").as_deref(), Some("(not set)"));

        config.set("api_key", "sk-abcdefghijklmnop").unwrap();
        assert_eq!(config.display_value("api_key").as_deref(), Some("sk-...mnop"));

        config.set("api_key", "demo").unwrap();
        assert_eq!(config.display_value("api_key").as_deref(), Some("****"));
    }

    #[test]
    fn test_toml_round_trip_with_missing_fields() {
        let config: Config = toml::from_str("model = \"llama3\"\n").unwrap();
        assert_eq!(config.model, "llama3");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
