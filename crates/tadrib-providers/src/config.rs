//! Application configuration and assistant factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tadrib_core::state::Settings;
use tadrib_core::store::DEFAULT_QUOTA_BYTES;
use tadrib_core::traits::AiAssistant;

use crate::gemini::{
    GeminiAssistant, GeminiModels, DEFAULT_EVAL_MODEL, DEFAULT_QUIZ_MODEL, DEFAULT_TTS_MODEL,
    DEFAULT_TTS_VOICE,
};
use crate::mock::MockAssistant;

/// Which assistant backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantKind {
    #[default]
    Gemini,
    Mock,
}

/// Gemini connection settings.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Top-level tadrib configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TadribConfig {
    /// Assistant backend.
    #[serde(default)]
    pub assistant: AssistantKind,
    /// JSON file backing the key-value store.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Byte quota of the store.
    #[serde(default = "default_quota")]
    pub storage_quota_bytes: usize,
    /// Minimum interval between two storage-full alerts.
    #[serde(default = "default_cooldown")]
    pub alert_cooldown_ms: u64,
    /// Sender name on assistant chat messages.
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
    #[serde(default = "default_quiz_model")]
    pub quiz_model: String,
    #[serde(default = "default_eval_model")]
    pub eval_model: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
    /// Kept last: serialized as a TOML table.
    #[serde(default)]
    pub gemini: GeminiConfig,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./tadrib-store.json")
}
fn default_quota() -> usize {
    DEFAULT_QUOTA_BYTES
}
fn default_cooldown() -> u64 {
    3000
}
fn default_assistant_name() -> String {
    Settings::default().assistant_name
}
fn default_quiz_model() -> String {
    DEFAULT_QUIZ_MODEL.to_string()
}
fn default_eval_model() -> String {
    DEFAULT_EVAL_MODEL.to_string()
}
fn default_tts_model() -> String {
    DEFAULT_TTS_MODEL.to_string()
}
fn default_tts_voice() -> String {
    DEFAULT_TTS_VOICE.to_string()
}

impl Default for TadribConfig {
    fn default() -> Self {
        Self {
            assistant: AssistantKind::default(),
            store_path: default_store_path(),
            storage_quota_bytes: default_quota(),
            alert_cooldown_ms: default_cooldown(),
            assistant_name: default_assistant_name(),
            quiz_model: default_quiz_model(),
            eval_model: default_eval_model(),
            tts_model: default_tts_model(),
            tts_voice: default_tts_voice(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl TadribConfig {
    /// Orchestrator settings derived from this configuration.
    pub fn settings(&self) -> Settings {
        Settings {
            alert_cooldown: Duration::from_millis(self.alert_cooldown_ms),
            assistant_name: self.assistant_name.clone(),
        }
    }

    pub fn gemini_models(&self) -> GeminiModels {
        GeminiModels {
            quiz: self.quiz_model.clone(),
            evaluation: self.eval_model.clone(),
            speech: self.tts_model.clone(),
            voice: self.tts_voice.clone(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `tadrib.toml` in the current directory
/// 2. `~/.config/tadrib/config.toml`
///
/// Environment variable override: `TADRIB_GEMINI_KEY`.
pub fn load_config() -> Result<TadribConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TadribConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("tadrib.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loading config");
            toml::from_str::<TadribConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TadribConfig::default(),
    };

    if let Ok(key) = std::env::var("TADRIB_GEMINI_KEY") {
        config.gemini.api_key = key;
    }

    config.gemini.api_key = resolve_env_vars(&config.gemini.api_key);
    config.gemini.base_url = config.gemini.base_url.as_deref().map(resolve_env_vars);
    config.store_path = PathBuf::from(resolve_env_vars(&config.store_path.to_string_lossy()));

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("tadrib"))
}

/// Create the configured assistant.
pub fn create_assistant(config: &TadribConfig) -> Result<Box<dyn AiAssistant>> {
    match config.assistant {
        AssistantKind::Gemini => {
            if config.gemini.api_key.is_empty() {
                tracing::warn!("no Gemini API key configured; set TADRIB_GEMINI_KEY");
            }
            let assistant =
                GeminiAssistant::new(&config.gemini.api_key, config.gemini.base_url.clone())?
                    .with_models(config.gemini_models());
            Ok(Box::new(assistant))
        }
        AssistantKind::Mock => Ok(Box::new(MockAssistant::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_TADRIB_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_TADRIB_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_TADRIB_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_TADRIB_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = TadribConfig::default();
        assert_eq!(config.assistant, AssistantKind::Gemini);
        assert_eq!(config.storage_quota_bytes, 5 * 1024 * 1024);
        assert_eq!(config.settings().alert_cooldown, Duration::from_secs(3));
        assert_eq!(config.tts_model, "gemini-2.5-flash-preview-tts");
    }

    #[test]
    fn parse_config() {
        let toml_str = r#"
assistant = "mock"
store_path = "/tmp/lms.json"
storage_quota_bytes = 1024
alert_cooldown_ms = 500
quiz_model = "gemini-2.5-pro"

[gemini]
api_key = "AIza-test"
"#;
        let config: TadribConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.assistant, AssistantKind::Mock);
        assert_eq!(config.storage_quota_bytes, 1024);
        assert_eq!(config.settings().alert_cooldown, Duration::from_millis(500));
        assert_eq!(config.gemini_models().quiz, "gemini-2.5-pro");
        assert_eq!(config.eval_model, DEFAULT_EVAL_MODEL);
    }

    #[test]
    fn debug_masks_api_key() {
        let config = GeminiConfig {
            api_key: "AIza-secret".into(),
            base_url: None,
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("AIza-secret"));
        assert!(printed.contains("***"));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tadrib.toml");
        std::fs::write(&path, "assistant = \"mock\"\nalert_cooldown_ms = 100\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.assistant, AssistantKind::Mock);
        assert_eq!(config.alert_cooldown_ms, 100);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/tadrib.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn mock_assistant_is_created() {
        let config = TadribConfig {
            assistant: AssistantKind::Mock,
            ..Default::default()
        };
        assert_eq!(create_assistant(&config).unwrap().name(), "mock");
    }
}
