//! WhisperWall configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use wallstore::FileStore;

use crate::domain::{TargetLanguage, ThemeType};
use crate::llm::LlmError;

/// Main WhisperWall configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Generative service configuration
    pub llm: LlmConfig,

    /// Retry/backoff policy for generative calls
    pub retry: RetryConfig,

    /// Undo history configuration
    pub history: HistoryConfig,

    /// Local storage configuration
    pub storage: StorageConfig,

    /// Local moderation stage
    pub moderation: ModerationConfig,

    /// Prompt template overrides
    pub prompts: PromptsConfig,

    /// App-level defaults
    pub app: AppConfig,
}

impl Config {
    /// Validate configuration before talking to the generative service
    ///
    /// Call this early in commands that need the LLM to fail fast with a
    /// clear error message.
    pub fn validate(&self) -> Result<()> {
        let resolved = self.llm.resolve()?;
        resolved.get_api_key()?;
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::candidate_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Never fails; a broken config file is reported later by [`Config::load`].
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let paths: Vec<PathBuf> = match config_path {
            Some(p) => vec![p.clone()],
            None => Self::candidate_paths(),
        };
        paths
            .into_iter()
            .find(|p| p.exists())
            .and_then(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    /// Project-local `.whisperwall.yml`, then `~/.config/whisperwall/whisperwall.yml`
    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".whisperwall.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("whisperwall").join("whisperwall.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Generative service configuration
///
/// `model`, `api-key-env` and `base-url` default per provider when left unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("gemini" or "anthropic")
    pub provider: String,

    /// Model identifier
    pub model: Option<String>,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: Option<String>,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            api_key_env: None,
            base_url: None,
            max_tokens: 8192,
            timeout_ms: 60_000,
        }
    }
}

impl LlmConfig {
    /// Fill in provider defaults
    pub fn resolve(&self) -> Result<ResolvedLlmConfig, LlmError> {
        let (model, key_env, base_url) = match self.provider.as_str() {
            "gemini" => (
                "gemini-2.5-flash",
                "GEMINI_API_KEY",
                "https://generativelanguage.googleapis.com",
            ),
            "anthropic" => ("claude-sonnet-4-20250514", "ANTHROPIC_API_KEY", "https://api.anthropic.com"),
            other => return Err(LlmError::UnknownProvider(other.to_string())),
        };

        Ok(ResolvedLlmConfig {
            provider: self.provider.clone(),
            model: self.model.clone().unwrap_or_else(|| model.to_string()),
            api_key_env: self.api_key_env.clone().unwrap_or_else(|| key_env.to_string()),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| base_url.to_string())
                .trim_end_matches('/')
                .to_string(),
            max_tokens: self.max_tokens,
            timeout_ms: self.timeout_ms,
        })
    }
}

/// LLM settings with every provider default applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key_env: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

impl ResolvedLlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String, LlmError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey(self.api_key_env.clone()))
    }
}

/// Retry/backoff policy for generative calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub retries: u32,

    /// Delay before the first retry; doubles each retry
    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,

    /// Upper bound for any single delay
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 8000,
        }
    }
}

/// Undo history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Edits closer together than this collapse into one history entry
    #[serde(rename = "debounce-ms")]
    pub debounce_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

impl HistoryConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding drafts, posts and the ownership set
    pub dir: Option<String>,
}

impl StorageConfig {
    /// Configured directory with `~/` expanded, or the platform data dir
    pub fn resolve_dir(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(expand_home(dir)),
            None => FileStore::default_dir().context("Failed to determine storage directory"),
        }
    }
}

/// Local moderation stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Mask profanity in drafts locally as well as remotely
    #[serde(rename = "local-filter")]
    pub local_filter: bool,

    /// Additional word stems to mask
    #[serde(rename = "extra-terms")]
    pub extra_terms: Vec<String>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            local_filter: true,
            extra_terms: Vec::new(),
        }
    }
}

/// Prompt template overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory searched for `{name}.pmt` before the embedded templates
    pub dir: Option<String>,
}

impl PromptsConfig {
    pub fn resolve_dir(&self) -> Option<PathBuf> {
        self.dir.as_deref().map(expand_home)
    }
}

/// App-level defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// UI language; also the initial draft language
    pub language: TargetLanguage,

    /// Theme id handed to the presentation layer
    pub theme: ThemeType,
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.retry.retries, 3);
        assert_eq!(config.retry.base_delay_ms, 1000);
        assert_eq!(config.history.debounce_ms, 500);
        assert!(config.moderation.local_filter);
        assert_eq!(config.app.language, TargetLanguage::English);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_resolve_provider_defaults() {
        let resolved = LlmConfig::default().resolve().unwrap();
        assert_eq!(resolved.model, "gemini-2.5-flash");
        assert_eq!(resolved.api_key_env, "GEMINI_API_KEY");
        assert_eq!(resolved.base_url, "https://generativelanguage.googleapis.com");

        let anthropic = LlmConfig {
            provider: "anthropic".to_string(),
            ..LlmConfig::default()
        };
        let resolved = anthropic.resolve().unwrap();
        assert!(resolved.model.contains("sonnet"));
        assert_eq!(resolved.api_key_env, "ANTHROPIC_API_KEY");
    }

    #[test]
    fn test_resolve_unknown_provider() {
        let config = LlmConfig {
            provider: "llama".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(config.resolve(), Err(LlmError::UnknownProvider(_))));
    }

    #[test]
    fn test_missing_api_key() {
        let config = LlmConfig {
            api_key_env: Some("WHISPERWALL_TEST_KEY_THAT_IS_NEVER_SET".to_string()),
            ..LlmConfig::default()
        };
        let resolved = config.resolve().unwrap();
        assert!(matches!(resolved.get_api_key(), Err(LlmError::MissingApiKey(_))));
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug
llm:
  provider: anthropic
  model: claude-opus-4
  api-key-env: MY_API_KEY
  base-url: https://api.example.com/
  max-tokens: 4096
  timeout-ms: 30000

retry:
  retries: 5
  base-delay-ms: 250
  max-delay-ms: 2000

history:
  debounce-ms: 300

storage:
  dir: /tmp/ww

moderation:
  local-filter: false
  extra-terms: [heck]

app:
  language: Korean
  theme: Light
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        let resolved = config.llm.resolve().unwrap();
        assert_eq!(resolved.model, "claude-opus-4");
        assert_eq!(resolved.api_key_env, "MY_API_KEY");
        assert_eq!(resolved.base_url, "https://api.example.com");
        assert_eq!(resolved.max_tokens, 4096);
        assert_eq!(config.retry.retries, 5);
        assert_eq!(config.history.window(), Duration::from_millis(300));
        assert_eq!(config.storage.resolve_dir().unwrap(), PathBuf::from("/tmp/ww"));
        assert!(!config.moderation.local_filter);
        assert_eq!(config.moderation.extra_terms, vec!["heck".to_string()]);
        assert_eq!(config.app.language, TargetLanguage::Korean);
        assert_eq!(config.app.theme, ThemeType::Light);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gemini-2.0-flash
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.llm.model.as_deref(), Some("gemini-2.0-flash"));

        // Defaults for unspecified
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.retry.retries, 3);
        assert_eq!(config.history.debounce_ms, 500);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ww.yml");
        fs::write(&path, "log-level: warn\nretry:\n  retries: 1\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.retry.retries, 1);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let path = PathBuf::from("/definitely/not/here/ww.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/ww"), home.join("ww"));
        }
    }
}
