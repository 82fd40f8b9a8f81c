use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{JarvisError, Result};

/// Top-level configuration for the Jarvis assistant.
///
/// Loaded from `~/.jarvis/config.toml` by default. Every section falls back
/// to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JarvisConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub documents: DocumentConfig,
    #[serde(default)]
    pub search: WebSearchConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
}

impl JarvisConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: JarvisConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        let docs = &self.documents;
        if docs.chunk_size == 0 {
            return Err(JarvisError::Config("documents.chunk_size must be > 0".into()));
        }
        if docs.chunk_overlap >= docs.chunk_size {
            return Err(JarvisError::Config(format!(
                "documents.chunk_overlap ({}) must be smaller than chunk_size ({})",
                docs.chunk_overlap, docs.chunk_size
            )));
        }
        if docs.question_top_k == 0 || docs.command_top_k == 0 {
            return Err(JarvisError::Config("documents top_k values must be > 0".into()));
        }
        if !matches!(docs.backend.as_str(), "lexical" | "semantic") {
            return Err(JarvisError::Config(format!(
                "unknown documents.backend '{}' (expected lexical or semantic)",
                docs.backend
            )));
        }
        if !matches!(self.memory.backend.as_str(), "json" | "sqlite") {
            return Err(JarvisError::Config(format!(
                "unknown memory.backend '{}' (expected json or sqlite)",
                self.memory.backend
            )));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(JarvisError::Config("llm.base_url must not be empty".into()));
        }
        self.general.tz()?;
        Ok(())
    }

    /// Upload directory, resolved against the data directory when relative.
    pub fn upload_root(&self) -> PathBuf {
        let dir = expand_home(&self.documents.upload_dir);
        if dir.is_absolute() {
            dir
        } else {
            self.general.resolved_data_dir().join(dir)
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the memory store and uploads.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// API server port.
    pub port: u16,
    /// IANA timezone used for time answers.
    pub timezone: String,
    /// Longest accepted chat message, in characters.
    pub max_message_chars: usize,
}

impl GeneralConfig {
    /// Parse the configured timezone.
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| JarvisError::Config(format!("invalid timezone '{}': {}", self.timezone, e)))
    }

    /// Data directory with a leading `~` expanded to the home directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.jarvis/data".to_string(),
            log_level: "info".to_string(),
            port: 8000,
            timezone: "Asia/Karachi".to_string(),
            max_message_chars: 4000,
        }
    }
}

/// Language model endpoint configuration (OpenAI-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// System prompt for the default conversation.
    pub system_prompt: String,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable.
    ///
    /// A missing or blank key is a configuration error; the server must not
    /// start without one.
    pub fn resolve_api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(JarvisError::Config(format!(
                "missing {} in environment",
                self.api_key_env
            ))),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            temperature: 0.3,
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            system_prompt: "You are Jarvis. Be helpful, accurate, and concise.".to_string(),
        }
    }
}

/// Document indexing and retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Nominal chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Chunks retrieved for implicit document questions.
    pub question_top_k: usize,
    /// Chunks retrieved for the `/pdf` command.
    pub command_top_k: usize,
    /// Retrieval backend: "lexical" or "semantic".
    pub backend: String,
    /// Directory for uploaded files, relative to the data directory unless absolute.
    pub upload_dir: String,
    /// File extensions accepted by the upload endpoint (lowercase, no dot).
    pub allowed_extensions: Vec<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            chunk_size: 900,
            chunk_overlap: 150,
            question_top_k: 8,
            command_top_k: 4,
            backend: "lexical".to_string(),
            upload_dir: "uploads".to_string(),
            allowed_extensions: vec!["txt".to_string(), "md".to_string(), "pdf".to_string()],
        }
    }
}

/// Web search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    pub enabled: bool,
    pub max_results: usize,
    pub endpoint: String,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_results: 5,
            endpoint: "https://api.duckduckgo.com/".to_string(),
        }
    }
}

/// Persisted memory/notes configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Backend: "json" (single file) or "sqlite".
    pub backend: String,
    /// File name inside the data directory.
    pub file_name: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: "json".to_string(),
            file_name: "memory.json".to_string(),
        }
    }
}

/// Limits on volatile per-session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum live sessions before the least recently used is evicted (0 = unbounded).
    pub max_sessions: usize,
    /// Idle minutes before a session's volatile state is dropped (0 = never).
    pub idle_timeout_minutes: u64,
    /// Messages kept in each conversation history, whole turns only (0 = unbounded).
    pub max_history_messages: usize,
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_minutes > 0).then(|| Duration::from_secs(self.idle_timeout_minutes * 60))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            idle_timeout_minutes: 24 * 60,
            max_history_messages: 50,
        }
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = JarvisConfig::default();
        assert_eq!(config.general.port, 8000);
        assert_eq!(config.general.timezone, "Asia/Karachi");
        assert_eq!(config.llm.model, "openai/gpt-4o-mini");
        assert_eq!(config.documents.chunk_size, 900);
        assert_eq!(config.documents.chunk_overlap, 150);
        assert_eq!(config.documents.question_top_k, 8);
        assert_eq!(config.documents.command_top_k, 4);
        assert_eq!(config.documents.allowed_extensions, vec!["txt", "md", "pdf"]);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.memory.backend, "json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "debug"
timezone = "Europe/Berlin"

[documents]
chunk_size = 500
chunk_overlap = 50
"#;
        let file = create_temp_config(content);
        let config = JarvisConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.port, 8000);
        assert_eq!(config.documents.chunk_size, 500);
        assert_eq!(config.documents.backend, "lexical");
        assert_eq!(config.llm.api_key_env, "OPENROUTER_API_KEY");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = JarvisConfig::load(Path::new("/nonexistent/jarvis.toml")).unwrap_err();
        assert!(matches!(err, JarvisError::Io(_)));
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let file = create_temp_config("[general\nport = ");
        assert!(matches!(
            JarvisConfig::load(file.path()),
            Err(JarvisError::Config(_))
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = JarvisConfig::default();
        config.general.port = 9100;
        config.save(&path).unwrap();

        let reloaded = JarvisConfig::load(&path).unwrap();
        assert_eq!(reloaded.general.port, 9100);
        assert_eq!(reloaded.documents.allowed_extensions, config.documents.allowed_extensions);
    }

    #[test]
    fn test_validate_rejects_overlap_not_smaller_than_size() {
        let mut config = JarvisConfig::default();
        config.documents.chunk_overlap = config.documents.chunk_size;
        assert!(matches!(config.validate(), Err(JarvisError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_backends() {
        let mut config = JarvisConfig::default();
        config.documents.backend = "chroma".to_string();
        assert!(config.validate().is_err());

        let mut config = JarvisConfig::default();
        config.memory.backend = "redis".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_timezone() {
        let mut config = JarvisConfig::default();
        config.general.timezone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_api_key_missing_is_config_error() {
        let config = LlmConfig {
            api_key_env: "JARVIS_TEST_KEY_THAT_DOES_NOT_EXIST".to_string(),
            ..LlmConfig::default()
        };
        let err = config.resolve_api_key().unwrap_err();
        assert!(err.to_string().contains("JARVIS_TEST_KEY_THAT_DOES_NOT_EXIST"));
    }

    #[test]
    fn test_session_idle_timeout() {
        let mut sessions = SessionConfig::default();
        assert_eq!(sessions.idle_timeout(), Some(Duration::from_secs(24 * 3600)));
        sessions.idle_timeout_minutes = 0;
        assert_eq!(sessions.idle_timeout(), None);
    }

    #[test]
    fn test_upload_root_relative_to_data_dir() {
        let mut config = JarvisConfig::default();
        config.general.data_dir = "/srv/jarvis".to_string();
        assert_eq!(config.upload_root(), PathBuf::from("/srv/jarvis/uploads"));

        config.documents.upload_dir = "/tmp/up".to_string();
        assert_eq!(config.upload_root(), PathBuf::from("/tmp/up"));
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/var/jarvis"), PathBuf::from("/var/jarvis"));
        assert_eq!(expand_home("data"), PathBuf::from("data"));
    }
}
