//! Configuration management for PaperScope
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - The legacy `DEMO_MODE` switch
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Local HTTP API configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Paper store and index snapshot locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Summarization strategy configuration
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Embedding configuration for similarity search
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// arXiv API configuration
    #[serde(default)]
    pub arxiv: ArxivConfig,

    /// Document download configuration
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// JSON file holding every stored paper record
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// JSON snapshot of the records at the last index build
    #[serde(default = "default_index_meta_path")]
    pub index_meta_path: PathBuf,
}

/// Which summarization strategy the process runs with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    /// Local, deterministic, no network
    Demo,
    /// External generation service
    #[default]
    Live,
}

impl SummaryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryMode::Demo => "demo",
            SummaryMode::Live => "live",
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, SummaryMode::Demo)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummarizerConfig {
    /// demo or live
    #[serde(default)]
    pub mode: SummaryMode,

    /// API key for the generation service
    pub api_key: Option<String>,

    /// Chat completions base URL (OpenAI-compatible)
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,

    /// Model to use
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Maximum output tokens
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: usize,

    /// Input longer than this is truncated before prompting
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

/// Embedding backend used by the similarity index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Deterministic hash-seeded pseudo-embedding
    #[default]
    Hash,
    /// OpenAI-compatible embeddings endpoint
    OpenAI,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// hash or openai
    #[serde(default)]
    pub provider: EmbeddingProvider,

    /// API key for embedding service
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// Model to use
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries
    #[serde(default = "default_embedding_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArxivConfig {
    /// Atom query endpoint
    #[serde(default = "default_arxiv_api_base")]
    pub api_base: String,

    /// Results per keyword search
    #[serde(default = "default_arxiv_max_results")]
    pub max_results: usize,

    /// Request timeout in seconds
    #[serde(default = "default_arxiv_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Upper bound on a single document download, in seconds
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// User-Agent sent with downloads
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Largest accepted document in bytes
    #[serde(default = "default_fetch_max_bytes")]
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error) or a full EnvFilter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,
}

// Default value functions
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8501 }
fn default_request_timeout() -> u64 { 120 }
fn default_max_upload_bytes() -> usize { 50 * 1024 * 1024 }
fn default_db_path() -> PathBuf { PathBuf::from("papers.json") }
fn default_index_meta_path() -> PathBuf { PathBuf::from("meta.json") }
fn default_llm_api_base() -> String { "https://api.openai.com/v1".to_string() }
fn default_llm_model() -> String { "gpt-4o-mini".to_string() }
fn default_llm_timeout() -> u64 { 60 }
fn default_llm_max_tokens() -> usize { 1000 }
fn default_max_input_chars() -> usize { 30_000 }
fn default_embedding_model() -> String { "text-embedding-3-small".to_string() }
fn default_embedding_dimension() -> usize { crate::DEFAULT_EMBEDDING_DIMENSION }
fn default_embedding_timeout() -> u64 { 30 }
fn default_embedding_retries() -> u32 { 3 }
fn default_arxiv_api_base() -> String { "http://export.arxiv.org/api/query".to_string() }
fn default_arxiv_max_results() -> usize { 5 }
fn default_arxiv_timeout() -> u64 { 30 }
fn default_fetch_timeout() -> u64 { 30 }
fn default_user_agent() -> String { format!("paperscope/{}", crate::VERSION) }
fn default_fetch_max_bytes() -> usize { 50 * 1024 * 1024 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            index_meta_path: default_index_meta_path(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            mode: SummaryMode::default(),
            api_key: None,
            api_base: default_llm_api_base(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
            max_tokens: default_llm_max_tokens(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            api_key: None,
            api_base: None,
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            timeout_secs: default_embedding_timeout(),
            max_retries: default_embedding_retries(),
        }
    }
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            api_base: default_arxiv_api_base(),
            max_results: default_arxiv_max_results(),
            timeout_secs: default_arxiv_timeout(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
            max_bytes: default_fetch_max_bytes(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
        }
    }
}

/// Interpret the legacy `DEMO_MODE` flag value
pub fn demo_mode_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let demo_override = std::env::var("DEMO_MODE")
            .ok()
            .filter(|v| demo_mode_flag(v))
            .map(|_| SummaryMode::Demo.as_str());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., APP__STORAGE__DB_PATH=papers.json
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("summarizer.mode", demo_override)?
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Whether the process runs without any external calls
    pub fn is_demo(&self) -> bool {
        self.summarizer.mode.is_demo()
    }
}
