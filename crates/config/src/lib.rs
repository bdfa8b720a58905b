//! Configuration loading, validation, and management for SupportDesk.
//!
//! Loads configuration from `~/.supportdesk/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.supportdesk/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the LLM / embedding provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider name (selects the default base URL)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Override the provider base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Chat model used by the retrieval chains and the agent
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Embedding model used to build the document indexes
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Per-session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Chunking and retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Corpus answered by the plain RAG chain (agent disabled)
    #[serde(default = "default_corpus")]
    pub default_corpus: CorpusConfig,

    /// Per-domain corpora, each exposed to the agent as a tool
    #[serde(default = "default_corpora")]
    pub corpora: Vec<CorpusConfig>,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Web search tool settings
    #[serde(default)]
    pub web_search: WebSearchConfig,

    /// Where answer feedback is recorded
    #[serde(default)]
    pub feedback: FeedbackConfig,

    /// Optional TOML file holding the FAQ tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faq_path: Option<PathBuf>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.5
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_true() -> bool {
    true
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("embedding_model", &self.embedding_model)
            .field("session", &self.session)
            .field("retrieval", &self.retrieval)
            .field("default_corpus", &self.default_corpus)
            .field("corpora", &self.corpora)
            .field("agent", &self.agent)
            .field("web_search", &self.web_search)
            .field("feedback", &self.feedback)
            .field("faq_path", &self.faq_path)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Ceiling for a single input and for the retained chat history, in tokens
    #[serde(default = "default_max_allowed_tokens")]
    pub max_allowed_tokens: usize,

    /// Whether new sessions start with the agent enabled
    #[serde(default)]
    pub agent_by_default: bool,

    /// Fixed system message kept at the head of the chat history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,
}

fn default_max_allowed_tokens() -> usize {
    1000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_allowed_tokens: default_max_allowed_tokens(),
            agent_by_default: false,
            preamble: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Target chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters of overlap carried between neighbouring chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Boundary the splitter cuts on
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Matches returned per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Texts per embedding request while building an index
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,
}

fn default_chunk_size() -> usize {
    500
}
fn default_chunk_overlap() -> usize {
    30
}
fn default_separator() -> String {
    "\n".into()
}
fn default_top_k() -> usize {
    5
}
fn default_embed_batch_size() -> usize {
    64
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            separator: default_separator(),
            top_k: default_top_k(),
            embed_batch_size: default_embed_batch_size(),
        }
    }
}

/// One document corpus and the on-disk store its index is persisted to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Short identifier used in logs
    pub name: String,

    /// Folder holding the source documents
    pub folder: PathBuf,

    /// Directory the built index is persisted to
    pub store: PathBuf,

    /// Tool name the agent sees for this corpus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// Tool description the agent uses to pick this corpus
    #[serde(default)]
    pub description: String,

    /// Descend into sub-folders when loading documents
    #[serde(default)]
    pub recursive: bool,
}

impl CorpusConfig {
    /// The tool name, falling back to the corpus name.
    pub fn tool_name(&self) -> &str {
        self.tool_name.as_deref().unwrap_or(&self.name)
    }
}

fn default_corpus() -> CorpusConfig {
    CorpusConfig {
        name: "all".into(),
        folder: PathBuf::from("data"),
        store: PathBuf::from(".db_all"),
        tool_name: None,
        description: "All support documents".into(),
        recursive: true,
    }
}

fn default_corpora() -> Vec<CorpusConfig> {
    vec![
        CorpusConfig {
            name: "service".into(),
            folder: PathBuf::from("data/service"),
            store: PathBuf::from(".db_service"),
            tool_name: Some("service_docs".into()),
            description: "Use when you need information about the company's service offering".into(),
            recursive: false,
        },
        CorpusConfig {
            name: "customer".into(),
            folder: PathBuf::from("data/customer"),
            store: PathBuf::from(".db_customer"),
            tool_name: Some("customer_interactions".into()),
            description: "Use when you need information about past interactions with customers".into(),
            recursive: false,
        },
        CorpusConfig {
            name: "company".into(),
            folder: PathBuf::from("data/company"),
            store: PathBuf::from(".db_company"),
            tool_name: Some("company_info".into()),
            description: "Use when you need information about the company itself".into(),
            recursive: false,
        },
    ]
}

/// What the agent does when it runs out of iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyStopping {
    /// Make one last model call asking for a final answer
    Generate,
    /// Return a fixed "stopped" message
    Force,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    #[serde(default = "default_early_stopping")]
    pub early_stopping: EarlyStopping,

    /// Feed unparseable model output back as an observation instead of failing
    #[serde(default = "default_true")]
    pub handle_parsing_errors: bool,
}

fn default_max_iterations() -> u32 {
    5
}
fn default_early_stopping() -> EarlyStopping {
    EarlyStopping::Generate
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            early_stopping: default_early_stopping(),
            handle_parsing_errors: true,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_search_url")]
    pub api_url: String,

    #[serde(default = "default_search_engine")]
    pub engine: String,

    #[serde(default = "default_search_tool_name")]
    pub tool_name: String,

    #[serde(default = "default_search_description")]
    pub description: String,
}

fn default_search_url() -> String {
    "https://serpapi.com/search.json".into()
}
fn default_search_engine() -> String {
    "google".into()
}
fn default_search_tool_name() -> String {
    "web_search".into()
}
fn default_search_description() -> String {
    "Use when a question about the company's services needs information from the web".into()
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            api_url: default_search_url(),
            engine: default_search_engine(),
            tool_name: default_search_tool_name(),
            description: default_search_description(),
        }
    }
}

impl std::fmt::Debug for WebSearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSearchConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("engine", &self.engine)
            .field("tool_name", &self.tool_name)
            .field("description", &self.description)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSinkKind {
    /// Emit a tracing event per record
    Log,
    /// Append JSON lines to `feedback.path`
    Jsonl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_feedback_sink")]
    pub sink: FeedbackSinkKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_feedback_sink() -> FeedbackSinkKind {
    FeedbackSinkKind::Log
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            sink: default_feedback_sink(),
            path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.supportdesk/config.toml).
    ///
    /// Also checks environment variables:
    /// - `SUPPORTDESK_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `SUPPORTDESK_MODEL`
    /// - `SERPAPI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_file(&Self::config_dir().join("config.toml"))
    }

    /// Load from an explicit path, then apply environment overrides.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("SUPPORTDESK_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(model) = lookup("SUPPORTDESK_MODEL") {
            self.model = model;
        }

        if self.web_search.api_key.is_none() {
            self.web_search.api_key = lookup("SERPAPI_API_KEY");
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".supportdesk")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.session.max_allowed_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "session.max_allowed_tokens must be > 0".into(),
            ));
        }

        if self.retrieval.chunk_size == 0 || self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.chunk_size and retrieval.top_k must be > 0".into(),
            ));
        }

        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "retrieval.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.retrieval.chunk_overlap, self.retrieval.chunk_size
            )));
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be > 0".into(),
            ));
        }

        let mut names: Vec<&str> = self.corpora.iter().map(|c| c.tool_name()).collect();
        if self.web_search.enabled {
            names.push(&self.web_search.tool_name);
        }
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        if names.len() != total {
            return Err(ConfigError::ValidationError(
                "tool names (corpora and web search) must be unique".into(),
            ));
        }

        if self.feedback.sink == FeedbackSinkKind::Jsonl && self.feedback.path.is_none() {
            return Err(ConfigError::ValidationError(
                "feedback.path is required when feedback.sink = \"jsonl\"".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            api_url: None,
            model: default_model(),
            temperature: default_temperature(),
            embedding_model: default_embedding_model(),
            session: SessionConfig::default(),
            retrieval: RetrievalConfig::default(),
            default_corpus: default_corpus(),
            corpora: default_corpora(),
            agent: AgentConfig::default(),
            web_search: WebSearchConfig::default(),
            feedback: FeedbackConfig::default(),
            faq_path: None,
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
