use clap::Args;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.pib.gov.in/allRel.aspx?reg=3&lang=1";
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const ARTICLE_CHAR_LIMIT: usize = 15_000;

/// Settings shared by the CLI and the server. Every flag can also come from the environment
/// (or a `.env` file loaded before parsing).
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Listing page of the press-release site
    #[arg(long, env = "PIB_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// OpenAI-compatible chat completions endpoint
    #[arg(long, env = "OPENAI_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Completion service credential
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model used for both filtering and summarization
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Titles sent to the relevance filter per request
    #[arg(long, env = "PIB_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Parallel harvest/filter calls
    #[arg(long, env = "PIB_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Timeout for listing requests, in seconds
    #[arg(long, env = "PIB_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Timeout for article page requests, in seconds
    #[arg(long, env = "PIB_ARTICLE_TIMEOUT_SECS", default_value_t = 10)]
    pub article_timeout_secs: u64,
}

impl Settings {
    /// The credential is mandatory; nothing may run without it.
    pub fn require_api_key(&self) -> anyhow::Result<String> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key.to_string()),
            _ => anyhow::bail!(
                "API key missing! Set OPENAI_API_KEY in the environment or in a .env file"
            ),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            base_url: self.base_url.clone(),
            batch_size: self.batch_size.max(1),
            concurrency: self.concurrency.max(1),
            http_timeout: Duration::from_secs(self.http_timeout_secs),
            article_timeout: Duration::from_secs(self.article_timeout_secs),
        }
    }
}

/// Runtime knobs for the pipeline components.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub base_url: String,
    pub batch_size: usize,
    pub concurrency: usize,
    pub http_timeout: Duration,
    pub article_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            http_timeout: Duration::from_secs(30),
            article_timeout: Duration::from_secs(10),
        }
    }
}
