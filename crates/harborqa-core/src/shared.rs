//! Shared types used across all HarborQA crates.

use crate::knowledge::ChunkPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Provenance marker for live model output.
pub const LIVE_MARKER: &str = "Live Gemini Model";

/// Provenance marker for fallback (degraded-mode) output.
pub const FALLBACK_MARKER: &str = "Circuit Breaker (Stability Mode)";

const DEFAULT_MODEL_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// One generated test case. Immutable once returned; the id is unique within
/// a single response, not globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub title: String,
    pub description: String,
    pub steps: Vec<String>,
    pub expected_result: String,
}

/// Tag distinguishing live model output from fallback output in a response.
/// The caller must inspect this to know which path was taken; both paths
/// answer HTTP 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Live,
    Fallback,
}

impl Provenance {
    /// Wire string for `context_used` and log lines.
    pub fn marker(&self) -> &'static str {
        match self {
            Provenance::Live => LIVE_MARKER,
            Provenance::Fallback => FALLBACK_MARKER,
        }
    }
}

/// Global application configuration. Constructed once at process start and
/// passed by reference into the gateway, agents, and ingestion components —
/// never read from ambient global state after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application identity shown by the health endpoint.
    pub app_name: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Base directory for the sled chunk index.
    pub storage_path: String,
    /// LLM mode: "mock" (deterministic offline) or "live" (hosted API).
    pub llm_mode: String,
    /// Full generateContent endpoint of the hosted model.
    pub model_url: String,
    /// Credential for the hosted model API. Required in live mode; the
    /// process refuses to start without it.
    #[serde(default)]
    pub api_key: String,
    /// Bounded wait for one model call, in seconds.
    pub request_timeout_secs: u64,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks of the same document, in characters.
    pub chunk_overlap: usize,
}

impl AppConfig {
    /// Load config from file and environment. Precedence: env `HARBORQA_CONFIG`
    /// path > `config/gateway.toml` > defaults, with `HARBORQA_*` environment
    /// overrides on top.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("HARBORQA_CONFIG").unwrap_or_else(|_| "config/gateway".to_string());
        let builder = config::Config::builder()
            .set_default("app_name", "HarborQA Agent")?
            .set_default("port", 8000_i64)?
            .set_default("storage_path", "./data")?
            .set_default("llm_mode", "mock")?
            .set_default("model_url", DEFAULT_MODEL_URL)?
            .set_default("request_timeout_secs", 10_i64)?
            .set_default("chunk_size", 1000_i64)?
            .set_default("chunk_overlap", 100_i64)?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("HARBORQA").separator("__"))
            .build()?;

        let cfg: Self = built.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Live mode refuses to start without the model credential. There is no
    /// partial-service mode.
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.llm_mode == "live" && self.api_key.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "api_key is required in live mode (set HARBORQA_API_KEY or use a .env file)"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Bounded wait for a single model call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Chunking parameters for the ingestion pipeline.
    pub fn chunk_policy(&self) -> ChunkPolicy {
        ChunkPolicy {
            max_len: self.chunk_size,
            overlap: self.chunk_overlap,
        }
    }

    /// Directory of the sled chunk index, derived from `storage_path`.
    pub fn index_path(&self) -> PathBuf {
        Path::new(&self.storage_path).join("harborqa_index")
    }
}
