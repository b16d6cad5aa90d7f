//! Runtime configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::generation::pipeline::DEFAULT_PROVIDER_TIMEOUT;
use crate::generation::sequencer::DEFAULT_PACING;
use crate::providers::models::DEFAULT_MODEL;

/// Settings for one studio process.
///
/// Loaded after `.env` has been applied, so either source works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    /// Root directory for sessions and cassettes (`STUDIO_HOME`).
    pub home: PathBuf,
    /// Model used when a chat does not name one (`STUDIO_DEFAULT_MODEL`).
    pub default_model: String,
    /// Delay before each file operation (`STUDIO_PACING_MS`).
    pub pacing: Duration,
    /// Deadline for a whole provider stream (`STUDIO_PROVIDER_TIMEOUT_SECS`).
    pub provider_timeout: Duration,
    /// `OPENAI_API_KEY`.
    pub openai_api_key: Option<String>,
    /// `OPENAI_BASE_URL`, for OpenAI-compatible gateways.
    pub openai_base_url: Option<String>,
    /// `OPENROUTER_API_KEY`.
    pub openrouter_api_key: Option<String>,
    /// `GEMINI_API_KEY`.
    pub gemini_api_key: Option<String>,
    /// `HUGGINGFACE_API_KEY`.
    pub huggingface_api_key: Option<String>,
    /// `STUDIO_RECORD`: directory to write a cassette into.
    pub record_dir: Option<PathBuf>,
    /// `STUDIO_REPLAY`: cassette to serve instead of live providers.
    pub replay_cassette: Option<PathBuf>,
}

impl StudioConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`; empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse or the provider
    /// timeout is zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let number = |key: &str| -> Result<Option<u64>, String> {
            get(key).map(|v| v.parse::<u64>().map_err(|e| format!("{key}={v}: {e}"))).transpose()
        };
        let timeout_secs = match number("STUDIO_PROVIDER_TIMEOUT_SECS")? {
            Some(0) => return Err("STUDIO_PROVIDER_TIMEOUT_SECS must be greater than zero".into()),
            secs => secs,
        };

        Ok(Self {
            home: get("STUDIO_HOME").map_or_else(|| PathBuf::from(".studio"), PathBuf::from),
            default_model: get("STUDIO_DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            pacing: number("STUDIO_PACING_MS")?.map_or(DEFAULT_PACING, Duration::from_millis),
            provider_timeout: timeout_secs.map_or(DEFAULT_PROVIDER_TIMEOUT, Duration::from_secs),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            gemini_api_key: get("GEMINI_API_KEY"),
            huggingface_api_key: get("HUGGINGFACE_API_KEY"),
            record_dir: get("STUDIO_RECORD").map(PathBuf::from),
            replay_cassette: get("STUDIO_REPLAY").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<StudioConfig, String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        StudioConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.home, PathBuf::from(".studio"));
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert_eq!(config.pacing, DEFAULT_PACING);
        assert_eq!(config.provider_timeout, Duration::from_secs(120));
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn values_are_read_and_blank_ones_ignored() {
        let config = config(&[
            ("STUDIO_HOME", "/tmp/studio"),
            ("STUDIO_PACING_MS", "0"),
            ("STUDIO_PROVIDER_TIMEOUT_SECS", "30"),
            ("GEMINI_API_KEY", "g-key"),
            ("OPENAI_API_KEY", "  "),
        ])
        .unwrap();
        assert_eq!(config.home, PathBuf::from("/tmp/studio"));
        assert_eq!(config.pacing, Duration::ZERO);
        assert_eq!(config.provider_timeout, Duration::from_secs(30));
        assert_eq!(config.gemini_api_key.as_deref(), Some("g-key"));
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = config(&[("STUDIO_PACING_MS", "fast")]).unwrap_err();
        assert!(err.starts_with("STUDIO_PACING_MS=fast"));
    }

    #[test]
    fn zero_timeout_is_rejected_but_zero_pacing_is_not() {
        let err = config(&[("STUDIO_PROVIDER_TIMEOUT_SECS", "0")]).unwrap_err();
        assert_eq!(err, "STUDIO_PROVIDER_TIMEOUT_SECS must be greater than zero");

        let config = config(&[("STUDIO_PACING_MS", "0")]).unwrap();
        assert_eq!(config.pacing, Duration::ZERO);
    }
}
