use crate::error::{Result, TranscriptError};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings for transcript extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Language code to look for first (e.g. "en", "vi")
    pub preferred_language: String,

    /// Delay before each network request, in milliseconds
    pub request_delay_ms: u64,

    /// Deadline for a whole extraction, in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Accept-Language header sent with every request
    pub accept_language: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            preferred_language: "en".to_string(),
            request_delay_ms: 0,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US".to_string(),
        }
    }
}

impl ExtractorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TranscriptError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| TranscriptError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_language(&self.preferred_language)?;
        if self.timeout_secs == 0 {
            return Err(TranscriptError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Language codes end up verbatim in the `tlang` query parameter.
pub fn validate_language(lang: &str) -> Result<()> {
    if lang.is_empty() || !lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(TranscriptError::Config(format!(
            "invalid language code: {:?}",
            lang
        )));
    }
    Ok(())
}
