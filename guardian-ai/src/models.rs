use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the model gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API key; `None` means the gateway is not configured
    pub api_key: Option<String>,

    /// Base URL for API requests
    pub api_base: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Upper bound for one round trip, in seconds
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GatewayConfig {
    /// Build from a key/value lookup, e.g. `|k| std::env::var(k).ok()`.
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            api_key: get("ANTHROPIC_API_KEY"),
            api_base: get("GUARDIAN_AI_API_BASE").unwrap_or(defaults.api_base),
            model: get("GUARDIAN_AI_MODEL").unwrap_or(defaults.model),
            timeout_secs: get("GUARDIAN_AI_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// An image sent inline with a prompt.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self { media_type: media_type.into(), data }
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Keeps image bytes out of logs.
impl std::fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("media_type", &self.media_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    pub prompt: String,
    pub image: Option<ImageAttachment>,
    /// Token budget for the reply
    pub max_tokens: u32,
}

impl GatewayRequest {
    pub fn text(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self { prompt: prompt.into(), image: None, max_tokens }
    }

    pub fn with_image(prompt: impl Into<String>, image: ImageAttachment, max_tokens: u32) -> Self {
        Self { prompt: prompt.into(), image: Some(image), max_tokens }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn config_reads_lookup_and_falls_back_to_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("GUARDIAN_AI_TIMEOUT_SECS", "12"),
            ("GUARDIAN_AI_MODEL", "   "),
        ]);
        let config = GatewayConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.timeout(), Duration::from_secs(12));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn missing_key_leaves_gateway_unconfigured() {
        let config = GatewayConfig::from_lookup(|_| None);
        assert!(!config.is_configured());
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn attachment_encodes_base64_and_hides_bytes_in_debug() {
        let image = ImageAttachment::new("image/png", b"abc".to_vec());
        assert_eq!(image.to_base64(), "YWJj");
        assert!(!format!("{:?}", image).contains("97"));
    }
}
