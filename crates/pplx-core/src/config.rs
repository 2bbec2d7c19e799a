use crate::error::PerplexityError;
use std::collections::HashMap;
use std::time::Duration;

/// Default base URL for the Perplexity API
pub const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";

/// Client configuration: credential, endpoint, and transport defaults
#[derive(Debug, Clone)]
pub struct PerplexityConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub connect_timeout_seconds: u64,
}

impl PerplexityConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            connect_timeout_seconds: 30,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_connect_timeout(mut self, seconds: u64) -> Self {
        self.connect_timeout_seconds = seconds;
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Connection-establishment timeout for the default transport. No overall
    /// request deadline is imposed; callers control that by wrapping the call
    /// future.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.api_key),
        );
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    pub fn validate(&self) -> Result<(), PerplexityError> {
        if self.api_key.is_empty() {
            return Err(PerplexityError::configuration("API key is required"));
        }

        if let Some(base_url) = &self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(PerplexityError::configuration(
                    "Base URL must be a valid HTTP/HTTPS URL",
                ));
            }
        }

        Ok(())
    }

    /// Create a config from the `PERPLEXITY_API_KEY` environment variable,
    /// honoring `PERPLEXITY_BASE_URL` when set.
    pub fn from_env() -> Result<Self, PerplexityError> {
        let api_key = std::env::var("PERPLEXITY_API_KEY").map_err(|_| {
            PerplexityError::configuration("PERPLEXITY_API_KEY environment variable not set")
        })?;

        let mut config = PerplexityConfig::new(api_key);

        if let Ok(base_url) = std::env::var("PERPLEXITY_BASE_URL") {
            config = config.with_base_url(base_url);
        }

        config.validate()?;
        Ok(config)
    }
}
