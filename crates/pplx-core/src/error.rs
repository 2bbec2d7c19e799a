use thiserror::Error;

/// Main error type for the Perplexity client
#[derive(Error, Debug)]
pub enum PerplexityError {
    /// Request failed validation before any network activity
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Client or credential configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Network-related errors (connection, DNS, TLS, cancellation)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Non-2xx status reported by the API
    #[error("API error: {message}")]
    Api { status: u16, message: String },

    /// Serialization/deserialization errors, including per-event decode
    /// failures while streaming
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The streaming response body failed to read (distinct from a line
    /// that failed to decode)
    #[error("Stream error: {message}")]
    Stream {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A streaming response arrived but the request carried no update handler
    #[error("streaming response received but no update handler was provided")]
    MissingHandler,
}

impl PerplexityError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create an API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Serialization {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Create a stream read error
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream {
            message: message.into(),
            source: None,
        }
    }

    /// Create a stream read error with source
    pub fn stream_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Stream {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Convert from reqwest errors
impl From<reqwest::Error> for PerplexityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            PerplexityError::network_with_source("Connection failed", err)
        } else if err.is_request() {
            PerplexityError::validation(format!("Invalid request: {err}"))
        } else {
            PerplexityError::network_with_source("HTTP request failed", err)
        }
    }
}

/// Convert from serde_json errors
impl From<serde_json::Error> for PerplexityError {
    fn from(err: serde_json::Error) -> Self {
        PerplexityError::serialization("JSON serialization failed", err)
    }
}
