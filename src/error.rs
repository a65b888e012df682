//! Error types for the OpenAQ city collector.
//!
//! Each component gets its own error enum so callers can tell a failed fetch
//! apart from a run that simply found no data.

use thiserror::Error;

/// Result type alias using our custom error types.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type that encompasses all application errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("configuration error")]
    Config(#[from] ConfigError),

    /// OpenAQ communication and decoding errors
    #[error("OpenAQ API error")]
    Api(#[from] ApiError),

    /// Collection errors
    #[error("collector error")]
    Collector(#[from] CollectorError),

    /// CSV output errors
    #[error("output error")]
    Output(#[from] OutputError),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable parsing failed
    #[error("failed to parse environment variables: {0}")]
    EnvParse(String),

    /// Required configuration value is missing
    #[error("missing required configuration: {0}")]
    Missing(String),

    /// Configuration value is invalid
    #[error("invalid configuration value for {field}: {message}")]
    Invalid { field: String, message: String },

    /// The API key file could not be read or is empty
    #[error("unable to read API key from {path}: {message}")]
    Credentials { path: String, message: String },
}

/// OpenAQ communication and decoding errors.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed (401)
    #[error("authentication failed: invalid API key")]
    AuthFailed,

    /// Server returned an error status
    #[error("server error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Rate limit exceeded
    #[error("rate limit exceeded, retry after {0} seconds")]
    RateLimit(u64),

    /// Response body was not the expected JSON
    #[error("failed to decode response from {path}: {message}")]
    Decode { path: String, message: String },
}

/// Collection errors.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// The country-wide location listing could not be fetched
    #[error("failed to list locations for country '{country_code}'")]
    Locations {
        country_code: String,
        #[source]
        source: ApiError,
    },

    /// Paginator was built without everything it needs
    #[error("invalid pagination setup: {0}")]
    InvalidPagination(String),
}

/// CSV output errors.
#[derive(Error, Debug)]
pub enum OutputError {
    /// CSV serialization or write failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates a new environment parse error.
    pub fn env_parse(err: impl std::fmt::Display) -> Self {
        Self::EnvParse(err.to_string())
    }

    /// Creates a new missing configuration error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }

    /// Creates a new invalid configuration error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a credential file error.
    pub fn credentials(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Credentials {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl ApiError {
    /// Creates a server error from HTTP status, `Retry-After` header and response body.
    pub fn server_error(
        status: reqwest::StatusCode,
        retry_after: Option<&str>,
        body: String,
    ) -> Self {
        match status.as_u16() {
            401 => Self::AuthFailed,
            429 => Self::RateLimit(
                retry_after
                    .and_then(|value| value.trim().parse().ok())
                    .unwrap_or(60),
            ),
            code => Self::ServerError {
                status: code,
                message: body,
            },
        }
    }

    /// Creates a decode error.
    pub fn decode(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl CollectorError {
    /// Creates a locations error.
    pub fn locations(country_code: impl Into<String>, source: ApiError) -> Self {
        Self::Locations {
            country_code: country_code.into(),
            source,
        }
    }
}
