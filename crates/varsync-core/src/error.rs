//! Error types for varsync
//!
//! Provides error handling for:
//! - Configuration loading and validation
//! - HTTP transport and retry exhaustion
//! - Report serialization
//! - Orchestration-level failures inside a tenant task
//!
//! Expected API rejections (duplicate names, missing sets) are not errors at
//! this level; they are recorded as report rows by the reconciler.

use std::path::PathBuf;

/// Main varsync error type
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP layer failed outside an action's in-band handling
    #[error("http error: {0}")]
    Http(#[from] HttpError),

    /// Report could not be written
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// The API accepted a request but answered with a body we cannot use
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The worker pool was shut down before the task could start
    #[error("worker pool closed")]
    PoolClosed,

    /// The operator declined to continue
    #[error("aborted by user")]
    Aborted,
}

impl SyncError {
    /// Check if the error is a fatal startup failure
    #[inline]
    #[must_use]
    pub fn is_startup_failure(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Aborted)
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid YAML for the expected shape
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Required key absent
    #[error("missing required config key: {0}")]
    MissingKey(&'static str),

    /// Two desired entries share a key
    #[error("duplicate entry key in desired_entries: {0}")]
    DuplicateEntryKey(String),

    /// Key present but unusable
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// HTTP errors
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The HTTP client could not be constructed
    #[error("failed to build http client: {0}")]
    Client(String),

    /// The request never reached the server
    #[error("transport failure: {0}")]
    Transport(String),

    /// The request was sent but no complete response came back
    #[error("request interrupted after sending: {0}")]
    Interrupted(String),

    /// Transient failures persisted through every attempt
    #[error("gave up after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        /// Attempts made
        attempts: u32,
        /// Last error observed
        last: String,
    },

    /// Response body did not decode
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Non-success status where the caller required success
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
}

impl HttpError {
    /// Check if the error is worth another attempt
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if the outcome of the request is unknown
    #[inline]
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted(_))
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            Self::Client(e.to_string())
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else if e.is_connect() {
            Self::Transport(e.to_string())
        } else {
            Self::Interrupted(e.to_string())
        }
    }
}

/// Report writing errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Filesystem failure
    #[error("report i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding failure
    #[error("report encoding failed: {0}")]
    Csv(#[from] csv::Error),
}
