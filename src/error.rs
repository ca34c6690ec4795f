//! Error types for conductor operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring the harness or talking to a mock API.
#[derive(Debug, Error)]
pub enum ConductorError {
    /// A configuration file that was asked for does not exist.
    #[error("Config file '{}' not found", .0.display())]
    ConfigNotFound(PathBuf),

    /// Configuration file is not valid TOML or has unknown keys.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration parsed but holds an unusable value.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Requested server type has no implementation.
    #[error("Unsupported server type '{requested}', supported server types are: {supported}")]
    UnsupportedServerType {
        requested: String,
        supported: &'static str,
    },

    /// Requested API mock implementation is unknown.
    #[error("Unsupported API mock '{requested}', supported API mocks are: {supported}")]
    UnsupportedApiMock {
        requested: String,
        supported: &'static str,
    },

    /// HTTP method name that the REST builder cannot send.
    #[error("\"{0}\" is not supported")]
    UnsupportedMethod(String),

    /// A request was sent before a required field was set.
    #[error("Request has no {0}")]
    MissingField(&'static str),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// XML is malformed or could not be written.
    #[error("XML error: {0}")]
    Xml(String),

    /// XPath expression failed to compile or evaluate.
    #[error("XPath error: {0}")]
    XPath(String),

    /// Lifecycle call made in the wrong server state.
    #[error("Server is {state}, cannot {action}")]
    InvalidServerState {
        state: &'static str,
        action: &'static str,
    },

    /// Socket or file I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Failed to serialize output: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Result type alias for conductor operations.
pub type Result<T> = core::result::Result<T, ConductorError>;
