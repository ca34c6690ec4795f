//! Mock API clients and the factory that picks one from configuration.

mod http_api_mock;

use std::fmt;
use std::str::FromStr;

pub use http_api_mock::HttpApiMock;

use crate::client::HttpClient;
use crate::error::{ConductorError, Result};
use crate::traits::ApiMock;

const SUPPORTED_API_MOCKS: &str = "HttpApiMock";

/// Known [`ApiMock`] implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMockKind {
    /// [`HttpApiMock`], talking to the mock API over HTTP.
    Http,
}

impl FromStr for ApiMockKind {
    type Err = ConductorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "httpapimock" | "http" => Ok(ApiMockKind::Http),
            _ => Err(ConductorError::UnsupportedApiMock {
                requested: s.to_string(),
                supported: SUPPORTED_API_MOCKS,
            }),
        }
    }
}

impl fmt::Display for ApiMockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiMockKind::Http => f.write_str("HttpApiMock"),
        }
    }
}

/// Build the API mock client of `kind`.
///
/// `context_path` is where the mock API web app is mounted; it locates
/// the health check used by [`ApiMock::is_alive`].
pub fn create_api_mock(kind: ApiMockKind, client: HttpClient, context_path: &str) -> Box<dyn ApiMock> {
    match kind {
        ApiMockKind::Http => Box::new(HttpApiMock::new(client).with_context_path(context_path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        assert_eq!("HttpApiMock".parse::<ApiMockKind>().unwrap(), ApiMockKind::Http);
        assert_eq!(" httpapimock ".parse::<ApiMockKind>().unwrap(), ApiMockKind::Http);
        assert_eq!("http".parse::<ApiMockKind>().unwrap(), ApiMockKind::Http);
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = "GraphQlApiMock".parse::<ApiMockKind>().unwrap_err();
        assert!(matches!(err, ConductorError::UnsupportedApiMock { .. }));
        assert!(err.to_string().contains("HttpApiMock"));
    }
}
