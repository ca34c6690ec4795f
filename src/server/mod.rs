//! Servers hosting the mock API web application.

mod embedded;
mod web_app;

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use async_trait::async_trait;

pub use embedded::EmbeddedServer;
pub use web_app::WebApp;

use crate::error::{ConductorError, Result};

const SUPPORTED_SERVER_TYPES: &str = "EMBEDDED";

/// Known [`MockServer`] implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerType {
    /// In-process axum server on a tokio task.
    Embedded,
}

impl FromStr for ServerType {
    type Err = ConductorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EMBEDDED" => Ok(ServerType::Embedded),
            _ => Err(ConductorError::UnsupportedServerType {
                requested: s.to_string(),
                supported: SUPPORTED_SERVER_TYPES,
            }),
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerType::Embedded => f.write_str("EMBEDDED"),
        }
    }
}

/// Lifecycle of a [`MockServer`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    NotStarted,
    Started,
    Stopped,
}

impl ServerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerState::NotStarted => "not started",
            ServerState::Started => "started",
            ServerState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A server that web apps are mounted on before it starts.
#[async_trait]
pub trait MockServer: Send + Sync {
    /// Mount `web_app` at its context path.
    ///
    /// # Errors
    ///
    /// [`ConductorError::InvalidServerState`] unless the server is not started yet.
    fn add_web_app(&mut self, web_app: WebApp) -> Result<()>;

    /// Bind the port and start serving in the background.
    ///
    /// # Errors
    ///
    /// [`ConductorError::InvalidServerState`] unless the server is not started
    /// yet, [`ConductorError::Io`] if the port cannot be bound.
    async fn tear_up(&mut self) -> Result<()>;

    /// Stop serving. Calling it more than once is a no-op.
    async fn tear_down(&mut self) -> Result<()>;

    fn state(&self) -> ServerState;

    /// Bound address while started.
    fn local_addr(&self) -> Option<SocketAddr>;
}

/// Build the server of `server_type` listening on `port` (0 picks a free one).
pub fn create_server(server_type: ServerType, port: u16) -> Box<dyn MockServer> {
    match server_type {
        ServerType::Embedded => Box::new(EmbeddedServer::new(port)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_type() {
        assert_eq!("EMBEDDED".parse::<ServerType>().unwrap(), ServerType::Embedded);
        assert_eq!(" embedded ".parse::<ServerType>().unwrap(), ServerType::Embedded);
        assert!(matches!(
            "TOMCAT".parse::<ServerType>(),
            Err(ConductorError::UnsupportedServerType { supported: "EMBEDDED", .. })
        ));
    }

    #[test]
    fn test_create_server_starts_not_started() {
        let server = create_server(ServerType::Embedded, 0);
        assert_eq!(server.state(), ServerState::NotStarted);
        assert!(server.local_addr().is_none());
    }
}
