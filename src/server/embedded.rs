//! axum server running on a background tokio task.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::{MockServer, ServerState, WebApp};
use crate::error::{ConductorError, Result};

/// Upper bound on waiting for open connections to drain at shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

struct Running {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

/// Embedded HTTP server bound to `127.0.0.1`.
pub struct EmbeddedServer {
    port: u16,
    web_apps: Vec<WebApp>,
    state: ServerState,
    local_addr: Option<SocketAddr>,
    running: Option<Running>,
}

impl EmbeddedServer {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            web_apps: Vec::new(),
            state: ServerState::NotStarted,
            local_addr: None,
            running: None,
        }
    }

    fn require(&self, expected: ServerState, action: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ConductorError::InvalidServerState {
                state: self.state.as_str(),
                action,
            })
        }
    }
}

impl std::fmt::Debug for EmbeddedServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedServer")
            .field("port", &self.port)
            .field("web_apps", &self.web_apps.len())
            .field("state", &self.state)
            .field("local_addr", &self.local_addr)
            .finish()
    }
}

#[async_trait]
impl MockServer for EmbeddedServer {
    fn add_web_app(&mut self, web_app: WebApp) -> Result<()> {
        self.require(ServerState::NotStarted, "add a web app")?;
        tracing::debug!(context_path = web_app.context_path(), "web app added");
        self.web_apps.push(web_app);
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(port = self.port))]
    async fn tear_up(&mut self) -> Result<()> {
        self.require(ServerState::NotStarted, "start")?;

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, self.port)).await?;
        let addr = listener.local_addr()?;

        // Web apps are only consumed once the port is ours, so a failed bind can be retried.
        let app = self
            .web_apps
            .drain(..)
            .fold(Router::new(), |router, web_app| web_app.mount(router));
        let (shutdown, signal) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = signal.await;
                })
                .await
        });

        tracing::info!(%addr, "server started");
        self.local_addr = Some(addr);
        self.running = Some(Running { shutdown, handle });
        self.state = ServerState::Started;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(port = self.port))]
    async fn tear_down(&mut self) -> Result<()> {
        if self.state == ServerState::Stopped {
            return Ok(());
        }

        if let Some(Running { shutdown, mut handle }) = self.running.take() {
            let _ = shutdown.send(());
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await {
                Ok(Ok(Ok(()))) => tracing::info!("server stopped"),
                Ok(Ok(Err(e))) => tracing::warn!(error = %e, "server stopped with error"),
                Ok(Err(e)) => tracing::warn!(error = %e, "server task failed"),
                Err(_) => {
                    tracing::warn!("connections still open after grace period, aborting");
                    handle.abort();
                }
            }
        }

        self.local_addr = None;
        self.state = ServerState::Stopped;
        Ok(())
    }

    fn state(&self) -> ServerState {
        self.state
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}
