//! Routers paired with the context path they are served under.

use axum::Router;

use crate::config::{normalize_context_path, Config};
use crate::error::Result;
use crate::mock_api::{MockApi, ServiceDefinitions};

/// A router mounted at a context path.
#[derive(Debug, Clone)]
pub struct WebApp {
    context_path: String,
    router: Router,
}

impl WebApp {
    /// Mount any prebuilt `router` at `context_path`.
    pub fn new(context_path: &str, router: Router) -> Result<Self> {
        Ok(Self {
            context_path: normalize_context_path(context_path)?,
            router,
        })
    }

    /// The built-in mock API at `context_path`, limited to `services` when given.
    pub fn mock_api(context_path: &str, services: Option<ServiceDefinitions>) -> Result<Self> {
        let api = match services {
            Some(services) => MockApi::with_services(services),
            None => MockApi::new(),
        };
        Self::new(context_path, api.router())
    }

    /// The built-in mock API as configured: mounted at `context_path`, with
    /// service definitions read from `web_app_file` if one is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let services = match config.web_app_location() {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading service definitions");
                Some(ServiceDefinitions::load(path)?)
            }
            None => None,
        };
        Self::mock_api(&config.context_path, services)
    }

    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    /// axum cannot nest at the root, so a `/` app is merged instead.
    pub(crate) fn mount(self, router: Router) -> Router {
        if self.context_path == "/" {
            router.merge(self.router)
        } else {
            router.nest(&self.context_path, self.router)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConductorError;

    #[test]
    fn test_context_path_normalized() {
        let app = WebApp::mock_api("/mock/", None).unwrap();
        assert_eq!(app.context_path(), "/mock");
        assert!(matches!(
            WebApp::mock_api("mock", None),
            Err(ConductorError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_from_config_requires_existing_definitions() {
        let mut config = Config::defaults().unwrap();
        config.web_app_file = Some("definitely-missing-services.toml".into());
        assert!(matches!(
            WebApp::from_config(&config),
            Err(ConductorError::ConfigNotFound(_))
        ));
    }
}
