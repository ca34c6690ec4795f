//! Harness configuration.
//!
//! Defaults ship inside the crate (`conductor.default.toml`). A project
//! supplies its own TOML file with a `[conductor]` table; only the keys it
//! sets override the defaults.
//!
//! ```toml
//! [conductor]
//! web_app_file = "mock-services.toml"
//! extra_resources = "tests/resources/web"
//! context_path = "/mock"
//! server_type = "EMBEDDED"
//! server_port = 8888
//! api_mock = "HttpApiMock"
//! ```

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConductorError, Result};
use crate::mock::ApiMockKind;
use crate::server::ServerType;

/// Environment variable naming the project configuration file.
pub const CONFIG_ENV_VAR: &str = "HTTP_TEST_CONDUCTOR_CONFIG";

/// File looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "conductor.toml";

const DEFAULT_CONFIG: &str = include_str!("../conductor.default.toml");

/// Resolved harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Service definitions for the built-in mock API.
    pub web_app_file: Option<PathBuf>,
    /// Directory `web_app_file` is resolved against.
    pub extra_resources: Option<PathBuf>,
    /// Path the web app is mounted at, always starting with `/`.
    pub context_path: String,
    /// Server implementation name, checked when the server is created.
    pub server_type: String,
    /// Listen port; 0 picks any free port.
    pub server_port: u16,
    /// API mock implementation name, checked when the client is created.
    pub api_mock: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    conductor: ConfigOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverrides {
    web_app_file: Option<PathBuf>,
    extra_resources: Option<PathBuf>,
    context_path: Option<String>,
    server_type: Option<String>,
    server_port: Option<u16>,
    api_mock: Option<String>,
}

impl Config {
    /// Configuration built only from the shipped defaults.
    pub fn defaults() -> Result<Self> {
        let defaults: ConfigFile = toml::from_str(DEFAULT_CONFIG)?;
        let d = defaults.conductor;

        let config = Self {
            web_app_file: d.web_app_file,
            extra_resources: d.extra_resources,
            context_path: d.context_path.unwrap_or_else(|| "/mock".to_string()),
            server_type: d.server_type.unwrap_or_else(|| "EMBEDDED".to_string()),
            server_port: d.server_port.unwrap_or(8888),
            api_mock: d.api_mock.unwrap_or_else(|| "HttpApiMock".to_string()),
        };
        config.normalized()
    }

    /// Defaults overridden by the keys present in `toml`.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(toml)?;
        Self::defaults()?.overlay(file.conductor).normalized()
    }

    /// Defaults overridden by the project file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConductorError::ConfigNotFound`] if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConductorError::ConfigNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading configuration");
        Self::from_toml_str(&contents)
    }

    /// Configuration located through the environment.
    ///
    /// Uses the file named by `HTTP_TEST_CONDUCTOR_CONFIG` (which must
    /// exist), else `conductor.toml` in the working directory if present,
    /// else the defaults.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::load(path.trim());
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::load(local);
        }
        tracing::debug!("no project configuration found, using defaults");
        Self::defaults()
    }

    /// Parsed server type.
    pub fn server_type(&self) -> Result<ServerType> {
        self.server_type.parse()
    }

    /// Parsed API mock implementation.
    pub fn api_mock_kind(&self) -> Result<ApiMockKind> {
        self.api_mock.parse()
    }

    /// Service definitions file, resolved against `extra_resources` when relative.
    pub fn web_app_location(&self) -> Option<PathBuf> {
        let file = self.web_app_file.as_ref()?;
        match &self.extra_resources {
            Some(dir) if file.is_relative() => Some(dir.join(file)),
            _ => Some(file.clone()),
        }
    }

    /// Copy of this configuration listening on `port`.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.server_port = port;
        self
    }

    fn overlay(mut self, o: ConfigOverrides) -> Self {
        if o.web_app_file.is_some() {
            self.web_app_file = o.web_app_file;
        }
        if o.extra_resources.is_some() {
            self.extra_resources = o.extra_resources;
        }
        if let Some(v) = o.context_path {
            self.context_path = v;
        }
        if let Some(v) = o.server_type {
            self.server_type = v;
        }
        if let Some(v) = o.server_port {
            self.server_port = v;
        }
        if let Some(v) = o.api_mock {
            self.api_mock = v;
        }
        self
    }

    fn normalized(mut self) -> Result<Self> {
        self.server_type = self.server_type.trim().to_string();
        self.api_mock = self.api_mock.trim().to_string();
        self.context_path = normalize_context_path(&self.context_path)?;
        Ok(self)
    }
}

/// Trim a context path and strip trailing slashes, keeping a lone `/`.
pub(crate) fn normalize_context_path(path: &str) -> Result<String> {
    let path = path.trim();
    if !path.starts_with('/') {
        return Err(ConductorError::ConfigInvalid(format!(
            "context path '{path}' must start with '/'"
        )));
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::defaults().unwrap();
        assert_eq!(config.context_path, "/mock");
        assert_eq!(config.server_type, "EMBEDDED");
        assert_eq!(config.server_port, 8888);
        assert_eq!(config.api_mock, "HttpApiMock");
        assert!(config.web_app_file.is_none());
    }

    #[test]
    fn test_project_file_overrides_only_given_keys() {
        let config = Config::from_toml_str(
            r#"
            [conductor]
            server_port = 9090
            context_path = " /api/ "
            "#,
        )
        .unwrap();

        assert_eq!(config.server_port, 9090);
        assert_eq!(config.context_path, "/api");
        assert_eq!(config.server_type, "EMBEDDED");
        assert_eq!(config.api_mock, "HttpApiMock");
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::defaults().unwrap());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = Config::from_toml_str("[conductor]\nserver_prot = 1\n");
        assert!(matches!(result, Err(ConductorError::ConfigParse(_))));
    }

    #[test]
    fn test_relative_context_path_rejected() {
        let result = Config::from_toml_str("[conductor]\ncontext_path = \"mock\"\n");
        assert!(matches!(result, Err(ConductorError::ConfigInvalid(_))));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = Config::load("/definitely/not/here/conductor.toml");
        assert!(matches!(result, Err(ConductorError::ConfigNotFound(_))));
    }

    #[test]
    fn test_server_type_checked_on_parse() {
        let config = Config::from_toml_str("[conductor]\nserver_type = \"JETTY\"\n").unwrap();
        assert!(matches!(
            config.server_type(),
            Err(ConductorError::UnsupportedServerType { .. })
        ));
    }

    #[test]
    fn test_web_app_location_resolution() {
        let config = Config::from_toml_str(
            r#"
            [conductor]
            web_app_file = "services.toml"
            extra_resources = "tests/resources"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.web_app_location(),
            Some(PathBuf::from("tests/resources/services.toml"))
        );

        let config = Config::from_toml_str(
            "[conductor]\nweb_app_file = \"/abs/services.toml\"\nextra_resources = \"x\"\n",
        )
        .unwrap();
        assert_eq!(
            config.web_app_location(),
            Some(PathBuf::from("/abs/services.toml"))
        );
    }

    #[test]
    fn test_root_context_path() {
        assert_eq!(normalize_context_path("/").unwrap(), "/");
        assert_eq!(normalize_context_path("//").unwrap(), "/");
    }
}
