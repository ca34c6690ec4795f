//! Service definitions for the mock API.
//!
//! ```toml
//! [[service]]
//! name = "local-mock"
//! type = "REST"
//!
//! [[service]]
//! name = "quotes"
//! type = "SOAP"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConductorError, Result};

const SERVICE_KINDS: [&str; 2] = ["REST", "SOAP"];

/// One mockable service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Every service the mock API answers for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceDefinitions {
    #[serde(default, rename = "service")]
    pub services: Vec<ServiceDefinition>,
}

impl ServiceDefinitions {
    /// Read definitions from a TOML file.
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
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let mut definitions: Self = toml::from_str(toml)?;
        for service in &mut definitions.services {
            service.kind = service.kind.trim().to_ascii_uppercase();
            if !SERVICE_KINDS.contains(&service.kind.as_str()) {
                return Err(ConductorError::ConfigInvalid(format!(
                    "service '{}' has type '{}', expected one of {}",
                    service.name,
                    service.kind,
                    SERVICE_KINDS.join(", ")
                )));
            }
        }
        Ok(definitions)
    }

    pub fn contains(&self, kind: &str, service: &str) -> bool {
        self.services
            .iter()
            .any(|s| s.name == service && s.kind.eq_ignore_ascii_case(kind))
    }
}
