//! Parsed XML documents.

use std::fmt;

use sxd_document::dom::Document;
use sxd_document::{parser, Package};

use crate::error::{ConductorError, Result};

/// An owned, namespace-aware XML document.
pub struct XmlDocument {
    package: Package,
}

impl XmlDocument {
    /// Parse `xml`, failing on anything not well-formed.
    pub fn parse(xml: &str) -> Result<Self> {
        let xml = xml.trim_start_matches('\u{feff}');
        let package =
            parser::parse(xml).map_err(|e| ConductorError::Xml(format!("{e:?}")))?;
        Ok(Self { package })
    }

    /// Borrow the DOM for evaluation.
    pub fn as_document(&self) -> Document<'_> {
        self.package.as_document()
    }
}

impl fmt::Debug for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlDocument").finish_non_exhaustive()
    }
}
