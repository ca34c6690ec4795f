//! Namespace-aware XPath 1.0 evaluation.

use std::fmt;

use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value};

use super::{NamespaceContext, XmlDocument};
use crate::error::{ConductorError, Result};

/// Evaluates XPath expressions against [`XmlDocument`]s.
///
/// Prefixes used in expressions resolve through the helper's
/// [`NamespaceContext`].
///
/// # Example
///
/// ```
/// use http_test_conductor::{XPathHelper, XmlDocument};
///
/// # fn main() -> http_test_conductor::Result<()> {
/// let doc = XmlDocument::parse(
///     r#"<m:reply xmlns:m="urn:example"><m:code>42</m:code></m:reply>"#,
/// )?;
/// let xpath = XPathHelper::new().with_namespace("m", "urn:example");
///
/// assert_eq!(xpath.fetch_string(&doc, "/m:reply/m:code")?, "42");
/// assert_eq!(xpath.fetch_number(&doc, "/m:reply/m:code + 1")?, 43.0);
/// # Ok(())
/// # }
/// ```
pub struct XPathHelper {
    factory: Factory,
    namespaces: NamespaceContext,
}

impl Default for XPathHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for XPathHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XPathHelper")
            .field("namespaces", &self.namespaces)
            .finish_non_exhaustive()
    }
}

impl XPathHelper {
    pub fn new() -> Self {
        Self {
            factory: Factory::new(),
            namespaces: NamespaceContext::new(),
        }
    }

    /// Builder form of [`add_namespace`](Self::add_namespace).
    #[must_use]
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.add_namespace(prefix, uri);
        self
    }

    pub fn add_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces.insert(prefix, uri);
    }

    pub fn namespaces(&self) -> &NamespaceContext {
        &self.namespaces
    }

    pub fn namespaces_mut(&mut self) -> &mut NamespaceContext {
        &mut self.namespaces
    }

    /// String value of the expression.
    pub fn fetch_string(&self, document: &XmlDocument, expression: &str) -> Result<String> {
        Ok(self.evaluate(document, expression)?.string())
    }

    /// Boolean value of the expression.
    pub fn fetch_boolean(&self, document: &XmlDocument, expression: &str) -> Result<bool> {
        Ok(self.evaluate(document, expression)?.boolean())
    }

    /// Numeric value of the expression (`NaN` when not a number).
    pub fn fetch_number(&self, document: &XmlDocument, expression: &str) -> Result<f64> {
        Ok(self.evaluate(document, expression)?.number())
    }

    /// First selected node in document order.
    ///
    /// # Errors
    ///
    /// Fails if the expression does not produce a node-set.
    pub fn fetch_node<'d>(
        &self,
        document: &'d XmlDocument,
        expression: &str,
    ) -> Result<Option<Node<'d>>> {
        match self.evaluate(document, expression)? {
            Value::Nodeset(nodes) => Ok(nodes.document_order_first()),
            other => Err(not_a_nodeset(expression, &other)),
        }
    }

    /// Every selected node in document order.
    ///
    /// # Errors
    ///
    /// Fails if the expression does not produce a node-set.
    pub fn fetch_node_list<'d>(
        &self,
        document: &'d XmlDocument,
        expression: &str,
    ) -> Result<Vec<Node<'d>>> {
        match self.evaluate(document, expression)? {
            Value::Nodeset(nodes) => Ok(nodes.document_order()),
            other => Err(not_a_nodeset(expression, &other)),
        }
    }

    fn evaluate<'d>(&self, document: &'d XmlDocument, expression: &str) -> Result<Value<'d>> {
        if let Some(prefix) = qname_prefixes(expression)
            .into_iter()
            .find(|prefix| self.namespaces.namespace_uri(prefix).is_none())
        {
            return Err(ConductorError::XPath(format!(
                "unbound prefix '{prefix}' in '{expression}'"
            )));
        }

        let xpath = self
            .factory
            .build(expression)
            .map_err(|e| ConductorError::XPath(format!("cannot compile '{expression}': {e:?}")))?
            .ok_or_else(|| ConductorError::XPath("empty expression".to_string()))?;

        let mut context = Context::new();
        for (prefix, uri) in self.namespaces.iter() {
            context.set_namespace(prefix, uri);
        }

        xpath
            .evaluate(&context, document.as_document().root())
            .map_err(|e| ConductorError::XPath(format!("cannot evaluate '{expression}': {e:?}")))
    }
}

/// Prefixes of the qualified names in `expression`, skipping string
/// literals and axis separators (`child::`).
fn qname_prefixes(expression: &str) -> Vec<&str> {
    let bytes = expression.as_bytes();
    let mut prefixes = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c == b'\'' || c == b'"' {
            i = expression[i + 1..]
                .find(c as char)
                .map_or(bytes.len(), |end| i + end + 2);
        } else if c.is_ascii_digit() {
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
        } else if is_name_start(c) {
            let start = i;
            while i < bytes.len() && is_name_char(bytes[i]) {
                i += 1;
            }
            if bytes.get(i) == Some(&b':') && bytes.get(i + 1) != Some(&b':') {
                prefixes.push(&expression[start..i]);
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    prefixes
}

// Non-ASCII bytes count as name characters so slices stay on char boundaries.
fn is_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c >= 0x80
}

fn is_name_char(c: u8) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == b'-' || c == b'.'
}

fn not_a_nodeset(expression: &str, value: &Value<'_>) -> ConductorError {
    let kind = match value {
        Value::Boolean(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Nodeset(_) => "a node-set",
    };
    ConductorError::XPath(format!("'{expression}' yields {kind}, not nodes"))
}
