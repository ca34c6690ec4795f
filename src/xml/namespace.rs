//! Prefix to namespace URI bindings used by XPath expressions.

use std::collections::BTreeMap;

/// Namespace bindings, keyed by prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    namespaces: BTreeMap<String, String>,
}

impl NamespaceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `prefix` to `uri`, replacing an earlier binding of the prefix.
    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), uri.into());
    }

    /// Replace every binding.
    pub fn set_namespaces<I, K, V>(&mut self, namespaces: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.namespaces = namespaces
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    pub fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    /// First prefix (in prefix order) bound to `uri`.
    pub fn prefix<'a>(&'a self, uri: &'a str) -> Option<&'a str> {
        self.prefixes(uri).next()
    }

    /// Every prefix bound to `uri`.
    pub fn prefixes<'a>(&'a self, uri: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.namespaces
            .iter()
            .filter(move |(_, bound)| bound.as_str() == uri)
            .map(|(prefix, _)| prefix.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces
            .iter()
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
