//! XML documents and XPath assertions.

mod document;
mod namespace;
mod xpath;

pub use document::XmlDocument;
pub use namespace::NamespaceContext;
pub use xpath::XPathHelper;

/// A node selected by an XPath expression.
pub use sxd_xpath::nodeset::Node as XmlNode;
