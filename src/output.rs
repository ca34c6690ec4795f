//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use std::collections::BTreeMap;

use crate::{Config, HttpResponse, RecordedHeaders, RecordedRequests};

/// Trait for human-readable key-value output.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn section(title: &str, subject: &str) -> Vec<String> {
    vec![
        format!("{title}: {subject}"),
        "─".repeat((title.len() + subject.len() + 2).max(30)),
    ]
}

fn header_lines(headers: &BTreeMap<String, String>) -> Vec<String> {
    let width = headers.keys().map(String::len).max().unwrap_or(0);
    headers
        .iter()
        .map(|(name, value)| format!("  {name:width$}  {value}"))
        .collect()
}

impl PrettyPrint for RecordedRequests {
    fn pretty_print(&self) -> String {
        let mut lines = section("Recorded requests", &self.endpoint_url);
        lines.push(self.content.clone());
        lines.join("\n")
    }
}

impl PrettyPrint for RecordedHeaders {
    fn pretty_print(&self) -> String {
        let mut lines = section("Recorded headers", &self.endpoint_url);
        lines.push(self.content.clone());
        lines.join("\n")
    }
}

impl PrettyPrint for HttpResponse {
    fn pretty_print(&self) -> String {
        let status = format!("{} {}", self.status(), self.status_text());
        let mut lines = section("Response", &status);
        let headers = self.flat_headers();
        if !headers.is_empty() {
            lines.push("Headers:".to_string());
            lines.extend(header_lines(&headers));
        }
        if !self.body().is_empty() {
            lines.push("Body:".to_string());
            lines.push(self.body().to_string());
        }
        lines.join("\n")
    }
}

impl PrettyPrint for Config {
    fn pretty_print(&self) -> String {
        let mut lines = section("Server", &self.server_type);
        lines.push(format!("Port:           {}", self.server_port));
        lines.push(format!("Context path:   {}", self.context_path));
        lines.push(format!("API mock:       {}", self.api_mock));
        if let Some(location) = self.web_app_location() {
            lines.push(format!("Services:       {}", location.display()));
        }
        lines.join("\n")
    }
}
