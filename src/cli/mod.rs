//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the conductor binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// HTTP test conductor command-line interface.
#[derive(Parser, Debug)]
#[command(name = "conductor", about = "Mock API harness for HTTP integration tests", version)]
pub struct Cli {
    /// Project configuration file (defaults to $HTTP_TEST_CONDUCTOR_CONFIG, then ./conductor.toml).
    #[arg(long, global = true, env = "HTTP_TEST_CONDUCTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output results as JSON instead of text.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the configured server and block until Ctrl-C.
    Serve {
        /// Listen port, overriding the configuration (0 picks a free port).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check whether a mock API answers on a port.
    Alive {
        /// Port to probe (defaults to the configured one).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Initialize a mock endpoint.
    Init {
        /// Control URL ending in `/init`.
        uri: String,
    },

    /// Register the response a mock endpoint replays.
    Respond {
        /// Control URL ending in `/responses`.
        uri: String,

        /// Response body.
        #[arg(long)]
        body: Option<String>,

        /// Response header as `Name:Value` (repeatable).
        #[arg(long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Control request parameter as `name=value` (repeatable).
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Send the headers as one `headers` parameter.
        #[arg(long)]
        headers_as_parameters: bool,
    },

    /// Show the request bodies a mock endpoint recorded.
    RecordedRequests {
        /// Control URL ending in `/recorded-requests`.
        uri: String,
    },

    /// Show the request headers a mock endpoint recorded.
    RecordedHeaders {
        /// Control URL ending in `/recorded-request-headers`.
        uri: String,
    },

    /// Send a REST request.
    Send {
        url: String,

        /// HTTP method.
        #[arg(long, default_value = "GET")]
        method: String,

        /// Request body.
        #[arg(long)]
        body: Option<String>,

        /// Request header as `Name:Value` (repeatable).
        #[arg(long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Query parameter as `name=value` (repeatable).
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Evaluate an XPath expression against an XML file.
    Xpath {
        file: PathBuf,

        expression: String,

        /// Namespace binding as `prefix=uri` (repeatable).
        #[arg(long = "ns", value_parser = parse_param)]
        namespaces: Vec<(String, String)>,
    },
}

/// `Name:Value`, split at the first colon.
pub fn parse_header(raw: &str) -> Result<(String, String), String> {
    split_pair(raw, ':')
}

/// `name=value`, split at the first `=`.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    split_pair(raw, '=')
}

fn split_pair(raw: &str, separator: char) -> Result<(String, String), String> {
    match raw.split_once(separator) {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected NAME{separator}VALUE, got '{raw}'")),
    }
}
