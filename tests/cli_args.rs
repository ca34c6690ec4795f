//! CLI argument parsing tests.

use clap::Parser;
use http_test_conductor::cli::{parse_header, Cli, Command};

#[test]
fn test_cli_parses_serve_subcommand() {
    let cli = Cli::parse_from(["conductor", "serve", "--port", "0"]);

    assert!(!cli.json);
    match cli.command {
        Command::Serve { port } => assert_eq!(port, Some(0)),
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_cli_parses_respond_subcommand() {
    let cli = Cli::parse_from([
        "conductor",
        "respond",
        "http://127.0.0.1:8888/mock/services/REST/local-mock/operations/POST/responses",
        "--body",
        r#"{"name":"Test"}"#,
        "--header",
        "Content-Type: application/json",
        "--header",
        "Custom-Header:jUnit",
        "--param",
        "status=201",
        "--headers-as-parameters",
    ]);

    match cli.command {
        Command::Respond {
            uri,
            body,
            headers,
            params,
            headers_as_parameters,
        } => {
            assert!(uri.ends_with("/operations/POST/responses"));
            assert_eq!(body.as_deref(), Some(r#"{"name":"Test"}"#));
            assert_eq!(
                headers,
                vec![
                    ("Content-Type".to_string(), "application/json".to_string()),
                    ("Custom-Header".to_string(), "jUnit".to_string()),
                ]
            );
            assert_eq!(params, vec![("status".to_string(), "201".to_string())]);
            assert!(headers_as_parameters);
        }
        _ => panic!("Expected Respond command"),
    }
}

#[test]
fn test_cli_parses_send_with_defaults() {
    let cli = Cli::parse_from(["conductor", "send", "http://localhost/x", "--json"]);

    assert!(cli.json);
    match cli.command {
        Command::Send {
            url, method, body, ..
        } => {
            assert_eq!(url, "http://localhost/x");
            assert_eq!(method, "GET");
            assert!(body.is_none());
        }
        _ => panic!("Expected Send command"),
    }
}

#[test]
fn test_cli_parses_xpath_namespaces() {
    let cli = Cli::parse_from([
        "conductor",
        "xpath",
        "reply.xml",
        "//q:price",
        "--ns",
        "q=urn:quotes",
    ]);

    match cli.command {
        Command::Xpath {
            file,
            expression,
            namespaces,
        } => {
            assert_eq!(file.to_str(), Some("reply.xml"));
            assert_eq!(expression, "//q:price");
            assert_eq!(namespaces, vec![("q".to_string(), "urn:quotes".to_string())]);
        }
        _ => panic!("Expected Xpath command"),
    }
}

#[test]
fn test_cli_parses_recorded_subcommands() {
    let cli = Cli::parse_from(["conductor", "recorded-headers", "http://h/recorded-request-headers"]);
    assert!(matches!(cli.command, Command::RecordedHeaders { .. }));

    let cli = Cli::parse_from(["conductor", "recorded-requests", "http://h/recorded-requests"]);
    assert!(matches!(cli.command, Command::RecordedRequests { .. }));
}

#[test]
fn test_cli_rejects_malformed_header() {
    let result = Cli::try_parse_from(["conductor", "send", "http://localhost", "--header", "novalue"]);
    assert!(result.is_err());
    assert!(parse_header(":value").is_err());
}

#[test]
fn test_cli_config_flag_is_global() {
    let cli = Cli::parse_from(["conductor", "alive", "--config", "conductor.toml"]);
    assert_eq!(cli.config.as_deref().and_then(|p| p.to_str()), Some("conductor.toml"));
    assert!(matches!(cli.command, Command::Alive { port: None }));
}
