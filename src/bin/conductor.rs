//! HTTP test conductor CLI binary.
//!
//! Runs the mock API server and drives a running mock API from the shell.

use std::process::ExitCode;

use clap::Parser;
use http_test_conductor::cli::{Cli, Command};
use http_test_conductor::{
    create_api_mock, logging, ApiMock, Config, ConfigurableHttpEntity, HttpClient, HttpResponse,
    HttpTestConductor, PrettyPrint, Response, RestRequest, XPathHelper, XmlDocument,
};
use serde::Serialize;
use tabled::{Table, Tabled};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_stderr();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::from_env(),
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set HTTP_TEST_CONDUCTOR_CONFIG or pass --config <path>");
            return ExitCode::FAILURE;
        }
    };

    match run(config, cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config, cli: Cli) -> http_test_conductor::Result<ExitCode> {
    match cli.command {
        Command::Serve { port } => {
            let config = match port {
                Some(port) => config.with_port(port),
                None => config,
            };
            serve(config, cli.json).await?;
        }
        Command::Alive { port } => {
            let port = port.unwrap_or(config.server_port);
            let alive = api_mock(&config)?.is_alive(port).await;
            if cli.json {
                println!("{}", serde_json::json!({ "port": port, "alive": alive }));
            } else if alive {
                println!("Mock API is alive on port {port}");
            } else {
                println!("No mock API on port {port}");
            }
            if !alive {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Init { uri } => {
            api_mock(&config)?.init(&uri).await?;
            println!("Initialized {uri}");
        }
        Command::Respond {
            uri,
            body,
            headers,
            params,
            headers_as_parameters,
        } => {
            let mut response = Response::new()
                .set_headers(headers)
                .set_parameters(params)
                .headers_as_parameters(headers_as_parameters);
            if let Some(body) = body {
                response = response.body(body);
            }
            api_mock(&config)?.add_custom_response(&uri, &response).await?;
            println!("Registered response at {uri}");
        }
        Command::RecordedRequests { uri } => {
            let recorded = api_mock(&config)?.get_recorded_requests(&uri).await?;
            output_single(&recorded, cli.json)?;
        }
        Command::RecordedHeaders { uri } => {
            let recorded = api_mock(&config)?.get_recorded_headers(&uri).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&recorded)?);
            } else {
                let rows = header_rows(&recorded.document()?)?;
                if rows.is_empty() {
                    println!("No recorded headers");
                } else {
                    println!("{}", Table::new(rows));
                }
            }
        }
        Command::Send {
            url,
            method,
            body,
            headers,
            params,
        } => {
            let mut request = RestRequest::to(url, method)
                .set_headers(headers)
                .set_parameters(params);
            if let Some(body) = body {
                request = request.body(body);
            }
            let response = request.send().await?;
            output_response(&response, cli.json)?;
        }
        Command::Xpath {
            file,
            expression,
            namespaces,
        } => {
            let xml = tokio::fs::read_to_string(&file).await?;
            let document = XmlDocument::parse(&xml)?;
            let mut xpath = XPathHelper::new();
            for (prefix, uri) in namespaces {
                xpath.add_namespace(prefix, uri);
            }

            let values: Vec<String> = match xpath.fetch_node_list(&document, &expression) {
                Ok(nodes) => nodes.iter().map(|node| node.string_value()).collect(),
                Err(_) => vec![xpath.fetch_string(&document, &expression)?],
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else {
                for value in values {
                    println!("{value}");
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn serve(config: Config, json: bool) -> http_test_conductor::Result<()> {
    let conductor = HttpTestConductor::start_with(config).await?;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "base_url": conductor.base_url(),
                "port": conductor.port(),
                "reused": !conductor.owns_server(),
            })
        );
    } else {
        println!("{}", conductor.config().pretty_print());
        println!("\nMock API at {}", conductor.base_url());
    }

    if !conductor.owns_server() {
        eprintln!("A mock API is already running on port {}", conductor.port());
        return Ok(());
    }

    tokio::signal::ctrl_c().await?;
    eprintln!("Shutting down");
    conductor.tear_down().await
}

fn api_mock(config: &Config) -> http_test_conductor::Result<Box<dyn ApiMock>> {
    Ok(create_api_mock(
        config.api_mock_kind()?,
        HttpClient::new()?,
        &config.context_path,
    ))
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> http_test_conductor::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_response(response: &HttpResponse, json: bool) -> http_test_conductor::Result<()> {
    if json {
        let value = serde_json::json!({
            "status": response.status(),
            "headers": response.flat_headers(),
            "body": response.body(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", response.pretty_print());
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct HeaderRow {
    name: String,
    value: String,
}

fn header_rows(document: &XmlDocument) -> http_test_conductor::Result<Vec<HeaderRow>> {
    let xpath = XPathHelper::new();
    let count = xpath.fetch_number(document, "count(//header)")? as usize;
    (1..=count)
        .map(|i| {
            Ok(HeaderRow {
                name: xpath.fetch_string(document, &format!("//header[{i}]/name"))?,
                value: xpath.fetch_string(document, &format!("//header[{i}]/value"))?,
            })
        })
        .collect()
}
