//! folha-status - Main entry point.
//!
//! Opens and closes payroll batches (folhas) on a PostgreSQL server and writes a
//! CSV audit report for every committed change.

use clap::Parser;
use folha_status::auth::hash_password;
use folha_status::cli::{self, Cli, Command};
use folha_status::config::{Config, OutputFormat};
use folha_status::error::{FolhaError, FolhaResult};
use folha_status::tools::{DatabaseToolHandler, RequestedAction, StatusToolHandler};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(&cli.config);

    info!(
        mode = %cli.config.mode,
        close_strategy = %cli.config.close_strategy,
        "Starting folha-status v{}",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = run(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("{}", cli::render_error(&e));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: &Cli) -> FolhaResult<()> {
    let config = &cli.config;
    if cli.command.needs_config() {
        config.validate()?;
    }

    match &cli.command {
        Command::Servers => {
            let handler = DatabaseToolHandler::new(config);
            print_output(config, handler.servers(), cli::render_servers)
        }
        Command::Databases { server, filter } => {
            let handler = DatabaseToolHandler::new(config);
            let output = handler.list_databases(server, filter.as_deref()).await?;
            print_output(config, &output, cli::render_databases)
        }
        Command::Open(args) | Command::Close(args) => {
            let requested = match &cli.command {
                Command::Open(_) => RequestedAction::Open,
                _ => RequestedAction::Close,
            };
            let handler = StatusToolHandler::new(config);
            let login = args.login();
            let output = handler
                .execute(&args.request(), requested, login.as_ref())
                .await?;
            print_output(config, &output, cli::render_status)
        }
        Command::HashPassword => {
            let password = read_new_password().await?;
            println!("{}", hash_password(&password)?);
            Ok(())
        }
    }
}

fn print_output<T, F>(config: &Config, value: &T, render: F) -> FolhaResult<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    match config.output {
        OutputFormat::Text => println!("{}", render(value)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| FolhaError::internal(format!("JSON serialization failed: {e}")))?;
            println!("{}", json);
        }
    }
    Ok(())
}

async fn read_new_password() -> FolhaResult<String> {
    if let Ok(password) = std::env::var("FOLHA_NEW_PASSWORD") {
        return Ok(password);
    }
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .map_err(|e| FolhaError::internal(format!("Could not read password from stdin: {e}")))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
