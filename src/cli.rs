//! Command-line interface.
//!
//! Subcommands map one-to-one onto the operator actions. Global settings live in
//! [`Config`] and are shared by every subcommand.

use crate::config::{Config, parse_secret};
use crate::error::FolhaError;
use crate::models::StatusChangeRequest;
use crate::tools::{DatabasesOutput, OperatorLogin, StatusOutput};
use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;
use std::fmt::Write as _;

pub const SUCCESS_MESSAGE: &str = "Folha processada com sucesso!";

#[derive(Parser)]
#[command(
    name = "folha-status",
    about = "Open and close payroll (folha) batches with a CSV audit trail",
    version,
    author
)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the configured database servers
    Servers,
    /// List the databases on a server
    Databases {
        /// Server to inspect
        #[arg(long)]
        server: String,
        /// Only show databases whose name contains this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },
    /// Open folhas (status 0)
    Open(StatusArgs),
    /// Close folhas (status 1)
    Close(StatusArgs),
    /// Hash an operator password for FOLHA_AUTH_PASSWORD_HASH.
    /// Reads FOLHA_NEW_PASSWORD, or one line from stdin.
    HashPassword,
}

impl Command {
    /// Whether the command uses the database or login settings. `hash-password`
    /// must keep working while the restricted-mode settings are incomplete.
    pub fn needs_config(&self) -> bool {
        !matches!(self, Self::HashPassword)
    }
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Database server
    #[arg(long)]
    pub server: String,
    /// Database name
    #[arg(long)]
    pub database: String,
    /// Folha IDs, comma-separated (e.g. 1,2,3)
    #[arg(long)]
    pub ids: String,
    /// Operator user name (restricted mode)
    #[arg(long, env = "FOLHA_OPERATOR_USER")]
    pub operator_user: Option<String>,
    /// Operator password (restricted mode)
    #[arg(
        long,
        env = "FOLHA_OPERATOR_PASSWORD",
        hide_env_values = true,
        value_parser = parse_secret
    )]
    pub operator_password: Option<SecretString>,
}

impl StatusArgs {
    pub fn request(&self) -> StatusChangeRequest {
        StatusChangeRequest::new(&self.server, &self.database, &self.ids)
    }

    /// Login credentials, if both parts were given.
    pub fn login(&self) -> Option<OperatorLogin> {
        match (&self.operator_user, &self.operator_password) {
            (Some(user), Some(password)) => Some(OperatorLogin {
                user: user.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

pub fn render_servers(servers: &[String]) -> String {
    if servers.is_empty() {
        return "No servers configured (set FOLHA_SERVERS)".to_string();
    }
    servers.join("\n")
}

pub fn render_databases(output: &DatabasesOutput) -> String {
    if output.databases.is_empty() {
        return format!("No databases found on {}", output.server);
    }
    output.databases.join("\n")
}

pub fn render_status(output: &StatusOutput) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{}", SUCCESS_MESSAGE);
    let _ = writeln!(
        text,
        "Servidor: {}  Banco: {}  IDs: {}  Ação: {}",
        output.server, output.database, output.ids, output.outcome.action
    );
    for (i, statement) in output.outcome.statements.iter().enumerate() {
        let _ = writeln!(
            text,
            "  {}. {} -> {}: {} row(s)",
            i + 1,
            statement.table,
            statement.status,
            statement.rows_affected
        );
    }
    match &output.report_path {
        Some(path) => {
            let _ = write!(text, "Relatório: {}", path.display());
        }
        None => {
            let _ = write!(text, "Relatório: not written (see logs)");
        }
    }
    text
}

pub fn render_error(err: &FolhaError) -> String {
    match err.suggestion() {
        Some(suggestion) => format!("Erro: {}\n{}", err, suggestion),
        None => format!("Erro: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{PayrollTable, StatementReport, StatusChangeOutcome};
    use crate::models::{Action, Status};
    use secrecy::ExposeSecret;
    use std::path::PathBuf;

    #[test]
    fn test_parse_close_command() {
        let cli = Cli::try_parse_from([
            "folha-status",
            "--servers",
            "db1,db2",
            "close",
            "--server",
            "db1",
            "--database",
            "payroll",
            "--ids",
            "1,2,3",
        ])
        .unwrap();
        assert_eq!(cli.config.servers, vec!["db1", "db2"]);
        match cli.command {
            Command::Close(args) => {
                let request = args.request();
                assert_eq!(request.server, "db1");
                assert_eq!(request.ids, "1,2,3");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "folha-status",
            "databases",
            "--server",
            "db1",
            "--output",
            "json",
            "--db-port",
            "6432",
        ])
        .unwrap();
        assert_eq!(cli.config.db_port, 6432);
        assert_eq!(cli.config.output, crate::config::OutputFormat::Json);
    }

    #[test]
    fn test_status_args_require_ids() {
        let result = Cli::try_parse_from([
            "folha-status",
            "open",
            "--server",
            "db1",
            "--database",
            "payroll",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_login_needs_both_parts() {
        let args = StatusArgs {
            server: "db1".to_string(),
            database: "payroll".to_string(),
            ids: "1".to_string(),
            operator_user: Some("operador".to_string()),
            operator_password: None,
        };
        assert!(args.login().is_none());
    }

    #[test]
    fn test_hash_password_skips_config_validation() {
        let cli = Cli::try_parse_from(["folha-status", "--mode", "restricted", "hash-password"])
            .unwrap();
        assert!(cli.config.validate().is_err());
        assert!(!cli.command.needs_config());

        let cli = Cli::try_parse_from(["folha-status", "--mode", "restricted", "servers"]).unwrap();
        assert!(cli.command.needs_config());
    }

    #[test]
    fn test_passwords_are_redacted_in_debug() {
        let cli = Cli::try_parse_from([
            "folha-status",
            "--db-password",
            "db-hunter2",
            "close",
            "--server",
            "db1",
            "--database",
            "payroll",
            "--ids",
            "1",
            "--operator-user",
            "operador",
            "--operator-password",
            "op-hunter2",
        ])
        .unwrap();

        let debug = format!("{:?} {:?}", cli.command, cli.config);
        assert!(!debug.contains("db-hunter2"), "{debug}");
        assert!(!debug.contains("op-hunter2"), "{debug}");

        let Command::Close(args) = &cli.command else {
            panic!("unexpected command: {:?}", cli.command);
        };
        let login = args.login().unwrap();
        assert_eq!(login.password.expose_secret(), "op-hunter2");
        let target = cli.config.target("db1", "payroll").unwrap();
        assert_eq!(target.password.expose_secret(), "db-hunter2");
    }

    #[test]
    fn test_render_status() {
        let output = StatusOutput {
            server: "db1".to_string(),
            database: "payroll".to_string(),
            ids: "1,2,3".to_string(),
            outcome: StatusChangeOutcome {
                action: Action::Close,
                final_status: Status::Closed,
                statements: vec![StatementReport {
                    table: PayrollTable::Folhas,
                    status: Status::Closed,
                    rows_affected: 3,
                }],
                execution_time_ms: 4,
            },
            report_path: Some(PathBuf::from("relatorios/fechamento_x.csv")),
        };
        let text = render_status(&output);
        assert!(text.starts_with(SUCCESS_MESSAGE));
        assert!(text.contains("folhas -> closed: 3 row(s)"));
        assert!(text.contains("relatorios/fechamento_x.csv"));
    }

    #[test]
    fn test_render_empty_lists() {
        assert!(render_servers(&[]).contains("FOLHA_SERVERS"));
        let output = DatabasesOutput {
            server: "db1".to_string(),
            filter: None,
            databases: Vec::new(),
        };
        assert_eq!(render_databases(&output), "No databases found on db1");
    }

    #[test]
    fn test_render_error_includes_suggestion() {
        let text = render_error(&FolhaError::connection("refused", "Check the host"));
        assert!(text.contains("Connection failed: refused"));
        assert!(text.contains("Check the host"));
    }
}
