//! Configuration handling for the payroll status toggler.
//!
//! Settings come from CLI flags with `FOLHA_*` environment fallbacks. The
//! configuration is parsed once at startup and only read afterwards.

use crate::audit::{AuditLabel, DEFAULT_REPORT_DIR};
use crate::auth::OperatorAuth;
use crate::error::{FolhaError, FolhaResult};
use crate::models::{Action, ConnectionTarget, DEFAULT_PORT, parse_ssl_mode};
use clap::{Args, ValueEnum};
use secrecy::SecretString;
use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_ADMIN_DATABASE: &str = "postgres";
pub const DEFAULT_SSL_MODE: &str = "disable";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// clap value parser that moves a password straight into a [`SecretString`].
pub fn parse_secret(value: &str) -> Result<SecretString, Infallible> {
    Ok(SecretString::new(value.to_string()))
}

/// Which variant of the tool the operator gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OperatorMode {
    /// No login; open and close are both available
    #[default]
    Standard,
    /// Login required; only close is available
    Restricted,
}

impl fmt::Display for OperatorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Restricted => write!(f, "restricted"),
        }
    }
}

/// How the close command transitions records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CloseStrategy {
    /// Reset to open, then close, in one transaction
    #[default]
    ReopenThenClose,
    /// Set closed directly
    Direct,
}

impl fmt::Display for CloseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReopenThenClose => write!(f, "reopen-then-close"),
            Self::Direct => write!(f, "direct"),
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Configuration for the payroll status toggler.
#[derive(Clone, Args)]
pub struct Config {
    /// Database servers the operator may pick from.
    /// Comma-separated or repeated. When empty, any server is accepted.
    #[arg(
        long = "servers",
        value_name = "HOST",
        env = "FOLHA_SERVERS",
        value_delimiter = ',',
        global = true
    )]
    pub servers: Vec<String>,

    /// Database user
    #[arg(long, default_value = DEFAULT_DB_USER, env = "FOLHA_DB_USER", global = true)]
    pub db_user: String,

    /// Database password
    #[arg(
        long,
        env = "FOLHA_DB_PASSWORD",
        hide_env_values = true,
        value_parser = parse_secret,
        global = true
    )]
    pub db_password: Option<SecretString>,

    /// Database port
    #[arg(long, default_value_t = DEFAULT_PORT, env = "FOLHA_DB_PORT", global = true)]
    pub db_port: u16,

    /// libpq sslmode (disable, allow, prefer, require, verify-ca, verify-full)
    #[arg(long, default_value = DEFAULT_SSL_MODE, env = "FOLHA_SSL_MODE", global = true)]
    pub ssl_mode: String,

    /// Schema holding the folhas / orgaos_folhas tables
    #[arg(long, env = "FOLHA_SCHEMA", global = true)]
    pub schema: Option<String>,

    /// Database used to list the databases of a server
    #[arg(long, default_value = DEFAULT_ADMIN_DATABASE, env = "FOLHA_ADMIN_DATABASE", global = true)]
    pub admin_database: String,

    /// Directory for CSV audit reports
    #[arg(long, default_value = DEFAULT_REPORT_DIR, env = "FOLHA_REPORT_DIR", global = true)]
    pub report_dir: PathBuf,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "FOLHA_CONNECT_TIMEOUT",
        global = true
    )]
    pub connect_timeout: u64,

    /// Operator mode (standard or restricted)
    #[arg(long, value_enum, default_value = "standard", env = "FOLHA_MODE", global = true)]
    pub mode: OperatorMode,

    /// Transition used by the close command
    #[arg(
        long,
        value_enum,
        default_value = "reopen-then-close",
        env = "FOLHA_CLOSE_STRATEGY",
        global = true
    )]
    pub close_strategy: CloseStrategy,

    /// Operator user name expected by the login gate (restricted mode)
    #[arg(long, env = "FOLHA_AUTH_USER", global = true)]
    pub auth_user: Option<String>,

    /// Argon2id PHC hash of the operator password (restricted mode)
    #[arg(long, env = "FOLHA_AUTH_PASSWORD_HASH", hide_env_values = true, global = true)]
    pub auth_password_hash: Option<String>,

    /// Output format (text or json)
    #[arg(long, value_enum, default_value = "text", env = "FOLHA_OUTPUT", global = true)]
    pub output: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "FOLHA_LOG_LEVEL", global = true)]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "FOLHA_JSON_LOGS", global = true)]
    pub json_logs: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            servers: Vec::new(),
            db_user: DEFAULT_DB_USER.to_string(),
            db_password: None,
            db_port: DEFAULT_PORT,
            ssl_mode: DEFAULT_SSL_MODE.to_string(),
            schema: None,
            admin_database: DEFAULT_ADMIN_DATABASE.to_string(),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            mode: OperatorMode::Standard,
            close_strategy: CloseStrategy::ReopenThenClose,
            auth_user: None,
            auth_password_hash: None,
            output: OutputFormat::Text,
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> FolhaResult<()> {
        if self.db_port == 0 {
            return Err(FolhaError::configuration("db_port must be greater than 0"));
        }
        if self.connect_timeout == 0 {
            return Err(FolhaError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }
        if self.db_user.trim().is_empty() {
            return Err(FolhaError::configuration("db_user cannot be empty"));
        }
        if self.servers.iter().any(|s| s.trim().is_empty()) {
            return Err(FolhaError::configuration(
                "FOLHA_SERVERS contains an empty server name",
            ));
        }
        parse_ssl_mode(&self.ssl_mode)?;
        if self.mode == OperatorMode::Restricted {
            self.operator_auth()?;
        }
        Ok(())
    }

    /// Connection target for `database` on `server`.
    pub fn target(&self, server: &str, database: &str) -> FolhaResult<ConnectionTarget> {
        let mut target = ConnectionTarget::new(
            server,
            self.db_port,
            &self.db_user,
            self.db_password
                .clone()
                .unwrap_or_else(|| SecretString::new(String::new())),
            database,
        );
        target.ssl_mode = parse_ssl_mode(&self.ssl_mode)?;
        target.schema = self.schema.clone().filter(|s| !s.trim().is_empty());
        Ok(target)
    }

    /// Connection target for the administrative database on `server`.
    pub fn admin_target(&self, server: &str) -> FolhaResult<ConnectionTarget> {
        self.target(server, &self.admin_database)
    }

    /// Action executed by the close command.
    pub fn close_action(&self) -> Action {
        match self.close_strategy {
            CloseStrategy::ReopenThenClose => Action::ReopenThenClose,
            CloseStrategy::Direct => Action::Close,
        }
    }

    /// Header of the IDs column in audit reports.
    pub fn audit_label(&self) -> AuditLabel {
        match self.mode {
            OperatorMode::Standard => AuditLabel::Processed,
            OperatorMode::Restricted => AuditLabel::Closed,
        }
    }

    /// Login gate credentials. Required in restricted mode, `None` otherwise.
    pub fn operator_auth(&self) -> FolhaResult<Option<OperatorAuth>> {
        if self.mode != OperatorMode::Restricted {
            return Ok(None);
        }
        let user = self.auth_user.as_deref().unwrap_or_default();
        let hash = self.auth_password_hash.as_deref().unwrap_or_default();
        if user.trim().is_empty() || hash.trim().is_empty() {
            return Err(FolhaError::configuration(
                "Restricted mode requires FOLHA_AUTH_USER and FOLHA_AUTH_PASSWORD_HASH",
            ));
        }
        OperatorAuth::new(user, hash).map(Some)
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

// Manual impl so secrets never reach logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("servers", &self.servers)
            .field("db_user", &self.db_user)
            .field("db_password", &self.db_password.as_ref().map(|_| "[REDACTED]"))
            .field("db_port", &self.db_port)
            .field("ssl_mode", &self.ssl_mode)
            .field("schema", &self.schema)
            .field("admin_database", &self.admin_database)
            .field("report_dir", &self.report_dir)
            .field("connect_timeout", &self.connect_timeout)
            .field("mode", &self.mode)
            .field("close_strategy", &self.close_strategy)
            .field("auth_user", &self.auth_user)
            .field(
                "auth_password_hash",
                &self.auth_password_hash.as_ref().map(|_| "[REDACTED]"),
            )
            .field("output", &self.output)
            .field("log_level", &self.log_level)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.db_user, "postgres");
        assert_eq!(config.db_port, 5432);
        assert_eq!(config.ssl_mode, "disable");
        assert_eq!(config.report_dir, PathBuf::from("relatorios"));
        assert_eq!(config.mode, OperatorMode::Standard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_target_carries_credentials_and_schema() {
        let config = Config {
            db_password: Some(SecretString::new("pw".to_string())),
            schema: Some("rh".to_string()),
            ..Config::default()
        };
        let target = config.target("db1", "payroll").unwrap();
        assert_eq!(target.host, "db1");
        assert_eq!(target.port, 5432);
        assert_eq!(target.database, "payroll");
        assert_eq!(target.password.expose_secret(), "pw");
        assert_eq!(target.schema.as_deref(), Some("rh"));
    }

    #[test]
    fn test_admin_target_uses_admin_database() {
        let config = Config::default();
        assert_eq!(config.admin_target("db1").unwrap().database, "postgres");
    }

    #[test]
    fn test_invalid_ssl_mode() {
        let config = Config {
            ssl_mode: "maybe".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(config.target("db1", "payroll").is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let config = Config {
            db_port: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_close_action_follows_strategy() {
        let mut config = Config::default();
        assert_eq!(config.close_action(), Action::ReopenThenClose);
        config.close_strategy = CloseStrategy::Direct;
        assert_eq!(config.close_action(), Action::Close);
    }

    #[test]
    fn test_audit_label_follows_mode() {
        let mut config = Config::default();
        assert_eq!(config.audit_label(), AuditLabel::Processed);
        config.mode = OperatorMode::Restricted;
        assert_eq!(config.audit_label(), AuditLabel::Closed);
    }

    #[test]
    fn test_restricted_mode_requires_credentials() {
        let config = Config {
            mode: OperatorMode::Restricted,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FolhaError::Configuration { .. })
        ));
    }

    #[test]
    fn test_restricted_mode_with_credentials() {
        let config = Config {
            mode: OperatorMode::Restricted,
            auth_user: Some("operador".to_string()),
            auth_password_hash: Some(hash_password("pw").unwrap()),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.operator_auth().unwrap().is_some());
    }

    #[test]
    fn test_standard_mode_has_no_login_gate() {
        assert!(Config::default().operator_auth().unwrap().is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config {
            db_password: Some(SecretString::new("hunter2".to_string())),
            ..Config::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_empty_server_entry_rejected() {
        let config = Config {
            servers: vec!["db1".to_string(), " ".to_string()],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
