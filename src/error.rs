//! Error types for the payroll status toggler.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Each variant carries enough context for the operator to understand what failed
//! and, where possible, a suggestion on how to recover.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolhaError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Transaction error: {message}")]
    Transaction { message: String },

    #[error("Statement {statement} on '{table}' failed: {message}")]
    Execution {
        /// 1-based position of the failing statement in the plan
        statement: usize,
        table: String,
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
    },

    /// A server error outside the status statements, e.g. a catalog query.
    #[error("Database error: {message}")]
    Database {
        message: String,
        sql_state: Option<String>,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Authentication failed: {reason}")]
    Authentication { reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FolhaError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a transaction error.
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction {
            message: message.into(),
        }
    }

    /// Create an execution error for the statement at `statement` (1-based).
    pub fn execution(
        statement: usize,
        table: impl Into<String>,
        message: impl Into<String>,
        sql_state: Option<String>,
    ) -> Self {
        Self::Execution {
            statement,
            table: table.into(),
            message: message.into(),
            sql_state,
        }
    }

    /// Create a database error that is not tied to a plan statement.
    pub fn database(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an authentication error.
    pub fn authentication(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Transaction { .. } => {
                Some("No changes were applied. Check the server state and run the action again")
            }
            Self::Execution { .. } => Some(
                "All statements were rolled back. Verify the folhas and orgaos_folhas tables exist in the selected database",
            ),
            Self::Database { .. } => {
                Some("Check the user's permissions on this server and the database state")
            }
            Self::InvalidInput { .. } => Some("Fill in server, database and IDs (e.g. 1,2,3)"),
            Self::Authentication { .. } => Some("Check the operator user name and password"),
            Self::Configuration { .. } | Self::Internal { .. } => None,
        }
    }

    /// SQLSTATE reported by the server, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Execution { sql_state, .. } | Self::Database { sql_state, .. } => {
                sql_state.as_deref()
            }
            _ => None,
        }
    }
}

/// Convert sqlx errors to FolhaError.
///
/// Statement failures are reported as [`FolhaError::Execution`] by the toggler itself,
/// which knows the statement position; this conversion covers connection setup and
/// catalog queries.
impl From<sqlx::Error> for FolhaError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => FolhaError::connection(
                msg.to_string(),
                "Check the server, port, user and password configuration",
            ),
            sqlx::Error::Database(db_err) => {
                from_database_error(db_err.message(), db_err.code().map(|c| c.to_string()))
            }
            sqlx::Error::Io(io_err) => FolhaError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => FolhaError::connection(
                format!("TLS error: {}", tls_err),
                "Verify FOLHA_SSL_MODE and the server's TLS configuration",
            ),
            sqlx::Error::Protocol(msg) => FolhaError::connection(
                format!("Protocol error: {}", msg),
                "Check that the server speaks the PostgreSQL protocol",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                FolhaError::internal(format!("Column not found: {}", col))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                FolhaError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => FolhaError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => FolhaError::internal("Database worker crashed"),
            _ => FolhaError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Classify a server error by SQLSTATE.
///
/// 28xxx is invalid authorization and 3D000 an unknown database; both mean the
/// target cannot be used. Anything else keeps its SQLSTATE as a `Database` error.
fn from_database_error(message: &str, code: Option<String>) -> FolhaError {
    match code.as_deref() {
        Some(c) if c.starts_with("28") => {
            FolhaError::connection(message, "Check FOLHA_DB_USER and FOLHA_DB_PASSWORD")
        }
        Some("3D000") => FolhaError::connection(
            message,
            "List the databases on this server and pick an existing one",
        ),
        _ => FolhaError::database(message, code),
    }
}

/// Result type alias for toggler operations.
pub type FolhaResult<T> = Result<T, FolhaError>;
