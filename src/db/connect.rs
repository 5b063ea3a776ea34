//! Single-connection setup.
//!
//! Every operation opens its own connection and closes it when done; there is no
//! pool because each invocation performs exactly one round of work.

use crate::error::{FolhaError, FolhaResult};
use crate::models::ConnectionTarget;
use sqlx::{Connection, PgConnection};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Open a connection to `target`, bounded by `connect_timeout`.
///
/// Every failure here is reported as [`FolhaError::Connection`].
pub async fn open_connection(
    target: &ConnectionTarget,
    connect_timeout: Duration,
) -> FolhaResult<PgConnection> {
    debug!(server = %target.describe(), "Opening connection");

    let options = target.connect_options();
    match timeout(connect_timeout, PgConnection::connect_with(&options)).await {
        Ok(Ok(conn)) => Ok(conn),
        Ok(Err(e)) => Err(as_connection_error(e.into(), target)),
        Err(_) => Err(FolhaError::connection(
            format!(
                "Timed out after {}s connecting to {}",
                connect_timeout.as_secs(),
                target.describe()
            ),
            "Check that the server is reachable or raise FOLHA_CONNECT_TIMEOUT",
        )),
    }
}

/// Close a connection, ignoring errors; the server drops it either way.
pub async fn close_quietly(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        debug!(error = %e, "Error while closing connection");
    }
}

fn as_connection_error(err: FolhaError, target: &ConnectionTarget) -> FolhaError {
    match err {
        FolhaError::Connection { .. } => err,
        other => FolhaError::connection(
            format!("{} ({})", other, target.describe()),
            "Check the server name, port and credentials",
        ),
    }
}
