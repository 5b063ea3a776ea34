//! Transactional status changes.
//!
//! [`StatusToggler::set_status`] runs the whole statement plan inside one
//! transaction on one connection. Either every statement commits or none does.

use crate::db::connect::{close_quietly, open_connection};
use crate::db::statements::{PayrollTable, StatusUpdate, build_plan};
use crate::error::{FolhaError, FolhaResult};
use crate::models::{Action, ConnectionTarget, RecordIdSet, Status};
use serde::Serialize;
use sqlx::{Connection, PgConnection};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of one executed statement.
#[derive(Debug, Clone, Serialize)]
pub struct StatementReport {
    pub table: PayrollTable,
    pub status: Status,
    pub rows_affected: u64,
}

/// Result of a committed status change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChangeOutcome {
    pub action: Action,
    pub final_status: Status,
    pub statements: Vec<StatementReport>,
    pub execution_time_ms: u64,
}

impl StatusChangeOutcome {
    /// Rows touched by the last statement on `table`, i.e. the rows now in
    /// `final_status`.
    pub fn rows_in_final_status(&self, table: PayrollTable) -> u64 {
        self.statements
            .iter()
            .rev()
            .find(|s| s.table == table)
            .map(|s| s.rows_affected)
            .unwrap_or(0)
    }
}

pub struct StatusToggler {
    connect_timeout: Duration,
}

impl StatusToggler {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    /// Apply `action` to every record in `ids` on `target`.
    pub async fn set_status(
        &self,
        target: &ConnectionTarget,
        ids: &RecordIdSet,
        action: Action,
    ) -> FolhaResult<StatusChangeOutcome> {
        let start = Instant::now();
        let plan = build_plan(action);
        debug!(
            server = %target.describe(),
            action = %action,
            statements = plan.len(),
            ids = %ids,
            "Built status plan"
        );

        let mut conn = open_connection(target, self.connect_timeout).await?;
        let result = run_plan(&mut conn, &plan, ids).await;
        close_quietly(conn).await;
        let statements = result?;

        let execution_time_ms = start.elapsed().as_millis() as u64;
        info!(
            server = %target.describe(),
            action = %action,
            ids = %ids,
            statements = statements.len(),
            execution_time_ms = execution_time_ms,
            "Status change committed"
        );

        Ok(StatusChangeOutcome {
            action,
            final_status: action.final_status(),
            statements,
            execution_time_ms,
        })
    }
}

/// Execute `plan` in one transaction. Rolls back on the first failure.
async fn run_plan(
    conn: &mut PgConnection,
    plan: &[StatusUpdate],
    ids: &RecordIdSet,
) -> FolhaResult<Vec<StatementReport>> {
    let mut tx = conn
        .begin()
        .await
        .map_err(|e| FolhaError::transaction(format!("Could not begin transaction: {}", e)))?;

    let mut reports = Vec::with_capacity(plan.len());
    for (index, update) in plan.iter().enumerate() {
        let result = sqlx::query(update.sql())
            .bind(update.status.code())
            .bind(ids.as_slice())
            .execute(&mut *tx)
            .await;

        match result {
            Ok(done) => {
                debug!(
                    table = %update.table,
                    status = %update.status,
                    rows_affected = done.rows_affected(),
                    "Statement executed"
                );
                reports.push(StatementReport {
                    table: update.table,
                    status: update.status,
                    rows_affected: done.rows_affected(),
                });
            }
            Err(e) => {
                let err = execution_error(index + 1, update.table, e);
                if let Err(rollback_err) = tx.rollback().await {
                    // The server discards the transaction when the connection closes.
                    warn!(error = %rollback_err, "Rollback failed");
                }
                warn!(error = %err, "Status change rolled back");
                return Err(err);
            }
        }
    }

    tx.commit()
        .await
        .map_err(|e| FolhaError::transaction(format!("Could not commit transaction: {}", e)))?;

    Ok(reports)
}

fn execution_error(statement: usize, table: PayrollTable, err: sqlx::Error) -> FolhaError {
    match err {
        sqlx::Error::Database(db_err) => FolhaError::execution(
            statement,
            table.name(),
            db_err.message(),
            db_err.code().map(|c| c.to_string()),
        ),
        other => FolhaError::execution(statement, table.name(), other.to_string(), None),
    }
}
