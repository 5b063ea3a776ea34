//! Statement plans for status changes.
//!
//! Every status step touches the parent table first and the child table second.
//! IDs and status are always bound as parameters; nothing is interpolated.

use crate::models::{Action, Status};
use serde::Serialize;
use std::fmt;

mod queries {
    pub const UPDATE_FOLHAS: &str = "UPDATE folhas SET status = $1 WHERE id = ANY($2)";
    pub const UPDATE_ORGAOS_FOLHAS: &str =
        "UPDATE orgaos_folhas SET status = $1 WHERE folha_id = ANY($2)";
}

/// Tables whose status column is toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollTable {
    Folhas,
    OrgaosFolhas,
}

impl PayrollTable {
    /// Parent first, then child.
    pub const ORDERED: [PayrollTable; 2] = [PayrollTable::Folhas, PayrollTable::OrgaosFolhas];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Folhas => "folhas",
            Self::OrgaosFolhas => "orgaos_folhas",
        }
    }

    /// Column matched against the ID set.
    pub fn id_column(&self) -> &'static str {
        match self {
            Self::Folhas => "id",
            Self::OrgaosFolhas => "folha_id",
        }
    }
}

impl fmt::Display for PayrollTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One UPDATE in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub table: PayrollTable,
    pub status: Status,
}

impl StatusUpdate {
    /// Parameterized SQL: `$1` is the status code, `$2` the ID array.
    pub fn sql(&self) -> &'static str {
        match self.table {
            PayrollTable::Folhas => queries::UPDATE_FOLHAS,
            PayrollTable::OrgaosFolhas => queries::UPDATE_ORGAOS_FOLHAS,
        }
    }
}

/// Ordered statements for `action`.
pub fn build_plan(action: Action) -> Vec<StatusUpdate> {
    action
        .steps()
        .iter()
        .flat_map(|&status| {
            PayrollTable::ORDERED
                .into_iter()
                .map(move |table| StatusUpdate { table, status })
        })
        .collect()
}
