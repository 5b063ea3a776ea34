//! Payroll (folha) domain types.
//!
//! A payroll batch lives in `folhas` and fans out to one row per organizational
//! unit in `orgaos_folhas`. Both carry an integer status: 0 open, 1 closed.

use crate::error::{FolhaError, FolhaResult};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Status of a payroll batch and its organizational-unit entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Open,
    Closed,
}

impl Status {
    /// Integer value stored in the `status` columns.
    pub fn code(&self) -> i32 {
        match self {
            Self::Open => 0,
            Self::Closed => 1,
        }
    }

    /// Parse the stored integer value.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Open),
            1 => Some(Self::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Transition requested by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Open,
    Close,
    /// Reset to open, then close, in the same transaction.
    ReopenThenClose,
}

impl Action {
    /// Ordered status steps this action applies.
    pub fn steps(&self) -> &'static [Status] {
        match self {
            Self::Open => &[Status::Open],
            Self::Close => &[Status::Closed],
            Self::ReopenThenClose => &[Status::Open, Status::Closed],
        }
    }

    /// Status the records end in once the action commits.
    pub fn final_status(&self) -> Status {
        match self {
            Self::Open => Status::Open,
            Self::Close | Self::ReopenThenClose => Status::Closed,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Close => write!(f, "close"),
            Self::ReopenThenClose => write!(f, "reopen-then-close"),
        }
    }
}

/// Non-empty, de-duplicated set of payroll record IDs.
///
/// Insertion order is preserved so reports show IDs the way the operator typed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecordIdSet(Vec<i64>);

impl RecordIdSet {
    /// Parse a comma-separated list such as `"1, 2,3"`.
    ///
    /// Blank items are ignored, so a trailing comma is accepted. Anything that is
    /// not an integer is rejected.
    pub fn parse(input: &str) -> FolhaResult<Self> {
        let mut ids = Vec::new();
        for item in input.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let id = item.parse::<i64>().map_err(|_| {
                FolhaError::invalid_input(format!(
                    "'{}' is not a valid folha ID; use integers separated by commas",
                    item
                ))
            })?;
            ids.push(id);
        }
        Self::from_ids(ids)
    }

    /// Build a set from already-typed IDs.
    pub fn from_ids(ids: impl IntoIterator<Item = i64>) -> FolhaResult<Self> {
        let mut seen = HashSet::new();
        let ids: Vec<i64> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        if ids.is_empty() {
            return Err(FolhaError::invalid_input("At least one folha ID is required"));
        }
        Ok(Self(ids))
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true: every constructor rejects an empty set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RecordIdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}
