//! Database access layer.
//!
//! This module provides the PostgreSQL side of the toggler:
//! - Single-connection setup with a connect timeout
//! - Statement plans for status changes
//! - The transactional status toggler
//! - Catalog queries (database listing)

pub mod catalog;
pub mod connect;
pub mod statements;
pub mod toggler;

pub use catalog::{DatabaseCatalog, filter_databases};
pub use connect::{close_quietly, open_connection};
pub use statements::{PayrollTable, StatusUpdate, build_plan};
pub use toggler::{StatementReport, StatusChangeOutcome, StatusToggler};
