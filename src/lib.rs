//! folha-status library
//!
//! Opens and closes payroll batches (folhas) in PostgreSQL. Status changes run
//! as a single transaction over the `folhas` and `orgaos_folhas` tables and are
//! recorded in CSV audit reports.

pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod tools;

pub use audit::{AuditLabel, AuditRecord, AuditWriter};
pub use config::Config;
pub use db::StatusToggler;
pub use error::{FolhaError, FolhaResult};
