//! Data models for the payroll status toggler.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod folha;
pub mod request;

// Re-export commonly used types
pub use connection::{ConnectionTarget, DEFAULT_PORT, parse_ssl_mode};
pub use folha::{Action, RecordIdSet, Status};
pub use request::{StatusChangeRequest, ValidatedRequest, validate_server};
