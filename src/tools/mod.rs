//! Operator-facing operations.
//!
//! This module contains the handlers the CLI calls:
//! - `status`: open / close folhas (validation, login gate, audit report)
//! - `databases`: list configured servers and the databases on a server

pub mod databases;
pub mod status;

pub use databases::{DatabaseToolHandler, DatabasesOutput};
pub use status::{OperatorLogin, RequestedAction, StatusOutput, StatusToolHandler};
