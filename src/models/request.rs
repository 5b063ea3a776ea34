//! Operator request models and the validation boundary.
//!
//! Raw strings typed by the operator go in; a [`ValidatedRequest`] comes out. The
//! toggler only accepts the validated form, so an empty server, database or ID
//! list can never reach the database.

use crate::error::{FolhaError, FolhaResult};
use crate::models::folha::RecordIdSet;
use serde::Serialize;

/// Raw operator input for a status change.
#[derive(Debug, Clone, Default)]
pub struct StatusChangeRequest {
    pub server: String,
    pub database: String,
    /// Comma-separated folha IDs, e.g. "1,2,3"
    pub ids: String,
}

/// A request whose fields were checked and typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedRequest {
    pub server: String,
    pub database: String,
    pub ids: RecordIdSet,
}

impl StatusChangeRequest {
    pub fn new(
        server: impl Into<String>,
        database: impl Into<String>,
        ids: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            database: database.into(),
            ids: ids.into(),
        }
    }

    /// Check all fields.
    ///
    /// `allowed_servers` is the configured server list; when it is empty any
    /// server name is accepted.
    pub fn validate(&self, allowed_servers: &[String]) -> FolhaResult<ValidatedRequest> {
        let server = self.server.trim();
        let database = self.database.trim();
        let ids = self.ids.trim();

        if server.is_empty() || database.is_empty() || ids.is_empty() {
            return Err(FolhaError::invalid_input(
                "Server, database and folha IDs are all required",
            ));
        }

        validate_server(server, allowed_servers)?;

        Ok(ValidatedRequest {
            server: server.to_string(),
            database: database.to_string(),
            ids: RecordIdSet::parse(ids)?,
        })
    }
}

/// Reject servers outside the configured list (when one is configured).
pub fn validate_server(server: &str, allowed_servers: &[String]) -> FolhaResult<()> {
    if server.trim().is_empty() {
        return Err(FolhaError::invalid_input("Server is required"));
    }
    if !allowed_servers.is_empty() && !allowed_servers.iter().any(|s| s == server) {
        return Err(FolhaError::invalid_input(format!(
            "Server '{}' is not in the configured server list ({})",
            server,
            allowed_servers.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn servers() -> Vec<String> {
        vec!["db1".to_string(), "db2".to_string()]
    }

    #[test]
    fn test_valid_request() {
        let req = StatusChangeRequest::new(" db1 ", "payroll", "1,2,3");
        let valid = req.validate(&servers()).unwrap();
        assert_eq!(valid.server, "db1");
        assert_eq!(valid.database, "payroll");
        assert_eq!(valid.ids.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_empty_fields_rejected() {
        for req in [
            StatusChangeRequest::new("", "payroll", "1"),
            StatusChangeRequest::new("db1", "  ", "1"),
            StatusChangeRequest::new("db1", "payroll", ""),
        ] {
            let err = req.validate(&servers()).unwrap_err();
            assert!(matches!(err, FolhaError::InvalidInput { .. }));
        }
    }

    #[test]
    fn test_unknown_server_rejected() {
        let req = StatusChangeRequest::new("db9", "payroll", "1");
        let err = req.validate(&servers()).unwrap_err();
        assert!(err.to_string().contains("db9"));
    }

    #[test]
    fn test_any_server_allowed_without_list() {
        let req = StatusChangeRequest::new("elsewhere", "payroll", "1");
        assert!(req.validate(&[]).is_ok());
    }

    #[test]
    fn test_malformed_ids_rejected() {
        let req = StatusChangeRequest::new("db1", "payroll", "1,2);DELETE FROM folhas;--");
        assert!(req.validate(&servers()).is_err());
    }
}
