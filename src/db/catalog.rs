//! Database catalog queries.

use crate::db::connect::{close_quietly, open_connection};
use crate::error::FolhaResult;
use crate::models::ConnectionTarget;
use sqlx::Row;
use std::time::Duration;
use tracing::{debug, info};

mod queries {
    pub const LIST_DATABASES: &str = "SELECT datname FROM pg_database WHERE datistemplate = false";
}

pub struct DatabaseCatalog {
    connect_timeout: Duration,
}

impl DatabaseCatalog {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    /// List non-template databases on the server behind `target`.
    ///
    /// `target.database` should be an administrative database such as `postgres`.
    /// Names come back in catalog order. Rows whose name cannot be decoded are
    /// skipped.
    pub async fn list_databases(&self, target: &ConnectionTarget) -> FolhaResult<Vec<String>> {
        let mut conn = open_connection(target, self.connect_timeout).await?;
        let rows = sqlx::query(queries::LIST_DATABASES)
            .fetch_all(&mut conn)
            .await;
        close_quietly(conn).await;
        let rows = rows?;

        let names: Vec<String> = rows
            .iter()
            .filter_map(|row| match row.try_get::<String, _>("datname") {
                Ok(name) => Some(name),
                Err(e) => {
                    debug!(error = %e, "Skipping undecodable pg_database row");
                    None
                }
            })
            .collect();

        info!(
            server = %target.host,
            count = names.len(),
            "Listed databases"
        );
        Ok(names)
    }
}

/// Case-insensitive substring filter over database names. Keeps input order.
pub fn filter_databases<'a>(names: &'a [String], text: &str) -> Vec<&'a str> {
    let needle = text.trim().to_lowercase();
    names
        .iter()
        .map(String::as_str)
        .filter(|name| needle.is_empty() || name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["postgres", "Folha_Prefeitura", "folha_camara", "rh"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let names = names();
        assert_eq!(
            filter_databases(&names, "FOLHA"),
            vec!["Folha_Prefeitura", "folha_camara"]
        );
    }

    #[test]
    fn test_empty_filter_returns_all() {
        let names = names();
        assert_eq!(filter_databases(&names, "  ").len(), 4);
    }

    #[test]
    fn test_filter_without_matches() {
        let names = names();
        assert!(filter_databases(&names, "estoque").is_empty());
        assert!(filter_databases(&[], "folha").is_empty());
    }

    #[test]
    fn test_list_query_excludes_templates() {
        assert!(queries::LIST_DATABASES.contains("datistemplate = false"));
    }
}
