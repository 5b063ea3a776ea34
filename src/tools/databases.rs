//! Server and database listing.

use crate::config::Config;
use crate::db::{DatabaseCatalog, filter_databases};
use crate::error::FolhaResult;
use crate::models::validate_server;
use serde::Serialize;

/// Output of a database listing.
#[derive(Debug, Clone, Serialize)]
pub struct DatabasesOutput {
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub databases: Vec<String>,
}

pub struct DatabaseToolHandler<'a> {
    config: &'a Config,
    catalog: DatabaseCatalog,
}

impl<'a> DatabaseToolHandler<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            catalog: DatabaseCatalog::new(config.connect_timeout_duration()),
        }
    }

    /// Configured servers, in configuration order.
    pub fn servers(&self) -> &[String] {
        &self.config.servers
    }

    /// List the databases on `server`, optionally narrowed by `filter`.
    pub async fn list_databases(
        &self,
        server: &str,
        filter: Option<&str>,
    ) -> FolhaResult<DatabasesOutput> {
        let server = server.trim();
        validate_server(server, &self.config.servers)?;

        let target = self.config.admin_target(server)?;
        let names = self.catalog.list_databases(&target).await?;

        let databases = match filter {
            Some(text) => filter_databases(&names, text)
                .into_iter()
                .map(String::from)
                .collect(),
            None => names,
        };

        Ok(DatabasesOutput {
            server: server.to_string(),
            filter: filter.map(String::from),
            databases,
        })
    }
}
