//! Open / close operations.
//!
//! The handler is the validation boundary: it checks the login gate and the
//! operator input before the toggler is ever called, then writes the audit
//! report once the change has committed.

use crate::audit::{AuditRecord, AuditWriter};
use crate::config::{Config, OperatorMode};
use crate::db::{StatusChangeOutcome, StatusToggler};
use crate::error::{FolhaError, FolhaResult};
use crate::models::{Action, StatusChangeRequest, ValidatedRequest};
use secrecy::SecretString;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// What the operator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedAction {
    Open,
    Close,
}

/// Credentials typed at the login gate.
#[derive(Debug)]
pub struct OperatorLogin {
    pub user: String,
    pub password: SecretString,
}

/// Output of a successful status change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusOutput {
    pub server: String,
    pub database: String,
    pub ids: String,
    #[serde(flatten)]
    pub outcome: StatusChangeOutcome,
    /// None when the audit report could not be written
    pub report_path: Option<PathBuf>,
}

pub struct StatusToolHandler<'a> {
    config: &'a Config,
    toggler: StatusToggler,
    audit: AuditWriter,
}

impl<'a> StatusToolHandler<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            toggler: StatusToggler::new(config.connect_timeout_duration()),
            audit: AuditWriter::new(config.report_dir.clone()),
        }
    }

    /// Map the operator's request to the toggler action, honoring the mode.
    pub fn resolve_action(&self, requested: RequestedAction) -> FolhaResult<Action> {
        match (requested, self.config.mode) {
            (RequestedAction::Open, OperatorMode::Restricted) => Err(FolhaError::invalid_input(
                "Opening folhas is not available in restricted mode",
            )),
            (RequestedAction::Open, OperatorMode::Standard) => Ok(Action::Open),
            (RequestedAction::Close, _) => Ok(self.config.close_action()),
        }
    }

    /// Check the login gate. A no-op in standard mode.
    pub fn authenticate(&self, login: Option<&OperatorLogin>) -> FolhaResult<()> {
        let Some(auth) = self.config.operator_auth()? else {
            return Ok(());
        };
        let login = login.ok_or_else(|| {
            FolhaError::authentication(
                "Login required: set FOLHA_OPERATOR_USER and FOLHA_OPERATOR_PASSWORD",
            )
        })?;
        auth.verify(&login.user, &login.password)
    }

    /// Validate, apply and audit one status change.
    pub async fn execute(
        &self,
        request: &StatusChangeRequest,
        requested: RequestedAction,
        login: Option<&OperatorLogin>,
    ) -> FolhaResult<StatusOutput> {
        self.authenticate(login)?;
        let action = self.resolve_action(requested)?;
        let validated = request.validate(&self.config.servers)?;
        self.apply(validated, action).await
    }

    async fn apply(&self, request: ValidatedRequest, action: Action) -> FolhaResult<StatusOutput> {
        let target = self.config.target(&request.server, &request.database)?;
        let outcome = self
            .toggler
            .set_status(&target, &request.ids, action)
            .await?;

        let ids = request.ids.to_string();
        let record = AuditRecord::now(
            &request.server,
            &request.database,
            &ids,
            self.config.audit_label(),
        );
        let report_path = self.audit.append(&record);

        info!(
            server = %request.server,
            database = %request.database,
            ids = %ids,
            action = %action,
            "Folha processed"
        );

        Ok(StatusOutput {
            server: request.server,
            database: request.database,
            ids,
            outcome,
            report_path,
        })
    }
}
