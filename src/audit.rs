//! CSV audit reports.
//!
//! Every committed status change produces one small CSV file in the report
//! directory: a header row and a single data row. Writing the report is best
//! effort. The status change has already committed by the time it runs, so
//! failures are logged and swallowed.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_REPORT_DIR: &str = "relatorios";

const FILE_PREFIX: &str = "fechamento_";
const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const ROW_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Bound on same-second name collisions before giving up.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Header of the IDs column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuditLabel {
    /// Standard mode: both open and close are recorded as "processed".
    Processed,
    /// Restricted mode: only closes happen.
    Closed,
}

impl AuditLabel {
    pub fn header(&self) -> &'static str {
        match self {
            Self::Processed => "IDs Processados",
            Self::Closed => "IDs Fechados",
        }
    }
}

/// One audit row.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub timestamp: DateTime<Local>,
    pub server: String,
    pub database: String,
    /// IDs as shown to the operator, e.g. "1,2,3"
    pub ids: String,
    pub label: AuditLabel,
}

impl AuditRecord {
    pub fn now(
        server: impl Into<String>,
        database: impl Into<String>,
        ids: impl Into<String>,
        label: AuditLabel,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            server: server.into(),
            database: database.into(),
            ids: ids.into(),
            label,
        }
    }

    fn header_row(&self) -> [&str; 4] {
        ["Data", "Servidor", "Banco", self.label.header()]
    }

    fn data_row(&self) -> [String; 4] {
        [
            self.timestamp.format(ROW_TIMESTAMP_FORMAT).to_string(),
            self.server.clone(),
            self.database.clone(),
            self.ids.clone(),
        ]
    }

    fn file_stem(&self) -> String {
        format!(
            "{}{}",
            FILE_PREFIX,
            self.timestamp.format(FILE_TIMESTAMP_FORMAT)
        )
    }
}

/// Writes audit records into a report directory.
#[derive(Debug, Clone)]
pub struct AuditWriter {
    dir: PathBuf,
}

impl AuditWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `record` to a new file. Returns the path, or `None` if anything failed.
    pub fn append(&self, record: &AuditRecord) -> Option<PathBuf> {
        match self.try_append(record) {
            Ok(path) => {
                info!(path = %path.display(), "Audit report written");
                Some(path)
            }
            Err(e) => {
                warn!(
                    dir = %self.dir.display(),
                    error = %e,
                    "Could not write audit report"
                );
                None
            }
        }
    }

    fn try_append(&self, record: &AuditRecord) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let (path, file) = self.create_unique(&record.file_stem())?;

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(record.header_row())?;
        writer.write_record(record.data_row())?;
        writer.flush()?;

        Ok(path)
    }

    /// Create `<stem>.csv`, or `<stem>_1.csv`, `<stem>_2.csv`... if taken.
    fn create_unique(&self, stem: &str) -> io::Result<(PathBuf, File)> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{stem}.csv")
            } else {
                format!("{stem}_{attempt}.csv")
            };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("too many reports named {stem}"),
        ))
    }
}

impl Default for AuditWriter {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_DIR)
    }
}
