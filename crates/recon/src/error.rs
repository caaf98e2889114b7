use std::fmt;

use dashsync_io::IoError;

use crate::model::{CellUpdate, RowInsertion};

/// The write batch a store rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailedBatch {
    Updates(Vec<CellUpdate>),
    Insertions(Vec<RowInsertion>),
}

impl FailedBatch {
    pub fn len(&self) -> usize {
        match self {
            Self::Updates(u) => u.len(),
            Self::Insertions(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for FailedBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updates(u) => write!(f, "batch of {} cell update(s)", u.len()),
            Self::Insertions(r) => write!(f, "batch of {} new row(s)", r.len()),
        }
    }
}

/// Which table a missing column was expected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSide {
    Source,
    Remote,
}

impl fmt::Display for SchemaSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug)]
pub enum SyncError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (no key mapping, clashing columns, etc.).
    ConfigValidation(String),
    /// Source container unrecognized or unreadable as a table.
    Format(String),
    /// Expected column missing from the source table, or from the remote
    /// column index during the diff.
    Schema { side: SchemaSide, column: String },
    /// Remote table could not be read (connectivity, auth).
    RemoteUnavailable(String),
    /// Remote table is empty or lacks a required column.
    RemoteSchema(String),
    /// A write batch was rejected. Carries the batch that failed.
    RemoteWrite { batch: FailedBatch, message: String },
    /// Anything else (source file unreadable, ...).
    Reconciliation(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Schema { side, column } => {
                write!(f, "schema error: {side} column '{column}' not found")
            }
            Self::RemoteUnavailable(msg) => write!(f, "remote unavailable: {msg}"),
            Self::RemoteSchema(msg) => write!(f, "remote schema error: {msg}"),
            Self::RemoteWrite { batch, message } => {
                write!(f, "remote rejected {batch}: {message}")
            }
            Self::Reconciliation(msg) => write!(f, "reconciliation error: {msg}"),
        }
    }
}

impl SyncError {
    /// Stable variant name, used in JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "config_parse",
            Self::ConfigValidation(_) => "config_validation",
            Self::Format(_) => "format",
            Self::Schema { .. } => "schema",
            Self::RemoteUnavailable(_) => "remote_unavailable",
            Self::RemoteSchema(_) => "remote_schema",
            Self::RemoteWrite { .. } => "remote_write",
            Self::Reconciliation(_) => "reconciliation",
        }
    }
}

impl std::error::Error for SyncError {}

impl From<IoError> for SyncError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::UnsupportedFormat(_) | IoError::Corrupt(_) => Self::Format(e.to_string()),
            IoError::MissingColumn(column) => Self::Schema {
                side: SchemaSide::Source,
                column,
            },
            IoError::Io(msg) => Self::Reconciliation(format!("cannot read source: {msg}")),
        }
    }
}
