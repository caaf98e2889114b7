//! Remote store contract and the snapshot reader built on it.

use std::fmt;

use dashsync_io::Table;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::model::{CellUpdate, RemoteSnapshot, RowInsertion};

/// Header row plus data rows, as returned by [`RemoteStore::read_all`].
pub type RemoteTable = Table;

/// The three operations the engine needs from a remote table.
///
/// Implementations must write values as given (no re-interpretation beyond
/// what the store's configured input mode does) and must not retry.
pub trait RemoteStore {
    /// Short description for the audit log ("Google Sheets abc/BaseDeDados").
    fn describe(&self) -> String;

    /// Full table: header row and every data row.
    fn read_all(&mut self) -> Result<RemoteTable, StoreError>;

    /// Set many cells in one call.
    fn batch_update_cells(&mut self, updates: &[CellUpdate]) -> Result<(), StoreError>;

    /// Append rows after the last data row in one call.
    fn append_rows(&mut self, rows: &[RowInsertion]) -> Result<(), StoreError>;
}

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Credentials missing or refused
    Auth(String),
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Response body could not be understood
    Parse(String),
    /// File I/O error (local stores)
    Io(String),
    /// The store refused the request
    Rejected(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(msg) => write!(f, "authentication failed: {msg}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Http(code, msg) => write!(f, "HTTP {code}: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Rejected(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Read the remote table and check it carries every required column.
pub fn read_snapshot(
    store: &mut dyn RemoteStore,
    config: &SyncConfig,
) -> Result<RemoteSnapshot, SyncError> {
    let table = store
        .read_all()
        .map_err(|e| SyncError::RemoteUnavailable(e.to_string()))?;

    if table.header.iter().all(|h| h.is_empty()) {
        return Err(SyncError::RemoteSchema("remote table is empty".into()));
    }

    if let Some(column) = table.first_missing(&config.remote_columns()) {
        return Err(SyncError::RemoteSchema(format!(
            "column '{column}' not found in remote header"
        )));
    }

    Ok(RemoteSnapshot::new(table))
}
