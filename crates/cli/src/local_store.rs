//! Dashboard kept in a local CSV file.
//!
//! The file is read with the snapshot, edited in memory and rewritten
//! after every accepted batch, keeping its original delimiter.

use std::path::{Path, PathBuf};

use dashsync_io::csv;
use dashsync_recon::{CellUpdate, MemoryStore, RemoteStore, RemoteTable, RowInsertion, StoreError};

pub struct LocalCsvStore {
    path: PathBuf,
    delimiter: u8,
    inner: MemoryStore,
}

impl LocalCsvStore {
    /// Nothing is read until the engine asks for the snapshot.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            delimiter: b',',
            inner: MemoryStore::default().with_name(format!("local dashboard {}", path.display())),
        }
    }

    fn save(&self) -> Result<(), StoreError> {
        csv::export(&self.inner.table, &self.path, self.delimiter)
            .map_err(|e| StoreError::Io(e.to_string()))
    }
}

impl RemoteStore for LocalCsvStore {
    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn read_all(&mut self) -> Result<RemoteTable, StoreError> {
        let content =
            csv::read_file_as_utf8(&self.path).map_err(|e| StoreError::Io(e.to_string()))?;
        self.delimiter = csv::sniff_delimiter(&content);
        self.inner.table = csv::import_from_string(&content, self.delimiter)
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        log::debug!(
            "{}: {} rows, delimiter {:?}",
            self.path.display(),
            self.inner.table.len(),
            self.delimiter as char
        );
        self.inner.read_all()
    }

    fn batch_update_cells(&mut self, updates: &[CellUpdate]) -> Result<(), StoreError> {
        self.inner.batch_update_cells(updates)?;
        self.save()
    }

    fn append_rows(&mut self, rows: &[RowInsertion]) -> Result<(), StoreError> {
        self.inner.append_rows(rows)?;
        self.save()
    }
}
