//! In-memory [`RemoteStore`]: a table plus call counters and injectable
//! failures. Backs the tests and the CLI's local-file dashboards.

use dashsync_io::Table;

use crate::model::{CellUpdate, RowInsertion};
use crate::remote::{RemoteStore, RemoteTable, StoreError};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub table: Table,
    pub name: String,
    pub read_calls: usize,
    pub update_calls: usize,
    pub append_calls: usize,
    /// When set, the matching operation fails with `StoreError::Rejected`.
    pub fail_read: Option<String>,
    pub fail_updates: Option<String>,
    pub fail_appends: Option<String>,
}

impl MemoryStore {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            name: "in-memory table".into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Cell by 1-based sheet row (header = 1) and 0-based column.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        if row == 1 {
            return self.table.header.get(col).map(|s| s.as_str()).unwrap_or("");
        }
        self.table.cell(row.saturating_sub(2), col)
    }

    pub fn into_table(self) -> Table {
        self.table
    }
}

impl RemoteStore for MemoryStore {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn read_all(&mut self) -> Result<RemoteTable, StoreError> {
        self.read_calls += 1;
        if let Some(msg) = &self.fail_read {
            return Err(StoreError::Rejected(msg.clone()));
        }
        Ok(self.table.clone())
    }

    fn batch_update_cells(&mut self, updates: &[CellUpdate]) -> Result<(), StoreError> {
        self.update_calls += 1;
        if let Some(msg) = &self.fail_updates {
            return Err(StoreError::Rejected(msg.clone()));
        }

        for u in updates {
            if u.row < 1 || u.col < 1 {
                return Err(StoreError::Rejected(format!("invalid cell address ({}, {})", u.row, u.col)));
            }
            let col = u.col - 1;
            let cells = if u.row == 1 {
                &mut self.table.header
            } else {
                let idx = u.row - 2;
                if self.table.rows.len() <= idx {
                    self.table.rows.resize_with(idx + 1, Vec::new);
                }
                &mut self.table.rows[idx]
            };
            if cells.len() <= col {
                cells.resize(col + 1, String::new());
            }
            cells[col] = u.value.clone();
        }
        Ok(())
    }

    fn append_rows(&mut self, rows: &[RowInsertion]) -> Result<(), StoreError> {
        self.append_calls += 1;
        if let Some(msg) = &self.fail_appends {
            return Err(StoreError::Rejected(msg.clone()));
        }
        self.table.rows.extend(rows.iter().map(|r| r.values.clone()));
        Ok(())
    }
}
