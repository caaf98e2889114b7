use std::collections::{BTreeMap, HashMap};

use dashsync_io::Table;
use serde::Serialize;

use crate::error::{SchemaSide, SyncError};

// ---------------------------------------------------------------------------
// Source side
// ---------------------------------------------------------------------------

/// One normalized row from the uploaded table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// Trimmed, upper-cased business name. Never empty.
    pub key: String,
    /// 1-based row in the source file (header = row 1).
    pub line: usize,
    pub fields: BTreeMap<String, String>,
}

impl SourceRecord {
    /// Field value, `""` for columns the record does not carry.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(|s| s.as_str()).unwrap_or("")
    }
}

/// A source row dropped because an earlier row had the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedDuplicate {
    pub key: String,
    pub line: usize,
    pub kept_line: usize,
}

/// Working set handed to the diff: unique keys in source order.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    records: Vec<SourceRecord>,
    index: HashMap<String, usize>,
    /// Rows dropped for a blank key.
    pub blank_keys: usize,
    /// Rows dropped by first-occurrence-wins.
    pub duplicates: Vec<DroppedDuplicate>,
}

impl SourceTable {
    /// Add a record unless its key is blank or already present.
    ///
    /// Duplicate keys resolve to the first record seen; later ones are
    /// recorded in `duplicates` rather than discarded silently.
    pub fn push(&mut self, record: SourceRecord) {
        if record.key.is_empty() {
            self.blank_keys += 1;
            return;
        }
        if let Some(&pos) = self.index.get(&record.key) {
            self.duplicates.push(DroppedDuplicate {
                key: record.key,
                line: record.line,
                kept_line: self.records[pos].line,
            });
            return;
        }
        self.index.insert(record.key.clone(), self.records.len());
        self.records.push(record);
    }

    pub fn get(&self, key: &str) -> Option<&SourceRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn records(&self) -> &[SourceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Remote side
// ---------------------------------------------------------------------------

/// Column name → 0-based position in the remote header. First occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn from_header(header: &[String]) -> Self {
        let mut positions = HashMap::new();
        for (i, name) in header.iter().enumerate() {
            positions.entry(name.clone()).or_insert(i);
        }
        Self { positions }
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Position of a column the caller relies on being present.
    pub fn require(&self, name: &str) -> Result<usize, SyncError> {
        self.get(name).ok_or_else(|| SyncError::Schema {
            side: SchemaSide::Remote,
            column: name.to_string(),
        })
    }
}

/// One remote data row, borrowed from the snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RemoteRow<'a> {
    /// 1-based sheet row (header = 1, data starts at 2).
    pub number: usize,
    pub cells: &'a [String],
}

impl<'a> RemoteRow<'a> {
    /// Cell text, `""` past the end of a short row.
    pub fn cell(&self, col: usize) -> &'a str {
        self.cells.get(col).map(|s| s.as_str()).unwrap_or("")
    }
}

/// The remote table as read at the start of a run. Never mutated.
#[derive(Debug, Clone)]
pub struct RemoteSnapshot {
    pub table: Table,
    pub columns: ColumnIndex,
}

impl RemoteSnapshot {
    pub fn new(table: Table) -> Self {
        let columns = ColumnIndex::from_header(&table.header);
        Self { table, columns }
    }

    /// Header width; new rows are built at exactly this length.
    pub fn width(&self) -> usize {
        self.table.header.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = RemoteRow<'_>> {
        self.table.rows.iter().enumerate().map(|(i, cells)| RemoteRow {
            number: i + 2,
            cells,
        })
    }
}

// ---------------------------------------------------------------------------
// Write batches
// ---------------------------------------------------------------------------

/// One pending write to a single remote cell. Row and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellUpdate {
    pub row: usize,
    pub col: usize,
    pub value: String,
}

impl CellUpdate {
    pub fn new(row: usize, col: usize, value: impl Into<String>) -> Self {
        Self {
            row,
            col,
            value: value.into(),
        }
    }

    /// A1-style address, e.g. `C5`.
    pub fn a1(&self) -> String {
        format!("{}{}", column_letters(self.col), self.row)
    }
}

/// One pending new remote row, one value per header column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RowInsertion {
    pub values: Vec<String>,
}

/// Counters gathered while diffing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanStats {
    pub remote_rows: usize,
    pub matched_rows: usize,
    pub in_sync_rows: usize,
    pub unmatched_rows: usize,
    pub new_records: usize,
    pub out_of_scope: usize,
}

/// The two ordered batches a run will write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub updates: Vec<CellUpdate>,
    pub insertions: Vec<RowInsertion>,
    pub stats: PlanStats,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.insertions.is_empty()
    }
}

/// 1-based column number → spreadsheet letters (1 → A, 27 → AA).
pub fn column_letters(col: usize) -> String {
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
