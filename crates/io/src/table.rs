// In-memory table: one header row plus string data rows

use std::path::Path;

use crate::error::IoError;

/// Accepted source containers. Selected by file extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
    Xls,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            _ => Err(IoError::UnsupportedFormat(ext)),
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Xlsx => write!(f, "xlsx"),
            Self::Xls => write!(f, "xls"),
        }
    }
}

/// Header plus data rows. Every cell is a string; absent cells read as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// 0-based position of the first header cell equal to `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// First expected column that the header lacks, if any.
    pub fn first_missing<'a>(&self, expected: &'a [String]) -> Option<&'a str> {
        expected
            .iter()
            .find(|name| self.column_index(name).is_none())
            .map(|s| s.as_str())
    }

    /// Cell text, or `""` when the row is shorter than `col`.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// Keep only `columns`, in that order. Fails on the first absent column.
    pub fn project(&self, columns: &[String]) -> Result<Table, IoError> {
        let mut positions = Vec::with_capacity(columns.len());
        for name in columns {
            let idx = self
                .column_index(name)
                .ok_or_else(|| IoError::MissingColumn(name.clone()))?;
            positions.push(idx);
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                positions
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(Table {
            header: columns.to_vec(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read a source file and project it onto `expected` columns.
///
/// The container is chosen by extension. Delimited text retries with a
/// second delimiter when the first parse lacks an expected column.
pub fn read_table(path: &Path, expected: &[String]) -> Result<Table, IoError> {
    let format = SourceFormat::from_path(path)?;
    log::debug!("reading {} as {format}", path.display());

    let table = match format {
        SourceFormat::Csv => crate::csv::import_expecting(path, expected)?,
        SourceFormat::Xlsx | SourceFormat::Xls => crate::xlsx::import_first_sheet(path)?,
    };

    table.project(expected)
}
