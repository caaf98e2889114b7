// Excel import (xlsx, xls)
//
// Only the first worksheet is read. Its first row is the header.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};

use crate::error::IoError;
use crate::table::Table;

/// Import the first worksheet of an Excel file as a string table.
pub fn import_first_sheet(path: &Path) -> Result<Table, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| IoError::Corrupt(format!("failed to open Excel file: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IoError::Corrupt("Excel file contains no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IoError::Corrupt(format!("failed to read sheet '{sheet_name}': {e}")))?;

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Ok(Table::default());
    }

    // Range start offset (data may not begin at A1)
    let (_, data_start_col) = range.start().unwrap_or((0, 0));
    let pad = data_start_col as usize;

    let mut rows = range.rows().map(|row| {
        let mut out = vec![String::new(); pad];
        out.extend(row.iter().map(cell_text));
        out
    });

    let header = rows.next().unwrap_or_default();
    let rows: Vec<Vec<String>> = rows.collect();

    log::debug!(
        "{}: sheet '{sheet_name}' {} data rows x {} columns",
        path.display(),
        rows.len(),
        header.len()
    );

    Ok(Table::new(header, rows))
}

/// Render one cell the way a user sees it in a plain export.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => format_float(*n),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{e:?}"),
        // Serial number; date columns are not part of the sync contract
        Data::DateTime(dt) => format_float(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Integers without decimals, everything else as Rust prints it.
fn format_float(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
