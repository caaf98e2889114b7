// CSV import/export

use std::io::Read;
use std::path::Path;

use crate::error::IoError;
use crate::table::Table;

/// Delimiters tried, in order, when the caller knows which columns to expect.
const EXPECTING_DELIMITERS: &[u8] = &[b';', b','];

/// Import a CSV whose delimiter is sniffed from the first lines.
pub fn import(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

/// Import a CSV that must carry every column in `expected`.
///
/// Semicolon is tried first, then comma. The first parse whose header
/// contains all expected columns wins. If none does, the error names the
/// first missing column of the attempt that found the most columns.
pub fn import_expecting(path: &Path, expected: &[String]) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    // (missing count, first missing column) of the closest attempt so far
    let mut closest: Option<(usize, String)> = None;

    for &delimiter in EXPECTING_DELIMITERS {
        let table = import_from_string(&content, delimiter)?;
        let Some(column) = table.first_missing(expected) else {
            log::debug!("{}: parsed with delimiter {:?}", path.display(), delimiter as char);
            return Ok(table);
        };

        let missing = expected
            .iter()
            .filter(|name| table.column_index(name).is_none())
            .count();
        log::debug!(
            "{}: delimiter {:?} lacks {missing} column(s), first '{column}'",
            path.display(),
            delimiter as char
        );
        if closest.as_ref().map_or(true, |(best, _)| missing < *best) {
            closest = Some((missing, column.to_string()));
        }
    }

    Err(IoError::MissingColumn(
        closest.map(|(_, column)| column).unwrap_or_default(),
    ))
}

/// Delimiters a dashboard export may use, in tie-break order (semicolon
/// first, as in the loader).
const DASHBOARD_DELIMITERS: [u8; 3] = [b';', b',', b'\t'];

/// Guess the delimiter of a dashboard CSV from its header and first rows.
///
/// A candidate only counts if it splits the header into at least two
/// columns; among those, the one whose first rows agree with the header
/// width most often wins. Falls back to `,`.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).take(10).collect();
    let Some(header) = sample.first() else {
        return b',';
    };

    let mut best = (b',', 0usize);
    for delim in DASHBOARD_DELIMITERS {
        let width = field_count(header, delim);
        if width < 2 {
            continue;
        }
        let agreeing = sample.iter().filter(|l| field_count(l, delim) == width).count();
        let score = agreeing * width;
        if score > best.1 {
            best = (delim, score);
        }
    }
    best.0
}

/// Fields on one line, honouring quotes.
fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map_or(1, |r| r.len())
}

/// Read file and convert to UTF-8.
///
/// UTF-8 (with or without BOM) is tried first; on failure the bytes are
/// decoded as Windows-1252, which is what Excel writes for "CSV" on most
/// Western locales.
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(decode_bytes(bytes))
}

fn decode_bytes(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => match s.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => s,
        },
        Err(e) => {
            let bytes = e.into_bytes();
            log::debug!("input is not UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

/// Parse CSV text. The first record is the header; every later record is a data row.
pub fn import_from_string(content: &str, delimiter: u8) -> Result<Table, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header: Vec<String> = match records.next() {
        Some(result) => {
            let record = result.map_err(|e| IoError::Corrupt(e.to_string()))?;
            record.iter().map(|s| s.to_string()).collect()
        }
        None => return Ok(Table::default()),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| IoError::Corrupt(e.to_string()))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(Table::new(header, rows))
}

/// Write header and rows. Rows may be shorter than the header.
pub fn export(table: &Table, path: &Path, delimiter: u8) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IoError::Io(e.to_string()))?;

    writer
        .write_record(&table.header)
        .map_err(|e| IoError::Io(e.to_string()))?;
    for row in &table.rows {
        writer.write_record(row).map_err(|e| IoError::Io(e.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}
