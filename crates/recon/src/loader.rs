//! Source loading: file → projected table → normalized, de-duplicated records.

use std::collections::BTreeMap;
use std::path::Path;

use dashsync_io::Table;

use crate::config::SyncConfig;
use crate::error::{SchemaSide, SyncError};
use crate::model::{SourceRecord, SourceTable};
use crate::rules::normalize_key;

/// Load the source file named by `path` into the diff's working set.
pub fn load_source(path: &Path, config: &SyncConfig) -> Result<SourceTable, SyncError> {
    let expected = config.source_columns();
    let table = dashsync_io::read_table(path, &expected)?;
    build_source_table(&table, config)
}

/// Normalize an already-parsed table.
///
/// The table must carry the key column. Missing cells become `""`; rows
/// with a blank key are dropped; duplicate keys keep the first row.
pub fn build_source_table(table: &Table, config: &SyncConfig) -> Result<SourceTable, SyncError> {
    let key_col = table
        .column_index(&config.source.key)
        .ok_or_else(|| SyncError::Schema {
            side: SchemaSide::Source,
            column: config.source.key.clone(),
        })?;

    let mut source = SourceTable::default();
    for i in 0..table.len() {
        let fields: BTreeMap<String, String> = table
            .header
            .iter()
            .enumerate()
            .map(|(col, name)| (name.clone(), table.cell(i, col).to_string()))
            .collect();

        source.push(SourceRecord {
            key: normalize_key(table.cell(i, key_col)),
            line: i + 2,
            fields,
        });
    }

    log::debug!(
        "source: {} records, {} blank keys, {} duplicates",
        source.len(),
        source.blank_keys,
        source.duplicates.len()
    );

    Ok(source)
}
