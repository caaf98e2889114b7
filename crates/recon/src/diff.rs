//! The diff: matched remote rows become cell updates, unmatched in-scope
//! source records become new rows.

use std::collections::HashSet;

use crate::audit::AuditLog;
use crate::config::{FieldMapping, SyncConfig};
use crate::error::{SchemaSide, SyncError};
use crate::model::{CellUpdate, RemoteSnapshot, RowInsertion, SourceTable, SyncPlan};
use crate::rules::{classify_status, contract_label, in_scope, normalize_key, rule_note};

/// Resolved remote positions for every configured column.
struct Layout<'a> {
    key: usize,
    status: usize,
    contract: usize,
    /// Non-key mappings, diffed cell by cell.
    direct: Vec<(&'a FieldMapping, usize)>,
    /// Every mapping, placed into new rows.
    all: Vec<(&'a FieldMapping, usize)>,
}

impl<'a> Layout<'a> {
    fn resolve(config: &'a SyncConfig, remote: &RemoteSnapshot) -> Result<Self, SyncError> {
        let cols = &remote.columns;
        let key_mapping = config.key_mapping().ok_or_else(|| SyncError::Schema {
            side: SchemaSide::Source,
            column: config.source.key.clone(),
        })?;

        let mut direct = Vec::new();
        let mut all = Vec::new();
        for m in &config.mappings {
            let idx = cols.require(&m.remote)?;
            all.push((m, idx));
            if m.source != config.source.key {
                direct.push((m, idx));
            }
        }

        Ok(Self {
            key: cols.require(&key_mapping.remote)?,
            status: cols.require(&config.remote.status)?,
            contract: cols.require(&config.remote.contract)?,
            direct,
            all,
        })
    }
}

/// Compute the update and insertion batches.
///
/// Pure: reads both sides, writes only to `log`. Update order is remote row
/// ascending, then mapping declaration order, then status, then contract.
/// Insertion order is source order.
pub fn diff(
    source: &SourceTable,
    remote: &RemoteSnapshot,
    config: &SyncConfig,
    log: &mut AuditLog,
) -> Result<SyncPlan, SyncError> {
    let layout = Layout::resolve(config, remote)?;
    let rules = &config.rules;
    let mut plan = SyncPlan::default();
    let mut remote_keys: HashSet<String> = HashSet::new();

    // Pass 1: update existing rows
    log.push("Pass 1: checking existing rows for updates...");
    for row in remote.rows() {
        plan.stats.remote_rows += 1;

        let name = row.cell(layout.key);
        let key = normalize_key(name);
        if key.is_empty() {
            continue;
        }
        remote_keys.insert(key.clone());

        let Some(record) = source.get(&key) else {
            plan.stats.unmatched_rows += 1;
            continue;
        };
        plan.stats.matched_rows += 1;
        let before = plan.updates.len();

        for (m, col) in &layout.direct {
            let new = record.get(&m.source);
            let old = row.cell(*col);
            if new != old {
                log.push(format!(
                    "  [UPDATE] '{name}': column '{}' from '{old}' to '{new}'.",
                    m.remote
                ));
                plan.updates.push(CellUpdate::new(row.number, col + 1, new));
            }
        }

        let status = record.get(&config.source.status);
        let old_status = row.cell(layout.status);
        if status != old_status {
            log.push(format!(
                "  [UPDATE] '{name}': column '{}' from '{old_status}' to '{status}'.",
                config.remote.status
            ));
            plan.updates
                .push(CellUpdate::new(row.number, layout.status + 1, status));
        }

        // Contract follows the source status, not the remote one
        let class = classify_status(status, rules);
        let contract = contract_label(class, rules);
        let old_contract = row.cell(layout.contract);
        if contract != old_contract {
            log.push(format!(
                "  [UPDATE] '{name}': column '{}' from '{old_contract}' to '{contract}' ({}).",
                config.remote.contract,
                rule_note(class, status, rules)
            ));
            plan.updates
                .push(CellUpdate::new(row.number, layout.contract + 1, contract));
        }

        if plan.updates.len() == before {
            plan.stats.in_sync_rows += 1;
            log.push(format!("  [IN SYNC] '{name}' (row {}).", row.number));
        }
    }
    log.push(format!(
        "Pass 1 complete: {} of {} remote rows matched, {} cell update(s) pending.",
        plan.stats.matched_rows,
        plan.stats.remote_rows,
        plan.updates.len()
    ));

    // Pass 2: discover new rows
    log.push("Pass 2: looking for new records...");
    for record in source.records() {
        if remote_keys.contains(&record.key) {
            continue;
        }
        let name = record.get(&config.source.key);
        if !in_scope(&record.key, rules) {
            plan.stats.out_of_scope += 1;
            log.push(format!(
                "  [SKIP] '{name}' is not on the remote and is outside scope '{}'.",
                rules.scope_token
            ));
            continue;
        }

        let status = record.get(&config.source.status);
        log.push(format!("  [NEW] Record to add: {name} (status: {status})"));

        let mut values = vec![String::new(); remote.width()];
        for (m, col) in &layout.all {
            values[*col] = record.get(&m.source).to_string();
        }
        values[layout.status] = status.to_string();
        values[layout.contract] = contract_label(classify_status(status, rules), rules).to_string();

        plan.insertions.push(RowInsertion { values });
    }
    plan.stats.new_records = plan.insertions.len();
    log.push(format!(
        "Pass 2 complete: {} new record(s) pending.",
        plan.insertions.len()
    ));

    Ok(plan)
}
