//! Writing a plan to the remote store: updates first, then new rows.

use serde::Serialize;

use crate::audit::AuditLog;
use crate::error::{FailedBatch, SyncError};
use crate::model::SyncPlan;
use crate::remote::RemoteStore;

/// What actually reached the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub updates_applied: usize,
    pub rows_appended: usize,
}

/// Send the plan's two batches, one store call each.
///
/// Empty batches make no call. A rejected batch stops the run: if the
/// update batch fails, the insertions are never sent. `outcome` is filled
/// in as batches succeed, so it is accurate even when this returns `Err`.
pub fn apply(
    store: &mut dyn RemoteStore,
    plan: &SyncPlan,
    log: &mut AuditLog,
    outcome: &mut ApplyOutcome,
) -> Result<(), SyncError> {
    if plan.updates.is_empty() {
        log.push("No updates needed: every matched row is already in sync.");
    } else {
        log.push(format!("Sending {} cell update(s)...", plan.updates.len()));
        store
            .batch_update_cells(&plan.updates)
            .map_err(|e| SyncError::RemoteWrite {
                batch: FailedBatch::Updates(plan.updates.clone()),
                message: e.to_string(),
            })?;
        outcome.updates_applied = plan.updates.len();
        log.push("Cells updated.");
    }

    if plan.insertions.is_empty() {
        log.push("No new records to add.");
    } else {
        log.push(format!("Appending {} new row(s)...", plan.insertions.len()));
        store
            .append_rows(&plan.insertions)
            .map_err(|e| SyncError::RemoteWrite {
                batch: FailedBatch::Insertions(plan.insertions.clone()),
                message: e.to_string(),
            })?;
        outcome.rows_appended = plan.insertions.len();
        log.push("New rows appended.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::model::{CellUpdate, RowInsertion};
    use dashsync_io::Table;

    fn store() -> MemoryStore {
        MemoryStore::new(Table::new(
            vec!["Imobiliária".into(), "Cidade".into()],
            vec![vec!["ACME".into(), "Recife".into()]],
        ))
    }

    #[test]
    fn empty_plan_makes_no_calls() {
        let mut store = store();
        let mut log = AuditLog::new();
        let mut outcome = ApplyOutcome::default();

        apply(&mut store, &SyncPlan::default(), &mut log, &mut outcome).unwrap();
        assert_eq!(store.update_calls, 0);
        assert_eq!(store.append_calls, 0);
        assert!(log.contains("No new records to add."));
    }

    #[test]
    fn update_failure_skips_insertions() {
        let mut store = store();
        store.fail_updates = Some("permission denied".into());
        let plan = SyncPlan {
            updates: vec![CellUpdate::new(2, 2, "Olinda")],
            insertions: vec![RowInsertion { values: vec!["BETA".into(), "".into()] }],
            ..Default::default()
        };
        let mut log = AuditLog::new();
        let mut outcome = ApplyOutcome::default();

        let err = apply(&mut store, &plan, &mut log, &mut outcome).unwrap_err();
        match err {
            SyncError::RemoteWrite { batch: FailedBatch::Updates(u), message } => {
                assert_eq!(u, plan.updates);
                assert_eq!(message, "permission denied");
            }
            other => panic!("expected update batch failure, got {other:?}"),
        }
        assert_eq!(store.append_calls, 0);
        assert_eq!(outcome, ApplyOutcome::default());
    }

    #[test]
    fn both_batches_applied() {
        let mut store = store();
        let plan = SyncPlan {
            updates: vec![CellUpdate::new(2, 2, "Olinda")],
            insertions: vec![RowInsertion { values: vec!["BETA".into(), "Caruaru".into()] }],
            ..Default::default()
        };
        let mut log = AuditLog::new();
        let mut outcome = ApplyOutcome::default();

        apply(&mut store, &plan, &mut log, &mut outcome).unwrap();
        assert_eq!(store.cell(2, 1), "Olinda");
        assert_eq!(store.cell(3, 0), "BETA");
        assert_eq!(outcome, ApplyOutcome { updates_applied: 1, rows_appended: 1 });
    }
}
