use std::path::Path;

use serde::Serialize;

use crate::apply::{apply, ApplyOutcome};
use crate::audit::AuditLog;
use crate::config::SyncConfig;
use crate::diff::diff;
use crate::error::SyncError;
use crate::loader::load_source;
use crate::model::{DroppedDuplicate, SourceTable, SyncPlan};
use crate::remote::{read_snapshot, RemoteStore};

/// Everything a run produced. The audit log is always present and always
/// ends with [`AuditLog::DONE`].
#[derive(Debug)]
pub struct SyncReport {
    pub log: AuditLog,
    /// Present once the diff has run, even if applying it later failed.
    pub plan: Option<SyncPlan>,
    pub applied: ApplyOutcome,
    pub duplicates: Vec<DroppedDuplicate>,
    pub error: Option<SyncError>,
    pub dry_run: bool,
    pub started_at: String,
}

impl SyncReport {
    fn new(dry_run: bool) -> Self {
        Self {
            log: AuditLog::new(),
            plan: None,
            applied: ApplyOutcome::default(),
            duplicates: Vec::new(),
            error: None,
            dry_run,
            started_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The log on success; the log and the cause on failure.
    pub fn into_result(self) -> Result<AuditLog, (AuditLog, SyncError)> {
        match self.error {
            None => Ok(self.log),
            Some(err) => Err((self.log, err)),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let error = self.error.as_ref().map(|e| ReportError {
            kind: e.kind(),
            message: e.to_string(),
        });
        serde_json::to_string_pretty(&ReportJson {
            engine_version: env!("CARGO_PKG_VERSION"),
            started_at: &self.started_at,
            dry_run: self.dry_run,
            success: self.is_success(),
            error,
            plan: self.plan.as_ref(),
            applied: &self.applied,
            duplicates: &self.duplicates,
            log: &self.log,
        })
    }
}

#[derive(Serialize)]
struct ReportJson<'a> {
    engine_version: &'static str,
    started_at: &'a str,
    dry_run: bool,
    success: bool,
    error: Option<ReportError>,
    plan: Option<&'a SyncPlan>,
    applied: &'a ApplyOutcome,
    duplicates: &'a [DroppedDuplicate],
    log: &'a AuditLog,
}

#[derive(Serialize)]
struct ReportError {
    kind: &'static str,
    message: String,
}

/// Load, read, diff and apply. Never panics; the report always carries the log.
pub fn run(source: &Path, store: &mut dyn RemoteStore, config: &SyncConfig) -> SyncReport {
    execute(source, store, config, false)
}

/// Same stages as [`run`] without the writes.
pub fn plan(source: &Path, store: &mut dyn RemoteStore, config: &SyncConfig) -> SyncReport {
    execute(source, store, config, true)
}

fn execute(
    source: &Path,
    store: &mut dyn RemoteStore,
    config: &SyncConfig,
    dry_run: bool,
) -> SyncReport {
    let mut report = SyncReport::new(dry_run);
    if let Err(err) = stages(source, store, config, &mut report) {
        report.log.error(&err);
        report.error = Some(err);
    }
    report.log.finish();
    report
}

fn stages(
    source: &Path,
    store: &mut dyn RemoteStore,
    config: &SyncConfig,
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    report.log.push("Starting synchronization...");
    config.validate()?;

    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string());
    report.log.push(format!("Reading data from: {file_name}"));
    let source_table = load_source(source, config)?;
    log_load_summary(&source_table, config, &mut report.log);
    report.duplicates = source_table.duplicates.clone();

    report.log.push(format!("Connecting to {}...", store.describe()));
    let snapshot = read_snapshot(store, config)?;
    report.log.push(format!(
        "Connected: {} data row(s), {} column(s).",
        snapshot.table.len(),
        snapshot.width()
    ));

    let plan = report
        .plan
        .insert(diff(&source_table, &snapshot, config, &mut report.log)?);

    if report.dry_run {
        report.log.push(format!(
            "Dry run: {} cell update(s) and {} new row(s) planned, nothing written.",
            plan.updates.len(),
            plan.insertions.len()
        ));
        return Ok(());
    }

    apply(store, plan, &mut report.log, &mut report.applied)
}

fn log_load_summary(source: &SourceTable, config: &SyncConfig, log: &mut AuditLog) {
    log.push(format!("Loaded {} record(s) from the source.", source.len()));
    if source.blank_keys > 0 {
        log.push(format!(
            "  Ignored {} row(s) with an empty '{}'.",
            source.blank_keys, config.source.key
        ));
    }
    for dup in &source.duplicates {
        log.push(format!(
            "  [DUPLICATE] '{}' on line {} ignored, keeping line {}.",
            dup.key, dup.line, dup.kept_line
        ));
    }
}
