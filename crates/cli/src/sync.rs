//! `dashsync run` and `dashsync check`.

use std::path::{Path, PathBuf};

use clap::Args;
use dashsync_recon::remote::read_snapshot;
use dashsync_recon::{engine, RemoteStore, SyncConfig, SyncReport};
use dashsync_sheets_client::{resolve_token, SheetsClient, SheetsError};

use crate::exit_codes::{EXIT_CONFIG_INVALID, EXIT_CONFIG_NOT_AUTH, EXIT_ERROR, EXIT_USAGE};
use crate::local_store::LocalCsvStore;
use crate::CliError;

/// Where the dashboard lives and how the sync is configured.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Sync config (TOML). Built-in defaults apply when omitted.
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use a local CSV file as the dashboard instead of Google Sheets
    #[arg(long, value_name = "FILE")]
    pub dashboard_csv: Option<PathBuf>,

    /// Spreadsheet id (overrides remote.spreadsheet_id)
    #[arg(long, env = "DASHSYNC_SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Worksheet tab (overrides remote.tab)
    #[arg(long, env = "DASHSYNC_SHEET_TAB")]
    pub tab: Option<String>,

    /// OAuth bearer token for the Sheets API
    #[arg(long, env = "DASHSYNC_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Sheets API base URL (overrides remote.api_base)
    #[arg(long, env = "DASHSYNC_API_BASE", hide = true)]
    pub api_base: Option<String>,
}

pub fn cmd_run(
    source: PathBuf,
    target: TargetArgs,
    dry_run: bool,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(&target)?;
    let mut store = open_store(&target, &config)?;

    let report = if dry_run {
        engine::plan(&source, store.as_mut(), &config)
    } else {
        engine::run(&source, store.as_mut(), &config)
    };

    if json_output || output_file.is_some() {
        let json_str = report
            .to_json()
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = output_file {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::args(format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }

        if json_output {
            println!("{json_str}");
        }
    }

    if !json_output {
        println!("{}", report.log);
    }

    print_summary(&report);

    match report.error {
        Some(ref err) => Err(CliError::sync(err)),
        None => Ok(()),
    }
}

pub fn cmd_check(target: TargetArgs) -> Result<(), CliError> {
    let config = load_config(&target)?;
    let mut store = open_store(&target, &config)?;

    let name = store.describe();
    let snapshot = read_snapshot(store.as_mut(), &config).map_err(|e| CliError::sync(&e))?;

    println!(
        "ok: {name}: {} data row(s), {} column(s), all {} configured column(s) present",
        snapshot.table.len(),
        snapshot.width(),
        config.remote_columns().len()
    );
    Ok(())
}

/// Human summary to stderr.
fn print_summary(report: &SyncReport) {
    let Some(ref plan) = report.plan else {
        return;
    };
    let s = &plan.stats;
    if report.dry_run {
        eprintln!(
            "dry run: {} remote rows, {} matched, {} cell update(s) and {} new row(s) planned",
            s.remote_rows,
            s.matched_rows,
            plan.updates.len(),
            plan.insertions.len()
        );
    } else {
        eprintln!(
            "sync: {} remote rows, {} matched, {} cell(s) updated, {} row(s) appended, {} skipped out of scope",
            s.remote_rows,
            s.matched_rows,
            report.applied.updates_applied,
            report.applied.rows_appended,
            s.out_of_scope
        );
    }
}

/// Config file (or defaults) with command-line and environment overrides applied.
pub fn load_config(target: &TargetArgs) -> Result<SyncConfig, CliError> {
    let mut config = match target.config {
        Some(ref path) => read_config_file(path)?,
        None => SyncConfig::default(),
    };

    if let Some(ref id) = target.spreadsheet_id {
        config.remote.spreadsheet_id = id.clone();
    }
    if let Some(ref tab) = target.tab {
        config.remote.tab = tab.clone();
    }
    if let Some(ref base) = target.api_base {
        config.remote.api_base = base.clone();
    }

    config.validate().map_err(|e| CliError::sync(&e))?;
    Ok(config)
}

pub fn read_config_file(path: &Path) -> Result<SyncConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_USAGE, format!("cannot read config {}: {e}", path.display()))
    })?;
    SyncConfig::from_toml(&text).map_err(|e| CliError::sync(&e))
}

fn open_store(target: &TargetArgs, config: &SyncConfig) -> Result<Box<dyn RemoteStore>, CliError> {
    if let Some(ref path) = target.dashboard_csv {
        return Ok(Box::new(LocalCsvStore::new(path)));
    }

    let token = resolve_token(target.access_token.clone()).map_err(|e| {
        CliError::new(EXIT_CONFIG_NOT_AUTH, e.to_string())
            .with_hint("or save {\"token\": \"...\"} to ~/.config/dashsync/auth.json")
    })?;

    let client = SheetsClient::from_config(&config.remote, token).map_err(|e| match e {
        SheetsError::Validation(msg) => CliError::new(EXIT_CONFIG_INVALID, msg)
            .with_hint("or pass --dashboard-csv to sync into a local file"),
        other => CliError::new(EXIT_ERROR, other.to_string()),
    })?;
    Ok(Box::new(client))
}
