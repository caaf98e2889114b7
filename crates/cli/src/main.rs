// dashsync CLI - push a local source of truth into a dashboard sheet

mod config_cmd;
mod exit_codes;
mod local_store;
mod sync;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use dashsync_recon::{SchemaSide, SyncError};

use config_cmd::ConfigCommands;
use exit_codes::{sync_exit_code, EXIT_SUCCESS, EXIT_USAGE};
use sync::TargetArgs;

#[derive(Parser)]
#[command(name = "dashsync")]
#[command(about = "Reconcile a local spreadsheet into a remote dashboard and print an audit log")]
#[command(version)]
struct Cli {
    /// Log to stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync a source file (.csv, .xlsx, .xls) into the dashboard
    #[command(after_help = "\
Examples:
  dashsync run base.csv --spreadsheet-id 1AbC... --access-token $TOKEN
  dashsync run base.xlsx --config sync.toml --dry-run
  dashsync run base.csv --dashboard-csv dashboard.csv --json
  dashsync run base.csv --config sync.toml --output report.json")]
    Run {
        /// Source of truth
        source: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Compute and log the changes without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Print the JSON report to stdout instead of the audit log
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Read the dashboard and verify it has every configured column
    #[command(after_help = "\
Examples:
  dashsync check --config sync.toml
  dashsync check --dashboard-csv dashboard.csv")]
    Check {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Inspect sync config files
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { source, target, dry_run, json, output } => {
            sync::cmd_run(source, target, dry_run, json, output)
        }
        Commands::Check { target } => sync::cmd_check(target),
        Commands::Config(cmd) => config_cmd::cmd_config(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Error from a sync stage, with the registry's exit code.
    pub fn sync(err: &SyncError) -> Self {
        let hint = match err {
            SyncError::Schema { side: SchemaSide::Source, .. } => {
                Some("check the source header, or the [source]/[[mapping]] columns in the config".to_string())
            }
            SyncError::Schema { side: SchemaSide::Remote, .. } | SyncError::RemoteSchema(_) => {
                Some("run `dashsync check` to compare the dashboard header with the config".to_string())
            }
            SyncError::RemoteWrite { .. } => {
                Some("earlier batches may have been applied; re-running is safe".to_string())
            }
            _ => None,
        };
        Self { code: sync_exit_code(err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exit_codes::{EXIT_REMOTE_SCHEMA, EXIT_SOURCE_SCHEMA};

    #[test]
    fn remote_column_missing_in_diff_points_at_the_dashboard() {
        let err = CliError::sync(&SyncError::Schema {
            side: SchemaSide::Remote,
            column: "Estado".into(),
        });
        assert_eq!(err.code, EXIT_REMOTE_SCHEMA);
        assert!(err.message.contains("remote column 'Estado'"));
        assert!(err.hint.unwrap().contains("dashsync check"));
    }

    #[test]
    fn source_column_missing_points_at_the_source() {
        let err = CliError::sync(&SyncError::Schema {
            side: SchemaSide::Source,
            column: "Cidade".into(),
        });
        assert_eq!(err.code, EXIT_SOURCE_SCHEMA);
        assert!(err.hint.unwrap().contains("source header"));
    }
}
