//! `dashsync config`: validate and print sync configs.

use std::path::PathBuf;

use clap::Subcommand;
use dashsync_recon::SyncConfig;

use crate::exit_codes::EXIT_ERROR;
use crate::sync::read_config_file;
use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Parse and validate a config file without touching any data
    #[command(after_help = "\
Examples:
  dashsync config validate sync.toml")]
    Validate {
        /// Path to the sync TOML file
        file: PathBuf,
    },

    /// Print the effective config (built-in defaults when FILE is omitted)
    #[command(after_help = "\
Examples:
  dashsync config show
  dashsync config show sync.toml --json")]
    Show {
        /// Path to the sync TOML file
        file: Option<PathBuf>,

        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_config(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Validate { file } => cmd_config_validate(file),
        ConfigCommands::Show { file, json } => cmd_config_show(file, json),
    }
}

fn cmd_config_validate(file: PathBuf) -> Result<(), CliError> {
    let config = read_config_file(&file)?;
    println!(
        "ok: {}: key '{}', {} mapping(s), {} remote column(s) required",
        file.display(),
        config.source.key,
        config.mappings.len(),
        config.remote_columns().len()
    );
    Ok(())
}

fn cmd_config_show(file: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let config = match file {
        Some(ref path) => read_config_file(path)?,
        None => SyncConfig::default(),
    };

    let text = if json {
        serde_json::to_string_pretty(&config)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?
    } else {
        config.to_toml().map_err(|e| CliError::sync(&e))?
    };
    println!("{}", text.trim_end());
    Ok(())
}
