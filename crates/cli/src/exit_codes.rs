//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain   | Description                                 |
//! |---------|----------|---------------------------------------------|
//! | 0       | -        | Success                                     |
//! | 1       | -        | General error (unspecified)                 |
//! | 2       | -        | CLI usage error (bad args, missing file)    |
//! | 10-19   | config   | Config file and credentials                 |
//! | 20-29   | source   | Reading the local source of truth           |
//! | 30-39   | remote   | Reading or writing the dashboard            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `sync_exit_code` or the relevant command

use dashsync_recon::{SchemaSide, SyncError};

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Config (10-19)
// =============================================================================

/// Config file is not valid TOML or has wrongly typed fields.
pub const EXIT_CONFIG_PARSE: u8 = 10;

/// Config parsed but is inconsistent (no key mapping, clashing columns).
pub const EXIT_CONFIG_INVALID: u8 = 11;

/// No access token or no spreadsheet id for the Sheets target.
pub const EXIT_CONFIG_NOT_AUTH: u8 = 12;

// =============================================================================
// Source (20-29)
// =============================================================================

/// Source extension not recognized, or the file is not a readable table.
pub const EXIT_SOURCE_FORMAT: u8 = 20;

/// Source lacks an expected column.
pub const EXIT_SOURCE_SCHEMA: u8 = 21;

/// Source could not be read (missing file, permissions) or other failure.
pub const EXIT_SOURCE_READ: u8 = 22;

// =============================================================================
// Remote (30-39)
// =============================================================================

/// Dashboard could not be read (network, auth, missing file).
pub const EXIT_REMOTE_UNAVAILABLE: u8 = 30;

/// Dashboard is empty or lacks a required column.
pub const EXIT_REMOTE_SCHEMA: u8 = 31;

/// Dashboard rejected a write batch. Earlier batches may have landed.
pub const EXIT_REMOTE_WRITE: u8 = 32;

/// Map a sync error to its exit code.
pub fn sync_exit_code(err: &SyncError) -> u8 {
    match err {
        SyncError::ConfigParse(_) => EXIT_CONFIG_PARSE,
        SyncError::ConfigValidation(_) => EXIT_CONFIG_INVALID,
        SyncError::Format(_) => EXIT_SOURCE_FORMAT,
        SyncError::Schema { side: SchemaSide::Source, .. } => EXIT_SOURCE_SCHEMA,
        SyncError::Schema { side: SchemaSide::Remote, .. } => EXIT_REMOTE_SCHEMA,
        SyncError::Reconciliation(_) => EXIT_SOURCE_READ,
        SyncError::RemoteUnavailable(_) => EXIT_REMOTE_UNAVAILABLE,
        SyncError::RemoteSchema(_) => EXIT_REMOTE_SCHEMA,
        SyncError::RemoteWrite { .. } => EXIT_REMOTE_WRITE,
    }
}
