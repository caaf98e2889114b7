//! Google Sheets adapter for the dashsync remote store.
//!
//! Speaks the Sheets v4 values API: one GET for the snapshot, one
//! `values:batchUpdate` for cell updates, one `values:append` for new rows.
//!
//! No retries. No OAuth flow: callers hand in a bearer token.

mod auth;
mod client;

pub use auth::{auth_file_path, load_auth, load_auth_from, resolve_token, AuthCredentials};
pub use client::{a1_range, SheetsClient, SheetsError};
