//! Token storage.
//!
//! Reads ~/.config/dashsync/auth.json when no token is given on the
//! command line or in `DASHSYNC_ACCESS_TOKEN`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::client::SheetsError;

/// Credentials stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCredentials {
    /// OAuth bearer token with the spreadsheets scope
    pub token: String,
}

/// Returns the path to the auth credentials file.
pub fn auth_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("dashsync/auth.json"))
}

/// Load saved credentials. `None` if nothing is saved or the file is invalid.
pub fn load_auth() -> Option<AuthCredentials> {
    let path = auth_file_path()?;
    match load_auth_from(&path) {
        Ok(creds) => Some(creds),
        Err(e) => {
            log::debug!("no usable credentials at {}: {e}", path.display());
            None
        }
    }
}

pub fn load_auth_from(path: &Path) -> Result<AuthCredentials, SheetsError> {
    let contents = std::fs::read_to_string(path).map_err(|e| SheetsError::Io(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| SheetsError::Parse(e.to_string()))
}

/// Pick the bearer token: explicit value first, then the saved file.
pub fn resolve_token(explicit: Option<String>) -> Result<String, SheetsError> {
    if let Some(token) = explicit.filter(|t| !t.trim().is_empty()) {
        return Ok(token);
    }
    load_auth()
        .map(|c| c.token)
        .filter(|t| !t.trim().is_empty())
        .ok_or(SheetsError::NotAuthenticated)
}
