//! Sheets v4 values client.
//!
//! Blocking reqwest client (no Tokio runtime required).

use std::time::Duration;

use dashsync_io::Table;
use dashsync_recon::config::{RemoteConfig, ValueInput};
use dashsync_recon::{CellUpdate, RemoteStore, RemoteTable, RowInsertion, StoreError};
use reqwest::Url;
use serde::Deserialize;

const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// One worksheet tab of one spreadsheet, addressed through the values API.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
    spreadsheet_id: String,
    tab: String,
    value_input: ValueInput,
}

/// Error type for Sheets operations.
#[derive(Debug)]
pub enum SheetsError {
    /// No token available
    NotAuthenticated,
    /// Token refused (401/403)
    Auth(String),
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// JSON parsing error
    Parse(String),
    /// File I/O error
    Io(String),
    /// Bad request or bad client configuration
    Validation(String),
}

impl std::fmt::Display for SheetsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetsError::NotAuthenticated => write!(
                f,
                "No access token: pass --access-token or set DASHSYNC_ACCESS_TOKEN"
            ),
            SheetsError::Auth(msg) => write!(f, "Access denied: {}", msg),
            SheetsError::Network(msg) => write!(f, "Network error: {}", msg),
            SheetsError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            SheetsError::Parse(msg) => write!(f, "Parse error: {}", msg),
            SheetsError::Io(msg) => write!(f, "I/O error: {}", msg),
            SheetsError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SheetsError {}

impl From<SheetsError> for StoreError {
    fn from(e: SheetsError) -> Self {
        match e {
            SheetsError::NotAuthenticated => StoreError::Auth(e.to_string()),
            SheetsError::Auth(msg) => StoreError::Auth(msg),
            SheetsError::Network(msg) => StoreError::Network(msg),
            SheetsError::Http(code, msg) => StoreError::Http(code, msg),
            SheetsError::Parse(msg) => StoreError::Parse(msg),
            SheetsError::Io(msg) => StoreError::Io(msg),
            SheetsError::Validation(msg) => StoreError::Rejected(msg),
        }
    }
}

/// `values.get` response body. `values` is absent for an empty sheet.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsClient {
    pub fn new(
        token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        tab: impl Into<String>,
    ) -> Result<Self, SheetsError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("dashsync/{}", env!("CARGO_PKG_VERSION")))
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| SheetsError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            spreadsheet_id: spreadsheet_id.into(),
            tab: tab.into(),
            value_input: ValueInput::default(),
        })
    }

    /// Client for the `[remote]` section of a sync config.
    pub fn from_config(remote: &RemoteConfig, token: impl Into<String>) -> Result<Self, SheetsError> {
        if remote.spreadsheet_id.trim().is_empty() {
            return Err(SheetsError::Validation(
                "no spreadsheet id configured: set remote.spreadsheet_id or DASHSYNC_SPREADSHEET_ID".into(),
            ));
        }
        Ok(Self::new(token, remote.spreadsheet_id.trim(), &remote.tab)?
            .with_base_url(&remote.api_base)
            .with_value_input(remote.value_input))
    }

    pub fn with_base_url(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_value_input(mut self, value_input: ValueInput) -> Self {
        self.value_input = value_input;
        self
    }

    /// Every populated row of the tab; the first is the header.
    pub fn get_values(&self) -> Result<Table, SheetsError> {
        let url = self.endpoint(&["values", &a1_range(&self.tab, None)])?;
        log::debug!("GET {url}");
        let resp = self.send(self.http.get(url))?;
        let body: ValueRange = resp.json().map_err(|e| SheetsError::Parse(e.to_string()))?;

        let mut rows = body
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
        let Some(header) = rows.next() else {
            return Ok(Table::default());
        };
        Ok(Table::new(header, rows.collect()))
    }

    /// Write every update in one `values:batchUpdate` call.
    pub fn batch_update(&self, updates: &[CellUpdate]) -> Result<(), SheetsError> {
        let url = self.endpoint(&["values:batchUpdate"])?;
        let data: Vec<serde_json::Value> = updates
            .iter()
            .map(|u| {
                serde_json::json!({
                    "range": a1_range(&self.tab, Some(&u.a1())),
                    "values": [[u.value]],
                })
            })
            .collect();
        let body = serde_json::json!({
            "valueInputOption": self.value_input.as_api_str(),
            "data": data,
        });

        log::debug!("POST {url} ({} cells)", updates.len());
        self.send(self.http.post(url).json(&body))?;
        Ok(())
    }

    /// Append rows after the table in one `values:append` call.
    pub fn append(&self, rows: &[RowInsertion]) -> Result<(), SheetsError> {
        let range = a1_range(&self.tab, Some("A1"));
        let url = self.endpoint(&["values", &format!("{range}:append")])?;
        let values: Vec<&[String]> = rows.iter().map(|r| r.values.as_slice()).collect();

        log::debug!("POST {url} ({} rows)", rows.len());
        self.send(
            self.http
                .post(url)
                .query(&[
                    ("valueInputOption", self.value_input.as_api_str()),
                    ("insertDataOption", "INSERT_ROWS"),
                ])
                .json(&serde_json::json!({ "values": values })),
        )?;
        Ok(())
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// `{api_base}/v4/spreadsheets/{id}/{tail...}`, each segment percent-encoded.
    fn endpoint(&self, tail: &[&str]) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| SheetsError::Validation(format!("invalid API base '{}': {e}", self.api_base)))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Validation(format!("invalid API base '{}'", self.api_base)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()])
            .extend(tail);
        Ok(url)
    }

    fn send(
        &self,
        req: reqwest::blocking::RequestBuilder,
    ) -> Result<reqwest::blocking::Response, SheetsError> {
        let response = req
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| SheetsError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            let message = error_message(&body);
            return Err(match status {
                401 | 403 => SheetsError::Auth(message),
                400 | 422 => SheetsError::Validation(message),
                _ => SheetsError::Http(status, message),
            });
        }

        Ok(response)
    }
}

impl RemoteStore for SheetsClient {
    fn describe(&self) -> String {
        format!("Google Sheets {} (tab '{}')", self.spreadsheet_id, self.tab)
    }

    fn read_all(&mut self) -> Result<RemoteTable, StoreError> {
        Ok(self.get_values()?)
    }

    fn batch_update_cells(&mut self, updates: &[CellUpdate]) -> Result<(), StoreError> {
        Ok(self.batch_update(updates)?)
    }

    fn append_rows(&mut self, rows: &[RowInsertion]) -> Result<(), StoreError> {
        Ok(self.append(rows)?)
    }
}

// ── Free functions ──────────────────────────────────────────────────

/// A1 range on a tab, e.g. `BaseDeDados!C5` or `'Base 2024'!C5`.
///
/// Tab names with anything beyond letters, digits and `_` are quoted, with
/// embedded quotes doubled.
pub fn a1_range(tab: &str, cell: Option<&str>) -> String {
    let plain = !tab.is_empty() && tab.chars().all(|c| c.is_alphanumeric() || c == '_');
    let sheet = if plain {
        tab.to_string()
    } else {
        format!("'{}'", tab.replace('\'', "''"))
    };
    match cell {
        Some(cell) => format!("{sheet}!{cell}"),
        None => sheet,
    }
}

/// Cells come back formatted as strings; anything else is rendered plainly.
fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        other => other.to_string(),
    }
}

/// `error.message` from a Google API error body, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}
