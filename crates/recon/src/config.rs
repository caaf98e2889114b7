use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::rules::normalize_key;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Column contract, business rules and remote target for one sync.
///
/// Every field has a default, so an empty TOML document is a valid config
/// describing the stock dashboard layout.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub source: SourceConfig,
    /// Ordered source → remote column pairs. Declaration order is the
    /// order cell updates are emitted in for each row.
    #[serde(default = "default_mappings", rename = "mapping")]
    pub mappings: Vec<FieldMapping>,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            mappings: default_mappings(),
            remote: RemoteConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Source side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Business-name column; its trimmed, upper-cased value is the join key.
    #[serde(default = "default_key_column")]
    pub key: String,
    /// Raw status column (e.g. ATIVO / INATIVO).
    #[serde(default = "default_source_status")]
    pub status: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            key: default_key_column(),
            status: default_source_status(),
        }
    }
}

fn default_key_column() -> String {
    "Nome fantasia".into()
}

fn default_source_status() -> String {
    "Ativa no painel".into()
}

// ---------------------------------------------------------------------------
// Field mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FieldMapping {
    pub source: String,
    pub remote: String,
}

impl FieldMapping {
    pub fn new(source: &str, remote: &str) -> Self {
        Self {
            source: source.into(),
            remote: remote.into(),
        }
    }
}

fn default_mappings() -> Vec<FieldMapping> {
    vec![
        FieldMapping::new("Nome fantasia", "Imobiliária"),
        FieldMapping::new("Corretores", "Quantidade de Corretores"),
        FieldMapping::new("Estado", "Estado"),
        FieldMapping::new("Cidade", "Cidade"),
    ]
}

// ---------------------------------------------------------------------------
// Remote side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    /// Remote column mirroring the raw source status.
    #[serde(default = "default_remote_status")]
    pub status: String,
    /// Remote column holding the derived contract state.
    #[serde(default = "default_remote_contract")]
    pub contract: String,
    /// Spreadsheet id of the dashboard (Sheets adapter only).
    #[serde(default)]
    pub spreadsheet_id: String,
    /// Worksheet tab holding the dashboard table.
    #[serde(default = "default_tab")]
    pub tab: String,
    #[serde(default)]
    pub value_input: ValueInput,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            status: default_remote_status(),
            contract: default_remote_contract(),
            spreadsheet_id: String::new(),
            tab: default_tab(),
            value_input: ValueInput::default(),
            api_base: default_api_base(),
        }
    }
}

fn default_remote_status() -> String {
    "Ativa em sistema".into()
}

fn default_remote_contract() -> String {
    "Contrato assinado".into()
}

fn default_tab() -> String {
    "BaseDeDados".into()
}

fn default_api_base() -> String {
    "https://sheets.googleapis.com".into()
}

/// How the remote store should interpret written values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueInput {
    /// Values are parsed as if typed by a user (numbers stay numbers).
    #[default]
    UserEntered,
    /// Values are stored verbatim as strings.
    Raw,
}

impl ValueInput {
    /// Wire name used by the Sheets API.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::UserEntered => "USER_ENTERED",
            Self::Raw => "RAW",
        }
    }
}

impl std::fmt::Display for ValueInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserEntered => write!(f, "user_entered"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

// ---------------------------------------------------------------------------
// Business rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RulesConfig {
    /// Status token classified as active (compared trimmed, upper-cased).
    #[serde(default = "default_active")]
    pub active: String,
    /// Status token classified as inactive.
    #[serde(default = "default_inactive")]
    pub inactive: String,
    #[serde(default = "default_contract_active")]
    pub contract_active: String,
    #[serde(default = "default_contract_inactive")]
    pub contract_inactive: String,
    #[serde(default = "default_contract_pending")]
    pub contract_pending: String,
    /// Only keys containing this token are inserted as new rows.
    #[serde(default = "default_scope_token")]
    pub scope_token: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            active: default_active(),
            inactive: default_inactive(),
            contract_active: default_contract_active(),
            contract_inactive: default_contract_inactive(),
            contract_pending: default_contract_pending(),
            scope_token: default_scope_token(),
        }
    }
}

fn default_active() -> String {
    "ATIVO".into()
}

fn default_inactive() -> String {
    "INATIVO".into()
}

fn default_contract_active() -> String {
    "Assinado".into()
}

fn default_contract_inactive() -> String {
    "Não Assinado".into()
}

fn default_contract_pending() -> String {
    "Pendente".into()
}

fn default_scope_token() -> String {
    "(CARUARU)".into()
}

// ---------------------------------------------------------------------------
// Parsing + validation
// ---------------------------------------------------------------------------

impl SyncConfig {
    pub fn from_toml(input: &str) -> Result<Self, SyncError> {
        let config: SyncConfig =
            toml::from_str(input).map_err(|e| SyncError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, SyncError> {
        toml::to_string_pretty(self).map_err(|e| SyncError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if self.source.key.trim().is_empty() {
            return Err(SyncError::ConfigValidation("source.key must not be empty".into()));
        }

        // The key column must be mapped: its remote column is the remote join key
        if self.key_mapping().is_none() {
            return Err(SyncError::ConfigValidation(format!(
                "no [[mapping]] has source = '{}' (the key column)",
                self.source.key
            )));
        }

        let mut sources = HashSet::new();
        let mut remotes = HashSet::new();
        for m in &self.mappings {
            if !sources.insert(m.source.as_str()) {
                return Err(SyncError::ConfigValidation(format!(
                    "source column '{}' is mapped twice",
                    m.source
                )));
            }
            if !remotes.insert(m.remote.as_str()) {
                return Err(SyncError::ConfigValidation(format!(
                    "remote column '{}' is mapped twice",
                    m.remote
                )));
            }
        }

        for derived in [&self.remote.status, &self.remote.contract] {
            if remotes.contains(derived.as_str()) {
                return Err(SyncError::ConfigValidation(format!(
                    "remote column '{derived}' is both mapped and derived"
                )));
            }
        }
        if self.remote.status == self.remote.contract {
            return Err(SyncError::ConfigValidation(
                "remote.status and remote.contract must be different columns".into(),
            ));
        }

        let active = self.rules.active.trim().to_uppercase();
        let inactive = self.rules.inactive.trim().to_uppercase();
        if active.is_empty() || inactive.is_empty() || active == inactive {
            return Err(SyncError::ConfigValidation(
                "rules.active and rules.inactive must be distinct, non-empty tokens".into(),
            ));
        }

        for (name, label) in [
            ("contract_active", &self.rules.contract_active),
            ("contract_inactive", &self.rules.contract_inactive),
            ("contract_pending", &self.rules.contract_pending),
        ] {
            if label.trim().is_empty() {
                return Err(SyncError::ConfigValidation(format!(
                    "rules.{name} must not be empty"
                )));
            }
        }

        // Matched after normalization; a blank token would put every key in scope
        if normalize_key(&self.rules.scope_token).is_empty() {
            return Err(SyncError::ConfigValidation(
                "rules.scope_token must not be blank".into(),
            ));
        }

        Ok(())
    }

    /// The mapping whose source is the key column.
    pub fn key_mapping(&self) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.source == self.source.key)
    }

    /// Mappings diffed cell by cell: every mapping except the key's.
    pub fn direct_mappings(&self) -> impl Iterator<Item = &FieldMapping> {
        self.mappings.iter().filter(move |m| m.source != self.source.key)
    }

    /// Columns read from the source file: key, mapped sources, status.
    pub fn source_columns(&self) -> Vec<String> {
        let mut columns = vec![self.source.key.clone()];
        for m in &self.mappings {
            if !columns.contains(&m.source) {
                columns.push(m.source.clone());
            }
        }
        if !columns.contains(&self.source.status) {
            columns.push(self.source.status.clone());
        }
        columns
    }

    /// Columns the remote header must carry: mapped targets, status, contract.
    pub fn remote_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self.mappings.iter().map(|m| m.remote.clone()).collect();
        columns.push(self.remote.status.clone());
        columns.push(self.remote.contract.clone());
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_stock_layout() {
        let config = SyncConfig::from_toml("").unwrap();
        assert_eq!(config.source.key, "Nome fantasia");
        assert_eq!(config.mappings.len(), 4);
        assert_eq!(config.key_mapping().unwrap().remote, "Imobiliária");
        assert_eq!(config.remote.tab, "BaseDeDados");
        assert_eq!(config.remote.value_input, ValueInput::UserEntered);
        assert_eq!(config.rules.scope_token, "(CARUARU)");
        assert_eq!(
            config.source_columns(),
            vec!["Nome fantasia", "Corretores", "Estado", "Cidade", "Ativa no painel"]
        );
        assert_eq!(
            config.remote_columns(),
            vec![
                "Imobiliária",
                "Quantidade de Corretores",
                "Estado",
                "Cidade",
                "Ativa em sistema",
                "Contrato assinado"
            ]
        );
    }

    #[test]
    fn parse_custom_mapping_keeps_order() {
        let toml = r#"
[source]
key = "Company Legal Name"
status = "Active"

[[mapping]]
source = "Company Legal Name"
remote = "Company"

[[mapping]]
source = "Headcount"
remote = "Employees"

[remote]
status = "Active in system"
contract = "Contract"
spreadsheet_id = "abc123"
value_input = "raw"

[rules]
active = "yes"
inactive = "no"
scope_token = "(EU)"
"#;
        let config = SyncConfig::from_toml(toml).unwrap();
        let direct: Vec<_> = config.direct_mappings().map(|m| m.remote.as_str()).collect();
        assert_eq!(direct, vec!["Employees"]);
        assert_eq!(config.remote.value_input, ValueInput::Raw);
        assert_eq!(config.remote.tab, "BaseDeDados");
        assert_eq!(config.rules.contract_pending, "Pendente");
        assert_eq!(config.source_columns(), vec!["Company Legal Name", "Headcount", "Active"]);
    }

    #[test]
    fn reject_unmapped_key() {
        let toml = r#"
[source]
key = "Name"

[[mapping]]
source = "Other"
remote = "Other"
"#;
        match SyncConfig::from_toml(toml) {
            Err(SyncError::ConfigValidation(msg)) => assert!(msg.contains("Name")),
            other => panic!("expected ConfigValidation, got {other:?}"),
        }
    }

    #[test]
    fn reject_derived_column_also_mapped() {
        let toml = r#"
[[mapping]]
source = "Nome fantasia"
remote = "Imobiliária"

[[mapping]]
source = "Ativa no painel"
remote = "Ativa em sistema"
"#;
        assert!(matches!(
            SyncConfig::from_toml(toml),
            Err(SyncError::ConfigValidation(_))
        ));
    }

    #[test]
    fn reject_same_active_and_inactive_token() {
        let toml = r#"
[rules]
active = "ativo"
inactive = " ATIVO "
"#;
        assert!(matches!(
            SyncConfig::from_toml(toml),
            Err(SyncError::ConfigValidation(_))
        ));
    }

    #[test]
    fn reject_blank_scope_token() {
        let toml = r#"
[rules]
scope_token = "   "
"#;
        assert!(matches!(
            SyncConfig::from_toml(toml),
            Err(SyncError::ConfigValidation(_))
        ));

        let mut config = SyncConfig::default();
        config.rules.scope_token = "\t".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_empty_contract_label() {
        let toml = r#"
[rules]
contract_pending = ""
"#;
        match SyncConfig::from_toml(toml) {
            Err(SyncError::ConfigValidation(msg)) => assert!(msg.contains("contract_pending")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn reject_bad_value_input() {
        let toml = r#"
[remote]
value_input = "formatted"
"#;
        assert!(matches!(SyncConfig::from_toml(toml), Err(SyncError::ConfigParse(_))));
    }

    #[test]
    fn toml_roundtrip_of_defaults() {
        let text = SyncConfig::default().to_toml().unwrap();
        let back = SyncConfig::from_toml(&text).unwrap();
        assert_eq!(back.mappings, SyncConfig::default().mappings);
    }
}
