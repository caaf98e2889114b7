//! Business rules: key normalization, status classification, contract
//! derivation and the insertion scope filter.

use crate::config::RulesConfig;

/// Join key for a business name: surrounding whitespace removed, upper-cased.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Three-way classification of a raw status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Active,
    Inactive,
    Other,
}

/// Classify a status string against the configured tokens.
/// Comparison ignores surrounding whitespace and case.
pub fn classify_status(raw: &str, rules: &RulesConfig) -> StatusClass {
    let status = raw.trim().to_uppercase();
    if status == rules.inactive.trim().to_uppercase() {
        StatusClass::Inactive
    } else if status == rules.active.trim().to_uppercase() {
        StatusClass::Active
    } else {
        StatusClass::Other
    }
}

/// Contract value implied by a status class.
pub fn contract_label(class: StatusClass, rules: &RulesConfig) -> &str {
    match class {
        StatusClass::Inactive => &rules.contract_inactive,
        StatusClass::Active => &rules.contract_active,
        StatusClass::Other => &rules.contract_pending,
    }
}

/// Audit note naming the rule that produced a contract value.
pub fn rule_note(class: StatusClass, raw_status: &str, rules: &RulesConfig) -> String {
    match class {
        StatusClass::Inactive => format!("status {}", rules.inactive),
        StatusClass::Active => format!("status {}", rules.active),
        StatusClass::Other => format!(
            "status '{}' is neither {} nor {}",
            raw_status, rules.active, rules.inactive
        ),
    }
}

/// Whether a source key may be inserted as a new remote row.
///
/// Scope is a plain substring test on the normalized key; records outside
/// it are only ever updated, never added.
pub fn in_scope(key: &str, rules: &RulesConfig) -> bool {
    key.contains(normalize_key(&rules.scope_token).as_str())
}
