use std::fmt;

use serde::Serialize;

use crate::error::SyncError;

/// Ordered, human-readable record of every decision in a run.
///
/// Each line is also emitted through the `log` facade so a service log and
/// the returned audit trail tell the same story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AuditLog {
    lines: Vec<String>,
}

impl AuditLog {
    /// Last line of every run, successful or not.
    pub const DONE: &'static str = "Synchronization finished.";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::info!("{line}");
        self.lines.push(line);
    }

    /// Terminal error line.
    pub fn error(&mut self, err: &SyncError) {
        let line = format!("ERROR: {err}");
        log::error!("{line}");
        self.lines.push(line);
    }

    pub fn finish(&mut self) {
        self.push(Self::DONE);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// True if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_then_done() {
        let mut log = AuditLog::new();
        log.push("Starting synchronization...");
        log.error(&SyncError::RemoteUnavailable("timeout".into()));
        log.finish();

        assert_eq!(
            log.to_string(),
            "Starting synchronization...\nERROR: remote unavailable: timeout\nSynchronization finished."
        );
        assert!(log.contains("timeout"));
    }
}
