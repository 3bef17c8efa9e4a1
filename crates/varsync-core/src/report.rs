//! Run report
//!
//! Append-only record of every action attempted during a run. Tenant
//! workers append concurrently; the report is read once, after the pool has
//! drained, and flushed to CSV.

use crate::error::ReportError;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Terminal status of one action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Applied
    Success,
    /// Nothing to do
    Skipped,
    /// Rejected or failed
    Error,
}

impl Status {
    /// Report label
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Skipped => "skipped",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of action attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Create the set
    CreateSet,
    /// Add one entry
    AddEntry,
    /// Update one entry
    UpdateEntry,
    /// Delete one entry
    DeleteEntry,
    /// Reconcile the set as a whole
    UpdateSet,
    /// Delete the set
    DeleteSet,
}

impl ActionKind {
    /// Report label
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateSet => "create_set",
            Self::AddEntry => "add_entry",
            Self::UpdateEntry => "update_entry",
            Self::DeleteEntry => "delete_entry",
            Self::UpdateSet => "update_set",
            Self::DeleteSet => "delete_set",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    /// Tenant the action ran against
    pub tenant: String,
    /// Action kind
    pub action: ActionKind,
    /// Set id, when known
    pub set_id: Option<String>,
    /// Entry key, for entry-level actions
    pub entry_key: Option<String>,
    /// Outcome
    pub status: Status,
    /// Human-readable detail
    pub message: String,
}

impl ReportRecord {
    /// Create record
    #[must_use]
    pub fn new(
        tenant: impl Into<String>,
        action: ActionKind,
        status: Status,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            action,
            set_id: None,
            entry_key: None,
            status,
            message: message.into(),
        }
    }

    /// With set id
    #[inline]
    #[must_use]
    pub fn with_set(mut self, set_id: impl Into<String>) -> Self {
        self.set_id = Some(set_id.into());
        self
    }

    /// With entry key
    #[inline]
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>) -> Self {
        self.entry_key = Some(key.into());
        self
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    tenant: &'a str,
    action: &'static str,
    #[serde(rename = "configuration-set id")]
    set_id: &'a str,
    entry: &'a str,
    status: Status,
    message: &'a str,
}

impl<'a> From<&'a ReportRecord> for CsvRow<'a> {
    fn from(record: &'a ReportRecord) -> Self {
        Self {
            tenant: &record.tenant,
            action: record.action.as_str(),
            set_id: record.set_id.as_deref().unwrap_or_default(),
            entry: record.entry_key.as_deref().unwrap_or_default(),
            status: record.status,
            message: &record.message,
        }
    }
}

/// Row counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    /// Rows with `success`
    pub success: usize,
    /// Rows with `skipped`
    pub skipped: usize,
    /// Rows with `error`
    pub error: usize,
}

impl ReportSummary {
    /// Rows that are not `success`
    #[inline]
    #[must_use]
    pub fn not_successful(&self) -> usize {
        self.skipped + self.error
    }

    /// All rows
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.success + self.skipped + self.error
    }
}

/// Thread-safe, append-only collection of report rows
#[derive(Debug, Default)]
pub struct RunReport {
    records: Mutex<Vec<ReportRecord>>,
}

impl RunReport {
    /// Create empty report
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row
    pub fn record(&self, record: ReportRecord) {
        self.records.lock().push(record);
    }

    /// Copy of every row in insertion order
    #[must_use]
    pub fn records(&self) -> Vec<ReportRecord> {
        self.records.lock().clone()
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// No rows recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Counts by status
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        self.records
            .lock()
            .iter()
            .fold(ReportSummary::default(), |mut acc, record| {
                match record.status {
                    Status::Success => acc.success += 1,
                    Status::Skipped => acc.skipped += 1,
                    Status::Error => acc.error += 1,
                }
                acc
            })
    }

    /// Default file name for a report written now
    #[must_use]
    pub fn timestamped_file_name() -> String {
        format!(
            "varset_report_{}.csv",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        )
    }

    /// Write a timestamped CSV into `dir`
    ///
    /// Returns the path written, or `None` when there is nothing to write.
    ///
    /// # Errors
    /// `ReportError` if the file cannot be created or encoded
    pub fn flush(&self, dir: impl AsRef<Path>) -> Result<Option<PathBuf>, ReportError> {
        if self.is_empty() {
            return Ok(None);
        }
        let path = dir.as_ref().join(Self::timestamped_file_name());
        self.flush_to(&path)?;
        Ok(Some(path))
    }

    /// Write every row as CSV to `path`
    ///
    /// # Errors
    /// `ReportError` if the file cannot be created or encoded
    pub fn flush_to(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let records = self.records.lock();
        let mut writer = csv::Writer::from_path(path)?;
        for record in records.iter() {
            writer.serialize(CsvRow::from(record))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn summary_counts_by_status() {
        let report = RunReport::new();
        report.record(ReportRecord::new("acme", ActionKind::CreateSet, Status::Success, "created"));
        report.record(ReportRecord::new("acme", ActionKind::AddEntry, Status::Error, "422"));
        report.record(ReportRecord::new(
            "globex",
            ActionKind::CreateSet,
            Status::Skipped,
            "exists",
        ));

        let summary = report.summary();
        assert_eq!(summary.success, 1);
        assert_eq!(summary.not_successful(), 2);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn flush_writes_fixed_columns_in_insertion_order() {
        let report = RunReport::new();
        report.record(
            ReportRecord::new("acme", ActionKind::DeleteEntry, Status::Success, "removed b")
                .with_set("varset-1")
                .with_entry("b"),
        );
        report.record(ReportRecord::new(
            "globex",
            ActionKind::UpdateSet,
            Status::Error,
            "no set, found",
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        report.flush_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "tenant,action,configuration-set id,entry,status,message");
        assert_eq!(lines[1], "acme,delete_entry,varset-1,b,success,removed b");
        assert_eq!(lines[2], "globex,update_set,,,error,\"no set, found\"");
    }

    #[test]
    fn flush_skips_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(RunReport::new().flush(dir.path()).unwrap(), None);
    }

    #[test]
    fn flush_names_file_with_timestamp() {
        let report = RunReport::new();
        report.record(ReportRecord::new("acme", ActionKind::CreateSet, Status::Success, "ok"));

        let dir = tempfile::tempdir().unwrap();
        let path = report.flush(dir.path()).unwrap().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();

        assert!(name.starts_with("varset_report_"));
        assert!(name.ends_with(".csv"));
        assert!(path.exists());
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        let report = Arc::new(RunReport::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let report = Arc::clone(&report);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        report.record(ReportRecord::new(
                            format!("tenant-{t}"),
                            ActionKind::AddEntry,
                            Status::Success,
                            format!("entry {i}"),
                        ));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(report.len(), 400);
    }
}
