//! Report records and the sinks that receive them.
//!
//! The core never calls `tracing` directly. Every line a run produces goes
//! through a [`ReportSink`], so the binary can forward to the subscriber while
//! tests capture the exact sequence with [`MemorySink`].

use std::fmt;
use tracing::{error, info};

/// Severity of a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Progress, counts and passed checks.
    Info,
    /// Failed checks and aborted runs.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// One structured log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    /// Line severity.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

/// Destination for report records.
pub trait ReportSink {
    /// Accept one record.
    fn record(&mut self, record: ReportRecord);

    /// Shorthand for an info record.
    fn info(&mut self, message: String) {
        self.record(ReportRecord {
            severity: Severity::Info,
            message,
        });
    }

    /// Shorthand for an error record.
    fn error(&mut self, message: String) {
        self.record(ReportRecord {
            severity: Severity::Error,
            message,
        });
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn record(&mut self, record: ReportRecord) {
        (**self).record(record);
    }
}

/// Forwards records to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn record(&mut self, record: ReportRecord) {
        match record.severity {
            Severity::Info => info!(target: "pwm_verify::report", "{}", record.message),
            Severity::Error => error!(target: "pwm_verify::report", "{}", record.message),
        }
    }
}

/// Keeps every record in order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Vec<ReportRecord>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records received so far.
    pub fn records(&self) -> &[ReportRecord] {
        &self.records
    }

    /// Messages only, in order.
    pub fn messages(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.message.as_str()).collect()
    }

    /// Number of records with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.records
            .iter()
            .filter(|r| r.severity == severity)
            .count()
    }

    /// `true` if some record contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records.iter().any(|r| r.message.contains(needle))
    }
}

impl ReportSink for MemorySink {
    fn record(&mut self, record: ReportRecord) {
        self.records.push(record);
    }
}
