// File: src/services/diagnostics.rs

use std::sync::Mutex;
use tracing::{error, warn};

use tripbot_common::traits::Diagnostics;
use crate::Error;

/// Production sink: everything goes to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn remote_failure(&self, operation: &str, err: &Error) {
        error!("{} failed: {}", operation, err);
    }

    fn degraded(&self, operation: &str, detail: &str) {
        warn!("{}: {}", operation, detail);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticRecord {
    RemoteFailure { operation: String, error: String },
    Degraded { operation: String, detail: String },
}

impl DiagnosticRecord {
    pub fn operation(&self) -> &str {
        match self {
            DiagnosticRecord::RemoteFailure { operation, .. }
            | DiagnosticRecord::Degraded { operation, .. } => operation,
        }
    }
}

/// Keeps every report in memory so tests can assert on them.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn failures_for(&self, operation: &str) -> usize {
        self.records()
            .iter()
            .filter(|r| matches!(r, DiagnosticRecord::RemoteFailure { .. }) && r.operation() == operation)
            .count()
    }

    fn push(&self, record: DiagnosticRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn remote_failure(&self, operation: &str, err: &Error) {
        self.push(DiagnosticRecord::RemoteFailure {
            operation: operation.to_string(),
            error: err.to_string(),
        });
    }

    fn degraded(&self, operation: &str, detail: &str) {
        self.push(DiagnosticRecord::Degraded {
            operation: operation.to_string(),
            detail: detail.to_string(),
        });
    }
}
