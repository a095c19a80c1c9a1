//! Results of slice and schedule runs

use std::time::Duration;
use txload_core::{ErrorKind, TxLoadError};

/// What happened on one dispatch connection
#[derive(Debug)]
pub struct ConnectionOutcome {
    pub index: usize,
    pub port: u16,
    /// Replies received and written back to the store
    pub completed: u32,
    /// Keys that were not in the store; nothing is sent for them
    pub missing_keys: u32,
    /// The error that ended the loop early, if any
    pub error: Option<TxLoadError>,
}

impl ConnectionOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of one engine run
#[derive(Debug)]
pub struct SliceReport {
    pub label: String,
    pub tps: u32,
    pub requests_per_connection: u32,
    pub connections: Vec<ConnectionOutcome>,
    pub elapsed: Duration,
}

impl SliceReport {
    pub fn empty(label: impl Into<String>, tps: u32) -> Self {
        Self {
            label: label.into(),
            tps,
            requests_per_connection: 0,
            connections: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn completed(&self) -> u64 {
        self.connections.iter().map(|c| u64::from(c.completed)).sum()
    }

    pub fn failed_connections(&self) -> usize {
        self.connections.iter().filter(|c| !c.is_ok()).count()
    }

    /// Connections that ended on an error of `kind`
    pub fn failures_of(&self, kind: ErrorKind) -> usize {
        self.connections
            .iter()
            .filter(|c| c.error.as_ref().is_some_and(|e| e.kind() == kind))
            .count()
    }
}

/// Result of a whole schedule
#[derive(Debug, Default)]
pub struct RunReport {
    /// Slice reports in schedule order
    pub slices: Vec<SliceReport>,
    /// Entries never launched because shutdown was requested
    pub skipped: usize,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn completed(&self) -> u64 {
        self.slices.iter().map(SliceReport::completed).sum()
    }

    pub fn failed_connections(&self) -> usize {
        self.slices.iter().map(SliceReport::failed_connections).sum()
    }

    /// One line per slice plus a total, for the CLI
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for slice in &self.slices {
            out.push_str(&format!(
                "slice {:>8}  tps {:>7}  per-conn {:>4}  completed {:>7}  failed conns {:>3}  {:>8.3}s\n",
                slice.label,
                slice.tps,
                slice.requests_per_connection,
                slice.completed(),
                slice.failed_connections(),
                slice.elapsed.as_secs_f64(),
            ));
        }
        out.push_str(&format!(
            "total: {} slices, {} completed, {} failed connections, {} skipped, {:.3}s",
            self.slices.len(),
            self.completed(),
            self.failed_connections(),
            self.skipped,
            self.elapsed.as_secs_f64(),
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txload_core::IoStage;

    fn outcome(completed: u32, error: Option<TxLoadError>) -> ConnectionOutcome {
        ConnectionOutcome {
            index: 0,
            port: 8001,
            completed,
            missing_keys: 0,
            error,
        }
    }

    #[test]
    fn test_slice_totals() {
        let mut report = SliceReport::empty("1", 30);
        report.connections.push(outcome(10, None));
        report.connections.push(outcome(
            4,
            Some(TxLoadError::Timeout {
                port: 8001,
                stage: IoStage::Read,
            }),
        ));

        assert_eq!(report.completed(), 14);
        assert_eq!(report.failed_connections(), 1);
        assert_eq!(report.failures_of(ErrorKind::Connection), 1);
        assert_eq!(report.failures_of(ErrorKind::Listen), 0);
    }

    #[test]
    fn test_summary_mentions_every_slice() {
        let run = RunReport {
            slices: vec![SliceReport::empty("warmup", 0), SliceReport::empty("peak", 0)],
            skipped: 1,
            elapsed: Duration::from_millis(1500),
        };
        let summary = run.summary();
        assert!(summary.contains("warmup"));
        assert!(summary.contains("peak"));
        assert!(summary.contains("1 skipped"));
    }
}
