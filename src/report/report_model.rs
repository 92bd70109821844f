use serde::{Deserialize, Serialize};

use crate::spec::spec_model::{ScanRecord, TestResult};

/// Outcome of running every spec of a suite.
///
/// Built with `from_results()` and rendered by the console, HTML and
/// JUnit reporters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteReport {
    pub suite_name: String,

    pub total: usize,

    pub passed: usize,

    pub failed: usize,

    /// Wall-clock time of the whole run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub test_results: Vec<TestResult>,
}

impl TestSuiteReport {
    pub fn from_results(suite_name: &str, results: Vec<TestResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            suite_name: suite_name.to_string(),
            total,
            passed,
            failed: total - passed,
            duration_ms: None,
            test_results: results,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Every scan across the suite, paired with the spec that ran it.
    pub fn scans(&self) -> impl Iterator<Item = (&str, &ScanRecord)> {
        self.test_results
            .iter()
            .flat_map(|r| r.scans.iter().map(move |s| (r.spec_name.as_str(), s)))
    }

    /// Scans that found no matching item. They do not fail a spec on their own.
    pub fn empty_scan_count(&self) -> usize {
        self.scans().filter(|(_, s)| s.is_empty()).count()
    }
}
