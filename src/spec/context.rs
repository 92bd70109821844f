use crate::browser::driver::{CollectionQuery, RenderedItem};
use crate::spec::spec_model::{AssertionResult, ScanRecord};

/// The item a scan is currently dispatching on, with the query that found it.
#[derive(Debug, Clone)]
pub struct ActiveMatch {
    pub query: CollectionQuery,
    pub item: RenderedItem,
}

/// Tracks the execution state and results of a running test.
#[derive(Debug, Clone)]
pub struct TestContext {
    /// Current top-level step index (0-based)
    pub current_step: usize,

    /// All assertion results collected during execution
    pub assertion_results: Vec<AssertionResult>,

    /// Scans performed so far
    pub scans: Vec<ScanRecord>,

    /// Matches being dispatched on; nested scans push on top
    matches: Vec<ActiveMatch>,
}

impl TestContext {
    pub fn new() -> Self {
        TestContext {
            current_step: 0,
            assertion_results: Vec::new(),
            scans: Vec::new(),
            matches: Vec::new(),
        }
    }

    /// Record assertion results from a step.
    pub fn record_assertions(&mut self, results: Vec<AssertionResult>) {
        self.assertion_results.extend(results);
    }

    pub fn record_scan(&mut self, record: ScanRecord) {
        self.scans.push(record);
    }

    pub fn enter_match(&mut self, query: &CollectionQuery, item: &RenderedItem) {
        self.matches.push(ActiveMatch {
            query: query.clone(),
            item: item.clone(),
        });
    }

    pub fn leave_match(&mut self) {
        self.matches.pop();
    }

    /// The match `activate` / `assert_match` steps operate on.
    pub fn active_match(&self) -> Option<&ActiveMatch> {
        self.matches.last()
    }

    /// Check if all recorded assertions passed.
    pub fn all_passed(&self) -> bool {
        self.assertion_results.iter().all(|r| r.passed)
    }

    /// Count of passing assertions.
    pub fn pass_count(&self) -> usize {
        self.assertion_results.iter().filter(|r| r.passed).count()
    }

    /// Count of failing assertions.
    pub fn fail_count(&self) -> usize {
        self.assertion_results.iter().filter(|r| !r.passed).count()
    }

    /// Total number of assertions evaluated.
    pub fn total_count(&self) -> usize {
        self.assertion_results.len()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
