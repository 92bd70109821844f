use serde::{Deserialize, Serialize};

use crate::browser::driver::CollectionQuery;
use crate::scanner::scan_model::{LabelMatcher, ScanExpectation, ScanMode};

/// A complete test specification, deserialized from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestSpec {
    /// Human-readable name for this test
    pub name: String,

    /// URL to navigate to before executing steps
    pub start_url: String,

    /// Ordered list of test steps to execute
    pub steps: Vec<TestStep>,
}

impl TestSpec {
    /// Structural problems that would make the spec fail regardless of the page.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.steps.is_empty() {
            problems.push("spec has no steps".to_string());
        }
        for (i, step) in self.steps.iter().enumerate() {
            step.collect_problems(i, false, &mut problems);
        }
        problems
    }
}

/// A single step in a test spec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Navigate to a different URL
    Navigate { url: String },

    /// Type text into an input
    Type { selector: String, value: String },

    /// Click an element by selector
    Click { selector: String },

    /// Click the element matching `selector` whose text contains `text`
    ClickText { selector: String, text: String },

    Check { selector: String },

    Uncheck { selector: String },

    /// Pick an option of a `<select>`
    Select { selector: String, value: String },

    /// Wait for the page to settle
    Wait { duration_ms: u64 },

    /// Run assertions against the current page state
    Assert { assertions: Vec<AssertionSpec> },

    /// Find items of a collection by label and run `on_match` for each hit
    Scan {
        collection: CollectionQuery,
        matcher: LabelMatcher,
        #[serde(default)]
        mode: Option<ScanMode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect: Option<ScanExpectation>,
        #[serde(default)]
        on_match: Vec<TestStep>,
    },

    /// Click the item currently matched by the enclosing scan
    Activate,

    /// Check the item currently matched by the enclosing scan
    AssertMatch { checks: Vec<MatchCheck> },
}

impl TestStep {
    /// Short name used in logs and trace events.
    pub fn kind(&self) -> &'static str {
        match self {
            TestStep::Navigate { .. } => "navigate",
            TestStep::Type { .. } => "type",
            TestStep::Click { .. } => "click",
            TestStep::ClickText { .. } => "click_text",
            TestStep::Check { .. } => "check",
            TestStep::Uncheck { .. } => "uncheck",
            TestStep::Select { .. } => "select",
            TestStep::Wait { .. } => "wait",
            TestStep::Assert { .. } => "assert",
            TestStep::Scan { .. } => "scan",
            TestStep::Activate => "activate",
            TestStep::AssertMatch { .. } => "assert_match",
        }
    }

    fn collect_problems(&self, index: usize, in_scan: bool, problems: &mut Vec<String>) {
        match self {
            TestStep::Activate | TestStep::AssertMatch { .. } if !in_scan => {
                problems.push(format!(
                    "step {}: '{}' must be inside a scan's on_match",
                    index,
                    self.kind()
                ));
            }
            TestStep::Assert { assertions } if assertions.is_empty() => {
                problems.push(format!("step {}: assert has no assertions", index));
            }
            TestStep::AssertMatch { checks } if checks.is_empty() => {
                problems.push(format!("step {}: assert_match has no checks", index));
            }
            TestStep::Scan {
                mode,
                expect,
                on_match,
                ..
            } => {
                if let (Some(ScanMode::FindFirst), Some(expect)) = (mode, expect) {
                    if !expect.reachable_with_first() {
                        problems.push(format!(
                            "step {}: a find_first scan can never match {}",
                            index, expect
                        ));
                    }
                }
                for step in on_match {
                    step.collect_problems(index, true, problems);
                }
            }
            _ => {}
        }
    }
}

/// A single assertion to evaluate against the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssertionSpec {
    /// Current URL contains the expected substring
    UrlContains { expected: String },

    /// Current URL exactly matches
    UrlEquals { expected: String },

    /// Page title contains the expected substring
    TitleContains { expected: String },

    /// Visible text on the page contains the expected string
    TextPresent { expected: String },

    /// No visible text on the page contains the expected string
    TextAbsent { expected: String },

    /// A specific element's text contains the expected string
    ElementText { selector: String, expected: String },

    /// A specific element is visible on the page
    ElementVisible { selector: String },

    /// Count of matching elements equals expected
    ElementCount { selector: String, expected: u32 },

    /// Form control value equals expected
    ElementValue { selector: String, expected: String },

    ElementChecked { selector: String },

    ElementUnchecked { selector: String },

    /// The element's class list contains `class`
    ElementHasClass { selector: String, class: String },

    /// Inside `within`, the parent of the element containing `anchor`
    /// has text containing `expected` (e.g. the value next to "Phone:")
    TextNear {
        within: String,
        anchor: String,
        expected: String,
    },
}

impl AssertionSpec {
    /// Variant name for display.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AssertionSpec::UrlContains { .. } => "UrlContains",
            AssertionSpec::UrlEquals { .. } => "UrlEquals",
            AssertionSpec::TitleContains { .. } => "TitleContains",
            AssertionSpec::TextPresent { .. } => "TextPresent",
            AssertionSpec::TextAbsent { .. } => "TextAbsent",
            AssertionSpec::ElementText { .. } => "ElementText",
            AssertionSpec::ElementVisible { .. } => "ElementVisible",
            AssertionSpec::ElementCount { .. } => "ElementCount",
            AssertionSpec::ElementValue { .. } => "ElementValue",
            AssertionSpec::ElementChecked { .. } => "ElementChecked",
            AssertionSpec::ElementUnchecked { .. } => "ElementUnchecked",
            AssertionSpec::ElementHasClass { .. } => "ElementHasClass",
            AssertionSpec::TextNear { .. } => "TextNear",
        }
    }
}

/// A check against the item matched by a scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchCheck {
    /// Status attribute contains the expected text (e.g. one class name)
    StatusContains { expected: String },

    StatusEquals { expected: String },

    LabelContains { expected: String },
}

/// Result of evaluating a single assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionResult {
    /// Which step this assertion belongs to (0-indexed)
    pub step_index: usize,

    /// What was checked, e.g. "ElementVisible" or "StatusEquals"
    pub kind: String,

    /// Whether the assertion passed
    pub passed: bool,

    /// Actual value found (for debugging failed assertions)
    pub actual: Option<String>,

    /// Human-readable failure message
    pub message: Option<String>,
}

/// What a scan step found.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanRecord {
    pub step_index: usize,

    /// e.g. "label contains 'Contact 4'"
    pub description: String,

    pub mode: ScanMode,

    /// Items whose label was evaluated
    pub scanned: usize,

    /// Labels of matched items, in collection order
    pub matched: Vec<String>,

    /// SHA-1 of the matched index/label pairs
    pub fingerprint: String,
}

impl ScanRecord {
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

/// Result of running a complete test spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Name of the test spec that was run
    pub spec_name: String,

    /// Whether all steps and assertions passed
    pub passed: bool,

    /// Number of steps that were executed
    pub steps_run: usize,

    /// All assertion results collected during the run
    pub assertion_results: Vec<AssertionResult>,

    /// Every scan performed, including nested ones
    #[serde(default)]
    pub scans: Vec<ScanRecord>,

    /// Error message if the test failed due to an error (not assertion failure)
    pub error: Option<String>,
}
