use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rendered entry in a collection under test (e.g. one contact card).
pub trait Item {
    /// Visible text used for matching.
    fn label(&self) -> &str;

    /// Status attribute used for verification, if the item exposes one.
    fn status(&self) -> Option<&str>;
}

/// How far a scan walks once something matched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Stop after the first match has been acted on.
    FindFirst,

    /// Visit every item, acting on each match.
    #[default]
    FindAll,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::FindFirst => write!(f, "first"),
            ScanMode::FindAll => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" | "find_first" => Ok(ScanMode::FindFirst),
            "all" | "find_all" => Ok(ScanMode::FindAll),
            other => Err(format!("unknown scan mode '{}' (expected first or all)", other)),
        }
    }
}

/// Label predicate as it appears in test specs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LabelMatcher {
    /// Label contains the text (case-sensitive).
    Contains(String),

    /// Label equals the text after trimming.
    Equals(String),

    /// Label starts with the text after trimming.
    StartsWith(String),
}

impl LabelMatcher {
    pub fn matches(&self, label: &str) -> bool {
        match self {
            LabelMatcher::Contains(text) => label.contains(text.as_str()),
            LabelMatcher::Equals(text) => label.trim() == text,
            LabelMatcher::StartsWith(text) => label.trim().starts_with(text.as_str()),
        }
    }
}

impl fmt::Display for LabelMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelMatcher::Contains(text) => write!(f, "label contains '{}'", text),
            LabelMatcher::Equals(text) => write!(f, "label equals '{}'", text),
            LabelMatcher::StartsWith(text) => write!(f, "label starts with '{}'", text),
        }
    }
}

/// What a scan saw: how many items it visited and which ones matched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScanOutcome {
    /// Number of items whose label was evaluated
    pub scanned: usize,

    /// Indices of matched items, in collection order
    pub matched: Vec<usize>,
}

impl ScanOutcome {
    pub fn match_count(&self) -> usize {
        self.matched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }

    pub fn first(&self) -> Option<usize> {
        self.matched.first().copied()
    }

    /// SHA-1 over the matched `index:label` pairs.
    ///
    /// Two scans over an unchanged collection produce the same fingerprint,
    /// which makes idempotence checkable across runs and in trace files.
    pub fn fingerprint<T: Item>(&self, items: &[T]) -> String {
        use sha1::{Digest, Sha1};

        let mut hasher = Sha1::new();
        for &index in &self.matched {
            let label = items.get(index).map(|item| item.label()).unwrap_or("");
            hasher.update(format!("{}:{}\n", index, label).as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Optional constraint on how many items a scan must match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanExpectation {
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
}

impl ScanExpectation {
    pub fn check(&self, outcome: &ScanOutcome, description: &str) -> Result<(), ScanError> {
        let actual = outcome.match_count();
        let satisfied = match *self {
            ScanExpectation::Exactly(n) => actual == n,
            ScanExpectation::AtLeast(n) => actual >= n,
            ScanExpectation::AtMost(n) => actual <= n,
        };

        if satisfied {
            return Ok(());
        }

        if actual == 0 {
            Err(ScanError::NoMatch {
                description: description.to_string(),
                scanned: outcome.scanned,
            })
        } else {
            Err(ScanError::UnexpectedCount {
                description: description.to_string(),
                expected: *self,
                actual,
            })
        }
    }

    /// Whether a scan that stops at its first match can satisfy this.
    pub fn reachable_with_first(&self) -> bool {
        match *self {
            ScanExpectation::Exactly(n) | ScanExpectation::AtLeast(n) => n <= 1,
            ScanExpectation::AtMost(_) => true,
        }
    }
}

impl fmt::Display for ScanExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanExpectation::Exactly(n) => write!(f, "exactly {}", n),
            ScanExpectation::AtLeast(n) => write!(f, "at least {}", n),
            ScanExpectation::AtMost(n) => write!(f, "at most {}", n),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ScanError {
    #[error("no item matched {description} ({scanned} scanned)")]
    NoMatch { description: String, scanned: usize },

    #[error("{description}: expected {expected} match(es), found {actual}")]
    UnexpectedCount {
        description: String,
        expected: ScanExpectation,
        actual: usize,
    },
}
