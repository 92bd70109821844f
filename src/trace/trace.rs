use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::spec::spec_model::ScanRecord;

/// One line of the JSONL run trace.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub spec: String,
    pub step: usize,
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanned: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TraceEvent {
    pub fn now(spec: &str, step: usize, kind: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            spec: spec.to_string(),
            step,
            kind: kind.to_string(),
            scan: None,
            scanned: None,
            matched: None,
            fingerprint: None,
            error: None,
        }
    }

    pub fn with_scan(mut self, record: &ScanRecord) -> Self {
        self.scan = Some(record.description.clone());
        self.scanned = Some(record.scanned);
        self.matched = Some(record.matched.len());
        self.fingerprint = Some(record.fingerprint.clone());
        self
    }

    pub fn with_error(mut self, error: impl Display) -> Self {
        self.error = Some(error.to_string());
        self
    }
}
