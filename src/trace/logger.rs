use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::trace::trace::TraceEvent;

/// JSONL sink for `TraceEvent`s, one line per executed step.
///
/// The file is opened in append mode so several runs can share it. A failed
/// write is reported through `tracing` and never fails the test run.
pub struct TraceLogger {
    path: PathBuf,
    sink: Mutex<LineWriter<File>>,
}

impl TraceLogger {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            sink: Mutex::new(LineWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&self, event: &TraceEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!(step = event.step, error = %e, "trace event not serializable");
                return;
            }
        };

        // Lines are written whole, so a poisoned writer is still usable
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(sink, "{}", line) {
            warn!(path = %self.path.display(), error = %e, "trace write failed");
        }
    }
}
