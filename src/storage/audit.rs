//! Append-only audit trail keyed by trace id

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};
use crate::{
    errors::{EngineError, EngineResult},
    types::AuditEvent,
};

pub trait AuditSink: Send + Sync {
    fn append(&self, event: &AuditEvent) -> EngineResult<()>;

    /// The most recent `limit` events for `trace_id`, oldest first.
    fn query(&self, trace_id: &str, limit: usize) -> EngineResult<Vec<AuditEvent>>;
}

fn most_recent(mut events: Vec<AuditEvent>, limit: usize) -> Vec<AuditEvent> {
    events.sort_by_key(|event| event.ts);
    let skip = events.len().saturating_sub(limit);
    events.split_off(skip)
}

/// Newline-delimited JSON file, one event per line.
pub struct JsonlAuditLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlAuditLog {
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| EngineError::Audit {
                message: format!("cannot create {}", parent.display()),
                source: e,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| EngineError::Audit {
                message: format!("cannot open {}", path.display()),
                source: e,
            })?;

        debug!(path = %path.display(), "audit log opened");
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditLog {
    fn append(&self, event: &AuditEvent) -> EngineResult<()> {
        let mut line = serde_json::to_string(event).map_err(|e| EngineError::DataParsing {
            context: format!("serializing audit event for {}", event.trace_id),
            source: e.into(),
        })?;
        line.push('\n');

        // one write per record so concurrent appends never interleave
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| EngineError::Audit {
                message: format!("append to {} failed", self.path.display()),
                source: e,
            })
    }

    fn query(&self, trace_id: &str, limit: usize) -> EngineResult<Vec<AuditEvent>> {
        // holding the writer lock keeps half-written lines out of the read
        let _writer = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let file = File::open(&self.path).map_err(|e| EngineError::Audit {
            message: format!("cannot read {}", self.path.display()),
            source: e,
        })?;

        let mut events = Vec::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| EngineError::Audit {
                message: format!("read from {} failed", self.path.display()),
                source: e,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEvent>(&line) {
                Ok(event) if event.trace_id == trace_id => events.push(event),
                Ok(_) => {}
                Err(e) => warn!(line = number + 1, error = %e, "skipping malformed audit record"),
            }
        }
        Ok(most_recent(events, limit))
    }
}

/// In-process sink, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded event in append order.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, event: &AuditEvent) -> EngineResult<()> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }

    fn query(&self, trace_id: &str, limit: usize) -> EngineResult<Vec<AuditEvent>> {
        let events = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.trace_id == trace_id)
            .cloned()
            .collect();
        Ok(most_recent(events, limit))
    }
}
