//! Append-only activity log of catalog and menu mutations (JSONL).

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    CategoryAdded,
    CategoryUpdated,
    CategoryRemoved,
    ScriptAdded,
    ScriptUpdated,
    ScriptRemoved,
    MenuResynced,
    ToolPathChanged,
    CatalogImported,
    CatalogExported,
    TransitionRecovered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub event_id: Uuid,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub details: serde_json::Value,
}

pub struct ActivityLog {
    events_path: PathBuf,
}

impl ActivityLog {
    pub fn new(events_path: impl Into<PathBuf>) -> Self {
        Self {
            events_path: events_path.into(),
        }
    }

    pub fn append(&self, event_type: EventType, details: serde_json::Value) -> Result<Uuid> {
        let event = ActivityEvent {
            event_id: Uuid::new_v4(),
            event_type,
            timestamp: Utc::now(),
            details,
        };
        if let Some(parent) = self.events_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.events_path)?;
        file.write_all(serde_json::to_string(&event)?.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(event.event_id)
    }

    /// Records an event; a failing log never fails the mutation it describes.
    pub fn record(&self, event_type: EventType, details: serde_json::Value) {
        if let Err(err) = self.append(event_type, details) {
            tracing::warn!(
                path = %self.events_path.display(),
                error = %err,
                "failed to append activity event"
            );
        }
    }

    pub fn load(&self) -> Result<Vec<ActivityEvent>> {
        if !self.events_path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.events_path)?;
        let mut events = Vec::new();
        for line in data.lines().filter(|l| !l.trim().is_empty()) {
            let event: ActivityEvent = serde_json::from_str(line)?;
            events.push(event);
        }
        Ok(events)
    }
}
