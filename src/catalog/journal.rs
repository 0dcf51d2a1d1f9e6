//! Durable record of registry transitions that are in flight.
//!
//! Every mutation that touches the menu store appends a transition before its
//! first registry call and drops it once the new entries are written. Entries
//! still present on the next open describe work a crash interrupted.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MenuTargets, ScriptId};
use crate::error::{MenuError, Result};

/// What recovery should do with the scripts of an interrupted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionIntent {
    /// Re-register the script from current catalog state.
    Resync,
    /// Finish deleting the script.
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptTransition {
    pub script_id: ScriptId,
    #[serde(default)]
    pub old: Option<MenuTargets>,
    #[serde(default)]
    pub new: Option<MenuTargets>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransition {
    pub transition_id: Uuid,
    pub operation: String,
    pub intent: TransitionIntent,
    pub created_at: DateTime<Utc>,
    pub scripts: Vec<ScriptTransition>,
}

impl PendingTransition {
    pub fn new(
        operation: impl Into<String>,
        intent: TransitionIntent,
        scripts: Vec<ScriptTransition>,
    ) -> Self {
        Self {
            transition_id: Uuid::new_v4(),
            operation: operation.into(),
            intent,
            created_at: Utc::now(),
            scripts,
        }
    }
}

/// JSONL journal of pending transitions.
#[derive(Debug, Clone)]
pub struct TransitionJournal {
    path: PathBuf,
}

impl TransitionJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn begin(&self, transition: &PendingTransition) -> Result<()> {
        self.ensure_parent()?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| MenuError::io(&self.path, err))?;
        let line = serde_json::to_string(transition)
            .map_err(|err| MenuError::document(&self.path, err))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .and_then(|_| file.sync_all())
            .map_err(|err| MenuError::io(&self.path, err))
    }

    pub fn complete(&self, transition_id: &Uuid) -> Result<()> {
        let mut pending = self.pending()?;
        let before = pending.len();
        pending.retain(|transition| &transition.transition_id != transition_id);
        if pending.len() != before {
            self.persist(&pending)?;
        }
        Ok(())
    }

    pub fn pending(&self) -> Result<Vec<PendingTransition>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path).map_err(|err| MenuError::io(&self.path, err))?;
        let mut transitions = Vec::new();
        for line in data.lines().filter(|l| !l.trim().is_empty()) {
            let transition: PendingTransition =
                serde_json::from_str(line).map_err(|err| MenuError::document(&self.path, err))?;
            transitions.push(transition);
        }
        Ok(transitions)
    }

    fn persist(&self, transitions: &[PendingTransition]) -> Result<()> {
        if transitions.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(MenuError::io(&self.path, err)),
            };
        }
        self.ensure_parent()?;
        let mut data = String::new();
        for transition in transitions {
            let line = serde_json::to_string(transition)
                .map_err(|err| MenuError::document(&self.path, err))?;
            data.push_str(&line);
            data.push('\n');
        }
        fs::write(&self.path, data).map_err(|err| MenuError::io(&self.path, err))
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| MenuError::io(parent, err))?;
        }
        Ok(())
    }
}
