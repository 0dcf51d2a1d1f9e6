//! Per-script outcomes of registry synchronization.

use serde::{Deserialize, Serialize};

use super::{ScriptContext, ScriptId};
use crate::error::{MenuError, Result};

/// Resolved menu path plus the contexts it is (or will be) registered for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuTargets {
    pub path: Vec<String>,
    pub contexts: Vec<ScriptContext>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Register,
    Unregister,
}

impl SyncAction {
    pub fn past_tense(self) -> &'static str {
        match self {
            SyncAction::Register => "registered",
            SyncAction::Unregister => "unregistered",
        }
    }
}

/// Registry presence of a script after a sync step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Unregistered,
    Registered,
    PartiallyRegistered,
}

#[derive(Debug)]
pub struct ContextFailure {
    pub context: ScriptContext,
    pub error: MenuError,
}

/// What happened when (un)registering one script across its contexts.
#[derive(Debug)]
pub struct SyncReport {
    pub script_id: ScriptId,
    pub action: SyncAction,
    pub path: Vec<String>,
    pub succeeded: Vec<ScriptContext>,
    pub failed: Vec<ContextFailure>,
}

impl SyncReport {
    pub fn new(script_id: ScriptId, action: SyncAction, path: Vec<String>) -> Self {
        Self {
            script_id,
            action,
            path,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Registry presence of the script once this step has run.
    pub fn status(&self) -> RegistrationStatus {
        let (done, kept) = match self.action {
            SyncAction::Register => (
                RegistrationStatus::Registered,
                RegistrationStatus::Unregistered,
            ),
            SyncAction::Unregister => (
                RegistrationStatus::Unregistered,
                RegistrationStatus::Registered,
            ),
        };
        match (self.succeeded.is_empty(), self.failed.is_empty()) {
            (_, true) => done,
            (true, false) => kept,
            (false, false) => RegistrationStatus::PartiallyRegistered,
        }
    }

    /// Total failure yields the first store error; mixed results yield
    /// [`MenuError::PartialRegistration`].
    pub fn into_result(mut self) -> Result<()> {
        if self.failed.is_empty() {
            return Ok(());
        }
        if self.succeeded.is_empty() {
            return Err(self.failed.remove(0).error);
        }
        Err(MenuError::PartialRegistration(Box::new(self)))
    }
}

/// Combined outcome of one script mutation: the removal of the old entries
/// and the registration of the new ones.
#[derive(Debug)]
pub struct ScriptSync {
    pub script_id: ScriptId,
    pub unregistered: Option<SyncReport>,
    pub registered: Option<SyncReport>,
}

impl ScriptSync {
    pub fn status(&self) -> RegistrationStatus {
        match (&self.registered, &self.unregistered) {
            (Some(report), _) | (None, Some(report)) => report.status(),
            (None, None) => RegistrationStatus::Unregistered,
        }
    }

    /// True when no step reported a failure (no stale or missing entries).
    pub fn is_clean(&self) -> bool {
        self.unregistered.iter().all(SyncReport::is_complete)
            && self.registered.iter().all(SyncReport::is_complete)
    }

    pub fn into_result(self) -> Result<ScriptId> {
        if let Some(report) = self.unregistered {
            report.into_result()?;
        }
        if let Some(report) = self.registered {
            report.into_result()?;
        }
        Ok(self.script_id)
    }
}
