//! Error types for catalog and menu registry operations.
//!
//! Store failures carry the offending key path and the backend's own message
//! so the caller can surface both to the user.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::catalog::sync::SyncReport;
use crate::menu::{ContextClass, StoreError};

/// Result type for catalog and registry operations.
pub type Result<T> = std::result::Result<T, MenuError>;

/// Which kind of catalog entity an id referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Category,
    Script,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Category => f.write_str("category"),
            EntityKind::Script => f.write_str("script"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MenuError {
    /// The native menu store rejected a key operation.
    #[error("menu store error for {context} at {key}: {source}")]
    NativeStore {
        context: ContextClass,
        key: String,
        #[source]
        source: StoreError,
    },

    /// A referenced category or script does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    /// The requested parent would make the category chain cyclic.
    #[error("category {category} cannot be placed under {parent}: parent chain would form a cycle")]
    Cycle { category: Uuid, parent: Uuid },

    /// Input rejected before any side effect happened.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Some, but not all, requested contexts were (un)registered.
    #[error("{}", partial_message(.0))]
    PartialRegistration(Box<SyncReport>),

    /// Catalog or artifact file I/O failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Catalog or journal document could not be (de)serialized.
    #[error("malformed document {}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl MenuError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        MenuError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
        MenuError::NotFound { kind, id }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MenuError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn document(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        MenuError::Document {
            path: path.into(),
            source,
        }
    }
}

fn partial_message(report: &SyncReport) -> String {
    let failed = report
        .failed
        .iter()
        .map(|failure| format!("{} ({})", failure.context, failure.error))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "script {} at {} only partially {}: failed for {}",
        report.script_id,
        report.path.join("\\"),
        report.action.past_tense(),
        failed
    )
}
