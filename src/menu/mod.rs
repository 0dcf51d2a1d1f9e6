//! Native context-menu store abstraction.
//!
//! The shell reads cascading menus from a hierarchical key/value tree. Every
//! backend implements the narrow [`MenuStore`] trait so the registry engine
//! can run against the real OS store or an in-memory tree.

pub mod memory;
pub mod reg_exe;
pub mod registry;

pub use memory::{FileMenuStore, MemoryMenuStore, MenuKey};
pub use reg_exe::RegExeMenuStore;
pub use registry::{MenuPathRegistry, CONTAINER_KEY};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value name holding a group's display label.
pub const LABEL_VALUE: &str = "MUIVerb";
/// Value name marking a group as a cascading submenu.
pub const SUBCOMMANDS_VALUE: &str = "subcommands";
/// Value name holding a leaf's icon reference.
pub const ICON_VALUE: &str = "Icon";
/// Sub-key of a leaf holding the command line.
pub const COMMAND_KEY: &str = "command";
/// Unnamed default value of a key.
pub const DEFAULT_VALUE: &str = "";

/// Filesystem object class a menu entry applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextClass {
    /// Any single file (`*`).
    File,
    /// Any directory.
    Directory,
    /// An arbitrary named class such as `Directory\Background` or `.txt`.
    Named(String),
}

impl ContextClass {
    /// Fixed native root every path for this class is created under.
    pub fn root_key(&self) -> KeyPath {
        let class = match self {
            ContextClass::File => "*",
            ContextClass::Directory => "Directory",
            ContextClass::Named(name) => name.as_str(),
        };
        let mut root = KeyPath::default();
        for part in class.split('\\').filter(|part| !part.is_empty()) {
            root.push(part);
        }
        root.push("shell");
        root
    }
}

impl fmt::Display for ContextClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextClass::File => f.write_str("file"),
            ContextClass::Directory => f.write_str("directory"),
            ContextClass::Named(name) => write!(f, "class '{name}'"),
        }
    }
}

/// Backslash-separated key path relative to the store's hive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn push(&mut self, part: impl Into<String>) {
        self.0.push(part.into());
    }

    pub fn join(&self, part: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.push(part);
        next
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn parent(&self) -> Option<KeyPath> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("\\"))
    }
}

/// Failure reported by a menu store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    PermissionDenied,
    Busy,
    /// Non-recursive delete of a key that still has children.
    NotEmpty,
    Io,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StoreErrorKind::PermissionDenied => "permission denied",
            StoreErrorKind::Busy => "key busy",
            StoreErrorKind::NotEmpty => "key not empty",
            StoreErrorKind::Io => "store i/o failure",
        };
        f.write_str(text)
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Outcome of [`MenuStore::delete_if_empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prune {
    Deleted,
    Absent,
    Occupied,
}

/// Narrow interface over a hierarchical menu store.
///
/// Key creation creates any missing intermediate keys.
pub trait MenuStore {
    /// Creates (or opens) a group key and marks it as a labelled flyout.
    fn ensure_group(&mut self, key: &KeyPath, label: &str) -> StoreResult<()>;

    /// Creates or overwrites a leaf command key and its `command` sub-key.
    fn set_leaf(
        &mut self,
        key: &KeyPath,
        label: &str,
        command: &str,
        icon: Option<&str>,
    ) -> StoreResult<()>;

    /// Deletes a leaf and its `command` sub-key. Absent keys are not an error.
    fn delete_leaf(&mut self, key: &KeyPath) -> StoreResult<()>;

    /// Names of the immediate child keys; empty when the key is absent.
    fn list_children(&self, key: &KeyPath) -> StoreResult<Vec<String>>;

    /// Deletes `key` only if it has no child keys.
    fn delete_if_empty(&mut self, key: &KeyPath) -> StoreResult<Prune>;
}

impl<T: MenuStore + ?Sized> MenuStore for Box<T> {
    fn ensure_group(&mut self, key: &KeyPath, label: &str) -> StoreResult<()> {
        (**self).ensure_group(key, label)
    }

    fn set_leaf(
        &mut self,
        key: &KeyPath,
        label: &str,
        command: &str,
        icon: Option<&str>,
    ) -> StoreResult<()> {
        (**self).set_leaf(key, label, command, icon)
    }

    fn delete_leaf(&mut self, key: &KeyPath) -> StoreResult<()> {
        (**self).delete_leaf(key)
    }

    fn list_children(&self, key: &KeyPath) -> StoreResult<Vec<String>> {
        (**self).list_children(key)
    }

    fn delete_if_empty(&mut self, key: &KeyPath) -> StoreResult<Prune> {
        (**self).delete_if_empty(key)
    }
}
