//! In-memory menu tree and its JSON-persisted variant.
//!
//! The tree mirrors registry semantics: key creation creates intermediate
//! keys, deletes are non-recursive, and absent keys list no children.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{
    KeyPath, MenuStore, Prune, StoreError, StoreErrorKind, StoreResult, COMMAND_KEY,
    DEFAULT_VALUE, ICON_VALUE, LABEL_VALUE, SUBCOMMANDS_VALUE,
};

/// A single key with its named values and child keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuKey {
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(default)]
    pub children: BTreeMap<String, MenuKey>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryMenuStore {
    root: MenuKey,
    denied: Vec<KeyPath>,
}

impl MemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_root(root: MenuKey) -> Self {
        Self {
            root,
            denied: Vec::new(),
        }
    }

    pub fn root(&self) -> &MenuKey {
        &self.root
    }

    /// Rejects every write at or below `prefix` with `PermissionDenied`.
    pub fn deny_writes_under(&mut self, prefix: KeyPath) {
        self.denied.push(prefix);
    }

    pub fn allow_all_writes(&mut self) {
        self.denied.clear();
    }

    pub fn key(&self, path: &KeyPath) -> Option<&MenuKey> {
        let mut node = &self.root;
        for part in path.parts() {
            node = node.children.get(part)?;
        }
        Some(node)
    }

    pub fn contains(&self, path: &KeyPath) -> bool {
        self.key(path).is_some()
    }

    pub fn value(&self, path: &KeyPath, name: &str) -> Option<&str> {
        self.key(path)?.values.get(name).map(String::as_str)
    }

    /// Every key in the tree, as backslash-joined paths in sorted order.
    pub fn all_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(&self.root, &mut Vec::new(), &mut keys);
        keys
    }

    fn check_writable(&self, path: &KeyPath) -> StoreResult<()> {
        let denied = self
            .denied
            .iter()
            .any(|prefix| path.parts().starts_with(prefix.parts()));
        if denied {
            return Err(StoreError::new(
                StoreErrorKind::PermissionDenied,
                format!("access to {path} is denied"),
            ));
        }
        Ok(())
    }

    fn create_key(&mut self, path: &KeyPath) -> StoreResult<&mut MenuKey> {
        self.check_writable(path)?;
        let mut node = &mut self.root;
        for part in path.parts() {
            node = node.children.entry(part.clone()).or_default();
        }
        Ok(node)
    }

    fn delete_key(&mut self, path: &KeyPath) -> StoreResult<Prune> {
        let Some((name, parent_parts)) = path.parts().split_last() else {
            return Ok(Prune::Occupied);
        };
        match self.key(path) {
            None => return Ok(Prune::Absent),
            Some(node) if !node.children.is_empty() => return Ok(Prune::Occupied),
            Some(_) => {}
        }
        self.check_writable(path)?;
        let mut parent = &mut self.root;
        for part in parent_parts {
            match parent.children.get_mut(part) {
                Some(next) => parent = next,
                None => return Ok(Prune::Absent),
            }
        }
        parent.children.remove(name);
        Ok(Prune::Deleted)
    }
}

fn collect_keys(node: &MenuKey, prefix: &mut Vec<String>, out: &mut Vec<String>) {
    for (name, child) in &node.children {
        prefix.push(name.clone());
        out.push(prefix.join("\\"));
        collect_keys(child, prefix, out);
        prefix.pop();
    }
}

impl MenuStore for MemoryMenuStore {
    fn ensure_group(&mut self, key: &KeyPath, label: &str) -> StoreResult<()> {
        let node = self.create_key(key)?;
        node.values.insert(LABEL_VALUE.into(), label.into());
        node.values.insert(SUBCOMMANDS_VALUE.into(), String::new());
        Ok(())
    }

    fn set_leaf(
        &mut self,
        key: &KeyPath,
        label: &str,
        command: &str,
        icon: Option<&str>,
    ) -> StoreResult<()> {
        let node = self.create_key(key)?;
        node.values.insert(DEFAULT_VALUE.into(), label.into());
        match icon {
            Some(icon) => {
                node.values.insert(ICON_VALUE.into(), icon.into());
            }
            None => {
                node.values.remove(ICON_VALUE);
            }
        }
        let command_node = self.create_key(&key.join(COMMAND_KEY))?;
        command_node
            .values
            .insert(DEFAULT_VALUE.into(), command.into());
        Ok(())
    }

    fn delete_leaf(&mut self, key: &KeyPath) -> StoreResult<()> {
        self.delete_key(&key.join(COMMAND_KEY))?;
        match self.delete_key(key)? {
            Prune::Occupied => Err(StoreError::new(
                StoreErrorKind::NotEmpty,
                format!("{key} has child keys other than '{COMMAND_KEY}'"),
            )),
            Prune::Deleted | Prune::Absent => Ok(()),
        }
    }

    fn list_children(&self, key: &KeyPath) -> StoreResult<Vec<String>> {
        Ok(self
            .key(key)
            .map(|node| node.children.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn delete_if_empty(&mut self, key: &KeyPath) -> StoreResult<Prune> {
        self.delete_key(key)
    }
}

/// Menu tree persisted to a JSON document after every mutation.
///
/// Used where no native shell store is available, and for dry runs that
/// should not touch the OS.
#[derive(Debug)]
pub struct FileMenuStore {
    path: PathBuf,
    tree: MemoryMenuStore,
}

impl FileMenuStore {
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let root = if path.exists() {
            let data = fs::read(&path).map_err(|err| io_error(&path, err))?;
            serde_json::from_slice(&data).map_err(|err| {
                StoreError::new(
                    StoreErrorKind::Io,
                    format!("malformed menu tree {}: {err}", path.display()),
                )
            })?
        } else {
            MenuKey::default()
        };
        Ok(Self {
            path,
            tree: MemoryMenuStore::from_root(root),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tree(&self) -> &MemoryMenuStore {
        &self.tree
    }

    fn flush(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
        }
        let data = serde_json::to_vec_pretty(self.tree.root())
            .map_err(|err| StoreError::new(StoreErrorKind::Io, err.to_string()))?;
        fs::write(&self.path, data).map_err(|err| io_error(&self.path, err))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    let kind = match err.kind() {
        std::io::ErrorKind::PermissionDenied => StoreErrorKind::PermissionDenied,
        _ => StoreErrorKind::Io,
    };
    StoreError::new(kind, format!("{}: {err}", path.display()))
}

impl MenuStore for FileMenuStore {
    fn ensure_group(&mut self, key: &KeyPath, label: &str) -> StoreResult<()> {
        self.tree.ensure_group(key, label)?;
        self.flush()
    }

    fn set_leaf(
        &mut self,
        key: &KeyPath,
        label: &str,
        command: &str,
        icon: Option<&str>,
    ) -> StoreResult<()> {
        self.tree.set_leaf(key, label, command, icon)?;
        self.flush()
    }

    fn delete_leaf(&mut self, key: &KeyPath) -> StoreResult<()> {
        self.tree.delete_leaf(key)?;
        self.flush()
    }

    fn list_children(&self, key: &KeyPath) -> StoreResult<Vec<String>> {
        self.tree.list_children(key)
    }

    fn delete_if_empty(&mut self, key: &KeyPath) -> StoreResult<Prune> {
        let outcome = self.tree.delete_if_empty(key)?;
        if outcome == Prune::Deleted {
            self.flush()?;
        }
        Ok(outcome)
    }
}
