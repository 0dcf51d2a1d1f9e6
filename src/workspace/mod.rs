mod config;

pub use config::{
    load_or_default, save, workspace_root, AppConfig, LauncherSettings, MenuBackend, MenuSettings,
    CONFIG_FILE_NAME,
};

use std::fs;
use std::path::PathBuf;

use crate::error::{MenuError, Result};

/// Name of the artifact directory holding copied scripts and icons.
pub const SCRIPTS_SUBDIR: &str = "scripts";
pub const CATALOG_FILE_NAME: &str = "catalog.json";
pub const JOURNAL_FILE: &str = "journal/pending.jsonl";
pub const EVENTS_FILE_NAME: &str = "events.jsonl";
pub const MENU_TREE_FILE_NAME: &str = "menu_tree.json";

/// Every file and directory the workspace uses, resolved from its root.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub catalog_file: PathBuf,
    pub scripts_dir: PathBuf,
    pub journal_file: PathBuf,
    pub events_file: PathBuf,
    pub menu_tree_file: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_file: root.join("config").join(CONFIG_FILE_NAME),
            catalog_file: root.join(CATALOG_FILE_NAME),
            scripts_dir: root.join(SCRIPTS_SUBDIR),
            journal_file: root.join(JOURNAL_FILE),
            events_file: root.join(EVENTS_FILE_NAME),
            menu_tree_file: root.join(MENU_TREE_FILE_NAME),
            root,
        }
    }

    /// Creates the root and artifact directories.
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.root, &self.scripts_dir] {
            fs::create_dir_all(dir).map_err(|err| MenuError::io(dir, err))?;
        }
        Ok(())
    }
}
