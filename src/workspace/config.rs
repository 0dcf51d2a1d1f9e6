//! Configuration primitives for scriptmenu.
//!
//! Stored in a TOML file under the workspace root:
//!   %APPDATA%/ScriptMenu/config/config.toml on Windows
//!   $XDG_DATA_HOME/ScriptMenu/config/config.toml on Linux
//!   ~/Library/Application Support/ScriptMenu/config/config.toml on macOS
//!
//! `SCRIPTMENU_HOME` overrides the workspace root.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use super::WorkspaceLayout;
use crate::catalog::{StoreOptions, DEFAULT_MENU_ROOT, DEFAULT_TOOL_PATH};
use crate::menu::reg_exe::DEFAULT_HIVE;
use crate::menu::{FileMenuStore, MenuStore, RegExeMenuStore};

/// Root configuration persisted per installation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Where and how menu entries are written.
    #[serde(default)]
    pub menu: MenuSettings,
    /// Interpreter and launcher shim used in generated command lines.
    #[serde(default)]
    pub launcher: LauncherSettings,
}

/// Which store backs the context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuBackend {
    /// The Windows registry, via `reg.exe`.
    Reg,
    /// A JSON mirror of the menu tree inside the workspace.
    File,
}

impl Default for MenuBackend {
    fn default() -> Self {
        if cfg!(windows) {
            MenuBackend::Reg
        } else {
            MenuBackend::File
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuSettings {
    /// Top-level flyout every managed entry lives under.
    #[serde(default = "default_root_segment")]
    pub root_segment: String,
    #[serde(default)]
    pub backend: MenuBackend,
    /// Registry hive prefix for the `reg` backend.
    #[serde(default = "default_hive")]
    pub hive: String,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            root_segment: default_root_segment(),
            backend: MenuBackend::default(),
            hive: default_hive(),
        }
    }
}

fn default_root_segment() -> String {
    DEFAULT_MENU_ROOT.to_string()
}

fn default_hive() -> String {
    DEFAULT_HIVE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherSettings {
    /// Interpreter recorded in new catalogs.
    #[serde(default = "default_tool_path")]
    pub tool_path: String,
    /// Optional shim placed between the interpreter and the script.
    #[serde(default)]
    pub shim_path: Option<PathBuf>,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            tool_path: default_tool_path(),
            shim_path: None,
        }
    }
}

fn default_tool_path() -> String {
    DEFAULT_TOOL_PATH.to_string()
}

impl AppConfig {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            menu_root: self.menu.root_segment.clone(),
            default_tool_path: self.launcher.tool_path.clone(),
            shim_path: self.launcher.shim_path.clone(),
        }
    }

    /// Opens the configured menu backend.
    pub fn open_menu_store(&self, layout: &WorkspaceLayout) -> Result<Box<dyn MenuStore>> {
        match self.menu.backend {
            MenuBackend::Reg => Ok(Box::new(RegExeMenuStore::new(self.menu.hive.clone()))),
            MenuBackend::File => {
                let store = FileMenuStore::open(&layout.menu_tree_file).with_context(|| {
                    format!("Failed to open menu tree {:?}", layout.menu_tree_file)
                })?;
                Ok(Box::new(store))
            }
        }
    }
}

/// Standard relative path to the config file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Returns the root directory where scriptmenu stores data.
///
/// Order of precedence:
/// 1. `SCRIPTMENU_HOME` environment variable.
/// 2. OS-specific data directory via `directories::BaseDirs`.
pub fn workspace_root() -> Result<PathBuf> {
    if let Ok(path) = env::var("SCRIPTMENU_HOME") {
        return Ok(PathBuf::from(path));
    }
    let base_dirs = BaseDirs::new().context("Unable to determine OS data directory")?;
    Ok(base_dirs.data_dir().join("ScriptMenu"))
}

/// Loads the configuration from disk or returns defaults.
pub fn load_or_default(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let cfg: AppConfig = toml::from_str(&data)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(cfg)
    } else {
        Ok(AppConfig::default())
    }
}

/// Persists the configuration to disk.
pub fn save(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let data = toml::to_string_pretty(config)?;
    fs::write(path, data).with_context(|| format!("Failed to write config file {:?}", path))?;
    Ok(())
}
