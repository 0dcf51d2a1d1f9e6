//! Logical category/script tree and menu path resolution.
//!
//! Categories reference their parent by id, so every walk up the chain is
//! bounded and fails with [`MenuError::Cycle`] on a revisit instead of
//! looping.

pub mod artifacts;
pub mod command;
pub mod journal;
pub mod store;
pub mod sync;

pub use artifacts::{check_owned_name, ArtifactStore};
pub use command::launch_command;
pub use journal::{PendingTransition, ScriptTransition, TransitionIntent, TransitionJournal};
pub use store::{CatalogStore, CategoryUpdate, NewScript, ScriptUpdate, StoreOptions};
pub use sync::{ContextFailure, MenuTargets, RegistrationStatus, ScriptSync, SyncAction, SyncReport};

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EntityKind, MenuError, Result};
use crate::menu::ContextClass;

pub type CategoryId = Uuid;
pub type ScriptId = Uuid;

/// Top-level menu group every root category nests under.
pub const DEFAULT_MENU_ROOT: &str = "ScriptTools";
/// Interpreter used for new catalogs.
pub const DEFAULT_TOOL_PATH: &str = "python";

/// Filesystem object a script can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptContext {
    File,
    Directory,
}

impl ScriptContext {
    pub fn class(self) -> ContextClass {
        match self {
            ScriptContext::File => ContextClass::File,
            ScriptContext::Directory => ContextClass::Directory,
        }
    }
}

impl fmt::Display for ScriptContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptContext::File => f.write_str("file"),
            ScriptContext::Directory => f.write_str("directory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub parent: Option<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub id: ScriptId,
    pub name: String,
    /// Owning category; `None` places the script directly under the menu root.
    #[serde(default)]
    pub category: Option<CategoryId>,
    pub contexts: BTreeSet<ScriptContext>,
    /// File name of the copied script inside artifact storage.
    pub stored_file: String,
    /// File name of the copied icon inside artifact storage.
    #[serde(default)]
    pub icon: Option<String>,
}

/// The whole catalog document, persisted as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub scripts: Vec<Script>,
    pub tool_path: String,
}

impl Catalog {
    pub fn new(tool_path: impl Into<String>) -> Self {
        Self {
            categories: Vec::new(),
            scripts: Vec::new(),
            tool_path: tool_path.into(),
        }
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| &category.id == id)
    }

    pub fn category_mut(&mut self, id: &CategoryId) -> Option<&mut Category> {
        self.categories.iter_mut().find(|category| &category.id == id)
    }

    pub fn script(&self, id: &ScriptId) -> Option<&Script> {
        self.scripts.iter().find(|script| &script.id == id)
    }

    pub fn script_mut(&mut self, id: &ScriptId) -> Option<&mut Script> {
        self.scripts.iter_mut().find(|script| &script.id == id)
    }

    pub fn require_category(&self, id: &CategoryId) -> Result<&Category> {
        self.category(id)
            .ok_or_else(|| MenuError::not_found(EntityKind::Category, *id))
    }

    pub fn require_script(&self, id: &ScriptId) -> Result<&Script> {
        self.script(id)
            .ok_or_else(|| MenuError::not_found(EntityKind::Script, *id))
    }

    /// Direct subcategories of `parent` (`None` lists root categories).
    pub fn child_categories(&self, parent: Option<CategoryId>) -> Vec<CategoryId> {
        self.categories
            .iter()
            .filter(|category| category.parent == parent)
            .map(|category| category.id)
            .collect()
    }

    /// Scripts placed directly in `category` (`None` lists root scripts).
    pub fn scripts_in(&self, category: Option<CategoryId>) -> Vec<ScriptId> {
        self.scripts
            .iter()
            .filter(|script| script.category == category)
            .map(|script| script.id)
            .collect()
    }

    /// `id` and every category below it, parents before children.
    pub fn subtree(&self, id: CategoryId) -> Vec<CategoryId> {
        let mut ordered = vec![id];
        let mut seen: HashSet<CategoryId> = HashSet::from([id]);
        let mut cursor = 0;
        while cursor < ordered.len() {
            for child in self.child_categories(Some(ordered[cursor])) {
                if seen.insert(child) {
                    ordered.push(child);
                }
            }
            cursor += 1;
        }
        ordered
    }

    /// Every script transitively under `id`.
    pub fn scripts_under(&self, id: CategoryId) -> Vec<ScriptId> {
        self.subtree(id)
            .into_iter()
            .flat_map(|category| self.scripts_in(Some(category)))
            .collect()
    }

    /// Display path of a category: `[root, ...ancestors, name]`.
    pub fn category_path(&self, id: Option<CategoryId>, root: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = id;
        while let Some(current) = cursor {
            if !visited.insert(current) {
                return Err(MenuError::Cycle {
                    category: id.unwrap_or(current),
                    parent: current,
                });
            }
            let category = self.require_category(&current)?;
            names.push(category.name.clone());
            cursor = category.parent;
        }
        names.push(root.to_string());
        names.reverse();
        Ok(names)
    }

    /// Display path of a script: its category path plus the script name.
    pub fn script_path(&self, script: &Script, root: &str) -> Result<Vec<String>> {
        let mut path = self.category_path(script.category, root)?;
        path.push(script.name.clone());
        Ok(path)
    }

    /// Fails with `Validation` if another child of `parent` already uses
    /// `name`. Registry key names are case-insensitive, so `Foo` and `foo`
    /// would resolve to the same menu entry.
    pub fn check_sibling_name(
        &self,
        field: &'static str,
        parent: Option<CategoryId>,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<()> {
        let wanted = name.to_lowercase();
        let taken = self
            .children_named(parent)
            .any(|(id, existing)| Some(id) != exclude && existing.to_lowercase() == wanted);
        if taken {
            return Err(MenuError::validation(
                field,
                format!("'{name}' is already used by another entry in the same menu"),
            ));
        }
        Ok(())
    }

    /// Ids and names of the categories and scripts placed directly under
    /// `parent`.
    fn children_named(
        &self,
        parent: Option<CategoryId>,
    ) -> impl Iterator<Item = (Uuid, &str)> + '_ {
        let categories = self
            .categories
            .iter()
            .filter(move |category| category.parent == parent)
            .map(|category| (category.id, category.name.as_str()));
        let scripts = self
            .scripts
            .iter()
            .filter(move |script| script.category == parent)
            .map(|script| (script.id, script.name.as_str()));
        categories.chain(scripts)
    }

    /// Fails with `Cycle` if `category` placed under `parent` would loop.
    pub fn check_parent(&self, category: CategoryId, parent: CategoryId) -> Result<()> {
        let cycle = MenuError::Cycle { category, parent };
        let mut visited = HashSet::new();
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == category || !visited.insert(current) {
                return Err(cycle);
            }
            cursor = self.require_category(&current)?.parent;
        }
        Ok(())
    }

    /// Checks the structural invariants of a loaded or imported document.
    pub fn validate(&self) -> Result<()> {
        validate_tool_path(&self.tool_path)?;
        let mut ids = HashSet::new();
        for category in &self.categories {
            validate_name("category name", &category.name)?;
            if !ids.insert(category.id) {
                return Err(MenuError::validation(
                    "catalog",
                    format!("duplicate category id {}", category.id),
                ));
            }
        }
        for category in &self.categories {
            self.category_path(Some(category.id), DEFAULT_MENU_ROOT)?;
        }
        let mut stored = HashSet::new();
        for script in &self.scripts {
            validate_name("script name", &script.name)?;
            validate_contexts(&script.contexts)?;
            if !ids.insert(script.id) {
                return Err(MenuError::validation(
                    "catalog",
                    format!("duplicate script id {}", script.id),
                ));
            }
            if !stored.insert(script.stored_file.as_str()) {
                return Err(MenuError::validation(
                    "catalog",
                    format!("stored file {} is shared by several scripts", script.stored_file),
                ));
            }
            if let Some(category) = script.category {
                self.require_category(&category)?;
            }
            check_owned_name("stored file", &script.id, &script.stored_file, false)?;
            if let Some(icon) = &script.icon {
                check_owned_name("icon", &script.id, icon, true)?;
            }
        }
        let mut siblings = HashSet::new();
        let entries = self
            .categories
            .iter()
            .map(|category| (category.parent, category.name.as_str()))
            .chain(
                self.scripts
                    .iter()
                    .map(|script| (script.category, script.name.as_str())),
            );
        for (parent, name) in entries {
            if !siblings.insert((parent, name.to_lowercase())) {
                return Err(MenuError::validation(
                    "catalog",
                    format!("'{name}' appears twice in the same menu"),
                ));
            }
        }
        Ok(())
    }
}

/// Names become registry key names, so they must be non-empty and free of
/// the key separator.
pub fn validate_name(field: &'static str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(MenuError::validation(field, "must not be empty"));
    }
    if name.contains('\\') {
        return Err(MenuError::validation(
            field,
            format!("'{name}' must not contain a backslash"),
        ));
    }
    Ok(())
}

pub fn validate_tool_path(tool_path: &str) -> Result<()> {
    if tool_path.trim().is_empty() {
        return Err(MenuError::validation("tool path", "must not be empty"));
    }
    Ok(())
}

pub fn validate_contexts(contexts: &BTreeSet<ScriptContext>) -> Result<()> {
    if contexts.is_empty() {
        return Err(MenuError::validation(
            "contexts",
            "at least one of file or directory is required",
        ));
    }
    Ok(())
}
