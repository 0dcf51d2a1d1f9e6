//! Catalog CRUD kept in step with the menu registry.
//!
//! Resolved menu paths depend on current catalog state, so every mutation
//! that moves a script follows the same order: resolve and remove the old
//! entries, mutate, persist, resolve again and add the new entries. The
//! catalog is the source of truth; registry failures are reported in the
//! returned [`ScriptSync`] values and never roll back a logical change.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use uuid::Uuid;

use super::artifacts::require_file;
use super::journal::{PendingTransition, ScriptTransition, TransitionIntent, TransitionJournal};
use super::sync::{ContextFailure, MenuTargets, ScriptSync, SyncAction, SyncReport};
use super::{
    launch_command, validate_contexts, validate_name, validate_tool_path, ArtifactStore, Catalog,
    Category, CategoryId, Script, ScriptContext, ScriptId, DEFAULT_MENU_ROOT, DEFAULT_TOOL_PATH,
};
use crate::activity::{ActivityLog, EventType};
use crate::error::{MenuError, Result};
use crate::menu::{MenuPathRegistry, MenuStore};
use crate::workspace::WorkspaceLayout;

/// Settings the store needs from the application config.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub menu_root: String,
    /// Tool path written into a freshly created catalog.
    pub default_tool_path: String,
    pub shim_path: Option<PathBuf>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            menu_root: DEFAULT_MENU_ROOT.to_string(),
            default_tool_path: DEFAULT_TOOL_PATH.to_string(),
            shim_path: None,
        }
    }
}

/// Request to attach a new script.
#[derive(Debug, Clone)]
pub struct NewScript {
    pub source: PathBuf,
    pub name: String,
    pub category: Option<CategoryId>,
    pub contexts: BTreeSet<ScriptContext>,
    pub icon: Option<PathBuf>,
}

/// Field changes for [`CatalogStore::update_script`]; `None` keeps a field.
#[derive(Debug, Clone, Default)]
pub struct ScriptUpdate {
    pub name: Option<String>,
    /// `Some(None)` moves the script to the menu root.
    pub category: Option<Option<CategoryId>>,
    pub contexts: Option<BTreeSet<ScriptContext>>,
    /// New icon source file to copy into storage.
    pub icon: Option<PathBuf>,
    pub clear_icon: bool,
}

/// Field changes for [`CatalogStore::update_category`]; `None` keeps a field.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    /// `Some(None)` makes the category a root category.
    pub parent: Option<Option<CategoryId>>,
}

pub struct CatalogStore<S> {
    catalog: Catalog,
    registry: MenuPathRegistry<S>,
    layout: WorkspaceLayout,
    artifacts: ArtifactStore,
    journal: TransitionJournal,
    activity: ActivityLog,
    options: StoreOptions,
    recovered: Vec<ScriptSync>,
}

impl<S: MenuStore> CatalogStore<S> {
    /// Loads (or creates) the catalog and replays interrupted transitions.
    pub fn open(layout: WorkspaceLayout, store: S, options: StoreOptions) -> Result<Self> {
        layout.ensure()?;
        let catalog = if layout.catalog_file.exists() {
            read_catalog(&layout.catalog_file)?
        } else {
            Catalog::new(options.default_tool_path.clone())
        };
        let mut this = Self {
            catalog,
            registry: MenuPathRegistry::new(store),
            artifacts: ArtifactStore::new(&layout.scripts_dir),
            journal: TransitionJournal::new(&layout.journal_file),
            activity: ActivityLog::new(&layout.events_file),
            layout,
            options,
            recovered: Vec::new(),
        };
        if !this.layout.catalog_file.exists() {
            this.persist()?;
        }
        this.recovered = this.recover_pending()?;
        Ok(this)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn categories(&self) -> &[Category] {
        &self.catalog.categories
    }

    pub fn scripts(&self) -> &[Script] {
        &self.catalog.scripts
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.catalog.category(id)
    }

    pub fn script(&self, id: &ScriptId) -> Option<&Script> {
        self.catalog.script(id)
    }

    pub fn tool_path(&self) -> &str {
        &self.catalog.tool_path
    }

    pub fn menu_root(&self) -> &str {
        &self.options.menu_root
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn journal(&self) -> &TransitionJournal {
        &self.journal
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn registry(&self) -> &MenuPathRegistry<S> {
        &self.registry
    }

    pub fn menu_store(&self) -> &S {
        self.registry.store()
    }

    pub fn menu_store_mut(&mut self) -> &mut S {
        self.registry.store_mut()
    }

    /// Outcomes of the transitions replayed when the store was opened.
    pub fn recovered(&self) -> &[ScriptSync] {
        &self.recovered
    }

    pub fn resolve_category(&self, id: Option<CategoryId>) -> Result<Vec<String>> {
        self.catalog.category_path(id, &self.options.menu_root)
    }

    pub fn resolve_script(&self, id: &ScriptId) -> Result<Vec<String>> {
        let script = self.catalog.require_script(id)?;
        self.catalog.script_path(script, &self.options.menu_root)
    }

    /// Scripts transitively under a category.
    pub fn scripts_under(&self, id: &CategoryId) -> Result<Vec<ScriptId>> {
        self.catalog.require_category(id)?;
        Ok(self.catalog.scripts_under(*id))
    }

    pub fn add_category(&mut self, name: &str, parent: Option<CategoryId>) -> Result<CategoryId> {
        validate_name("category name", name)?;
        if let Some(parent) = parent {
            self.catalog.require_category(&parent)?;
        }
        self.catalog
            .check_sibling_name("category name", parent, name, None)?;
        let id = Uuid::new_v4();
        self.catalog.categories.push(Category {
            id,
            name: name.to_string(),
            parent,
        });
        self.persist()?;
        self.activity.record(
            EventType::CategoryAdded,
            json!({ "category_id": id, "name": name, "parent": parent }),
        );
        Ok(id)
    }

    /// Deletes a category with every script and subcategory under it.
    ///
    /// Scripts go first and subcategories recurse before the category itself
    /// is dropped, so each removal still resolves a complete ancestor chain.
    pub fn remove_category(&mut self, id: &CategoryId) -> Result<Vec<ScriptSync>> {
        self.catalog.require_category(id)?;
        let mut outcomes = Vec::new();
        for script_id in self.catalog.scripts_in(Some(*id)) {
            outcomes.push(self.remove_script(&script_id)?);
        }
        for child in self.catalog.child_categories(Some(*id)) {
            outcomes.extend(self.remove_category(&child)?);
        }
        self.catalog.categories.retain(|category| &category.id != id);
        self.persist()?;
        self.activity
            .record(EventType::CategoryRemoved, json!({ "category_id": id }));
        Ok(outcomes)
    }

    /// Renames and/or moves a category, re-registering every script under it.
    pub fn update_category(
        &mut self,
        id: &CategoryId,
        update: CategoryUpdate,
    ) -> Result<Vec<ScriptSync>> {
        self.catalog.require_category(id)?;
        if let Some(name) = &update.name {
            validate_name("category name", name)?;
        }
        if let Some(Some(parent)) = update.parent {
            self.catalog.require_category(&parent)?;
            self.catalog.check_parent(*id, parent)?;
        }

        let mut next = self.catalog.clone();
        apply_category_update(&mut next, id, &update);
        if let Some(category) = next.category(id) {
            next.check_sibling_name("category name", category.parent, &category.name, Some(*id))?;
        }
        let affected = self.catalog.scripts_under(*id);
        let mut transitions = Vec::with_capacity(affected.len());
        for script_id in &affected {
            let old = self.targets_in(&self.catalog, script_id)?;
            let new = self.targets_in(&next, script_id)?;
            transitions.push(ScriptTransition {
                script_id: *script_id,
                old: Some(old),
                new: Some(new),
            });
        }
        let transition =
            PendingTransition::new("update_category", TransitionIntent::Resync, transitions);
        self.journal.begin(&transition)?;

        let mut removals = Vec::with_capacity(affected.len());
        for entry in &transition.scripts {
            if let Some(old) = &entry.old {
                removals.push(self.unregister_targets(entry.script_id, old));
            }
        }

        apply_category_update(&mut self.catalog, id, &update);
        self.persist()?;

        let mut outcomes = Vec::with_capacity(affected.len());
        for (script_id, removal) in affected.into_iter().zip(removals) {
            let registered = self.register(&script_id)?;
            outcomes.push(ScriptSync {
                script_id,
                unregistered: Some(removal),
                registered: Some(registered),
            });
        }
        self.journal.complete(&transition.transition_id)?;
        self.activity.record(
            EventType::CategoryUpdated,
            json!({
                "category_id": id,
                "name": update.name,
                "parent": update.parent,
                "scripts": outcomes.len(),
            }),
        );
        Ok(outcomes)
    }

    /// Journals the addition, copies the script (and icon) into storage,
    /// records it and registers it for each requested context.
    ///
    /// Registration failures leave the script in the catalog; inspect the
    /// returned [`ScriptSync`] for partial or failed registration.
    pub fn add_script(&mut self, request: NewScript) -> Result<ScriptSync> {
        validate_name("script name", &request.name)?;
        validate_contexts(&request.contexts)?;
        if let Some(category) = request.category {
            self.catalog.require_category(&category)?;
        }
        require_file("script source", &request.source)?;
        if let Some(icon) = &request.icon {
            require_file("icon", icon)?;
        }

        self.catalog
            .check_sibling_name("script name", request.category, &request.name, None)?;
        let id = Uuid::new_v4();
        let script = Script {
            id,
            name: request.name.clone(),
            category: request.category,
            contexts: request.contexts.clone(),
            stored_file: ArtifactStore::script_name(&id, &request.source),
            icon: request
                .icon
                .as_ref()
                .map(|icon| ArtifactStore::icon_name(&id, icon)),
        };
        let mut next = self.catalog.clone();
        next.scripts.push(script.clone());
        let new = self.targets_in(&next, &id)?;
        let transition = PendingTransition::new(
            "add_script",
            TransitionIntent::Resync,
            vec![ScriptTransition {
                script_id: id,
                old: None,
                new: Some(new),
            }],
        );
        self.journal.begin(&transition)?;

        if let Err(err) = self.store_artifacts(&id, &request) {
            self.journal.complete(&transition.transition_id)?;
            return Err(err);
        }
        self.catalog.scripts.push(script);
        self.persist()?;
        let registered = self.register(&id)?;
        self.journal.complete(&transition.transition_id)?;

        self.activity.record(
            EventType::ScriptAdded,
            json!({
                "script_id": id,
                "name": request.name,
                "path": registered.path,
                "source": request.source,
            }),
        );
        Ok(ScriptSync {
            script_id: id,
            unregistered: None,
            registered: Some(registered),
        })
    }

    /// Applies field changes to a script.
    ///
    /// Old entries are removed using the pre-update path and contexts before
    /// the record changes; new entries are added from the post-update state.
    pub fn update_script(&mut self, id: &ScriptId, update: ScriptUpdate) -> Result<ScriptSync> {
        let current = self.catalog.require_script(id)?.clone();
        if let Some(name) = &update.name {
            validate_name("script name", name)?;
        }
        if let Some(contexts) = &update.contexts {
            validate_contexts(contexts)?;
        }
        if let Some(Some(category)) = update.category {
            self.catalog.require_category(&category)?;
        }
        if let Some(icon) = &update.icon {
            require_file("icon", icon)?;
        }

        let mut next = self.catalog.clone();
        if let Some(script) = next.script_mut(id) {
            apply_script_fields(script, &update);
        }
        if let Some(script) = next.script(id) {
            next.check_sibling_name("script name", script.category, &script.name, Some(*id))?;
        }
        let old = self.targets_in(&self.catalog, id)?;
        let new = self.targets_in(&next, id)?;

        let new_icon = match &update.icon {
            Some(icon) => Some(self.artifacts.store_icon(id, icon)?),
            None => None,
        };

        let transition = PendingTransition::new(
            "update_script",
            TransitionIntent::Resync,
            vec![ScriptTransition {
                script_id: *id,
                old: Some(old.clone()),
                new: Some(new),
            }],
        );
        self.journal.begin(&transition)?;
        let unregistered = self.unregister_targets(*id, &old);

        let mut stale_icon = None;
        if let Some(script) = self.catalog.script_mut(id) {
            apply_script_fields(script, &update);
            if new_icon.is_some() || update.clear_icon {
                stale_icon = script.icon.take().filter(|name| Some(name) != new_icon.as_ref());
                script.icon = new_icon;
            }
        }
        self.persist()?;
        if let Some(name) = stale_icon {
            self.discard_artifact(&name);
        }

        let registered = self.register(id)?;
        self.journal.complete(&transition.transition_id)?;
        self.activity.record(
            EventType::ScriptUpdated,
            json!({
                "script_id": id,
                "old_path": old.path,
                "new_path": registered.path,
                "previous_name": current.name,
            }),
        );
        Ok(ScriptSync {
            script_id: *id,
            unregistered: Some(unregistered),
            registered: Some(registered),
        })
    }

    /// Unregisters a script, then deletes its record and stored artifacts.
    pub fn remove_script(&mut self, id: &ScriptId) -> Result<ScriptSync> {
        self.catalog.require_script(id)?;
        let old = self.targets_in(&self.catalog, id)?;
        let transition = PendingTransition::new(
            "remove_script",
            TransitionIntent::Delete,
            vec![ScriptTransition {
                script_id: *id,
                old: Some(old.clone()),
                new: None,
            }],
        );
        self.journal.begin(&transition)?;
        let unregistered = self.unregister_targets(*id, &old);
        self.forget_script(id)?;
        self.journal.complete(&transition.transition_id)?;
        self.activity.record(
            EventType::ScriptRemoved,
            json!({ "script_id": id, "path": old.path }),
        );
        Ok(ScriptSync {
            script_id: *id,
            unregistered: Some(unregistered),
            registered: None,
        })
    }

    /// Removes and re-adds every script's entries from current state.
    pub fn resync(&mut self) -> Result<Vec<ScriptSync>> {
        let ids: Vec<ScriptId> = self.catalog.scripts.iter().map(|script| script.id).collect();
        let mut transitions = Vec::with_capacity(ids.len());
        for id in &ids {
            let targets = self.targets_in(&self.catalog, id)?;
            transitions.push(ScriptTransition {
                script_id: *id,
                old: Some(targets.clone()),
                new: Some(targets),
            });
        }
        let transition = PendingTransition::new("resync", TransitionIntent::Resync, transitions);
        self.journal.begin(&transition)?;
        let outcomes = self.resync_entries(&transition.scripts)?;
        self.journal.complete(&transition.transition_id)?;
        self.activity.record(
            EventType::MenuResynced,
            json!({ "scripts": outcomes.len() }),
        );
        Ok(outcomes)
    }

    /// Changes the interpreter used in command lines, optionally rewriting
    /// every registered entry.
    pub fn set_tool_path(&mut self, tool_path: &str, resync: bool) -> Result<Vec<ScriptSync>> {
        validate_tool_path(tool_path)?;
        let previous = std::mem::replace(&mut self.catalog.tool_path, tool_path.to_string());
        self.persist()?;
        self.activity.record(
            EventType::ToolPathChanged,
            json!({ "previous": previous, "tool_path": tool_path }),
        );
        if resync {
            self.resync()
        } else {
            Ok(Vec::new())
        }
    }

    /// Writes the catalog document to `path`.
    pub fn export_catalog(&self, path: &Path) -> Result<()> {
        write_catalog(path, &self.catalog)?;
        self.activity
            .record(EventType::CatalogExported, json!({ "path": path }));
        Ok(())
    }

    /// Replaces the catalog with the document at `path`.
    ///
    /// Every current script is unregistered first; every imported script is
    /// registered after the new catalog is persisted.
    pub fn import_catalog(&mut self, path: &Path) -> Result<Vec<ScriptSync>> {
        let imported = read_catalog(path)?;
        for script in &imported.scripts {
            if !self.artifacts.path_of(&script.stored_file)?.is_file() {
                tracing::warn!(
                    script_id = %script.id,
                    stored_file = %script.stored_file,
                    "imported script has no stored artifact"
                );
            }
        }

        let mut transitions = Vec::new();
        for script in &self.catalog.scripts {
            transitions.push(ScriptTransition {
                script_id: script.id,
                old: Some(self.targets_in(&self.catalog, &script.id)?),
                new: None,
            });
        }
        for script in &imported.scripts {
            transitions.push(ScriptTransition {
                script_id: script.id,
                old: None,
                new: Some(self.targets_in(&imported, &script.id)?),
            });
        }
        let transition =
            PendingTransition::new("import_catalog", TransitionIntent::Resync, transitions);
        self.journal.begin(&transition)?;

        let mut removals = HashMap::new();
        for entry in &transition.scripts {
            if let Some(old) = &entry.old {
                removals.insert(entry.script_id, self.unregister_targets(entry.script_id, old));
            }
        }
        self.catalog = imported;
        self.persist()?;

        let mut outcomes = Vec::with_capacity(transition.scripts.len());
        let ids: Vec<ScriptId> = self.catalog.scripts.iter().map(|script| script.id).collect();
        for script_id in ids {
            let registered = self.register(&script_id)?;
            outcomes.push(ScriptSync {
                script_id,
                unregistered: removals.remove(&script_id),
                registered: Some(registered),
            });
        }
        outcomes.extend(removals.into_iter().map(|(script_id, removal)| ScriptSync {
            script_id,
            unregistered: Some(removal),
            registered: None,
        }));
        self.journal.complete(&transition.transition_id)?;
        self.activity.record(
            EventType::CatalogImported,
            json!({ "path": path, "scripts": self.catalog.scripts.len() }),
        );
        Ok(outcomes)
    }

    /// Replays transitions left in the journal by an interrupted mutation.
    ///
    /// Old entries are removed; scripts still in the catalog are registered
    /// from current state and interrupted deletions are completed.
    pub fn recover_pending(&mut self) -> Result<Vec<ScriptSync>> {
        let pending = self.journal.pending()?;
        let mut outcomes = Vec::new();
        for transition in pending {
            tracing::info!(
                transition_id = %transition.transition_id,
                operation = %transition.operation,
                scripts = transition.scripts.len(),
                "recovering interrupted menu transition"
            );
            match transition.intent {
                TransitionIntent::Resync => {
                    outcomes.extend(self.resync_entries(&transition.scripts)?);
                }
                TransitionIntent::Delete => {
                    for entry in &transition.scripts {
                        let unregistered = entry
                            .old
                            .as_ref()
                            .map(|old| self.unregister_targets(entry.script_id, old));
                        if self.catalog.script(&entry.script_id).is_some() {
                            self.forget_script(&entry.script_id)?;
                        }
                        outcomes.push(ScriptSync {
                            script_id: entry.script_id,
                            unregistered,
                            registered: None,
                        });
                    }
                }
            }
            self.journal.complete(&transition.transition_id)?;
            self.activity.record(
                EventType::TransitionRecovered,
                json!({
                    "transition_id": transition.transition_id,
                    "operation": transition.operation,
                }),
            );
        }
        Ok(outcomes)
    }

    /// Removes the journaled old (and stale new) entries of each script, then
    /// registers scripts that still exist from current state.
    fn resync_entries(&mut self, entries: &[ScriptTransition]) -> Result<Vec<ScriptSync>> {
        let mut removals = Vec::with_capacity(entries.len());
        for entry in entries {
            let current = match self.catalog.script(&entry.script_id) {
                Some(_) => Some(self.targets_in(&self.catalog, &entry.script_id)?),
                None => None,
            };
            let mut removal = entry
                .old
                .as_ref()
                .map(|old| self.unregister_targets(entry.script_id, old));
            if let Some(new) = &entry.new {
                if current.as_ref() != Some(new) && entry.old.as_ref() != Some(new) {
                    let stale = self.unregister_targets(entry.script_id, new);
                    match &mut removal {
                        Some(report) => {
                            report.succeeded.extend(stale.succeeded);
                            report.failed.extend(stale.failed);
                        }
                        None => removal = Some(stale),
                    }
                }
            }
            removals.push(removal);
        }

        let mut outcomes = Vec::with_capacity(entries.len());
        for (entry, unregistered) in entries.iter().zip(removals) {
            let registered = if self.catalog.script(&entry.script_id).is_some() {
                Some(self.register(&entry.script_id)?)
            } else {
                None
            };
            outcomes.push(ScriptSync {
                script_id: entry.script_id,
                unregistered,
                registered,
            });
        }
        Ok(outcomes)
    }

    /// Menu path and contexts of a script as resolved in `catalog`.
    fn targets_in(&self, catalog: &Catalog, id: &ScriptId) -> Result<MenuTargets> {
        let script = catalog.require_script(id)?;
        Ok(MenuTargets {
            path: catalog.script_path(script, &self.options.menu_root)?,
            contexts: script.contexts.iter().copied().collect(),
        })
    }

    /// Registers a script for each of its contexts from current state.
    fn register(&mut self, id: &ScriptId) -> Result<SyncReport> {
        let targets = self.targets_in(&self.catalog, id)?;
        let script = self.catalog.require_script(id)?;
        let command = launch_command(
            &self.catalog.tool_path,
            self.options.shim_path.as_deref(),
            &self.artifacts.path_of(&script.stored_file)?,
        );
        let icon = match &script.icon {
            Some(name) => Some(self.artifacts.path_of(name)?.display().to_string()),
            None => None,
        };

        let mut report = SyncReport::new(*id, SyncAction::Register, targets.path.clone());
        for context in targets.contexts {
            match self
                .registry
                .add(&context.class(), &targets.path, &command, icon.as_deref())
            {
                Ok(()) => report.succeeded.push(context),
                Err(error) => {
                    tracing::warn!(
                        script_id = %id,
                        context = %context,
                        error = %error,
                        "failed to register menu entry"
                    );
                    report.failed.push(ContextFailure { context, error });
                }
            }
        }
        Ok(report)
    }

    fn unregister_targets(&mut self, id: ScriptId, targets: &MenuTargets) -> SyncReport {
        let mut report = SyncReport::new(id, SyncAction::Unregister, targets.path.clone());
        for context in &targets.contexts {
            match self.registry.remove(&context.class(), &targets.path) {
                Ok(()) => report.succeeded.push(*context),
                Err(error) => {
                    tracing::warn!(
                        script_id = %id,
                        context = %context,
                        error = %error,
                        "failed to remove menu entry"
                    );
                    report.failed.push(ContextFailure {
                        context: *context,
                        error,
                    });
                }
            }
        }
        report
    }

    /// Copies the script source (and icon) of a new script into storage.
    fn store_artifacts(&self, id: &ScriptId, request: &NewScript) -> Result<()> {
        let stored_file = self.artifacts.store_script(id, &request.source)?;
        if let Some(icon) = &request.icon {
            if let Err(err) = self.artifacts.store_icon(id, icon) {
                self.discard_artifact(&stored_file);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Drops a script record and its artifacts, then persists.
    fn forget_script(&mut self, id: &ScriptId) -> Result<()> {
        let Some(position) = self.catalog.scripts.iter().position(|s| &s.id == id) else {
            return Ok(());
        };
        let script = self.catalog.scripts.remove(position);
        self.discard_artifact(&script.stored_file);
        if let Some(icon) = &script.icon {
            self.discard_artifact(icon);
        }
        self.persist()
    }

    fn discard_artifact(&self, stored_name: &str) {
        if let Err(err) = self.artifacts.remove(stored_name) {
            tracing::warn!(stored_name, error = %err, "failed to delete stored artifact");
        }
    }

    fn persist(&self) -> Result<()> {
        write_catalog(&self.layout.catalog_file, &self.catalog)
    }
}

fn apply_category_update(catalog: &mut Catalog, id: &CategoryId, update: &CategoryUpdate) {
    if let Some(category) = catalog.category_mut(id) {
        if let Some(name) = &update.name {
            category.name = name.clone();
        }
        if let Some(parent) = update.parent {
            category.parent = parent;
        }
    }
}

fn apply_script_fields(script: &mut Script, update: &ScriptUpdate) {
    if let Some(name) = &update.name {
        script.name = name.clone();
    }
    if let Some(category) = update.category {
        script.category = category;
    }
    if let Some(contexts) = &update.contexts {
        script.contexts = contexts.clone();
    }
}

fn read_catalog(path: &Path) -> Result<Catalog> {
    let data = fs::read(path).map_err(|err| MenuError::io(path, err))?;
    let catalog: Catalog =
        serde_json::from_slice(&data).map_err(|err| MenuError::document(path, err))?;
    catalog.validate()?;
    Ok(catalog)
}

/// Whole-document replace: write a sibling temp file, then rename over.
fn write_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| MenuError::io(parent, err))?;
    }
    let data = serde_json::to_vec_pretty(catalog).map_err(|err| MenuError::document(path, err))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).map_err(|err| MenuError::io(&tmp, err))?;
    fs::rename(&tmp, path).map_err(|err| MenuError::io(path, err))
}
