//! Maps logical menu paths onto nested store keys.
//!
//! A path `[ScriptTools, Tools, Foo]` registered for directories lands at
//! `Directory\shell\ScriptTools\shell\Tools\shell\Foo`, with the command line
//! stored in `...\Foo\command`. Every group owns a `shell` container holding
//! the next level of the menu.

use super::{ContextClass, KeyPath, MenuStore, Prune, StoreError};
use crate::error::{MenuError, Result};

/// Sub-key under each group that holds its submenu entries.
pub const CONTAINER_KEY: &str = "shell";

pub struct MenuPathRegistry<S> {
    store: S,
}

impl<S: MenuStore> MenuPathRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Key of the leaf command node for `segments`.
    pub fn leaf_key(context: &ContextClass, segments: &[String]) -> Result<KeyPath> {
        let (groups, leaf) = Self::layout(context, segments)?;
        let container = groups
            .last()
            .map(|group| group.join(CONTAINER_KEY))
            .unwrap_or_else(|| context.root_key());
        Ok(container.join(leaf.as_str()))
    }

    /// Creates every group along `segments` and writes the leaf command.
    ///
    /// Not atomic: if a later key operation fails, groups created before it
    /// stay in place.
    pub fn add(
        &mut self,
        context: &ContextClass,
        segments: &[String],
        command: &str,
        icon: Option<&str>,
    ) -> Result<()> {
        let (groups, _) = Self::layout(context, segments)?;
        for (group, label) in groups.iter().zip(segments) {
            self.store
                .ensure_group(group, label)
                .map_err(|err| store_error(context, group, err))?;
        }
        let leaf_key = Self::leaf_key(context, segments)?;
        let label = &segments[segments.len() - 1];
        self.store
            .set_leaf(&leaf_key, label, command, icon)
            .map_err(|err| store_error(context, &leaf_key, err))
    }

    /// Deletes the leaf for `segments`, then prunes groups left empty.
    ///
    /// Pruning stops at the first group that still has children, so sibling
    /// entries and keys created by other tools survive.
    pub fn remove(&mut self, context: &ContextClass, segments: &[String]) -> Result<()> {
        let (groups, _) = Self::layout(context, segments)?;
        let leaf_key = Self::leaf_key(context, segments)?;
        self.store
            .delete_leaf(&leaf_key)
            .map_err(|err| store_error(context, &leaf_key, err))?;

        for group in groups.iter().rev() {
            let container = group.join(CONTAINER_KEY);
            if self.prune(context, &container)? == Prune::Occupied {
                break;
            }
            if self.prune(context, group)? == Prune::Occupied {
                break;
            }
        }
        Ok(())
    }

    /// True when the leaf for `segments` currently has a `command` sub-key.
    pub fn is_registered(&self, context: &ContextClass, segments: &[String]) -> Result<bool> {
        let leaf_key = Self::leaf_key(context, segments)?;
        let children = self
            .store
            .list_children(&leaf_key)
            .map_err(|err| store_error(context, &leaf_key, err))?;
        Ok(children.iter().any(|child| child == super::COMMAND_KEY))
    }

    fn prune(&mut self, context: &ContextClass, key: &KeyPath) -> Result<Prune> {
        self.store
            .delete_if_empty(key)
            .map_err(|err| store_error(context, key, err))
    }

    /// Group keys for every intermediate segment, plus the leaf segment.
    fn layout<'a>(
        context: &ContextClass,
        segments: &'a [String],
    ) -> Result<(Vec<KeyPath>, &'a String)> {
        let Some((leaf, intermediate)) = segments.split_last() else {
            return Err(MenuError::validation("menu path", "path has no segments"));
        };
        for segment in segments {
            validate_segment(segment)?;
        }
        let mut container = context.root_key();
        let mut groups = Vec::with_capacity(intermediate.len());
        for segment in intermediate {
            let group = container.join(segment.as_str());
            container = group.join(CONTAINER_KEY);
            groups.push(group);
        }
        Ok((groups, leaf))
    }
}

/// Rejects segments that would split or collapse a key path.
pub(crate) fn validate_segment(segment: &str) -> Result<()> {
    if segment.trim().is_empty() {
        return Err(MenuError::validation("menu path", "empty path segment"));
    }
    if segment.contains('\\') {
        return Err(MenuError::validation(
            "menu path",
            format!("segment '{segment}' contains a backslash"),
        ));
    }
    Ok(())
}

fn store_error(context: &ContextClass, key: &KeyPath, source: StoreError) -> MenuError {
    MenuError::NativeStore {
        context: context.clone(),
        key: key.to_string(),
        source,
    }
}
