//! Managed storage for copied script and icon files.
//!
//! Stored names derive from the script id (`{id}.py`, `{id}_icon.ico`), so
//! two scripts can never collide even when their originals share a name.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use super::ScriptId;
use crate::error::{MenuError, Result};

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of a stored artifact; names that would leave the storage
    /// directory are refused.
    pub fn path_of(&self, stored_name: &str) -> Result<PathBuf> {
        if !is_plain_name(stored_name) {
            return Err(MenuError::validation(
                "stored file",
                format!("'{stored_name}' is not a managed artifact name"),
            ));
        }
        Ok(self.dir.join(stored_name))
    }

    pub fn script_name(id: &ScriptId, source: &Path) -> String {
        format!("{id}{}", extension_suffix(source))
    }

    pub fn icon_name(id: &ScriptId, source: &Path) -> String {
        format!("{id}_icon{}", extension_suffix(source))
    }

    /// Copies the script source in and returns its stored name.
    pub fn store_script(&self, id: &ScriptId, source: &Path) -> Result<String> {
        self.copy_in(source, Self::script_name(id, source))
    }

    /// Copies the icon in and returns its stored name.
    pub fn store_icon(&self, id: &ScriptId, source: &Path) -> Result<String> {
        self.copy_in(source, Self::icon_name(id, source))
    }

    /// Deletes a stored artifact; a missing file is not an error.
    pub fn remove(&self, stored_name: &str) -> Result<()> {
        let path = self.path_of(stored_name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(MenuError::io(path, err)),
        }
    }

    fn copy_in(&self, source: &Path, stored_name: String) -> Result<String> {
        fs::create_dir_all(&self.dir).map_err(|err| MenuError::io(&self.dir, err))?;
        let dest = self.path_of(&stored_name)?;
        fs::copy(source, &dest).map_err(|err| MenuError::io(source, err))?;
        Ok(stored_name)
    }
}

/// Ensures a source file exists before any side effect is attempted.
pub fn require_file(field: &'static str, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(MenuError::validation(
            field,
            format!("{} is not a readable file", path.display()),
        ))
    }
}

/// Checks that a recorded artifact name is one this store would have
/// derived for `id`: a single file name with stem `{id}` or `{id}_icon`.
pub fn check_owned_name(
    field: &'static str,
    id: &ScriptId,
    stored_name: &str,
    icon: bool,
) -> Result<()> {
    let expected = if icon {
        format!("{id}_icon")
    } else {
        id.to_string()
    };
    let stem = Path::new(stored_name).file_stem().and_then(|stem| stem.to_str());
    if is_plain_name(stored_name) && stem == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(MenuError::validation(
            field,
            format!("'{stored_name}' does not belong to script {id}"),
        ))
    }
}

fn is_plain_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn extension_suffix(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
