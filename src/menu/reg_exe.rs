//! Windows registry backend driven through the stock `reg.exe` tool.
//!
//! `reg.exe` messages are localized, so a failed call never decides on its
//! own that a key is absent. Absence is read from the parent's sub-key
//! listing, whose key paths are the same in every language.

use std::process::{Command, Output};

use super::{
    KeyPath, MenuStore, Prune, StoreError, StoreErrorKind, StoreResult, COMMAND_KEY, ICON_VALUE,
    LABEL_VALUE, SUBCOMMANDS_VALUE,
};

pub const DEFAULT_HIVE: &str = "HKCU\\Software\\Classes";

#[derive(Debug, Clone)]
pub struct RegExeMenuStore {
    hive: String,
    program: String,
}

enum Query {
    Found(Vec<String>),
    Missing,
}

impl RegExeMenuStore {
    pub fn new(hive: impl Into<String>) -> Self {
        Self {
            hive: hive.into(),
            program: "reg".into(),
        }
    }

    /// Overrides the `reg` executable (useful for shims and wrappers).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn full_key(&self, key: &KeyPath) -> String {
        if key.is_empty() {
            self.hive.clone()
        } else {
            format!("{}\\{}", self.hive, key)
        }
    }

    fn run(&self, args: &[&str]) -> StoreResult<Output> {
        Command::new(&self.program).args(args).output().map_err(|err| {
            StoreError::new(
                StoreErrorKind::Io,
                format!("failed to spawn {}: {err}", self.program),
            )
        })
    }

    fn set_value(&self, key: &KeyPath, name: &str, data: &str) -> StoreResult<()> {
        let full = self.full_key(key);
        let mut args = vec!["add", full.as_str()];
        if name.is_empty() {
            args.push("/ve");
        } else {
            args.extend(["/v", name]);
        }
        args.extend(["/t", "REG_SZ", "/d", data, "/f"]);
        let output = self.run(&args)?;
        check(&output)
    }

    fn create_key(&self, key: &KeyPath) -> StoreResult<()> {
        let full = self.full_key(key);
        let output = self.run(&["add", full.as_str(), "/f"])?;
        check(&output)
    }

    fn query_output(&self, key: &KeyPath) -> StoreResult<Output> {
        let full = self.full_key(key);
        self.run(&["query", full.as_str()])
    }

    fn query(&self, key: &KeyPath) -> StoreResult<Query> {
        let output = self.query_output(key)?;
        if output.status.success() {
            return Ok(Query::Found(parse_subkeys(&String::from_utf8_lossy(
                &output.stdout,
            ))));
        }
        if self.exists(key)? {
            Err(classify(&output))
        } else {
            Ok(Query::Missing)
        }
    }

    /// Whether `key` is listed under its parent. The hive itself is assumed
    /// to exist.
    fn exists(&self, key: &KeyPath) -> StoreResult<bool> {
        let (Some(parent), Some(name)) = (key.parent(), key.parts().last()) else {
            return Ok(true);
        };
        match self.query(&parent)? {
            Query::Found(children) => Ok(children
                .iter()
                .any(|child| child.eq_ignore_ascii_case(name))),
            Query::Missing => Ok(false),
        }
    }

    /// Value names set directly on `key`.
    fn value_names(&self, key: &KeyPath) -> StoreResult<Vec<String>> {
        let output = self.query_output(key)?;
        if output.status.success() {
            return Ok(parse_value_names(&String::from_utf8_lossy(&output.stdout)));
        }
        if self.exists(key)? {
            Err(classify(&output))
        } else {
            Ok(Vec::new())
        }
    }

    /// `reg delete` is recursive, so callers must verify emptiness first.
    fn delete_key(&self, key: &KeyPath) -> StoreResult<()> {
        let full = self.full_key(key);
        let output = self.run(&["delete", full.as_str(), "/f"])?;
        if output.status.success() || !self.exists(key)? {
            return Ok(());
        }
        Err(classify(&output))
    }

    fn delete_childless(&self, key: &KeyPath) -> StoreResult<Prune> {
        match self.query(key)? {
            Query::Missing => Ok(Prune::Absent),
            Query::Found(children) if !children.is_empty() => Ok(Prune::Occupied),
            Query::Found(_) => {
                self.delete_key(key)?;
                Ok(Prune::Deleted)
            }
        }
    }
}

impl MenuStore for RegExeMenuStore {
    fn ensure_group(&mut self, key: &KeyPath, label: &str) -> StoreResult<()> {
        self.set_value(key, LABEL_VALUE, label)?;
        self.set_value(key, SUBCOMMANDS_VALUE, "")
    }

    fn set_leaf(
        &mut self,
        key: &KeyPath,
        label: &str,
        command: &str,
        icon: Option<&str>,
    ) -> StoreResult<()> {
        self.set_value(key, "", label)?;
        match icon {
            Some(icon) => self.set_value(key, ICON_VALUE, icon)?,
            None => {
                let stale = self
                    .value_names(key)?
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(ICON_VALUE));
                if stale {
                    let full = self.full_key(key);
                    let output = self.run(&["delete", full.as_str(), "/v", ICON_VALUE, "/f"])?;
                    check(&output)?;
                }
            }
        }
        let command_key = key.join(COMMAND_KEY);
        self.create_key(&command_key)?;
        self.set_value(&command_key, "", command)
    }

    fn delete_leaf(&mut self, key: &KeyPath) -> StoreResult<()> {
        self.delete_childless(&key.join(COMMAND_KEY))?;
        match self.delete_childless(key)? {
            Prune::Occupied => Err(StoreError::new(
                StoreErrorKind::NotEmpty,
                format!("{} has child keys other than '{COMMAND_KEY}'", self.full_key(key)),
            )),
            Prune::Deleted | Prune::Absent => Ok(()),
        }
    }

    fn list_children(&self, key: &KeyPath) -> StoreResult<Vec<String>> {
        match self.query(key)? {
            Query::Found(children) => Ok(children),
            Query::Missing => Ok(Vec::new()),
        }
    }

    fn delete_if_empty(&mut self, key: &KeyPath) -> StoreResult<Prune> {
        self.delete_childless(key)
    }
}

fn check(output: &Output) -> StoreResult<()> {
    if output.status.success() {
        Ok(())
    } else {
        Err(classify(output))
    }
}

fn stderr_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    }
}

fn classify(output: &Output) -> StoreError {
    let message = stderr_text(output);
    StoreError::new(error_kind(&message), message)
}

/// Best-effort kind from an English `reg.exe` message. Other languages fall
/// back to `Io` with the original text; absence never depends on this.
fn error_kind(message: &str) -> StoreErrorKind {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("access is denied") {
        StoreErrorKind::PermissionDenied
    } else if lowered.contains("being used by another process") {
        StoreErrorKind::Busy
    } else {
        StoreErrorKind::Io
    }
}

/// Extracts immediate sub-key names from `reg query` output.
///
/// The first `HKEY_` line names the queried key itself; the following ones
/// are its children.
fn parse_subkeys(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("HKEY_"))
        .skip(1)
        .filter_map(|line| line.rsplit('\\').next())
        .map(str::to_string)
        .collect()
}

/// Extracts value names from `reg query` output.
///
/// Value lines are indented and carry a `REG_*` type column, which is not
/// localized. Only the block of the queried key itself is read.
fn parse_value_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("HKEY_"))
        .skip(1)
        .take_while(|line| !line.trim_start().starts_with("HKEY_"))
        .filter_map(|line| {
            let (name, rest) = line.trim().split_once("    ")?;
            rest.trim_start().starts_with("REG_").then(|| name.to_string())
        })
        .collect()
}
