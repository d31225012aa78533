//! Target-project manifest (`pyproject.toml`) access.
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::LazyLock;
use std::time::SystemTime;

/// Package manifest read from the target project.
pub const PROJECT_MANIFEST: &str = "pyproject.toml";

/// File pinning the language version.
pub const VERSION_PIN_FILE: &str = ".python-version";

/// Language version used when nothing else can be detected.
pub const FALLBACK_PYTHON_VERSION: &str = "3.12";

/// Project version used when the manifest declares none.
pub const FALLBACK_PROJECT_VERSION: &str = "0.1.0";

static VERSION_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(\d+\.\d+)").ok());

/// Memoized parses of `pyproject.toml` files, keyed by path and mtime.
///
/// A file whose modification time changes is re-read on the next lookup.
/// Missing or unparsable files read as an empty table.
#[derive(Debug, Default)]
pub struct ManifestCache {
    entries: RefCell<HashMap<PathBuf, (Option<SystemTime>, Rc<toml::Table>)>>,
}

impl ManifestCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed manifest of the project rooted at `project_dir`.
    #[must_use]
    pub fn manifest(&self, project_dir: &Path) -> Rc<toml::Table> {
        self.get(&project_dir.join(PROJECT_MANIFEST))
    }

    /// Parsed contents of the TOML file at `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Rc<toml::Table> {
        let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let modified = std::fs::metadata(&key).and_then(|m| m.modified()).ok();

        if let Some((cached_mtime, table)) = self.entries.borrow().get(&key)
            && *cached_mtime == modified
        {
            return Rc::clone(table);
        }

        let table = Rc::new(read_table(&key));
        self.entries
            .borrow_mut()
            .insert(key, (modified, Rc::clone(&table)));
        table
    }

    /// Number of distinct files held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_table(path: &Path) -> toml::Table {
    match crate::config::toml_loader::load_toml::<toml::Table>(path) {
        Ok(table) => table.unwrap_or_default(),
        Err(e) => {
            tracing::debug!("ignoring unreadable project manifest: {e}");
            toml::Table::new()
        }
    }
}

/// The `[project]` table of a manifest, if any.
#[must_use]
pub fn project_table(manifest: &toml::Table) -> Option<&toml::Table> {
    manifest.get("project").and_then(toml::Value::as_table)
}

/// A string field of the `[project]` table.
#[must_use]
pub fn project_str<'a>(manifest: &'a toml::Table, key: &str) -> Option<&'a str> {
    project_table(manifest)
        .and_then(|p| p.get(key))
        .and_then(toml::Value::as_str)
        .filter(|s| !s.is_empty())
}

/// The `[tool.adt.variables]` table of a manifest.
#[must_use]
pub fn tool_variables(manifest: &toml::Table) -> Option<&toml::Table> {
    manifest
        .get("tool")
        .and_then(|t| t.get("adt"))
        .and_then(|t| t.get("variables"))
        .and_then(toml::Value::as_table)
}

/// Detect the `major.minor` language version of a project.
///
/// Tries the version-pin file, then the first `N.N` in
/// `[project] requires-python`, then [`FALLBACK_PYTHON_VERSION`].
#[must_use]
pub fn detect_python_version(project_dir: &Path, manifest: &toml::Table) -> String {
    if let Ok(pinned) = std::fs::read_to_string(project_dir.join(VERSION_PIN_FILE)) {
        let mut parts = pinned.trim().split('.');
        if let (Some(major), Some(minor)) = (parts.next(), parts.next()) {
            return format!("{major}.{minor}");
        }
    }

    if let Some(requires) = project_str(manifest, "requires-python")
        && let Some(re) = VERSION_RE.as_ref()
        && let Some(m) = re.captures(requires).and_then(|c| c.get(1))
    {
        return m.as_str().to_string();
    }

    FALLBACK_PYTHON_VERSION.to_string()
}
