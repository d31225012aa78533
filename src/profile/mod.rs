//! Profiles: named, inheritable bundles of templates, scripts and variables.
//!
//! A profile is a directory containing an optional `profile.toml`, a
//! `templates/` tree of files to seed and a `scripts/` directory of post-seed
//! hooks. Loading is handled by [`load`], inheritance expansion by
//! [`resolve_chain`], and sanity checks by [`validate`].
mod builtin;
mod chain;
mod loader;
mod manifest;
mod validation;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use builtin::{BUILTIN_PROFILE, builtin};
pub use chain::{resolve_chain, resolve_chain_with};
pub use loader::{load, load_from_dir};
pub use validation::{ValidationWarning, validate};

/// Suffix marking a source file as a template to render.
pub const TEMPLATE_SUFFIX: &str = ".j2";

/// Path components skipped during template discovery.
pub const IGNORED_DIRS: &[&str] = &["__pycache__"];

/// Version reported for profiles whose manifest omits one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// A loaded profile. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Profile name (manifest `name`, else the directory's base name).
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Profile version string.
    pub version: String,
    /// Directory that owns this profile's templates and scripts.
    pub path: PathBuf,
    /// Parent profiles, in declared order.
    pub extends: Vec<String>,
    /// Variables declared by this profile.
    pub variables: BTreeMap<String, toml::Value>,
    /// Per-variable descriptors from `[variables.meta]`. Documentation only.
    pub variables_meta: BTreeMap<String, toml::Table>,
    /// Files to seed, either declared or discovered under `templates/`.
    pub file_mappings: Vec<FileMapping>,
    /// Post-seed scripts, either declared or discovered under `scripts/`.
    pub scripts: Vec<ScriptConfig>,
    /// Extra environment for this profile's scripts.
    pub script_env: BTreeMap<String, String>,
    /// Named condition snippets. Documentation only.
    pub conditions: BTreeMap<String, String>,
}

impl Profile {
    /// A profile with no manifest: named after its directory, everything else empty.
    #[must_use]
    pub fn minimal(path: &Path) -> Self {
        Self {
            name: dir_name(path),
            description: String::new(),
            version: DEFAULT_VERSION.to_string(),
            path: path.to_path_buf(),
            extends: Vec::new(),
            variables: BTreeMap::new(),
            variables_meta: BTreeMap::new(),
            file_mappings: Vec::new(),
            scripts: Vec::new(),
            script_env: BTreeMap::new(),
            conditions: BTreeMap::new(),
        }
    }

    /// Whether this profile is compiled into the binary rather than loaded
    /// from a directory.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    /// The `templates/` directory of this profile.
    #[must_use]
    pub fn templates_dir(&self) -> PathBuf {
        self.path.join("templates")
    }

    /// The `scripts/` directory of this profile.
    #[must_use]
    pub fn scripts_dir(&self) -> PathBuf {
        self.path.join("scripts")
    }
}

/// One source file to seed into the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMapping {
    /// Absolute or profile-anchored path of the source file.
    pub source: PathBuf,
    /// Destination relative to the project directory, `/`-separated.
    pub dest: String,
    /// Optional inclusion condition.
    pub condition: Option<String>,
    /// Whether the source is rendered through the template engine.
    pub is_template: bool,
    /// Content compiled into the binary. When set, `source` is only a label.
    pub embedded: Option<&'static str>,
}

/// One post-seed script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptConfig {
    /// Path of the script file.
    pub path: PathBuf,
    /// Optional inclusion condition.
    pub condition: Option<String>,
}

impl ScriptConfig {
    /// File name of the script, for display.
    #[must_use]
    pub fn display_name(&self) -> String {
        dir_name(&self.path)
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn minimal_profile_is_named_after_directory() {
        let p = Profile::minimal(Path::new("/profiles/python"));
        assert_eq!(p.name, "python");
        assert_eq!(p.version, DEFAULT_VERSION);
        assert!(p.extends.is_empty());
        assert_eq!(p.templates_dir(), Path::new("/profiles/python/templates"));
        assert_eq!(p.scripts_dir(), Path::new("/profiles/python/scripts"));
    }

    #[test]
    fn script_display_name_is_file_name() {
        let s = ScriptConfig {
            path: PathBuf::from("/p/scripts/01-init.sh"),
            condition: None,
        };
        assert_eq!(s.display_name(), "01-init.sh");
    }
}
