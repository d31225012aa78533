//! Layered tool configuration.
//!
//! Settings come from an optional global file followed by an optional
//! project-local file. Later files replace scalar settings and merge
//! mapping settings key by key. A file that cannot be read or parsed is
//! ignored and reported as a [`ConfigWarning`].
pub mod toml_loader;

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the project-local override file.
pub const PROJECT_CONFIG_FILE: &str = ".adt-config.toml";

/// Name of the global configuration file inside [`global_config_dir`].
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Manifest file that marks a directory as a profile.
pub const PROFILE_MANIFEST: &str = "profile.toml";

const DEFAULT_TEMPLATE: &str = r#"# adt configuration
# Global: ~/.config/adt/config.toml
# Project: .adt-config.toml

# Seed command settings
[seed]
# Default profile when none is given on the command line
# default_profile = "python"

# Base directory for profile lookup by name
# With this set, "adt seed python" looks for python/ in this directory
# profiles_dir = "~/projects/project-profiles"

# Explicit profile locations, checked before profiles_dir
[sources]
# my-profile = "~/src/my-profile"

# Global variable defaults
[variables]
# author = "Your Name"
# email = "you@example.com"
# license = "MIT"

# Behavior settings
[settings]
# confirm_scripts = true
"#;

/// Merged configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Profile used when none is requested explicitly.
    pub default_profile: Option<String>,
    /// Directory scanned for profiles by name.
    pub profiles_dir: Option<PathBuf>,
    /// Explicit name → directory overrides, consulted before `profiles_dir`.
    pub sources: BTreeMap<String, PathBuf>,
    /// Lowest-priority variable defaults, stringified.
    pub variables: BTreeMap<String, String>,
    /// Whether post-seed scripts require confirmation.
    pub confirm_scripts: bool,
    /// Files that contributed to this configuration, in load order.
    pub loaded_from: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: None,
            profiles_dir: None,
            sources: BTreeMap::new(),
            variables: BTreeMap::new(),
            confirm_scripts: true,
            loaded_from: Vec::new(),
        }
    }
}

/// A configuration file that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// File that could not be used.
    pub path: PathBuf,
    /// Why it was skipped.
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ignoring config file {}: {}", self.path.display(), self.message)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    seed: RawSeed,
    sources: BTreeMap<String, String>,
    variables: BTreeMap<String, toml::Value>,
    settings: RawSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSeed {
    default_profile: Option<String>,
    profiles_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    confirm_scripts: Option<bool>,
}

impl Config {
    /// Load configuration for a project.
    ///
    /// When `explicit` is given only that file is read. Otherwise the global
    /// file is read first and `<project_dir>/.adt-config.toml` second.
    #[must_use]
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> (Self, Vec<ConfigWarning>) {
        if let Some(path) = explicit {
            let (config, mut warnings) = Self::load_from(&[path.to_path_buf()]);
            if !path.is_file() {
                warnings.push(ConfigWarning {
                    path: path.to_path_buf(),
                    message: "file not found".to_string(),
                });
            }
            return (config, warnings);
        }

        let mut paths = Vec::with_capacity(2);
        if let Some(global) = global_config_file() {
            paths.push(global);
        }
        paths.push(project_dir.join(PROJECT_CONFIG_FILE));
        Self::load_from(&paths)
    }

    /// Merge the given files in order, skipping missing ones silently.
    #[must_use]
    pub fn load_from(paths: &[PathBuf]) -> (Self, Vec<ConfigWarning>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();

        for path in paths {
            match toml_loader::load_toml::<RawConfig>(path) {
                Ok(Some(raw)) => {
                    tracing::debug!("loaded config file {}", path.display());
                    let base = path.parent().unwrap_or_else(|| Path::new("."));
                    config.merge(raw, base);
                    config.loaded_from.push(path.clone());
                }
                Ok(None) => {}
                Err(e) => warnings.push(ConfigWarning {
                    path: path.clone(),
                    message: e.to_string(),
                }),
            }
        }

        (config, warnings)
    }

    fn merge(&mut self, raw: RawConfig, base: &Path) {
        if let Some(name) = raw.seed.default_profile {
            self.default_profile = Some(name).filter(|n| !n.is_empty());
        }
        if let Some(dir) = raw.seed.profiles_dir {
            self.profiles_dir = Some(resolve_relative(base, &dir));
        }
        for (name, dir) in raw.sources {
            self.sources.insert(name, resolve_relative(base, &dir));
        }
        for (name, value) in raw.variables {
            self.variables.insert(name, stringify(&value));
        }
        if let Some(confirm) = raw.settings.confirm_scripts {
            self.confirm_scripts = confirm;
        }
    }

    /// Locate a profile directory by name or path.
    ///
    /// Path-like identifiers (containing `/`, or starting with `.` or `~`)
    /// must name an existing directory. Names are looked up in `[sources]`
    /// first, then under `profiles_dir`.
    #[must_use]
    pub fn profile_path(&self, name_or_path: &str) -> Option<PathBuf> {
        if is_path_like(name_or_path) {
            let path = expand_tilde(name_or_path);
            return std::fs::canonicalize(&path).ok().filter(|p| p.is_dir());
        }

        if let Some(path) = self.sources.get(name_or_path) {
            return path.is_dir().then(|| path.clone());
        }

        self.profiles_dir
            .as_ref()
            .map(|dir| dir.join(name_or_path))
            .filter(|p| p.is_dir())
    }

    /// Sorted, deduplicated names of every profile reachable by name.
    #[must_use]
    pub fn list_profiles(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.sources.keys().cloned().collect();

        if let Some(dir) = &self.profiles_dir
            && let Ok(entries) = std::fs::read_dir(dir)
        {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() && path.join(PROFILE_MANIFEST).is_file() {
                    names.insert(entry.file_name().to_string_lossy().into_owned());
                }
            }
        }

        names.into_iter().collect()
    }

    /// Commented template written by `adt config init`.
    #[must_use]
    pub const fn default_template() -> &'static str {
        DEFAULT_TEMPLATE
    }
}

/// Directory holding the global configuration file.
///
/// Uses `$XDG_CONFIG_HOME/adt` when set, otherwise `~/.config/adt`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|base| base.join("adt"))
}

/// Full path of the global configuration file.
#[must_use]
pub fn global_config_file() -> Option<PathBuf> {
    global_config_dir().map(|d| d.join(GLOBAL_CONFIG_FILE))
}

/// Whether an identifier should be treated as a filesystem path.
#[must_use]
pub fn is_path_like(identifier: &str) -> bool {
    identifier.contains('/') || identifier.starts_with('.') || identifier.starts_with('~')
}

/// Expand a leading `~` to the home directory.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

fn resolve_relative(base: &Path, raw: &str) -> PathBuf {
    let path = expand_tilde(raw);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn stringify(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
