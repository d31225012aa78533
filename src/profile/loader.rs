//! Locating and loading profile directories.
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::manifest::ManifestDoc;
use super::{FileMapping, IGNORED_DIRS, Profile, ScriptConfig, TEMPLATE_SUFFIX};
use crate::config::{Config, PROFILE_MANIFEST, expand_tilde};
use crate::error::ProfileError;

/// Load a profile by directory path or by configured name.
///
/// An identifier naming an existing directory is loaded directly. Anything
/// else is resolved through [`Config::profile_path`].
///
/// # Errors
///
/// Returns [`ProfileError::NotFound`] if the identifier cannot be resolved and
/// [`ProfileError::ManifestInvalid`] if its `profile.toml` cannot be parsed.
pub fn load(identifier: &str, config: &Config) -> Result<Profile, ProfileError> {
    let direct = expand_tilde(identifier);
    if direct.is_dir() {
        return load_from_dir(&direct);
    }

    let path = config
        .profile_path(identifier)
        .ok_or_else(|| ProfileError::NotFound(identifier.to_string()))?;
    load_from_dir(&path)
}

/// Load the profile rooted at `path`.
///
/// A directory without a manifest yields a minimal profile. Declared file
/// mappings and scripts are used as-is; when none are declared they are
/// discovered from `templates/` and `scripts/`.
///
/// # Errors
///
/// Returns [`ProfileError::ManifestInvalid`] if the manifest exists but is
/// not valid, or [`ProfileError::Io`] if it cannot be read.
pub fn load_from_dir(path: &Path) -> Result<Profile, ProfileError> {
    let manifest = path.join(PROFILE_MANIFEST);

    let mut profile = if manifest.is_file() {
        let content = std::fs::read_to_string(&manifest).map_err(|source| ProfileError::Io {
            path: manifest.display().to_string(),
            source,
        })?;
        let doc: ManifestDoc =
            toml::from_str(&content).map_err(|e| ProfileError::ManifestInvalid {
                path: manifest.display().to_string(),
                message: e.message().to_string(),
            })?;
        doc.into_profile(path)
    } else {
        Profile::minimal(path)
    };

    if profile.file_mappings.is_empty() {
        profile.file_mappings = discover_templates(&profile.templates_dir());
    }
    if profile.scripts.is_empty() {
        profile.scripts = discover_scripts(&profile.scripts_dir());
    }

    tracing::debug!(
        "loaded profile '{}' from {} ({} files, {} scripts)",
        profile.name,
        path.display(),
        profile.file_mappings.len(),
        profile.scripts.len()
    );
    Ok(profile)
}

/// Every regular file under `templates_dir`, recursively, in sorted order.
fn discover_templates(templates_dir: &Path) -> Vec<FileMapping> {
    if !templates_dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(templates_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !IGNORED_DIRS
                .iter()
                .any(|ignored| e.file_name() == std::ffi::OsStr::new(ignored))
        })
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .filter_map(|e| {
            let rel = e.path().strip_prefix(templates_dir).ok()?;
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let (dest, is_template) = match rel.strip_suffix(TEMPLATE_SUFFIX) {
                Some(stripped) => (stripped.to_string(), true),
                None => (rel, false),
            };
            Some(FileMapping {
                source: e.path().to_path_buf(),
                dest,
                condition: None,
                is_template,
                embedded: None,
            })
        })
        .collect()
}

/// Non-hidden regular files directly under `scripts_dir`, sorted by file name.
fn discover_scripts(scripts_dir: &Path) -> Vec<ScriptConfig> {
    let Ok(entries) = std::fs::read_dir(scripts_dir) else {
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    paths
        .into_iter()
        .map(|path| ScriptConfig {
            path,
            condition: None,
        })
        .collect()
}
