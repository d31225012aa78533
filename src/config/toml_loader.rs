//! TOML file loading shared by config files, profile manifests and `pyproject.toml`.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Load and deserialize a TOML file.
///
/// Returns `Ok(None)` when the file does not exist so callers can treat a
/// missing file as "nothing configured" rather than as a failure.
///
/// # Type Parameters
///
/// - `T`: Target type to deserialize the document into
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file exists but cannot be read, and
/// [`ConfigError::Parse`] if it is not valid TOML for `T`.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    parse_toml(path, &content).map(Some)
}

/// Deserialize TOML text, attributing failures to `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if `content` is not valid TOML for `T`.
pub fn parse_toml<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.message().to_string(),
    })
}
