//! Command: show or create the configuration file.
use std::path::Path;

use anyhow::{Context as _, Result, bail};

use crate::config::{Config, global_config_file};
use crate::logging::Log;

/// Log the merged configuration and where it came from.
pub fn show(config: &Config, log: &dyn Log) {
    log.stage("Configuration");

    if config.loaded_from.is_empty() {
        log.info("No config files found, using defaults");
    }
    for path in &config.loaded_from {
        log.info(&format!("loaded: {}", path.display()));
    }

    log.info(&format!(
        "default_profile: {}",
        config.default_profile.as_deref().unwrap_or("(none)")
    ));
    log.info(&format!(
        "profiles_dir: {}",
        config
            .profiles_dir
            .as_ref()
            .map_or_else(|| "(none)".to_string(), |p| p.display().to_string())
    ));
    log.info(&format!("confirm_scripts: {}", config.confirm_scripts));

    if !config.sources.is_empty() {
        log.stage("Sources");
        for (name, path) in &config.sources {
            log.info(&format!("{name} = {}", path.display()));
        }
    }

    if !config.variables.is_empty() {
        log.stage("Variables");
        for (name, value) in &config.variables {
            log.info(&format!("{name} = {value}"));
        }
    }
}

/// Write the configuration template to the global location.
///
/// # Errors
///
/// Returns an error if no home directory can be determined or the file
/// cannot be written.
pub fn init(log: &dyn Log) -> Result<()> {
    let Some(path) = global_config_file() else {
        bail!("cannot determine the global config directory");
    };
    init_at(&path, log)?;
    Ok(())
}

/// Write the configuration template to `path` unless it already exists.
///
/// Returns whether a file was created.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created.
pub fn init_at(path: &Path, log: &dyn Log) -> Result<bool> {
    if path.exists() {
        log.warn(&format!("config file already exists: {}", path.display()));
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    std::fs::write(path, Config::default_template())
        .with_context(|| format!("writing {}", path.display()))?;

    log.info(&format!("created {}", path.display()));
    Ok(true)
}
