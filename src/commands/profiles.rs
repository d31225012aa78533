//! `adt seed --list` and `adt seed --info`.
use anyhow::Result;

use crate::config::Config;
use crate::logging::Log;
use crate::profile;

/// Log every profile reachable by name, with its description.
pub fn list(config: &Config, log: &dyn Log) {
    log.stage("Available profiles");

    let names = config.list_profiles();
    if names.is_empty() {
        log.info("No profiles configured");
        log.info("To add profiles, either:");
        log.info("  1. set [seed] profiles_dir in ~/.config/adt/config.toml");
        log.info("  2. add entries to [sources] in the same file");
        return;
    }

    for name in &names {
        match profile::load(name, config) {
            Ok(p) if p.description.is_empty() => log.info(&format!("{name}: (no description)")),
            Ok(p) => log.info(&format!("{name}: {}", p.description)),
            Err(e) => {
                log.info(&format!("{name}: (error loading)"));
                log.debug(&e.to_string());
            }
        }
    }

    if let Some(default) = &config.default_profile {
        log.info(&format!("Default profile: {default}"));
    }
}

/// Log the details of one profile and any validation warnings.
///
/// # Errors
///
/// Returns an error if the profile cannot be found or its manifest is invalid.
pub fn info(name: &str, config: &Config, log: &dyn Log) -> Result<()> {
    let p = profile::load(name, config)?;

    log.stage(&format!("Profile: {}", p.name));
    if !p.description.is_empty() {
        log.info(&format!("Description: {}", p.description));
    }
    log.info(&format!("Version: {}", p.version));
    log.info(&format!("Path: {}", p.path.display()));
    if !p.extends.is_empty() {
        log.info(&format!("Extends: {}", p.extends.join(", ")));
    }

    if !p.variables.is_empty() {
        log.stage("Variables");
        for (key, value) in &p.variables {
            let help = p
                .variables_meta
                .get(key)
                .and_then(|meta| meta.get("description"))
                .and_then(toml::Value::as_str)
                .map_or_else(String::new, |d| format!("  # {d}"));
            log.info(&format!("{key} = {value}{help}"));
        }
    }

    if !p.file_mappings.is_empty() {
        log.stage("Template files");
        for mapping in &p.file_mappings {
            let mut line = mapping.dest.clone();
            if mapping.is_template {
                line.push_str(" (template)");
            }
            if let Some(condition) = &mapping.condition {
                line.push_str(&format!(" [if {condition}]"));
            }
            log.info(&line);
        }
    }

    if !p.scripts.is_empty() {
        log.stage("Scripts");
        for script in &p.scripts {
            match &script.condition {
                Some(condition) => {
                    log.info(&format!("{} [if {condition}]", script.display_name()));
                }
                None => log.info(&script.display_name()),
            }
        }
    }

    for warning in profile::validate(&p) {
        log.warn(&warning.to_string());
    }
    Ok(())
}
