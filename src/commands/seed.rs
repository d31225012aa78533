//! Command: seed a project from profiles.
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use anyhow::Result;

use super::{CommandSetup, profiles, version};
use crate::cli::{GlobalOpts, SeedOpts};
use crate::config::{Config, expand_tilde};
use crate::error::ProfileError;
use crate::logging::{Log, Logger};
use crate::profile::{self, Profile};
use crate::prompt::{Prompt, StdinPrompt};
use crate::seed::{SeedOptions, SeedReport, Seeder};
use crate::variables::{VariableResolver, parse_cli_vars};

/// Run the seed command.
///
/// # Errors
///
/// Returns an error if the project directory is missing or the requested
/// profiles cannot be resolved. Failures of individual files or scripts are
/// reported in the summary and do not fail the command.
pub fn run(global: &GlobalOpts, opts: &SeedOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;

    if opts.list {
        profiles::list(&setup.config, log);
        return Ok(());
    }
    if let Some(name) = &opts.info {
        return profiles::info(name, &setup.config, log);
    }

    seed_project(
        &setup.project_dir,
        &setup.config,
        opts,
        process_environment(),
        log,
        &StdinPrompt,
    )?;

    log.print_summary();
    Ok(())
}

/// The process environment, minus entries whose name or value is not UTF-8.
fn process_environment() -> BTreeMap<String, String> {
    utf8_environment(std::env::vars_os())
}

fn utf8_environment(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> BTreeMap<String, String> {
    vars.into_iter()
        .filter_map(|(k, v)| match (k.into_string(), v.into_string()) {
            (Ok(k), Ok(v)) => Some((k, v)),
            (Ok(name), Err(_)) => {
                tracing::debug!("ignoring environment variable {name}: value is not UTF-8");
                None
            }
            (Err(name), _) => {
                tracing::debug!(
                    "ignoring environment variable {}: name is not UTF-8",
                    name.to_string_lossy()
                );
                None
            }
        })
        .collect()
}

/// Resolve the requested profiles and seed them into `project_dir`.
///
/// `environment` is both the source of `ADT_VAR_*` overrides and the base
/// environment for scripts.
///
/// # Errors
///
/// Returns a [`ProfileError`] when the chain cannot be resolved. Nothing is
/// written in that case. With no profile requested and no default configured
/// the built-in templates are seeded instead.
pub fn seed_project(
    project_dir: &Path,
    config: &Config,
    opts: &SeedOpts,
    environment: BTreeMap<String, String>,
    log: &dyn Log,
    prompt: &dyn Prompt,
) -> Result<SeedReport, ProfileError> {
    log.stage("Seeding project");

    let profiles = select_profiles(config, opts)?.unwrap_or_else(|| {
        log.info("No profiles configured, using built-in templates");
        vec![profile::builtin()]
    });
    log.info(&format!(
        "profiles: {}",
        profiles
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    ));

    for warning in profiles.iter().flat_map(profile::validate) {
        log.warn(&warning.to_string());
    }

    let ctx = VariableResolver::new(project_dir, &profiles, config)
        .with_cli_vars(parse_cli_vars(&opts.vars))
        .with_environment(environment.clone())
        .with_tool_version(version::version())
        .resolve();
    log.debug(&format!("{} variables in context", ctx.len()));

    let options = SeedOptions {
        overwrite: opts.overwrite(),
        yes: opts.yes(),
        dry_run: opts.dry_run,
        confirm_scripts: config.confirm_scripts,
        ..SeedOptions::default()
    };

    Ok(Seeder::new(project_dir, &ctx, log, prompt)
        .with_environment(environment)
        .with_options(options)
        .seed(&profiles))
}

/// The resolved chain for `--source`, the positional profiles, or the
/// configured default, in that order of preference. `None` when nothing is
/// requested and no default is configured.
fn select_profiles(
    config: &Config,
    opts: &SeedOpts,
) -> Result<Option<Vec<Profile>>, ProfileError> {
    if let Some(source) = &opts.source {
        let path = expand_tilde(&source.to_string_lossy());
        if !path.is_dir() {
            return Err(ProfileError::NotFound(source.display().to_string()));
        }
        return profile::resolve_chain(&[path.to_string_lossy()], config).map(Some);
    }

    let mut names = opts.profile_names();
    if names.is_empty() {
        names.extend(config.default_profile.clone());
    }
    if names.is_empty() {
        return Ok(None);
    }
    profile::resolve_chain(&names, config).map(Some)
}
