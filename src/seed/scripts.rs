//! Post-seed script execution.
use std::collections::BTreeMap;
use std::path::Path;

use super::{PROFILE_ENV, PROFILE_PATH_ENV, ScriptOutcome, ScriptReport, Seeder};
use crate::condition;
use crate::error::ScriptError;
use crate::exec::{self, ExecResult};
use crate::logging::{ItemStatus, SeedItem};
use crate::profile::{Profile, ScriptConfig};
use crate::variables::{ENV_PREFIX, VariableContext, scalar_to_env};

/// Build the environment for a script owned by `profile`.
///
/// Layers, later winning: `base` (the inherited environment), every scalar
/// context variable as `ADT_VAR_<NAME>`, the profile's `[scripts.env]`, and
/// finally `ADT_PROFILE` / `ADT_PROFILE_PATH`.
#[must_use]
pub fn script_environment(
    base: &BTreeMap<String, String>,
    ctx: &VariableContext,
    profile: &Profile,
) -> BTreeMap<String, String> {
    let mut env = base.clone();

    for (key, value) in ctx {
        if let Some(value) = scalar_to_env(value) {
            env.insert(format!("{ENV_PREFIX}{}", env_key(key)), value);
        }
    }

    env.extend(
        profile
            .script_env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    env.insert(PROFILE_ENV.to_string(), profile.name.clone());
    env.insert(
        PROFILE_PATH_ENV.to_string(),
        profile.path.display().to_string(),
    );
    env
}

/// `project-name` → `PROJECT_NAME`.
fn env_key(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

impl Seeder<'_> {
    /// Run every script of every profile, in chain order.
    pub(super) fn run_scripts(&self, profiles: &[Profile]) -> Vec<ScriptReport> {
        let all: Vec<(&Profile, &ScriptConfig)> = profiles
            .iter()
            .flat_map(|p| p.scripts.iter().map(move |s| (p, s)))
            .collect();
        if all.is_empty() {
            return Vec::new();
        }

        self.log.stage("Post-seed scripts");

        if self.options.dry_run {
            return all
                .into_iter()
                .map(|(profile, script)| {
                    self.log.dry_run(&format!(
                        "would run {} ({})",
                        script.display_name(),
                        profile.name
                    ));
                    self.script_report(profile, script, ScriptOutcome::WouldRun)
                })
                .collect();
        }

        if !self.confirmed(&all) {
            self.log.info("Skipping post-seed scripts");
            return all
                .into_iter()
                .map(|(profile, script)| {
                    self.script_report(profile, script, ScriptOutcome::Declined)
                })
                .collect();
        }

        all.into_iter()
            .map(|(profile, script)| {
                let outcome = self.run_script(profile, script);
                self.script_report(profile, script, outcome)
            })
            .collect()
    }

    /// Ask once for the whole list unless confirmation is off or pre-authorized.
    fn confirmed(&self, all: &[(&Profile, &ScriptConfig)]) -> bool {
        if !self.options.confirm_scripts || self.options.yes {
            return true;
        }
        self.log.info("The following scripts will run:");
        for (profile, script) in all {
            self.log
                .info(&format!("  {} ({})", script.display_name(), profile.name));
        }
        self.prompt
            .confirm(&format!("Run {} post-seed script(s)?", all.len()))
    }

    fn run_script(&self, profile: &Profile, script: &ScriptConfig) -> ScriptOutcome {
        if !condition::evaluate_opt(script.condition.as_deref(), self.ctx, &self.project_dir) {
            return ScriptOutcome::SkippedByCondition;
        }

        self.log.info(&format!("Running {}", script.display_name()));
        let env = script_environment(&self.environment, self.ctx, profile);
        match execute(&script.path, &self.project_dir, &env, self.options.script_output) {
            Ok(result) if result.success => ScriptOutcome::Succeeded,
            Ok(result) => {
                let err = ScriptError::Failed {
                    path: script.path.display().to_string(),
                    code: result.code.unwrap_or(-1),
                };
                self.log.debug(&err.to_string());
                ScriptOutcome::Failed { code: result.code }
            }
            Err(e) => ScriptOutcome::Error(e.to_string()),
        }
    }

    fn script_report(
        &self,
        profile: &Profile,
        script: &ScriptConfig,
        outcome: ScriptOutcome,
    ) -> ScriptReport {
        let name = script.display_name();
        let message = match &outcome {
            ScriptOutcome::Succeeded => None,
            ScriptOutcome::Failed { code: Some(code) } => Some(format!("exit {code}")),
            ScriptOutcome::Failed { code: None } => Some("terminated by signal".to_string()),
            ScriptOutcome::Error(e) => Some(e.clone()),
            ScriptOutcome::SkippedByCondition => Some("condition".to_string()),
            ScriptOutcome::Declined => Some("declined".to_string()),
            ScriptOutcome::WouldRun => Some("would run".to_string()),
        };
        if let Some(msg) = &message
            && outcome.item_status() == ItemStatus::Failed
        {
            self.log.error(&format!("{name}: {msg}"));
        }
        self.log.record(
            SeedItem::script(&profile.name, &name, outcome.item_status())
                .with_detail(message.as_deref()),
        );
        ScriptReport {
            profile: profile.name.clone(),
            script: name,
            outcome,
        }
    }
}

/// Make the script executable and run it from `cwd`.
fn execute(
    path: &Path,
    cwd: &Path,
    env: &BTreeMap<String, String>,
    mode: exec::OutputMode,
) -> Result<ExecResult, ScriptError> {
    if !path.is_file() {
        return Err(ScriptError::NotFound(path.display().to_string()));
    }
    let path = std::fs::canonicalize(path).map_err(|source| ScriptError::Spawn {
        path: path.display().to_string(),
        source,
    })?;
    exec::ensure_executable(&path)?;
    exec::run_script(&path, cwd, env, mode)
}
