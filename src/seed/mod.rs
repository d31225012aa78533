//! Applying a resolved profile chain to a project directory.
//!
//! [`Seeder::seed`] walks every file mapping of every profile in chain order,
//! then runs the collected post-seed scripts. Each file and each script is an
//! isolated unit: its failure is reported in the [`SeedReport`] and recorded
//! through [`Log::record`], and the run carries on with the next one.
mod files;
mod scripts;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::exec::OutputMode;
use crate::logging::{ItemStatus, Log, SeedItem};
use crate::profile::Profile;
use crate::prompt::Prompt;
use crate::variables::VariableContext;

pub use scripts::script_environment;

/// Environment key holding the name of the profile that owns a script.
pub const PROFILE_ENV: &str = "ADT_PROFILE";
/// Environment key holding the directory of the profile that owns a script.
pub const PROFILE_PATH_ENV: &str = "ADT_PROFILE_PATH";

/// Behaviour switches for one seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOptions {
    /// Replace files that already exist.
    pub overwrite: bool,
    /// Answer yes to every confirmation.
    pub yes: bool,
    /// Report what would happen without touching the filesystem.
    pub dry_run: bool,
    /// Ask once before running post-seed scripts.
    pub confirm_scripts: bool,
    /// Where script output goes.
    pub script_output: OutputMode,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            yes: false,
            dry_run: false,
            confirm_scripts: true,
            script_output: OutputMode::Inherit,
        }
    }
}

/// What happened to one file mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The mapping's condition evaluated to false.
    SkippedByCondition,
    /// The destination exists and overwriting was not requested.
    SkippedExists,
    /// The user declined to overwrite the destination.
    SkippedDeclined,
    /// A new file was written.
    Created,
    /// An existing file was replaced.
    Overwritten,
    /// Dry run: a new file would be written.
    WouldCreate,
    /// Dry run: an existing file would be replaced.
    WouldOverwrite,
    /// The mapping failed; the message says why.
    Failed(String),
}

impl FileOutcome {
    /// Short human-readable label, as printed next to the destination.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::SkippedByCondition => "skip (condition)",
            Self::SkippedExists => "skip (exists)",
            Self::SkippedDeclined => "skip (declined)",
            Self::Created => "create",
            Self::Overwritten => "overwrite",
            Self::WouldCreate => "would create",
            Self::WouldOverwrite => "would overwrite",
            Self::Failed(message) => message,
        }
    }

    /// Summary status for this outcome.
    #[must_use]
    pub const fn item_status(&self) -> ItemStatus {
        match self {
            Self::SkippedByCondition => ItemStatus::NotApplicable,
            Self::SkippedExists | Self::SkippedDeclined => ItemStatus::Skipped,
            Self::Created | Self::Overwritten => ItemStatus::Done,
            Self::WouldCreate | Self::WouldOverwrite => ItemStatus::DryRun,
            Self::Failed(_) => ItemStatus::Failed,
        }
    }
}

/// What happened to one post-seed script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// The script exited with status zero.
    Succeeded,
    /// The script exited unsuccessfully. `None` means killed by a signal.
    Failed {
        /// Exit code, if any.
        code: Option<i32>,
    },
    /// The script could not be run at all.
    Error(String),
    /// The script's condition evaluated to false.
    SkippedByCondition,
    /// The user declined to run scripts.
    Declined,
    /// Dry run: the script would be considered for execution.
    WouldRun,
}

impl ScriptOutcome {
    /// Summary status for this outcome.
    #[must_use]
    pub const fn item_status(&self) -> ItemStatus {
        match self {
            Self::Succeeded => ItemStatus::Done,
            Self::Failed { .. } | Self::Error(_) => ItemStatus::Failed,
            Self::SkippedByCondition => ItemStatus::NotApplicable,
            Self::Declined => ItemStatus::Skipped,
            Self::WouldRun => ItemStatus::DryRun,
        }
    }
}

/// Outcome of one file mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Owning profile.
    pub profile: String,
    /// Destination, relative to the project directory.
    pub dest: String,
    /// What happened.
    pub outcome: FileOutcome,
}

/// Outcome of one post-seed script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReport {
    /// Owning profile.
    pub profile: String,
    /// Script file name.
    pub script: String,
    /// What happened.
    pub outcome: ScriptOutcome,
}

/// Everything a seed run did, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// One entry per file mapping.
    pub files: Vec<FileReport>,
    /// One entry per collected script.
    pub scripts: Vec<ScriptReport>,
}

impl SeedReport {
    /// Number of files or scripts that failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Failed(_)))
            .count()
            + self
                .scripts
                .iter()
                .filter(|s| matches!(s.outcome, ScriptOutcome::Failed { .. } | ScriptOutcome::Error(_)))
                .count()
    }

    /// Outcome recorded for `dest`, if any mapping targeted it. The last
    /// mapping wins when several profiles write the same destination.
    #[must_use]
    pub fn file(&self, dest: &str) -> Option<&FileOutcome> {
        self.files
            .iter()
            .rev()
            .find(|f| f.dest == dest)
            .map(|f| &f.outcome)
    }
}

/// Applies profiles to a project directory.
pub struct Seeder<'a> {
    project_dir: PathBuf,
    ctx: &'a VariableContext,
    environment: BTreeMap<String, String>,
    log: &'a dyn Log,
    prompt: &'a dyn Prompt,
    options: SeedOptions,
}

impl std::fmt::Debug for Seeder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seeder")
            .field("project_dir", &self.project_dir)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> Seeder<'a> {
    /// A seeder writing into `project_dir` with the resolved context `ctx`.
    #[must_use]
    pub fn new(
        project_dir: &Path,
        ctx: &'a VariableContext,
        log: &'a dyn Log,
        prompt: &'a dyn Prompt,
    ) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            ctx,
            environment: BTreeMap::new(),
            log,
            prompt,
            options: SeedOptions::default(),
        }
    }

    /// Base environment handed to scripts (normally the process environment).
    #[must_use]
    pub fn with_environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    /// Replace the run options.
    #[must_use]
    pub const fn with_options(mut self, options: SeedOptions) -> Self {
        self.options = options;
        self
    }

    /// Seed every profile in order, then run their scripts.
    pub fn seed(&self, profiles: &[Profile]) -> SeedReport {
        let mut report = SeedReport::default();

        for profile in profiles {
            self.log.stage(&format!("Profile: {}", profile.name));
            if profile.file_mappings.is_empty() {
                self.log.debug("no template files");
            }
            for mapping in &profile.file_mappings {
                let outcome = self.seed_file(mapping);
                self.report_file(&profile.name, &mapping.dest, &outcome);
                report.files.push(FileReport {
                    profile: profile.name.clone(),
                    dest: mapping.dest.clone(),
                    outcome,
                });
            }
        }

        report.scripts = self.run_scripts(profiles);

        if self.options.dry_run {
            self.log.info("Dry run: no files were modified");
        }
        report
    }

    fn report_file(&self, profile: &str, dest: &str, outcome: &FileOutcome) {
        let line = format!("{} {dest}", outcome.label());
        match outcome {
            FileOutcome::WouldCreate | FileOutcome::WouldOverwrite => self.log.dry_run(&line),
            FileOutcome::Failed(message) => self.log.error(&format!("{dest}: {message}")),
            FileOutcome::SkippedByCondition => self.log.debug(&line),
            _ => self.log.info(&line),
        }
        let detail = match outcome {
            FileOutcome::Created | FileOutcome::Overwritten => None,
            other => Some(other.label()),
        };
        self.log
            .record(SeedItem::file(profile, dest, outcome.item_status()).with_detail(detail));
    }
}
