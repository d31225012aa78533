use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the project seeding tool.
#[derive(Parser, Debug)]
#[command(
    name = "adt",
    about = "Seed projects from inheritable, templated profiles",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Project directory to seed (defaults to the current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Read only this config file instead of the global and project ones
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add configuration files to a project from one or more profiles
    Seed(SeedOpts),
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Print version information
    Version,
}

/// Options for the `seed` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct SeedOpts {
    /// Profile names or paths, comma-separated for layering
    pub profiles: Option<String>,

    /// Set a variable (repeatable), e.g. --var author=Jane
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Overwrite existing files (asks for each one)
    #[arg(long)]
    pub overwrite: bool,

    /// Answer yes to every confirmation, including running scripts
    #[arg(short, long)]
    pub yes: bool,

    /// Overwrite without asking (--overwrite --yes)
    #[arg(long)]
    pub force: bool,

    /// Show what would be done without writing anything
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Seed from a one-off profile directory
    #[arg(long, value_name = "DIR", conflicts_with = "profiles")]
    pub source: Option<PathBuf>,

    /// List available profiles
    #[arg(long, conflicts_with_all = ["profiles", "source", "info"])]
    pub list: bool,

    /// Show information about a profile
    #[arg(long, value_name = "PROFILE", conflicts_with_all = ["profiles", "source"])]
    pub info: Option<String>,
}

impl SeedOpts {
    /// Whether existing files may be replaced.
    #[must_use]
    pub const fn overwrite(&self) -> bool {
        self.overwrite || self.force
    }

    /// Whether confirmations are pre-answered.
    #[must_use]
    pub const fn yes(&self) -> bool {
        self.yes || self.force
    }

    /// Requested profile identifiers, in order.
    #[must_use]
    pub fn profile_names(&self) -> Vec<String> {
        self.profiles
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Actions of the `config` subcommand.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the merged configuration and the files it came from
    Show,
    /// Write a commented configuration template to the global location
    Init,
}
