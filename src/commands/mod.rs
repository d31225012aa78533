pub mod config;
pub mod profiles;
pub mod seed;
pub mod version;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::logging::Log;

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Canonical project directory.
    pub project_dir: PathBuf,
    /// Merged configuration.
    pub config: Config,
}

impl CommandSetup {
    /// Resolve the project directory and load configuration.
    ///
    /// Unreadable config files are reported as warnings and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the project directory does not exist.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let project_dir = match &global.project_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("determining current directory")?,
        };
        let project_dir = std::fs::canonicalize(&project_dir)
            .with_context(|| format!("project directory {}", project_dir.display()))?;

        let (config, warnings) = Config::load(&project_dir, global.config.as_deref());
        for warning in &warnings {
            log.warn(&warning.to_string());
        }
        for path in &config.loaded_from {
            log.debug(&format!("config: {}", path.display()));
        }

        Ok(Self {
            project_dir,
            config,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::MemoryLog;
    use std::fs;

    #[test]
    fn setup_uses_explicit_config_and_project_dir() {
        let project = tempfile::tempdir().unwrap();
        let config_file = project.path().join("adt.toml");
        fs::write(&config_file, "[seed]\ndefault_profile = \"python\"\n").unwrap();

        let global = GlobalOpts {
            project_dir: Some(project.path().to_path_buf()),
            config: Some(config_file.clone()),
        };
        let log = MemoryLog::new();
        let setup = CommandSetup::init(&global, &log).unwrap();

        assert_eq!(setup.project_dir, fs::canonicalize(project.path()).unwrap());
        assert_eq!(setup.config.default_profile.as_deref(), Some("python"));
        assert!(log.entries().iter().all(|e| !matches!(e, crate::logging::LogEntry::Warn(_))));
    }

    #[test]
    fn broken_config_is_a_warning() {
        let project = tempfile::tempdir().unwrap();
        let config_file = project.path().join("adt.toml");
        fs::write(&config_file, "[seed\n").unwrap();

        let global = GlobalOpts {
            project_dir: Some(project.path().to_path_buf()),
            config: Some(config_file),
        };
        let log = MemoryLog::new();
        let setup = CommandSetup::init(&global, &log).unwrap();

        assert_eq!(setup.config, Config::default());
        assert!(log.contains("adt.toml"));
    }

    #[test]
    fn missing_project_dir_is_an_error() {
        let global = GlobalOpts {
            project_dir: Some(PathBuf::from("/definitely/not/here")),
            config: None,
        };
        assert!(CommandSetup::init(&global, &MemoryLog::new()).is_err());
    }
}
