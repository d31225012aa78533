// Shared helpers for integration tests.
//
// Provides a temporary profiles directory and project directory, plus a
// fluent builder so each integration test can lay out profiles without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use adt_cli::cli::SeedOpts;
use adt_cli::commands::seed::seed_project;
use adt_cli::config::Config;
use adt_cli::error::ProfileError;
use adt_cli::logging::MemoryLog;
use adt_cli::prompt::Prompt;
use adt_cli::seed::SeedReport;

/// A profiles directory and an empty project directory, both temporary.
pub struct ProfileRepo {
    /// Directory holding one subdirectory per profile.
    pub profiles: tempfile::TempDir,
    /// The project being seeded.
    pub project: tempfile::TempDir,
}

impl ProfileRepo {
    /// Path to the profiles directory.
    pub fn profiles_dir(&self) -> &Path {
        self.profiles.path()
    }

    /// Path to the project directory.
    pub fn project_dir(&self) -> &Path {
        self.project.path()
    }

    /// Configuration that resolves profile names against [`Self::profiles_dir`].
    pub fn config(&self) -> Config {
        Config {
            profiles_dir: Some(self.profiles.path().to_path_buf()),
            ..Config::default()
        }
    }

    /// Path of `rel` inside the project.
    pub fn project_file(&self, rel: &str) -> PathBuf {
        self.project.path().join(rel)
    }

    /// Read `rel` from the project.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.project_file(rel)).expect("read project file")
    }

    /// Write `content` to `rel` inside the project.
    pub fn write_project_file(&self, rel: &str, content: &str) {
        write(&self.project_file(rel), content);
    }

    /// Seed the project with `opts`, using `environment` for `ADT_VAR_*`
    /// overrides and as the base environment of scripts.
    pub fn seed(
        &self,
        opts: &SeedOpts,
        environment: BTreeMap<String, String>,
        log: &MemoryLog,
        prompt: &dyn Prompt,
    ) -> Result<SeedReport, ProfileError> {
        seed_project(
            self.project.path(),
            &self.config(),
            opts,
            environment,
            log,
            prompt,
        )
    }

    /// Every file under the project with its contents, for before/after comparison.
    pub fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        walkdir::WalkDir::new(self.project.path())
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let content = std::fs::read(e.path()).expect("read snapshot file");
                (e.path().to_path_buf(), content)
            })
            .collect()
    }
}

/// Fluent builder for [`ProfileRepo`].
pub struct ProfileRepoBuilder {
    repo: ProfileRepo,
}

impl ProfileRepoBuilder {
    /// Begin with an empty profiles directory and an empty project.
    pub fn new() -> Self {
        Self {
            repo: ProfileRepo {
                profiles: tempfile::tempdir().expect("create profiles dir"),
                project: tempfile::tempdir().expect("create project dir"),
            },
        }
    }

    /// Create profile `name` with the given `profile.toml` content.
    pub fn profile(self, name: &str, manifest: &str) -> Self {
        write(
            &self.repo.profiles.path().join(name).join("profile.toml"),
            manifest,
        );
        self
    }

    /// Write `templates/<rel>` inside profile `name`.
    pub fn template(self, name: &str, rel: &str, content: &str) -> Self {
        write(
            &self
                .repo
                .profiles
                .path()
                .join(name)
                .join("templates")
                .join(rel),
            content,
        );
        self
    }

    /// Write `scripts/<file>` inside profile `name`. The file is left
    /// non-executable.
    pub fn script(self, name: &str, file: &str, body: &str) -> Self {
        write(
            &self.repo.profiles.path().join(name).join("scripts").join(file),
            body,
        );
        self
    }

    /// Finish building and return the repository.
    pub fn build(self) -> ProfileRepo {
        self.repo
    }
}

/// Environment with just enough in it for `/bin/sh` scripts.
pub fn script_env() -> BTreeMap<String, String> {
    BTreeMap::from([(
        "PATH".to_string(),
        "/usr/local/bin:/usr/bin:/bin".to_string(),
    )])
}

/// Seed options selecting `profiles` (comma-separated).
pub fn opts(profiles: &str) -> SeedOpts {
    SeedOpts {
        profiles: Some(profiles.to_string()),
        ..SeedOpts::default()
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}
