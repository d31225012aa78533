//! Per-file seeding: condition, conflict policy, render, write.
use std::fs;
use std::path::{Component, Path, PathBuf};

use super::{FileOutcome, Seeder};
use crate::condition;
use crate::error::SeedError;
use crate::profile::FileMapping;
use crate::template;

impl Seeder<'_> {
    pub(super) fn seed_file(&self, mapping: &FileMapping) -> FileOutcome {
        if !condition::evaluate_opt(mapping.condition.as_deref(), self.ctx, &self.project_dir) {
            return FileOutcome::SkippedByCondition;
        }

        let dest = match destination(&self.project_dir, &mapping.dest) {
            Ok(dest) => dest,
            Err(e) => return FileOutcome::Failed(e.to_string()),
        };

        let exists = dest.exists();
        if exists {
            if !self.options.overwrite {
                return FileOutcome::SkippedExists;
            }
            if !self.options.yes
                && !self.options.dry_run
                && !self.prompt.confirm(&format!("Overwrite {}?", mapping.dest))
            {
                return FileOutcome::SkippedDeclined;
            }
        }

        let content = match self.content(mapping) {
            Ok(content) => content,
            Err(e) => return FileOutcome::Failed(e.to_string()),
        };

        if self.options.dry_run {
            return if exists {
                FileOutcome::WouldOverwrite
            } else {
                FileOutcome::WouldCreate
            };
        }

        match write(&dest, &content) {
            Ok(()) if exists => FileOutcome::Overwritten,
            Ok(()) => FileOutcome::Created,
            Err(e) => FileOutcome::Failed(e.to_string()),
        }
    }

    /// Source bytes (embedded or read from disk), rendered when the mapping
    /// is a template.
    fn content(&self, mapping: &FileMapping) -> Result<Vec<u8>, SeedError> {
        let source = &mapping.source;
        let bytes = match mapping.embedded {
            Some(content) => content.as_bytes().to_vec(),
            None if !source.is_file() => {
                return Err(SeedError::SourceMissing(source.display().to_string()));
            }
            None => fs::read(source).map_err(|e| SeedError::Io {
                path: source.display().to_string(),
                source: e,
            })?,
        };
        if !mapping.is_template {
            return Ok(bytes);
        }

        let text = String::from_utf8(bytes)
            .map_err(|_| SeedError::NotUtf8(source.display().to_string()))?;
        template::render(&text, self.ctx, &self.project_dir)
            .map(String::into_bytes)
            .map_err(|e| SeedError::Render {
                dest: mapping.dest.clone(),
                source: e,
            })
    }
}

/// Resolve `dest` under `project_dir`, refusing absolute paths and `..`.
fn destination(project_dir: &Path, dest: &str) -> Result<PathBuf, SeedError> {
    let rel = Path::new(dest);
    let safe = !dest.is_empty()
        && rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if safe {
        Ok(project_dir.join(rel))
    } else {
        Err(SeedError::UnsafeDestination(dest.to_string()))
    }
}

fn write(dest: &Path, content: &[u8]) -> Result<(), SeedError> {
    let io_err = |source| SeedError::Io {
        path: dest.display().to_string(),
        source,
    };
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(dest, content).map_err(io_err)
}
