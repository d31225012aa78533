//! `profile.toml` document shape.
//!
//! The manifest is parsed leniently: the document must be valid TOML, but
//! individual `[files]` and `[scripts] post_seed` entries of the wrong shape
//! are skipped rather than rejecting the whole profile.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::{DEFAULT_VERSION, FileMapping, Profile, ScriptConfig, TEMPLATE_SUFFIX};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ManifestDoc {
    profile: ProfileSection,
    variables: toml::Table,
    files: toml::Table,
    scripts: ScriptsSection,
    conditions: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileSection {
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    extends: Option<OneOrMany>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScriptsSection {
    post_seed: Vec<toml::Value>,
    env: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Destination of a `[files]` entry: `"src" = "dest"` or `"src" = { dest, condition }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileSpec {
    Simple(String),
    Detailed {
        dest: Option<String>,
        condition: Option<String>,
    },
}

/// A `post_seed` entry: `"path"` or `{ script, condition }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScriptSpec {
    Simple(String),
    Detailed {
        #[serde(default)]
        script: String,
        condition: Option<String>,
    },
}

impl ManifestDoc {
    /// Build a profile rooted at `path` from this document.
    ///
    /// Explicit file mappings and scripts are returned as declared; discovery
    /// of undeclared ones is left to the loader.
    pub(super) fn into_profile(self, path: &Path) -> Profile {
        let mut profile = Profile::minimal(path);

        if let Some(name) = self.profile.name {
            profile.name = name;
        }
        profile.description = self.profile.description.unwrap_or_default();
        profile.version = self
            .profile
            .version
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());
        profile.extends = match self.profile.extends {
            Some(OneOrMany::One(parent)) => vec![parent],
            Some(OneOrMany::Many(parents)) => parents,
            None => Vec::new(),
        };

        for (key, value) in self.variables {
            if key == "meta" {
                if let toml::Value::Table(meta) = value {
                    for (var, descriptor) in meta {
                        if let toml::Value::Table(t) = descriptor {
                            profile.variables_meta.insert(var, t);
                        }
                    }
                }
                continue;
            }
            profile.variables.insert(key, value);
        }

        profile.file_mappings = parse_file_mappings(self.files, path);
        profile.scripts = parse_scripts(self.scripts.post_seed, path);
        profile.script_env = self
            .scripts
            .env
            .into_iter()
            .map(|(k, v)| (k, scalar_to_string(&v)))
            .collect();
        profile.conditions = self
            .conditions
            .into_iter()
            .map(|(k, v)| (k, scalar_to_string(&v)))
            .collect();

        profile
    }
}

fn parse_file_mappings(files: toml::Table, profile_path: &Path) -> Vec<FileMapping> {
    let templates_dir = profile_path.join("templates");
    let mut mappings = Vec::with_capacity(files.len());

    for (source, value) in files {
        let spec: FileSpec = match value.try_into() {
            Ok(spec) => spec,
            Err(e) => {
                tracing::debug!("skipping file entry '{source}': {e}");
                continue;
            }
        };

        let (mut dest, condition) = match spec {
            FileSpec::Simple(dest) => (dest, None),
            FileSpec::Detailed { dest, condition } => {
                (dest.unwrap_or_else(|| source.clone()), condition)
            }
        };

        let is_template = source.ends_with(TEMPLATE_SUFFIX);
        if is_template && let Some(stripped) = dest.strip_suffix(TEMPLATE_SUFFIX) {
            dest = stripped.to_string();
        }

        let in_templates = templates_dir.join(&source);
        let source_path = if in_templates.exists() {
            in_templates
        } else {
            profile_path.join(&source)
        };

        mappings.push(FileMapping {
            source: source_path,
            dest,
            condition: condition.filter(|c| !c.trim().is_empty()),
            is_template,
            embedded: None,
        });
    }

    mappings
}

fn parse_scripts(entries: Vec<toml::Value>, profile_path: &Path) -> Vec<ScriptConfig> {
    entries
        .into_iter()
        .filter_map(|value| match value.try_into::<ScriptSpec>() {
            Ok(ScriptSpec::Simple(script)) => Some(ScriptConfig {
                path: profile_path.join(script),
                condition: None,
            }),
            Ok(ScriptSpec::Detailed { script, condition }) => Some(ScriptConfig {
                path: profile_path.join(script),
                condition: condition.filter(|c| !c.trim().is_empty()),
            }),
            Err(e) => {
                tracing::debug!("skipping post_seed entry: {e}");
                None
            }
        })
        .collect()
}

fn scalar_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Profile {
        let doc: ManifestDoc = toml::from_str(src).unwrap();
        doc.into_profile(Path::new("/profiles/demo"))
    }

    #[test]
    fn empty_manifest_uses_defaults() {
        let p = parse("");
        assert_eq!(p.name, "demo");
        assert_eq!(p.version, "1.0.0");
        assert!(p.file_mappings.is_empty());
    }

    #[test]
    fn extends_accepts_string_or_list() {
        let one = parse("[profile]\nextends = \"base\"\n");
        assert_eq!(one.extends, vec!["base"]);
        let many = parse("[profile]\nextends = [\"base\", \"lint\"]\n");
        assert_eq!(many.extends, vec!["base", "lint"]);
    }

    #[test]
    fn meta_table_is_split_from_variables() {
        let p = parse(
            r#"
[variables]
license = "MIT"
use_docker = false

[variables.meta]
license = { description = "SPDX identifier" }
"#,
        );
        assert_eq!(p.variables.len(), 2);
        assert!(!p.variables.contains_key("meta"));
        assert_eq!(
            p.variables_meta["license"]["description"].as_str(),
            Some("SPDX identifier")
        );
    }

    #[test]
    fn file_entries_keep_declared_order_and_strip_suffix() {
        let p = parse(
            r#"
[files]
"README.md.j2" = "README.md.j2"
"ruff.toml" = "ruff.toml"
"Dockerfile.j2" = { dest = "Dockerfile", condition = "use_docker" }
"bogus" = 42
"#,
        );
        let dests: Vec<_> = p.file_mappings.iter().map(|m| m.dest.as_str()).collect();
        assert_eq!(dests, vec!["README.md", "ruff.toml", "Dockerfile"]);
        assert!(p.file_mappings[0].is_template);
        assert!(!p.file_mappings[1].is_template);
        assert_eq!(p.file_mappings[2].condition.as_deref(), Some("use_docker"));
    }

    #[test]
    fn detailed_file_entry_defaults_dest_to_source() {
        let p = parse("[files]\n\"Makefile\" = { condition = \"has_tests\" }\n");
        assert_eq!(p.file_mappings[0].dest, "Makefile");
    }

    #[test]
    fn missing_template_source_falls_back_to_profile_root() {
        let p = parse("[files]\n\"extra.txt\" = \"extra.txt\"\n");
        assert_eq!(
            p.file_mappings[0].source,
            Path::new("/profiles/demo/extra.txt")
        );
    }

    #[test]
    fn scripts_accept_both_shapes_and_stringify_env() {
        let p = parse(
            r#"
[scripts]
post_seed = ["scripts/a.sh", { script = "scripts/b.sh", condition = "has_tests" }, 7]

[scripts.env]
PORT = 8080
MODE = "dev"
"#,
        );
        assert_eq!(p.scripts.len(), 2);
        assert_eq!(p.scripts[0].path, Path::new("/profiles/demo/scripts/a.sh"));
        assert_eq!(p.scripts[1].condition.as_deref(), Some("has_tests"));
        assert_eq!(p.script_env["PORT"], "8080");
        assert_eq!(p.script_env["MODE"], "dev");
    }
}
