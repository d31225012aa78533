//! Layered variable resolution.
//!
//! The variable context handed to templates and conditions is built from six
//! layers, lowest priority first:
//!
//! 1. computed project facts (`project_name`, `python_version`, ...)
//! 2. `[tool.adt.variables]` of the target project's `pyproject.toml`
//! 3. each profile's `[variables]`, in chain order
//! 4. `[variables]` from the tool configuration
//! 5. `ADT_VAR_*` environment variables (prefix stripped, lower-cased)
//! 6. `--var name=value` from the command line
//!
//! Afterwards the reserved keys `project`, `env` and `adt` are set
//! unconditionally.
mod cli_vars;
pub mod project;

use chrono::Datelike;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use cli_vars::{parse_cli_vars, parse_value};
pub use project::ManifestCache;

use crate::config::Config;
use crate::profile::Profile;

/// Resolved variables for one seed run.
pub type VariableContext = Map<String, Value>;

/// Environment prefix for variable overrides.
pub const ENV_PREFIX: &str = "ADT_VAR_";

/// Reserved key holding the parsed `pyproject.toml`.
pub const PROJECT_KEY: &str = "project";
/// Reserved key holding the process environment.
pub const ENV_KEY: &str = "env";
/// Reserved key holding tool metadata.
pub const ADT_KEY: &str = "adt";

/// Builds a [`VariableContext`] from its layered sources.
///
/// The process environment is an explicit input (see
/// [`with_environment`](Self::with_environment)); nothing is read from the
/// ambient environment during resolution. Parsed project manifests are
/// memoized, so [`resolve`](Self::resolve) can be called repeatedly.
#[derive(Debug)]
pub struct VariableResolver<'a> {
    project_dir: PathBuf,
    profiles: &'a [Profile],
    config: &'a Config,
    cli_vars: VariableContext,
    environment: BTreeMap<String, String>,
    current_year: i32,
    tool_version: String,
    manifests: ManifestCache,
}

impl<'a> VariableResolver<'a> {
    /// Resolver over `profiles` (base first) for the project at `project_dir`.
    #[must_use]
    pub fn new(project_dir: &Path, profiles: &'a [Profile], config: &'a Config) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            profiles,
            config,
            cli_vars: VariableContext::new(),
            environment: BTreeMap::new(),
            current_year: chrono::Local::now().year(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            manifests: ManifestCache::new(),
        }
    }

    /// Command-line variables (highest priority).
    #[must_use]
    pub fn with_cli_vars(mut self, vars: VariableContext) -> Self {
        self.cli_vars = vars;
        self
    }

    /// Process environment snapshot, used for `ADT_VAR_*` and the `env` key.
    #[must_use]
    pub fn with_environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    /// Override the year reported as `current_year`.
    #[must_use]
    pub const fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Override the version reported as `adt.version`.
    #[must_use]
    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = version.into();
        self
    }

    /// Merge all layers into a fresh context.
    #[must_use]
    pub fn resolve(&self) -> VariableContext {
        let manifest = self.manifests.manifest(&self.project_dir);
        let mut ctx = self.computed(&manifest);

        if let Some(vars) = project::tool_variables(&manifest) {
            for (k, v) in vars {
                ctx.insert(k.clone(), toml_to_json(v));
            }
        }

        for profile in self.profiles {
            for (k, v) in &profile.variables {
                ctx.insert(k.clone(), toml_to_json(v));
            }
        }

        for (k, v) in &self.config.variables {
            ctx.insert(k.clone(), Value::String(v.clone()));
        }

        for (k, v) in &self.environment {
            if let Some(name) = k.strip_prefix(ENV_PREFIX)
                && !name.is_empty()
            {
                ctx.insert(name.to_lowercase(), Value::String(v.clone()));
            }
        }

        for (k, v) in &self.cli_vars {
            ctx.insert(k.clone(), v.clone());
        }

        ctx.insert(
            PROJECT_KEY.to_string(),
            Value::Object(table_to_json(&manifest)),
        );
        ctx.insert(
            ENV_KEY.to_string(),
            Value::Object(
                self.environment
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        );
        ctx.insert(ADT_KEY.to_string(), self.metadata());

        ctx
    }

    fn computed(&self, manifest: &toml::Table) -> VariableContext {
        let dir_name = self
            .project_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut ctx = VariableContext::new();
        ctx.insert(
            "project_name".to_string(),
            project::project_str(manifest, "name").map_or(Value::String(dir_name), Value::from),
        );
        ctx.insert(
            "project_version".to_string(),
            Value::from(
                project::project_str(manifest, "version")
                    .unwrap_or(project::FALLBACK_PROJECT_VERSION),
            ),
        );
        ctx.insert(
            "project_description".to_string(),
            Value::from(project::project_str(manifest, "description").unwrap_or_default()),
        );
        ctx.insert(
            "python_version".to_string(),
            Value::String(project::detect_python_version(&self.project_dir, manifest)),
        );
        ctx.insert(
            "has_src_layout".to_string(),
            Value::Bool(self.project_dir.join("src").is_dir()),
        );
        ctx.insert(
            "has_tests".to_string(),
            Value::Bool(self.project_dir.join("tests").is_dir()),
        );
        ctx.insert("current_year".to_string(), Value::from(self.current_year));
        ctx.insert(
            "project_dir".to_string(),
            Value::String(self.project_dir.display().to_string()),
        );
        ctx
    }

    fn metadata(&self) -> Value {
        serde_json::json!({
            "version": self.tool_version,
            "profiles": self.profiles.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        })
    }
}

/// Convert a TOML value into the context's JSON representation.
///
/// Datetimes become their RFC 3339 string form.
#[must_use]
pub fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => {
            serde_json::Number::from_f64(*f).map_or_else(|| Value::String(f.to_string()), Value::Number)
        }
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(t) => Value::Object(table_to_json(t)),
    }
}

fn table_to_json(table: &toml::Table) -> Map<String, Value> {
    table
        .iter()
        .map(|(k, v)| (k.clone(), toml_to_json(v)))
        .collect()
}

/// Follow a dotted key path (`"tool.ruff.line-length"`) through nested objects.
#[must_use]
pub fn lookup_dotted<'v>(root: &'v Value, key: &str) -> Option<&'v Value> {
    key.split('.')
        .try_fold(root, |current, part| current.as_object()?.get(part))
}

/// Whether a value is "truthy": non-empty, non-zero, non-null, not `false`.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Render a scalar for environment export; `None` for arrays, objects and null.
#[must_use]
pub fn scalar_to_env(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile_with(name: &str, vars: &[(&str, toml::Value)]) -> Profile {
        let mut p = Profile::minimal(&Path::new("/profiles").join(name));
        for (k, v) in vars {
            p.variables.insert((*k).to_string(), v.clone());
        }
        p
    }

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn computed_defaults_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("my-app");
        std::fs::create_dir_all(project.join("tests")).unwrap();
        let config = Config::default();

        let ctx = VariableResolver::new(&project, &[], &config)
            .with_current_year(2025)
            .resolve();

        assert_eq!(ctx["project_name"], json!("my-app"));
        assert_eq!(ctx["project_version"], json!("0.1.0"));
        assert_eq!(ctx["project_description"], json!(""));
        assert_eq!(ctx["python_version"], json!("3.12"));
        assert_eq!(ctx["has_src_layout"], json!(false));
        assert_eq!(ctx["has_tests"], json!(true));
        assert_eq!(ctx["current_year"], json!(2025));
        assert_eq!(ctx["project"], json!({}));
    }

    #[test]
    fn manifest_feeds_computed_and_tool_layers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            r#"
[project]
name = "acme"
version = "2.0.0"
requires-python = ">=3.11"

[tool.adt.variables]
license = "Apache-2.0"
"#,
        )
        .unwrap();
        let config = Config::default();

        let ctx = VariableResolver::new(dir.path(), &[], &config).resolve();

        assert_eq!(ctx["project_name"], json!("acme"));
        assert_eq!(ctx["project_version"], json!("2.0.0"));
        assert_eq!(ctx["python_version"], json!("3.11"));
        assert_eq!(ctx["license"], json!("Apache-2.0"));
        assert_eq!(ctx["project"]["project"]["name"], json!("acme"));
    }

    #[test]
    fn every_layer_overrides_the_one_below() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            "[tool.adt.variables]\nauthor = \"manifest\"\nproject_name = \"from-manifest\"\n",
        )
        .unwrap();
        let profiles = vec![
            profile_with("base", &[("author", toml::Value::from("base"))]),
            profile_with("child", &[("author", toml::Value::from("child"))]),
        ];
        let mut config = Config::default();
        config
            .variables
            .insert("author".to_string(), "config".to_string());
        let mut cli = VariableContext::new();
        cli.insert("author".to_string(), json!("X"));

        let full = VariableResolver::new(dir.path(), &profiles, &config)
            .with_environment(env(&[("ADT_VAR_AUTHOR", "Y")]))
            .with_cli_vars(cli);
        assert_eq!(full.resolve()["author"], json!("X"));
        assert_eq!(full.resolve()["project_name"], json!("from-manifest"));

        let no_cli = VariableResolver::new(dir.path(), &profiles, &config)
            .with_environment(env(&[("ADT_VAR_AUTHOR", "Y")]));
        assert_eq!(no_cli.resolve()["author"], json!("Y"));

        let no_env = VariableResolver::new(dir.path(), &profiles, &config);
        assert_eq!(no_env.resolve()["author"], json!("config"));

        let empty_config = Config::default();
        let no_config = VariableResolver::new(dir.path(), &profiles, &empty_config);
        assert_eq!(no_config.resolve()["author"], json!("child"));

        let no_profiles = VariableResolver::new(dir.path(), &[], &empty_config);
        assert_eq!(no_profiles.resolve()["author"], json!("manifest"));
    }

    #[test]
    fn env_vars_are_lowercased_strings() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let ctx = VariableResolver::new(dir.path(), &[], &config)
            .with_environment(env(&[("ADT_VAR_USE_DOCKER", "true"), ("HOME", "/home/u")]))
            .resolve();
        assert_eq!(ctx["use_docker"], json!("true"));
        assert!(!ctx.contains_key("home"));
        assert_eq!(ctx["env"]["HOME"], json!("/home/u"));
    }

    #[test]
    fn reserved_keys_overwrite_user_variables() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let profiles = vec![profile_with("p", &[("adt", toml::Value::from("mine"))])];
        let mut cli = VariableContext::new();
        cli.insert("env".to_string(), json!("cli"));

        let ctx = VariableResolver::new(dir.path(), &profiles, &config)
            .with_cli_vars(cli)
            .with_tool_version("9.9.9")
            .resolve();

        assert_eq!(ctx["adt"], json!({"version": "9.9.9", "profiles": ["p"]}));
        assert!(ctx["env"].is_object());
    }

    #[test]
    fn resolve_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let resolver = VariableResolver::new(dir.path(), &[], &config).with_current_year(2030);
        assert_eq!(resolver.resolve(), resolver.resolve());
    }

    #[test]
    fn dotted_lookup_walks_objects() {
        let v = json!({"tool": {"ruff": {"line-length": 100}}});
        assert_eq!(lookup_dotted(&v, "tool.ruff.line-length"), Some(&json!(100)));
        assert_eq!(lookup_dotted(&v, "tool.black"), None);
        assert_eq!(lookup_dotted(&v, "tool.ruff.line-length.x"), None);
    }

    #[test]
    fn truthiness_follows_emptiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!("false")));
        assert!(is_truthy(&json!(0.5)));
    }

    #[test]
    fn scalars_export_to_env_strings() {
        assert_eq!(scalar_to_env(&json!(true)).as_deref(), Some("true"));
        assert_eq!(scalar_to_env(&json!(8080)).as_deref(), Some("8080"));
        assert_eq!(scalar_to_env(&json!([1])), None);
    }
}
