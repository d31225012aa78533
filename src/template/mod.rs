//! Template rendering for `.j2` profile files.
//!
//! Templates use Jinja syntax rendered by `minijinja`. The environment keeps
//! a trailing newline and trims block-tag whitespace so generated config
//! files come out clean. Registered helpers:
//!
//! | Filter              | Example                                   |
//! |---------------------|-------------------------------------------|
//! | `to_toml(inline)`   | `{{ deps \| to_toml(inline=true) }}`       |
//! | `to_yaml(flow)`     | `{{ steps \| to_yaml }}`                   |
//! | `slugify(sep)`      | `{{ "Café Résumé" \| slugify }}`           |
//! | `snake_case` etc.   | `{{ project_name \| pascal_case }}`        |
//! | `path_exists`       | `{% if "src" \| path_exists %}`            |
//!
//! Globals: `include_if(cond, content, else)`, `pyproject_get(key, default)`,
//! `path_exists(path)`.
//!
//! Without the `templating` feature, content is returned unrendered.
pub mod filters;
pub mod serialize;

use std::path::Path;

use crate::error::RenderError;
use crate::variables::VariableContext;

/// Render `content` against `ctx`.
///
/// Relative paths given to `path_exists` are resolved against `project_dir`;
/// `pyproject_get` reads the context's `project` snapshot.
///
/// # Errors
///
/// Returns [`RenderError::Syntax`] for malformed templates and
/// [`RenderError::Render`] for failures during evaluation.
#[cfg(feature = "templating")]
pub fn render(
    content: &str,
    ctx: &VariableContext,
    project_dir: &Path,
) -> Result<String, RenderError> {
    let env = engine::environment(ctx, project_dir);
    let template = env
        .template_from_str(content)
        .map_err(|e| RenderError::Syntax(engine::describe(&e)))?;
    template
        .render(ctx)
        .map_err(|e| RenderError::Render(engine::describe(&e)))
}

/// Render `content` against `ctx`.
///
/// Built without the `templating` feature: returns `content` unchanged.
///
/// # Errors
///
/// Never fails in this configuration.
#[cfg(not(feature = "templating"))]
pub fn render(
    content: &str,
    _ctx: &VariableContext,
    _project_dir: &Path,
) -> Result<String, RenderError> {
    tracing::warn!("template rendering is not available in this build; copying content as-is");
    Ok(content.to_string())
}

#[cfg(feature = "templating")]
mod engine {
    use minijinja::value::Kwargs;
    use minijinja::{Environment, Error, ErrorKind, Value};
    use std::path::Path;

    use super::{filters, serialize};
    use crate::variables::{PROJECT_KEY, VariableContext, lookup_dotted};

    pub(super) fn environment<'s>(ctx: &VariableContext, project_dir: &Path) -> Environment<'s> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);

        env.add_filter("to_toml", to_toml);
        env.add_filter("to_yaml", to_yaml);
        env.add_filter("slugify", |value: String, separator: Option<String>| {
            filters::slugify(&value, separator.as_deref().unwrap_or("-"))
        });
        env.add_filter("snake_case", |v: String| filters::snake_case(&v));
        env.add_filter("kebab_case", |v: String| filters::kebab_case(&v));
        env.add_filter("pascal_case", |v: String| filters::pascal_case(&v));
        env.add_filter("camel_case", |v: String| filters::camel_case(&v));

        let base = project_dir.to_path_buf();
        env.add_filter("path_exists", move |path: String, base_dir: Option<String>| {
            base_dir.map_or_else(
                || filters::path_exists(&base, &path),
                |b| filters::path_exists(Path::new(&b), &path),
            )
        });
        let base = project_dir.to_path_buf();
        env.add_function("path_exists", move |path: String| {
            filters::path_exists(&base, &path)
        });

        env.add_function(
            "include_if",
            |cond: Value, content: String, otherwise: Option<String>| {
                filters::include_if(cond.is_true(), &content, otherwise.as_deref().unwrap_or(""))
                    .to_string()
            },
        );

        let project = ctx
            .get(PROJECT_KEY)
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        env.add_function("pyproject_get", move |key: String, default: Option<Value>| {
            lookup_dotted(&project, &key).map_or_else(
                || default.unwrap_or_else(|| Value::from(())),
                Value::from_serialize,
            )
        });

        env
    }

    fn to_json(value: &Value) -> Result<serde_json::Value, Error> {
        serde_json::to_value(value)
            .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))
    }

    fn to_toml(value: Value, kwargs: Kwargs) -> Result<String, Error> {
        let inline: Option<bool> = kwargs.get("inline")?;
        kwargs.assert_all_used()?;
        serialize::to_toml(&to_json(&value)?, inline.unwrap_or(false))
            .map_err(|e| Error::new(ErrorKind::InvalidOperation, e))
    }

    fn to_yaml(value: Value, kwargs: Kwargs) -> Result<String, Error> {
        let flow: Option<bool> = kwargs.get("flow")?;
        let default_flow_style: Option<bool> = kwargs.get("default_flow_style")?;
        kwargs.assert_all_used()?;
        Ok(serialize::to_yaml(
            &to_json(&value)?,
            flow.or(default_flow_style).unwrap_or(false),
        ))
    }

    /// Error text including the template line, when known.
    pub(super) fn describe(e: &Error) -> String {
        match e.line() {
            Some(line) => format!("{e} (line {line})"),
            None => e.to_string(),
        }
    }
}
