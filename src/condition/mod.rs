//! Boolean conditions gating file mappings and scripts.
//!
//! Conditions are small expressions over the variable context:
//!
//! ```text
//! use_docker
//! python_version >= '3.10' and not use_poetry
//! license in ['MIT', 'Apache-2.0']
//! path_exists('src') or pyproject_get('tool.ruff.line-length', 88) > 80
//! ```
//!
//! The language is a fixed whitelist: variable lookups, literals, member
//! access on objects, comparison and logical operators, and the built-ins
//! `path_exists` and `pyproject_get`. Nothing else can be called.
mod lexer;
mod parser;

use serde_json::Value;
use std::cmp::Ordering;
use std::path::Path;

use parser::{CmpOp, Expr};

use crate::error::ConditionError;
use crate::variables::{PROJECT_KEY, VariableContext, is_truthy, lookup_dotted};

/// Evaluate a condition, treating any failure as "include".
///
/// An empty expression is true. Errors are logged and evaluate to true, so a
/// broken condition never silently drops content.
#[must_use]
pub fn evaluate(expr: &str, ctx: &VariableContext, project_dir: &Path) -> bool {
    match try_evaluate(expr, ctx, project_dir) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("condition '{expr}' could not be evaluated ({e}); including");
            true
        }
    }
}

/// Evaluate an optional condition; `None` is true.
#[must_use]
pub fn evaluate_opt(expr: Option<&str>, ctx: &VariableContext, project_dir: &Path) -> bool {
    expr.is_none_or(|e| evaluate(e, ctx, project_dir))
}

/// Evaluate a condition, reporting failures.
///
/// # Errors
///
/// Returns [`ConditionError`] when the expression is malformed, refers to an
/// unknown variable or function, or compares incompatible values.
pub fn try_evaluate(
    expr: &str,
    ctx: &VariableContext,
    project_dir: &Path,
) -> Result<bool, ConditionError> {
    if expr.trim().is_empty() {
        return Ok(true);
    }
    let tokens = lexer::tokenize(expr)?;
    let ast = parser::parse(&tokens, expr.len())?;
    let env = Env { ctx, project_dir };
    Ok(is_truthy(&env.eval(&ast)?))
}

struct Env<'a> {
    ctx: &'a VariableContext,
    project_dir: &'a Path,
}

impl Env<'_> {
    fn eval(&self, expr: &Expr) -> Result<Value, ConditionError> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Var(name) => self
                .ctx
                .get(name)
                .cloned()
                .ok_or_else(|| ConditionError::UnknownIdentifier(name.clone())),
            Expr::Attr(base, name) => match self.eval(base)? {
                Value::Object(map) => map
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ConditionError::UnknownIdentifier(name.clone())),
                other => Err(ConditionError::Type(format!(
                    "{} has no attribute '{name}'",
                    type_name(&other)
                ))),
            },
            Expr::Call(name, args) => self.call(name, args),
            Expr::List(items) => items
                .iter()
                .map(|e| self.eval(e))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Expr::Not(inner) => Ok(Value::Bool(!is_truthy(&self.eval(inner)?))),
            Expr::And(lhs, rhs) => {
                let l = self.eval(lhs)?;
                if is_truthy(&l) { self.eval(rhs) } else { Ok(l) }
            }
            Expr::Or(lhs, rhs) => {
                let l = self.eval(lhs)?;
                if is_truthy(&l) { Ok(l) } else { self.eval(rhs) }
            }
            Expr::Compare(first, rest) => {
                let mut left = self.eval(first)?;
                for (op, rhs) in rest {
                    let right = self.eval(rhs)?;
                    if !compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
        }
    }

    fn call(&self, name: &str, args: &[Expr]) -> Result<Value, ConditionError> {
        let values = args
            .iter()
            .map(|a| self.eval(a))
            .collect::<Result<Vec<_>, _>>()?;

        match (name, values.as_slice()) {
            ("path_exists", [Value::String(p)]) => {
                Ok(Value::Bool(self.project_dir.join(p).exists()))
            }
            ("pyproject_get", [Value::String(key), rest @ ..]) if rest.len() <= 1 => {
                let default = rest.first().cloned().unwrap_or(Value::Null);
                Ok(self
                    .ctx
                    .get(PROJECT_KEY)
                    .and_then(|project| lookup_dotted(project, key))
                    .cloned()
                    .unwrap_or(default))
            }
            ("path_exists" | "pyproject_get", _) => Err(ConditionError::Type(format!(
                "invalid arguments to {name}()"
            ))),
            _ => Err(ConditionError::UnknownFunction(name.to_string())),
        }
    }
}

fn compare(op: CmpOp, l: &Value, r: &Value) -> Result<bool, ConditionError> {
    match op {
        CmpOp::Eq => Ok(loose_eq(l, r)),
        CmpOp::Ne => Ok(!loose_eq(l, r)),
        CmpOp::In => contains(r, l),
        CmpOp::NotIn => contains(r, l).map(|found| !found),
        CmpOp::Lt => order(l, r).map(Ordering::is_lt),
        CmpOp::Le => order(l, r).map(Ordering::is_le),
        CmpOp::Gt => order(l, r).map(Ordering::is_gt),
        CmpOp::Ge => order(l, r).map(Ordering::is_ge),
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn loose_eq(l: &Value, r: &Value) -> bool {
    match (as_number(l), as_number(r)) {
        (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
        _ => l == r,
    }
}

fn order(l: &Value, r: &Value) -> Result<Ordering, ConditionError> {
    if let (Some(a), Some(b)) = (as_number(l), as_number(r)) {
        return a.partial_cmp(&b).ok_or_else(|| {
            ConditionError::Type("cannot order NaN".to_string())
        });
    }
    match (l, r) {
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        _ => Err(ConditionError::Type(format!(
            "cannot order {} and {}",
            type_name(l),
            type_name(r)
        ))),
    }
}

fn contains(haystack: &Value, needle: &Value) -> Result<bool, ConditionError> {
    match (haystack, needle) {
        (Value::String(h), Value::String(n)) => Ok(h.contains(n.as_str())),
        (Value::Array(items), _) => Ok(items.iter().any(|i| loose_eq(i, needle))),
        (Value::Object(map), Value::String(key)) => Ok(map.contains_key(key)),
        _ => Err(ConditionError::Type(format!(
            "cannot test {} membership in {}",
            type_name(needle),
            type_name(haystack)
        ))),
    }
}

const fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
