//! `--var name=value` parsing.
use serde_json::Value;

use super::VariableContext;

/// Parse `name=value` tokens into a variable map.
///
/// Tokens without `=` are ignored. Names and values are trimmed, and values
/// are coerced with [`parse_value`]. Later tokens override earlier ones.
#[must_use]
pub fn parse_cli_vars<S: AsRef<str>>(tokens: &[S]) -> VariableContext {
    let mut vars = VariableContext::new();
    for token in tokens {
        let Some((name, value)) = token.as_ref().split_once('=') else {
            tracing::debug!("ignoring variable without '=': {}", token.as_ref());
            continue;
        };
        vars.insert(name.trim().to_string(), parse_value(value.trim()));
    }
    vars
}

/// Coerce a raw CLI value to the most specific type it spells.
///
/// Boolean words first (`true/yes/1/on`, `false/no/0/off`, any case), then
/// integers, then finite floats, then a string with one layer of matching
/// quotes removed, else the raw string.
#[must_use]
pub fn parse_value(raw: &str) -> Value {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => return Value::Bool(true),
        "false" | "no" | "0" | "off" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }

    if let Ok(f) = raw.parse::<f64>()
        && let Some(n) = serde_json::Number::from_f64(f)
    {
        return Value::Number(n);
    }

    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| raw.strip_prefix(*q)?.strip_suffix(*q));
    Value::String(unquoted.unwrap_or(raw).to_string())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    #[allow(clippy::approx_constant)]
    fn coerces_scalars() {
        let vars = parse_cli_vars(&[
            "port=8080",
            "flag=yes",
            "name=\"a b\"",
            "ratio=3.14",
            "off=OFF",
            "single='x'",
            "plain=hello",
        ]);
        assert_eq!(vars["port"], json!(8080));
        assert_eq!(vars["flag"], json!(true));
        assert_eq!(vars["name"], json!("a b"));
        assert_eq!(vars["ratio"], json!(3.14));
        assert_eq!(vars["off"], json!(false));
        assert_eq!(vars["single"], json!("x"));
        assert_eq!(vars["plain"], json!("hello"));
    }

    #[test]
    fn tokens_without_equals_are_dropped() {
        let vars = parse_cli_vars(&["novalue", "a=1"]);
        assert_eq!(vars.len(), 1);
        assert!(vars.contains_key("a"));
    }

    #[test]
    fn splits_on_first_equals_and_trims() {
        let vars = parse_cli_vars(&[" url = a=b "]);
        assert_eq!(vars["url"], json!("a=b"));
    }

    #[test]
    fn zero_and_one_are_booleans() {
        assert_eq!(parse_value("1"), json!(true));
        assert_eq!(parse_value("0"), json!(false));
        assert_eq!(parse_value("2"), json!(2));
    }

    #[test]
    fn non_finite_floats_stay_strings() {
        assert_eq!(parse_value("inf"), json!("inf"));
        assert_eq!(parse_value("NaN"), json!("NaN"));
    }

    #[test]
    fn lone_quote_is_kept() {
        assert_eq!(parse_value("\""), json!("\""));
        assert_eq!(parse_value("\"abc'"), json!("\"abc'"));
    }

    #[test]
    fn later_token_wins() {
        let vars = parse_cli_vars(&["a=1", "a=two"]);
        assert_eq!(vars["a"], json!("two"));
    }

    proptest! {
        #[test]
        fn any_token_parses_without_panicking(token in "\\PC{0,32}") {
            let vars = parse_cli_vars(&[token.as_str()]);
            prop_assert_eq!(vars.len(), usize::from(token.contains('=')));
        }

        #[test]
        fn integers_round_trip(n in any::<i64>().prop_filter("not a boolean word", |n| *n != 0 && *n != 1)) {
            prop_assert_eq!(parse_value(&n.to_string()), json!(n));
        }
    }
}
