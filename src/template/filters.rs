//! Pure value transforms exposed to templates.
use std::path::Path;

use unicode_normalization::UnicodeNormalization;

/// Split an identifier into words.
///
/// Boundaries are any non-alphanumeric character, a lower-case letter or
/// digit followed by an upper-case letter (`helloWorld`), and the last
/// capital of an acronym followed by a lower-case letter (`HTTPServer`).
#[must_use]
pub fn split_words(value: &str) -> Vec<String> {
    let mut words = Vec::new();

    for segment in value.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = segment.chars().collect();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            let prev = i.checked_sub(1).and_then(|p| chars.get(p)).copied();
            let next = chars.get(i + 1).copied();
            let boundary = c.is_uppercase()
                && prev.is_some_and(|p| {
                    p.is_lowercase()
                        || p.is_numeric()
                        || (p.is_uppercase() && next.is_some_and(char::is_lowercase))
                });
            if boundary && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
        }

        if !current.is_empty() {
            words.push(current);
        }
    }

    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// `HelloWorld` → `hello_world`.
#[must_use]
pub fn snake_case(value: &str) -> String {
    split_words(value)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// `HelloWorld` → `hello-world`.
#[must_use]
pub fn kebab_case(value: &str) -> String {
    split_words(value)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// `my-project` → `MyProject`.
#[must_use]
pub fn pascal_case(value: &str) -> String {
    split_words(value).iter().map(|w| capitalize(w)).collect()
}

/// `my-project` → `myProject`.
#[must_use]
pub fn camel_case(value: &str) -> String {
    split_words(value)
        .iter()
        .enumerate()
        .map(|(i, w)| if i == 0 { w.to_lowercase() } else { capitalize(w) })
        .collect()
}

/// URL-friendly slug: accents stripped, lower-cased, runs of anything other
/// than `[a-z0-9]` collapsed to one `separator`, no leading or trailing
/// separator.
#[must_use]
pub fn slugify(value: &str, separator: &str) -> String {
    let ascii: String = value
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .to_ascii_lowercase();

    ascii
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Whether `path` exists, relative paths being anchored at `base`.
#[must_use]
pub fn path_exists(base: &Path, path: &str) -> bool {
    base.join(path).exists()
}

/// `content` when `condition` holds, else `otherwise`.
#[must_use]
pub fn include_if<'a>(condition: bool, content: &'a str, otherwise: &'a str) -> &'a str {
    if condition { content } else { otherwise }
}
