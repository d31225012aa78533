//! Templates compiled into the binary, seeded when no profile is configured.
use std::path::{Path, PathBuf};

use super::{FileMapping, Profile};

/// Name of the built-in profile.
pub const BUILTIN_PROFILE: &str = "builtin";

/// `(destination, content)` of every built-in file.
const FILES: &[(&str, &str)] = &[
    (".editorconfig", include_str!("builtin/editorconfig")),
    (".gitignore", include_str!("builtin/gitignore")),
];

/// The built-in profile. It has no directory, no variables and no scripts;
/// its files are copied verbatim.
#[must_use]
pub fn builtin() -> Profile {
    let mut profile = Profile::minimal(Path::new(""));
    profile.name = BUILTIN_PROFILE.to_string();
    profile.description = "Built-in defaults".to_string();
    profile.file_mappings = FILES
        .iter()
        .map(|&(dest, content)| FileMapping {
            source: PathBuf::from(format!("<{BUILTIN_PROFILE}>/{dest}")),
            dest: dest.to_string(),
            condition: None,
            is_template: false,
            embedded: Some(content),
        })
        .collect();
    profile
}
