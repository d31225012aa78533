//! Non-fatal sanity checks on a loaded profile.
use walkdir::WalkDir;

use super::Profile;

/// A problem detected in a profile that does not prevent seeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Profile the warning belongs to.
    pub profile: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning for `item` in `profile`.
    #[must_use]
    pub fn new(
        profile: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            profile: profile.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.profile, self.item, self.message)
    }
}

/// Check a profile for common mistakes.
///
/// Reports an empty name, a missing profile directory, a `templates/`
/// directory without any files, and declared scripts or file sources that
/// do not exist.
#[must_use]
pub fn validate(profile: &Profile) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    if profile.is_builtin() {
        return warnings;
    }
    let name = profile.name.as_str();

    if name.is_empty() {
        warnings.push(ValidationWarning::new(
            name,
            "profile",
            "profile must have a name",
        ));
    }

    if !profile.path.exists() {
        warnings.push(ValidationWarning::new(
            name,
            "path",
            format!("profile path does not exist: {}", profile.path.display()),
        ));
    }

    let templates = profile.templates_dir();
    if templates.is_dir()
        && !WalkDir::new(&templates)
            .into_iter()
            .filter_map(Result::ok)
            .any(|e| e.file_type().is_file())
    {
        warnings.push(ValidationWarning::new(
            name,
            "templates",
            format!("templates directory is empty: {}", templates.display()),
        ));
    }

    for script in &profile.scripts {
        if !script.path.exists() {
            warnings.push(ValidationWarning::new(
                name,
                script.display_name(),
                format!("script not found: {}", script.path.display()),
            ));
        }
    }

    for mapping in &profile.file_mappings {
        if !mapping.source.exists() {
            warnings.push(ValidationWarning::new(
                name,
                mapping.dest.clone(),
                format!("source not found: {}", mapping.source.display()),
            ));
        }
    }

    warnings
}
