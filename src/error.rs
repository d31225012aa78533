//! Domain-specific error types for the seeding engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`ProfileError`], [`RenderError`])
//! while command handlers at the CLI boundary convert them to [`anyhow::Error`]
//! via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! AdtError
//! ├── Config(ConfigError)        config file reading/parsing (recovered as warnings)
//! ├── Profile(ProfileError)      profile lookup, manifest parsing, chain resolution
//! ├── Render(RenderError)        template syntax and rendering
//! ├── Condition(ConditionError)  condition expression parsing and evaluation
//! ├── Seed(SeedError)            per-file seeding failures
//! └── Script(ScriptError)        per-script execution failures
//! ```
//!
//! Only [`ProfileError`] is fatal to a seed run. Everything else is isolated
//! to the file or script that produced it.

use thiserror::Error;

/// Top-level error type for the seeding engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum AdtError {
    /// Configuration-related error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Profile loading or chain resolution error.
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Render(#[from] RenderError),

    /// Condition evaluation error.
    #[error("Condition error: {0}")]
    Condition(#[from] ConditionError),

    /// Per-file seeding error.
    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),

    /// Post-seed script error.
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),
}

/// Errors that arise while reading configuration files.
///
/// These never abort a command: the offending file is ignored and the error
/// is surfaced as a [`crate::config::ConfigWarning`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Read {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected shape.
    #[error("Invalid TOML in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: String,
        /// Parser message.
        message: String,
    },
}

/// Errors that arise from profile lookup, manifest parsing, and chain resolution.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// The identifier is neither an existing directory nor a configured profile name.
    #[error("Profile not found: {0}")]
    NotFound(String),

    /// A `profile.toml` exists but cannot be parsed.
    #[error("Failed to parse {path}: {message}")]
    ManifestInvalid {
        /// Path to the manifest file.
        path: String,
        /// Parser message.
        message: String,
    },

    /// A profile's ancestry revisits a profile that is still being expanded.
    #[error("Circular profile dependency detected: {0}")]
    CircularDependency(String),

    /// Reading a profile directory failed.
    #[error("IO error in profile {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise while rendering a template.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The template source itself is malformed.
    #[error("Template syntax error: {0}")]
    Syntax(String),

    /// The template parsed but failed during evaluation (e.g. a filter error).
    #[error("Template rendering failed: {0}")]
    Render(String),
}

/// Errors that arise while parsing or evaluating a condition expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    /// The expression is not well-formed.
    #[error("Invalid condition syntax at offset {offset}: {message}")]
    Syntax {
        /// Byte offset of the offending token.
        offset: usize,
        /// Human-readable description.
        message: String,
    },

    /// The expression references a variable that is not in the context.
    #[error("Unknown identifier '{0}' in condition")]
    UnknownIdentifier(String),

    /// The expression calls a function other than the supported built-ins.
    #[error("Unknown function '{0}' in condition")]
    UnknownFunction(String),

    /// Operands cannot be combined by the operator.
    #[error("Type error in condition: {0}")]
    Type(String),
}

/// Errors that arise while seeding a single file mapping.
#[derive(Error, Debug)]
pub enum SeedError {
    /// The mapping's source file does not exist.
    #[error("Source not found: {0}")]
    SourceMissing(String),

    /// The source is a template but is not valid UTF-8.
    #[error("Template source is not valid UTF-8: {0}")]
    NotUtf8(String),

    /// The destination is absolute or climbs out of the project directory.
    #[error("Destination outside the project directory: {0}")]
    UnsafeDestination(String),

    /// Rendering the template failed.
    #[error("Template rendering failed for {dest}: {source}")]
    Render {
        /// Destination path of the mapping.
        dest: String,
        /// Underlying render error.
        source: RenderError,
    },

    /// Reading the source or writing the destination failed.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path that could not be read or written.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise while executing a post-seed script.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The script file does not exist.
    #[error("Script not found: {0}")]
    NotFound(String),

    /// The script could not be made executable.
    #[error("Cannot make script executable {path}: {source}")]
    Permissions {
        /// Path of the script.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The script process could not be spawned.
    #[error("Failed to execute script {path}: {source}")]
    Spawn {
        /// Path of the script.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The script ran and exited unsuccessfully.
    #[error("Script {path} failed with exit code {code}")]
    Failed {
        /// Path of the script.
        path: String,
        /// Exit code, or -1 when terminated by a signal.
        code: i32,
    },
}
