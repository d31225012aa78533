//! Project seeding engine.
//!
//! Resolves inheritable profiles into a chain, layers variables from
//! computed values, project metadata, profiles, configuration, environment,
//! and the command line, then renders each profile's templates into a
//! project directory and runs its post-seed scripts.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: global and project configuration files
//! - **[`profile`]**: manifest loading and `extends` chain resolution
//! - **[`variables`]** and **[`condition`]**: the variable context and the
//!   boolean expressions evaluated against it
//! - **[`template`]**: rendering with the custom filters and globals
//! - **[`seed`]**: writing files and running scripts for a resolved chain
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod condition;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod profile;
pub mod prompt;
pub mod seed;
pub mod template;
pub mod variables;
