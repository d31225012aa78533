//! Running post-seed scripts.
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, ExitStatus, Output, Stdio};

use crate::error::ScriptError;

/// Result of a script execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured stdout; empty when output was streamed to the terminal.
    pub stdout: String,
    /// Captured stderr; empty when output was streamed to the terminal.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl From<ExitStatus> for ExecResult {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
            ..Self::default()
        }
    }
}

/// Where a script's stdout and stderr go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Stream to the terminal.
    #[default]
    Inherit,
    /// Capture into the [`ExecResult`].
    Capture,
}

/// Run the script at `path` in `cwd` with exactly the variables in `env`.
///
/// The process environment is not inherited; callers pass the complete
/// environment. A non-zero exit is reported through
/// [`ExecResult::success`], not as an error.
///
/// # Errors
///
/// Returns [`ScriptError::NotFound`] if `path` is not a file and
/// [`ScriptError::Spawn`] if the process cannot be started.
pub fn run_script(
    path: &Path,
    cwd: &Path,
    env: &BTreeMap<String, String>,
    mode: OutputMode,
) -> Result<ExecResult, ScriptError> {
    if !path.is_file() {
        return Err(ScriptError::NotFound(path.display().to_string()));
    }

    let mut cmd = Command::new(path);
    cmd.current_dir(cwd).env_clear().envs(env).stdin(Stdio::inherit());

    let spawn_err = |source| ScriptError::Spawn {
        path: path.display().to_string(),
        source,
    };

    match mode {
        OutputMode::Inherit => cmd.status().map(ExecResult::from).map_err(spawn_err),
        OutputMode::Capture => cmd.output().map(ExecResult::from).map_err(spawn_err),
    }
}

/// Add execute permission for everyone who can read the script.
///
/// # Errors
///
/// Returns [`ScriptError::Permissions`] if the mode cannot be read or set.
#[cfg(unix)]
pub fn ensure_executable(path: &Path) -> Result<(), ScriptError> {
    use std::os::unix::fs::PermissionsExt as _;

    let perm_err = |source| ScriptError::Permissions {
        path: path.display().to_string(),
        source,
    };
    let mut perms = std::fs::metadata(path).map_err(perm_err)?.permissions();
    let mode = perms.mode();
    if mode & 0o111 != 0o111 {
        perms.set_mode(mode | 0o111);
        std::fs::set_permissions(path, perms).map_err(perm_err)?;
    }
    Ok(())
}

/// No-op on platforms without an execute bit.
///
/// # Errors
///
/// Never fails on this platform.
#[cfg(not(unix))]
pub const fn ensure_executable(_path: &Path) -> Result<(), ScriptError> {
    Ok(())
}
