//! Helpers shared by the console and file outputs.
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

/// CSI sequences (`ESC [ ... final`) and two-byte `ESC x` escapes.
static ANSI_ESCAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\x1b(?:\[[0-?]*[ -/]*[@-~]|[@-_])?").ok());

/// `s` with terminal escape sequences removed, for the log file.
pub(super) fn strip_ansi(s: &str) -> String {
    ANSI_ESCAPE
        .as_ref()
        .map_or_else(|| s.to_string(), |re| re.replace_all(s, "").into_owned())
}

/// `<cache>/adt/<command>.log`, creating the directory. `$XDG_CACHE_HOME`
/// wins when it is absolute; otherwise the platform cache directory is used.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(dirs::cache_dir)?
        .join("adt");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Current UTC time rendered with a `chrono` format string.
pub(super) fn utc_now(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}
