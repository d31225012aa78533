//! Console logger used by the `adt` binary.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{ItemKind, ItemStatus, Log, SeedItem};
use super::utils::log_file_path;

const RESET: &str = "\x1b[0m";

/// Emits through [`tracing`] and collects seed items for the closing summary.
///
/// Whatever reaches the console also lands in
/// `$XDG_CACHE_HOME/adt/<command>.log`, with debug lines included and colors
/// removed.
#[derive(Debug)]
pub struct Logger {
    items: Mutex<Vec<SeedItem>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Logger for `command`. The log file itself is opened by
    /// [`init_subscriber`](super::subscriber::init_subscriber); this only
    /// remembers where it is so the summary can point to it.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Where the log file is written, if anywhere.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Items recorded so far, in order.
    #[must_use]
    pub fn items(&self) -> Vec<SeedItem> {
        self.items.lock().map_or_else(|_| Vec::new(), |g| g.clone())
    }

    /// Print every recorded file and script grouped by profile, then the
    /// totals. Prints nothing when no item was recorded.
    pub fn print_summary(&self) {
        let items = self.items();
        if items.is_empty() {
            return;
        }

        self.stage("Summary");
        let mut profile: Option<&str> = None;
        for item in &items {
            if profile != Some(item.profile.as_str()) {
                self.info(&item.profile);
                profile = Some(&item.profile);
            }
            self.info(&format!("  {}", item_line(item)));
        }
        self.info(&totals(&items));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}{RESET}", path.display()));
        }
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    fn record(&self, item: SeedItem) {
        if let Ok(mut items) = self.items.lock() {
            items.push(item);
        }
    }
}

/// Icon and color of a status.
const fn style(status: ItemStatus) -> (&'static str, &'static str) {
    match status {
        ItemStatus::Done => ("✓", "\x1b[32m"),
        ItemStatus::NotApplicable => ("·", "\x1b[2m"),
        ItemStatus::Skipped => ("○", "\x1b[33m"),
        ItemStatus::DryRun => ("~", "\x1b[37m"),
        ItemStatus::Failed => ("✗", "\x1b[31m"),
    }
}

fn item_line(item: &SeedItem) -> String {
    let (icon, color) = style(item.status);
    let kind = match item.kind {
        ItemKind::File => "",
        ItemKind::Script => " [script]",
    };
    let detail = item
        .detail
        .as_ref()
        .map_or_else(String::new, |d| format!(" ({d})"));
    format!("{color}{icon} {}{kind}{detail}{RESET}", item.name)
}

/// `2 files, 1 script: 2 done, 1 failed`. Statuses with no items are left out.
fn totals(items: &[SeedItem]) -> String {
    let files = items.iter().filter(|i| i.kind == ItemKind::File).count();
    let scripts = items.len() - files;

    let counts = [
        (ItemStatus::Done, "done"),
        (ItemStatus::NotApplicable, "not applicable"),
        (ItemStatus::Skipped, "skipped"),
        (ItemStatus::DryRun, "dry run"),
        (ItemStatus::Failed, "failed"),
    ]
    .into_iter()
    .filter_map(|(status, label)| {
        let n = items.iter().filter(|i| i.status == status).count();
        (n > 0).then(|| format!("{}{n} {label}{RESET}", style(status).1))
    })
    .collect::<Vec<_>>()
    .join(", ");

    format!(
        "{}, {}: {counts}",
        plural(files, "file"),
        plural(scripts, "script")
    )
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    fn plain(s: &str) -> String {
        super::super::utils::strip_ansi(s)
    }

    #[test]
    fn records_through_the_trait() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.items().is_empty());

        let dyn_log: &dyn Log = &log;
        dyn_log.record(
            SeedItem::file("base", "LICENSE", ItemStatus::Skipped).with_detail(Some("exists")),
        );
        let items = log.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "LICENSE");
        assert_eq!(items[0].detail.as_deref(), Some("exists"));
    }

    #[test]
    fn totals_count_files_and_scripts_separately() {
        let items = [
            SeedItem::file("python", "ruff.toml", ItemStatus::Done),
            SeedItem::file("python", "README.md", ItemStatus::Skipped),
            SeedItem::script("python", "setup.sh", ItemStatus::Failed),
        ];
        assert_eq!(
            plain(&totals(&items)),
            "2 files, 1 script: 1 done, 1 skipped, 1 failed"
        );

        let dry = [SeedItem::file("base", "a", ItemStatus::DryRun)];
        assert_eq!(plain(&totals(&dry)), "1 file, 0 scripts: 1 dry run");
    }

    #[test]
    fn item_lines_mark_scripts() {
        let script =
            SeedItem::script("python", "setup.sh", ItemStatus::Failed).with_detail(Some("exit 1"));
        assert_eq!(plain(&item_line(&script)), "✗ setup.sh [script] (exit 1)");
        let file = SeedItem::file("base", "Dockerfile", ItemStatus::NotApplicable);
        assert_eq!(plain(&item_line(&file)), "· Dockerfile");
    }

    #[test]
    fn log_file_is_created() {
        let (log, _tmp, _guard) = isolated_logger();
        let path = log.log_path().expect("log path should exist");
        assert!(path.exists(), "log file should be created by the file layer");
    }

    #[test]
    fn messages_written_to_file_with_tags() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("marker-{}", std::process::id());
        log.stage(&format!("stage-{marker}"));
        log.dry_run(&format!("dry-{marker}"));
        log.warn(&format!("warn-{marker}"));
        log.error(&format!("error-{marker}"));
        log.debug(&format!("debug-{marker}"));

        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains(&format!("==> stage-{marker}")));
        assert!(contents.contains(&format!("[dry run] dry-{marker}")));
        assert!(contents.contains(&format!("[warn] warn-{marker}")));
        assert!(contents.contains(&format!("[error] error-{marker}")));
        assert!(
            contents.contains(&format!("[debug] debug-{marker}")),
            "debug messages should always appear in the log file"
        );
    }

    #[test]
    fn summary_groups_by_profile_in_the_log_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record(SeedItem::file("base", "LICENSE", ItemStatus::Done));
        log.record(SeedItem::file("python", "ruff.toml", ItemStatus::Done));
        log.record(
            SeedItem::script("python", "setup.sh", ItemStatus::Failed).with_detail(Some("exit 1")),
        );
        log.print_summary();

        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("==> Summary"));
        let base = contents.find("     base\n").unwrap();
        let python = contents.find("     python\n").unwrap();
        assert!(base < python);
        assert!(contents.contains("✗ setup.sh [script] (exit 1)"));
        assert!(contents.contains("2 files, 1 script: 2 done, 1 failed"));
        assert!(!contents.contains('\x1b'));
    }

    #[test]
    fn empty_summary_prints_nothing() {
        let (log, _tmp, _guard) = isolated_logger();
        log.print_summary();
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(!contents.contains("Summary"));
    }
}
