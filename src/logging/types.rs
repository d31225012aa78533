//! The [`Log`] trait and the per-item records it collects for the summary.

/// Whether a summary item is a seeded file or a post-seed script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// A file mapping written into the project.
    File,
    /// A post-seed script.
    Script,
}

/// How a file or script ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    /// Written, or run to a zero exit.
    Done,
    /// Its condition evaluated to false.
    NotApplicable,
    /// Kept as it was: the destination exists or the user declined.
    Skipped,
    /// Dry run; reported only.
    DryRun,
    /// Could not be written or run.
    Failed,
}

/// One file or script of a seed run, as shown in the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedItem {
    /// Profile the item came from.
    pub profile: String,
    /// Destination path for files, file name for scripts.
    pub name: String,
    /// File or script.
    pub kind: ItemKind,
    /// Final status.
    pub status: ItemStatus,
    /// Short detail, e.g. `exists` or `exit 1`.
    pub detail: Option<String>,
}

impl SeedItem {
    /// A file item without detail.
    #[must_use]
    pub fn file(profile: &str, dest: &str, status: ItemStatus) -> Self {
        Self::new(profile, dest, ItemKind::File, status)
    }

    /// A script item without detail.
    #[must_use]
    pub fn script(profile: &str, name: &str, status: ItemStatus) -> Self {
        Self::new(profile, name, ItemKind::Script, status)
    }

    fn new(profile: &str, name: &str, kind: ItemKind, status: ItemStatus) -> Self {
        Self {
            profile: profile.to_string(),
            name: name.to_string(),
            kind,
            status,
            detail: None,
        }
    }

    /// Attach a detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: Option<&str>) -> Self {
        self.detail = detail.map(String::from);
        self
    }
}

/// Sink for everything the seeding code reports.
///
/// Commands pass the console [`Logger`](super::logger::Logger); embedders and
/// tests pass a [`MemoryLog`](super::memory::MemoryLog).
pub trait Log: Send + Sync {
    /// Section header.
    fn stage(&self, msg: &str);
    /// Normal progress line.
    fn info(&self, msg: &str);
    /// Detail shown only with `--verbose`; always kept in the log file.
    fn debug(&self, msg: &str);
    /// Something the user should look at; seeding continues.
    fn warn(&self, msg: &str);
    /// A file or script failed.
    fn error(&self, msg: &str);
    /// What a dry run would have done.
    fn dry_run(&self, msg: &str);
    /// Remember a file or script result for the summary.
    fn record(&self, item: SeedItem);
}
