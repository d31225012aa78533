//! In-memory [`Log`] that captures messages and seed items.
use std::sync::Mutex;

use super::types::{Log, SeedItem};

/// A captured log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// A stage header entry.
    Stage(String),
    /// An informational entry.
    Info(String),
    /// A debug entry.
    Debug(String),
    /// A warning entry.
    Warn(String),
    /// An error entry.
    Error(String),
    /// A dry-run entry.
    DryRun(String),
}

impl LogEntry {
    /// The message text, whatever the level.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Stage(m)
            | Self::Info(m)
            | Self::Debug(m)
            | Self::Warn(m)
            | Self::Error(m)
            | Self::DryRun(m) => m,
        }
    }
}

/// Implement the display methods of [`Log`] by pushing each message into
/// `self.entries` as the corresponding [`LogEntry`] variant.
macro_rules! capture_log_methods {
    ($($method:ident => $variant:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry::$variant(msg.to_string()));
                }
            }
        )+
    };
}

/// Logger that keeps everything in memory.
///
/// Used where console output is unwanted: embedding the seeding engine in
/// another tool, and tests asserting on what was logged.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
    items: Mutex<Vec<SeedItem>>,
}

impl MemoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages logged so far, in order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Files and scripts recorded so far, in order.
    #[must_use]
    pub fn items(&self) -> Vec<SeedItem> {
        self.items.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Whether any message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.message().contains(needle))
    }
}

impl Log for MemoryLog {
    capture_log_methods! {
        stage   => Stage,
        info    => Info,
        debug   => Debug,
        warn    => Warn,
        error   => Error,
        dry_run => DryRun,
    }

    fn record(&self, item: SeedItem) {
        if let Ok(mut guard) = self.items.lock() {
            guard.push(item);
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::ItemStatus;

    #[test]
    fn captures_messages_in_order() {
        let log = MemoryLog::new();
        log.stage("Seeding");
        log.info("created a");
        log.dry_run("would create b");
        log.warn("careful");
        assert_eq!(
            log.entries(),
            vec![
                LogEntry::Stage("Seeding".into()),
                LogEntry::Info("created a".into()),
                LogEntry::DryRun("would create b".into()),
                LogEntry::Warn("careful".into()),
            ]
        );
        assert!(log.contains("would create"));
        assert!(!log.contains("missing"));
    }

    #[test]
    fn records_items() {
        let log = MemoryLog::new();
        let dyn_log: &dyn Log = &log;
        dyn_log.record(
            SeedItem::file("base", "README.md", ItemStatus::DryRun)
                .with_detail(Some("would create")),
        );
        let items = log.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, ItemStatus::DryRun);
        assert_eq!(items[0].detail.as_deref(), Some("would create"));
    }
}
