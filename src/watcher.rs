//! Filesystem watcher for the icon source directory.
//!
//! Translates notify events into [`IconChange`] notifications and forwards
//! them to the rebuild scheduler over an unbounded tokio channel. No
//! filtering or debouncing happens here; the watcher thread only forwards.

use crate::scheduler::{ChangeKind, IconChange};
use anyhow::{Context, Result};
use notify::event::{MetadataKind, ModifyKind, RenameMode};
use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Poll interval of the fallback backend.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Map one notify event to icon change notifications.
///
/// Renames become an `Unlink` of the old path and an `Add` of the new one.
/// Access and other metadata events produce nothing.
pub fn map_event(event: &Event) -> Vec<IconChange> {
    let all = |kind: ChangeKind| -> Vec<IconChange> {
        event
            .paths
            .iter()
            .map(|path| IconChange::new(kind, path))
            .collect()
    };

    match event.kind {
        EventKind::Create(_) => all(ChangeKind::Add),
        EventKind::Remove(_) => all(ChangeKind::Unlink),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => all(ChangeKind::Unlink),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => all(ChangeKind::Add),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut changes = Vec::new();
            if let [from, to, ..] = event.paths.as_slice() {
                changes.push(IconChange::new(ChangeKind::Unlink, from));
                changes.push(IconChange::new(ChangeKind::Add, to));
            }
            changes
        }
        // Backends that cannot tell the rename direction
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|path| {
                let kind = if path.exists() {
                    ChangeKind::Add
                } else {
                    ChangeKind::Unlink
                };
                IconChange::new(kind, path)
            })
            .collect(),
        EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Any)
        | EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)) => {
            all(ChangeKind::Change)
        }
        _ => Vec::new(),
    }
}

fn make_event_handler(
    tx: UnboundedSender<IconChange>,
) -> impl Fn(std::result::Result<Event, notify::Error>) + Send + 'static {
    move |result: std::result::Result<Event, notify::Error>| match result {
        Ok(event) => {
            for change in map_event(&event) {
                log::trace!("Source change: {:?} {}", change.kind, change.path.display());
                if tx.send(change).is_err() {
                    // Scheduler has stopped
                    return;
                }
            }
        }
        Err(e) => log::warn!("Icon source watch error: {}", e),
    }
}

/// Watches the icon source directory recursively.
pub struct SourceWatcher {
    /// The file system watcher (kept alive to maintain watching).
    _watcher: Box<dyn Watcher + Send>,
    source_dir: PathBuf,
}

impl std::fmt::Debug for SourceWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceWatcher")
            .field("source_dir", &self.source_dir)
            .finish_non_exhaustive()
    }
}

impl SourceWatcher {
    /// Start watching `source_dir`, returning the watcher and the receiving
    /// end of its change stream.
    ///
    /// The stream closes when the watcher is dropped.
    ///
    /// # Errors
    /// Returns an error if the directory doesn't exist or watching fails on
    /// both backends.
    pub fn start(source_dir: &Path) -> Result<(Self, UnboundedReceiver<IconChange>)> {
        let (tx, rx) = unbounded_channel();
        let watcher = Self::new(source_dir, tx)?;
        Ok((watcher, rx))
    }

    /// Start watching `source_dir`, sending changes on `tx`.
    pub fn new(source_dir: &Path, tx: UnboundedSender<IconChange>) -> Result<Self> {
        if !source_dir.is_dir() {
            anyhow::bail!("Icon source directory not found: {}", source_dir.display());
        }
        let source_dir = source_dir
            .canonicalize()
            .unwrap_or_else(|_| source_dir.to_path_buf());

        let mut watcher = Self::create_watcher(tx)?;
        watcher
            .watch(&source_dir, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", source_dir.display()))?;

        log::info!("Watching icon sources in {}", source_dir.display());
        Ok(Self {
            _watcher: watcher,
            source_dir,
        })
    }

    /// Native backend first, `PollWatcher` when it cannot be initialised.
    fn create_watcher(tx: UnboundedSender<IconChange>) -> Result<Box<dyn Watcher + Send>> {
        match notify::recommended_watcher(make_event_handler(tx.clone())) {
            Ok(w) => {
                log::debug!("Source watcher: using native (RecommendedWatcher) backend");
                Ok(Box::new(w))
            }
            Err(e) => {
                log::warn!(
                    "Source watcher: native backend unavailable ({}); falling back to PollWatcher",
                    e
                );
                let poll_watcher = PollWatcher::new(
                    make_event_handler(tx),
                    NotifyConfig::default().with_poll_interval(POLL_INTERVAL),
                )
                .context("Failed to create fallback PollWatcher")?;
                Ok(Box::new(poll_watcher))
            }
        }
    }

    /// Canonical directory being watched.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, RemoveKind};
    use tempfile::TempDir;

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |event, path| event.add_path(PathBuf::from(path)))
    }

    #[test]
    fn test_map_basic_kinds() {
        assert_eq!(
            map_event(&event(EventKind::Create(CreateKind::File), &["/i/a.svg"])),
            vec![IconChange::new(ChangeKind::Add, "/i/a.svg")]
        );
        assert_eq!(
            map_event(&event(EventKind::Remove(RemoveKind::File), &["/i/a.svg"])),
            vec![IconChange::new(ChangeKind::Unlink, "/i/a.svg")]
        );
        assert_eq!(
            map_event(&event(
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                &["/i/a.svg"]
            )),
            vec![IconChange::new(ChangeKind::Change, "/i/a.svg")]
        );
    }

    #[test]
    fn test_map_rename_both() {
        let changes = map_event(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/i/old.svg", "/i/new.svg"],
        ));
        assert_eq!(
            changes,
            vec![
                IconChange::new(ChangeKind::Unlink, "/i/old.svg"),
                IconChange::new(ChangeKind::Add, "/i/new.svg"),
            ]
        );
    }

    #[test]
    fn test_map_ignores_access() {
        let changes = map_event(&event(EventKind::Access(AccessKind::Any), &["/i/a.svg"]));
        assert!(changes.is_empty());
    }

    #[test]
    fn test_watcher_requires_directory() {
        let (tx, _rx) = unbounded_channel();
        assert!(SourceWatcher::new(Path::new("/nonexistent/icon-font-watch"), tx).is_err());
    }

    #[test]
    fn test_watcher_creation() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (watcher, _rx) = SourceWatcher::start(temp_dir.path()).unwrap();
        assert_eq!(
            watcher.source_dir(),
            temp_dir.path().canonicalize().unwrap()
        );
    }
}
