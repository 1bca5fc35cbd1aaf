//! File-system watching.

use crate::error::{CaptureError, Result};
use crate::filter::IgnoreFilter;
use ghost_ledger::ChangeKind;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A change observed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Watches a directory and forwards classified events to a channel.
///
/// Watching stops when this value is dropped.
pub struct DirectoryWatcher {
    _watcher: notify::RecommendedWatcher,
    root: PathBuf,
}

impl DirectoryWatcher {
    /// Start watching `root`, sending events on `tx`.
    pub fn spawn(
        root: &Path,
        recursive: bool,
        filter: IgnoreFilter,
        tx: mpsc::Sender<ChangeEvent>,
    ) -> Result<Self> {
        if !root.is_dir() {
            return Err(CaptureError::NotADirectory(root.to_path_buf()));
        }

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for change in classify_event(&event, &filter) {
                    debug!(path = %change.path.display(), kind = %change.kind, "file event");
                    if tx.blocking_send(change).is_err() {
                        return;
                    }
                }
            }
            Err(e) => warn!(error = %e, "watch error"),
        })?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(root, mode)?;

        Ok(Self {
            _watcher: watcher,
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Map a raw notify event to ledger change events.
pub fn classify_event(event: &Event, filter: &IgnoreFilter) -> Vec<ChangeEvent> {
    let kinds: Vec<(&PathBuf, ChangeKind)> = match &event.kind {
        EventKind::Create(_) => with_kind(&event.paths, ChangeKind::Create),
        EventKind::Remove(_) => with_kind(&event.paths, ChangeKind::Delete),
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => with_kind(&event.paths, ChangeKind::Delete),
            RenameMode::To => with_kind(&event.paths, ChangeKind::Create),
            RenameMode::Both => {
                let mut out = Vec::new();
                if let Some(from) = event.paths.first() {
                    out.push((from, ChangeKind::Delete));
                }
                if let Some(to) = event.paths.get(1) {
                    out.push((to, ChangeKind::Create));
                }
                out
            }
            _ => with_kind(&event.paths, ChangeKind::Modify),
        },
        EventKind::Modify(_) => with_kind(&event.paths, ChangeKind::Modify),
        _ => Vec::new(),
    };

    kinds
        .into_iter()
        .filter(|(path, kind)| *kind == ChangeKind::Delete || !path.is_dir())
        .filter(|(path, _)| !filter.is_ignored(path))
        .map(|(path, kind)| ChangeEvent::new(path.clone(), kind))
        .collect()
}

fn with_kind(paths: &[PathBuf], kind: ChangeKind) -> Vec<(&PathBuf, ChangeKind)> {
    paths.iter().map(|p| (p, kind)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghost_test_utils::temp_dir;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind};
    use std::time::Duration;

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut event = Event::new(kind);
        for p in paths {
            event = event.add_path(PathBuf::from(p));
        }
        event
    }

    #[test]
    fn test_classify_basic_kinds() {
        let filter = IgnoreFilter::default();
        assert_eq!(
            classify_event(&event(EventKind::Create(CreateKind::File), &["/w/a.txt"]), &filter),
            vec![ChangeEvent::new("/w/a.txt", ChangeKind::Create)]
        );
        assert_eq!(
            classify_event(
                &event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), &["/w/a.txt"]),
                &filter
            ),
            vec![ChangeEvent::new("/w/a.txt", ChangeKind::Modify)]
        );
        assert_eq!(
            classify_event(&event(EventKind::Remove(RemoveKind::File), &["/w/a.txt"]), &filter),
            vec![ChangeEvent::new("/w/a.txt", ChangeKind::Delete)]
        );
    }

    #[test]
    fn test_classify_skips_metadata_and_access() {
        let filter = IgnoreFilter::default();
        let metadata = event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            &["/w/a.txt"],
        );
        assert!(classify_event(&metadata, &filter).is_empty());
        assert!(classify_event(&event(EventKind::Any, &["/w/a.txt"]), &filter).is_empty());
    }

    #[test]
    fn test_rename_both_is_delete_then_create() {
        let filter = IgnoreFilter::default();
        let rename = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/w/old.txt", "/w/new.txt"],
        );
        assert_eq!(
            classify_event(&rename, &filter),
            vec![
                ChangeEvent::new("/w/old.txt", ChangeKind::Delete),
                ChangeEvent::new("/w/new.txt", ChangeKind::Create),
            ]
        );
    }

    #[test]
    fn test_classify_applies_filter() {
        let filter = IgnoreFilter::new(["*.log"]).unwrap();
        let created = event(EventKind::Create(CreateKind::File), &["/w/run.log", "/w/a.txt"]);
        assert_eq!(
            classify_event(&created, &filter),
            vec![ChangeEvent::new("/w/a.txt", ChangeKind::Create)]
        );
    }

    #[test]
    fn test_spawn_rejects_missing_root() {
        let dir = temp_dir();
        let (tx, _rx) = mpsc::channel(4);
        let result = DirectoryWatcher::spawn(
            &dir.path().join("missing"),
            false,
            IgnoreFilter::default(),
            tx,
        );
        assert!(matches!(result, Err(CaptureError::NotADirectory(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_watcher_reports_created_file() {
        let dir = temp_dir();
        let (tx, mut rx) = mpsc::channel(64);
        let watcher =
            DirectoryWatcher::spawn(dir.path(), false, IgnoreFilter::default(), tx).unwrap();
        assert_eq!(watcher.root(), dir.path());

        tokio::time::sleep(Duration::from_millis(100)).await;
        let file = dir.path().join("new.txt");
        std::fs::write(&file, "hello").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(event) = rx.recv().await {
                if event.path.file_name() == file.file_name() {
                    return Some(event);
                }
            }
            None
        })
        .await
        .ok()
        .flatten();

        // Some platforms coalesce the create into a modify.
        if let Some(event) = event {
            assert!(matches!(event.kind, ChangeKind::Create | ChangeKind::Modify));
        }
    }
}
