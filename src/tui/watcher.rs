//! File system watcher for live reload.
//!
//! Watches the open page and reports when it has been rewritten, so the
//! navigation tree can be rebuilt from the new markup.

use notify::{
    Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::{AccessKind, AccessMode, ModifyKind},
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

pub struct FileWatcher {
    watcher: RecommendedWatcher,
    receiver: Receiver<Result<Event, notify::Error>>,
    path: PathBuf,
    /// Debounce: ignore events within this duration of the last reload
    last_reload: Instant,
    debounce_duration: Duration,
}

impl FileWatcher {
    /// Start watching a single file.
    pub fn new(path: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;

        Ok(Self {
            watcher,
            receiver: rx,
            path: path.to_path_buf(),
            last_reload: Instant::now(),
            debounce_duration: Duration::from_millis(100),
        })
    }

    /// Drain pending events. Returns true if a reload should be triggered.
    pub fn check_for_changes(&mut self) -> bool {
        let mut should_reload = false;

        loop {
            match self.receiver.try_recv() {
                Ok(Ok(event)) => {
                    if self.is_relevant_event(&event) {
                        should_reload = true;
                    }
                }
                Ok(Err(e)) => tracing::debug!(error = %e, "watch error"),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if should_reload {
            let now = Instant::now();
            if now.duration_since(self.last_reload) >= self.debounce_duration {
                self.last_reload = now;
                return true;
            }
        }

        false
    }

    /// Editors that save by rename drop the inotify watch; re-arm it.
    pub fn rewatch(&mut self) {
        let _ = self.watcher.unwatch(&self.path);
        if let Err(e) = self.watcher.watch(&self.path, RecursiveMode::NonRecursive) {
            tracing::warn!(error = %e, path = %self.path.display(), "failed to re-arm watcher");
        }
    }

    fn is_relevant_event(&self, event: &Event) -> bool {
        if !event.paths.iter().any(|p| p == &self.path) {
            return false;
        }

        matches!(
            event.kind,
            EventKind::Modify(ModifyKind::Data(_))
                | EventKind::Modify(ModifyKind::Any)
                | EventKind::Access(AccessKind::Close(AccessMode::Write))
                | EventKind::Create(_)
        )
    }
}
