//! Document watcher.
//!
//! Watches the single source file and calls back once per settled change.
//!
//! ```text
//! notify ──► ChangeKind ──► channel ──► watch loop ──► Debouncer ──► on_change()
//!                                           │
//!                                           └──► Rewatch (after rename/remove)
//! ```
//!
//! The loop only sees [`ChangeKind`] values from a channel and re-subscribes
//! through the [`Rewatch`] trait, so tests drive it with synthetic events.

mod debouncer;


pub use debouncer::{Action, ChangeKind, Debouncer, MAX_REWATCH_ATTEMPTS, WatchTiming};
#[cfg(test)]
pub use debouncer::WatchState;

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Re-subscribes to the watched path after the file was swapped out.
pub trait Rewatch {
    fn rewatch(&mut self) -> notify::Result<()>;
}

/// OS watch on one path.
struct PathWatch {
    watcher: RecommendedWatcher,
    path: PathBuf,
}

impl Rewatch for PathWatch {
    fn rewatch(&mut self) -> notify::Result<()> {
        // The old handle may already be gone with the old inode.
        let _ = self.watcher.unwatch(&self.path);
        self.watcher.watch(&self.path, RecursiveMode::NonRecursive)
    }
}

/// Watcher for the previewed document.
pub struct DocumentWatcher {
    watch: PathWatch,
    events: mpsc::Receiver<ChangeKind>,
}

impl DocumentWatcher {
    /// Start watching `path`. Events buffer until [`run`](Self::run) is
    /// awaited.
    pub fn new(path: &Path) -> notify::Result<Self> {
        let (tx, events) = mpsc::channel(64);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    let Some(kind) = ChangeKind::from_event_kind(&event.kind) else {
                        return;
                    };
                    crate::debug!("watch"; "{}: {:?}", kind.label(), event.paths);
                    // Receiver dropped means the loop is gone; nothing left to notify.
                    let _ = tx.blocking_send(kind);
                }
                Err(e) => crate::log!("watch"; "watch error: {}", e),
            }
        })?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;

        Ok(Self {
            watch: PathWatch {
                watcher,
                path: path.to_path_buf(),
            },
            events,
        })
    }

    /// Run until the event stream closes.
    pub async fn run(self, timing: WatchTiming, on_change: impl FnMut()) {
        run_loop(self.events, self.watch, timing, on_change).await;
    }
}

/// Debounce loop: feeds events into a [`Debouncer`] and acts on its deadlines.
pub async fn run_loop<R: Rewatch>(
    mut events: mpsc::Receiver<ChangeKind>,
    mut rewatcher: R,
    timing: WatchTiming,
    mut on_change: impl FnMut(),
) {
    let mut debouncer = Debouncer::new(timing);

    loop {
        let sleep = debouncer.sleep_duration(Instant::now().into_std());

        tokio::select! {
            biased;
            event = events.recv() => match event {
                Some(kind) => debouncer.record(kind, Instant::now().into_std()),
                None => break,
            },
            _ = tokio::time::sleep(sleep) => {
                match debouncer.poll(Instant::now().into_std()) {
                    Some(Action::Render) => on_change(),
                    Some(Action::Rewatch { attempt }) => {
                        let ok = match rewatcher.rewatch() {
                            Ok(()) => true,
                            Err(e) => {
                                crate::debug!("watch"; "rewatch attempt {} failed: {}", attempt + 1, e);
                                false
                            }
                        };
                        if debouncer.rewatched(ok, Instant::now().into_std()) == Some(Action::Render) {
                            crate::log!("watch"; "file did not come back after {} attempts; watch lost", MAX_REWATCH_ATTEMPTS);
                            on_change();
                        }
                    }
                    None => {}
                }
            }
        }
    }

    crate::debug!("watch"; "event stream closed");
}
