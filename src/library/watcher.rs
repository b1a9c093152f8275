use std::{
    path::{Component, Path},
    sync::mpsc::{self, RecvTimeoutError, Sender},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::source::{LibraryEvent, LibraryWatch};

/// Starts watching `root` and reports changes, coalescing bursts that arrive
/// within `debounce` into one [`LibraryEvent::Changed`].
pub fn watch_library(root: &Path, recursive: bool, debounce: Duration) -> Result<LibraryWatch> {
    let (raw_tx, raw_rx) = mpsc::channel::<()>();
    let (event_tx, event_rx) = mpsc::channel();

    let watched_root = root.to_path_buf();
    let mut watcher: RecommendedWatcher = notify::recommended_watcher(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if is_relevant(&watched_root, &event) {
                    let _ = raw_tx.send(());
                }
            }
            Err(err) => warn!("library watch error: {err}"),
        },
    )
    .context("Unable to create library watcher")?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher
        .watch(root, mode)
        .with_context(|| format!("Unable to watch {}", root.display()))?;

    spawn_debouncer(raw_rx, event_tx, debounce)?;
    debug!(root = %root.display(), recursive, "watching library for changes");

    Ok(LibraryWatch::new(event_rx, Some(Box::new(watcher))))
}

fn spawn_debouncer(
    raw_rx: mpsc::Receiver<()>,
    event_tx: Sender<LibraryEvent>,
    debounce: Duration,
) -> Result<()> {
    thread::Builder::new()
        .name("photoswipe-watch".into())
        .spawn(move || {
            // Ends once the watcher (and with it the raw sender) is dropped.
            while raw_rx.recv().is_ok() {
                loop {
                    match raw_rx.recv_timeout(debounce) {
                        Ok(()) => continue,
                        Err(RecvTimeoutError::Timeout) => break,
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
                if event_tx.send(LibraryEvent::Changed).is_err() {
                    return;
                }
            }
        })
        .context("Unable to spawn library watch thread")?;
    Ok(())
}

fn is_relevant(root: &Path, event: &Event) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    event.paths.iter().any(|path| !inside_hidden(root, path))
}

/// True for paths below a dot-folder of the library (trash, state, temp files).
pub fn inside_hidden(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|component| match component {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}
