//! Contract between the staging model and whatever holds the photos.
//!
//! Requests that change the library never block the caller. Each one is
//! handed a [`Completion`] and reports exactly one [`ApplyOutcome`] through
//! it, later, on a channel the model drains from its own thread.

use std::{
    fmt,
    path::PathBuf,
    sync::mpsc::{Receiver, Sender},
};

use anyhow::Result;
use chrono::{DateTime, Local};
use thiserror::Error;

use crate::filter::FilterSpec;

/// Stable identity of a library photo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoId(pub String);

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhotoId {
    fn from(value: &str) -> Self {
        PhotoId(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhotoRef {
    pub id: PhotoId,
    pub path: PathBuf,
    pub created: DateTime<Local>,
    /// Favorite flag as it was when the photo was fetched.
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Authorized,
    Limited,
    Denied,
    Restricted,
}

impl AuthorizationStatus {
    pub fn grants_access(&self) -> bool {
        matches!(self, AuthorizationStatus::Authorized | AuthorizationStatus::Limited)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyKind {
    ToggleFavorite(PhotoId),
    DeleteBatch(Vec<PhotoId>),
}

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("photo {0} is no longer in the library")]
    Missing(PhotoId),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("favorites store error: {0:#}")]
    Store(anyhow::Error),
    #[error("request was dropped before it finished")]
    Disconnected,
}

#[derive(Debug)]
pub struct ApplyOutcome {
    pub kind: ApplyKind,
    pub result: Result<(), ApplyError>,
}

impl ApplyOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// One-shot reply slot for a single apply request.
///
/// Dropping an unfinished completion reports [`ApplyError::Disconnected`],
/// so whoever waits on the outcome channel always hears back.
pub struct Completion {
    kind: ApplyKind,
    tx: Option<Sender<ApplyOutcome>>,
}

impl Completion {
    pub fn new(kind: ApplyKind, tx: Sender<ApplyOutcome>) -> Self {
        Self { kind, tx: Some(tx) }
    }

    pub fn kind(&self) -> &ApplyKind {
        &self.kind
    }

    pub fn finish(mut self, result: Result<(), ApplyError>) {
        self.send(result);
    }

    fn send(&mut self, result: Result<(), ApplyError>) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(ApplyOutcome {
                kind: self.kind.clone(),
                result,
            });
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.send(Err(ApplyError::Disconnected));
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("kind", &self.kind)
            .field("pending", &self.tx.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryEvent {
    /// Something outside the model changed the library.
    Changed,
}

/// Subscription to library change notifications.
///
/// Whatever keeps the observation alive is stored in `guard` and released
/// when the watch is dropped or [`LibraryWatch::unsubscribe`] is called.
pub struct LibraryWatch {
    events: Receiver<LibraryEvent>,
    guard: Option<Box<dyn Send>>,
}

impl LibraryWatch {
    pub fn new(events: Receiver<LibraryEvent>, guard: Option<Box<dyn Send>>) -> Self {
        Self { events, guard }
    }

    /// Drains pending notifications; returns true if any arrived.
    pub fn take_changes(&self) -> bool {
        let mut changed = false;
        while let Ok(LibraryEvent::Changed) = self.events.try_recv() {
            changed = true;
        }
        changed
    }

    pub fn unsubscribe(mut self) {
        self.guard.take();
    }
}

impl fmt::Debug for LibraryWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryWatch")
            .field("active", &self.guard.is_some())
            .finish()
    }
}

pub trait PhotoSource {
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Asks for access; the answer arrives on the returned channel.
    fn request_authorization(&self) -> Receiver<AuthorizationStatus>;

    /// Photos matching `filter`, newest first.
    fn fetch(&self, filter: &FilterSpec) -> Result<Vec<PhotoRef>>;

    fn toggle_favorite(&self, photo: &PhotoRef, done: Completion);

    /// Deletes all `photos` as one batch with a single outcome.
    fn delete_batch(&self, photos: Vec<PhotoRef>, done: Completion);

    fn observe_changes(&self) -> Result<LibraryWatch>;
}
