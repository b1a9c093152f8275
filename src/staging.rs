//! The staging model: what the user has decided about each photo, held back
//! until they confirm.
//!
//! Pending intents are keyed by [`PhotoId`] rather than by list position, so
//! a re-fetch between staging and committing cannot redirect an intent to a
//! different photo. Positions only matter for rendering and for trimming
//! the list after a delete.

use std::{
    collections::{HashMap, HashSet},
    sync::mpsc::{Receiver, TryRecvError},
};

use tracing::{debug, info, warn};

use crate::{
    commit::{CommitBatch, CommitReport},
    filter::FilterSpec,
    source::{
        ApplyKind, ApplyOutcome, AuthorizationStatus, LibraryWatch, PhotoId, PhotoRef, PhotoSource,
    },
};

const CONFIRMATION_HEADER: &str = "Are you sure you want to make changes to your photo library?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Authorizing,
    /// Access refused; stays here until [`StagingModel::retry_authorization`].
    Denied(AuthorizationStatus),
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Favorite,
    Keep,
    Trash,
}

/// Three independent sets of staged intents. One photo may sit in several.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingIntents {
    pub favorite_toggle: HashSet<PhotoId>,
    pub keep: HashSet<PhotoId>,
    pub trash: HashSet<PhotoId>,
}

impl PendingIntents {
    pub fn set(&self, kind: IntentKind) -> &HashSet<PhotoId> {
        match kind {
            IntentKind::Favorite => &self.favorite_toggle,
            IntentKind::Keep => &self.keep,
            IntentKind::Trash => &self.trash,
        }
    }

    fn set_mut(&mut self, kind: IntentKind) -> &mut HashSet<PhotoId> {
        match kind {
            IntentKind::Favorite => &mut self.favorite_toggle,
            IntentKind::Keep => &mut self.keep,
            IntentKind::Trash => &mut self.trash,
        }
    }

    /// Flips membership of `id`; returns whether it is now staged.
    pub fn toggle(&mut self, kind: IntentKind, id: &PhotoId) -> bool {
        let set = self.set_mut(kind);
        if set.remove(id) {
            false
        } else {
            set.insert(id.clone());
            true
        }
    }

    pub fn contains(&self, kind: IntentKind, id: &PhotoId) -> bool {
        self.set(kind).contains(id)
    }

    /// Sum of the set sizes; a photo in two sets counts twice.
    pub fn total(&self) -> usize {
        self.favorite_toggle.len() + self.keep.len() + self.trash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn clear(&mut self) {
        self.favorite_toggle.clear();
        self.keep.clear();
        self.trash.clear();
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&PhotoId) -> bool) {
        self.favorite_toggle.retain(|id| keep(id));
        self.keep.retain(|id| keep(id));
        self.trash.retain(|id| keep(id));
    }

    /// Drops every intent that is also present in `other`.
    pub fn subtract(&mut self, other: &PendingIntents) {
        self.favorite_toggle.retain(|id| !other.favorite_toggle.contains(id));
        self.keep.retain(|id| !other.keep.contains(id));
        self.trash.retain(|id| !other.trash.contains(id));
    }
}

struct InFlight {
    batch: CommitBatch,
    staged: PendingIntents,
    /// Favorite value each toggled photo should end up with.
    favorite_targets: HashMap<PhotoId, bool>,
}

pub struct StagingModel<S: PhotoSource> {
    source: S,
    phase: Phase,
    authorization: Option<Receiver<AuthorizationStatus>>,
    watch: Option<LibraryWatch>,
    filter: FilterSpec,
    photos: Vec<PhotoRef>,
    position: usize,
    pending: PendingIntents,
    in_flight: Option<InFlight>,
    /// Set when an outside library change re-fetched the list.
    library_changed: bool,
}

impl<S: PhotoSource> StagingModel<S> {
    pub fn new(source: S, filter: FilterSpec) -> Self {
        Self {
            source,
            phase: Phase::Uninitialized,
            authorization: None,
            watch: None,
            filter,
            photos: Vec::new(),
            position: 0,
            pending: PendingIntents::default(),
            in_flight: None,
            library_changed: false,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn photos(&self) -> &[PhotoRef] {
        &self.photos
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> Option<&PhotoRef> {
        self.photos.get(self.position)
    }

    pub fn pending(&self) -> &PendingIntents {
        &self.pending
    }

    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    /// Leaves `Uninitialized` by asking the source for access.
    pub fn start(&mut self) {
        if self.phase != Phase::Uninitialized {
            return;
        }
        self.begin_authorization();
    }

    /// From `Denied`, asks again; the shell calls this when the environment
    /// may have changed.
    pub fn retry_authorization(&mut self) {
        if matches!(self.phase, Phase::Denied(_)) {
            self.begin_authorization();
        }
    }

    fn begin_authorization(&mut self) {
        debug!(status = ?self.source.authorization_status(), "requesting library access");
        self.phase = Phase::Authorizing;
        self.authorization = Some(self.source.request_authorization());
    }

    fn resolve_authorization(&mut self, status: AuthorizationStatus) {
        self.authorization = None;
        if !status.grants_access() {
            info!(?status, "photo library access denied");
            self.phase = Phase::Denied(status);
            self.stop_observing();
            return;
        }

        info!(?status, "photo library access granted");
        self.phase = Phase::Ready;
        self.reset_and_reload();
        if self.watch.is_none() {
            match self.source.observe_changes() {
                Ok(watch) => self.watch = Some(watch),
                Err(err) => warn!("unable to observe library changes: {err:#}"),
            }
        }
    }

    pub fn stop_observing(&mut self) {
        if let Some(watch) = self.watch.take() {
            watch.unsubscribe();
        }
    }

    /// Drives everything that arrives asynchronously: the authorization
    /// answer, library change notifications and commit outcomes. Returns a
    /// report when a commit settled during this call.
    pub fn poll(&mut self) -> Option<CommitReport> {
        match self.authorization.as_ref().map(Receiver::try_recv) {
            Some(Ok(status)) => self.resolve_authorization(status),
            Some(Err(TryRecvError::Disconnected)) => {
                warn!("authorization request dropped without an answer");
                self.resolve_authorization(AuthorizationStatus::Denied);
            }
            Some(Err(TryRecvError::Empty)) | None => {}
        }

        if self.phase == Phase::Ready {
            let changed = self.watch.as_ref().is_some_and(LibraryWatch::take_changes);
            if changed {
                debug!("library changed, reloading photos");
                self.refresh();
                self.library_changed = true;
            }
        }

        let outcomes = self.in_flight.as_mut()?.batch.poll()?;
        let in_flight = self.in_flight.take()?;
        Some(self.settle(in_flight, outcomes))
    }

    /// True once after [`Self::poll`] reloaded the list because files changed
    /// on disk. Anything derived from file contents is stale at that point.
    pub fn take_library_changed(&mut self) -> bool {
        std::mem::take(&mut self.library_changed)
    }

    /// Replaces the filter, reloads the list, rewinds to the first photo and
    /// forgets everything staged.
    pub fn set_filter(&mut self, filter: FilterSpec) {
        info!(%filter, "filter applied");
        self.filter = filter;
        self.reset_and_reload();
    }

    fn reset_and_reload(&mut self) {
        self.pending.clear();
        self.position = 0;
        if self.phase == Phase::Ready {
            self.photos = self.fetch_photos();
        }
    }

    /// Re-fetch after an outside change. Keeps the current photo in view
    /// when it survived and forgets intents for photos that are gone.
    pub fn refresh(&mut self) {
        if self.phase != Phase::Ready {
            return;
        }
        let current = self.current().map(|photo| photo.id.clone());
        self.photos = self.fetch_photos();
        if let Some(position) = current.and_then(|id| self.position_of(&id)) {
            self.position = position;
        }
        self.clamp_position();

        let present: HashSet<PhotoId> = self.photos.iter().map(|p| p.id.clone()).collect();
        self.pending.retain(|id| present.contains(id));
    }

    fn fetch_photos(&self) -> Vec<PhotoRef> {
        match self.source.fetch(&self.filter) {
            Ok(photos) => {
                debug!(count = photos.len(), "fetched photos");
                photos
            }
            Err(err) => {
                warn!("unable to fetch photos: {err:#}");
                Vec::new()
            }
        }
    }

    fn position_of(&self, id: &PhotoId) -> Option<usize> {
        self.photos.iter().position(|photo| &photo.id == id)
    }

    fn clamp_position(&mut self) {
        if self.position >= self.photos.len() {
            self.position = self.photos.len().saturating_sub(1);
        }
    }

    /// Moves the view. Positions outside the list are ignored.
    pub fn advance_to(&mut self, position: usize) -> bool {
        if position >= self.photos.len() {
            debug!(position, len = self.photos.len(), "ignoring out of range position");
            return false;
        }
        self.position = position;
        true
    }

    pub fn next(&mut self) -> bool {
        self.advance_to(self.position + 1)
    }

    pub fn previous(&mut self) -> bool {
        match self.position.checked_sub(1) {
            Some(position) => self.advance_to(position),
            None => false,
        }
    }

    /// Flips the current photo in the given set. Does nothing on an empty
    /// list; returns whether the photo is now staged.
    pub fn toggle_intent(&mut self, kind: IntentKind) -> bool {
        let Some(id) = self.current().map(|photo| photo.id.clone()) else {
            return false;
        };
        self.pending.toggle(kind, &id)
    }

    pub fn toggle_favorite_intent(&mut self) -> bool {
        self.toggle_intent(IntentKind::Favorite)
    }

    pub fn toggle_keep_intent(&mut self) -> bool {
        self.toggle_intent(IntentKind::Keep)
    }

    pub fn toggle_trash_intent(&mut self) -> bool {
        self.toggle_intent(IntentKind::Trash)
    }

    pub fn is_staged(&self, kind: IntentKind) -> bool {
        self.current()
            .is_some_and(|photo| self.pending.contains(kind, &photo.id))
    }

    /// The heart shows the favorite state the photo will have once pending
    /// toggles are applied: library snapshot XOR staged toggle.
    pub fn is_favorite_glyph_filled(&self) -> bool {
        self.current().is_some_and(|photo| {
            photo.is_favorite != self.pending.contains(IntentKind::Favorite, &photo.id)
        })
    }

    pub fn pending_count(&self) -> usize {
        self.pending.total()
    }

    /// One line per non-empty category, favorite then trash then keep.
    pub fn confirmation_summary(&self) -> String {
        let lines = [
            (self.pending.favorite_toggle.len(), "will have favorite status toggled"),
            (self.pending.trash.len(), "will be deleted"),
            (self.pending.keep.len(), "will be kept"),
        ];

        let mut summary = String::new();
        for (count, action) in lines {
            if count > 0 {
                let noun = if count == 1 { "photo" } else { "photos" };
                summary.push_str(&format!("{count} {noun} {action}\n"));
            }
        }
        summary
    }

    /// Text for the confirm dialog.
    pub fn confirmation_prompt(&self) -> String {
        let mut prompt = format!("{CONFIRMATION_HEADER}\n\n");
        for line in self.confirmation_summary().lines() {
            prompt.push_str(&format!("• {line}\n"));
        }
        prompt
    }

    pub fn is_committing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Sends every staged change to the source. Favorite toggles go out one
    /// request per photo, trashed photos as a single batch, and kept photos
    /// need no request. The result shows up later through [`Self::poll`].
    ///
    /// Returns false when nothing was started: the model is not ready or an
    /// earlier commit has not settled yet.
    pub fn commit(&mut self) -> bool {
        if self.phase != Phase::Ready {
            debug!(phase = ?self.phase, "commit ignored, library not ready");
            return false;
        }
        if self.in_flight.is_some() {
            warn!("commit ignored, previous commit still outstanding");
            return false;
        }

        let staged = self.pending.clone();
        let mut batch = CommitBatch::new();
        let mut favorite_targets = HashMap::new();

        for photo in self
            .photos
            .iter()
            .filter(|photo| staged.favorite_toggle.contains(&photo.id))
        {
            favorite_targets.insert(photo.id.clone(), !photo.is_favorite);
            let done = batch.issue(ApplyKind::ToggleFavorite(photo.id.clone()));
            self.source.toggle_favorite(photo, done);
        }

        let doomed: Vec<PhotoRef> = self
            .photos
            .iter()
            .filter(|photo| staged.trash.contains(&photo.id))
            .cloned()
            .collect();
        if !doomed.is_empty() {
            let ids = doomed.iter().map(|photo| photo.id.clone()).collect();
            let done = batch.issue(ApplyKind::DeleteBatch(ids));
            self.source.delete_batch(doomed, done);
        }

        for id in &staged.keep {
            debug!(photo = %id, "keeping photo");
        }

        info!(
            requests = batch.issued(),
            favorites = staged.favorite_toggle.len(),
            trash = staged.trash.len(),
            keep = staged.keep.len(),
            "committing staged changes"
        );
        self.in_flight = Some(InFlight {
            batch,
            staged,
            favorite_targets,
        });
        true
    }

    fn settle(&mut self, in_flight: InFlight, outcomes: Vec<ApplyOutcome>) -> CommitReport {
        let InFlight {
            staged,
            favorite_targets,
            ..
        } = in_flight;
        let report = CommitReport::from_outcomes(outcomes, staged.keep.len());

        for id in &report.favorites_toggled {
            let target = favorite_targets.get(id).copied();
            if let (Some(target), Some(position)) = (target, self.position_of(id)) {
                self.photos[position].is_favorite = target;
            }
        }

        if !report.deleted.is_empty() {
            let mut positions: Vec<usize> = report
                .deleted
                .iter()
                .filter_map(|id| self.position_of(id))
                .collect();
            positions.sort_unstable_by(|a, b| b.cmp(a));
            for position in positions {
                self.photos.remove(position);
            }
            self.clamp_position();
        }

        self.pending.subtract(&staged);
        info!("{}", report.status_line());
        report
    }
}

impl<S: PhotoSource> Drop for StagingModel<S> {
    fn drop(&mut self) {
        self.stop_observing();
    }
}
