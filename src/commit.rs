use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, warn};

use crate::source::{ApplyKind, ApplyOutcome, Completion, PhotoId};

/// Joins a known number of apply requests.
///
/// Every issued request gets a [`Completion`] from [`CommitBatch::issue`];
/// [`CommitBatch::poll`] yields the gathered outcomes once all of them have
/// reported, whatever each result was.
pub struct CommitBatch {
    tx: Sender<ApplyOutcome>,
    rx: Receiver<ApplyOutcome>,
    issued: usize,
    settled: Vec<ApplyOutcome>,
}

impl CommitBatch {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            issued: 0,
            settled: Vec::new(),
        }
    }

    pub fn issue(&mut self, kind: ApplyKind) -> Completion {
        self.issued += 1;
        Completion::new(kind, self.tx.clone())
    }

    pub fn issued(&self) -> usize {
        self.issued
    }

    pub fn outstanding(&self) -> usize {
        self.issued.saturating_sub(self.settled.len())
    }

    pub fn poll(&mut self) -> Option<Vec<ApplyOutcome>> {
        while let Ok(outcome) = self.rx.try_recv() {
            self.settled.push(outcome);
        }
        if self.settled.len() >= self.issued {
            Some(std::mem::take(&mut self.settled))
        } else {
            None
        }
    }
}

impl Default for CommitBatch {
    fn default() -> Self {
        Self::new()
    }
}

/// What a settled commit did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub favorites_toggled: Vec<PhotoId>,
    pub favorite_failures: Vec<PhotoId>,
    pub deleted: Vec<PhotoId>,
    pub delete_failed: Vec<PhotoId>,
    pub kept: usize,
}

impl CommitReport {
    pub fn from_outcomes(outcomes: Vec<ApplyOutcome>, kept: usize) -> Self {
        let mut report = CommitReport {
            kept,
            ..Default::default()
        };
        for outcome in outcomes {
            match (outcome.kind, outcome.result) {
                (ApplyKind::ToggleFavorite(id), Ok(())) => {
                    debug!(photo = %id, "favorite status toggled");
                    report.favorites_toggled.push(id);
                }
                (ApplyKind::ToggleFavorite(id), Err(err)) => {
                    warn!(photo = %id, "error toggling favorite: {err}");
                    report.favorite_failures.push(id);
                }
                (ApplyKind::DeleteBatch(ids), Ok(())) => {
                    debug!(count = ids.len(), "photos deleted");
                    report.deleted.extend(ids);
                }
                (ApplyKind::DeleteBatch(ids), Err(err)) => {
                    warn!(count = ids.len(), "error deleting photos: {err}");
                    report.delete_failed.extend(ids);
                }
            }
        }
        report
    }

    pub fn has_failures(&self) -> bool {
        !self.favorite_failures.is_empty() || !self.delete_failed.is_empty()
    }

    pub fn status_line(&self) -> String {
        let mut parts = Vec::new();
        if !self.favorites_toggled.is_empty() {
            parts.push(format!("{} favorite(s) toggled", self.favorites_toggled.len()));
        }
        if !self.deleted.is_empty() {
            parts.push(format!("{} deleted", self.deleted.len()));
        }
        if self.kept > 0 {
            parts.push(format!("{} kept", self.kept));
        }
        if self.has_failures() {
            parts.push(format!(
                "{} failed",
                self.favorite_failures.len() + self.delete_failed.len()
            ));
        }
        if parts.is_empty() {
            "No changes applied".to_string()
        } else {
            format!("Applied: {}", parts.join(", "))
        }
    }
}
