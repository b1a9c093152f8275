use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc, Mutex,
    },
    thread,
};

use tracing::{debug, error, info};

use crate::{
    fs_utils::move_with_unique_name,
    source::{ApplyError, Completion, PhotoRef},
};

use super::favorites::FavoritesFile;

pub enum ApplyRequest {
    SetFavorite {
        photo: PhotoRef,
        favorite: bool,
        done: Completion,
    },
    DeleteBatch {
        photos: Vec<PhotoRef>,
        done: Completion,
    },
}

impl ApplyRequest {
    fn into_completion(self) -> Completion {
        match self {
            ApplyRequest::SetFavorite { done, .. } | ApplyRequest::DeleteBatch { done, .. } => done,
        }
    }
}

/// What the workers need to touch the library folder.
pub struct ApplyContext {
    pub trash_dir: PathBuf,
    pub favorites: FavoritesFile,
    pub dry_run: bool,
}

/// Pool of threads executing library changes off the UI thread.
pub struct Applier {
    request_tx: Sender<ApplyRequest>,
}

impl Applier {
    pub fn new(concurrency: usize, context: Arc<ApplyContext>) -> Self {
        let (request_tx, request_rx) = mpsc::channel();
        let rx = Arc::new(Mutex::new(request_rx));

        for idx in 0..concurrency.max(1) {
            Self::spawn_worker(idx, rx.clone(), context.clone());
        }

        Self { request_tx }
    }

    fn spawn_worker(idx: usize, rx: Arc<Mutex<Receiver<ApplyRequest>>>, context: Arc<ApplyContext>) {
        let spawned = thread::Builder::new()
            .name(format!("photoswipe-apply-{idx}"))
            .spawn(move || loop {
                let request = {
                    let Ok(lock) = rx.lock() else { break };
                    match lock.recv() {
                        Ok(request) => request,
                        Err(_) => break,
                    }
                };

                match request {
                    ApplyRequest::SetFavorite {
                        photo,
                        favorite,
                        done,
                    } => done.finish(set_favorite(&context, &photo, favorite)),
                    ApplyRequest::DeleteBatch { photos, done } => {
                        done.finish(delete_batch(&context, &photos))
                    }
                }
            });
        if let Err(err) = spawned {
            error!("unable to spawn apply worker: {err}");
        }
    }

    /// Queues a request. If the pool is gone the request fails right away.
    pub fn submit(&self, request: ApplyRequest) {
        if let Err(mpsc::SendError(request)) = self.request_tx.send(request) {
            request.into_completion().finish(Err(ApplyError::Disconnected));
        }
    }
}

fn set_favorite(context: &ApplyContext, photo: &PhotoRef, favorite: bool) -> Result<(), ApplyError> {
    if !photo.path.exists() {
        return Err(ApplyError::Missing(photo.id.clone()));
    }
    if context.dry_run {
        info!(photo = %photo.id, favorite, "dry run: would change favorite status");
        return Ok(());
    }
    context
        .favorites
        .set(&photo.id, favorite)
        .map_err(ApplyError::Store)?;
    debug!(photo = %photo.id, favorite, "favorite status stored");
    Ok(())
}

/// Moves every photo into the trash folder. If one move fails, the photos
/// already moved are put back so the batch has a single outcome.
fn delete_batch(context: &ApplyContext, photos: &[PhotoRef]) -> Result<(), ApplyError> {
    if let Some(missing) = photos.iter().find(|photo| !photo.path.exists()) {
        return Err(ApplyError::Missing(missing.id.clone()));
    }
    if context.dry_run {
        for photo in photos {
            info!(
                photo = %photo.id,
                "dry run: would move {} to {}",
                photo.path.display(),
                context.trash_dir.display()
            );
        }
        return Ok(());
    }

    fs::create_dir_all(&context.trash_dir)?;
    let mut moved: Vec<(&Path, PathBuf)> = Vec::with_capacity(photos.len());
    for photo in photos {
        match move_with_unique_name(&photo.path, &context.trash_dir) {
            Ok(destination) => moved.push((photo.path.as_path(), destination)),
            Err(err) => {
                error!(photo = %photo.id, "unable to move to trash: {err}");
                restore(&moved);
                return Err(ApplyError::Io(err));
            }
        }
    }
    Ok(())
}

fn restore(moved: &[(&Path, PathBuf)]) {
    for (original, trashed) in moved.iter().rev() {
        if let Err(err) = fs::rename(trashed, original) {
            error!(
                "unable to restore {} from {}: {err}",
                original.display(),
                trashed.display()
            );
        }
    }
}
