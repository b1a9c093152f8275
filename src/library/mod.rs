//! A photo library backed by a plain folder of image files.

pub mod applier;
pub mod favorites;
pub mod watcher;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver},
        Arc,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::{
    filter::FilterSpec,
    fs_utils::{collect_images, STATE_DIR, TRASH_DIR},
    source::{AuthorizationStatus, Completion, LibraryWatch, PhotoId, PhotoRef, PhotoSource},
};

use self::{
    applier::{ApplyContext, ApplyRequest, Applier},
    favorites::FavoritesFile,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct LibraryOptions {
    pub root: PathBuf,
    pub recursive: bool,
    pub workers: usize,
    pub dry_run: bool,
    pub debounce: Duration,
}

impl LibraryOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recursive: false,
            workers: 4,
            dry_run: false,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

pub struct DirectoryLibrary {
    root: PathBuf,
    recursive: bool,
    debounce: Duration,
    context: Arc<ApplyContext>,
    applier: Applier,
    asked: AtomicBool,
}

impl DirectoryLibrary {
    pub fn open(options: LibraryOptions) -> Self {
        // Watch events carry absolute paths; compare against the same form.
        let root = options
            .root
            .canonicalize()
            .unwrap_or_else(|_| options.root.clone());
        let context = Arc::new(ApplyContext {
            trash_dir: root.join(TRASH_DIR),
            favorites: FavoritesFile::new(&root.join(STATE_DIR)),
            dry_run: options.dry_run,
        });
        let applier = Applier::new(options.workers, context.clone());
        Self {
            root,
            recursive: options.recursive,
            debounce: options.debounce,
            context,
            applier,
            asked: AtomicBool::new(false),
        }
    }

    /// Library-relative, forward-slash separated.
    pub fn photo_id(&self, path: &Path) -> PhotoId {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        PhotoId(relative.to_string_lossy().replace('\\', "/"))
    }

    fn probe_access(&self) -> AuthorizationStatus {
        if fs::read_dir(&self.root).is_err() {
            return AuthorizationStatus::Denied;
        }
        match fs::metadata(&self.root) {
            Ok(meta) if meta.permissions().readonly() => AuthorizationStatus::Restricted,
            Ok(_) => AuthorizationStatus::Authorized,
            Err(_) => AuthorizationStatus::Denied,
        }
    }

    fn photo_ref(&self, path: PathBuf, favorites: &favorites::FavoriteSet) -> Result<PhotoRef> {
        let meta = fs::metadata(&path)
            .with_context(|| format!("Unable to read metadata of {}", path.display()))?;
        // Modification time survives copies between devices; birth time often does not.
        let created = meta
            .modified()
            .or_else(|_| meta.created())
            .with_context(|| format!("No timestamp for {}", path.display()))?;
        let id = self.photo_id(&path);
        let is_favorite = favorites.contains(&id);
        Ok(PhotoRef {
            id,
            path,
            created: DateTime::<Local>::from(created),
            is_favorite,
        })
    }
}

impl PhotoSource for DirectoryLibrary {
    fn authorization_status(&self) -> AuthorizationStatus {
        if self.asked.load(Ordering::Relaxed) {
            self.probe_access()
        } else {
            AuthorizationStatus::NotDetermined
        }
    }

    fn request_authorization(&self) -> Receiver<AuthorizationStatus> {
        self.asked.store(true, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(self.probe_access());
        rx
    }

    fn fetch(&self, filter: &FilterSpec) -> Result<Vec<PhotoRef>> {
        let favorites = self.context.favorites.load().unwrap_or_else(|err| {
            warn!("ignoring unreadable favorites: {err:#}");
            Default::default()
        });

        let mut photos = Vec::new();
        for path in collect_images(&self.root, self.recursive)? {
            match self.photo_ref(path, &favorites) {
                Ok(photo) if filter.matches(&photo.created) => photos.push(photo),
                Ok(_) => {}
                Err(err) => warn!("skipping photo: {err:#}"),
            }
        }
        photos.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.id.cmp(&b.id)));
        debug!(count = photos.len(), %filter, "enumerated library");
        Ok(photos)
    }

    fn toggle_favorite(&self, photo: &PhotoRef, done: Completion) {
        self.applier.submit(ApplyRequest::SetFavorite {
            photo: photo.clone(),
            favorite: !photo.is_favorite,
            done,
        });
    }

    fn delete_batch(&self, photos: Vec<PhotoRef>, done: Completion) {
        self.applier.submit(ApplyRequest::DeleteBatch { photos, done });
    }

    fn observe_changes(&self) -> Result<LibraryWatch> {
        watcher::watch_library(&self.root, self.recursive, self.debounce)
    }
}
