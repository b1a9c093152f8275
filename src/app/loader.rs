use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Instant,
};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::image_utils::{decode_image, downscale_for_display, to_color_image, PreloadedImage};

struct LoadResult {
    path: PathBuf,
    result: Result<PreloadedImage>,
}

/// Decodes photos on a background thread and keeps the results around
/// until the shell needs them.
pub struct Loader {
    preload_rx: Receiver<LoadResult>,
    path_tx: Sender<PathBuf>,
    pub cache: HashMap<PathBuf, PreloadedImage>,
    requested: HashSet<PathBuf>,
    failed: HashSet<PathBuf>,
}

impl Loader {
    pub fn new(target_size: u32) -> Self {
        let (preload_rx, path_tx) = Self::spawn_preloader(target_size);
        Self {
            preload_rx,
            path_tx,
            cache: HashMap::new(),
            requested: HashSet::new(),
            failed: HashSet::new(),
        }
    }

    fn spawn_preloader(target_size: u32) -> (Receiver<LoadResult>, Sender<PathBuf>) {
        let (preload_tx, preload_rx) = mpsc::channel();
        let (path_tx, path_rx) = mpsc::channel::<PathBuf>();

        let spawned = thread::Builder::new()
            .name("photoswipe-loader".into())
            .spawn(move || {
                while let Ok(path) = path_rx.recv() {
                    let result = load(&path, target_size);
                    if preload_tx.send(LoadResult { path, result }).is_err() {
                        break;
                    }
                }
            });
        if let Err(err) = spawned {
            warn!("unable to spawn image loader: {err}");
        }
        (preload_rx, path_tx)
    }

    /// Queues `path` unless it is cached, in flight, or already failed.
    pub fn request(&mut self, path: PathBuf) {
        if self.cache.contains_key(&path)
            || self.requested.contains(&path)
            || self.failed.contains(&path)
        {
            return;
        }
        self.requested.insert(path.clone());
        let _ = self.path_tx.send(path);
    }

    pub fn update(&mut self) {
        while let Ok(LoadResult { path, result }) = self.preload_rx.try_recv() {
            self.requested.remove(&path);
            match result {
                Ok(entry) => {
                    debug!(
                        path = %path.display(),
                        elapsed_ms = entry.load_duration.as_millis() as u64,
                        "image decoded"
                    );
                    self.cache.insert(path, entry);
                }
                Err(err) => {
                    warn!("no image for {}: {err:#}", path.display());
                    self.failed.insert(path);
                }
            }
        }
    }

    pub fn get_from_cache(&mut self, path: &PathBuf) -> Option<PreloadedImage> {
        self.cache.remove(path)
    }

    pub fn has_failed(&self, path: &PathBuf) -> bool {
        self.failed.contains(path)
    }

    /// Drops cached images outside `keep`.
    pub fn retain(&mut self, keep: &HashSet<PathBuf>) {
        self.cache.retain(|path, _| keep.contains(path));
    }

    /// Forgets failures, e.g. after the library changed on disk.
    pub fn reset_failures(&mut self) {
        self.failed.clear();
    }

    /// Files may have been replaced on disk: drop decoded images and failures
    /// so the next request decodes again.
    pub fn invalidate(&mut self) {
        self.cache.clear();
        self.failed.clear();
    }
}

fn load(path: &PathBuf, target_size: u32) -> Result<PreloadedImage> {
    let start = Instant::now();
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let image = decode_image(path, &bytes)?;
    drop(bytes); // Free memory early
    let color_image = to_color_image(&downscale_for_display(image, target_size)?);
    Ok(PreloadedImage {
        path: path.clone(),
        color_image,
        load_duration: start.elapsed(),
    })
}
