use std::{
    collections::BTreeSet,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{fs_utils::write_atomically, source::PhotoId};

pub const FAVORITES_FILE: &str = "favorites.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteSet {
    #[serde(default)]
    pub favorites: BTreeSet<String>,
}

impl FavoriteSet {
    pub fn contains(&self, id: &PhotoId) -> bool {
        self.favorites.contains(&id.0)
    }

    pub fn set(&mut self, id: &PhotoId, favorite: bool) {
        if favorite {
            self.favorites.insert(id.0.clone());
        } else {
            self.favorites.remove(&id.0);
        }
    }
}

/// The favorites list of one library folder, shared by all apply workers.
pub struct FavoritesFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FavoritesFile {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(FAVORITES_FILE),
            lock: Mutex::new(()),
        }
    }

    /// A missing file means no favorites yet.
    pub fn load(&self) -> Result<FavoriteSet> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("Unable to parse {}", self.path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(FavoriteSet::default()),
            Err(err) => {
                Err(err).with_context(|| format!("Unable to read {}", self.path.display()))
            }
        }
    }

    /// Read-modify-write under the file lock, so concurrent updates from
    /// different workers do not lose each other.
    pub fn set(&self, id: &PhotoId, favorite: bool) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poison| poison.into_inner());
        let mut set = self.load()?;
        set.set(id, favorite);
        let bytes = serde_json::to_vec_pretty(&set)?;
        write_atomically(&self.path, &bytes)
    }
}
