use std::{
    ffi::OsStr,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use tracing::warn;
use walkdir::WalkDir;

/// Folder (relative to the library root) that receives deleted photos.
pub const TRASH_DIR: &str = ".photoswipe-trash";
/// Folder (relative to the library root) holding the favorites store.
pub const STATE_DIR: &str = ".photoswipe";

pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "gif", "webp", "tiff", "tif", "ico",
];

/// Image files directly in `root`, or anywhere below it when `recursive`.
/// Hidden files and folders are skipped.
pub fn collect_images(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        let reason = if root.exists() { "is not a directory" } else { "does not exist" };
        return Err(anyhow!("{} {reason}", root.display()));
    }

    let walker = WalkDir::new(root).follow_links(false).min_depth(1);
    let walker = if recursive { walker } else { walker.max_depth(1) };

    let mut files = Vec::new();
    // The root itself may be a dot-folder (temp dirs are); only filter below it.
    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_supported_image(entry.path()) => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(err) => warn!("skipping unreadable entry below {}: {err}", root.display()),
        }
    }
    Ok(files)
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

pub fn prepare_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Unable to create {}", dir.display()))?;
    Ok(dir.to_path_buf())
}

/// Moves `source` into `target_dir`, renaming it if the name is taken.
/// Returns where the file ended up.
pub fn move_with_unique_name(source: &Path, target_dir: &Path) -> io::Result<PathBuf> {
    let file_name = source
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let destination = unique_destination(target_dir, file_name);
    fs::rename(source, &destination)?;
    Ok(destination)
}

/// `dir/file_name`, or `dir/stem-N.ext` with the first free `N`.
pub fn unique_destination(dir: &Path, file_name: &OsStr) -> PathBuf {
    let direct = dir.join(file_name);
    if !direct.exists() {
        return direct;
    }
    let (stem, ext) = split_name(file_name);
    (1..)
        .map(|idx| match &ext {
            Some(ext) => dir.join(format!("{stem}-{idx}.{ext}")),
            None => dir.join(format!("{stem}-{idx}")),
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or(direct)
}

pub fn split_name(file_name: &OsStr) -> (String, Option<String>) {
    let name = Path::new(file_name);
    let stem = name.file_stem().unwrap_or(file_name).to_string_lossy().into_owned();
    let ext = name.extension().map(|ext| ext.to_string_lossy().into_owned());
    (stem, ext)
}

/// Writes `contents` next to `path` first and renames it into place, so
/// readers never observe a half-written file.
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("{} has no parent directory", path.display()))?;
    prepare_dir(parent)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("{} has no file name", path.display()))?;
    let temp_path = parent.join(format!(".{}.tmp", file_name.to_string_lossy()));

    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Unable to create {}", temp_path.display()))?;
        file.write_all(contents)?;
        file.sync_all()?;
    } // Close file

    fs::rename(&temp_path, path)
        .with_context(|| format!("Unable to replace {}", path.display()))
}
