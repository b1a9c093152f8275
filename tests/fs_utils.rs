use photoswipe::fs_utils::*;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn collect_images_includes_supported_extensions() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    let supported = ["image1.png", "photo.jpg", "scan.JPEG", "pic.TiF"]; // mix of cases
    for name in supported {
        fs::write(root.join(name), []).unwrap();
    }
    let unsupported = ["doc.txt", "movie.mp4", "README", ".hidden.jpg"];
    for name in unsupported {
        fs::write(root.join(name), []).unwrap();
    }

    let mut files = collect_images(root, false).unwrap();
    files.sort();

    let mut expected: Vec<_> = supported.iter().map(|n| root.join(n)).collect();
    expected.sort();
    assert_eq!(files, expected);
}

#[test]
fn collect_images_recurses_but_skips_hidden_folders() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("2025/july")).unwrap();
    fs::create_dir_all(root.join(TRASH_DIR)).unwrap();
    fs::write(root.join("top.png"), []).unwrap();
    fs::write(root.join("2025/july/beach.jpg"), []).unwrap();
    fs::write(root.join(TRASH_DIR).join("gone.jpg"), []).unwrap();

    let flat = collect_images(root, false).unwrap();
    assert_eq!(flat, vec![root.join("top.png")]);

    let mut deep = collect_images(root, true).unwrap();
    deep.sort();
    assert_eq!(deep, vec![root.join("2025/july/beach.jpg"), root.join("top.png")]);
}

#[test]
fn collect_images_errors_for_missing_directory() {
    let missing = Path::new("/does/not/exist");
    let err = collect_images(missing, false).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn prepare_dir_creates_nested_directories() {
    let tmp = tempdir().unwrap();
    let target = tmp.path().join("nested/a/b");
    let created = prepare_dir(&target).unwrap();
    assert!(created.exists());
    assert!(created.is_dir());
}

#[test]
fn move_with_unique_name_avoids_overwrites() {
    let tmp = tempdir().unwrap();
    let target_dir = tmp.path().join("target");
    fs::create_dir(&target_dir).unwrap();
    let existing = target_dir.join("image.png");
    fs::write(&existing, b"a").unwrap();

    let source = tmp.path().join("image.png");
    fs::write(&source, b"b").unwrap();

    let moved = move_with_unique_name(&source, &target_dir).unwrap();

    assert!(!source.exists());
    assert_eq!(moved, target_dir.join("image-1.png"));
    assert_eq!(fs::read(&moved).unwrap(), b"b");
    assert_eq!(fs::read(&existing).unwrap(), b"a");
}

#[test]
fn split_name_handles_extensions_and_plain_names() {
    let (stem, ext) = split_name(OsStr::new("photo.heic"));
    assert_eq!(stem, "photo");
    assert_eq!(ext.as_deref(), Some("heic"));

    let (stem, ext) = split_name(OsStr::new("archive"));
    assert_eq!(stem, "archive");
    assert!(ext.is_none());
}

#[test]
fn unique_destination_adds_incrementing_suffix() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("image.png"), []).unwrap();
    fs::write(dir.join("image-1.png"), []).unwrap();
    let candidate = unique_destination(dir, OsStr::new("image.png"));
    assert_eq!(candidate.file_name().unwrap(), "image-2.png");
}

#[test]
fn write_atomically_replaces_contents_without_leftovers() {
    let tmp = tempdir().unwrap();
    let target = tmp.path().join("state/favorites.json");

    write_atomically(&target, b"first").unwrap();
    write_atomically(&target, b"second").unwrap();

    assert_eq!(fs::read(&target).unwrap(), b"second");
    let entries = fs::read_dir(tmp.path().join("state")).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn hidden_names_start_with_a_dot() {
    assert!(is_hidden(Path::new("/photos/.photoswipe")));
    assert!(!is_hidden(Path::new("/photos/cat.jpg")));
    assert!(is_supported_image(Path::new("cat.WEBP")));
    assert!(!is_supported_image(Path::new("cat.heic")));
}
