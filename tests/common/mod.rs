#![allow(dead_code)]

use chrono::{DateTime, Local, TimeZone};
use image::{DynamicImage, Rgba, RgbaImage};
use photoswipe::{
    filter::FilterSpec,
    source::{
        ApplyError, ApplyKind, AuthorizationStatus, Completion, LibraryEvent, LibraryWatch,
        PhotoId, PhotoRef, PhotoSource,
    },
    staging::{Phase, StagingModel},
};
use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, Sender},
    time::{Duration, SystemTime},
};

pub fn solid_image(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    let pixel = Rgba(color);
    let buffer = RgbaImage::from_pixel(width, height, pixel);
    DynamicImage::ImageRgba8(buffer)
}

pub fn write_image(path: impl Into<PathBuf>, image: &DynamicImage) {
    image
        .save(path.into())
        .expect("failed to write image to disk");
}

/// Writes a tiny PNG and backdates its modification time by `age`.
pub fn write_photo(dir: &Path, name: &str, age: Duration) -> PathBuf {
    let path = dir.join(name);
    write_image(&path, &solid_image(2, 2, [200, 100, 50, 255]));
    let file = File::options().write(true).open(&path).expect("open photo");
    file.set_modified(SystemTime::now() - age)
        .expect("set modification time");
    path
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, min, 0)
        .earliest()
        .expect("valid local time")
}

pub fn photo(id: &str, favorite: bool) -> PhotoRef {
    PhotoRef {
        id: PhotoId::from(id),
        path: PathBuf::from(format!("{id}.jpg")),
        created: at(2025, 7, 6, 12, 0),
        is_favorite: favorite,
    }
}

pub fn ids(photos: &[PhotoRef]) -> Vec<&str> {
    photos.iter().map(|p| p.id.0.as_str()).collect()
}

/// In-memory photo source with scripted outcomes.
pub struct FakeSource {
    pub library: RefCell<Vec<PhotoRef>>,
    pub status: Cell<AuthorizationStatus>,
    pub failing_favorites: RefCell<HashSet<PhotoId>>,
    pub fail_deletes: Cell<bool>,
    pub fail_fetch: Cell<bool>,
    /// When set, outcomes are held until [`FakeSource::release`].
    pub defer: Cell<bool>,
    pub held: RefCell<Vec<(Completion, Result<(), ApplyError>)>>,
    pub requests: RefCell<Vec<ApplyKind>>,
    pub watchers: RefCell<Vec<Sender<LibraryEvent>>>,
}

impl FakeSource {
    pub fn new(photos: Vec<PhotoRef>) -> Self {
        Self {
            library: RefCell::new(photos),
            status: Cell::new(AuthorizationStatus::Authorized),
            failing_favorites: RefCell::new(HashSet::new()),
            fail_deletes: Cell::new(false),
            fail_fetch: Cell::new(false),
            defer: Cell::new(false),
            held: RefCell::new(Vec::new()),
            requests: RefCell::new(Vec::new()),
            watchers: RefCell::new(Vec::new()),
        }
    }

    pub fn release(&self) {
        for (done, result) in self.held.borrow_mut().drain(..) {
            done.finish(result);
        }
    }

    pub fn notify_change(&self) {
        for tx in self.watchers.borrow().iter() {
            let _ = tx.send(LibraryEvent::Changed);
        }
    }

    fn reply(&self, done: Completion, result: Result<(), ApplyError>) {
        self.requests.borrow_mut().push(done.kind().clone());
        if self.defer.get() {
            self.held.borrow_mut().push((done, result));
        } else {
            done.finish(result);
        }
    }
}

impl PhotoSource for FakeSource {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.status.get()
    }

    fn request_authorization(&self) -> Receiver<AuthorizationStatus> {
        let (tx, rx) = mpsc::channel();
        tx.send(self.status.get()).unwrap();
        rx
    }

    fn fetch(&self, filter: &FilterSpec) -> anyhow::Result<Vec<PhotoRef>> {
        if self.fail_fetch.get() {
            anyhow::bail!("library unavailable");
        }
        Ok(self
            .library
            .borrow()
            .iter()
            .filter(|p| filter.matches(&p.created))
            .cloned()
            .collect())
    }

    fn toggle_favorite(&self, photo: &PhotoRef, done: Completion) {
        if self.failing_favorites.borrow().contains(&photo.id) {
            self.reply(done, Err(ApplyError::Missing(photo.id.clone())));
            return;
        }
        for entry in self.library.borrow_mut().iter_mut() {
            if entry.id == photo.id {
                entry.is_favorite = !photo.is_favorite;
            }
        }
        self.reply(done, Ok(()));
    }

    fn delete_batch(&self, photos: Vec<PhotoRef>, done: Completion) {
        if self.fail_deletes.get() {
            let err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only library");
            self.reply(done, Err(ApplyError::Io(err)));
            return;
        }
        let doomed: HashSet<PhotoId> = photos.into_iter().map(|p| p.id).collect();
        self.library.borrow_mut().retain(|p| !doomed.contains(&p.id));
        self.reply(done, Ok(()));
    }

    fn observe_changes(&self) -> anyhow::Result<LibraryWatch> {
        let (tx, rx) = mpsc::channel();
        self.watchers.borrow_mut().push(tx);
        Ok(LibraryWatch::new(rx, None))
    }
}

/// A model over `photos` that already went through authorization.
pub fn ready_model(photos: Vec<PhotoRef>) -> StagingModel<FakeSource> {
    let mut model = StagingModel::new(FakeSource::new(photos), FilterSpec::All);
    model.start();
    model.poll();
    assert_eq!(model.phase(), Phase::Ready);
    model
}

pub fn abcd() -> Vec<PhotoRef> {
    vec![
        photo("A", false),
        photo("B", false),
        photo("C", false),
        photo("D", false),
    ]
}
