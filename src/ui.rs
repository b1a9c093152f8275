use eframe::egui::{self, Rect, Vec2};

/// Horizontal drag distance (points) that counts as a swipe.
pub const SWIPE_THRESHOLD: f32 = 80.0;

pub const HEART_FILLED: &str = "♥";
pub const HEART_EMPTY: &str = "♡";
pub const KEEP_GLYPH: &str = "✔";
pub const TRASH_GLYPH: &str = "🗑";

pub struct ImageMetrics {
    pub image_rect: Rect,
    pub image_size: Vec2,
    pub scale: f32,
}

impl ImageMetrics {
    pub fn new(canvas: Rect, image_size: Vec2) -> Self {
        let (display, scale) = fit_within(image_size, canvas.size());
        let offset = (canvas.size() - display) * 0.5;
        let image_rect = Rect::from_min_size(canvas.min + offset, display);
        Self {
            image_rect,
            image_size,
            scale,
        }
    }
}

pub fn fit_within(image_size: Vec2, available: Vec2) -> (Vec2, f32) {
    let safe_size = egui::vec2(image_size.x.max(1.0), image_size.y.max(1.0));
    let scale = (available.x / safe_size.x)
        .min(available.y / safe_size.y)
        .max(0.01);
    (safe_size * scale, scale)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Finger moved left: show the next photo.
    Next,
    Previous,
}

/// Accumulates a horizontal drag and classifies it when it ends.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    travel: f32,
}

impl SwipeTracker {
    pub fn drag(&mut self, delta_x: f32) {
        self.travel += delta_x;
    }

    pub fn travel(&self) -> f32 {
        self.travel
    }

    pub fn release(&mut self) -> Option<Swipe> {
        let travel = std::mem::take(&mut self.travel);
        if travel <= -SWIPE_THRESHOLD {
            Some(Swipe::Next)
        } else if travel >= SWIPE_THRESHOLD {
            Some(Swipe::Previous)
        } else {
            None
        }
    }
}

pub struct KeyboardState {
    pub next_image: bool,
    pub prev_image: bool,
    pub toggle_favorite: bool,
    pub toggle_keep: bool,
    pub toggle_trash: bool,
    pub confirm: bool,
    pub open_filter: bool,
    pub retry: bool,
    pub escape: bool,
}

pub fn heart_glyph(filled: bool) -> &'static str {
    if filled {
        HEART_FILLED
    } else {
        HEART_EMPTY
    }
}

/// Counter shown in the corner, e.g. "3 / 12".
pub fn position_label(position: usize, total: usize) -> String {
    format!("{} / {}", position + 1, total)
}

/// Confirm button caption with the pending count when there is one.
pub fn confirm_label(pending: usize) -> String {
    if pending > 0 {
        format!("☑ ({pending})")
    } else {
        "☑".to_string()
    }
}
