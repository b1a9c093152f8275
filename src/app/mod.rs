pub mod filter_sheet;
pub mod loader;

use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    time::Duration,
};

use chrono::Local;
use eframe::{
    egui::{self, Color32, RichText, ViewportCommand},
    App, Frame,
};
use tracing::info;

use crate::{
    config::ReviewConfig,
    library::DirectoryLibrary,
    staging::{IntentKind, Phase, StagingModel},
    ui::{
        confirm_label, heart_glyph, position_label, ImageMetrics, KeyboardState, Swipe,
        SwipeTracker, KEEP_GLYPH, TRASH_GLYPH,
    },
};

use self::{filter_sheet::FilterSheet, loader::Loader};

/// How many photos around the current one are decoded ahead of time.
const PRELOAD_BEHIND: usize = 1;
const PRELOAD_AHEAD: usize = 2;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct PhotoSwipeApp {
    pub model: StagingModel<DirectoryLibrary>,
    pub loader: Loader,
    textures: HashMap<PathBuf, egui::TextureHandle>,
    swipe: SwipeTracker,
    filter_sheet: FilterSheet,
    show_confirmation: bool,
    status: String,
}

impl PhotoSwipeApp {
    pub fn new(config: ReviewConfig) -> Self {
        let library = DirectoryLibrary::open(config.library);
        let filter_sheet = FilterSheet::new(&config.initial_filter);
        let mut model = StagingModel::new(library, config.initial_filter);
        model.start();

        Self {
            model,
            loader: Loader::new(config.display_size),
            textures: HashMap::new(),
            swipe: SwipeTracker::default(),
            filter_sheet,
            show_confirmation: false,
            status: String::from("Ready"),
        }
    }

    fn handle_keyboard(ctx: &egui::Context) -> KeyboardState {
        ctx.input(|input| KeyboardState {
            next_image: input.key_pressed(egui::Key::ArrowRight),
            prev_image: input.key_pressed(egui::Key::ArrowLeft),
            toggle_favorite: input.key_pressed(egui::Key::F),
            toggle_keep: input.key_pressed(egui::Key::K),
            toggle_trash: input.key_pressed(egui::Key::T) || input.key_pressed(egui::Key::Delete),
            confirm: input.key_pressed(egui::Key::Enter),
            open_filter: input.key_pressed(egui::Key::C),
            retry: input.key_pressed(egui::Key::R),
            escape: input.key_pressed(egui::Key::Escape),
        })
    }

    fn dialog_open(&self) -> bool {
        self.show_confirmation || self.filter_sheet.open
    }

    fn request_confirmation(&mut self) {
        if self.model.is_committing() {
            self.status = "Still applying the previous changes...".into();
        } else if self.model.pending_count() == 0 {
            self.status = "Nothing staged".into();
        } else {
            self.show_confirmation = true;
        }
    }

    fn apply_changes(&mut self) {
        self.show_confirmation = false;
        if self.model.commit() {
            self.status = "Applying changes...".into();
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context, keys: &KeyboardState) {
        if keys.escape {
            if self.show_confirmation {
                self.show_confirmation = false;
            } else if self.filter_sheet.open {
                self.filter_sheet.open = false;
            } else {
                ctx.send_viewport_cmd(ViewportCommand::Close);
            }
            return;
        }
        if self.dialog_open() {
            return;
        }

        if keys.next_image {
            self.model.next();
        }
        if keys.prev_image {
            self.model.previous();
        }
        if keys.toggle_favorite {
            self.model.toggle_favorite_intent();
        }
        if keys.toggle_keep {
            self.model.toggle_keep_intent();
        }
        if keys.toggle_trash {
            self.model.toggle_trash_intent();
        }
        if keys.open_filter {
            self.filter_sheet.open_for(self.model.filter());
        }
        if keys.confirm {
            self.request_confirmation();
        }
    }

    /// Paths of the current photo and its neighbours.
    fn preload_window(&self) -> Vec<PathBuf> {
        let photos = self.model.photos();
        if photos.is_empty() {
            return Vec::new();
        }
        let position = self.model.position();
        let first = position.saturating_sub(PRELOAD_BEHIND);
        let last = (position + PRELOAD_AHEAD).min(photos.len() - 1);
        let mut window: Vec<PathBuf> = photos[first..=last].iter().map(|p| p.path.clone()).collect();
        // Current photo first so it is decoded before its neighbours.
        if let Some(idx) = window.iter().position(|p| *p == photos[position].path) {
            window.swap(0, idx);
        }
        window
    }

    fn sync_textures(&mut self, ctx: &egui::Context) {
        let window = self.preload_window();
        for path in &window {
            if self.textures.contains_key(path) {
                continue;
            }
            if let Some(entry) = self.loader.get_from_cache(path) {
                let texture = ctx.load_texture(
                    format!("photoswipe-{}", path.display()),
                    entry.color_image,
                    egui::TextureOptions::LINEAR,
                );
                self.textures.insert(path.clone(), texture);
            } else {
                self.loader.request(path.clone());
            }
        }

        let keep: HashSet<PathBuf> = window.into_iter().collect();
        self.textures.retain(|path, _| keep.contains(path));
        self.loader.retain(&keep);
    }

    fn show_message(ctx: &egui::Context, heading: &str, detail: Option<&str>) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(Color32::BLACK))
            .show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.label(RichText::new("🖼").size(50.0).color(Color32::WHITE));
                        ui.heading(RichText::new(heading).color(Color32::WHITE));
                        if let Some(detail) = detail {
                            ui.label(RichText::new(detail).color(Color32::GRAY));
                        }
                    });
                });
            });
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top-bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(RichText::new("📅").size(20.0)).clicked() {
                    self.filter_sheet.open_for(self.model.filter());
                }
                ui.label(self.model.filter().to_string());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if !self.model.photos().is_empty() {
                        ui.label(position_label(self.model.position(), self.model.photos().len()));
                    }
                });
            });
        });
    }

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("toolbar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let glyph = |text: &str| RichText::new(text).size(24.0);

                let favorite = egui::Button::new(glyph(heart_glyph(self.model.is_favorite_glyph_filled())));
                if ui.add(favorite).on_hover_text("Toggle favorite (F)").clicked() {
                    self.model.toggle_favorite_intent();
                }

                let keep = egui::Button::new(glyph(KEEP_GLYPH)).selected(self.model.is_staged(IntentKind::Keep));
                if ui.add(keep).on_hover_text("Keep (K)").clicked() {
                    self.model.toggle_keep_intent();
                }

                let trash = egui::Button::new(glyph(TRASH_GLYPH)).selected(self.model.is_staged(IntentKind::Trash));
                if ui.add(trash).on_hover_text("Trash (T)").clicked() {
                    self.model.toggle_trash_intent();
                }

                ui.separator();

                let confirm = egui::Button::new(glyph(&confirm_label(self.model.pending_count())));
                if ui
                    .add_enabled(!self.model.is_committing(), confirm)
                    .on_hover_text("Apply staged changes (Enter)")
                    .clicked()
                {
                    self.request_confirmation();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(RichText::new(&self.status).monospace());
                });
            });
            ui.add_space(6.0);
        });
    }

    fn show_photo(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(Color32::BLACK))
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::drag());

                let current = self.model.current().map(|photo| photo.path.clone());
                let texture = current.as_ref().and_then(|path| self.textures.get(path));
                match (texture, current.as_ref()) {
                    (Some(texture), _) => {
                        let metrics = ImageMetrics::new(response.rect, texture.size_vec2());
                        let offset = egui::vec2(self.swipe.travel(), 0.0);
                        painter.image(
                            texture.id(),
                            metrics.image_rect.translate(offset),
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            Color32::WHITE,
                        );
                    }
                    (None, Some(path)) => {
                        let text = if self.loader.has_failed(path) {
                            "No image available"
                        } else {
                            "Loading..."
                        };
                        painter.text(
                            response.rect.center(),
                            egui::Align2::CENTER_CENTER,
                            text,
                            egui::FontId::proportional(24.0),
                            Color32::WHITE,
                        );
                    }
                    (None, None) => {}
                }

                if response.dragged() {
                    self.swipe.drag(response.drag_delta().x);
                }
                if response.drag_stopped() {
                    match self.swipe.release() {
                        Some(Swipe::Next) => {
                            self.model.next();
                        }
                        Some(Swipe::Previous) => {
                            self.model.previous();
                        }
                        None => {}
                    }
                }
            });
    }

    fn show_confirmation_dialog(&mut self, ctx: &egui::Context) {
        if !self.show_confirmation {
            return;
        }
        let prompt = self.model.confirmation_prompt();
        let mut apply = false;
        let mut cancel = false;
        egui::Window::new("Confirm Changes")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(prompt);
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                    let destructive = egui::Button::new(RichText::new("Apply Changes").color(Color32::LIGHT_RED));
                    if ui.add(destructive).clicked() {
                        apply = true;
                    }
                });
            });
        if apply {
            self.apply_changes();
        } else if cancel {
            self.show_confirmation = false;
        }
    }
}

impl App for PhotoSwipeApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut Frame) {
        let _ = frame;

        if let Some(report) = self.model.poll() {
            self.status = report.status_line();
            self.loader.reset_failures();
        }
        if self.model.take_library_changed() {
            self.loader.invalidate();
            self.textures.clear();
        }
        self.loader.update();

        let keys = Self::handle_keyboard(ctx);

        match self.model.phase() {
            Phase::Uninitialized | Phase::Authorizing => {
                Self::show_message(ctx, "Loading Photos...", None);
                ctx.request_repaint_after(POLL_INTERVAL);
                return;
            }
            Phase::Denied(status) => {
                if keys.retry {
                    info!(?status, "retrying library access");
                    self.model.retry_authorization();
                }
                if keys.escape {
                    ctx.send_viewport_cmd(ViewportCommand::Close);
                }
                Self::show_message(
                    ctx,
                    "Photo access denied",
                    Some("Please enable photo access in the library folder permissions (R to retry)"),
                );
                ctx.request_repaint_after(POLL_INTERVAL);
                return;
            }
            Phase::Ready => {}
        }

        self.handle_shortcuts(ctx, &keys);
        self.sync_textures(ctx);

        self.show_top_bar(ctx);
        if self.model.photos().is_empty() {
            Self::show_message(ctx, "No photos match the current filter", Some("Press C to change the filter"));
        } else {
            self.show_toolbar(ctx);
            self.show_photo(ctx);
        }

        if let Some(filter) = self.filter_sheet.show(ctx, Local::now().date_naive()) {
            self.model.set_filter(filter);
            self.textures.clear();
        }
        self.show_confirmation_dialog(ctx);

        ctx.request_repaint_after(POLL_INTERVAL);
    }
}
