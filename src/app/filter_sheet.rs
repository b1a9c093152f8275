use chrono::NaiveDate;
use eframe::egui;

use crate::filter::{parse_date, FilterPreset, FilterSpec};

/// State of the "Filter Photos" sheet while it is being edited.
pub struct FilterSheet {
    pub open: bool,
    pub preset: FilterPreset,
    pub start_text: String,
    pub end_text: String,
    pub error: Option<String>,
}

impl FilterSheet {
    pub fn new(current: &FilterSpec) -> Self {
        let mut sheet = Self {
            open: false,
            preset: FilterPreset::AllPhotos,
            start_text: String::new(),
            end_text: String::new(),
            error: None,
        };
        sheet.load(current);
        sheet
    }

    /// Opens the sheet prefilled from the active filter.
    pub fn open_for(&mut self, current: &FilterSpec) {
        self.load(current);
        self.open = true;
    }

    fn load(&mut self, current: &FilterSpec) {
        self.error = None;
        match current {
            FilterSpec::All => {
                self.preset = FilterPreset::AllPhotos;
            }
            FilterSpec::DateRange { start, end } => {
                self.preset = FilterPreset::Custom;
                self.start_text = start.format("%Y-%m-%d").to_string();
                self.end_text = end.format("%Y-%m-%d").to_string();
            }
        }
    }

    /// Empty date fields fall back to `today`; malformed ones are an error.
    pub fn resolve(&self, today: NaiveDate) -> Result<FilterSpec, String> {
        let field = |label: &str, text: &str| -> Result<Option<NaiveDate>, String> {
            if text.trim().is_empty() {
                return Ok(None);
            }
            parse_date(text)
                .map(Some)
                .ok_or_else(|| format!("{label} must look like 2025-07-06"))
        };
        let (start, end) = if self.preset == FilterPreset::Custom {
            (field("Start date", &self.start_text)?, field("End date", &self.end_text)?)
        } else {
            (None, None)
        };
        Ok(self.preset.resolve(today, start, end))
    }

    /// Draws the sheet. Returns the new filter when the user pressed Apply.
    pub fn show(&mut self, ctx: &egui::Context, today: NaiveDate) -> Option<FilterSpec> {
        if !self.open {
            return None;
        }

        let mut applied = None;
        egui::Window::new("Filter Photos")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("Filter Options");
                ui.horizontal(|ui| {
                    for preset in FilterPreset::ALL {
                        ui.radio_value(&mut self.preset, preset, preset.label());
                    }
                });

                if self.preset == FilterPreset::Custom {
                    egui::Grid::new("filter-dates").num_columns(2).show(ui, |ui| {
                        ui.label("Start Date");
                        ui.text_edit_singleline(&mut self.start_text);
                        ui.end_row();
                        ui.label("End Date");
                        ui.text_edit_singleline(&mut self.end_text);
                        ui.end_row();
                    });
                }

                if let Some(error) = &self.error {
                    ui.colored_label(egui::Color32::LIGHT_RED, error);
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        self.open = false;
                    }
                    if ui.button("Apply").clicked() {
                        match self.resolve(today) {
                            Ok(filter) => {
                                self.open = false;
                                applied = Some(filter);
                            }
                            Err(message) => self.error = Some(message),
                        }
                    }
                });
            });
        applied
    }
}
