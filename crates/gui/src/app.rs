use std::path::PathBuf;

use cover_extractor_core::config::{extract_options_from_config, renderer_from_config, AppConfig};
use cover_extractor_core::extract::ExtractOptions;
use cover_extractor_core::pdf::PdfiumRenderer;
use cover_extractor_core::session::{file_name, Session};
use egui::{Align2, Color32, FontId, Id, LayerId, Order, RichText};

use crate::dialogs;

pub const TITLE: &str = "Book Cover Image Extractor";

const INSTRUCTIONS: &str =
    "Drop a PDF or EPUB file here, or click 'Select File' to choose and extract the thumbnail image";
const NO_OUTPUT_DIR: &str = "No output directory selected";

const LIGHT_BLUE: Color32 = Color32::from_rgb(173, 216, 230);
const LIGHT_YELLOW: Color32 = Color32::from_rgb(255, 255, 224);
const LIGHT_GREEN: Color32 = Color32::from_rgb(144, 238, 144);
const DARK_GREEN: Color32 = Color32::from_rgb(0, 128, 0);

pub struct CoverExtractorApp {
    session: Session,
    renderer: PdfiumRenderer,
    options: ExtractOptions,
    start_dir: Option<PathBuf>,
}

impl CoverExtractorApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        Self {
            session: Session::new(),
            renderer: renderer_from_config(config),
            options: extract_options_from_config(config),
            start_dir: config.dialogs.start_dir.as_ref().map(PathBuf::from),
        }
    }

    fn select_file(&mut self) {
        if let Some(path) = dialogs::pick_book(self.start_dir.as_deref()) {
            self.session.select_file(path);
        }
    }

    fn select_output_directory(&mut self) {
        let Some(dir) = dialogs::pick_output_dir(self.start_dir.as_deref()) else {
            return;
        };
        if let Err(e) = self.session.select_output_directory(dir) {
            dialogs::show_error(&e.to_string());
        }
    }

    fn extract(&mut self) {
        match self.session.extract(&self.renderer, &self.options) {
            Ok(output) => dialogs::show_info(
                "Success",
                &format!(
                    "Image extracted successfully!\nSaved as: {}",
                    file_name(&output)
                ),
            ),
            Err(e) => dialogs::show_error(&e.dialog_message()),
        }
    }

    /// Only the first of several dropped files is considered.
    fn handle_drops(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(first) = dropped.first() else {
            return;
        };
        if dropped.len() > 1 {
            tracing::debug!("{} files dropped, using the first", dropped.len());
        }

        let raw = first
            .path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let outcome = self.session.accept_dropped_path(&raw);
        tracing::debug!("Drop outcome: {:?}", outcome);
    }

    fn paint_drop_overlay(ctx: &egui::Context) {
        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }
        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("drop_overlay")));
        let rect = ctx.screen_rect();
        painter.rect_filled(rect, 0.0, Color32::from_black_alpha(96));
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "Drop to select",
            FontId::proportional(20.0),
            Color32::WHITE,
        );
    }
}

fn action_button(text: &str, fill: Color32) -> egui::Button<'static> {
    egui::Button::new(RichText::new(text).size(15.0).color(Color32::BLACK))
        .fill(fill)
        .min_size(egui::vec2(200.0, 30.0))
}

impl eframe::App for CoverExtractorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_drops(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.label(RichText::new(TITLE).size(20.0).strong());
                ui.add_space(20.0);
                ui.label(INSTRUCTIONS);
                ui.add_space(20.0);

                ui.label(RichText::new("Selected File:").strong());
                let selected = self.session.file().map(file_name).unwrap_or_default();
                ui.label(RichText::new(selected).color(Color32::BLUE));
                ui.add_space(20.0);

                if ui.add(action_button("Select File", LIGHT_BLUE)).clicked() {
                    self.select_file();
                }
                ui.add_space(5.0);
                if ui
                    .add(action_button("Select Output Directory", LIGHT_YELLOW))
                    .clicked()
                {
                    self.select_output_directory();
                }

                ui.add_space(10.0);
                ui.label(RichText::new("Output Directory:").strong());
                let output_dir = self
                    .session
                    .output_dir()
                    .map(file_name)
                    .unwrap_or_else(|| NO_OUTPUT_DIR.to_string());
                ui.label(RichText::new(output_dir).color(DARK_GREEN));
                ui.add_space(20.0);

                let extract = ui.add_enabled(
                    self.session.can_extract(),
                    action_button("Extract Image", LIGHT_GREEN),
                );
                if extract.clicked() {
                    self.extract();
                }

                ui.add_space(10.0);
                ui.label(RichText::new(self.session.status()).color(Color32::GRAY));
            });
        });

        Self::paint_drop_overlay(ctx);
    }
}
