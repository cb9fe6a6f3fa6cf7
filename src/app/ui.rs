use std::borrow::Cow;

use eframe::egui::{self, Align, RichText};
use rfd::{FileDialog, MessageDialog, MessageLevel};

use super::ClassifierApp;
use crate::utils::{file_size, mime};

impl ClassifierApp {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let total_height = ui.available_height();
            let footer_height = 40.0;
            let footer_margin = 15.0;
            let content_height = total_height - footer_height - footer_margin;

            egui::ScrollArea::vertical()
                .max_height(content_height)
                .show(ui, |ui| {
                    ui.add_space(20.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("Brain Tumor Classifier");
                        ui.add_space(5.0);
                        ui.label(
                            RichText::new("Upload an MRI scan and get the model's assessment")
                                .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                    });

                    ui.add_space(20.0);
                    self.render_scan_picker(ui);
                    ui.add_space(10.0);
                    self.render_preview(ui);
                    ui.add_space(10.0);
                    self.render_actions(ui);
                    ui.add_space(10.0);
                    self.render_result(ui);
                    ui.add_space(20.0);
                });

            ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(footer_margin);
                self.render_footer(ui);
            });
        });
    }

    fn render_scan_picker(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                if ui.button("📁 Select MRI Image").clicked() {
                    let picked = FileDialog::new()
                        .add_filter("Images", mime::IMAGE_EXTENSIONS)
                        .add_filter("All files", &["*"])
                        .pick_file();
                    // Cancelling the dialog keeps the current selection.
                    if let Some(path) = picked {
                        self.select_scan(path);
                    }
                }
                ui.add_space(4.0);
                ui.label("ℹ").on_hover_text_at_pointer(
                    "Supported formats: PNG, JPEG, GIF, WebP, BMP, TIFF.\n\
                     The scan is only uploaded when you press Predict.",
                );
                if let Some(scan) = &self.state.scan {
                    ui.label(format!(
                        "{} - {} ({})",
                        scan.file_name,
                        file_size::format_size(scan.size),
                        scan.mime_type
                    ));
                }
            });
        });
    }

    fn render_preview(&self, ui: &mut egui::Ui) {
        if self.state.loading_preview {
            ui.vertical_centered(|ui| {
                ui.spinner();
                ui.weak("Loading preview…");
            });
            return;
        }

        if let (Some(preview), Some(scan)) = (&self.state.preview, &self.state.scan) {
            ui.vertical_centered(|ui| {
                ui.group(|ui| {
                    // The URI carries the selection generation; a stable URI
                    // would keep serving the previous scan from the loader
                    // cache.
                    let source = egui::ImageSource::Bytes {
                        uri: Cow::from(format!(
                            "bytes://scan-preview-{}",
                            self.state.preview_generation
                        )),
                        bytes: egui::load::Bytes::Shared(preview.bytes()),
                    };
                    ui.add(egui::Image::new(source).max_size(egui::vec2(280.0, 280.0)));
                    ui.add_space(4.0);
                    ui.label(
                        RichText::new(&scan.file_name)
                            .small()
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });
            });
        }
    }

    fn render_actions(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            let button = egui::Button::new("📤 Predict").min_size(egui::vec2(160.0, 36.0));
            if ui.add(button).clicked() && self.start_classification().is_err() {
                let _ = MessageDialog::new()
                    .set_level(MessageLevel::Warning)
                    .set_title("No scan selected")
                    .set_description("Please select a file first!")
                    .show();
            }

            if self.state.awaiting_prediction {
                ui.add_space(8.0);
                ui.spinner();
                ui.weak("Classifying…");
            }

            if self.state.scan.is_some() || self.state.prediction.is_some() {
                ui.add_space(8.0);
                if ui.button("🗑 Clear").clicked() {
                    self.reset();
                }
            }
        });
    }

    fn render_result(&self, ui: &mut egui::Ui) {
        // One presentation for both outcomes: the label and the error text
        // are rendered exactly the same way.
        if let Some(prediction) = &self.state.prediction {
            ui.vertical_centered(|ui| {
                ui.group(|ui| {
                    ui.heading("Prediction Result");
                    ui.add_space(5.0);
                    ui.label(RichText::new(prediction.text()).size(16.0));
                });
            });
        }
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new(format!("Classifier service: {}", self.config.base_url))
                    .small()
                    .color(ui.visuals().text_color().gamma_multiply(0.6)),
            );
            ui.add_space(2.0);
            ui.label(RichText::new("Research preview. Not for medical diagnosis.").small());
        });
    }
}
