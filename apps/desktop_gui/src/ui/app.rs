use std::{collections::HashMap, path::Path, time::Duration};

use client_core::{
    project_cards,
    render::{IMAGE_LOAD_ERROR_LABEL, RESULTS_HEADING, SOURCE_LINK_LABEL},
    CompletionOutcome, ResultCard, SearchError, SearchSession, SelectedFile,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::TextureHandle;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::media::{decode_preview_image, PreviewImage};

const PREVIEW_MAX_DIMENSION: u32 = 320;
const CARD_WIDTH: f32 = 260.0;
const CARD_IMAGE_HEIGHT: f32 = 180.0;
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

enum PreviewState {
    Ready(TextureHandle),
    DecodeFailed,
}

enum ThumbnailState {
    Loading,
    Ready(TextureHandle),
    Failed,
}

pub struct FaceSearchApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    endpoint: String,
    session: SearchSession,
    preview: Option<PreviewState>,
    thumbnails: HashMap<String, ThumbnailState>,
    /// Front-end failures that are not part of the search lifecycle.
    notice: Option<String>,
}

impl FaceSearchApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            endpoint: endpoint.into(),
            session: SearchSession::new(),
            preview: None,
            thumbnails: HashMap::new(),
            notice: None,
        }
    }

    fn process_ui_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::SearchFinished { ticket, outcome } => {
                    if self.session.complete(ticket, outcome) == CompletionOutcome::Applied {
                        self.notice = None;
                        self.request_thumbnails();
                    }
                }
                UiEvent::ThumbnailLoaded { url, image } => {
                    let texture = load_texture(ctx, format!("thumbnail:{url}"), &image);
                    self.thumbnails.insert(url, ThumbnailState::Ready(texture));
                }
                UiEvent::ThumbnailFailed { url, reason } => {
                    tracing::debug!(%url, "showing placeholder for result image: {reason}");
                    self.thumbnails.insert(url, ThumbnailState::Failed);
                }
                UiEvent::BackendFailed(message) => {
                    self.notice = Some(message);
                }
            }
        }
    }

    fn request_thumbnails(&mut self) {
        let urls: Vec<String> = self
            .session
            .results()
            .iter()
            .map(|result| result.url.clone())
            .collect();
        for url in urls {
            if self.thumbnails.contains_key(&url) {
                continue;
            }
            let state = match dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::FetchThumbnail { url: url.clone() },
            ) {
                Ok(()) => ThumbnailState::Loading,
                Err(_) => ThumbnailState::Failed,
            };
            self.thumbnails.insert(url, state);
        }
    }

    fn pick_image(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .add_filter("All files", &["*"])
            .pick_file()
        else {
            return;
        };
        self.select_path(ctx, &path);
    }

    fn select_path(&mut self, ctx: &egui::Context, path: &Path) {
        let file = match SelectedFile::from_path(path) {
            Ok(file) => file,
            Err(err) => {
                self.notice = Some(format!("{err:#}"));
                return;
            }
        };
        self.notice = None;

        let superseded = self.session.in_flight();
        if let Err(err) = self.session.select_file(file) {
            self.notice = rejected_pick_notice(&self.session, &err);
            return;
        }
        if let Some(ticket) = superseded {
            let _ = dispatch_backend_command(&self.cmd_tx, BackendCommand::CancelSearch { ticket });
        }
        self.thumbnails.clear();
        self.preview = Some(self.decode_selection_preview(ctx));
    }

    fn decode_selection_preview(&self, ctx: &egui::Context) -> PreviewState {
        let Some(bytes) = self.session.preview().and_then(|preview| preview.decode_payload())
        else {
            return PreviewState::DecodeFailed;
        };
        match decode_preview_image(&bytes, PREVIEW_MAX_DIMENSION) {
            Ok(image) => PreviewState::Ready(load_texture(ctx, "selection-preview", &image)),
            Err(err) => {
                tracing::debug!("selected image could not be previewed: {err}");
                PreviewState::DecodeFailed
            }
        }
    }

    fn submit(&mut self) {
        let superseded = self.session.in_flight();
        let Ok(pending) = self.session.begin_submission() else {
            return;
        };
        if let Some(ticket) = superseded {
            let _ = dispatch_backend_command(&self.cmd_tx, BackendCommand::CancelSearch { ticket });
        }
        self.thumbnails.clear();
        let ticket = pending.ticket;
        if let Err(reason) = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Search {
                ticket,
                file: pending.file,
            },
        ) {
            self.session
                .complete(ticket, Err(SearchError::Transport(reason.to_string())));
        }
    }

    fn cancel(&mut self) {
        if let Some(ticket) = self.session.cancel() {
            let _ = dispatch_backend_command(&self.cmd_tx, BackendCommand::CancelSearch { ticket });
        }
    }

    fn show_upload_section(&mut self, ui: &mut egui::Ui) {
        egui::Frame::NONE
            .stroke(egui::Stroke::new(2.0, egui::Color32::from_gray(150)))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(20, 18))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label("Upload a photo with a face");
                    ui.label(egui::RichText::new("PNG, JPG, WEBP supported").small().weak());
                    ui.add_space(6.0);
                    if ui.button("Choose image…").clicked() {
                        self.pick_image(ui.ctx());
                    }
                    if let Some(file) = self.session.selected_file() {
                        ui.label(egui::RichText::new(file.file_name()).weak());
                    }
                });
            });
    }

    fn show_preview(&self, ui: &mut egui::Ui) {
        let Some(preview) = &self.preview else {
            return;
        };
        ui.add_space(10.0);
        ui.label(egui::RichText::new("Preview").strong());
        match preview {
            PreviewState::Ready(texture) => {
                ui.add(
                    egui::Image::new((texture.id(), texture.size_vec2())).max_size(egui::vec2(
                        PREVIEW_MAX_DIMENSION as f32,
                        PREVIEW_MAX_DIMENSION as f32,
                    )),
                );
            }
            PreviewState::DecodeFailed => {
                ui.label(egui::RichText::new("Preview unavailable for this image").weak());
            }
        }
    }

    fn show_error_banner(&mut self, ui: &mut egui::Ui) {
        let message = self
            .session
            .error()
            .map(str::to_string)
            .or_else(|| self.notice.clone());
        let Some(message) = message else {
            return;
        };
        ui.add_space(10.0);
        egui::Frame::NONE
            .fill(egui::Color32::from_rgb(111, 53, 53))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
            });
    }

    fn show_submit_controls(&mut self, ui: &mut egui::Ui) {
        ui.add_space(10.0);
        ui.horizontal(|ui| {
            let label = if self.session.is_loading() {
                "Searching..."
            } else {
                "Find Similar Faces"
            };
            let button = egui::Button::new(label).min_size(egui::vec2(200.0, 32.0));
            if ui.add_enabled(self.session.can_submit(), button).clicked() {
                self.submit();
            }
            if self.session.is_loading() {
                ui.spinner();
                if ui.button("Cancel").clicked() {
                    self.cancel();
                }
            }
        });
    }

    fn show_results(&self, ui: &mut egui::Ui) {
        let cards = project_cards(self.session.results());
        if cards.is_empty() {
            return;
        }
        ui.add_space(14.0);
        ui.heading(RESULTS_HEADING);
        ui.add_space(6.0);
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = egui::vec2(14.0, 14.0);
            for card in &cards {
                self.show_result_card(ui, card);
            }
        });
    }

    fn show_result_card(&self, ui: &mut egui::Ui, card: &ResultCard) {
        egui::Frame::NONE
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(90)))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::same(8))
            .show(ui, |ui| {
                ui.set_width(CARD_WIDTH);
                ui.vertical(|ui| {
                    self.show_card_image(ui, card);
                    ui.add_space(4.0);
                    egui::Frame::NONE
                        .fill(egui::Color32::from_rgb(37, 99, 235))
                        .corner_radius(10.0)
                        .inner_margin(egui::Margin::symmetric(8, 3))
                        .show(ui, |ui| {
                            ui.label(
                                egui::RichText::new(&card.badge)
                                    .color(egui::Color32::WHITE)
                                    .small(),
                            );
                        });
                    if let Some(source_url) = &card.source_url {
                        ui.hyperlink_to(SOURCE_LINK_LABEL, source_url)
                            .on_hover_text(source_url);
                    }
                });
            });
    }

    fn show_card_image(&self, ui: &mut egui::Ui, card: &ResultCard) {
        let size = egui::vec2(CARD_WIDTH, CARD_IMAGE_HEIGHT);
        match self.thumbnails.get(&card.image_url) {
            Some(ThumbnailState::Ready(texture)) => {
                ui.add(egui::Image::new((texture.id(), texture.size_vec2())).max_size(size))
                    .on_hover_text(&card.alt_text);
            }
            Some(ThumbnailState::Loading) => {
                let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                ui.put(rect, egui::Spinner::new());
            }
            Some(ThumbnailState::Failed) | None => {
                let (rect, response) = ui.allocate_exact_size(size, egui::Sense::hover());
                let painter = ui.painter();
                painter.rect_filled(
                    rect,
                    egui::CornerRadius::same(4),
                    egui::Color32::from_gray(60),
                );
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    IMAGE_LOAD_ERROR_LABEL,
                    egui::FontId::proportional(14.0),
                    egui::Color32::from_gray(200),
                );
                response.on_hover_text(&card.alt_text);
            }
        }
    }
}

/// The session keeps a rejected pick out of its status while a search is in
/// flight, so the banner has to carry the message instead.
fn rejected_pick_notice(session: &SearchSession, err: &SearchError) -> Option<String> {
    session.is_loading().then(|| err.to_string())
}

fn load_texture(
    ctx: &egui::Context,
    name: impl Into<String>,
    image: &PreviewImage,
) -> TextureHandle {
    ctx.load_texture(name, image.to_color_image(), egui::TextureOptions::LINEAR)
}

impl eframe::App for FaceSearchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("Face Search");
                    ui.label(
                        egui::RichText::new(format!("Endpoint: {}", self.endpoint))
                            .small()
                            .weak(),
                    );
                    ui.add_space(8.0);
                    self.show_upload_section(ui);
                    self.show_preview(ui);
                    self.show_error_banner(ui);
                    self.show_submit_controls(ui);
                    self.show_results(ui);
                });
        });

        let thumbnails_pending = self
            .thumbnails
            .values()
            .any(|state| matches!(state, ThumbnailState::Loading));
        if self.session.is_loading() || thumbnails_pending {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
