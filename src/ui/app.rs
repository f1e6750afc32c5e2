use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{MediaCommand, MediaEvent};

use super::components::{home, image_viewer, input_bar, message_list};
use super::images::ImageCache;
use super::state::{AppState, Screen};

/// Poll interval for worker results while nothing else asks for a repaint.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct ChatApp {
    state: AppState,
    images: ImageCache,
    command_sender: mpsc::Sender<MediaCommand>,
    event_receiver: mpsc::Receiver<MediaEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        state: AppState,
        command_sender: mpsc::Sender<MediaCommand>,
        event_receiver: mpsc::Receiver<MediaEvent>,
    ) -> Self {
        Self {
            state,
            images: ImageCache::new(),
            command_sender,
            event_receiver,
        }
    }

    /// The single place where background results touch UI state.
    fn handle_media_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                MediaEvent::ImageLoaded { handle, image } => {
                    self.images.insert_loaded(ctx, handle, image)
                }
                MediaEvent::ImageUnavailable { handle } => self.images.mark_unavailable(handle),
                MediaEvent::ImageSaved(stored) => {
                    let now_millis = chrono::Utc::now().timestamp_millis();
                    if let Some(id) = self.state.complete_image_send(stored, now_millis) {
                        log::info!("Sent image message {id}");
                    }
                }
                MediaEvent::SaveFailed { reason } => {
                    log::warn!("Image message dropped: {reason}");
                    self.state.fail_image_send();
                }
            }
        }
    }

    fn send_command(&mut self, command: MediaCommand) -> bool {
        match self.command_sender.try_send(command) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Failed to send command to media worker: {err}");
                false
            }
        }
    }

    fn send_image_bytes(&mut self, bytes: Vec<u8>, file_name: Option<String>) {
        if bytes.is_empty() {
            return;
        }
        if self.send_command(MediaCommand::SaveImage { bytes, file_name }) {
            self.state.pending_uploads += 1;
        }
    }

    fn send_image_file(&mut self, path: PathBuf) {
        if self.send_command(MediaCommand::ImportImage { path }) {
            self.state.pending_uploads += 1;
        }
    }

    fn collect_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = file.path {
                self.send_image_file(path);
            } else if let Some(bytes) = file.bytes {
                self.send_image_bytes(bytes.to_vec(), None);
            }
        }
    }

    fn show_chat(&mut self, ctx: &egui::Context, now: Instant) {
        self.collect_dropped_files(ctx);

        egui::TopBottomPanel::top("chat_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("‹ Home").clicked() {
                    self.state.go_home();
                }
                ui.heading("Chat");
            });
        });
        if self.state.screen != Screen::Chat {
            return;
        }

        egui::TopBottomPanel::bottom("input_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            let actions = input_bar::render(
                ui,
                &mut self.state.input_text,
                &mut self.state.attach_path_input,
                &mut self.state.show_attach_row,
                self.state.pending_uploads,
            );
            if let Some(text) = actions.send_text {
                let now_millis = chrono::Utc::now().timestamp_millis();
                self.state.send_text(&text, now_millis);
            }
            if let Some(path) = actions.attach_path {
                self.send_image_file(PathBuf::from(path));
            }
            ui.add_space(6.0);
        });

        let newest_id = self.state.messages.last().map(|message| message.id.clone());
        self.state
            .pagination
            .on_first_render(now, newest_id.as_deref());
        self.state.pagination.tick(now);
        if let Some(remaining) = self.state.pagination.settle_remaining(now) {
            ctx.request_repaint_after(remaining);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let clicked = message_list::render(
                ui,
                &self.state.messages,
                &mut self.state.pagination,
                &mut self.images,
                &self.command_sender,
            );
            if let Some(handle) = clicked {
                self.state.open_viewer(handle);
            }
        });
    }

    fn show_viewer(&mut self, ctx: &egui::Context) {
        let frame = egui::Frame::new()
            .fill(egui::Color32::BLACK)
            .inner_margin(egui::Margin::same(12));
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            let Some(viewer) = self.state.viewer.as_mut() else {
                return;
            };
            if image_viewer::render(ui, viewer, &mut self.images, &self.command_sender) {
                self.state.close_viewer();
            }
        });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_media_events(ctx);
        let now = Instant::now();

        match self.state.screen {
            Screen::Home => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    if home::render(ui, &mut self.state.home, now) {
                        self.state.open_chat();
                    }
                });
            }
            Screen::Chat if self.state.viewer.is_some() => self.show_viewer(ctx),
            Screen::Chat => self.show_chat(ctx, now),
        }

        ctx.request_repaint_after(EVENT_POLL_INTERVAL);
    }
}
