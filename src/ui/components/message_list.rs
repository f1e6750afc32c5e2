use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{ChatMessage, MediaCommand};
use crate::ui::images::ImageCache;
use crate::ui::pagination::{PaginationController, ScrollAlign};

use super::message_bubble;

/// Draws the visible window of `messages`. Returns the full-size handle of an
/// image the user clicked, if any.
pub fn render(
    ui: &mut egui::Ui,
    messages: &[ChatMessage],
    pagination: &mut PaginationController,
    images: &mut ImageCache,
    commands: &mpsc::Sender<MediaCommand>,
) -> Option<String> {
    let window = pagination.visible_window(messages);
    let total = messages.len();
    let pending = pagination.pending_scroll().cloned();
    let now = chrono::Local::now();
    let mut open_image = None;

    egui::ScrollArea::vertical()
        .id_salt("message_list")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if pagination.can_load_more(total) {
                ui.vertical_centered(|ui| {
                    if pagination.is_loading() {
                        ui.spinner();
                    } else if pagination.initial_load_complete() {
                        ui.weak("Scroll up for earlier messages");
                    }
                });
            }

            if window.is_empty() {
                ui.vertical_centered(|ui| ui.weak("No messages yet"));
                return;
            }

            let oldest_id = window[0].id.as_str();
            for (index, message) in window.iter().enumerate() {
                let outcome = message_bubble::render(ui, message, images, commands, &now);
                if outcome.open_image.is_some() {
                    open_image = outcome.open_image;
                }

                if let Some(request) = &pending {
                    if request.message_id == message.id {
                        let align = match request.align {
                            ScrollAlign::Top => egui::Align::TOP,
                            ScrollAlign::Bottom => egui::Align::BOTTOM,
                        };
                        outcome.response.scroll_to_me(Some(align));
                        pagination.scroll_applied();
                    }
                }

                if ui.is_rect_visible(outcome.response.rect) {
                    if let Some(anchor) = pagination.on_item_visible(index, oldest_id, total) {
                        log::debug!(
                            "Window grew to {}; holding position at {anchor}",
                            pagination.visible_count()
                        );
                    }
                }

                ui.add_space(12.0);
            }
        });

    if let Some(request) = pending {
        if !window.iter().any(|message| message.id == request.message_id) {
            log::debug!("Scroll target {} not in window; dropping", request.message_id);
            pagination.scroll_applied();
        }
    }

    open_image
}
