use eframe::egui;
use tokio::sync::mpsc;

use crate::common::MediaCommand;
use crate::ui::images::{ImageCache, ImageView};

pub const MIN_SCALE: f32 = 1.0;
pub const MAX_SCALE: f32 = 4.0;

/// Pinch zoom: the scale follows the gesture freely and is clamped to
/// `[MIN_SCALE, MAX_SCALE]` when the gesture ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    scale: f32,
    in_gesture: bool,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            scale: MIN_SCALE,
            in_gesture: false,
        }
    }
}

impl ZoomState {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Feed one frame's zoom factor; a factor of exactly 1.0 ends a running gesture.
    pub fn track(&mut self, frame_factor: f32) {
        if frame_factor != 1.0 {
            self.in_gesture = true;
            self.scale *= frame_factor;
        } else if self.in_gesture {
            self.end_gesture();
        }
    }

    pub fn end_gesture(&mut self) {
        self.in_gesture = false;
        self.scale = self.scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub struct ImageViewer {
    handle: String,
    zoom: ZoomState,
}

impl ImageViewer {
    pub fn new(handle: String) -> Self {
        Self {
            handle,
            zoom: ZoomState::default(),
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }
}

/// Largest size with `image`'s aspect ratio that fits in `bounds`.
pub fn fit_within(image: egui::Vec2, bounds: egui::Vec2) -> egui::Vec2 {
    if image.x <= 0.0 || image.y <= 0.0 {
        return egui::Vec2::ZERO;
    }
    let factor = (bounds.x / image.x).min(bounds.y / image.y);
    image * factor
}

/// Full-window image view. Returns true when the user closes it.
pub fn render(
    ui: &mut egui::Ui,
    viewer: &mut ImageViewer,
    images: &mut ImageCache,
    commands: &mpsc::Sender<MediaCommand>,
) -> bool {
    let mut close = ui.input(|i| i.key_pressed(egui::Key::Escape));

    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        let button = egui::Button::new(egui::RichText::new("✕").size(22.0).color(egui::Color32::WHITE))
            .frame(false);
        if ui.add(button).clicked() {
            close = true;
        }
        if viewer.zoom.scale() != MIN_SCALE && ui.button("Reset zoom").clicked() {
            viewer.zoom.reset();
        }
    });

    viewer.zoom.track(ui.input(|i| i.zoom_delta()));

    egui::ScrollArea::both()
        .id_salt("image_viewer")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.centered_and_justified(|ui| match images.get_or_request(viewer.handle(), commands) {
                ImageView::Ready(texture) => {
                    let size = fit_within(texture.size_vec2(), ui.available_size()) * viewer.zoom.scale();
                    ui.add(egui::Image::new(texture).fit_to_exact_size(size));
                }
                ImageView::Loading => {
                    ui.spinner();
                }
                ImageView::Unavailable => {
                    ui.label(egui::RichText::new("🖼 Image unavailable").color(egui::Color32::GRAY));
                }
            });
        });

    close
}
