use std::collections::HashMap;

use eframe::egui;
use tokio::sync::mpsc;

use crate::common::MediaCommand;
use crate::media::DecodedImage;

enum ImageSlot {
    Loading,
    Ready(egui::TextureHandle),
    Unavailable,
}

/// What the view should draw for an attachment handle right now.
#[derive(Clone, Copy)]
pub enum ImageView<'a> {
    Loading,
    Ready(&'a egui::TextureHandle),
    Unavailable,
}

/// Textures for attachment handles, filled in as the media worker answers.
/// Each handle is requested at most once.
#[derive(Default)]
pub struct ImageCache {
    slots: HashMap<String, ImageSlot>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_request(
        &mut self,
        handle: &str,
        commands: &mpsc::Sender<MediaCommand>,
    ) -> ImageView<'_> {
        if !self.slots.contains_key(handle) {
            let command = MediaCommand::LoadImage {
                handle: handle.to_string(),
            };
            match commands.try_send(command) {
                Ok(()) => {
                    self.slots.insert(handle.to_string(), ImageSlot::Loading);
                }
                Err(err) => {
                    // Left out of the map so the next frame retries
                    log::warn!("Failed to request image {handle}: {err}");
                    return ImageView::Loading;
                }
            }
        }

        match self.slots.get(handle) {
            Some(ImageSlot::Ready(texture)) => ImageView::Ready(texture),
            Some(ImageSlot::Unavailable) => ImageView::Unavailable,
            Some(ImageSlot::Loading) | None => ImageView::Loading,
        }
    }

    pub fn insert_loaded(&mut self, ctx: &egui::Context, handle: String, image: DecodedImage) {
        let max_side = ctx.input(|i| i.max_texture_side) as u32;
        let Some(image) = image.fit_within(max_side) else {
            log::warn!("Decoded pixels for {handle} do not match their size");
            self.mark_unavailable(handle);
            return;
        };

        let size = [image.width as usize, image.height as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.rgba);
        let texture = ctx.load_texture(handle.clone(), color_image, egui::TextureOptions::LINEAR);
        self.slots.insert(handle, ImageSlot::Ready(texture));
    }

    pub fn mark_unavailable(&mut self, handle: String) {
        self.slots.insert(handle, ImageSlot::Unavailable);
    }
}
