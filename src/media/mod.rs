//! Attachment storage and image decoding. Everything here runs off the UI
//! thread, driven by [`MediaWorker`].

pub mod attachments;
pub mod remote;
pub mod worker;

pub use attachments::{AttachmentStore, StoredAttachment};
pub use worker::MediaWorker;

use std::path::PathBuf;

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use thiserror::Error;

/// JPEG quality used for every stored attachment.
pub const JPEG_QUALITY: u8 = 80;

/// Longest edge of generated thumbnails, in pixels.
pub const THUMBNAIL_MAX_EDGE: u32 = 200;

/// Longest edge of an image handed to the UI for display. Fits the texture
/// limit of every wgpu/glow backend eframe ships with.
pub const MAX_DISPLAY_EDGE: u32 = 4096;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("failed to write attachment {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("image content unavailable: {handle}")]
    Unavailable { handle: String },

    #[error("failed to fetch {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("fetched {url} but could not decode it: {source}")]
    RemoteDecode {
        url: String,
        source: image::ImageError,
    },
}

pub type MediaResult<T> = Result<T, MediaError>;

/// Decoded RGBA pixels ready to be turned into a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// Shrink to fit a `max_edge` square, keeping the aspect ratio. `None` when
    /// the pixel buffer does not match the stated size.
    pub fn fit_within(self, max_edge: u32) -> Option<Self> {
        let expected_len = self.width as usize * self.height as usize * 4;
        if self.rgba.len() != expected_len {
            return None;
        }
        if self.width <= max_edge && self.height <= max_edge {
            return Some(self);
        }

        let buffer = RgbaImage::from_raw(self.width, self.height, self.rgba)?;
        let resized = DynamicImage::ImageRgba8(buffer).resize(max_edge, max_edge, FilterType::Triangle);
        Some(Self::from_rgba(resized))
    }

    fn from_rgba(image: DynamicImage) -> Self {
        let rgba = image.into_rgba8();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        }
    }
}

impl From<DynamicImage> for DecodedImage {
    fn from(image: DynamicImage) -> Self {
        let image = if image.width() > MAX_DISPLAY_EDGE || image.height() > MAX_DISPLAY_EDGE {
            log::debug!(
                "Downscaling {}x{} image for display",
                image.width(),
                image.height()
            );
            image.resize(MAX_DISPLAY_EDGE, MAX_DISPLAY_EDGE, FilterType::Triangle)
        } else {
            image
        };
        Self::from_rgba(image)
    }
}

/// Remote handles are told apart from local paths by a plain prefix test.
pub fn is_remote(handle: &str) -> bool {
    handle.starts_with("http")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_detection_is_prefix_based() {
        assert!(is_remote("https://images.unsplash.com/photo.jpg"));
        assert!(is_remote("http://localhost/a.png"));
        assert!(is_remote("httpfoo"));
        assert!(!is_remote("/data/attachments/http.jpg"));
        assert!(!is_remote("file:///tmp/a.jpg"));
    }

    #[test]
    fn oversized_images_are_downscaled_for_display() {
        let decoded = DecodedImage::from(DynamicImage::new_rgb8(MAX_DISPLAY_EDGE * 2, 10));
        assert_eq!(decoded.width, MAX_DISPLAY_EDGE);
        assert!(decoded.height >= 1 && decoded.height <= 10);
        assert_eq!(decoded.rgba.len(), (decoded.width * decoded.height * 4) as usize);
    }

    #[test]
    fn fit_within_shrinks_and_validates() {
        let wide = DecodedImage {
            width: 300,
            height: 100,
            rgba: vec![0; 300 * 100 * 4],
        };
        let fitted = wide.fit_within(150).unwrap();
        assert_eq!((fitted.width, fitted.height), (150, 50));

        let small = DecodedImage {
            width: 2,
            height: 2,
            rgba: vec![7; 16],
        };
        assert_eq!(small.clone().fit_within(150), Some(small));

        let truncated = DecodedImage {
            width: 4,
            height: 4,
            rgba: vec![0; 10],
        };
        assert_eq!(truncated.fit_within(150), None);
    }

    #[test]
    fn decoded_image_is_rgba() {
        let image = DynamicImage::new_rgb8(3, 2);
        let decoded = DecodedImage::from(image);
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.rgba.len(), 3 * 2 * 4);
    }
}
