use crate::media::{DecodedImage, StoredAttachment};

/// Results the background media worker posts back to the UI thread.
#[derive(Debug, Clone)]
pub enum MediaEvent {
    ImageLoaded { handle: String, image: DecodedImage },
    ImageUnavailable { handle: String },
    ImageSaved(StoredAttachment),
    SaveFailed { reason: String },
}
