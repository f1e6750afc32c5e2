use std::path::PathBuf;

/// Requests the UI sends to the background media worker.
#[derive(Debug, Clone)]
pub enum MediaCommand {
    /// Decode the image behind a handle (local path or remote URL) for display.
    LoadImage { handle: String },
    /// Encode raw image bytes to JPEG and store them as a new attachment.
    /// - file_name: desired file name; a fresh `<uuid>.jpg` when absent
    SaveImage {
        bytes: Vec<u8>,
        file_name: Option<String>,
    },
    /// Read an image file the user picked or dropped, then store it like `SaveImage`.
    ImportImage { path: PathBuf },
}
