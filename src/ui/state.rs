use std::time::Instant;

use crate::common::{ChatMessage, MessageSender};
use crate::media::{AttachmentStore, StoredAttachment, is_remote};
use crate::storage::MessageStore;
use crate::storage::seed::seed_if_empty;

use super::components::home::HomeState;
use super::components::image_viewer::ImageViewer;
use super::pagination::PaginationController;

/// Caption stored with images the user sends.
pub const IMAGE_CAPTION: &str = "Image attachment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Chat,
}

/// UI-local state. Owned and mutated by the UI thread only.
pub struct AppState {
    store: Box<dyn MessageStore>,
    /// Read-only view of the attachment directory the media worker writes to.
    attachments: AttachmentStore,
    /// Full log as last read from the store, oldest first.
    pub messages: Vec<ChatMessage>,
    pub screen: Screen,
    pub home: HomeState,
    pub pagination: PaginationController,
    pub input_text: String,
    pub attach_path_input: String,
    pub show_attach_row: bool,
    /// Images handed to the media worker and not yet stored.
    pub pending_uploads: usize,
    pub viewer: Option<ImageViewer>,
}

impl AppState {
    pub fn new(store: Box<dyn MessageStore>, attachments: AttachmentStore, now: Instant) -> Self {
        Self {
            store,
            attachments,
            messages: Vec::new(),
            screen: Screen::Home,
            home: HomeState::new(now),
            pagination: PaginationController::new(),
            input_text: String::new(),
            attach_path_input: String::new(),
            show_attach_row: false,
            pending_uploads: 0,
            viewer: None,
        }
    }

    /// Switch to the chat screen, seeding the store on first run.
    pub fn open_chat(&mut self) {
        if let Err(err) = seed_if_empty(self.store.as_ref()) {
            log::error!("Failed to seed message store: {err}");
        }
        self.reload_messages();
        self.pagination = PaginationController::new();
        self.screen = Screen::Chat;
    }

    pub fn go_home(&mut self) {
        self.viewer = None;
        self.screen = Screen::Home;
    }

    pub fn reload_messages(&mut self) {
        match self.store.all_messages() {
            Ok(mut messages) => {
                for message in &mut messages {
                    self.fill_missing_size(message);
                }
                self.messages = messages;
            }
            Err(err) => log::error!("Failed to read messages: {err}"),
        }
    }

    /// Local attachments stored without a size get it from the file on disk.
    fn fill_missing_size(&self, message: &mut ChatMessage) {
        if message.attachment_size_bytes.is_some() {
            return;
        }
        if let Some(path) = message.attachment_path.as_deref() {
            message.attachment_size_bytes = self.attachments.file_size(path);
        }
    }

    /// Timestamp for a new user message: the wall clock, but never older than
    /// the newest message already in the log.
    fn next_timestamp(&self, now_millis: i64) -> i64 {
        self.messages
            .last()
            .map_or(now_millis, |last| now_millis.max(last.created_at_millis))
    }

    /// Append a text message. Blank input is dropped without touching the store.
    pub fn send_text(&mut self, text: &str, now_millis: i64) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }

        let message = ChatMessage::text(
            ChatMessage::new_id(),
            text,
            MessageSender::User,
            self.next_timestamp(now_millis),
        );
        self.append(message)
    }

    /// Append the message for an image the media worker finished storing.
    pub fn complete_image_send(
        &mut self,
        stored: StoredAttachment,
        now_millis: i64,
    ) -> Option<String> {
        self.pending_uploads = self.pending_uploads.saturating_sub(1);

        let message = ChatMessage::file(
            ChatMessage::new_id(),
            IMAGE_CAPTION,
            stored.path,
            Some(stored.size_bytes),
            stored.thumbnail_path,
            MessageSender::User,
            self.next_timestamp(now_millis),
        );
        self.append(message)
    }

    pub fn fail_image_send(&mut self) {
        self.pending_uploads = self.pending_uploads.saturating_sub(1);
    }

    fn append(&mut self, message: ChatMessage) -> Option<String> {
        match self.store.append(&message) {
            Ok(true) => {
                let id = message.id.clone();
                self.reload_messages();
                self.pagination.record_send(&id);
                Some(id)
            }
            Ok(false) => None,
            Err(err) => {
                log::error!("Failed to store message {}: {err}", message.id);
                None
            }
        }
    }

    pub fn open_viewer(&mut self, handle: String) {
        if !is_remote(&handle) && !self.attachments.exists(&handle) {
            log::warn!("Opening viewer for missing attachment {handle}");
        }
        self.viewer = Some(ImageViewer::new(handle));
    }

    pub fn close_viewer(&mut self) {
        self.viewer = None;
    }
}
