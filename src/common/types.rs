use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a message carries only text or points at an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    File,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::File => "file",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "text" => Some(MessageKind::Text),
            "file" => Some(MessageKind::File),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    User,
    Agent,
}

impl MessageSender {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageSender::User => "user",
            MessageSender::Agent => "agent",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "user" => Some(MessageSender::User),
            "agent" => Some(MessageSender::Agent),
            _ => None,
        }
    }
}

/// A single entry of the chat log. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub body: String,
    pub kind: MessageKind,
    /// Local path or remote URL; set only for `MessageKind::File`.
    pub attachment_path: Option<String>,
    pub attachment_size_bytes: Option<u64>,
    pub thumbnail_path: Option<String>,
    pub sender: MessageSender,
    /// Epoch milliseconds, the only ordering key of the log.
    pub created_at_millis: i64,
}

impl ChatMessage {
    pub fn text(
        id: impl Into<String>,
        body: impl Into<String>,
        sender: MessageSender,
        created_at_millis: i64,
    ) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            kind: MessageKind::Text,
            attachment_path: None,
            attachment_size_bytes: None,
            thumbnail_path: None,
            sender,
            created_at_millis,
        }
    }

    pub fn file(
        id: impl Into<String>,
        body: impl Into<String>,
        attachment_path: impl Into<String>,
        attachment_size_bytes: Option<u64>,
        thumbnail_path: Option<String>,
        sender: MessageSender,
        created_at_millis: i64,
    ) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            kind: MessageKind::File,
            attachment_path: Some(attachment_path.into()),
            attachment_size_bytes,
            thumbnail_path,
            sender,
            created_at_millis,
        }
    }

    /// Fresh identifier for a locally composed message.
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == MessageSender::User
    }

    /// Handle to show inline: the thumbnail when there is one, else the full attachment.
    pub fn preview_handle(&self) -> Option<&str> {
        self.thumbnail_path
            .as_deref()
            .or(self.attachment_path.as_deref())
    }
}
