pub mod commands;
pub mod events;
pub mod types;

pub use commands::MediaCommand;
pub use events::MediaEvent;
pub use types::{ChatMessage, MessageKind, MessageSender};
