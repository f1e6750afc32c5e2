use rusqlite::Result as SqlResult;

use super::MessageStore;
use crate::common::{ChatMessage, MessageSender};

/// Demo conversation written on first launch so the chat has something to show.
pub fn seed_messages() -> Vec<ChatMessage> {
    use MessageSender::{Agent, User};

    vec![
        ChatMessage::text("msg-001", "Hi! I need help booking a flight to Mumbai.", User, 1703520000000),
        ChatMessage::text(
            "msg-002",
            "Hello! I'd be happy to help you book a flight to Mumbai. When are you planning to travel?",
            Agent,
            1703520030000,
        ),
        ChatMessage::text("msg-003", "Next Friday, December 29th.", User, 1703520090000),
        ChatMessage::text("msg-004", "Great! And when would you like to return?", Agent, 1703520120000),
        ChatMessage::text("msg-005", "January 5th. Also, I prefer morning flights.", User, 1703520180000),
        ChatMessage::text(
            "msg-006",
            "Perfect! Let me search for morning flights from your location to Mumbai. Could you also share your departure city?",
            Agent,
            1703520210000,
        ),
        ChatMessage::file(
            "msg-007",
            "",
            "https://images.unsplash.com/photo-1436491865332-7a61a109cc05?w=400",
            Some(245680),
            Some("https://images.unsplash.com/photo-1436491865332-7a61a109cc05?w=100".to_string()),
            User,
            1703520300000,
        ),
        ChatMessage::text(
            "msg-008",
            "Thanks for sharing! I can see you prefer IndiGo. Let me find the best options for you.",
            Agent,
            1703520330000,
        ),
        ChatMessage::file(
            "msg-009",
            "Flight options comparison",
            "https://images.unsplash.com/photo-1464037866556-6812c9d1c72e?w=400",
            Some(189420),
            Some("https://images.unsplash.com/photo-1464037866556-6812c9d1c72e?w=100".to_string()),
            Agent,
            1703520420000,
        ),
        ChatMessage::text("msg-010", "The second option looks perfect! How do I proceed?", User, 1703520480000),
    ]
}

/// Populate an empty store with [`seed_messages`]. Returns how many were written;
/// zero when the store already holds anything.
pub fn seed_if_empty(store: &dyn MessageStore) -> SqlResult<usize> {
    if !store.is_empty()? {
        log::debug!("Message store already populated; skipping seed data");
        return Ok(0);
    }

    let mut inserted = 0;
    for message in seed_messages() {
        if store.append(&message)? {
            inserted += 1;
        }
    }

    log::info!("Seeded {inserted} demo messages");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MessageDatabase;
    use std::collections::HashSet;

    #[test]
    fn script_is_ordered_with_unique_ids() {
        let messages = seed_messages();
        assert_eq!(messages.len(), 10);
        assert_eq!(messages[0].id, "msg-001");
        assert_eq!(messages[9].id, "msg-010");
        assert!(
            messages
                .windows(2)
                .all(|pair| pair[0].created_at_millis <= pair[1].created_at_millis)
        );

        let ids: HashSet<_> = messages.iter().map(|message| message.id.as_str()).collect();
        assert_eq!(ids.len(), messages.len());
    }

    #[test]
    fn file_entries_carry_attachment_handles() {
        for message in seed_messages() {
            let is_file = message.kind == crate::common::MessageKind::File;
            assert_eq!(is_file, message.attachment_path.is_some(), "{}", message.id);
        }
    }

    #[test]
    fn seeds_only_once() {
        let db = MessageDatabase::in_memory().unwrap();
        let expected = seed_messages().len();

        assert_eq!(seed_if_empty(&db).unwrap(), expected);
        assert_eq!(seed_if_empty(&db).unwrap(), 0);
        assert_eq!(db.message_count().unwrap(), expected);
    }

    #[test]
    fn skips_when_user_already_wrote() {
        let db = MessageDatabase::in_memory().unwrap();
        db.append(&ChatMessage::text("mine", "hello", MessageSender::User, 1))
            .unwrap();

        assert_eq!(seed_if_empty(&db).unwrap(), 0);
        assert_eq!(db.message_count().unwrap(), 1);
    }
}
