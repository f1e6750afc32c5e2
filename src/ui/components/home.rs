use std::time::{Duration, Instant};

use eframe::egui;

pub const WELCOME_TEXT: &str = "Welcome to Crew!";
pub const TYPING_SPEED: Duration = Duration::from_millis(80);

pub struct HomeState {
    started_at: Instant,
    finished: bool,
}

impl HomeState {
    pub fn new(now: Instant) -> Self {
        Self {
            started_at: now,
            finished: false,
        }
    }
}

/// Prefix of `text` revealed after `elapsed`, one character per `per_char`
/// with the first character shown immediately.
pub fn typed_prefix(text: &str, elapsed: Duration, per_char: Duration) -> &str {
    let shown = (elapsed.as_millis() / per_char.as_millis().max(1)) as usize + 1;
    match text.char_indices().nth(shown) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Returns true when "Open Chat" was clicked.
pub fn render(ui: &mut egui::Ui, home: &mut HomeState, now: Instant) -> bool {
    let mut open_chat = false;

    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.35);

        let title = if home.finished {
            WELCOME_TEXT
        } else {
            let elapsed = now.saturating_duration_since(home.started_at);
            let prefix = typed_prefix(WELCOME_TEXT, elapsed, TYPING_SPEED);
            if prefix.len() == WELCOME_TEXT.len() {
                home.finished = true;
            } else {
                ui.ctx().request_repaint_after(TYPING_SPEED);
            }
            prefix
        };
        ui.label(egui::RichText::new(title).size(32.0).strong());

        ui.add_space(30.0);
        let button = egui::Button::new(
            egui::RichText::new("💬 Open Chat")
                .strong()
                .color(egui::Color32::WHITE),
        )
        .fill(egui::Color32::from_rgb(0x8B, 0x5A, 0x2B))
        .min_size(egui::vec2(220.0, 44.0));
        if ui.add(button).clicked() {
            open_chat = true;
        }
    });

    open_chat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveals_one_character_per_tick() {
        let speed = Duration::from_millis(80);
        assert_eq!(typed_prefix("Hello", Duration::ZERO, speed), "H");
        assert_eq!(typed_prefix("Hello", Duration::from_millis(79), speed), "H");
        assert_eq!(typed_prefix("Hello", Duration::from_millis(160), speed), "Hel");
        assert_eq!(typed_prefix("Hello", Duration::from_secs(10), speed), "Hello");
    }

    #[test]
    fn respects_multibyte_characters() {
        let speed = Duration::from_millis(10);
        assert_eq!(typed_prefix("héllo", Duration::from_millis(10), speed), "hé");
        assert_eq!(typed_prefix("", Duration::from_secs(1), speed), "");
    }
}
