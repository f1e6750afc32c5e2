use chrono::{DateTime, Duration, TimeZone};
use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{ChatMessage, MessageKind, MediaCommand};
use crate::ui::images::{ImageCache, ImageView};

const MAX_BUBBLE_WIDTH: f32 = 280.0;
const PREVIEW_SIZE: egui::Vec2 = egui::vec2(220.0, 160.0);

const USER_FILL: egui::Color32 = egui::Color32::from_rgb(0x1E, 0x6F, 0xF2);
const AGENT_FILL: egui::Color32 = egui::Color32::from_rgb(0x3A, 0x3A, 0x3C);

pub struct BubbleOutcome {
    pub response: egui::Response,
    /// Full-size handle of an attachment the user clicked.
    pub open_image: Option<String>,
}

pub fn render(
    ui: &mut egui::Ui,
    message: &ChatMessage,
    images: &mut ImageCache,
    commands: &mpsc::Sender<MediaCommand>,
    now: &DateTime<chrono::Local>,
) -> BubbleOutcome {
    let mut open_image = None;
    let layout = if message.is_from_user() {
        egui::Layout::right_to_left(egui::Align::TOP)
    } else {
        egui::Layout::left_to_right(egui::Align::TOP)
    };

    let response = ui
        .with_layout(layout, |ui| {
            ui.vertical(|ui| {
                ui.set_max_width(MAX_BUBBLE_WIDTH);
                match message.kind {
                    MessageKind::Text => text_bubble(ui, message),
                    MessageKind::File => {
                        open_image = file_bubble(ui, message, images, commands);
                    }
                }
                ui.label(
                    egui::RichText::new(format_timestamp(message.created_at_millis, now))
                        .small()
                        .weak(),
                );
            });
        })
        .response;

    BubbleOutcome {
        response,
        open_image,
    }
}

fn text_bubble(ui: &mut egui::Ui, message: &ChatMessage) {
    let fill = if message.is_from_user() {
        USER_FILL
    } else {
        AGENT_FILL
    };
    egui::Frame::new()
        .fill(fill)
        .corner_radius(egui::CornerRadius::same(18))
        .inner_margin(egui::Margin::symmetric(14, 10))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(&message.body).color(egui::Color32::WHITE));
        });
}

fn file_bubble(
    ui: &mut egui::Ui,
    message: &ChatMessage,
    images: &mut ImageCache,
    commands: &mpsc::Sender<MediaCommand>,
) -> Option<String> {
    let mut open_image = None;
    let fill = if message.is_from_user() {
        USER_FILL.gamma_multiply(0.25)
    } else {
        AGENT_FILL.gamma_multiply(0.6)
    };

    egui::Frame::new()
        .fill(fill)
        .corner_radius(egui::CornerRadius::same(12))
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui| {
            if let Some(preview) = message.preview_handle() {
                if image_preview(ui, images, commands, preview).clicked() {
                    open_image = message.attachment_path.clone();
                }
            }
            if !message.body.is_empty() {
                ui.label(egui::RichText::new(&message.body).small().weak());
            }
            if let Some(size) = message.attachment_size_bytes {
                ui.label(egui::RichText::new(format_file_size(size)).small().weak());
            }
        });

    open_image
}

fn image_preview(
    ui: &mut egui::Ui,
    images: &mut ImageCache,
    commands: &mpsc::Sender<MediaCommand>,
    handle: &str,
) -> egui::Response {
    match images.get_or_request(handle, commands) {
        ImageView::Ready(texture) => ui.add(
            egui::Image::new(texture)
                .max_width(PREVIEW_SIZE.x)
                .sense(egui::Sense::click()),
        ),
        ImageView::Loading => {
            let (rect, response) = ui.allocate_exact_size(PREVIEW_SIZE, egui::Sense::hover());
            ui.put(rect, egui::Spinner::new());
            response
        }
        ImageView::Unavailable => ui.add_sized(
            PREVIEW_SIZE,
            egui::Label::new(egui::RichText::new("🖼 Image unavailable").weak()),
        ),
    }
}

/// Size label in megabytes with one decimal.
pub fn format_file_size(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / 1_048_576.0)
}

/// Relative label for a message time, evaluated against `now` in its time zone.
pub fn format_timestamp<Tz: TimeZone>(millis: i64, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(date) = now.timezone().timestamp_millis_opt(millis).single() else {
        return String::new();
    };

    let elapsed = now.clone().signed_duration_since(date.clone());
    if elapsed < Duration::minutes(1) {
        return "Just now".to_string();
    }
    if elapsed < Duration::hours(1) {
        let minutes = elapsed.num_minutes();
        let unit = if minutes == 1 { "minute" } else { "minutes" };
        return format!("{minutes} {unit} ago");
    }

    let time = date.format("%-I:%M %p");
    let day = date.date_naive();
    let today = now.date_naive();
    if day == today {
        format!("Today at {time}")
    } else if today.pred_opt() == Some(day) {
        format!("Yesterday at {time}")
    } else {
        date.format("%b %-d, %Y at %-I:%M %p").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn file_size_in_megabytes() {
        assert_eq!(format_file_size(245_680), "0.2 MB");
        assert_eq!(format_file_size(1_048_576), "1.0 MB");
        assert_eq!(format_file_size(0), "0.0 MB");
        assert_eq!(format_file_size(5 * 1_048_576 + 600_000), "5.6 MB");
    }

    #[test]
    fn recent_times_are_relative() {
        let now = at(2024, 3, 10, 15, 30, 0);
        let millis = |dt: DateTime<Utc>| dt.timestamp_millis();

        assert_eq!(format_timestamp(millis(at(2024, 3, 10, 15, 29, 30)), &now), "Just now");
        assert_eq!(format_timestamp(millis(at(2024, 3, 10, 15, 29, 0)), &now), "1 minute ago");
        assert_eq!(format_timestamp(millis(at(2024, 3, 10, 15, 5, 0)), &now), "25 minutes ago");
        // Clock skew puts a message slightly in the future
        assert_eq!(format_timestamp(millis(at(2024, 3, 10, 15, 31, 0)), &now), "Just now");
    }

    #[test]
    fn older_times_use_day_labels() {
        let now = at(2024, 3, 10, 15, 30, 0);
        let millis = |dt: DateTime<Utc>| dt.timestamp_millis();

        assert_eq!(format_timestamp(millis(at(2024, 3, 10, 9, 5, 0)), &now), "Today at 9:05 AM");
        assert_eq!(
            format_timestamp(millis(at(2024, 3, 9, 21, 45, 0)), &now),
            "Yesterday at 9:45 PM"
        );
        assert_eq!(
            format_timestamp(millis(at(2023, 12, 25, 16, 0, 0)), &now),
            "Dec 25, 2023 at 4:00 PM"
        );
    }
}
