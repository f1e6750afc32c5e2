use eframe::egui;

#[derive(Default)]
pub struct InputActions {
    pub send_text: Option<String>,
    /// Path typed into the attachment row.
    pub attach_path: Option<String>,
}

pub fn render(
    ui: &mut egui::Ui,
    input_text: &mut String,
    attach_path: &mut String,
    show_attach_row: &mut bool,
    pending_uploads: usize,
) -> InputActions {
    let mut actions = InputActions::default();

    if *show_attach_row {
        ui.horizontal(|ui| {
            ui.label("Photo:");
            let response = ui.add(
                egui::TextEdit::singleline(attach_path).hint_text("Path to an image, or drop a file"),
            );
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if (ui.button("Attach").clicked() || submitted) && !attach_path.trim().is_empty() {
                actions.attach_path = Some(attach_path.trim().to_string());
                attach_path.clear();
                *show_attach_row = false;
            }
            if ui.button("Cancel").clicked() {
                attach_path.clear();
                *show_attach_row = false;
            }
        });
    }

    if pending_uploads > 0 {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.weak("Sending image…");
        });
    }

    let mut send = false;
    ui.horizontal(|ui| {
        if ui.button("📎").on_hover_text("Add attachment").clicked() {
            *show_attach_row = !*show_attach_row;
        }

        let response = ui.add(
            egui::TextEdit::singleline(input_text)
                .hint_text("Message")
                .desired_width(ui.available_width() - 60.0),
        );
        if !input_text.is_empty() && ui.button("Send").clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
        }
    });

    if send && !input_text.is_empty() {
        actions.send_text = Some(std::mem::take(input_text));
    }

    actions
}
