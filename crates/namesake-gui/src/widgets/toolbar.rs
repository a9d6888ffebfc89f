/// Top action bar -- directory field, scan controls, watch and theme toggles.
use crate::state::{AppPhase, AppState, Command};
use crate::theme::NamesakeTheme;
use egui::Ui;
use std::path::PathBuf;

/// Draw the toolbar. Returns the commands the user issued this frame.
pub fn toolbar(ui: &mut Ui, state: &mut AppState) -> Vec<Command> {
    let mut commands = Vec::new();
    let theme = NamesakeTheme::for_mode(state.dark_mode);

    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new("🗂 Namesake")
                .size(18.0)
                .strong()
                .color(ui.visuals().hyperlink_color),
        );

        ui.separator();

        // Directory field. Enter or "Open" switches to the typed directory.
        let field = ui.add(
            egui::TextEdit::singleline(&mut state.directory_input)
                .hint_text("Directory to scan")
                .desired_width(360.0),
        );
        let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let busy = matches!(state.phase, AppPhase::Scanning | AppPhase::Merging);
        let has_input = !state.directory_input.trim().is_empty();
        if ui
            .add_enabled(!busy && has_input, egui::Button::new("📂 Open"))
            .on_hover_text("Scan this directory")
            .clicked()
            || (submitted && !busy && has_input)
        {
            commands.push(Command::SetDirectory(PathBuf::from(
                state.directory_input.trim(),
            )));
        }

        ui.separator();

        // Rescan button.
        let can_scan = !busy && state.directory.is_some();
        if ui
            .add_enabled(
                can_scan,
                egui::Button::new("▶ Scan").min_size(egui::vec2(70.0, 28.0)),
            )
            .on_hover_text("Group the directory again from scratch")
            .clicked()
        {
            commands.push(Command::StartScan);
        }

        // Stop button (only during scan).
        let can_stop = state.phase == AppPhase::Scanning;
        if ui
            .add_enabled(
                can_stop,
                egui::Button::new("⏹ Stop").min_size(egui::vec2(70.0, 28.0)),
            )
            .clicked()
        {
            commands.push(Command::CancelScan);
        }

        // Right-aligned controls.
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let theme_label = if state.dark_mode { "☀" } else { "🌙" };
            let theme_tip = if state.dark_mode {
                "Switch to light mode"
            } else {
                "Switch to dark mode"
            };
            if ui.button(theme_label).on_hover_text(theme_tip).clicked() {
                commands.push(Command::ToggleTheme);
            }

            ui.separator();

            let watch_label = if state.monitor_active {
                egui::RichText::new("👁 Watching").color(theme.success)
            } else {
                egui::RichText::new("👁 Watch")
            };
            let watch_tip = if state.monitor_active {
                "Stop regrouping automatically when the directory changes"
            } else {
                "Regroup automatically when the directory changes"
            };
            if ui
                .add_enabled(state.directory.is_some(), egui::Button::new(watch_label))
                .on_hover_text(watch_tip)
                .clicked()
            {
                commands.push(Command::ToggleWatch);
            }
        });
    });

    commands
}
