/// Bottom status bar -- scan progress, the latest status line and watch state.
use crate::state::{AppPhase, AppState};
use crate::theme::NamesakeTheme;
use egui::Ui;

/// Draw the status bar at the bottom of the window.
pub fn status_bar(ui: &mut Ui, state: &AppState) {
    let theme = NamesakeTheme::for_mode(state.dark_mode);
    let color_weak = ui.visuals().weak_text_color();
    let color_normal = ui.visuals().text_color();

    ui.horizontal(|ui| {
        match state.phase {
            AppPhase::Idle => {
                ui.label(egui::RichText::new("Ready").size(12.0).color(color_weak));
            }
            AppPhase::Scanning => {
                ui.spinner();
                let text = if state.scan_total == 0 {
                    "Listing directory...".to_owned()
                } else {
                    format!(
                        "Scanning {}/{} – {}",
                        state.scan_processed,
                        state.scan_total,
                        truncate_name(&state.scan_current, 40)
                    )
                };
                ui.label(egui::RichText::new(text).size(12.0).color(color_normal));
            }
            AppPhase::Merging => {
                ui.spinner();
                ui.label(egui::RichText::new("Merging...").size(12.0).color(color_normal));
            }
            AppPhase::Results => {
                ui.label(
                    egui::RichText::new(format!("{} items", state.entry_count))
                        .size(12.0)
                        .color(color_normal),
                );
                if let Some(duration) = state.scan_duration {
                    ui.separator();
                    ui.label(
                        egui::RichText::new(format!("{:.2}s", duration.as_secs_f64()))
                            .size(12.0)
                            .color(color_weak),
                    );
                }
            }
        }

        if let Some(status) = &state.status {
            ui.separator();
            ui.label(
                egui::RichText::new(&status.text)
                    .size(12.0)
                    .color(theme.status_color(status.level)),
            )
            .on_hover_text(status.at.format("%H:%M:%S").to_string());
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if state.monitor_active {
                let text = match state.last_rescan {
                    Some(at) => format!("Watching · regrouped {}", at.format("%H:%M:%S")),
                    None => "Watching".to_owned(),
                };
                ui.label(egui::RichText::new(text).size(11.0).color(theme.success));
                if state.rescan_in_flight() {
                    ui.spinner();
                }
            }
            if let Some(at) = state.last_scan {
                ui.label(
                    egui::RichText::new(format!("Scanned {}", at.format("%H:%M:%S")))
                        .size(11.0)
                        .color(color_weak),
                );
            }
        });
    });
}

/// Shorten a name to at most `max_chars` characters, replacing the middle
/// with "...".
fn truncate_name(name: &str, max_chars: usize) -> String {
    let count = name.chars().count();
    if count <= max_chars {
        return name.to_string();
    }
    let half = (max_chars.saturating_sub(3)) / 2;
    let head: String = name.chars().take(half).collect();
    let tail: String = name.chars().skip(count - half).collect();
    format!("{head}...{tail}")
}
