/// Left panel: one row per similarity group.
use crate::state::{AppPhase, AppState, Command};
use crate::theme::NamesakeTheme;
use egui::Ui;

/// Draw the list of groups.
pub fn group_list(ui: &mut Ui, state: &AppState) -> Vec<Command> {
    let mut commands = Vec::new();
    let theme = NamesakeTheme::for_mode(state.dark_mode);

    ui.label(egui::RichText::new("Groups").strong().size(14.0));
    ui.add_space(4.0);

    if state.groups.is_empty() {
        let hint = match state.phase {
            AppPhase::Idle => "Open a directory to find similar names.",
            AppPhase::Scanning => "Scanning...",
            _ => "No similar items found.",
        };
        ui.label(egui::RichText::new(hint).size(12.0).color(theme.text_muted));
        return commands;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (index, group) in state.groups.iter().enumerate() {
                let eligible = state.eligible_members(group).len();
                let selected = state.selected_group == Some(index);
                let label = format!("{}  ({eligible}/{})", group.seed().name, group.len());
                let text = if eligible < namesake_core::model::Group::MIN_MEMBERS {
                    egui::RichText::new(label).color(theme.text_muted)
                } else {
                    egui::RichText::new(label)
                };
                let row = ui.selectable_label(selected, text).on_hover_text(
                    group.names().collect::<Vec<_>>().join("\n"),
                );
                if row.clicked() {
                    commands.push(Command::SelectGroup(index));
                }
                if row.double_clicked() {
                    commands.push(Command::OpenMerge(index));
                }
            }
        });

    commands
}
