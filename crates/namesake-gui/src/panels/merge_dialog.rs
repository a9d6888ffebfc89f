/// Merge dialog: choose the canonical name, relocation mode and shortcut,
/// then confirm.
///
/// The name is either one of the group's members or free text. The target
/// folder is `<name>_merged` (numbered at merge time if that already exists).
use crate::state::{AppState, Command};
use crate::theme::NamesakeTheme;
use namesake_core::consolidate::naming;
use namesake_core::consolidate::RelocateMode;

/// Draw the merge dialog if it is open.
pub fn merge_dialog(ctx: &egui::Context, state: &AppState) -> Vec<Command> {
    let mut commands = Vec::new();
    let Some(dialog) = &state.merge_dialog else {
        return commands;
    };
    let theme = NamesakeTheme::for_mode(state.dark_mode);
    let eligible = state.eligible_members(&dialog.group);

    let mut open = true;
    egui::Window::new("Merge group")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([380.0, 0.0])
        .show(ctx, |ui| {
            ui.label(format!("{} items will be placed in:", eligible.len()));
            ui.add_space(4.0);

            let base = naming::merged_base(&dialog.name, &eligible);
            let preview = match &base {
                Ok(base) => egui::RichText::new(base).strong().color(theme.accent),
                Err(err) => egui::RichText::new(err.to_string()).color(theme.error),
            };
            ui.label(preview);
            ui.add_space(8.0);

            ui.label("Name");
            let mut name = dialog.name.clone();
            if ui.text_edit_singleline(&mut name).changed() {
                commands.push(Command::SetMergeName(name));
            }
            ui.horizontal_wrapped(|ui| {
                for member in &eligible {
                    if ui
                        .selectable_label(dialog.name == member.name.as_str(), member.name.as_str())
                        .clicked()
                    {
                        commands.push(Command::SetMergeName(member.name.to_string()));
                    }
                }
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label("Mode");
                for mode in [RelocateMode::Move, RelocateMode::Copy] {
                    if ui
                        .radio(dialog.mode == mode, mode.label())
                        .clicked()
                        && dialog.mode != mode
                    {
                        commands.push(Command::SetMergeMode(mode));
                    }
                }
            });

            let mut shortcut = dialog.create_shortcut;
            if ui
                .checkbox(&mut shortcut, "Create a desktop shortcut to the merged folder")
                .changed()
            {
                commands.push(Command::SetMergeShortcut(shortcut));
            }

            ui.add_space(12.0);
            ui.separator();
            ui.horizontal(|ui| {
                let can_confirm = base.is_ok()
                    && eligible.len() >= namesake_core::model::Group::MIN_MEMBERS;
                if ui
                    .add_enabled(can_confirm, egui::Button::new("Merge"))
                    .clicked()
                {
                    commands.push(Command::ConfirmMerge);
                }
                if ui.button("Cancel").clicked() {
                    commands.push(Command::CancelMerge);
                }
            });
        });

    if !open {
        commands.push(Command::CancelMerge);
    }
    commands
}
