/// Central panel: members of the selected group with their exclusion toggles.
///
/// Excluded members are greyed out and stay where they are when the group is
/// merged.
use crate::state::{AppPhase, AppState, Command};
use crate::theme::NamesakeTheme;
use egui::Ui;
use namesake_core::model::{EntryKind, Group};

/// Draw the selected group's members.
pub fn members_panel(ui: &mut Ui, state: &AppState) -> Vec<Command> {
    let mut commands = Vec::new();
    let theme = NamesakeTheme::for_mode(state.dark_mode);

    let Some((index, group)) = state
        .selected_group
        .and_then(|i| state.groups.get(i).map(|g| (i, g)))
    else {
        ui.centered_and_justified(|ui| {
            ui.label(
                egui::RichText::new("Select a group on the left")
                    .size(14.0)
                    .color(theme.text_muted),
            );
        });
        return commands;
    };

    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(group.seed().name.as_str())
                .strong()
                .size(16.0)
                .color(theme.accent),
        );
        ui.label(
            egui::RichText::new(format!("{} similar items", group.len()))
                .size(12.0)
                .color(theme.text_muted),
        );
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, true])
        .max_height((ui.available_height() - 48.0).max(80.0))
        .show(ui, |ui| {
            for member in group.members() {
                let excluded = state.exclusions.is_excluded(&member.path);
                ui.horizontal(|ui| {
                    let mut included = !excluded;
                    if ui
                        .checkbox(&mut included, "")
                        .on_hover_text(if excluded {
                            "Include in the merge"
                        } else {
                            "Leave this item where it is"
                        })
                        .changed()
                    {
                        let path = member.path.clone();
                        commands.push(if included {
                            Command::Include(path)
                        } else {
                            Command::Exclude(path)
                        });
                    }

                    let (icon, icon_color) = match member.kind {
                        EntryKind::Folder => ("📁", theme.folder_icon),
                        EntryKind::File => ("📄", theme.file_icon),
                    };
                    let name_color = if excluded {
                        theme.text_muted
                    } else {
                        theme.text_primary
                    };
                    ui.label(egui::RichText::new(icon).color(icon_color));
                    let mut name = egui::RichText::new(member.name.as_str()).color(name_color);
                    if excluded {
                        name = name.strikethrough();
                    }
                    ui.label(name);
                    ui.label(
                        egui::RichText::new(member.kind.label())
                            .size(11.0)
                            .color(theme.text_muted),
                    );
                });
            }
        });

    ui.add_space(8.0);
    ui.separator();

    let eligible = state.eligible_members(group).len();
    let idle = state.phase == AppPhase::Results;
    ui.horizontal(|ui| {
        let can_merge = idle && eligible >= Group::MIN_MEMBERS;
        if ui
            .add_enabled(
                can_merge,
                egui::Button::new(format!("⤵ Merge {eligible} items…"))
                    .min_size(egui::vec2(120.0, 28.0)),
            )
            .on_disabled_hover_text("At least two included items are needed")
            .clicked()
        {
            commands.push(Command::OpenMerge(index));
        }

        let excluded_here = group.len() - eligible;
        if excluded_here > 0 {
            ui.label(
                egui::RichText::new(format!("{excluded_here} excluded"))
                    .size(12.0)
                    .color(theme.warning),
            );
        }
    });

    commands
}
