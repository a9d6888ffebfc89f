/// Main `eframe::App` implementation for Namesake.
///
/// This is the top-level UI layout that composes all panels and widgets.
/// Every panel returns [`Command`]s which are applied to the state after the
/// frame has been laid out.
use crate::panels;
use crate::state::{AppPhase, AppState, Command};
use crate::theme::NamesakeTheme;
use crate::widgets;
use namesake_core::config::Config;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Pre-built application state.
///
/// Construct this **before** calling `eframe::run_native` so the initial
/// scan is already running when the first frame is drawn.
pub struct NamesakeState {
    pub(crate) inner: AppState,
}

impl NamesakeState {
    /// Build state from `config` and start scanning `directory` if given.
    pub fn build(config: Config, directory: Option<PathBuf>) -> Self {
        let mut state = AppState::new(config);
        if let Some(dir) = directory {
            state.apply(Command::SetDirectory(dir));
        }
        Self { inner: state }
    }
}

/// The Namesake application.
pub struct NamesakeApp {
    state: AppState,
    /// Theme last applied to the context, to avoid re-applying every frame.
    applied_dark_mode: Option<bool>,
}

impl NamesakeApp {
    /// Create a new application instance from pre-built state.
    pub fn with_state(cc: &eframe::CreationContext<'_>, state: NamesakeState) -> Self {
        NamesakeTheme::for_mode(state.inner.dark_mode).apply(&cc.egui_ctx);
        Self {
            applied_dark_mode: Some(state.inner.dark_mode),
            state: state.inner,
        }
    }
}

impl eframe::App for NamesakeApp {
    /// Override the GPU clear colour to match the active theme background,
    /// preventing a colour mismatch flash between frames.
    fn clear_color(&self, visuals: &egui::Visuals) -> [f32; 4] {
        let [r, g, b, a] = visuals.panel_fill.to_array();
        [
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ]
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Apply theme ───────────────────────────────────────────────────
        if self.applied_dark_mode != Some(self.state.dark_mode) {
            NamesakeTheme::for_mode(self.state.dark_mode).apply(ctx);
            self.applied_dark_mode = Some(self.state.dark_mode);
        }

        // ── Process background messages ───────────────────────────────────
        self.state.update(Instant::now());

        // Keep polling while workers run or the watcher may deliver events.
        if self.state.is_busy() || self.state.monitor_active {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let mut commands: Vec<Command> = Vec::new();

        // ── Top toolbar ───────────────────────────────────────────────────
        egui::TopBottomPanel::top("toolbar")
            .min_height(36.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                commands.extend(widgets::toolbar::toolbar(ui, &mut self.state));
                ui.add_space(4.0);
            });

        // ── Bottom status bar ─────────────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .min_height(24.0)
            .show(ctx, |ui| {
                ui.add_space(2.0);
                widgets::status_bar::status_bar(ui, &self.state);
                ui.add_space(2.0);
            });

        // ── Merge errors (shown until dismissed) ──────────────────────────
        if !self.state.merge_errors.is_empty() {
            egui::TopBottomPanel::bottom("merge_errors").show(ctx, |ui| {
                let theme = NamesakeTheme::for_mode(self.state.dark_mode);
                ui.add_space(4.0);
                for error in &self.state.merge_errors {
                    ui.label(egui::RichText::new(error).size(12.0).color(theme.error));
                }
                if self.state.merge_errors_hidden > 0 {
                    ui.label(
                        egui::RichText::new(format!(
                            "…and {} more (see log)",
                            self.state.merge_errors_hidden
                        ))
                        .size(12.0)
                        .color(theme.text_muted),
                    );
                }
                if ui.small_button("Dismiss").clicked() {
                    commands.push(Command::DismissMergeErrors);
                }
                ui.add_space(4.0);
            });
        }

        // ── Left groups panel ─────────────────────────────────────────────
        egui::SidePanel::left("groups_panel")
            .default_width(260.0)
            .min_width(180.0)
            .max_width(420.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                commands.extend(panels::group_list::group_list(ui, &self.state));
            });

        // ── Central panel (members of the selected group) ─────────────────
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.phase == AppPhase::Idle && self.state.directory.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new("Type a directory above and press Enter")
                            .size(16.0)
                            .color(ui.visuals().weak_text_color()),
                    );
                });
                return;
            }
            commands.extend(panels::members_panel::members_panel(ui, &self.state));
        });

        // ── Merge dialog ──────────────────────────────────────────────────
        commands.extend(panels::merge_dialog::merge_dialog(ctx, &self.state));

        for command in commands {
            self.state.apply(command);
        }
    }
}
