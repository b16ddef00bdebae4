//! Left panel UI: crag list, edit history and image settings.

use crag_workbench::state::AppState;
use eframe::egui::{self, RichText, ScrollArea};
use egui_phosphor::regular as icons;

pub fn render_left_panel(ctx: &egui::Context, state: &mut AppState) {
    egui::SidePanel::left("left_panel")
        .resizable(true)
        .default_width(220.0)
        .min_width(180.0)
        .max_width(360.0)
        .show(ctx, |ui| {
            ui.heading(format!("{} Crags", icons::MOUNTAINS));
            ui.separator();

            let mut clicked = None;
            for crag in &state.catalog.crags {
                let selected = state.selected_crag.as_deref() == Some(crag.id.as_str());
                let text = format!(
                    "{}  ({} faces, {} routes)",
                    crag.name,
                    crag.faces.len(),
                    crag.routes.len()
                );
                if ui.selectable_label(selected, text).clicked() {
                    clicked = Some(crag.id.clone());
                }
            }
            if let Some(id) = clicked {
                state.selected_crag = Some(id);
            }

            if state.editor_mode {
                ui.add_space(10.0);
                ui.separator();
                ui.label(RichText::new("Edit history").strong());

                if state.edit_log.is_empty() {
                    ui.label(RichText::new("No edits yet").small().weak());
                }

                ScrollArea::vertical()
                    .id_salt("edit_log")
                    .max_height(240.0)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for entry in &state.edit_log {
                            ui.label(RichText::new(entry).small().monospace());
                        }
                    });

                ui.add_space(10.0);
                render_settings(ui, state);
            }
        });
}

fn render_settings(ui: &mut egui::Ui, state: &mut AppState) {
    egui::CollapsingHeader::new(RichText::new(format!("{} Image settings", icons::GEAR)).strong())
        .id_salt("image_settings")
        .show(ui, |ui| {
            let draft = &mut state.settings_draft;
            egui::Grid::new("image_settings_grid")
                .num_columns(2)
                .show(ui, |ui| {
                    ui.label("Host");
                    ui.text_edit_singleline(&mut draft.image_base_url);
                    ui.end_row();

                    ui.label("Release");
                    ui.text_edit_singleline(&mut draft.release);
                    ui.end_row();

                    ui.label("Extension");
                    ui.text_edit_singleline(&mut draft.extension);
                    ui.end_row();
                });
            ui.checkbox(&mut draft.prefetch_on_open, "Prefetch photos when a crag opens");

            let dirty = state.settings_draft != state.settings;
            ui.horizontal(|ui| {
                if ui.add_enabled(dirty, egui::Button::new("Save")).clicked() {
                    if let Err(e) = state.apply_settings_draft() {
                        log::warn!("Rejected image settings: {}", e);
                        state.status_message = e.to_string();
                    }
                }
                if ui.add_enabled(dirty, egui::Button::new("Revert")).clicked() {
                    state.settings_draft = state.settings.clone();
                }
            });
        });
}
