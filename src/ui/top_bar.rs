//! Top bar UI: app title, editor toggle, status, and cache statistics.

use crag_workbench::faces::FaceImageCache;
use crag_workbench::state::AppState;
use eframe::egui::{self, Color32, RichText};
use egui_phosphor::regular as icons;

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState, cache: &FaceImageCache) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.label(
                    RichText::new("Crag Workbench")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                ui.toggle_value(
                    &mut state.editor_mode,
                    format!("{} Editor", icons::PENCIL_SIMPLE),
                );

                ui.separator();

                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(Color32::GRAY),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let stats = cache.stats();
                    let (exact, prefix) = cache.subscriber_counts();
                    ui.label(
                        RichText::new(format!(
                            "versioned {} | invalidated {} | notified {} | prefetched {} | listeners {}+{} | fan-out {}",
                            cache.versioned_keys(),
                            stats.invalidated_keys,
                            stats.notifications,
                            stats.prefetch_requests,
                            exact,
                            prefix,
                            stats.format_last_fanout(),
                        ))
                        .size(11.0)
                        .monospace()
                        .color(Color32::GRAY),
                    );
                });
            });
        });
}
