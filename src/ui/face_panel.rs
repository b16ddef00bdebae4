//! Central panel UI: faces and route photos of the selected crag.

use super::EditorAction;
use crag_workbench::faces::{FaceImageCache, ImageSource};
use crag_workbench::state::{AppState, Crag, Face};
use eframe::egui::{self, Color32, RichText, ScrollArea};
use egui_phosphor::regular as icons;

pub fn render_face_panel(
    ctx: &egui::Context,
    state: &AppState,
    cache: &FaceImageCache,
) -> Option<EditorAction> {
    let mut action = None;

    egui::CentralPanel::default().show(ctx, |ui| {
        let Some(crag) = state.selected_crag() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Select a crag").color(Color32::GRAY));
            });
            return;
        };

        ui.horizontal(|ui| {
            ui.heading(crag.name.as_str());
            if state.editor_mode
                && ui
                    .button(format!("{} Refresh crag", icons::ARROWS_CLOCKWISE))
                    .on_hover_text("Invalidate every known photo of this crag")
                    .clicked()
            {
                action = Some(EditorAction::RefreshCrag(crag.id.clone()));
            }
        });
        ui.separator();

        ScrollArea::vertical().show(ui, |ui| {
            for area in crag.areas() {
                egui::CollapsingHeader::new(RichText::new(area).strong())
                    .id_salt(("area", crag.id.as_str(), area))
                    .default_open(true)
                    .show(ui, |ui| {
                        if state.editor_mode
                            && ui
                                .small_button(format!("{} Refresh area", icons::ARROWS_CLOCKWISE))
                                .clicked()
                        {
                            action = Some(EditorAction::RefreshArea {
                                crag_id: crag.id.clone(),
                                area: area.to_string(),
                            });
                        }

                        for face in crag.faces.iter().filter(|f| f.area == area) {
                            if let Some(a) = render_face(ui, state, cache, crag, face) {
                                action = Some(a);
                            }
                        }
                    });
            }

            let legacy: Vec<_> = crag.routes.iter().filter(|r| r.is_legacy_image()).collect();
            if !legacy.is_empty() {
                egui::CollapsingHeader::new(RichText::new("Route photos").strong())
                    .id_salt(("legacy", crag.id.as_str()))
                    .default_open(true)
                    .show(ui, |ui| {
                        for route in legacy {
                            let title = format!("{} {}", route.name, route.grade);
                            if let Some(a) =
                                render_photo(ui, state, cache, &title, &route.image_source())
                            {
                                action = Some(a);
                            }
                        }
                    });
            }
        });
    });

    action
}

fn render_face(
    ui: &mut egui::Ui,
    state: &AppState,
    cache: &FaceImageCache,
    crag: &Crag,
    face: &Face,
) -> Option<EditorAction> {
    let action = render_photo(ui, state, cache, &face.label, &face.image_source());

    let routes: Vec<String> = crag
        .routes_on(face)
        .map(|r| {
            if r.beta_videos > 0 {
                format!("{} {} ({} beta)", r.name, r.grade, r.beta_videos)
            } else {
                format!("{} {}", r.name, r.grade)
            }
        })
        .collect();
    if !routes.is_empty() {
        ui.label(RichText::new(routes.join(", ")).small());
    }
    ui.add_space(6.0);

    action
}

/// One photo row: title, key, version and the URL currently served.
fn render_photo(
    ui: &mut egui::Ui,
    state: &AppState,
    cache: &FaceImageCache,
    title: &str,
    source: &ImageSource<'_>,
) -> Option<EditorAction> {
    let key = cache.face_key(source);
    let url = cache.image_url(source);
    let mut action = None;

    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("{} {}", icons::IMAGE, title)).strong());
        ui.label(RichText::new(key.as_str()).small().monospace().color(Color32::GRAY));

        match cache.version(key.as_str()) {
            Some(version) => ui.label(
                RichText::new(format!("updated {}", version.format_time()))
                    .small()
                    .color(Color32::from_rgb(100, 200, 100)),
            ),
            None => ui.label(RichText::new("baseline").small().weak()),
        };

        if state.editor_mode && ui.small_button("Replace photo").clicked() {
            action = Some(EditorAction::ReplacePhoto(key.clone()));
        }
    });
    ui.hyperlink_to(RichText::new(&url).small().monospace(), &url);

    action
}
