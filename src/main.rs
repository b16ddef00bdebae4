#![warn(clippy::all)]

//! Crag Workbench - browse crags, routes and face photos.
//!
//! Visitors browse crags and the rock-face photos their routes are drawn
//! on. Editors can replace photos; every open view picks up the new photo
//! without a reload, driven by the face image cache.

mod ui;

use crag_workbench::faces::{FaceImageCache, FaceKey, Subscription};
use crag_workbench::state::{AppState, ImageCacheSettings};
use eframe::egui;
use std::cell::RefCell;
use std::rc::Rc;
use ui::EditorAction;

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Crag Workbench",
        native_options,
        Box::new(|cc| Ok(Box::new(CragWorkbenchApp::new(cc)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");

        let canvas = document
            .get_element_by_id("app_canvas")
            .expect("Failed to find app_canvas")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("app_canvas was not a HtmlCanvasElement");

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(CragWorkbenchApp::new(cc)))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    panic!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Main application state and logic.
pub struct CragWorkbenchApp {
    /// Application state containing catalog, selection and settings
    state: AppState,

    /// Face image cache shared with every view of this client
    cache: Rc<FaceImageCache>,

    /// Listeners registered for the crag on screen
    subscriptions: Vec<Subscription>,

    /// Crag the current subscriptions belong to
    subscribed_crag: Option<String>,

    /// Keys reported by listeners since the last frame
    refreshed: Rc<RefCell<Vec<FaceKey>>>,

    /// Context used by listeners to request a repaint
    ctx: egui::Context,
}

impl CragWorkbenchApp {
    /// Creates a new CragWorkbenchApp instance.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let mut settings = ImageCacheSettings::load();
        let cache = match FaceImageCache::from_settings(&settings) {
            Ok(cache) => cache,
            Err(e) => {
                log::warn!("Invalid image settings ({}), falling back to defaults", e);
                settings = ImageCacheSettings::default();
                FaceImageCache::from_settings(&settings)
                    .expect("default image settings are valid")
            }
        };

        let mut state = AppState::new(settings);
        state.selected_crag = state.catalog.crags.first().map(|c| c.id.clone());

        Self {
            state,
            cache: Rc::new(cache),
            subscriptions: Vec::new(),
            subscribed_crag: None,
            refreshed: Rc::new(RefCell::new(Vec::new())),
            ctx: cc.egui_ctx.clone(),
        }
    }

    /// Re-register listeners when the crag on screen changes.
    ///
    /// Each photo on screen gets an exact listener; the crag prefix
    /// listener catches photos added elsewhere in the session.
    fn sync_subscriptions(&mut self) {
        if self.subscribed_crag == self.state.selected_crag {
            return;
        }

        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        self.subscribed_crag = self.state.selected_crag.clone();

        let Some(crag) = self.state.selected_crag() else {
            return;
        };

        for source in crag.image_sources() {
            let key = self.cache.face_key(&source);
            let refreshed = self.refreshed.clone();
            let ctx = self.ctx.clone();
            let listener_key = key.clone();
            self.subscriptions
                .push(self.cache.subscribe(key, move || {
                    refreshed.borrow_mut().push(listener_key.clone());
                    ctx.request_repaint();
                }));
        }

        let ctx = self.ctx.clone();
        self.subscriptions.push(
            self.cache
                .subscribe_by_prefix(FaceKey::crag_prefix(&crag.id), move || {
                    ctx.request_repaint()
                }),
        );

        log::info!(
            "Watching {} photo(s) of crag {}",
            self.subscriptions.len() - 1,
            crag.id
        );

        if self.state.settings.prefetch_on_open {
            let urls: Vec<String> = crag
                .image_sources()
                .iter()
                .map(|source| self.cache.image_url(source))
                .collect();
            self.cache.prefetch(&urls);
        }
    }

    /// Apply an editor request to the face image cache.
    fn apply_action(&mut self, action: EditorAction) {
        match action {
            EditorAction::ReplacePhoto(key) => {
                let notified = self.cache.invalidate(key.clone());
                self.state.log_edit(format!(
                    "Replaced photo {} ({} view(s) notified)",
                    key, notified
                ));
            }
            EditorAction::RefreshArea { crag_id, area } => {
                let prefix = FaceKey::area_prefix(&crag_id, &area);
                let count = self.cache.invalidate_by_prefix(&prefix);
                self.state
                    .log_edit(format!("Refreshed {} photo(s) under {}", count, prefix));
            }
            EditorAction::RefreshCrag(crag_id) => {
                let prefix = FaceKey::crag_prefix(&crag_id);
                let count = self.cache.invalidate_by_prefix(&prefix);
                self.state
                    .log_edit(format!("Refreshed {} photo(s) under {}", count, prefix));
            }
        }
    }
}

impl eframe::App for CragWorkbenchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_subscriptions();

        // Surface refresh notifications from listeners
        let refreshed: Vec<FaceKey> = self.refreshed.borrow_mut().drain(..).collect();
        if let Some(key) = refreshed.last() {
            self.state.note_refreshed(key);
        }

        ui::render_top_bar(ctx, &mut self.state, &self.cache);
        ui::render_left_panel(ctx, &mut self.state);
        let action = ui::render_face_panel(ctx, &self.state, &self.cache);

        if let Some(action) = action {
            self.apply_action(action);
        }
    }
}
