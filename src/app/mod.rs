// src/app/mod.rs — watchlist window: form on top, table in the middle, status at the bottom

use std::time::Duration;

use eframe::egui as eg;

pub mod controller;
pub mod form;
pub mod types;
pub mod ui;

pub use controller::Controller;
pub use form::MovieForm;
pub use types::{ControllerState, FetchTarget, RowAction, StatusKind, StatusLine, ViewFilter};

// ---- Tunables ----
const FETCH_POLL_MS: u64 = 100;

pub struct MovieLogApp {
    controller: Controller,
    catalog_path: String,
}

impl MovieLogApp {
    pub fn new(controller: Controller) -> Self {
        let catalog_path = controller.catalog().location();
        Self {
            controller,
            catalog_path,
        }
    }

    pub(crate) fn apply_row_action(&mut self, action: RowAction) {
        match action {
            RowAction::Edit(i) => {
                self.controller.begin_edit(i);
            }
            RowAction::Fetch(i) => {
                self.controller.request_row_fetch(i);
            }
            RowAction::Delete(i) => {
                self.controller.delete(i);
            }
            RowAction::ToggleWatched(i) => {
                self.controller.toggle_watched(i);
            }
        }
    }
}

// ========== App impl ==========
impl eframe::App for MovieLogApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        self.controller.poll_fetch();
        if self.controller.is_busy() {
            // keep polling the lookup worker without user input
            ctx.request_repaint_after(Duration::from_millis(FETCH_POLL_MS));
        }

        eg::TopBottomPanel::top("form_panel").show(ctx, |ui| {
            ui.add_space(6.0);
            self.ui_render_form(ui);
            ui.add_space(4.0);
            ui.separator();
            self.ui_render_filter_bar(ui);
            ui.add_space(4.0);
        });

        eg::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            self.ui_render_status(ui);
        });

        eg::CentralPanel::default().show(ctx, |ui| {
            let actions = self.ui_render_table(ui);
            for action in actions {
                self.apply_row_action(action);
            }
        });
    }
}
