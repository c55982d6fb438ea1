// src/app/ui/mod.rs
pub mod form;
pub mod table;

use eframe::egui as eg;

use crate::app::StatusKind;

impl crate::app::MovieLogApp {
    pub(crate) fn ui_render_status(&mut self, ui: &mut eg::Ui) {
        ui.horizontal(|ui| {
            if self.controller.is_busy() {
                ui.add(eg::Spinner::new().size(14.0));
            }
            match self.controller.status() {
                Some(st) if st.kind == StatusKind::Error => {
                    ui.colored_label(eg::Color32::from_rgb(230, 96, 96), st.text.as_str());
                }
                Some(st) => {
                    ui.label(&st.text);
                }
                None => {
                    ui.label(eg::RichText::new("Ready").weak());
                }
            }
            if self.controller.status().is_some()
                && !self.controller.is_busy()
                && ui.small_button("✕").on_hover_text("Dismiss").clicked()
            {
                self.controller.clear_status();
            }
            ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                let total = self.controller.records().len();
                let unwatched = self.controller.catalog().unwatched().count();
                ui.monospace(format!("{total} movies • {unwatched} to watch"));
                ui.separator();
                ui.label(eg::RichText::new(&self.catalog_path).weak());
            });
        });
    }
}
