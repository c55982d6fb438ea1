// src/app/ui/form.rs
use eframe::egui as eg;

impl crate::app::MovieLogApp {
    // ---------- ADD / EDIT FORM ----------
    pub(crate) fn ui_render_form(&mut self, ui: &mut eg::Ui) {
        let busy = self.controller.is_busy();
        let editing = self.controller.editing();

        ui.horizontal(|ui| {
            ui.heading(match editing {
                Some(_) => "Edit movie",
                None => "Add movie",
            });
        });

        let mut submit = false;
        let mut fetch = false;

        eg::Grid::new("movie_form")
            .num_columns(3)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                let form = &mut self.controller.form;

                ui.label("Title");
                let resp = ui.add(
                    eg::TextEdit::singleline(&mut form.title)
                        .hint_text("Title…")
                        .desired_width(260.0),
                );
                if resp.lost_focus() && ui.input(|i| i.key_pressed(eg::Key::Enter)) {
                    submit = true;
                }
                if ui
                    .add_enabled(!busy, eg::Button::new("Fetch Details"))
                    .on_hover_text("Fill year, genre and rating from OMDb")
                    .on_disabled_hover_text("A lookup is already running")
                    .clicked()
                {
                    fetch = true;
                }
                ui.end_row();

                ui.label("Year");
                ui.add(eg::TextEdit::singleline(&mut form.year).desired_width(60.0));
                ui.label("");
                ui.end_row();

                ui.label("Genre");
                ui.add(eg::TextEdit::singleline(&mut form.genre).desired_width(200.0));
                ui.label("");
                ui.end_row();

                ui.label("Rating (0-10)");
                ui.add(eg::TextEdit::singleline(&mut form.rating).desired_width(48.0));
                ui.label("");
                ui.end_row();

                ui.label("");
                ui.checkbox(&mut form.watched, "Watched");
                ui.label("");
                ui.end_row();
            });

        ui.horizontal(|ui| {
            let label = if editing.is_some() { "Save Changes" } else { "Add Movie" };
            if ui.button(label).clicked() {
                submit = true;
            }
            if editing.is_some() {
                if ui.add_enabled(!busy, eg::Button::new("Cancel")).clicked() {
                    self.controller.cancel_edit();
                }
            } else if ui
                .add_enabled(!busy, eg::Button::new("Clear").small())
                .on_hover_text("Empty the form")
                .clicked()
            {
                self.controller.form.clear();
            }
            if ui
                .button("Refresh List")
                .on_hover_text("Reload the catalog from disk")
                .clicked()
            {
                self.controller.reload();
            }
        });

        if fetch {
            self.controller.request_form_fetch();
        }
        if submit {
            self.controller.submit_form();
        }
    }

    // ---------- FILTER BAR ----------
    pub(crate) fn ui_render_filter_bar(&mut self, ui: &mut eg::Ui) {
        ui.horizontal(|ui| {
            let filter = &mut self.controller.filter;
            ui.add(
                eg::TextEdit::singleline(&mut filter.search)
                    .hint_text("Search titles…")
                    .desired_width(180.0),
            );
            if !filter.search.is_empty() && ui.small_button("✕").clicked() {
                filter.search.clear();
            }
            ui.separator();
            ui.checkbox(&mut filter.unwatched_only, "Unwatched only");
        });
    }
}
