// src/app/ui/table.rs
use eframe::egui as eg;
use egui_extras::{Column, TableBuilder};

use crate::app::RowAction;

pub const ROW_HEIGHT: f32 = 24.0;
const HEADER_HEIGHT: f32 = 22.0;

fn rating_cell(rating: Option<f64>) -> String {
    rating.map(|r| format!("{r:.1}")).unwrap_or_default()
}

impl crate::app::MovieLogApp {
    /// Draw the catalog table. Clicks are returned, not applied, so the
    /// records can stay borrowed while painting.
    pub(crate) fn ui_render_table(&mut self, ui: &mut eg::Ui) -> Vec<RowAction> {
        let mut actions = Vec::new();
        let rows = self.controller.visible_rows();
        let busy = self.controller.is_busy();
        let editing = self.controller.editing();
        let records = self.controller.records();

        if records.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.label("No movies yet. Add one above.");
            });
            return actions;
        }
        if rows.is_empty() {
            ui.label(eg::RichText::new("Nothing matches the current filter.").weak());
            return actions;
        }

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(eg::Layout::left_to_right(eg::Align::Center))
            .column(Column::remainder().at_least(160.0))
            .column(Column::auto().at_least(48.0))
            .column(Column::auto().at_least(100.0))
            .column(Column::auto().at_least(56.0))
            .column(Column::auto().at_least(64.0))
            .column(Column::auto().at_least(150.0))
            .header(HEADER_HEIGHT, |mut header| {
                for name in ["Title", "Year", "Genre", "Rating", "Watched", ""] {
                    header.col(|ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|mut body| {
                for &idx in &rows {
                    let Some(rec) = records.get(idx) else {
                        continue;
                    };
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui| {
                            let mut text = eg::RichText::new(&rec.title);
                            if editing == Some(idx) {
                                text = text.strong();
                            }
                            ui.label(text);
                        });
                        row.col(|ui| {
                            ui.label(rec.year.map(|y| y.to_string()).unwrap_or_default());
                        });
                        row.col(|ui| {
                            ui.label(rec.genre.as_deref().unwrap_or(""));
                        });
                        row.col(|ui| {
                            ui.label(rating_cell(rec.rating));
                        });
                        row.col(|ui| {
                            let mut watched = rec.watched;
                            if ui.checkbox(&mut watched, "").changed() {
                                actions.push(RowAction::ToggleWatched(idx));
                            }
                        });
                        row.col(|ui| {
                            if ui.add_enabled(!busy, eg::Button::new("Edit").small()).clicked() {
                                actions.push(RowAction::Edit(idx));
                            }
                            if ui
                                .add_enabled(!busy, eg::Button::new("Fetch").small())
                                .on_hover_text("Update year, genre and rating from OMDb")
                                .clicked()
                            {
                                actions.push(RowAction::Fetch(idx));
                            }
                            if ui.small_button("Delete").clicked() {
                                actions.push(RowAction::Delete(idx));
                            }
                        });
                    });
                }
            });

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::rating_cell;

    #[test]
    fn rating_shows_one_decimal_or_blank() {
        assert_eq!(rating_cell(Some(8.0)), "8.0");
        assert_eq!(rating_cell(Some(8.76)), "8.8");
        assert_eq!(rating_cell(None), "");
    }
}
