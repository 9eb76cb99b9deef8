use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::ListingTable;

const HEADERS: [&str; 9] = [
    "Name",
    "Neighborhood",
    "Room type",
    "Price",
    "Rating",
    "Superhost",
    "Days available",
    "Cancellation",
    "Reviews/month",
];

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

/// Scrollable preview of the visible listings.
pub fn listings_table(ui: &mut Ui, dataset: &ListingTable, visible: &[usize]) {
    ui.push_id("listings_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::initial(220.0).clip(true))
            .columns(Column::auto(), HEADERS.len() - 1)
            .max_scroll_height(320.0)
            .header(20.0, |mut header| {
                for title in HEADERS {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, visible.len(), |mut row| {
                    let l = &dataset.listings[visible[row.index()]];
                    let cells = [
                        l.name.clone(),
                        l.neighbourhood.clone().unwrap_or_default(),
                        l.room_type.clone().unwrap_or_default(),
                        format!("${:.2}", l.price),
                        optional(l.review_score_avg),
                        if l.host_is_superhost { "yes" } else { "no" }.to_string(),
                        l.availability_365.to_string(),
                        l.cancellation_policy.clone().unwrap_or_default(),
                        optional(l.reviews_per_month),
                    ];
                    for cell in cells {
                        row.col(|ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}
