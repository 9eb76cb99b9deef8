use std::collections::BTreeSet;
use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export::{EXPORT_FILE_NAME, EXPORT_MIME};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// What the user did with a multi-select this frame.
enum SelectionChange {
    Toggle(String),
    Clear,
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Listings");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => Arc::clone(ds),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            match multi_select(
                ui,
                "Neighborhood",
                &dataset.neighbourhoods,
                &state.criteria.neighbourhoods,
            ) {
                Some(SelectionChange::Toggle(v)) => state.toggle_neighbourhood(&v),
                Some(SelectionChange::Clear) => state.clear_neighbourhoods(),
                None => {}
            }

            match multi_select(
                ui,
                "Room Type",
                &dataset.room_types,
                &state.criteria.room_types,
            ) {
                Some(SelectionChange::Toggle(v)) => state.toggle_room_type(&v),
                Some(SelectionChange::Clear) => state.clear_room_types(),
                None => {}
            }
            ui.separator();

            // ---- Price range ----
            ui.strong("Price Range ($)");
            let mut range = state.criteria.price;
            let min_changed = ui
                .add(egui::Slider::new(&mut range.min, 0..=state.price_bound).text("min"))
                .changed();
            let max_changed = ui
                .add(egui::Slider::new(&mut range.max, 0..=state.price_bound).text("max"))
                .changed();
            // The two handles never cross.
            if min_changed && range.min > range.max {
                range.max = range.min;
            } else if max_changed && range.max < range.min {
                range.min = range.max;
            }
            state.set_price_range(range);

            let mut superhost_only = state.criteria.superhost_only;
            if ui.checkbox(&mut superhost_only, "Only Superhosts").changed() {
                state.set_superhost_only(superhost_only);
            }
            ui.separator();

            // ---- Export ----
            ui.strong("Export Data");
            if ui.button("Download CSV").clicked() {
                save_export_dialog(state);
            }
        });
}

/// Collapsible checkbox list. An empty selection means "all".
fn multi_select(
    ui: &mut Ui,
    label: &str,
    options: &BTreeSet<String>,
    selected: &BTreeSet<String>,
) -> Option<SelectionChange> {
    let summary = if selected.is_empty() {
        "all".to_string()
    } else {
        format!("{}/{}", selected.len(), options.len())
    };
    let mut change = None;

    egui::CollapsingHeader::new(RichText::new(format!("{label}  ({summary})")).strong())
        .id_salt(label)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                change = Some(SelectionChange::Clear);
            }
            for value in options {
                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    change = Some(SelectionChange::Toggle(value.clone()));
                }
            }
        });

    change
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export filtered CSV…").clicked() {
                save_export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(out)) = (&state.dataset, &state.output) {
            ui.label(format!(
                "{} listings loaded, {} visible",
                ds.len(),
                out.visible_indices.len()
            ));
        }
        ui.label(
            RichText::new(state.cache.path().display().to_string()).color(Color32::GRAY),
        );

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(path);
        state.status_message = None;
    }
}

pub fn save_export_dialog(state: &mut AppState) {
    if state.output.is_none() {
        return;
    }
    let target = rfd::FileDialog::new()
        .set_title("Export filtered listings")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter(format!("CSV ({EXPORT_MIME})"), &["csv"])
        .save_file();

    if let Some(path) = target {
        match state.export_to(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
