use std::collections::BTreeMap;
use std::f64::consts::TAU;

use eframe::egui::{self, Color32, RichText, ScrollArea, Stroke, Ui};
use egui_plot::{
    BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
};

use crate::color::{CRIMSON, ColorMap, SKY_BLUE, TEAL, generate_palette};
use crate::dashboard::{Chart, Kpis, NO_DATA, PieSlice, PolicyDistribution};
use crate::data::aggregate::ScatterPoint;
use crate::state::AppState;
use crate::ui::table;

const CHART_HEIGHT: f32 = 280.0;
/// Inner radius of the room type donut, as a fraction of the outer one.
const DONUT_HOLE: f64 = 0.3;
/// How far each donut slice is pulled out of the centre.
const SLICE_PULL: f64 = 0.05;
/// Half the width of the widest violin, in category units.
const VIOLIN_HALF_WIDTH: f64 = 0.4;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render KPIs, the six charts and the listings preview.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if let Some(err) = &state.load_error {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(RichText::new(err).color(Color32::RED));
        });
        return;
    }
    let (Some(dataset), Some(out)) = (&state.dataset, &state.output) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a listings file  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Summary Metrics");
            kpi_row(ui, &out.kpis);
            if let Some(warning) = out.warning {
                ui.label(RichText::new(warning.to_string()).color(Color32::YELLOW));
            }
            ui.separator();

            let charts = &out.charts;
            ui.columns(2, |cols| {
                category_line(
                    &mut cols[0],
                    "price_by_neighbourhood",
                    &charts.price_by_neighbourhood,
                    CRIMSON,
                    false,
                    |x, y| format!("{x}\n${y:.2}"),
                );
                room_type_pie(&mut cols[1], &charts.room_types, &state.room_type_colors);
            });
            ui.columns(2, |cols| {
                price_vs_rating(&mut cols[0], &charts.price_vs_rating, &state.room_type_colors);
                category_line(
                    &mut cols[1],
                    "availability_by_neighbourhood",
                    &charts.availability_by_neighbourhood,
                    SKY_BLUE,
                    true,
                    |x, y| format!("{x}: {y:.0} days"),
                );
            });

            // Room types without any review rate have no point to draw.
            let source = &charts.reviews_by_room_type;
            let reviews = Chart {
                title: source.title,
                x_label: source.x_label,
                y_label: source.y_label,
                data: source
                    .data
                    .iter()
                    .filter_map(|(k, v)| Some((k.clone(), (*v)?)))
                    .collect(),
            };
            ui.columns(2, |cols| {
                price_by_policy(&mut cols[0], &charts.price_by_policy);
                category_line(
                    &mut cols[1],
                    "reviews_by_room_type",
                    &reviews,
                    TEAL,
                    false,
                    |x, y| format!("{x}: {y:.2} reviews/month"),
                );
            });

            ui.separator();
            ui.heading("Filtered Listings");
            table::listings_table(ui, dataset, &out.visible_indices);
        });
}

fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    ui.columns(3, |cols| {
        for (col, (title, value)) in cols.iter_mut().zip([
            ("Listings", &kpis.listings),
            ("Avg. Price", &kpis.avg_price),
            ("Avg. Rating", &kpis.avg_rating),
        ]) {
            egui::Frame::group(col.style()).show(col, |ui: &mut Ui| {
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.label(title);
                    ui.heading(RichText::new(value.as_str()).strong());
                });
            });
        }
    });
}

fn chart_title<T>(ui: &mut Ui, chart: &Chart<T>) {
    ui.strong(chart.title);
}

fn no_data(ui: &mut Ui) {
    ui.allocate_ui(egui::vec2(ui.available_width(), CHART_HEIGHT), |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(RichText::new(NO_DATA).italics().color(Color32::GRAY));
        });
    });
}

/// Label of the category drawn at integer position `x`.
fn category_label(labels: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

/// Line (optionally filled) over categories placed at x = 0, 1, 2, …
fn category_line(
    ui: &mut Ui,
    id: &str,
    chart: &Chart<Vec<(String, f64)>>,
    color: Color32,
    fill: bool,
    hover: fn(&str, f64) -> String,
) {
    chart_title(ui, chart);
    if chart.data.is_empty() {
        no_data(ui);
        return;
    }

    let labels: Vec<String> = chart.data.iter().map(|(k, _)| k.clone()).collect();
    let hover_labels = labels.clone();
    let coords: Vec<[f64; 2]> = chart
        .data
        .iter()
        .enumerate()
        .map(|(i, (_, v))| [i as f64, *v])
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .label_formatter(move |_name, p| hover(&category_label(&hover_labels, p.x), p.y))
        .show(ui, |plot_ui| {
            let mut line = Line::new(PlotPoints::from(coords.clone()))
                .color(color)
                .width(2.0);
            if fill {
                line = line.fill(0.0);
            }
            plot_ui.line(line);
            plot_ui.points(Points::new(coords).color(color).radius(3.5));
        });
}

/// Donut of room type shares, slices clockwise from 12 o'clock.
fn room_type_pie(ui: &mut Ui, chart: &Chart<Vec<PieSlice>>, colors: &ColorMap) {
    chart_title(ui, chart);
    if chart.data.is_empty() {
        no_data(ui);
        return;
    }

    Plot::new("room_types")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for slice in &chart.data {
                let sweep = slice.share * TAU;
                let mid = start + sweep / 2.0;
                let offset = [SLICE_PULL * mid.sin(), SLICE_PULL * mid.cos()];
                let color = colors.color_for(&slice.label);

                // Concave wedges do not fill correctly, so draw convex pieces.
                let steps = ((sweep / TAU) * 120.0).ceil().max(1.0) as usize;
                for k in 0..steps {
                    let a0 = start + sweep * k as f64 / steps as f64;
                    let a1 = start + sweep * (k + 1) as f64 / steps as f64;
                    let at = |r: f64, a: f64| [offset[0] + r * a.sin(), offset[1] + r * a.cos()];
                    let quad = vec![at(DONUT_HOLE, a0), at(1.0, a0), at(1.0, a1), at(DONUT_HOLE, a1)];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(quad))
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, color))
                            .name(&slice.label),
                    );
                }

                let r = (1.0 + DONUT_HOLE) / 2.0;
                plot_ui.text(Text::new(
                    PlotPoint::new(offset[0] + r * mid.sin(), offset[1] + r * mid.cos()),
                    RichText::new(format!("{}\n{:.1}%", slice.label, slice.share * 100.0))
                        .color(Color32::BLACK),
                ));
                start += sweep;
            }
        });
}

/// Review score against price, one series per room type.
fn price_vs_rating(ui: &mut Ui, chart: &Chart<Vec<ScatterPoint>>, colors: &ColorMap) {
    chart_title(ui, chart);
    let scored: Vec<(f64, &ScatterPoint)> = chart
        .data
        .iter()
        .filter_map(|p| Some((p.review_score_avg?, p)))
        .collect();
    if scored.is_empty() {
        no_data(ui);
        return;
    }

    // Listings without a room type have no series, as in the donut.
    let mut by_room_type: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for (score, p) in &scored {
        if let Some(room_type) = &p.room_type {
            by_room_type
                .entry(room_type.as_str())
                .or_default()
                .push([*score, p.price]);
        }
    }
    let hover_targets: Vec<([f64; 2], String)> = scored
        .iter()
        .map(|(score, p)| {
            let label = match &p.neighbourhood {
                Some(n) => format!("{}\n{n}", p.name),
                None => p.name.clone(),
            };
            ([*score, p.price], label)
        })
        .collect();

    Plot::new("price_vs_rating")
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .legend(Legend::default())
        .label_formatter(move |name, p| {
            let listing = listings_at(&hover_targets, [p.x, p.y]);
            format!("{listing}{name}\nscore {:.2}, ${:.2}", p.x, p.y)
        })
        .show(ui, |plot_ui| {
            for (room_type, pts) in by_room_type {
                plot_ui.points(
                    Points::new(pts)
                        .name(room_type)
                        .color(colors.color_for(room_type).gamma_multiply(0.5))
                        .radius(2.5),
                );
            }
        });
}

/// Hover text naming the listings drawn at exactly `xy`, with a trailing
/// newline, or empty when nothing is there.
fn listings_at(targets: &[([f64; 2], String)], xy: [f64; 2]) -> String {
    let hits: Vec<&str> = targets
        .iter()
        .filter(|(at, _)| *at == xy)
        .map(|(_, label)| label.as_str())
        .collect();
    match hits.as_slice() {
        [] => String::new(),
        [one] => format!("{one}\n"),
        [first, rest @ ..] => format!("{first}\n(+{} more listings here)\n", rest.len()),
    }
}

/// Violin per cancellation policy: density outline, box, and every price
/// drawn beside it.
fn price_by_policy(ui: &mut Ui, chart: &Chart<Vec<PolicyDistribution>>) {
    chart_title(ui, chart);
    if chart.data.is_empty() {
        no_data(ui);
        return;
    }

    let palette = generate_palette(chart.data.len());
    let labels: Vec<String> = chart.data.iter().map(|d| d.policy.clone()).collect();

    Plot::new("price_by_policy")
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            for (i, (dist, color)) in chart.data.iter().zip(&palette).enumerate() {
                let x = i as f64;
                if let Some(outline) = violin_outline(x, &dist.density) {
                    // Multi-modal outlines are concave; fill with symmetric
                    // trapezoids, which are always convex.
                    let n = outline.len() / 2;
                    for k in 0..n.saturating_sub(1) {
                        let (a, b) = (outline[k], outline[k + 1]);
                        let strip = vec![a, b, [2.0 * x - b[0], b[1]], [2.0 * x - a[0], a[1]]];
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(strip))
                                .fill_color(color.gamma_multiply(0.15))
                                .stroke(Stroke::NONE),
                        );
                    }
                    let mut closed = outline;
                    if let Some(&first) = closed.first() {
                        closed.push(first);
                    }
                    plot_ui.line(
                        Line::new(PlotPoints::from(closed))
                            .color(*color)
                            .width(1.0)
                            .name(&dist.policy),
                    );
                }
                let s = &dist.summary;
                plot_ui.box_plot(
                    BoxPlot::new(vec![
                        BoxElem::new(
                            x,
                            BoxSpread::new(
                                s.lower_whisker,
                                s.q1,
                                s.median,
                                s.q3,
                                s.upper_whisker,
                            ),
                        )
                        .box_width(0.15)
                        .fill(color.gamma_multiply(0.3))
                        .stroke(Stroke::new(1.5, *color)),
                    ])
                    .name(&dist.policy),
                );

                // Deterministic jitter so overlapping prices stay visible.
                let pts: Vec<[f64; 2]> = dist
                    .prices
                    .iter()
                    .enumerate()
                    .map(|(j, &price)| [x - 0.48 + (j * 7 % 11) as f64 * 0.006, price])
                    .collect();
                plot_ui.points(
                    Points::new(pts)
                        .name(&dist.policy)
                        .color(color.gamma_multiply(0.6))
                        .radius(1.5),
                );
            }
        });
}

/// Closed outline of a violin centred on `x`, mirrored left and right,
/// with the widest point reaching `VIOLIN_HALF_WIDTH`.
fn violin_outline(x: f64, density: &[(f64, f64)]) -> Option<Vec<[f64; 2]>> {
    let peak = density.iter().map(|&(_, d)| d).fold(0.0, f64::max);
    if peak <= 0.0 {
        return None;
    }
    let scale = VIOLIN_HALF_WIDTH / peak;
    let right = density.iter().map(|&(y, d)| [x + d * scale, y]);
    let left = density.iter().rev().map(|&(y, d)| [x - d * scale, y]);
    Some(right.chain(left).collect())
}
