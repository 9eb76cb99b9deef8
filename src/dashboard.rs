use crate::data::aggregate::{
    self, BoxSummary, ScatterPoint, Summary, density_curve, mean_availability_by_neighbourhood,
    mean_price_by_neighbourhood, mean_reviews_per_month_by_room_type,
    price_by_cancellation_policy, price_vs_review_score, room_type_counts,
};
use crate::data::error::EmptyResultWarning;
use crate::data::export;
use crate::data::filter::{FilterCriteria, apply};
use crate::data::model::ListingTable;

/// Shown wherever a mean or chart has nothing to work with.
pub const NO_DATA: &str = "no data";

/// Points sampled along each violin outline.
const DENSITY_SAMPLES: usize = 64;

// ---------------------------------------------------------------------------
// Render output: everything the window draws for one set of criteria
// ---------------------------------------------------------------------------

/// Formatted KPI card values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kpis {
    pub listings: String,
    pub avg_price: String,
    pub avg_rating: String,
}

impl Kpis {
    pub fn from_summary(summary: &Summary) -> Self {
        Kpis {
            listings: format_count(summary.count),
            avg_price: summary
                .mean_price
                .map_or_else(|| NO_DATA.to_string(), |p| format!("${p:.2}")),
            avg_rating: summary
                .mean_review_score
                .map_or_else(|| NO_DATA.to_string(), |r| format!("{r:.2}")),
        }
    }
}

/// Integer with `,` thousands separators.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Title, axis labels and data of one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart<T> {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDistribution {
    pub policy: String,
    pub prices: Vec<f64>,
    pub summary: BoxSummary,
    /// `(price, density)` outline of the violin; empty when the prices
    /// have no spread.
    pub density: Vec<(f64, f64)>,
}

/// Data for the six charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Charts {
    pub price_by_neighbourhood: Chart<Vec<(String, f64)>>,
    pub room_types: Chart<Vec<PieSlice>>,
    pub price_vs_rating: Chart<Vec<ScatterPoint>>,
    pub availability_by_neighbourhood: Chart<Vec<(String, f64)>>,
    pub price_by_policy: Chart<Vec<PolicyDistribution>>,
    pub reviews_by_room_type: Chart<Vec<(String, Option<f64>)>>,
}

#[derive(Debug)]
pub struct RenderOutput {
    /// Indices of the listings passing the criteria, in source order.
    pub visible_indices: Vec<usize>,
    pub summary: Summary,
    pub kpis: Kpis,
    pub charts: Charts,
    /// Set when no listing matches; every chart is then empty.
    pub warning: Option<EmptyResultWarning>,
    /// The filtered listings as CSV, ready for download.
    pub export_csv: Result<Vec<u8>, csv::Error>,
}

/// Derive the whole dashboard from the table and the current criteria.
///
/// Pure: reads `table`, never mutates it, and performs no I/O.
pub fn render(table: &ListingTable, criteria: &FilterCriteria, top_n: usize) -> RenderOutput {
    let view = apply(table, criteria);
    log::debug!("{} of {} listings match {criteria:?}", view.len(), table.len());

    let warning = view.is_empty().then_some(EmptyResultWarning);
    if let Some(w) = warning {
        log::warn!("{w}");
    }

    let counts = room_type_counts(&view);
    let room_types = aggregate::proportions(&counts)
        .into_iter()
        .map(|(label, share)| PieSlice {
            count: counts[&label],
            label,
            share,
        })
        .collect();

    let price_by_policy = price_by_cancellation_policy(&view)
        .into_iter()
        .filter_map(|(policy, prices)| {
            let summary = BoxSummary::from_values(&prices)?;
            Some(PolicyDistribution {
                density: density_curve(&prices, DENSITY_SAMPLES),
                policy,
                prices,
                summary,
            })
        })
        .collect();

    let charts = Charts {
        price_by_neighbourhood: Chart {
            title: "Avg Price by Neighborhood",
            x_label: "Neighborhood",
            y_label: "Avg Price ($)",
            data: mean_price_by_neighbourhood(&view, top_n),
        },
        room_types: Chart {
            title: "Room Type Distribution",
            x_label: "",
            y_label: "",
            data: room_types,
        },
        price_vs_rating: Chart {
            title: "Price vs Review Score",
            x_label: "Review score",
            y_label: "Price ($)",
            data: price_vs_review_score(&view),
        },
        availability_by_neighbourhood: Chart {
            title: "Availability by Neighborhood",
            x_label: "Neighborhood",
            y_label: "Avg Days Available",
            data: mean_availability_by_neighbourhood(&view, top_n),
        },
        price_by_policy: Chart {
            title: "Price by Cancellation Policy",
            x_label: "Cancellation policy",
            y_label: "Price ($)",
            data: price_by_policy,
        },
        reviews_by_room_type: Chart {
            title: "Avg Reviews per Month by Room Type",
            x_label: "Room Type",
            y_label: "Avg Reviews/Month",
            data: mean_reviews_per_month_by_room_type(&view),
        },
    };

    let summary = aggregate::summary(&view);
    RenderOutput {
        kpis: Kpis::from_summary(&summary),
        summary,
        charts,
        warning,
        export_csv: export::to_csv_bytes(&view),
        visible_indices: view.indices,
    }
}
