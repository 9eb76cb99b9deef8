use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::filter::FilteredListings;
use super::model::Listing;

/// Number of neighbourhoods shown in the ranked charts.
pub const DEFAULT_TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Scalar summaries
// ---------------------------------------------------------------------------

/// Arithmetic mean, `None` for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// The three KPI scalars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean_price: Option<f64>,
    /// Mean over listings that have a score.
    pub mean_review_score: Option<f64>,
}

pub fn summary(view: &FilteredListings<'_>) -> Summary {
    Summary {
        count: view.len(),
        mean_price: mean(view.iter().map(|l| l.price)),
        mean_review_score: mean(view.iter().filter_map(|l| l.review_score_avg)),
    }
}

// ---------------------------------------------------------------------------
// Grouped means
// ---------------------------------------------------------------------------

/// Mean of `value` per `key`, groups in key order. Rows without a key join
/// no group. Absent values are skipped; a group with no present value has
/// no mean.
fn group_means(
    view: &FilteredListings<'_>,
    key: impl Fn(&Listing) -> Option<&str>,
    value: impl Fn(&Listing) -> Option<f64>,
) -> Vec<(String, Option<f64>)> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for listing in view.iter() {
        let Some(k) = key(listing) else { continue };
        let entry = groups.entry(k).or_insert((0.0, 0));
        if let Some(v) = value(listing) {
            entry.0 += v;
            entry.1 += 1;
        }
    }
    groups
        .into_iter()
        .map(|(k, (sum, count))| (k.to_string(), (count > 0).then(|| sum / count as f64)))
        .collect()
}

/// Stable sort by mean; groups without a mean go last in either direction.
fn sort_by_mean(groups: &mut [(String, Option<f64>)], descending: bool) {
    groups.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(a),
        (Some(a), Some(b)) => a.total_cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

fn top_means(mut groups: Vec<(String, Option<f64>)>, top_n: usize) -> Vec<(String, f64)> {
    sort_by_mean(&mut groups, true);
    groups
        .into_iter()
        .filter_map(|(k, m)| Some((k, m?)))
        .take(top_n)
        .collect()
}

/// Highest mean nightly price per neighbourhood, descending, at most `top_n`.
pub fn mean_price_by_neighbourhood(
    view: &FilteredListings<'_>,
    top_n: usize,
) -> Vec<(String, f64)> {
    let groups = group_means(view, |l| l.neighbourhood.as_deref(), |l| Some(l.price));
    top_means(groups, top_n)
}

/// Highest mean `availability_365` per neighbourhood, descending, at most `top_n`.
pub fn mean_availability_by_neighbourhood(
    view: &FilteredListings<'_>,
    top_n: usize,
) -> Vec<(String, f64)> {
    let groups = group_means(
        view,
        |l| l.neighbourhood.as_deref(),
        |l| Some(f64::from(l.availability_365)),
    );
    top_means(groups, top_n)
}

/// Mean reviews per month per room type, ascending. Room types whose
/// listings have no review rate at all come last with `None`.
pub fn mean_reviews_per_month_by_room_type(
    view: &FilteredListings<'_>,
) -> Vec<(String, Option<f64>)> {
    let mut groups = group_means(view, |l| l.room_type.as_deref(), |l| l.reviews_per_month);
    sort_by_mean(&mut groups, false);
    groups
}

// ---------------------------------------------------------------------------
// Counts, projections, distributions
// ---------------------------------------------------------------------------

/// Listings per room type; rows without a room type are not counted.
pub fn room_type_counts(view: &FilteredListings<'_>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for room_type in view.iter().filter_map(|l| l.room_type.as_ref()) {
        *counts.entry(room_type.clone()).or_insert(0) += 1;
    }
    counts
}

/// Share of each key in `counts`, in key order. Empty for empty counts.
pub fn proportions(counts: &BTreeMap<String, usize>) -> Vec<(String, f64)> {
    let total: usize = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }
    counts
        .iter()
        .map(|(k, &n)| (k.clone(), n as f64 / total as f64))
        .collect()
}

/// One point of the price / review score scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub review_score_avg: Option<f64>,
    pub price: f64,
    pub room_type: Option<String>,
    pub name: String,
    pub neighbourhood: Option<String>,
}

pub fn price_vs_review_score(view: &FilteredListings<'_>) -> Vec<ScatterPoint> {
    view.iter()
        .map(|l| ScatterPoint {
            review_score_avg: l.review_score_avg,
            price: l.price,
            room_type: l.room_type.clone(),
            name: l.name.clone(),
            neighbourhood: l.neighbourhood.clone(),
        })
        .collect()
}

/// Every price per cancellation policy, in row order. Rows without a
/// policy are left out.
pub fn price_by_cancellation_policy(view: &FilteredListings<'_>) -> BTreeMap<String, Vec<f64>> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for listing in view.iter() {
        if let Some(policy) = &listing.cancellation_policy {
            groups.entry(policy.clone()).or_default().push(listing.price);
        }
    }
    groups
}

/// Five-number summary drawn as the box of a distribution plot.
///
/// Quartiles use linear interpolation between order statistics; whiskers
/// reach the most extreme values within 1.5 IQR of the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

impl BoxSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let (lo, hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        Some(BoxSummary {
            lower_whisker: sorted.iter().copied().find(|&v| v >= lo).unwrap_or(q1),
            q1,
            median: quantile(&sorted, 0.5),
            q3,
            upper_whisker: sorted.iter().rev().copied().find(|&v| v <= hi).unwrap_or(q3),
        })
    }
}

/// Gaussian kernel density estimate of `values`, sampled at `samples`
/// evenly spaced points from two bandwidths below the minimum to two above
/// the maximum. Pairs are `(value, density)`.
///
/// Bandwidth follows Silverman's rule,
/// `1.059 * min(std, IQR / 1.349) * n^(-1/5)`, falling back to `std` when
/// the IQR is zero. Empty when the values have no spread.
pub fn density_curve(values: &[f64], samples: usize) -> Vec<(f64, f64)> {
    let n = values.len();
    if n < 2 || samples < 2 {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt();
    let iqr = quantile(&sorted, 0.75) - quantile(&sorted, 0.25);
    let spread = if iqr > 0.0 { std.min(iqr / 1.349) } else { std };
    let bandwidth = 1.059 * spread * (n as f64).powf(-0.2);
    if !(bandwidth.is_finite() && bandwidth > 0.0) {
        return Vec::new();
    }

    let lo = sorted[0] - 2.0 * bandwidth;
    let hi = sorted[n - 1] + 2.0 * bandwidth;
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    (0..samples)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (samples - 1) as f64;
            let d = sorted
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>();
            (x, d * norm)
        })
        .collect()
}

/// `sorted` must be non-empty and ascending.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let (lo, hi) = (pos.floor() as usize, pos.ceil() as usize);
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use super::*;
    use crate::data::filter::{FilterCriteria, PriceRange, apply};
    use crate::data::fixtures::{Row, table};
    use crate::data::model::ListingTable;

    fn everything(t: &ListingTable) -> FilteredListings<'_> {
        FilteredListings::all(t)
    }

    #[test]
    fn mean_price_by_neighbourhood_scenario() {
        let t = table(&[
            Row::new("A", "Private room", 100.0),
            Row::new("A", "Private room", 200.0),
            Row::new("B", "Private room", 50.0),
        ]);
        let view = apply(&t, &FilterCriteria::default());
        assert_eq!(
            mean_price_by_neighbourhood(&view, DEFAULT_TOP_N),
            vec![("A".to_string(), 150.0), ("B".to_string(), 50.0)]
        );
    }

    #[test]
    fn ranked_means_truncate_and_keep_ties_in_key_order() {
        let rows: Vec<Row> = (0..15)
            .map(|i| Row::new(&format!("N{i:02}"), "Private room", f64::from(100 + i % 3)))
            .collect();
        let t = table(&rows);
        let top = mean_price_by_neighbourhood(&everything(&t), 4);

        assert_eq!(top.len(), 4);
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
        let keys: Vec<&str> = top.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["N02", "N05", "N08", "N11"]);
    }

    #[test]
    fn availability_means() {
        let t = table(&[
            Row::new("Fremont", "Private room", 10.0).availability(100),
            Row::new("Fremont", "Private room", 10.0).availability(300),
            Row::new("Ballard", "Private room", 10.0).availability(365),
        ]);
        assert_eq!(
            mean_availability_by_neighbourhood(&everything(&t), DEFAULT_TOP_N),
            vec![("Ballard".to_string(), 365.0), ("Fremont".to_string(), 200.0)]
        );
    }

    #[test]
    fn reviews_means_skip_missing_and_sort_ascending() {
        let t = table(&[
            Row::new("A", "Entire home/apt", 10.0).reviews(3.0),
            Row::new("A", "Entire home/apt", 10.0),
            Row::new("A", "Private room", 10.0).reviews(1.0),
            Row::new("A", "Private room", 10.0).reviews(2.0),
            Row::new("A", "Shared room", 10.0),
        ]);
        assert_eq!(
            mean_reviews_per_month_by_room_type(&everything(&t)),
            vec![
                ("Private room".to_string(), Some(1.5)),
                ("Entire home/apt".to_string(), Some(3.0)),
                ("Shared room".to_string(), None),
            ]
        );
    }

    #[test]
    fn counts_projection_and_distribution() {
        let t = table(&[
            Row::new("A", "Private room", 60.0).policy("strict").score(4.5),
            Row::new("B", "Entire home/apt", 120.0).policy("flexible"),
            Row::new("A", "Private room", 80.0).policy("strict"),
        ]);
        let view = everything(&t);

        let counts = room_type_counts(&view);
        assert_eq!(counts["Private room"], 2);
        assert_eq!(counts["Entire home/apt"], 1);
        let shares = proportions(&counts);
        assert!((shares.iter().map(|(_, p)| p).sum::<f64>() - 1.0).abs() < 1e-12);

        let points = price_vs_review_score(&view);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].review_score_avg, Some(4.5));
        assert_eq!(points[1].name, "Listing 1");
        assert_eq!(points[1].neighbourhood.as_deref(), Some("B"));

        let prices = price_by_cancellation_policy(&view);
        assert_eq!(prices["strict"], vec![60.0, 80.0]);
        assert_eq!(prices["flexible"], vec![120.0]);
    }

    #[test]
    fn empty_view_degrades_to_no_data() {
        let t = table(&[Row::new("A", "Private room", 500.0)]);
        let criteria = FilterCriteria {
            price: PriceRange::new(600, 700),
            ..Default::default()
        };
        let view = apply(&t, &criteria);

        let s = summary(&view);
        assert_eq!(s.count, 0);
        assert_eq!(s.mean_price, None);
        assert_eq!(s.mean_review_score, None);
        assert!(mean_price_by_neighbourhood(&view, DEFAULT_TOP_N).is_empty());
        assert!(room_type_counts(&view).is_empty());
        assert!(proportions(&room_type_counts(&view)).is_empty());
        assert!(price_vs_review_score(&view).is_empty());
        assert!(mean_availability_by_neighbourhood(&view, DEFAULT_TOP_N).is_empty());
        assert!(price_by_cancellation_policy(&view).is_empty());
        assert!(mean_reviews_per_month_by_room_type(&view).is_empty());
    }

    #[test]
    fn blank_categories_join_no_group_but_still_count() {
        let t = table(&[
            Row::new("", "", 100.0).policy("").reviews(2.0),
            Row::new("A", "Private room", 50.0).policy("strict").reviews(1.0),
        ]);
        let view = everything(&t);
        assert!(!t.neighbourhoods.contains(""));
        assert!(!t.room_types.contains(""));

        assert_eq!(
            mean_price_by_neighbourhood(&view, DEFAULT_TOP_N),
            vec![("A".to_string(), 50.0)]
        );
        assert_eq!(
            mean_availability_by_neighbourhood(&view, DEFAULT_TOP_N).len(),
            1
        );
        assert_eq!(
            mean_reviews_per_month_by_room_type(&view),
            vec![("Private room".to_string(), Some(1.0))]
        );
        assert_eq!(room_type_counts(&view).len(), 1);
        assert_eq!(proportions(&room_type_counts(&view)), vec![("Private room".to_string(), 1.0)]);
        assert_eq!(price_by_cancellation_policy(&view).keys().collect::<Vec<_>>(), ["strict"]);
        assert_eq!(price_vs_review_score(&view).len(), 2);

        let s = summary(&view);
        assert_eq!(s.count, 2);
        assert_eq!(s.mean_price, Some(75.0));
    }

    #[test]
    fn density_curve_integrates_to_about_one() {
        assert!(density_curve(&[], 50).is_empty());
        assert!(density_curve(&[80.0], 50).is_empty());
        assert!(density_curve(&[80.0, 80.0, 80.0], 50).is_empty());

        let prices = [60.0, 75.0, 80.0, 95.0, 120.0, 150.0, 300.0];
        let curve = density_curve(&prices, 200);
        assert_eq!(curve.len(), 200);
        assert!(curve.first().unwrap().0 < 60.0);
        assert!(curve.last().unwrap().0 > 300.0);
        assert!(curve.iter().all(|&(_, d)| d >= 0.0));

        let step = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|&(_, d)| d * step).sum();
        assert!((area - 1.0).abs() < 0.05, "area {area}");

        // Densest near the cluster, not near the outlier.
        let peak = curve.iter().max_by(|a, b| a.1.total_cmp(&b.1)).unwrap();
        assert!(peak.0 < 150.0, "peak at {}", peak.0);
    }

    #[test]
    fn box_summary() {
        assert_eq!(BoxSummary::from_values(&[]), None);

        let b = BoxSummary::from_values(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!((b.q1, b.median, b.q3), (2.0, 3.0, 4.0));
        assert_eq!((b.lower_whisker, b.upper_whisker), (1.0, 5.0));

        let b = BoxSummary::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(b.upper_whisker, 4.0);
    }

    fn arb_row() -> impl Strategy<Value = Row> {
        (
            prop::sample::select(vec!["", "Ballard", "Belltown", "Fremont", "Queen Anne", "Rainier"]),
            0u32..2000,
        )
            .prop_map(|(n, price)| Row::new(n, "Private room", f64::from(price) / 4.0))
    }

    proptest! {
        #[test]
        fn ranked_means_respect_top_n_and_descend(
            rows in vec(arb_row(), 0..60),
            top_n in 0usize..8,
        ) {
            let t = table(&rows);
            let view = everything(&t);
            for top in [
                mean_price_by_neighbourhood(&view, top_n),
                mean_availability_by_neighbourhood(&view, top_n),
            ] {
                prop_assert!(top.len() <= top_n);
                prop_assert!(top.len() <= t.neighbourhoods.len());
                prop_assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
                prop_assert!(top.iter().all(|(k, _)| t.neighbourhoods.contains(k)));
            }
        }
    }
}
