use std::collections::BTreeSet;

use super::model::{Listing, ListingTable};

// ---------------------------------------------------------------------------
// Filter criteria: what the sidebar currently selects
// ---------------------------------------------------------------------------

/// Inclusive price interval in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: u32,
    pub max: u32,
}

impl PriceRange {
    pub const DEFAULT: PriceRange = PriceRange { min: 50, max: 500 };

    pub fn new(min: u32, max: u32) -> Self {
        PriceRange { min, max }
    }

    /// The interval `0..=ceil(max price)`, which selects every listing.
    pub fn covering(table: &ListingTable) -> Self {
        PriceRange::new(0, ceil_price(table.max_price().unwrap_or(0.0)))
    }

    pub fn contains(&self, price: f64) -> bool {
        f64::from(self.min) <= price && price <= f64::from(self.max)
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        PriceRange::DEFAULT
    }
}

/// Upper bound for the price sliders: the highest price in the table, but
/// never below the default upper limit so the default range stays valid.
pub fn price_slider_bound(table: &ListingTable, default: PriceRange) -> u32 {
    ceil_price(table.max_price().unwrap_or(0.0)).max(default.max)
}

fn ceil_price(price: f64) -> u32 {
    price.ceil().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// The active set of sidebar predicates.
///
/// An empty set means "no restriction" for that column; the price interval
/// is always applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub neighbourhoods: BTreeSet<String>,
    pub room_types: BTreeSet<String>,
    pub price: PriceRange,
    pub superhost_only: bool,
}

impl FilterCriteria {
    /// Whether a single listing passes every active predicate.
    pub fn matches(&self, listing: &Listing) -> bool {
        selects(&self.neighbourhoods, listing.neighbourhood.as_deref())
            && selects(&self.room_types, listing.room_type.as_deref())
            && self.price.contains(listing.price)
            && (!self.superhost_only || listing.host_is_superhost)
    }
}

/// Empty selection passes everything; otherwise a blank category never matches.
fn selects(selected: &BTreeSet<String>, value: Option<&str>) -> bool {
    selected.is_empty() || value.is_some_and(|v| selected.contains(v))
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// A read-only subset of a [`ListingTable`]: row indices in source order.
#[derive(Debug, Clone)]
pub struct FilteredListings<'a> {
    pub table: &'a ListingTable,
    pub indices: Vec<usize>,
}

impl<'a> FilteredListings<'a> {
    /// A view selecting every row.
    pub fn all(table: &'a ListingTable) -> Self {
        FilteredListings {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Listing> + '_ {
        let listings = &self.table.listings;
        self.indices.iter().map(move |&i| &listings[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the view of listings passing all active filters.
pub fn apply<'a>(table: &'a ListingTable, criteria: &FilterCriteria) -> FilteredListings<'a> {
    let indices = table
        .listings
        .iter()
        .enumerate()
        .filter(|(_, listing)| criteria.matches(listing))
        .map(|(i, _)| i)
        .collect();
    FilteredListings { table, indices }
}
