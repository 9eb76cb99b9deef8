use std::collections::BTreeSet;

use csv::StringRecord;

// ---------------------------------------------------------------------------
// Listing – one row of the dataset
// ---------------------------------------------------------------------------

/// A single Airbnb listing (one row of the source CSV).
///
/// The typed fields drive filtering and aggregation; `record` keeps the row
/// exactly as read so that exports reproduce the input schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    /// Display name, only used for hover labels and the preview table.
    pub name: String,
    /// Category cells are `None` when blank; such rows join no group.
    pub neighbourhood: Option<String>,
    pub room_type: Option<String>,
    /// Nightly price, always finite and non-negative.
    pub price: f64,
    pub review_score_avg: Option<f64>,
    pub host_is_superhost: bool,
    /// Days available in the next year, 0..=365.
    pub availability_365: u16,
    pub cancellation_policy: Option<String>,
    pub reviews_per_month: Option<f64>,
    /// Raw cells in header order.
    pub record: StringRecord,
}

// ---------------------------------------------------------------------------
// ListingTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed value sets for the filter widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingTable {
    /// Header row of the source, in source order.
    pub headers: StringRecord,
    /// All listings (rows), in source order.
    pub listings: Vec<Listing>,
    /// Sorted distinct neighbourhoods, blanks excluded.
    pub neighbourhoods: BTreeSet<String>,
    /// Sorted distinct room types, blanks excluded.
    pub room_types: BTreeSet<String>,
}

impl ListingTable {
    /// Build the value sets from the loaded listings.
    pub fn from_listings(headers: StringRecord, listings: Vec<Listing>) -> Self {
        let mut neighbourhoods = BTreeSet::new();
        let mut room_types = BTreeSet::new();
        for listing in &listings {
            neighbourhoods.extend(listing.neighbourhood.clone());
            room_types.extend(listing.room_type.clone());
        }
        ListingTable {
            headers,
            listings,
            neighbourhoods,
            room_types,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Highest price in the table, `None` when empty.
    pub fn max_price(&self) -> Option<f64> {
        self.listings
            .iter()
            .map(|l| l.price)
            .max_by(|a, b| a.total_cmp(b))
    }
}
