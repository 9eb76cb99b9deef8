//! Small in-memory datasets shared by the unit tests.

use super::loader::read_csv;
use super::model::ListingTable;

pub const HEADER: &str = "id,name,host_is_superhost,neighbourhood_cleansed,room_type,price,\
                          availability_365,review_score_avg,reviews_per_month,cancellation_policy";

#[derive(Debug, Clone)]
pub struct Row {
    pub neighbourhood: String,
    pub room_type: String,
    pub price: f64,
    pub superhost: bool,
    pub availability: u16,
    pub score: Option<f64>,
    pub reviews: Option<f64>,
    pub policy: String,
}

impl Row {
    pub fn new(neighbourhood: &str, room_type: &str, price: f64) -> Self {
        Row {
            neighbourhood: neighbourhood.to_string(),
            room_type: room_type.to_string(),
            price,
            superhost: false,
            availability: 0,
            score: None,
            reviews: None,
            policy: "moderate".to_string(),
        }
    }

    pub fn superhost(mut self, superhost: bool) -> Self {
        self.superhost = superhost;
        self
    }

    pub fn availability(mut self, days: u16) -> Self {
        self.availability = days;
        self
    }

    pub fn score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn reviews(mut self, per_month: f64) -> Self {
        self.reviews = Some(per_month);
        self
    }

    pub fn policy(mut self, policy: &str) -> Self {
        self.policy = policy.to_string();
        self
    }
}

fn opt(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

/// Render rows as CSV text with [`HEADER`].
pub fn csv_text(rows: &[Row]) -> String {
    let mut text = format!("{HEADER}\n");
    for (i, r) in rows.iter().enumerate() {
        text.push_str(&format!(
            "{i},Listing {i},{},{},{},{},{},{},{},{}\n",
            if r.superhost { "t" } else { "f" },
            r.neighbourhood,
            r.room_type,
            r.price,
            r.availability,
            opt(r.score),
            opt(r.reviews),
            r.policy,
        ));
    }
    text
}

pub fn table(rows: &[Row]) -> ListingTable {
    read_csv(csv_text(rows).as_bytes()).expect("fixture rows are valid")
}
