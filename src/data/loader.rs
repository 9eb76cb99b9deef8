use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use csv::StringRecord;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::DataSourceError;
use super::model::{Listing, ListingTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listings dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – `,`-delimited UTF-8 with a header row (the usual export)
/// * `.parquet` – same columns, any scalar Arrow types
pub fn load_file(path: &Path) -> Result<ListingTable, DataSourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => read_csv(open(path)?),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataSourceError::UnsupportedFormat(other.to_string())),
    }
}

fn open(path: &Path) -> Result<File, DataSourceError> {
    File::open(path).map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV text into a [`ListingTable`].
///
/// Every row must have as many cells as the header; extra columns are kept
/// verbatim in [`Listing::record`].
pub fn read_csv<R: Read>(source: R) -> Result<ListingTable, DataSourceError> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut listings = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        listings.push(columns.parse_row(row_no + 1, record)?);
    }

    Ok(ListingTable::from_listings(headers, listings))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same columns as the CSV layout.
///
/// Each cell is rendered to its text form and then parsed like a CSV cell,
/// so both formats share one set of validation rules. Nulls become empty
/// cells.
fn load_parquet(path: &Path) -> Result<ListingTable, DataSourceError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let headers: StringRecord = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect();
    let columns = ColumnIndex::resolve(&headers)?;
    let reader = builder.build()?;

    let mut listings = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let mut record = StringRecord::new();
            for col in batch.columns() {
                if col.is_null(row) {
                    record.push_field("");
                } else {
                    record.push_field(&array_value_to_string(col.as_ref(), row)?);
                }
            }
            listings.push(columns.parse_row(listings.len() + 1, record)?);
        }
    }

    Ok(ListingTable::from_listings(headers, listings))
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

/// Positions of the required columns within the header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    name: usize,
    neighbourhood: usize,
    room_type: usize,
    price: usize,
    review_score_avg: usize,
    host_is_superhost: usize,
    availability_365: usize,
    cancellation_policy: usize,
    reviews_per_month: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, DataSourceError> {
        let find = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|name| headers.iter().position(|h| h.trim() == *name))
                .ok_or_else(|| DataSourceError::MissingColumn(candidates[0].to_string()))
        };

        Ok(ColumnIndex {
            name: find(&["name"])?,
            neighbourhood: find(&["neighbourhood_cleansed", "neighbourhood"])?,
            room_type: find(&["room_type"])?,
            price: find(&["price"])?,
            review_score_avg: find(&["review_score_avg"])?,
            host_is_superhost: find(&["host_is_superhost"])?,
            availability_365: find(&["availability_365"])?,
            cancellation_policy: find(&["cancellation_policy"])?,
            reviews_per_month: find(&["reviews_per_month"])?,
        })
    }

    /// `row` is the 1-based data row, used only in error messages.
    fn parse_row(&self, row: usize, record: StringRecord) -> Result<Listing, DataSourceError> {
        let cell = |idx: usize| record.get(idx).unwrap_or("");
        let invalid = |column: &'static str, idx: usize| DataSourceError::InvalidValue {
            row,
            column,
            value: cell(idx).to_string(),
        };

        let price = parse_price(cell(self.price)).ok_or_else(|| invalid("price", self.price))?;
        let review_score_avg = parse_optional_number(cell(self.review_score_avg))
            .ok_or_else(|| invalid("review_score_avg", self.review_score_avg))?;
        let reviews_per_month = parse_optional_number(cell(self.reviews_per_month))
            .ok_or_else(|| invalid("reviews_per_month", self.reviews_per_month))?;
        let host_is_superhost = parse_bool(cell(self.host_is_superhost))
            .ok_or_else(|| invalid("host_is_superhost", self.host_is_superhost))?;
        let availability_365 = parse_availability(cell(self.availability_365))
            .ok_or_else(|| invalid("availability_365", self.availability_365))?;

        Ok(Listing {
            name: cell(self.name).to_string(),
            neighbourhood: parse_category(cell(self.neighbourhood)),
            room_type: parse_category(cell(self.room_type)),
            price,
            review_score_avg,
            host_is_superhost,
            availability_365,
            cancellation_policy: parse_category(cell(self.cancellation_policy)),
            reviews_per_month,
            record,
        })
    }
}

fn is_missing(s: &str) -> bool {
    matches!(s, "" | "nan" | "NaN" | "NA" | "null")
}

/// Blank or NaN-like cells carry no category.
fn parse_category(s: &str) -> Option<String> {
    (!is_missing(s.trim())).then(|| s.to_string())
}

/// Required, non-negative. Accepts `$1,250.00` as well as `1250`.
fn parse_price(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = s.strip_prefix('$').unwrap_or(s);
    let value: f64 = s.replace(',', "").parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// `Some(None)` for an absent value, `None` when the cell is not a number.
fn parse_optional_number(s: &str) -> Option<Option<f64>> {
    let s = s.trim();
    if is_missing(s) {
        return Some(None);
    }
    let value: f64 = s.parse().ok()?;
    if value.is_nan() {
        Some(None)
    } else if value.is_finite() {
        Some(Some(value))
    } else {
        None
    }
}

/// Absent counts as `false`, matching an equality test against `true`.
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "true" | "True" | "TRUE" | "t" | "1" => Some(true),
        "false" | "False" | "FALSE" | "f" | "0" => Some(false),
        other if is_missing(other) => Some(false),
        _ => None,
    }
}

/// Integer days in 0..=365; `365.0` is accepted.
fn parse_availability(s: &str) -> Option<u16> {
    let s = s.trim();
    let days = match s.parse::<u16>() {
        Ok(days) => days,
        Err(_) => {
            let value: f64 = s.parse().ok()?;
            if value.fract() != 0.0 || !(0.0..=365.0).contains(&value) {
                return None;
            }
            value as u16
        }
    };
    (days <= 365).then_some(days)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::fixtures::{HEADER, Row, csv_text};

    #[test]
    fn reads_typed_fields_and_keeps_raw_record() {
        let text = format!(
            "{HEADER}\n7,Cozy loft,t,Capitol Hill,Entire home/apt,\"$1,250.00\",365.0,4.8,,strict\n"
        );
        let table = read_csv(text.as_bytes()).unwrap();
        let l = &table.listings[0];

        assert_eq!(l.name, "Cozy loft");
        assert_eq!(l.neighbourhood.as_deref(), Some("Capitol Hill"));
        assert_eq!(l.price, 1250.0);
        assert!(l.host_is_superhost);
        assert_eq!(l.availability_365, 365);
        assert_eq!(l.review_score_avg, Some(4.8));
        assert_eq!(l.reviews_per_month, None);
        assert_eq!(l.cancellation_policy.as_deref(), Some("strict"));
        assert_eq!(l.record.get(0), Some("7"));
        assert_eq!(l.record.get(5), Some("$1,250.00"));
        assert_eq!(table.headers.len(), 10);
    }

    #[test]
    fn accepts_plain_neighbourhood_column() {
        let text = "name,neighbourhood,room_type,price,review_score_avg,host_is_superhost,\
                    availability_365,cancellation_policy,reviews_per_month\n\
                    x,Ballard,Private room,60,NaN,False,10,flexible,0.5\n";
        let table = read_csv(text.as_bytes()).unwrap();
        assert_eq!(table.listings[0].neighbourhood.as_deref(), Some("Ballard"));
        assert_eq!(table.listings[0].review_score_avg, None);
        assert!(!table.listings[0].host_is_superhost);
    }

    #[test]
    fn missing_column_is_fatal() {
        let text = "name,room_type,price\nx,Private room,60\n";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(
            matches!(err, DataSourceError::MissingColumn(ref c) if c == "neighbourhood_cleansed"),
            "{err}"
        );
    }

    #[test]
    fn negative_price_is_fatal() {
        let text = csv_text(&[Row::new("A", "Private room", -5.0)]);
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DataSourceError::InvalidValue { row: 1, column: "price", .. }
        ));
        assert!(err.to_string().starts_with("data row 1,"), "{err}");
    }

    #[test]
    fn invalid_value_reports_one_based_row() {
        let text = csv_text(&[
            Row::new("A", "Private room", 10.0),
            Row::new("A", "Private room", 20.0),
            Row::new("A", "Private room", -1.0),
        ]);
        assert!(matches!(
            read_csv(text.as_bytes()),
            Err(DataSourceError::InvalidValue { row: 3, .. })
        ));
    }

    #[test]
    fn availability_out_of_range_is_fatal() {
        let text = csv_text(&[Row::new("A", "Private room", 5.0).availability(366)]);
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DataSourceError::InvalidValue { column: "availability_365", .. }
        ));
        assert_eq!(parse_availability("12.5"), None);
        assert_eq!(parse_availability("0"), Some(0));
    }

    #[test]
    fn ragged_row_is_a_csv_error() {
        let text = format!("{HEADER}\n1,only,three\n");
        assert!(matches!(
            read_csv(text.as_bytes()),
            Err(DataSourceError::Csv(_))
        ));
    }

    #[test]
    fn cell_parsers() {
        assert_eq!(parse_bool(""), Some(false));
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_optional_number("nan"), Some(None));
        assert_eq!(parse_optional_number("abc"), None);
        assert_eq!(parse_optional_number(" 2.5 "), Some(Some(2.5)));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("inf"), None);
        assert_eq!(parse_category(" "), None);
        assert_eq!(parse_category("NaN"), None);
        assert_eq!(parse_category("Ballard"), Some("Ballard".to_string()));
    }

    #[test]
    fn load_file_reads_csv_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(csv_text(&[Row::new("A", "Shared room", 30.0)]).as_bytes())
            .unwrap();
        file.flush().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn load_file_rejects_missing_file_and_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("cleaned_listings.csv");
        assert!(matches!(
            load_file(&missing),
            Err(DataSourceError::Io { .. })
        ));
        assert!(matches!(
            load_file(&dir.path().join("listings.xlsx")),
            Err(DataSourceError::UnsupportedFormat(ref ext)) if ext == "xlsx"
        ));
    }
}
