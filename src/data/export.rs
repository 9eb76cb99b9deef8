use super::filter::FilteredListings;

/// Suggested file name for the download.
pub const EXPORT_FILE_NAME: &str = "filtered_listings.csv";
/// MIME type of the exported bytes.
pub const EXPORT_MIME: &str = "text/csv";

/// Serialise the filtered listings as UTF-8 CSV.
///
/// The header and every cell are written exactly as they were read, so the
/// export has the input's schema. An empty view yields the header row only.
pub fn to_csv_bytes(view: &FilteredListings<'_>) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&view.table.headers)?;
    for listing in view.iter() {
        writer.write_record(&listing.record)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
