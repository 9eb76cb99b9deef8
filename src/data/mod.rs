/// Data layer: core types, loading, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///   .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ListingTable   (memoized by cache)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ ListingTable  │  Vec<Listing>, raw records, value sets
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply criteria → FilteredListings (row indices)
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌───────────┐  ┌──────────┐
///   │ aggregate  │  │  export   │  CSV bytes
///   └───────────┘  └──────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;

#[cfg(test)]
pub mod fixtures;
