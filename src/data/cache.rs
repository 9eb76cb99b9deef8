use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::DataSourceError;
use super::loader::load_file;
use super::model::ListingTable;

/// Memoized loader for one data source.
///
/// The first [`get_or_load`](Self::get_or_load) reads the file; every later
/// call returns the same table (or the same error) without touching storage.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    slot: Option<Result<Arc<ListingTable>, Arc<DataSourceError>>>,
    reads: usize,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DatasetCache {
            path: path.into(),
            slot: None,
            reads: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How many times storage has been read.
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn get_or_load(&mut self) -> Result<Arc<ListingTable>, Arc<DataSourceError>> {
        let path = &self.path;
        let reads = &mut self.reads;
        self.slot
            .get_or_insert_with(|| {
                *reads += 1;
                match load_file(path) {
                    Ok(table) => {
                        log::info!("Loaded {} listings from {}", table.len(), path.display());
                        Ok(Arc::new(table))
                    }
                    Err(e) => {
                        log::error!("Failed to load {}: {e}", path.display());
                        Err(Arc::new(e))
                    }
                }
            })
            .clone()
    }
}
