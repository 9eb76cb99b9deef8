use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::dashboard::{RenderOutput, render};
use crate::data::cache::DatasetCache;
use crate::data::filter::{FilterCriteria, PriceRange, price_slider_bound};
use crate::data::model::ListingTable;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Memoized source of `dataset`.
    pub cache: DatasetCache,

    /// Loaded dataset (None until the first successful load).
    pub dataset: Option<Arc<ListingTable>>,

    /// Fatal load failure, shown in place of the charts.
    pub load_error: Option<String>,

    /// Current sidebar selections.
    pub criteria: FilterCriteria,

    /// Upper bound of the price sliders.
    pub price_bound: u32,

    /// Everything derived from `dataset` and `criteria` (cached).
    pub output: Option<RenderOutput>,

    /// Room type colours shared by the pie and scatter charts.
    pub room_type_colors: ColorMap,

    /// Status message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let cache = DatasetCache::new(config.data_path.clone());
        let criteria = FilterCriteria {
            price: config.default_price_range(),
            ..Default::default()
        };
        Self {
            config,
            cache,
            dataset: None,
            load_error: None,
            criteria,
            price_bound: PriceRange::DEFAULT.max,
            output: None,
            room_type_colors: ColorMap::default(),
            status_message: None,
        }
    }

    /// Fetch the dataset from the cache and derive the first view.
    pub fn load(&mut self) {
        match self.cache.get_or_load() {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                self.dataset = None;
                self.output = None;
                self.load_error = Some(format!("Error: {e}"));
            }
        }
    }

    /// Switch to another data source and load it.
    pub fn open_file(&mut self, path: PathBuf) {
        self.cache = DatasetCache::new(path);
        self.load();
    }

    /// Ingest a newly loaded dataset, reset filters and colours.
    fn set_dataset(&mut self, dataset: Arc<ListingTable>) {
        let default_range = self.config.default_price_range();
        self.criteria = FilterCriteria {
            price: default_range,
            ..Default::default()
        };
        self.price_bound = price_slider_bound(&dataset, default_range);
        self.room_type_colors = ColorMap::new(dataset.room_types.iter().map(String::as_str));
        self.dataset = Some(dataset);
        self.load_error = None;
        self.rerender();
    }

    /// Recompute the derived view after a criteria change.
    pub fn rerender(&mut self) {
        if let Some(ds) = &self.dataset {
            self.output = Some(render(ds, &self.criteria, self.config.top_n));
        }
    }

    /// Add or remove a neighbourhood from the selection.
    pub fn toggle_neighbourhood(&mut self, neighbourhood: &str) {
        let selected = &mut self.criteria.neighbourhoods;
        if !selected.remove(neighbourhood) {
            selected.insert(neighbourhood.to_string());
        }
        self.rerender();
    }

    /// Add or remove a room type from the selection.
    pub fn toggle_room_type(&mut self, room_type: &str) {
        let selected = &mut self.criteria.room_types;
        if !selected.remove(room_type) {
            selected.insert(room_type.to_string());
        }
        self.rerender();
    }

    /// Empty the neighbourhood selection (no restriction).
    pub fn clear_neighbourhoods(&mut self) {
        self.criteria.neighbourhoods.clear();
        self.rerender();
    }

    /// Empty the room type selection (no restriction).
    pub fn clear_room_types(&mut self) {
        self.criteria.room_types.clear();
        self.rerender();
    }

    pub fn set_price_range(&mut self, range: PriceRange) {
        if self.criteria.price != range {
            self.criteria.price = range;
            self.rerender();
        }
    }

    pub fn set_superhost_only(&mut self, superhost_only: bool) {
        if self.criteria.superhost_only != superhost_only {
            self.criteria.superhost_only = superhost_only;
            self.rerender();
        }
    }

    /// Write the current export bytes to `path`.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        let output = self.output.as_ref().context("no dataset loaded")?;
        let bytes = output
            .export_csv
            .as_ref()
            .map_err(|e| anyhow!("serialising listings: {e}"))?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!(
            "Exported {} listings to {}",
            output.summary.count,
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::data::fixtures::{HEADER, Row, csv_text};

    fn state_with(rows: &[Row]) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned_listings.csv");
        fs::write(&path, csv_text(rows)).unwrap();
        let mut state = AppState::new(DashboardConfig {
            data_path: path,
            ..Default::default()
        });
        state.load();
        (dir, state)
    }

    fn visible(state: &AppState) -> Vec<usize> {
        state.output.as_ref().unwrap().visible_indices.clone()
    }

    #[test]
    fn load_renders_with_default_criteria() {
        let (_dir, state) = state_with(&[
            Row::new("Ballard", "Private room", 80.0),
            Row::new("Fremont", "Shared room", 700.0),
        ]);
        assert!(state.load_error.is_none());
        assert_eq!(state.price_bound, 700);
        assert_eq!(state.criteria.price, PriceRange::DEFAULT);
        assert_eq!(visible(&state), [0]);
    }

    #[test]
    fn toggling_selections_refilters() {
        let (_dir, mut state) = state_with(&[
            Row::new("Ballard", "Private room", 80.0),
            Row::new("Fremont", "Shared room", 90.0).superhost(true),
            Row::new("Fremont", "Private room", 100.0),
        ]);

        state.toggle_neighbourhood("Fremont");
        assert_eq!(visible(&state), [1, 2]);
        state.toggle_room_type("Private room");
        assert_eq!(visible(&state), [2]);
        state.toggle_neighbourhood("Fremont");
        assert_eq!(visible(&state), [0, 2]);
        state.clear_room_types();
        state.set_superhost_only(true);
        assert_eq!(visible(&state), [1]);
        state.set_superhost_only(false);
        state.clear_neighbourhoods();
        state.set_price_range(PriceRange::new(85, 95));
        assert_eq!(visible(&state), [1]);
    }

    #[test]
    fn missing_file_sets_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(DashboardConfig {
            data_path: dir.path().join("absent.csv"),
            ..Default::default()
        });
        state.load();
        assert!(state.dataset.is_none());
        assert!(state.output.is_none());
        assert!(state.load_error.as_deref().unwrap().contains("absent.csv"));
        assert!(state.export_to(&dir.path().join("out.csv")).is_err());
    }

    #[test]
    fn export_writes_filtered_rows() {
        let (dir, mut state) = state_with(&[
            Row::new("Ballard", "Private room", 80.0),
            Row::new("Fremont", "Shared room", 90.0),
        ]);
        state.toggle_neighbourhood("Ballard");

        let out = dir.path().join("filtered_listings.csv");
        state.export_to(&out).unwrap();
        let text = fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert!(lines.next().unwrap().contains("Ballard"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn opening_another_file_resets_criteria() {
        let (dir, mut state) = state_with(&[Row::new("Ballard", "Private room", 80.0)]);
        state.toggle_neighbourhood("Ballard");

        let other = dir.path().join("other.csv");
        fs::write(&other, csv_text(&[Row::new("Belltown", "Shared room", 60.0)])).unwrap();
        state.open_file(other);

        assert!(state.criteria.neighbourhoods.is_empty());
        assert_eq!(state.dataset.as_ref().unwrap().neighbourhoods.len(), 1);
        assert_eq!(visible(&state), [0]);
    }
}
