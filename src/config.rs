use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::data::aggregate::DEFAULT_TOP_N;
use crate::data::filter::PriceRange;

/// Settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";
/// Overrides the settings file location.
pub const CONFIG_ENV: &str = "AIRBNB_DASHBOARD_CONFIG";
/// Overrides `data_path`.
pub const DATA_ENV: &str = "AIRBNB_DASHBOARD_DATA";

/// Dashboard settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// The listings file (`.csv` or `.parquet`).
    pub data_path: PathBuf,
    /// Bars in the ranked neighbourhood charts.
    pub top_n: usize,
    pub default_min_price: u32,
    pub default_max_price: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("cleaned_listings.csv"),
            top_n: DEFAULT_TOP_N,
            default_min_price: PriceRange::DEFAULT.min,
            default_max_price: PriceRange::DEFAULT.max,
        }
    }
}

impl DashboardConfig {
    /// Settings from the environment: [`CONFIG_ENV`] or [`CONFIG_FILE`],
    /// then [`DATA_ENV`] on top.
    pub fn from_env() -> Result<Self> {
        let config_path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        let data_override = std::env::var_os(DATA_ENV).map(PathBuf::from);
        Self::resolve(&config_path, data_override)
    }

    pub fn resolve(config_path: &Path, data_override: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load(config_path)?;
        if let Some(data_path) = data_override {
            config.data_path = data_path;
        }
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON settings file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            bail!("top_n must be at least 1");
        }
        if self.default_min_price > self.default_max_price {
            bail!(
                "default_min_price ({}) is above default_max_price ({})",
                self.default_min_price,
                self.default_max_price
            );
        }
        Ok(())
    }

    pub fn default_price_range(&self) -> PriceRange {
        PriceRange::new(self.default_min_price, self.default_max_price)
    }
}
