use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{RadarError, Result};

/// API credentials, read from the environment (or a .env file). RapidAPI
/// covers both the Zillow and Redfin providers.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub rentcast: Option<String>,
    pub rapidapi: Option<String>,
}

impl ApiKeys {
    pub fn from_env() -> Self {
        let non_empty = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        Self {
            rentcast: non_empty("RENTCAST_API_KEY"),
            rapidapi: non_empty("RAPIDAPI_KEY"),
        }
    }

    pub fn any_present(&self) -> bool {
        self.rentcast.is_some() || self.rapidapi.is_some()
    }
}

/// What we're searching for. Serialized into the JSON export so a snapshot
/// records the criteria that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    pub city: String,
    pub state: String,
    pub bedrooms: u32,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            bedrooms: 3,
            min_price: None,
            max_price: Some(8000),
        }
    }
}

/// Weights for the quality score, one per factor. Expected to sum to 1.0;
/// the scorer divides by the actual total so a drifted configuration still
/// lands on a 0-100 scale.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub price_value: f64,
    pub size_sqft: f64,
    pub amenities: f64,
    pub location_walkscore: f64,
    pub recency: f64,
    pub photos_count: f64,
    pub pet_friendly: f64,
    pub parking: f64,
    pub laundry: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            price_value: 0.20,
            size_sqft: 0.15,
            amenities: 0.15,
            location_walkscore: 0.15,
            recency: 0.15,
            photos_count: 0.05,
            pet_friendly: 0.05,
            parking: 0.05,
            laundry: 0.05,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.price_value
            + self.size_sqft
            + self.amenities
            + self.location_walkscore
            + self.recency
            + self.photos_count
            + self.pet_friendly
            + self.parking
            + self.laundry
    }

    /// Load-time sanity check. A total that drifted from 1.0 is tolerated
    /// with a warning; a non-positive or non-finite total cannot produce a
    /// meaningful score and is rejected.
    pub fn validate(&self) -> Result<()> {
        let total = self.total();
        if !total.is_finite() || total <= 0.0 {
            return Err(RadarError::Config(format!(
                "scoring weights must have a positive total, got {total}"
            )));
        }
        if (total - 1.0).abs() > 0.01 {
            warn!(total, "scoring weights do not sum to 1.0; scores are rescaled");
        }
        Ok(())
    }
}

/// Tunables for duplicate detection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Two same-address, same-bedroom listings whose prices differ by no
    /// more than this fraction are considered the same unit.
    pub price_tolerance: f64,
    /// Extra abbreviation expansions merged over the built-in table,
    /// e.g. `hwy = "highway"`.
    pub extra_abbreviations: HashMap<String, String>,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            price_tolerance: 0.02,
            extra_abbreviations: HashMap::new(),
        }
    }
}

/// Tunables for the scoring factors and tag thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Days after which the recency factor has fully decayed to zero.
    pub recency_horizon_days: i64,
    /// Listings at most this many days old are tagged "New".
    pub new_listing_days: i64,
    /// Photo counts at or above this saturate the photos factor.
    pub photo_saturation: u32,
    /// Sub-score thresholds for qualitative tags.
    pub great_value_threshold: f64,
    pub spacious_threshold: f64,
    pub amenity_rich_threshold: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            recency_horizon_days: 30,
            new_listing_days: 3,
            photo_saturation: 12,
            great_value_threshold: 0.70,
            spacious_threshold: 0.75,
            amenity_rich_threshold: 0.90,
        }
    }
}

/// Where the run's artifacts land.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub dashboard_filename: String,
    pub data_filename: String,
    /// Cap on entries rendered into the dashboard; the JSON export always
    /// carries the full set.
    pub max_dashboard_listings: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            dashboard_filename: "dashboard.html".to_string(),
            data_filename: "listings.json".to_string(),
            max_dashboard_listings: 50,
        }
    }
}

/// Top-level configuration, deserialized from config.toml when present.
/// Every section falls back to its defaults, so an empty or missing file
/// is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchCriteria,
    pub weights: ScoringWeights,
    pub dedup: DedupConfig,
    pub scorer: ScorerConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                RadarError::Config(format!(
                    "failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        config.weights.validate()?;
        if config.dedup.price_tolerance < 0.0 {
            return Err(RadarError::Config(
                "dedup.price_tolerance must be non-negative".to_string(),
            ));
        }
        Ok(config)
    }
}
