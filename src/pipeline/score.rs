use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::info;

use crate::config::{ScorerConfig, ScoringWeights};
use crate::domain::{DashboardEntry, Laundry, Listing};

/// Sub-score assigned when a factor's underlying data is absent. Unknown is
/// not the same as worst: a source that omits a field must not drag the
/// listing to the bottom.
const NEUTRAL: f64 = 0.5;

/// Batch-relative reference statistics, computed once per run. Scoring is
/// relative to the current batch, so it cannot start until dedup has
/// produced the complete set.
struct BatchStats {
    /// price mean and peer count per bedroom count
    price_by_bedrooms: HashMap<u32, (f64, usize)>,
    size_range: Option<(u32, u32)>,
    max_amenities: usize,
    max_photos: u32,
}

impl BatchStats {
    fn collect(listings: &[Listing]) -> Self {
        let mut sums: HashMap<u32, (f64, usize)> = HashMap::new();
        for l in listings {
            let entry = sums.entry(l.bedrooms).or_insert((0.0, 0));
            entry.0 += f64::from(l.price);
            entry.1 += 1;
        }
        let price_by_bedrooms = sums
            .into_iter()
            .map(|(beds, (sum, count))| (beds, (sum / count as f64, count)))
            .collect();

        let sizes: Vec<u32> = listings.iter().filter_map(|l| l.size_sqft).collect();
        let size_range = match (sizes.iter().min(), sizes.iter().max()) {
            (Some(&min), Some(&max)) => Some((min, max)),
            _ => None,
        };

        Self {
            price_by_bedrooms,
            size_range,
            max_amenities: listings.iter().map(|l| l.amenities.len()).max().unwrap_or(0),
            max_photos: listings.iter().map(|l| l.photos_count).max().unwrap_or(0),
        }
    }
}

/// Per-factor sub-scores for one listing, each normalized to [0, 1].
struct FactorScores {
    price_value: f64,
    size_sqft: f64,
    amenities: f64,
    location_walkscore: f64,
    recency: f64,
    photos_count: f64,
    pet_friendly: f64,
    parking: f64,
    laundry: f64,
}

/// Deterministic, pure scorer: the same batch, weights, and pinned `now`
/// always produce the same entries.
pub struct Scorer {
    weights: ScoringWeights,
    config: ScorerConfig,
    now: DateTime<Utc>,
}

impl Scorer {
    pub fn new(weights: ScoringWeights, config: ScorerConfig, now: DateTime<Utc>) -> Self {
        Self {
            weights,
            config,
            now,
        }
    }

    /// Scores the whole deduplicated batch, returning entries sorted by
    /// descending score (price ascending, then id, on ties).
    pub fn score_batch(&self, listings: Vec<Listing>) -> Vec<DashboardEntry> {
        if listings.is_empty() {
            return Vec::new();
        }

        let stats = BatchStats::collect(&listings);
        let mut entries: Vec<DashboardEntry> = listings
            .into_iter()
            .map(|listing| {
                let factors = self.factor_scores(&listing, &stats);
                let score = self.weighted_score(&factors);
                let tags = self.derive_tags(&listing, &factors);
                DashboardEntry {
                    listing,
                    score,
                    tags,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.listing.price.cmp(&b.listing.price))
                .then(a.listing.id.cmp(&b.listing.id))
        });

        info!(
            entries = entries.len(),
            top_score = entries.first().map(|e| e.score).unwrap_or(0),
            "scoring complete"
        );
        entries
    }

    fn factor_scores(&self, listing: &Listing, stats: &BatchStats) -> FactorScores {
        FactorScores {
            price_value: self.price_value_score(listing, stats),
            size_sqft: self.size_score(listing, stats),
            amenities: amenities_score(listing, stats),
            location_walkscore: listing
                .walk_score
                .map(|ws| (ws / 100.0).clamp(0.0, 1.0))
                .unwrap_or(NEUTRAL),
            recency: self.recency_score(listing),
            photos_count: self.photos_score(listing, stats),
            pet_friendly: flag_score(listing.flags.pet_friendly),
            parking: flag_score(listing.flags.parking),
            laundry: laundry_score(listing.flags.laundry),
        }
    }

    /// Cheaper than the same-bedroom batch mean scores higher: 40% below
    /// the mean saturates at 1.0, 40% above bottoms out at 0.0. With no
    /// peers to compare against the factor is neutral.
    fn price_value_score(&self, listing: &Listing, stats: &BatchStats) -> f64 {
        match stats.price_by_bedrooms.get(&listing.bedrooms) {
            Some(&(mean, count)) if count >= 2 && mean > 0.0 => {
                let ratio = f64::from(listing.price) / mean;
                ((1.4 - ratio) / 0.8).clamp(0.0, 1.0)
            }
            _ => NEUTRAL,
        }
    }

    /// Position within the batch's observed size range. Absent size or a
    /// degenerate range is neutral, never worst.
    fn size_score(&self, listing: &Listing, stats: &BatchStats) -> f64 {
        match (listing.size_sqft, stats.size_range) {
            (Some(size), Some((min, max))) if max > min => {
                f64::from(size - min) / f64::from(max - min)
            }
            _ => NEUTRAL,
        }
    }

    /// Linear decay from 1.0 today to 0.0 at the horizon.
    fn recency_score(&self, listing: &Listing) -> f64 {
        match listing.days_on_market(self.now) {
            Some(days) => {
                let horizon = self.config.recency_horizon_days.max(1) as f64;
                (1.0 - days as f64 / horizon).clamp(0.0, 1.0)
            }
            None => NEUTRAL,
        }
    }

    /// Saturates at the configured threshold; a batch with no photo data at
    /// all stays neutral for everyone.
    fn photos_score(&self, listing: &Listing, stats: &BatchStats) -> f64 {
        if stats.max_photos == 0 {
            return NEUTRAL;
        }
        (f64::from(listing.photos_count) / f64::from(self.config.photo_saturation.max(1))).min(1.0)
    }

    fn weighted_score(&self, f: &FactorScores) -> u8 {
        let w = &self.weights;
        let weighted_sum = f.price_value * w.price_value
            + f.size_sqft * w.size_sqft
            + f.amenities * w.amenities
            + f.location_walkscore * w.location_walkscore
            + f.recency * w.recency
            + f.photos_count * w.photos_count
            + f.pet_friendly * w.pet_friendly
            + f.parking * w.parking
            + f.laundry * w.laundry;

        // Dividing by the actual total keeps the 0-100 scale even when a
        // hand-edited weight set drifts off 1.0.
        let score = 100.0 * weighted_sum / w.total();
        score.round().clamp(0.0, 100.0) as u8
    }

    fn derive_tags(&self, listing: &Listing, f: &FactorScores) -> Vec<String> {
        let mut tags = Vec::new();

        if let Some(days) = listing.days_on_market(self.now) {
            if days <= self.config.new_listing_days {
                tags.push("New".to_string());
            }
        }
        if f.price_value >= self.config.great_value_threshold {
            tags.push("Great Value".to_string());
        }
        if listing.size_sqft.is_some() && f.size_sqft >= self.config.spacious_threshold {
            tags.push("Spacious".to_string());
        }
        if !listing.amenities.is_empty() && f.amenities >= self.config.amenity_rich_threshold {
            tags.push("Loaded with Amenities".to_string());
        }
        if listing.flags.laundry == Some(Laundry::InUnit) {
            tags.push("In-Unit Laundry".to_string());
        }
        if listing.flags.parking == Some(true) {
            tags.push("Parking".to_string());
        }

        tags
    }
}

fn amenities_score(listing: &Listing, stats: &BatchStats) -> f64 {
    if stats.max_amenities == 0 {
        return NEUTRAL;
    }
    (listing.amenities.len() as f64 / stats.max_amenities as f64).min(1.0)
}

fn flag_score(flag: Option<bool>) -> f64 {
    match flag {
        Some(true) => 1.0,
        Some(false) => 0.0,
        None => NEUTRAL,
    }
}

fn laundry_score(laundry: Option<Laundry>) -> f64 {
    match laundry {
        Some(Laundry::InUnit) => 1.0,
        Some(Laundry::OnSite) => 0.6,
        Some(Laundry::None) => 0.0,
        None => NEUTRAL,
    }
}
