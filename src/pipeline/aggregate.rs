use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::DedupConfig;
use crate::domain::Listing;
use crate::pipeline::address::AddressNormalizer;

/// Outcome of an aggregation pass.
#[derive(Debug)]
pub struct AggregateResult {
    /// Deduplicated listings, at most one per physical unit.
    pub listings: Vec<Listing>,
    pub malformed_dropped: usize,
    pub duplicates_dropped: usize,
}

/// Merges the concatenated adapter outputs into one deduplicated set.
///
/// Two listings describe the same physical unit when their normalized
/// addresses match, their bedroom counts match, and their prices sit within
/// the configured tolerance band (sources refresh at different times, so a
/// small drift is expected). Comparison only happens inside an
/// address+bedrooms bucket, keeping the pass near-linear.
pub struct Aggregator {
    normalizer: AddressNormalizer,
    price_tolerance: f64,
}

impl Aggregator {
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            normalizer: AddressNormalizer::new(&config.extra_abbreviations),
            price_tolerance: config.price_tolerance,
        }
    }

    pub fn aggregate(&self, input: Vec<Listing>) -> AggregateResult {
        let total = input.len();
        let mut survivors: Vec<Listing> = Vec::with_capacity(total);
        // Bucket key -> indices into `survivors` holding that bucket's
        // current representatives.
        let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
        let mut malformed_dropped = 0;
        let mut duplicates_dropped = 0;

        for listing in input {
            if let Err(e) = listing.validate() {
                warn!(source = %listing.source, "dropping malformed listing: {e}");
                malformed_dropped += 1;
                continue;
            }

            let key = self.bucket_key(&listing);
            let bucket = buckets.entry(key).or_default();

            match bucket
                .iter()
                .copied()
                .find(|&idx| prices_within_band(&survivors[idx], &listing, self.price_tolerance))
            {
                Some(idx) => {
                    duplicates_dropped += 1;
                    let incumbent = &survivors[idx];
                    if prefers(&listing, incumbent) {
                        debug!(
                            kept = %listing.id,
                            dropped = %incumbent.id,
                            "duplicate unit, replacing with more complete record"
                        );
                        survivors[idx] = listing;
                    } else {
                        debug!(
                            kept = %incumbent.id,
                            dropped = %listing.id,
                            "duplicate unit, keeping existing record"
                        );
                    }
                }
                None => {
                    bucket.push(survivors.len());
                    survivors.push(listing);
                }
            }
        }

        info!(
            total,
            unique = survivors.len(),
            malformed_dropped,
            duplicates_dropped,
            "aggregation complete"
        );

        AggregateResult {
            listings: survivors,
            malformed_dropped,
            duplicates_dropped,
        }
    }

    fn bucket_key(&self, listing: &Listing) -> String {
        format!(
            "{}|{}",
            self.normalizer.normalize(&listing.address),
            listing.bedrooms
        )
    }
}

fn prices_within_band(a: &Listing, b: &Listing, tolerance: f64) -> bool {
    let diff = (f64::from(a.price) - f64::from(b.price)).abs();
    diff <= tolerance * f64::from(a.price.max(b.price))
}

/// Survivor selection: most populated optional fields wins; ties fall back
/// to the fixed source priority so the merge is deterministic.
fn prefers(candidate: &Listing, incumbent: &Listing) -> bool {
    let by_completeness = candidate.completeness().cmp(&incumbent.completeness());
    match by_completeness {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => {
            candidate.source.dedup_priority() < incumbent.source.dedup_priority()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ListingFlags, Source};

    fn listing(id: &str, source: Source, address: &str, bedrooms: u32, price: u32) -> Listing {
        Listing {
            id: id.to_string(),
            source,
            address: address.to_string(),
            city: "San Francisco".into(),
            state: "CA".into(),
            zip_code: "94114".into(),
            price,
            bedrooms,
            bathrooms: None,
            size_sqft: None,
            amenities: Vec::new(),
            listed_date: None,
            url: format!("https://example.com/{id}"),
            image_url: None,
            latitude: None,
            longitude: None,
            walk_score: None,
            property_type: None,
            photos_count: 0,
            flags: ListingFlags::default(),
        }
    }

    fn aggregator() -> Aggregator {
        Aggregator::new(&DedupConfig::default())
    }

    #[test]
    fn same_unit_across_sources_collapses_to_one() {
        let a = listing("rc_1", Source::RentCast, "123 Main St Apt 4", 3, 3000);
        let b = listing("zl_1", Source::Zillow, "123 main street #4", 3, 3050);

        let result = aggregator().aggregate(vec![a, b]);
        assert_eq!(result.listings.len(), 1);
        assert_eq!(result.duplicates_dropped, 1);
    }

    #[test]
    fn different_bedroom_counts_are_different_units() {
        let a = listing("rc_1", Source::RentCast, "123 Main St", 2, 3000);
        let b = listing("zl_1", Source::Zillow, "123 Main St", 3, 3000);

        let result = aggregator().aggregate(vec![a, b]);
        assert_eq!(result.listings.len(), 2);
    }

    #[test]
    fn price_outside_tolerance_is_a_different_unit() {
        let a = listing("rc_1", Source::RentCast, "123 Main St", 3, 3000);
        let b = listing("zl_1", Source::Zillow, "123 Main St", 3, 3400);

        let result = aggregator().aggregate(vec![a, b]);
        assert_eq!(result.listings.len(), 2);
        assert_eq!(result.duplicates_dropped, 0);
    }

    #[test]
    fn more_complete_record_survives() {
        let sparse = listing("rc_1", Source::RentCast, "55 Oak Ave", 2, 2500);
        let mut rich = listing("zl_1", Source::Zillow, "55 Oak Avenue", 2, 2520);
        rich.size_sqft = Some(1100);
        rich.bathrooms = Some(1.5);
        rich.photos_count = 9;

        let result = aggregator().aggregate(vec![sparse, rich]);
        assert_eq!(result.listings.len(), 1);
        assert_eq!(result.listings[0].id, "zl_1");
        // Only one outbound link survives; the loser's url is not merged in.
        assert_eq!(result.listings[0].url, "https://example.com/zl_1");
    }

    #[test]
    fn completeness_tie_breaks_on_source_priority() {
        let zillow = listing("zl_1", Source::Zillow, "55 Oak Ave", 2, 2500);
        let rentcast = listing("rc_1", Source::RentCast, "55 Oak Ave", 2, 2510);

        // Zillow arrives first, but RentCast outranks it on ties.
        let result = aggregator().aggregate(vec![zillow, rentcast]);
        assert_eq!(result.listings.len(), 1);
        assert_eq!(result.listings[0].source, Source::RentCast);
    }

    #[test]
    fn malformed_listing_is_dropped_not_fatal() {
        let mut bad = listing("rc_1", Source::RentCast, "1 Missing Url Way", 1, 1800);
        bad.url = String::new();
        let good = listing("rc_2", Source::RentCast, "2 Fine St", 1, 1900);

        let result = aggregator().aggregate(vec![bad, good]);
        assert_eq!(result.listings.len(), 1);
        assert_eq!(result.malformed_dropped, 1);
        assert_eq!(result.listings[0].id, "rc_2");
    }

    #[test]
    fn result_is_order_independent_for_the_pair_scenario() {
        let a = listing("rc_1", Source::RentCast, "123 Main St Apt 4", 3, 3000);
        let b = listing("zl_1", Source::Zillow, "123 main street #4", 3, 3050);

        let forward = aggregator().aggregate(vec![a.clone(), b.clone()]);
        let reverse = aggregator().aggregate(vec![b, a]);
        assert_eq!(forward.listings.len(), 1);
        assert_eq!(reverse.listings.len(), 1);
        assert_eq!(forward.listings[0].id, reverse.listings[0].id);
    }
}
