use anyhow::Result;
use chrono::{TimeZone, Utc};
use tempfile::tempdir;

use rent_radar::config::{AppConfig, SearchCriteria};
use rent_radar::demo;
use rent_radar::domain::{Listing, Source};
use rent_radar::error::{RadarError, Result as RadarResult};
use rent_radar::pipeline::aggregate::Aggregator;
use rent_radar::pipeline::score::Scorer;
use rent_radar::report;
use rent_radar::sources::{fetch_all, ListingSource};

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
}

/// A source that always fails, standing in for network/auth/rate-limit
/// trouble.
struct DownSource(Source);

#[async_trait::async_trait]
impl ListingSource for DownSource {
    fn source(&self) -> Source {
        self.0
    }

    async fn fetch(&self, _criteria: &SearchCriteria) -> RadarResult<Vec<Listing>> {
        Err(RadarError::SourceUnavailable {
            source_id: self.0.id(),
            message: "simulated outage".to_string(),
        })
    }
}

/// A source that returns a canned batch.
struct CannedSource(Source, Vec<Listing>);

#[async_trait::async_trait]
impl ListingSource for CannedSource {
    fn source(&self) -> Source {
        self.0
    }

    async fn fetch(&self, _criteria: &SearchCriteria) -> RadarResult<Vec<Listing>> {
        Ok(self.1.clone())
    }
}

fn canned_listing(id: &str, source: Source, address: &str) -> Listing {
    Listing {
        id: id.to_string(),
        source,
        address: address.to_string(),
        city: "San Francisco".into(),
        state: "CA".into(),
        zip_code: "94110".into(),
        price: 3400,
        bedrooms: 3,
        bathrooms: Some(2.0),
        size_sqft: Some(1200),
        amenities: vec!["Gym".into(), "Dishwasher".into()],
        listed_date: Some(fixed_now() - chrono::Duration::days(2)),
        url: format!("https://example.com/{id}"),
        image_url: None,
        latitude: None,
        longitude: None,
        walk_score: Some(88.0),
        property_type: Some("apartment".into()),
        photos_count: 10,
        flags: Default::default(),
    }
}

#[test]
fn demo_data_flows_through_the_whole_pipeline() -> Result<()> {
    let out_dir = tempdir()?;
    let mut config = AppConfig::default();
    config.output.dir = out_dir.path().to_path_buf();

    let now = fixed_now();
    let raw = demo::generate_listings(&config.search, now, 42);
    let raw_count = raw.len();

    let aggregated = Aggregator::new(&config.dedup).aggregate(raw);
    assert_eq!(
        aggregated.listings.len() + aggregated.duplicates_dropped,
        raw_count
    );

    let entries =
        Scorer::new(config.weights.clone(), config.scorer.clone(), now).score_batch(aggregated.listings);
    assert!(!entries.is_empty());
    assert!(entries.windows(2).all(|w| w[0].score >= w[1].score));

    let artifacts = report::write_report(&entries, &config.search, &config.output, now)?;
    assert!(artifacts.dashboard.exists());
    assert!(artifacts.data.exists());

    let export: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&artifacts.data)?)?;
    assert_eq!(
        export["total_listings"].as_u64().unwrap() as usize,
        entries.len()
    );

    let html = std::fs::read_to_string(&artifacts.dashboard)?;
    assert!(html.contains("Rent Radar"));
    assert!(html.contains(&entries[0].listing.address));

    Ok(())
}

#[tokio::test]
async fn one_failing_source_does_not_abort_the_others() {
    let criteria = SearchCriteria::default();
    let sources: Vec<Box<dyn ListingSource>> = vec![
        Box::new(DownSource(Source::Zillow)),
        Box::new(CannedSource(
            Source::RentCast,
            vec![canned_listing("rc_1", Source::RentCast, "123 Main St")],
        )),
    ];

    let listings = fetch_all(sources, &criteria).await;
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].source, Source::RentCast);
}

#[tokio::test]
async fn all_sources_failing_still_yields_a_valid_empty_report() -> Result<()> {
    let criteria = SearchCriteria::default();
    let sources: Vec<Box<dyn ListingSource>> = vec![
        Box::new(DownSource(Source::RentCast)),
        Box::new(DownSource(Source::Zillow)),
        Box::new(DownSource(Source::Redfin)),
    ];

    let listings = fetch_all(sources, &criteria).await;
    assert!(listings.is_empty());

    let out_dir = tempdir()?;
    let mut config = AppConfig::default();
    config.output.dir = out_dir.path().to_path_buf();

    let now = fixed_now();
    let aggregated = Aggregator::new(&config.dedup).aggregate(listings);
    let entries =
        Scorer::new(config.weights.clone(), config.scorer.clone(), now).score_batch(aggregated.listings);
    assert!(entries.is_empty());

    // An empty result is not an error: the report is still written.
    let artifacts = report::write_report(&entries, &config.search, &config.output, now)?;
    assert!(artifacts.dashboard.exists());
    let export: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&artifacts.data)?)?;
    assert_eq!(export["total_listings"], 0);

    Ok(())
}

#[tokio::test]
async fn cross_source_duplicates_collapse_after_fan_out() {
    let criteria = SearchCriteria::default();
    let mut rentcast_listing = canned_listing("rc_9", Source::RentCast, "123 Main St Apt 4");
    rentcast_listing.price = 3000;
    let mut zillow_listing = canned_listing("zl_9", Source::Zillow, "123 main street #4");
    zillow_listing.price = 3050;

    let sources: Vec<Box<dyn ListingSource>> = vec![
        Box::new(CannedSource(Source::RentCast, vec![rentcast_listing])),
        Box::new(CannedSource(Source::Zillow, vec![zillow_listing])),
    ];

    let listings = fetch_all(sources, &criteria).await;
    assert_eq!(listings.len(), 2);

    let config = AppConfig::default();
    let aggregated = Aggregator::new(&config.dedup).aggregate(listings);
    assert_eq!(aggregated.listings.len(), 1);
    assert_eq!(aggregated.duplicates_dropped, 1);
}
