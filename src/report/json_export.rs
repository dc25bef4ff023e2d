use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::config::SearchCriteria;
use crate::domain::DashboardEntry;
use crate::error::Result;

/// Machine-readable snapshot of one run. Strictly an output: the next run
/// starts from scratch and never reads this back.
#[derive(Debug, Serialize)]
struct RunExport<'a> {
    generated_at: DateTime<Utc>,
    search: &'a SearchCriteria,
    total_listings: usize,
    listings: &'a [DashboardEntry],
}

pub fn write_export(
    path: &Path,
    entries: &[DashboardEntry],
    criteria: &SearchCriteria,
    generated_at: DateTime<Utc>,
) -> Result<()> {
    let export = RunExport {
        generated_at,
        search: criteria,
        total_listings: entries.len(),
        listings: entries,
    };
    fs::write(path, serde_json::to_string_pretty(&export)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Listing, ListingFlags, Source};

    fn entry(id: &str, score: u8) -> DashboardEntry {
        DashboardEntry {
            listing: Listing {
                id: id.to_string(),
                source: Source::RentCast,
                address: "123 Main St".into(),
                city: "San Francisco".into(),
                state: "CA".into(),
                zip_code: "94114".into(),
                price: 3000,
                bedrooms: 3,
                bathrooms: None,
                size_sqft: Some(1000),
                amenities: vec!["Gym".into()],
                listed_date: None,
                url: format!("https://example.com/{id}"),
                image_url: None,
                latitude: None,
                longitude: None,
                walk_score: None,
                property_type: None,
                photos_count: 5,
                flags: ListingFlags::default(),
            },
            score,
            tags: vec!["Great Value".into()],
        }
    }

    #[test]
    fn export_round_trips_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.json");
        let entries = vec![entry("rc_1", 82), entry("rc_2", 61)];

        write_export(&path, &entries, &SearchCriteria::default(), Utc::now()).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["total_listings"], 2);
        assert_eq!(parsed["listings"][0]["id"], "rc_1");
        assert_eq!(parsed["listings"][0]["score"], 82);
        assert_eq!(parsed["listings"][0]["source"], "rentcast");
        assert_eq!(parsed["search"]["city"], "San Francisco");
    }

    #[test]
    fn empty_batch_still_exports_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.json");

        write_export(&path, &[], &SearchCriteria::default(), Utc::now()).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["total_listings"], 0);
        assert!(parsed["listings"].as_array().unwrap().is_empty());
    }
}
