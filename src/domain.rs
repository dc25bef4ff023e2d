use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{REDFIN_SOURCE, RENTCAST_SOURCE, ZILLOW_SOURCE};
use crate::error::{RadarError, Result};

/// Listing provenance. Retained through the whole pipeline so the dashboard
/// can attribute and filter by origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    RentCast,
    Zillow,
    Redfin,
}

impl Source {
    pub fn id(&self) -> &'static str {
        match self {
            Source::RentCast => RENTCAST_SOURCE,
            Source::Zillow => ZILLOW_SOURCE,
            Source::Redfin => REDFIN_SOURCE,
        }
    }

    /// Fixed priority used to break ties when selecting a duplicate-group
    /// survivor. Lower wins.
    pub fn dedup_priority(&self) -> u8 {
        match self {
            Source::RentCast => 0,
            Source::Redfin => 1,
            Source::Zillow => 2,
        }
    }

    pub fn parse(id: &str) -> Option<Source> {
        match id.trim().to_lowercase().as_str() {
            RENTCAST_SOURCE => Some(Source::RentCast),
            ZILLOW_SOURCE => Some(Source::Zillow),
            REDFIN_SOURCE => Some(Source::Redfin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Laundry situation as reported by the source's amenity vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Laundry {
    InUnit,
    OnSite,
    None,
}

/// Tri-state amenity flags derived from source-specific fields. `None`
/// means the source said nothing, which scoring must treat as unknown
/// rather than absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFlags {
    pub pet_friendly: Option<bool>,
    pub parking: Option<bool>,
    pub laundry: Option<Laundry>,
}

/// Normalized listing from any source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub source: Source,
    /// Street line as reported by the source. Dedup normalizes a copy of
    /// this; the stored value stays presentable.
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    /// Monthly rent in whole dollars.
    pub price: u32,
    pub bedrooms: u32,
    pub bathrooms: Option<f64>,
    pub size_sqft: Option<u32>,
    pub amenities: Vec<String>,
    pub listed_date: Option<DateTime<Utc>>,
    /// Direct link to the original listing. Required: the dashboard shows
    /// pointers back to the source, never scraped content.
    pub url: String,
    pub image_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Walk/transit score on a 0-100 scale, when the source reports one.
    pub walk_score: Option<f64>,
    pub property_type: Option<String>,
    pub photos_count: u32,
    pub flags: ListingFlags,
}

impl Listing {
    /// Checks the invariants every record must satisfy before it may enter
    /// the pipeline. Violations are reported, and the aggregator drops the
    /// record rather than aborting the batch.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(RadarError::MissingField(format!(
                "url (listing {} from {})",
                self.id, self.source
            )));
        }
        if self.price == 0 {
            return Err(RadarError::MissingField(format!(
                "price (listing {} from {})",
                self.id, self.source
            )));
        }
        if self.address.trim().is_empty() {
            return Err(RadarError::MissingField(format!(
                "address (listing {} from {})",
                self.id, self.source
            )));
        }
        Ok(())
    }

    /// Number of optional fields the source actually populated. Used to
    /// pick the most complete record as a duplicate group's survivor.
    pub fn completeness(&self) -> u32 {
        let mut count = 0;
        count += self.bathrooms.is_some() as u32;
        count += self.size_sqft.is_some() as u32;
        count += self.listed_date.is_some() as u32;
        count += self.image_url.is_some() as u32;
        count += self.latitude.is_some() as u32;
        count += self.longitude.is_some() as u32;
        count += self.walk_score.is_some() as u32;
        count += self.property_type.is_some() as u32;
        count += !self.amenities.is_empty() as u32;
        count += (self.photos_count > 0) as u32;
        count += self.flags.pet_friendly.is_some() as u32;
        count += self.flags.parking.is_some() as u32;
        count += self.flags.laundry.is_some() as u32;
        count
    }

    /// Whole days since the listing went up, relative to an explicit `now`
    /// so scoring stays reproducible.
    pub fn days_on_market(&self, now: DateTime<Utc>) -> Option<i64> {
        self.listed_date
            .map(|listed| (now - listed).num_days().max(0))
    }
}

/// A listing augmented with its computed quality score and display tags.
/// Produced by the scorer, consumed only by the report renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardEntry {
    #[serde(flatten)]
    pub listing: Listing,
    /// Weighted quality score, 0-100.
    pub score: u8,
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_listing() -> Listing {
        Listing {
            id: "rc_1".into(),
            source: Source::RentCast,
            address: "123 Main St".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            zip_code: "94110".into(),
            price: 3000,
            bedrooms: 2,
            bathrooms: None,
            size_sqft: None,
            amenities: Vec::new(),
            listed_date: None,
            url: "https://example.com/listing/1".into(),
            image_url: None,
            latitude: None,
            longitude: None,
            walk_score: None,
            property_type: None,
            photos_count: 0,
            flags: ListingFlags::default(),
        }
    }

    #[test]
    fn validate_accepts_minimal_listing() {
        assert!(minimal_listing().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_url() {
        let mut listing = minimal_listing();
        listing.url = "  ".into();
        assert!(matches!(
            listing.validate(),
            Err(RadarError::MissingField(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_price() {
        let mut listing = minimal_listing();
        listing.price = 0;
        assert!(listing.validate().is_err());
    }

    #[test]
    fn completeness_counts_populated_optionals() {
        let mut listing = minimal_listing();
        assert_eq!(listing.completeness(), 0);

        listing.size_sqft = Some(900);
        listing.flags.pet_friendly = Some(false);
        listing.photos_count = 4;
        assert_eq!(listing.completeness(), 3);
    }

    #[test]
    fn source_priority_is_rentcast_redfin_zillow() {
        assert!(Source::RentCast.dedup_priority() < Source::Redfin.dedup_priority());
        assert!(Source::Redfin.dedup_priority() < Source::Zillow.dedup_priority());
    }
}
