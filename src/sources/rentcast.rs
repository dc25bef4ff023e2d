use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::SearchCriteria;
use crate::constants::{PER_SOURCE_LIMIT, RENTCAST_BASE_URL, RENTCAST_SOURCE, REQUEST_TIMEOUT_SECS};
use crate::domain::{Laundry, Listing, ListingFlags, Source};
use crate::error::{RadarError, Result};
use crate::sources::{parse_listed_date, ListingSource};

/// Adapter for the RentCast rental listings API
/// (https://api.rentcast.io, `X-Api-Key` auth).
pub struct RentCastSource {
    client: Client,
    api_key: String,
}

impl RentCastSource {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    fn unavailable(message: String) -> RadarError {
        RadarError::SourceUnavailable {
            source_id: RENTCAST_SOURCE,
            message,
        }
    }

    /// Map one RentCast record into the canonical schema. Records missing
    /// a required field are reported and skipped by the caller.
    fn map_listing(&self, item: &Value) -> Result<Listing> {
        let id = item["id"]
            .as_str()
            .map(str::to_string)
            .or_else(|| item["id"].as_i64().map(|n| n.to_string()))
            .ok_or_else(|| RadarError::MissingField("id".into()))?;

        let price = item["price"]
            .as_f64()
            .filter(|p| *p > 0.0)
            .ok_or_else(|| RadarError::MissingField("price".into()))?;

        let bedrooms = item["bedrooms"]
            .as_f64()
            .ok_or_else(|| RadarError::MissingField("bedrooms".into()))?;

        let url = item["listingUrl"]
            .as_str()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| RadarError::MissingField("listingUrl".into()))?;

        let amenities: Vec<String> = item["amenities"]
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let listed_date = item["listedDate"]
            .as_str()
            .or_else(|| item["createdDate"].as_str())
            .and_then(parse_listed_date);

        Ok(Listing {
            id: format!("rc_{id}"),
            source: Source::RentCast,
            address: item["addressLine1"].as_str().unwrap_or_default().to_string(),
            city: item["city"].as_str().unwrap_or_default().to_string(),
            state: item["state"].as_str().unwrap_or_default().to_string(),
            zip_code: item["zipCode"].as_str().unwrap_or_default().to_string(),
            price: price.round() as u32,
            bedrooms: bedrooms.round() as u32,
            bathrooms: item["bathrooms"].as_f64(),
            size_sqft: item["squareFootage"].as_f64().map(|s| s.round() as u32),
            flags: flags_from_amenities(item, &amenities),
            amenities,
            listed_date,
            url: url.to_string(),
            image_url: item["photoUrl"].as_str().map(str::to_string),
            latitude: item["latitude"].as_f64(),
            longitude: item["longitude"].as_f64(),
            walk_score: item["walkScore"].as_f64(),
            property_type: item["propertyType"].as_str().map(str::to_string),
            photos_count: item["photos"].as_array().map(|p| p.len() as u32).unwrap_or(0),
        })
    }
}

/// RentCast reports amenities as free-form tags; explicit policy booleans
/// win when present, keyword matches set the flag true, and everything
/// else stays unknown.
fn flags_from_amenities(item: &Value, amenities: &[String]) -> ListingFlags {
    let has_keyword = |needles: &[&str]| {
        amenities.iter().any(|a| {
            let lowered = a.to_lowercase();
            needles.iter().any(|needle| lowered.contains(needle))
        })
    };

    let pet_friendly = item["petFriendly"]
        .as_bool()
        .or_else(|| has_keyword(&["pet"]).then_some(true));
    let parking = item["parkingAvailable"]
        .as_bool()
        .or_else(|| has_keyword(&["parking", "garage"]).then_some(true));

    let laundry = if has_keyword(&["in-unit", "washer"]) {
        Some(Laundry::InUnit)
    } else if has_keyword(&["laundry"]) {
        Some(Laundry::OnSite)
    } else {
        None
    };

    ListingFlags {
        pet_friendly,
        parking,
        laundry,
    }
}

#[async_trait::async_trait]
impl ListingSource for RentCastSource {
    fn source(&self) -> Source {
        Source::RentCast
    }

    #[instrument(skip(self, criteria))]
    async fn fetch(&self, criteria: &SearchCriteria) -> Result<Vec<Listing>> {
        let mut params: Vec<(&str, String)> = vec![
            ("city", criteria.city.clone()),
            ("state", criteria.state.clone()),
            ("bedrooms", criteria.bedrooms.to_string()),
            ("status", "Active".to_string()),
            ("limit", PER_SOURCE_LIMIT.to_string()),
        ];
        if let Some(max) = criteria.max_price {
            params.push(("maxPrice", max.to_string()));
        }
        if let Some(min) = criteria.min_price {
            params.push(("minPrice", min.to_string()));
        }

        let response = self
            .client
            .get(format!("{RENTCAST_BASE_URL}/listings/rental/long-term"))
            .header("X-Api-Key", &self.api_key)
            .query(&params)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| Self::unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::unavailable(format!("HTTP {}", response.status())));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| Self::unavailable(format!("invalid JSON response: {e}")))?;

        // The endpoint has returned both a bare array and wrapped shapes.
        let items = if let Some(array) = data.as_array() {
            array.as_slice()
        } else {
            data["listings"]
                .as_array()
                .or_else(|| data["results"].as_array())
                .map(Vec::as_slice)
                .unwrap_or_default()
        };

        let mut listings = Vec::new();
        for item in items {
            match self.map_listing(item) {
                Ok(listing) => listings.push(listing),
                Err(e) => debug!("skipping rentcast record: {e}"),
            }
        }

        info!(count = listings.len(), "fetched rentcast listings");
        Ok(listings)
    }
}
