use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::SearchCriteria;
use crate::constants::{REQUEST_TIMEOUT_SECS, ZILLOW_RAPIDAPI_HOST, ZILLOW_SOURCE};
use crate::domain::{Listing, ListingFlags, Source};
use crate::error::{RadarError, Result};
use crate::sources::{parse_listed_date, ListingSource};

/// Adapter for the Zillow listings API hosted on RapidAPI
/// (`zillow-com1.p.rapidapi.com`).
pub struct ZillowSource {
    client: Client,
    api_key: String,
}

impl ZillowSource {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    fn unavailable(message: String) -> RadarError {
        RadarError::SourceUnavailable {
            source_id: ZILLOW_SOURCE,
            message,
        }
    }

    fn map_listing(&self, item: &Value, criteria: &SearchCriteria) -> Result<Listing> {
        let zpid = item["zpid"]
            .as_str()
            .map(str::to_string)
            .or_else(|| item["zpid"].as_i64().map(|n| n.to_string()))
            .ok_or_else(|| RadarError::MissingField("zpid".into()))?;

        let price = item["price"]
            .as_f64()
            .filter(|p| *p > 0.0)
            .ok_or_else(|| RadarError::MissingField("price".into()))?;

        let bedrooms = item["bedrooms"]
            .as_f64()
            .ok_or_else(|| RadarError::MissingField("bedrooms".into()))?;

        // detailUrl is usually relative; fall back to building one from the
        // zpid so the listing always carries an outbound link.
        let url = match item["detailUrl"].as_str() {
            Some(u) if u.starts_with("http") => u.to_string(),
            Some(u) if !u.is_empty() => format!("https://www.zillow.com{u}"),
            _ => format!("https://www.zillow.com/homedetails/{zpid}_zpid/"),
        };

        let address = item["address"].as_str().unwrap_or_default();
        // The search endpoint returns the full "street, city, ST zip" line;
        // keep only the street segment for the address field.
        let street = address.split(',').next().unwrap_or(address).trim();

        Ok(Listing {
            id: format!("zl_{zpid}"),
            source: Source::Zillow,
            address: street.to_string(),
            city: criteria.city.clone(),
            state: criteria.state.clone(),
            zip_code: item["zipcode"]
                .as_str()
                .map(str::to_string)
                .or_else(|| item["zipcode"].as_i64().map(|z| z.to_string()))
                .unwrap_or_default(),
            price: price.round() as u32,
            bedrooms: bedrooms.round() as u32,
            bathrooms: item["bathrooms"].as_f64(),
            size_sqft: item["livingArea"].as_f64().map(|s| s.round() as u32),
            // Zillow's search results carry no amenity data; the flags stay
            // unknown rather than false.
            amenities: Vec::new(),
            listed_date: item["datePosted"].as_str().and_then(parse_listed_date),
            url,
            image_url: item["imgSrc"].as_str().map(str::to_string),
            latitude: item["latitude"].as_f64(),
            longitude: item["longitude"].as_f64(),
            walk_score: item["walkScore"].as_f64(),
            property_type: item["propertyType"].as_str().map(str::to_string),
            photos_count: item["carouselPhotos"]
                .as_array()
                .map(|p| p.len() as u32)
                .unwrap_or(0),
            flags: ListingFlags::default(),
        })
    }
}

#[async_trait::async_trait]
impl ListingSource for ZillowSource {
    fn source(&self) -> Source {
        Source::Zillow
    }

    #[instrument(skip(self, criteria))]
    async fn fetch(&self, criteria: &SearchCriteria) -> Result<Vec<Listing>> {
        let mut params: Vec<(&str, String)> = vec![
            (
                "location",
                format!("{}, {}", criteria.city, criteria.state),
            ),
            ("status_type", "ForRent".to_string()),
            ("beds_min", criteria.bedrooms.to_string()),
            ("beds_max", criteria.bedrooms.to_string()),
            ("sort", "Newest".to_string()),
        ];
        if let Some(max) = criteria.max_price {
            params.push(("price_max", max.to_string()));
        }
        if let Some(min) = criteria.min_price {
            params.push(("price_min", min.to_string()));
        }

        let response = self
            .client
            .get(format!(
                "https://{ZILLOW_RAPIDAPI_HOST}/propertyExtendedSearch"
            ))
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", ZILLOW_RAPIDAPI_HOST)
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

        let mut listings = Vec::new();
        for item in data["props"].as_array().map(Vec::as_slice).unwrap_or_default() {
            match self.map_listing(item, criteria) {
                Ok(listing) => listings.push(listing),
                Err(e) => debug!("skipping zillow record: {e}"),
            }
        }

        info!(count = listings.len(), "fetched zillow listings");
        Ok(listings)
    }
}
