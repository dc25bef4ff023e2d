use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::SearchCriteria;
use crate::constants::{
    PER_SOURCE_LIMIT, REDFIN_FALLBACK_REGION_ID, REDFIN_RAPIDAPI_HOST, REDFIN_SOURCE,
    REQUEST_TIMEOUT_SECS,
};
use crate::domain::{Listing, ListingFlags, Source};
use crate::error::{RadarError, Result};
use crate::sources::{parse_listed_date, ListingSource};

/// Adapter for the Redfin listings API hosted on RapidAPI
/// (`redfin-com.p.rapidapi.com`). Fetching is two-step: resolve the city
/// to a region id, then search rentals within that region.
pub struct RedfinSource {
    client: Client,
    api_key: String,
}

impl RedfinSource {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    fn unavailable(message: String) -> RadarError {
        RadarError::SourceUnavailable {
            source_id: REDFIN_SOURCE,
            message,
        }
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let response = self
            .client
            .get(format!("https://{REDFIN_RAPIDAPI_HOST}/{path}"))
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", REDFIN_RAPIDAPI_HOST)
            .query(params)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| Self::unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::unavailable(format!("HTTP {}", response.status())));
        }

        response
            .json()
            .await
            .map_err(|e| Self::unavailable(format!("invalid JSON response: {e}")))
    }

    async fn resolve_region_id(&self, criteria: &SearchCriteria) -> String {
        let location = format!("{}, {}", criteria.city, criteria.state);
        let lookup = self
            .get("auto-complete", &[("location", location)])
            .await
            .ok();

        let region_id = lookup.as_ref().and_then(|data| {
            let regions = data["data"]["regions"]
                .as_array()
                .or_else(|| data.as_array())?;
            regions.iter().find_map(|region| {
                region["id"]
                    .as_str()
                    .map(str::to_string)
                    .or_else(|| region["id"].as_i64().map(|n| n.to_string()))
            })
        });

        match region_id {
            Some(id) => id,
            None => {
                debug!("region lookup failed, using fallback region id");
                REDFIN_FALLBACK_REGION_ID.to_string()
            }
        }
    }

    /// Redfin wraps listing data unevenly: sometimes under `homeData`,
    /// sometimes flat, with price and square footage nested one level
    /// deeper still.
    fn map_listing(&self, item: &Value, criteria: &SearchCriteria) -> Result<Listing> {
        let home = if item["homeData"].is_object() {
            &item["homeData"]
        } else {
            item
        };
        let address_info = &home["addressInfo"];

        let id = home["listingId"]
            .as_str()
            .map(str::to_string)
            .or_else(|| home["listingId"].as_i64().map(|n| n.to_string()))
            .or_else(|| home["propertyId"].as_str().map(str::to_string))
            .or_else(|| home["propertyId"].as_i64().map(|n| n.to_string()))
            .ok_or_else(|| RadarError::MissingField("listingId".into()))?;

        let price = home["priceInfo"]["amount"]
            .as_f64()
            .or_else(|| home["price"]["value"].as_f64())
            .or_else(|| home["price"].as_f64())
            .filter(|p| *p > 0.0)
            .ok_or_else(|| RadarError::MissingField("price".into()))?;

        let bedrooms = home["beds"]
            .as_f64()
            .or_else(|| home["bedrooms"].as_f64())
            .ok_or_else(|| RadarError::MissingField("beds".into()))?;

        let url = match home["url"].as_str() {
            Some(u) if u.starts_with("http") => u.to_string(),
            Some(u) if !u.is_empty() => format!("https://www.redfin.com{u}"),
            _ => return Err(RadarError::MissingField("url".into())),
        };

        let size_sqft = home["sqFt"]["value"]
            .as_f64()
            .or_else(|| home["sqFt"].as_f64())
            .map(|s| s.round() as u32);

        let centroid = &address_info["centroid"]["centroid"];

        Ok(Listing {
            id: format!("rf_{id}"),
            source: Source::Redfin,
            address: address_info["formattedStreetLine"]
                .as_str()
                .or_else(|| home["streetLine"].as_str())
                .unwrap_or_default()
                .to_string(),
            city: address_info["city"]
                .as_str()
                .unwrap_or(&criteria.city)
                .to_string(),
            state: address_info["state"]
                .as_str()
                .unwrap_or(&criteria.state)
                .to_string(),
            zip_code: address_info["zip"]
                .as_str()
                .map(str::to_string)
                .or_else(|| address_info["zip"].as_i64().map(|z| z.to_string()))
                .unwrap_or_default(),
            price: price.round() as u32,
            bedrooms: bedrooms.round() as u32,
            bathrooms: home["baths"].as_f64().or_else(|| home["bathrooms"].as_f64()),
            size_sqft,
            // Search results carry no amenity vocabulary.
            amenities: Vec::new(),
            listed_date: home["listingDate"].as_str().and_then(parse_listed_date),
            url,
            image_url: home["photos"]
                .as_array()
                .and_then(|photos| photos.first())
                .and_then(|photo| photo["photoUrl"].as_str())
                .map(str::to_string),
            latitude: centroid["latitude"]
                .as_f64()
                .or_else(|| home["latitude"].as_f64()),
            longitude: centroid["longitude"]
                .as_f64()
                .or_else(|| home["longitude"].as_f64()),
            walk_score: home["walkScore"].as_f64(),
            property_type: home["propertyType"].as_str().map(str::to_string),
            photos_count: home["photos"].as_array().map(|p| p.len() as u32).unwrap_or(0),
            flags: ListingFlags::default(),
        })
    }
}

#[async_trait::async_trait]
impl ListingSource for RedfinSource {
    fn source(&self) -> Source {
        Source::Redfin
    }

    #[instrument(skip(self, criteria))]
    async fn fetch(&self, criteria: &SearchCriteria) -> Result<Vec<Listing>> {
        let region_id = self.resolve_region_id(criteria).await;

        let mut params: Vec<(&str, String)> = vec![
            ("region_id", region_id),
            ("region_type", "city".to_string()),
            ("status", "For Rent".to_string()),
            ("beds_min", criteria.bedrooms.to_string()),
            ("beds_max", criteria.bedrooms.to_string()),
            ("sort", "redfin-recommended".to_string()),
            ("num_homes", PER_SOURCE_LIMIT.to_string()),
        ];
        if let Some(max) = criteria.max_price {
            params.push(("price_max", max.to_string()));
        }
        if let Some(min) = criteria.min_price {
            params.push(("price_min", min.to_string()));
        }

        let data = self.get("properties/search-rent", &params).await?;

        let homes = data["data"]["homes"]
            .as_array()
            .or_else(|| data["homes"].as_array())
            .or_else(|| data.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut listings = Vec::new();
        for item in homes {
            match self.map_listing(item, criteria) {
                Ok(listing) => listings.push(listing),
                Err(e) => debug!("skipping redfin record: {e}"),
            }
        }

        info!(count = listings.len(), "fetched redfin listings");
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn criteria() -> SearchCriteria {
        SearchCriteria::default()
    }

    #[test]
    fn maps_nested_home_data_record() {
        let source = RedfinSource::new("key".into());
        let item = json!({
            "homeData": {
                "listingId": 5512,
                "url": "/CA/San-Francisco/789-Church-St/home/5512",
                "priceInfo": {"amount": 3900.0},
                "beds": 3,
                "baths": 2.0,
                "sqFt": {"value": 1250},
                "listingDate": "2025-05-15",
                "addressInfo": {
                    "formattedStreetLine": "789 Church St",
                    "city": "San Francisco",
                    "state": "CA",
                    "zip": "94114",
                    "centroid": {"centroid": {"latitude": 37.75, "longitude": -122.43}}
                },
                "photos": [{"photoUrl": "https://img.redfin.com/1.jpg"}]
            }
        });

        let listing = source.map_listing(&item, &criteria()).unwrap();
        assert_eq!(listing.id, "rf_5512");
        assert_eq!(listing.address, "789 Church St");
        assert_eq!(listing.price, 3900);
        assert_eq!(listing.size_sqft, Some(1250));
        assert!(listing.url.starts_with("https://www.redfin.com/CA/"));
        assert_eq!(listing.latitude, Some(37.75));
        assert_eq!(listing.photos_count, 1);
    }

    #[test]
    fn maps_flat_record_with_scalar_price() {
        let source = RedfinSource::new("key".into());
        let item = json!({
            "propertyId": "880",
            "url": "https://www.redfin.com/home/880",
            "price": 2800,
            "bedrooms": 2,
            "streetLine": "22 Hyde St"
        });

        let listing = source.map_listing(&item, &criteria()).unwrap();
        assert_eq!(listing.id, "rf_880");
        assert_eq!(listing.address, "22 Hyde St");
        assert_eq!(listing.price, 2800);
        // City falls back to the search criteria when the record omits it.
        assert_eq!(listing.city, "San Francisco");
    }

    #[test]
    fn record_without_url_is_rejected() {
        let source = RedfinSource::new("key".into());
        let item = json!({"listingId": "1", "price": 2500, "beds": 2});
        assert!(source.map_listing(&item, &criteria()).is_err());
    }
}
