use anyhow::Result;
use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION},
};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    error::LookupError,
    model::{Coordinate, FilterOptions, PlaceResult},
    provider::{PlacesProvider, http_client, truncate_body},
};

const BASE_URL: &str = "https://api.foursquare.com/v3/places";

/// How many places one nearby search asks for.
const RESULT_LIMIT: u32 = 10;

/// Foursquare Places v3 client. The credential travels as a bearer value in
/// the `Authorization` header.
#[derive(Debug, Clone)]
pub struct FoursquareProvider {
    api_key: String,
    http: Client,
}

impl FoursquareProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        Ok(Self { api_key, http: http_client(timeout)? })
    }
}

#[async_trait]
impl PlacesProvider for FoursquareProvider {
    async fn find_nearby(
        &self,
        point: Coordinate,
        filters: &FilterOptions,
    ) -> Result<Vec<PlaceResult>, LookupError> {
        let ll = format!("{},{}", point.lat, point.lon);
        debug!(ll = %ll, radius = filters.radius_m, "searching nearby places");

        let mut request = self
            .http
            .get(format!("{BASE_URL}/search"))
            .query(&[("ll", ll.as_str())])
            .query(&[("radius", filters.radius_m), ("limit", RESULT_LIMIT)])
            .header(AUTHORIZATION, self.api_key.as_str())
            .header(ACCEPT, "application/json");

        // The joined names form a relevance query the upstream matches its
        // own way; this is not an exact category filter.
        if !filters.categories.is_empty() {
            request = request.query(&[("query", filters.categories.join(","))]);
        }

        let res = request
            .send()
            .await
            .map_err(|e| LookupError::upstream(format!("Failed to reach Foursquare: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            LookupError::upstream(format!("Failed to read Foursquare response body: {e}"))
        })?;

        if !status.is_success() {
            // Credential rejections land here as 401/403.
            return Err(LookupError::upstream(format!(
                "Foursquare search failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        let parsed: FsqSearchResponse = serde_json::from_str(&body)
            .map_err(|e| LookupError::upstream(format!("Failed to parse Foursquare JSON: {e}")))?;

        parsed.results.into_iter().map(place_from_record).collect()
    }
}

#[derive(Debug, Deserialize)]
struct FsqSearchResponse {
    #[serde(default)]
    results: Vec<FsqPlace>,
}

#[derive(Debug, Deserialize)]
struct FsqPlace {
    fsq_id: String,
    name: String,
    geocodes: FsqGeocodes,
    location: Option<FsqLocation>,
    #[serde(default)]
    categories: Vec<FsqCategory>,
}

#[derive(Debug, Deserialize)]
struct FsqGeocodes {
    main: FsqPoint,
}

#[derive(Debug, Deserialize)]
struct FsqPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct FsqLocation {
    address: Option<String>,
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FsqCategory {
    name: String,
}

fn place_from_record(record: FsqPlace) -> Result<PlaceResult, LookupError> {
    let FsqPoint { latitude, longitude } = record.geocodes.main;
    let position = Coordinate::new(latitude, longitude).ok_or_else(|| {
        LookupError::upstream(format!(
            "Foursquare returned out-of-range coordinates for '{}': {latitude}, {longitude}",
            record.fsq_id,
        ))
    })?;

    // The formatted form already folds in locality and postcode; prefer it.
    let address = record.location.and_then(|loc| loc.formatted_address.or(loc.address));

    Ok(PlaceResult {
        id: record.fsq_id,
        name: record.name,
        position,
        address,
        categories: record.categories.into_iter().map(|c| c.name).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Vec<FsqPlace> {
        let parsed: FsqSearchResponse = serde_json::from_str(body).expect("fixture should parse");
        parsed.results
    }

    #[test]
    fn records_map_in_upstream_order_with_ids() {
        let body = r#"{
            "results": [
                {
                    "fsq_id": "5a1",
                    "name": "Bar Cañete",
                    "geocodes": { "main": { "latitude": 41.3795, "longitude": 2.1743 } },
                    "location": {
                        "address": "Carrer de la Unió, 17",
                        "formatted_address": "Carrer de la Unió, 17, 08001 Barcelona"
                    },
                    "categories": [
                        { "id": 13027, "name": "Restaurant" },
                        { "id": 13003, "name": "Bar" }
                    ]
                },
                {
                    "fsq_id": "5b2",
                    "name": "Hotel 1898",
                    "geocodes": { "main": { "latitude": 41.3829, "longitude": 2.1712 } },
                    "location": { "address": "La Rambla, 109" },
                    "categories": [ { "id": 19014, "name": "Hotel" } ]
                }
            ]
        }"#;

        let places: Vec<PlaceResult> = parse(body)
            .into_iter()
            .map(place_from_record)
            .collect::<Result<_, _>>()
            .expect("mapping should succeed");

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].id, "5a1");
        assert_eq!(places[1].id, "5b2");
        assert_eq!(places[0].categories, vec!["Restaurant", "Bar"]);

        // Prefer the formatted address, fall back to the bare one.
        assert_eq!(places[0].address.as_deref(), Some("Carrer de la Unió, 17, 08001 Barcelona"));
        assert_eq!(places[1].address.as_deref(), Some("La Rambla, 109"));
    }

    #[test]
    fn missing_location_and_categories_are_tolerated() {
        let body = r#"{
            "results": [
                {
                    "fsq_id": "5c3",
                    "name": "Unnamed kiosk",
                    "geocodes": { "main": { "latitude": 41.38, "longitude": 2.17 } }
                }
            ]
        }"#;

        let place = place_from_record(parse(body).remove(0)).expect("mapping should succeed");
        assert_eq!(place.address, None);
        assert!(place.categories.is_empty());
    }

    #[test]
    fn empty_result_list_is_a_valid_empty_response() {
        assert!(parse(r#"{ "results": [] }"#).is_empty());
        assert!(parse("{}").is_empty());
    }

    #[test]
    fn out_of_range_coordinates_are_an_upstream_failure() {
        let body = r#"{
            "results": [
                {
                    "fsq_id": "5d4",
                    "name": "Glitch",
                    "geocodes": { "main": { "latitude": 241.38, "longitude": 2.17 } }
                }
            ]
        }"#;

        let err = place_from_record(parse(body).remove(0)).unwrap_err();
        assert!(matches!(err, LookupError::Upstream(_)));
    }
}
