use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    error::LookupError,
    model::{Coordinate, GeocodedPlace, LocationLabel},
    provider::{GeocodingProvider, http_client, truncate_body},
};

const BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// OpenStreetMap Nominatim client.
///
/// The service is keyless but requires a contact identifier on every call,
/// sent here as the `email` parameter.
#[derive(Debug, Clone)]
pub struct NominatimProvider {
    contact_email: String,
    http: Client,
}

impl NominatimProvider {
    pub fn new(contact_email: String, timeout: Duration) -> Result<Self> {
        Ok(Self { contact_email, http: http_client(timeout)? })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, LookupError> {
        let res = self
            .http
            .get(url)
            .query(query)
            .query(&[
                ("format", "json"),
                ("addressdetails", "1"),
                ("email", self.contact_email.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LookupError::upstream(format!("Failed to reach Nominatim: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            LookupError::upstream(format!("Failed to read Nominatim response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(LookupError::upstream(format!(
                "Nominatim request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| LookupError::upstream(format!("Failed to parse Nominatim JSON: {e}")))
    }
}

#[async_trait]
impl GeocodingProvider for NominatimProvider {
    async fn forward_geocode(&self, query: &str) -> Result<Vec<GeocodedPlace>, LookupError> {
        debug!(query, "forward geocoding");

        let url = format!("{BASE_URL}/search");
        let records: Vec<NomRecord> = self.get_json(&url, &[("q", query)]).await?;

        candidates_from_records(records)
    }

    async fn reverse_geocode(&self, point: Coordinate) -> Result<LocationLabel, LookupError> {
        debug!(lat = point.lat, lon = point.lon, "reverse geocoding");

        let lat = point.lat.to_string();
        let lon = point.lon.to_string();
        let url = format!("{BASE_URL}/reverse");
        let record: NomReverseRecord =
            self.get_json(&url, &[("lat", lat.as_str()), ("lon", lon.as_str())]).await?;

        Ok(label_from_address(record.address))
    }
}

// Nominatim serializes coordinates as strings.
#[derive(Debug, Deserialize)]
struct NomRecord {
    lat: String,
    lon: String,
    address: Option<NomAddress>,
}

#[derive(Debug, Deserialize)]
struct NomAddress {
    city: Option<String>,
    country: Option<String>,
}

/// Reverse lookups answer with a single record. A point without address
/// detail (open sea, poles) still comes back as a success body.
#[derive(Debug, Deserialize)]
struct NomReverseRecord {
    address: Option<NomAddress>,
}

fn candidates_from_records(records: Vec<NomRecord>) -> Result<Vec<GeocodedPlace>, LookupError> {
    if records.is_empty() {
        return Err(LookupError::NotFound);
    }

    records
        .into_iter()
        .map(|record| {
            let (Ok(lat), Ok(lon)) = (record.lat.parse::<f64>(), record.lon.parse::<f64>()) else {
                return Err(LookupError::upstream(format!(
                    "Nominatim returned unparsable coordinates: {}, {}",
                    record.lat, record.lon,
                )));
            };

            let position = Coordinate::new(lat, lon).ok_or_else(|| {
                LookupError::upstream(format!(
                    "Nominatim returned out-of-range coordinates: {lat}, {lon}"
                ))
            })?;

            Ok(GeocodedPlace { position, label: label_from_address(record.address) })
        })
        .collect()
}

fn label_from_address(address: Option<NomAddress>) -> LocationLabel {
    match address {
        Some(addr) => LocationLabel { city: addr.city, country: addr.country },
        None => LocationLabel::default(),
    }
}
