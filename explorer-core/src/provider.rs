use crate::{
    config::Config,
    error::LookupError,
    model::{Coordinate, FilterOptions, GeocodedPlace, LocationLabel, PlaceResult, WeatherSnapshot},
    provider::{
        foursquare::FoursquareProvider, nominatim::NominatimProvider,
        openweather::OpenWeatherProvider,
    },
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

pub mod foursquare;
pub mod nominatim;
pub mod openweather;

/// User agent attached to every outgoing request.
pub(crate) const USER_AGENT: &str = concat!("map-explorer/", env!("CARGO_PKG_VERSION"));

/// Translates free-text queries and point lookups into normalized location
/// data.
#[async_trait]
pub trait GeocodingProvider: Send + Sync + Debug {
    /// Resolve a free-text query into candidate locations, best match
    /// first. Zero candidates is reported as [`LookupError::NotFound`].
    async fn forward_geocode(&self, query: &str) -> Result<Vec<GeocodedPlace>, LookupError>;

    /// Resolve a point into a display label. An upstream success without
    /// address detail yields an empty label, not an error.
    async fn reverse_geocode(&self, point: Coordinate) -> Result<LocationLabel, LookupError>;
}

/// Translates a point plus filter state into normalized nearby places.
#[async_trait]
pub trait PlacesProvider: Send + Sync + Debug {
    /// Places near `point`, in upstream ranking order. An empty list is a
    /// valid result, not an error.
    async fn find_nearby(
        &self,
        point: Coordinate,
        filters: &FilterOptions,
    ) -> Result<Vec<PlaceResult>, LookupError>;
}

/// Translates a point into normalized current conditions.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_by_coords(&self, point: Coordinate) -> Result<WeatherSnapshot, LookupError>;
}

/// Construct the three concrete providers from config.
pub fn stack_from_config(
    config: &Config,
) -> Result<(NominatimProvider, FoursquareProvider, OpenWeatherProvider)> {
    let timeout = config.request_timeout();

    let geocoding = NominatimProvider::new(config.require_contact_email()?.to_owned(), timeout)?;
    let places = FoursquareProvider::new(config.require_places_api_key()?.to_owned(), timeout)?;
    let weather = OpenWeatherProvider::new(config.require_weather_api_key()?.to_owned(), timeout)?;

    Ok((geocoding, places, weather))
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
