use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorInfo;

/// Smallest search radius accepted for the place lookup, in meters.
pub const RADIUS_MIN_M: u32 = 200;

/// Largest search radius accepted for the place lookup, in meters.
pub const RADIUS_MAX_M: u32 = 5000;

/// Fallback map center shown before any search or selection (Barcelona).
pub const DEFAULT_CENTER: Coordinate = Coordinate { lat: 41.3874, lon: 2.1686 };

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Returns `None` when either component is outside the valid range
    /// (`-90..=90` latitude, `-180..=180` longitude).
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon))
            .then_some(Self { lat, lon })
    }
}

/// Filter state driving the place lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Category names forwarded to the upstream as one comma-joined text
    /// query; empty means no category restriction.
    pub categories: Vec<String>,
    /// Search radius in meters, held within `RADIUS_MIN_M..=RADIUS_MAX_M`.
    pub radius_m: u32,
    pub show_weather: bool,
}

impl FilterOptions {
    pub fn new(categories: Vec<String>, radius_m: u32, show_weather: bool) -> Self {
        Self { categories, radius_m, show_weather }.clamped()
    }

    /// Re-applies the radius bound. Called on every path that accepts
    /// externally built filters, since the fields are freely constructible.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.radius_m = self.radius_m.clamp(RADIUS_MIN_M, RADIUS_MAX_M);
        self
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self { categories: Vec::new(), radius_m: 1000, show_weather: true }
    }
}

/// Display label for a point, derived from reverse geocoding.
///
/// Both fields absent is a valid state: not every point on the map has
/// address detail behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationLabel {
    pub city: Option<String>,
    pub country: Option<String>,
}

impl LocationLabel {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.country.is_none()
    }

    /// `"city, country"` when the city is known, else the country, else the
    /// empty string.
    #[must_use]
    pub fn display(&self) -> String {
        match (&self.city, &self.country) {
            (Some(city), Some(country)) => format!("{city}, {country}"),
            (Some(city), None) => city.clone(),
            (None, Some(country)) => country.clone(),
            (None, None) => String::new(),
        }
    }
}

/// One forward-geocoding candidate: where it is, and what to call it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPlace {
    pub position: Coordinate,
    pub label: LocationLabel,
}

/// One place from the nearby search, normalized from the upstream record.
///
/// `id` is the upstream identifier; two results with the same `id` are the
/// same entity across refreshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    pub id: String,
    pub name: String,
    pub position: Coordinate,
    pub address: Option<String>,
    /// Category names in upstream order; the first one drives the marker
    /// icon.
    pub categories: Vec<String>,
}

/// Current conditions at a point, in metric units.
///
/// Values keep the upstream precision; rounding happens only at
/// presentation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub description: String,
    pub icon_code: String,
    pub observed_at: DateTime<Utc>,
}

/// The consolidated view model for one `(center, filters)` pair.
///
/// Owned by the controller and replaced wholesale on each successful refresh
/// cycle; consumers read cloned snapshots. Process-lifetime only, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationState {
    pub center: Coordinate,
    pub label: Option<LocationLabel>,
    pub places: Vec<PlaceResult>,
    pub weather: Option<WeatherSnapshot>,
    pub loading: bool,
    pub error: Option<ErrorInfo>,
}

impl Default for ExplorationState {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            label: None,
            places: Vec::new(),
            weather: None,
            loading: false,
            error: None,
        }
    }
}
