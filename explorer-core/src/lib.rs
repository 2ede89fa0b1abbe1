//! Aggregation core for the interactive map explorer.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Adapters over the geocoding, place-search and weather providers
//! - The controller that merges their results into one exploration state
//! - Pure presentation helpers for map markers and popups
//!
//! Rendering surfaces (map widget, filter panel, search box) consume this
//! crate; they are not part of it.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod presenter;
pub mod provider;

pub use config::Config;
pub use controller::{ExplorerController, RefreshOutcome};
pub use error::{ErrorInfo, LookupError};
pub use model::{
    Coordinate, DEFAULT_CENTER, ExplorationState, FilterOptions, GeocodedPlace, LocationLabel,
    PlaceResult, WeatherSnapshot,
};
pub use presenter::{IconSpec, Marker, PopupContent, icon_for, markers_for, popup_content_for};
pub use provider::{GeocodingProvider, PlacesProvider, WeatherProvider};
