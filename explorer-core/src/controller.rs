//! Orchestrates the provider lookups for one exploration view.
//!
//! Each change to the center or the filters starts a refresh cycle: the
//! label, place and weather lookups run concurrently and their outcomes are
//! merged into the owned [`ExplorationState`] in a single step. Cycles carry
//! a sequence number; a cycle that settles after a newer one has started is
//! discarded wholesale, so a slow early response can never overwrite a
//! faster later one.

use crate::{
    config::Config,
    error::{ErrorInfo, LookupError},
    model::{Coordinate, ExplorationState, FilterOptions},
    provider::{self, GeocodingProvider, PlacesProvider, WeatherProvider},
};
use anyhow::Result;
use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
};
use tracing::{debug, warn};

/// How a refresh cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cycle's results were merged into the state.
    Applied,
    /// The place lookup failed; the previous results were kept and a
    /// user-facing error recorded.
    Failed,
    /// A newer cycle started while this one was in flight; its results were
    /// discarded.
    Superseded,
}

/// Owns the exploration state and drives the three providers.
#[derive(Debug)]
pub struct ExplorerController {
    geocoding: Box<dyn GeocodingProvider>,
    places: Box<dyn PlacesProvider>,
    weather: Box<dyn WeatherProvider>,
    state: Mutex<ExplorationState>,
    filters: Mutex<FilterOptions>,
    /// Sequence number of the most recently started cycle.
    cycles: AtomicU64,
}

impl ExplorerController {
    pub fn new(
        geocoding: Box<dyn GeocodingProvider>,
        places: Box<dyn PlacesProvider>,
        weather: Box<dyn WeatherProvider>,
    ) -> Self {
        Self {
            geocoding,
            places,
            weather,
            state: Mutex::new(ExplorationState::default()),
            filters: Mutex::new(FilterOptions::default()),
            cycles: AtomicU64::new(0),
        }
    }

    /// Wire the concrete providers from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let (geocoding, places, weather) = provider::stack_from_config(config)?;
        Ok(Self::new(Box::new(geocoding), Box::new(places), Box::new(weather)))
    }

    /// A complete copy of the current state. Readers only ever see a fully
    /// merged state, never a half-applied one.
    pub fn snapshot(&self) -> ExplorationState {
        self.state_guard().clone()
    }

    pub fn filters(&self) -> FilterOptions {
        self.filters_guard().clone()
    }

    /// Recenter the view and refresh with the current filters.
    pub async fn set_center(&self, center: Coordinate) -> RefreshOutcome {
        let filters = self.filters();
        self.refresh(center, filters).await
    }

    /// Replace the filter state and refresh the current center.
    pub async fn set_filters(&self, filters: FilterOptions) -> RefreshOutcome {
        let filters = filters.clamped();
        *self.filters_guard() = filters.clone();
        let center = self.state_guard().center;
        self.refresh(center, filters).await
    }

    /// Re-run the cycle for the current `(center, filters)` pair. Covers the
    /// initial population and user retries after a failure.
    pub async fn refresh_current(&self) -> RefreshOutcome {
        let center = self.state_guard().center;
        let filters = self.filters();
        self.refresh(center, filters).await
    }

    /// Resolve a free-text query and recenter on its best candidate.
    ///
    /// Runs outside any refresh cycle: a failed search never disturbs the
    /// current results, it only records a user-facing error. On success the
    /// candidate's position becomes the new center, which starts a refresh
    /// cycle, and the coordinate is returned so the search surface can clear
    /// its input.
    pub async fn search(&self, query: &str) -> Result<Coordinate, LookupError> {
        match self.geocoding.forward_geocode(query).await {
            Ok(candidates) => {
                // Best match first by convention.
                let Some(hit) = candidates.into_iter().next() else {
                    self.state_guard().error = Some(ErrorInfo::LocationNotFound);
                    return Err(LookupError::NotFound);
                };
                self.set_center(hit.position).await;
                Ok(hit.position)
            }
            Err(LookupError::NotFound) => {
                debug!(query, "no geocoding candidates");
                self.state_guard().error = Some(ErrorInfo::LocationNotFound);
                Err(LookupError::NotFound)
            }
            Err(err) => {
                warn!(query, error = %err, "forward geocoding failed");
                self.state_guard().error = Some(ErrorInfo::SearchFailed);
                Err(err)
            }
        }
    }

    /// One refresh cycle for `(center, filters)`.
    async fn refresh(&self, center: Coordinate, filters: FilterOptions) -> RefreshOutcome {
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state_guard();
            state.center = center;
            state.loading = true;
            state.error = None;
        }
        debug!(cycle, lat = center.lat, lon = center.lon, "starting refresh cycle");

        let label_lookup = self.geocoding.reverse_geocode(center);
        let places_lookup = self.places.find_nearby(center, &filters);

        // Weather filtered out means no adapter call at all.
        let (label, places, weather) = if filters.show_weather {
            let (label, places, weather) =
                tokio::join!(label_lookup, places_lookup, self.weather.current_by_coords(center));
            (label, places, Some(weather))
        } else {
            let (label, places) = tokio::join!(label_lookup, places_lookup);
            (label, places, None)
        };

        let mut state = self.state_guard();
        if cycle != self.cycles.load(Ordering::SeqCst) {
            debug!(cycle, "discarding superseded cycle");
            return RefreshOutcome::Superseded;
        }

        state.loading = false;

        // Places are the primary content: their failure fails the whole
        // cycle and the previous results stay visible.
        let places = match places {
            Ok(places) => places,
            Err(err) => {
                warn!(cycle, error = %err, "places lookup failed");
                state.error = Some(ErrorInfo::FetchFailed);
                return RefreshOutcome::Failed;
            }
        };

        state.places = places;
        state.label = match label {
            Ok(label) => Some(label),
            Err(err) => {
                warn!(cycle, error = %err, "label lookup failed");
                None
            }
        };
        state.weather = match weather {
            Some(Ok(snapshot)) => Some(snapshot),
            Some(Err(err)) => {
                warn!(cycle, error = %err, "weather lookup failed");
                None
            }
            None => None,
        };
        state.error = None;

        RefreshOutcome::Applied
    }

    fn state_guard(&self) -> MutexGuard<'_, ExplorationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn filters_guard(&self) -> MutexGuard<'_, FilterOptions> {
        self.filters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
