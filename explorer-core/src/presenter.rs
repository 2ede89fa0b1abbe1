//! Pure mapping from exploration results to marker visuals. No network
//! access, no failure modes.

use crate::model::{Coordinate, ExplorationState, PlaceResult, WeatherSnapshot};
use serde::Serialize;

const FOOD_ICON: &str = "https://static.thenounproject.com/png/1661307-200.png";
const LODGING_ICON: &str = "https://cdn-icons-png.flaticon.com/512/9922/9922103.png";
const ATTRACTION_ICON: &str =
    "https://cdn0.iconfinder.com/data/icons/map-markers-2-1/512/xxx004-512.png";
const GENERIC_ICON: &str = "https://unpkg.com/leaflet@1.9.3/dist/images/marker-icon.png";
const MARKER_SHADOW: &str = "https://unpkg.com/leaflet@1.9.3/dist/images/marker-shadow.png";

/// Leaflet-style marker icon attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IconSpec {
    pub url: &'static str,
    /// Width and height in pixels.
    pub size: (u32, u32),
    /// Offset of the pixel that sits on the coordinate: the bottom center,
    /// so the marker tip and not its middle marks the spot.
    pub anchor: (u32, u32),
    /// Where the popup opens relative to the anchor.
    pub popup_anchor: (i32, i32),
    pub shadow_url: &'static str,
    pub shadow_size: (u32, u32),
    pub shadow_anchor: (u32, u32),
}

impl IconSpec {
    fn sized(url: &'static str, width: u32, height: u32) -> Self {
        Self {
            url,
            size: (width, height),
            anchor: (width / 2, height),
            popup_anchor: (0, -(height as i32)),
            shadow_url: MARKER_SHADOW,
            shadow_size: (41, 41),
            shadow_anchor: (12, 41),
        }
    }
}

/// Pick the marker icon for a place category. Matching is case-insensitive;
/// unknown or absent categories fall back to the stock marker.
#[must_use]
pub fn icon_for(category: Option<&str>) -> IconSpec {
    match category.map(str::to_lowercase).as_deref() {
        Some("restaurant" | "food") => IconSpec::sized(FOOD_ICON, 32, 32),
        Some("hotel" | "lodging") => IconSpec::sized(LODGING_ICON, 32, 32),
        Some("attraction" | "entertainment") => IconSpec::sized(ATTRACTION_ICON, 32, 32),
        _ => IconSpec::sized(GENERIC_ICON, 25, 41),
    }
}

/// Icon image for an OpenWeather condition code.
#[must_use]
pub fn weather_icon_url(icon_code: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon_code}@2x.png")
}

/// Place details shown in a marker popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceSection {
    pub name: String,
    pub address: Option<String>,
    pub category_tags: Vec<String>,
}

/// Weather details shown in a marker popup. Temperatures are rounded here;
/// the underlying snapshot keeps full precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSection {
    pub temperature_c: i64,
    pub feels_like_c: i64,
    pub description: String,
    pub icon_url: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
}

/// Popup content for one marker. The center marker usually carries weather
/// only and place markers carry place details only, but any combination is
/// accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupContent {
    pub place: Option<PlaceSection>,
    pub weather: Option<WeatherSection>,
    /// Present only when there is nothing else to show.
    pub fallback: Option<String>,
}

#[must_use]
pub fn popup_content_for(
    position: Coordinate,
    place: Option<&PlaceResult>,
    weather: Option<&WeatherSnapshot>,
) -> PopupContent {
    let place = place.map(|p| PlaceSection {
        name: p.name.clone(),
        address: p.address.clone(),
        category_tags: p.categories.clone(),
    });

    let weather = weather.map(|w| WeatherSection {
        temperature_c: w.temp_c.round() as i64,
        feels_like_c: w.feels_like_c.round() as i64,
        description: w.description.clone(),
        icon_url: weather_icon_url(&w.icon_code),
        humidity_pct: w.humidity_pct,
        wind_speed_mps: w.wind_speed_mps,
    });

    let fallback = (place.is_none() && weather.is_none())
        .then(|| format!("Marker at ({}, {})", position.lat, position.lon));

    PopupContent { place, weather, fallback }
}

/// Attributes for one rendered marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: Coordinate,
    pub icon: IconSpec,
    pub popup: PopupContent,
}

/// Derive the full marker set for a state: the center marker carrying the
/// weather snapshot, then one marker per place keyed on its first category.
#[must_use]
pub fn markers_for(state: &ExplorationState) -> Vec<Marker> {
    let mut markers = Vec::with_capacity(state.places.len() + 1);

    markers.push(Marker {
        position: state.center,
        icon: icon_for(None),
        popup: popup_content_for(state.center, None, state.weather.as_ref()),
    });

    for place in &state.places {
        let category = place.categories.first().map(String::as_str);
        markers.push(Marker {
            position: place.position,
            icon: icon_for(category),
            popup: popup_content_for(place.position, Some(place), None),
        });
    }

    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn place() -> PlaceResult {
        PlaceResult {
            id: "fsq-1".to_string(),
            name: "Bar Cañete".to_string(),
            position: Coordinate::new(41.3795, 2.1743).unwrap(),
            address: Some("Carrer de la Unió, 17".to_string()),
            categories: vec!["Restaurant".to_string(), "Bar".to_string()],
        }
    }

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            temp_c: 21.64,
            feels_like_c: -0.4,
            humidity_pct: 52,
            wind_speed_mps: 4.12,
            description: "few clouds".to_string(),
            icon_code: "02d".to_string(),
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn category_matching_is_case_insensitive_with_a_generic_fallback() {
        assert_eq!(icon_for(Some("Restaurant")).url, FOOD_ICON);
        assert_eq!(icon_for(Some("food")).url, FOOD_ICON);
        assert_eq!(icon_for(Some("HOTEL")).url, LODGING_ICON);
        assert_eq!(icon_for(Some("lodging")).url, LODGING_ICON);
        assert_eq!(icon_for(Some("Attraction")).url, ATTRACTION_ICON);
        assert_eq!(icon_for(Some("entertainment")).url, ATTRACTION_ICON);
        assert_eq!(icon_for(Some("laundromat")).url, GENERIC_ICON);
        assert_eq!(icon_for(None).url, GENERIC_ICON);
    }

    #[test]
    fn anchors_put_the_tip_on_the_coordinate() {
        let food = icon_for(Some("food"));
        assert_eq!(food.size, (32, 32));
        assert_eq!(food.anchor, (16, 32));
        assert_eq!(food.popup_anchor, (0, -32));

        let generic = icon_for(None);
        assert_eq!(generic.size, (25, 41));
        assert_eq!(generic.anchor, (12, 41));
        assert_eq!(generic.popup_anchor, (0, -41));
    }

    #[test]
    fn place_popup_carries_name_address_and_tags() {
        let place = place();
        let content = popup_content_for(place.position, Some(&place), None);

        let section = content.place.expect("place section");
        assert_eq!(section.name, "Bar Cañete");
        assert_eq!(section.address.as_deref(), Some("Carrer de la Unió, 17"));
        assert_eq!(section.category_tags, vec!["Restaurant", "Bar"]);
        assert!(content.weather.is_none());
        assert!(content.fallback.is_none());
    }

    #[test]
    fn weather_popup_rounds_temperatures_at_presentation_time() {
        let position = Coordinate::new(41.3874, 2.1686).unwrap();
        let content = popup_content_for(position, None, Some(&snapshot()));

        let section = content.weather.expect("weather section");
        assert_eq!(section.temperature_c, 22);
        assert_eq!(section.feels_like_c, 0);
        assert_eq!(section.description, "few clouds");
        assert_eq!(section.icon_url, "https://openweathermap.org/img/wn/02d@2x.png");
        assert_eq!(section.humidity_pct, 52);
        assert_eq!(section.wind_speed_mps, 4.12);
        assert!(content.fallback.is_none());
    }

    #[test]
    fn both_sections_may_be_present_at_once() {
        let place = place();
        let content = popup_content_for(place.position, Some(&place), Some(&snapshot()));

        assert!(content.place.is_some());
        assert!(content.weather.is_some());
        assert!(content.fallback.is_none());
    }

    #[test]
    fn bare_marker_falls_back_to_its_coordinates() {
        let position = Coordinate::new(41.3874, 2.1686).unwrap();
        let content = popup_content_for(position, None, None);

        assert!(content.place.is_none());
        assert!(content.weather.is_none());
        assert_eq!(content.fallback.as_deref(), Some("Marker at (41.3874, 2.1686)"));
    }

    #[test]
    fn marker_set_leads_with_the_center_then_each_place() {
        let state = ExplorationState {
            places: vec![place()],
            weather: Some(snapshot()),
            ..Default::default()
        };

        let markers = markers_for(&state);
        assert_eq!(markers.len(), 2);

        assert_eq!(markers[0].position, state.center);
        assert_eq!(markers[0].icon.url, GENERIC_ICON);
        assert!(markers[0].popup.weather.is_some());
        assert!(markers[0].popup.place.is_none());

        assert_eq!(markers[1].icon.url, FOOD_ICON);
        assert!(markers[1].popup.place.is_some());
        assert!(markers[1].popup.weather.is_none());
    }
}
