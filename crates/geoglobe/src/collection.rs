//! Parsing of boundary and city feature collections.
//!
//! A document that is not a feature collection fails as a whole. Each feature
//! is then decoded on its own with the `geojson` crate, so one malformed
//! feature or mistyped property only costs that feature: it is skipped with a
//! warning, or the offending property is treated as absent.

use geo::{Geometry, MultiPolygon};
use geojson::{Feature, JsonObject, JsonValue};

use crate::error::{Error, Result};
use crate::types::{CityRecord, CountryFeature, LatLng, population_from_raw};

type FeatureResult<T> = std::result::Result<T, String>;

/// Split a collection into its raw features.
fn collection_features(bytes: &[u8], context: &'static str) -> Result<Vec<JsonValue>> {
    let parse_error = |message: String| Error::Parse { context, message };

    let mut document: JsonObject =
        serde_json::from_slice(bytes).map_err(|e| parse_error(e.to_string()))?;
    match document.remove("features") {
        Some(JsonValue::Array(features)) => Ok(features),
        Some(_) => Err(parse_error("`features` is not an array".to_string())),
        None => Err(parse_error("missing `features` array".to_string())),
    }
}

/// Decode every feature with `convert`, skipping the ones it rejects.
fn decode_features<T>(
    features: Vec<JsonValue>,
    kind: &'static str,
    convert: impl Fn(Feature) -> FeatureResult<T>,
) -> Vec<T> {
    features
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let decoded = Feature::try_from(value)
                .map_err(|e| e.to_string())
                .and_then(&convert);
            match decoded {
                Ok(item) => Some(item),
                Err(reason) => {
                    tracing::warn!(index, %reason, "skipping {kind} feature");
                    None
                }
            }
        })
        .collect()
}

/// Parse a country boundary collection.
pub fn parse_boundaries(bytes: &[u8]) -> Result<Vec<CountryFeature>> {
    let features = collection_features(bytes, "boundary collection")?;
    let total = features.len();
    let countries = decode_features(features, "boundary", country_from_feature);

    tracing::debug!(loaded = countries.len(), total, "parsed boundary collection");
    Ok(countries)
}

/// Parse a city collection.
pub fn parse_cities(bytes: &[u8]) -> Result<Vec<CityRecord>> {
    let features = collection_features(bytes, "city collection")?;
    Ok(decode_features(features, "city", city_from_feature))
}

fn country_from_feature(feature: Feature) -> FeatureResult<CountryFeature> {
    let properties = feature.properties.ok_or("missing properties")?;
    let admin = string_property(&properties, "admin").ok_or("missing admin name")?;
    let iso_a2 = string_property(&properties, "iso_a2").ok_or("missing iso_a2")?;

    let geometry = match feature.geometry {
        Some(geometry) => {
            let geometry: Geometry<f64> = geometry
                .value
                .try_into()
                .map_err(|e: geojson::Error| e.to_string())?;
            match geometry {
                Geometry::MultiPolygon(multi_polygon) => multi_polygon,
                Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
                _ => return Err("geometry is not a polygon".to_string()),
            }
        }
        None => MultiPolygon::new(Vec::new()),
    };

    let label_anchor = match (
        number_property(&properties, "label_y"),
        number_property(&properties, "label_x"),
    ) {
        (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)),
        _ => None,
    };

    Ok(CountryFeature {
        admin,
        iso_a2,
        pop_est: population_from_raw(number_property(&properties, "pop_est")),
        label_anchor,
        geometry,
    })
}

fn city_from_feature(feature: Feature) -> FeatureResult<CityRecord> {
    let properties = feature.properties.ok_or("missing properties")?;
    let name = string_property(&properties, "name").ok_or("missing name")?;

    let position = match feature.geometry.map(|geometry| geometry.value) {
        Some(geojson::Value::Point(position)) => match (position.first(), position.get(1)) {
            (Some(&lng), Some(&lat)) => LatLng::new(lat, lng),
            _ => return Err("point has fewer than two coordinates".to_string()),
        },
        Some(_) => return Err("geometry is not a point".to_string()),
        None => return Err("missing geometry".to_string()),
    };

    Ok(CityRecord {
        name,
        population: population_from_raw(number_property(&properties, "population")),
        position,
    })
}

/// A non-empty string property.
fn string_property(properties: &JsonObject, key: &str) -> Option<String> {
    match properties.get(key)? {
        JsonValue::String(value) if !value.trim().is_empty() => Some(value.clone()),
        _ => None,
    }
}

/// A finite numeric property.
///
/// Numbers written as strings are accepted, with `,` and `_` digit grouping.
/// Anything else is treated as absent.
fn number_property(properties: &JsonObject, key: &str) -> Option<f64> {
    let value = match properties.get(key)? {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => text
            .trim()
            .chars()
            .filter(|c| !matches!(c, ',' | '_'))
            .collect::<String>()
            .parse()
            .ok(),
        _ => None,
    };
    value.filter(|v: &f64| v.is_finite())
}
