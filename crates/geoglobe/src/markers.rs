//! Projection of countries and cities into point markers.

use std::sync::Arc;

use crate::types::{CityRecord, CountryFeature, Marker, MarkerKind};

/// Countries at or above this population estimate get a marker.
pub const COUNTRY_POPULATION_THRESHOLD: u64 = 50_000_000;

/// Saturating logarithmic size function.
///
/// `size = max(floor, ln(population) / divisor)` for known populations and
/// `fallback` otherwise. Countries and cities use separate scales because
/// their populations span different magnitudes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeScale {
    pub divisor: f64,
    pub floor: f64,
    pub fallback: f64,
}

impl SizeScale {
    /// Scale for country markers (tens to hundreds of millions).
    pub const COUNTRY: SizeScale = SizeScale {
        divisor: 10.0,
        floor: 0.5,
        fallback: 0.5,
    };

    /// Scale for city markers (thousands to tens of millions).
    pub const CITY: SizeScale = SizeScale {
        divisor: 25.0,
        floor: 0.1,
        fallback: 0.1,
    };

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size(&self, population: Option<u64>) -> f64 {
        match population {
            // ln(0) is -inf, which the floor absorbs.
            Some(population) => self.floor.max((population as f64).ln() / self.divisor),
            None => self.fallback,
        }
    }
}

/// Markers for every country whose population estimate reaches `threshold`.
///
/// Countries without a usable anchor (no label position and no centroid) are
/// left out.
#[must_use]
pub fn project_countries(features: &[Arc<CountryFeature>], threshold: u64) -> Vec<Marker> {
    features
        .iter()
        .filter(|f| f.pop_est.is_some_and(|pop| pop >= threshold))
        .filter_map(|f| {
            let anchor = f.anchor()?;
            Some(Marker {
                lat: anchor.lat,
                lng: anchor.lng,
                label: f.admin.clone(),
                population: f.pop_est,
                size: SizeScale::COUNTRY.size(f.pop_est),
                kind: MarkerKind::Country,
            })
        })
        .collect()
}

/// Markers for a city fetch result.
#[must_use]
pub fn project_cities(records: &[CityRecord]) -> Vec<Marker> {
    records
        .iter()
        .map(|city| Marker {
            lat: city.position.lat,
            lng: city.position.lng,
            label: city.name.clone(),
            population: city.population,
            size: SizeScale::CITY.size(city.population),
            kind: MarkerKind::City,
        })
        .collect()
}
