//! Typed records for countries, cities and the markers derived from them.
//!
//! Geometry uses `geo` types with `x = longitude` and `y = latitude`.

use geo::{Centroid, Contains, MultiPolygon, Point};

use crate::error::{Error, Result};

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

/// A country boundary loaded from the boundary source.
///
/// Identity is the ISO A2 code. Features are immutable once loaded; the
/// feature store hands them out behind `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    /// Administrative name (e.g. "Nigeria").
    pub admin: String,
    /// ISO 3166-1 alpha-2 code (e.g. "NG").
    pub iso_a2: String,
    /// Population estimate, if the source provides a usable one.
    pub pop_est: Option<u64>,
    /// Preferred label position.
    pub label_anchor: Option<LatLng>,
    /// Country outline.
    pub geometry: MultiPolygon<f64>,
}

impl CountryFeature {
    /// Whether `other` refers to the same country.
    ///
    /// Compares ISO A2 codes only. Boundary sets that use a placeholder code
    /// for several countries (Natural Earth uses `-99` for France, Norway and
    /// Kosovo, among others) make those countries compare equal here: hovering
    /// or selecting one highlights all of them, and clicking one deselects
    /// another. [`crate::store::FeatureStore::resolve`] still tells them apart
    /// by pointer identity.
    #[must_use]
    pub fn same_country(&self, other: &CountryFeature) -> bool {
        self.iso_a2 == other.iso_a2
    }

    /// Geometric centre of the outline.
    ///
    /// Fails for empty geometry and for results that are not finite.
    pub fn centroid(&self) -> Result<LatLng> {
        let point = self.geometry.centroid().ok_or_else(|| Error::Geometry {
            feature: self.iso_a2.clone(),
            detail: "geometry has no centroid".to_string(),
        })?;

        if !point.x().is_finite() || !point.y().is_finite() {
            return Err(Error::Geometry {
                feature: self.iso_a2.clone(),
                detail: format!("non-finite centroid ({}, {})", point.y(), point.x()),
            });
        }

        Ok(LatLng::new(point.y(), point.x()))
    }

    /// Where a marker for this country should be placed.
    ///
    /// Uses the label anchor and falls back to the centroid.
    #[must_use]
    pub fn anchor(&self) -> Option<LatLng> {
        self.label_anchor.or_else(|| self.centroid().ok())
    }

    /// Whether the outline contains `position`.
    #[must_use]
    pub fn contains(&self, position: LatLng) -> bool {
        self.geometry.contains(&position.to_point())
    }
}

/// A populated place returned by the city source.
///
/// City records carry no persistent key; every fetch replaces the previous set.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRecord {
    pub name: String,
    pub population: Option<u64>,
    pub position: LatLng,
}

/// Which dataset a marker was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Country,
    City,
}

/// A renderer-agnostic point datum.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
    pub label: String,
    pub population: Option<u64>,
    /// Display size, see [`crate::markers::SizeScale`].
    pub size: f64,
    pub kind: MarkerKind,
}

/// Convert a raw JSON population into a usable count.
///
/// Negative and non-finite values are treated as absent.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn population_from_raw(raw: Option<f64>) -> Option<u64> {
    raw.filter(|p| p.is_finite() && *p >= 0.0)
        .map(|p| p.round() as u64)
}
