//! Shared fixtures for unit tests.

use geo::{LineString, MultiPolygon, Polygon};

use crate::camera::{CameraCommand, CameraController, FlyTo};
use crate::types::{CountryFeature, LatLng};

/// An axis-aligned square outline centred on (`lat`, `lng`).
pub fn square(lat: f64, lng: f64, half: f64) -> MultiPolygon<f64> {
    let ring = LineString::from(vec![
        (lng - half, lat - half),
        (lng + half, lat - half),
        (lng + half, lat + half),
        (lng - half, lat + half),
        (lng - half, lat - half),
    ]);
    MultiPolygon::new(vec![Polygon::new(ring, Vec::new())])
}

/// A country whose outline is centred on (9, 9) with a label anchor at (10, 8).
pub fn country(iso_a2: &str, admin: &str, pop_est: Option<u64>) -> CountryFeature {
    country_at(iso_a2, admin, pop_est, 9.0, 9.0)
}

/// A country with a 10-degree square outline centred on (`lat`, `lng`).
pub fn country_at(
    iso_a2: &str,
    admin: &str,
    pop_est: Option<u64>,
    lat: f64,
    lng: f64,
) -> CountryFeature {
    CountryFeature {
        admin: admin.to_string(),
        iso_a2: iso_a2.to_string(),
        pop_est,
        label_anchor: Some(LatLng::new(lat + 1.0, lng - 1.0)),
        geometry: square(lat, lng, 5.0),
    }
}

/// The three-country collection used throughout the scenario tests.
pub fn three_countries() -> Vec<CountryFeature> {
    vec![
        country_at("NG", "Nigeria", Some(200_000_000), 9.0, 9.0),
        country_at("LU", "Luxembourg", Some(600_000), 49.0, 6.0),
        country_at("US", "United States", Some(330_000_000), 40.0, -100.0),
    ]
}

/// Camera double that records every command it receives.
#[derive(Debug, Default)]
pub struct RecordingCamera {
    pub commands: Vec<CameraCommand>,
}

impl RecordingCamera {
    pub fn flights(&self) -> Vec<FlyTo> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                CameraCommand::FlyTo(flight) => Some(*flight),
                CameraCommand::SetAutoRotate(_) => None,
            })
            .collect()
    }

    pub fn auto_rotate(&self) -> Option<bool> {
        self.commands.iter().rev().find_map(|command| match command {
            CameraCommand::SetAutoRotate(enabled) => Some(*enabled),
            CameraCommand::FlyTo(_) => None,
        })
    }
}

impl CameraController for RecordingCamera {
    fn fly_to(&mut self, flight: FlyTo) {
        self.commands.push(CameraCommand::FlyTo(flight));
    }

    fn set_auto_rotate(&mut self, enabled: bool) {
        self.commands.push(CameraCommand::SetAutoRotate(enabled));
    }
}
