//! Altitude-driven gating of city markers.
//!
//! Below the zoom threshold every altitude update issues a city request; at or
//! above it the city markers are cleared. Requests are numbered so that a
//! response can be recognised as stale when it completes out of order.

use crate::error::Result;
use crate::markers::project_cities;
use crate::types::{CityRecord, Marker};

/// City markers are requested below this camera altitude (globe radii).
pub const CITY_ZOOM_THRESHOLD: f64 = 0.6;

/// A city fetch issued by the gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityRequest {
    /// Monotonically increasing request number.
    pub seq: u64,
    /// Altitude the request was issued for; `None` for the startup load.
    pub altitude: Option<f64>,
}

/// What the gate decided for an altitude update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// A new fetch must be started.
    Fetch(CityRequest),
    /// City markers were cleared.
    Clear,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result replaced the visible city markers.
    Applied { markers: usize },
    /// A newer result or a clear superseded this response; it was dropped.
    Stale,
    /// The fetch failed; the visible markers were kept.
    Failed,
}

/// Decides when city markers are fetched or cleared.
#[derive(Debug, Clone)]
pub struct ViewportGate {
    zoom_threshold: f64,
    last_altitude: Option<f64>,
    /// Sequence number for the next request.
    next_seq: u64,
    /// Responses with a sequence number at or below this are stale.
    applied_seq: u64,
    /// Issued requests that have not completed and are not yet superseded.
    in_flight: Vec<u64>,
    markers: Vec<Marker>,
}

impl Default for ViewportGate {
    fn default() -> Self {
        Self::new(CITY_ZOOM_THRESHOLD)
    }
}

impl ViewportGate {
    #[must_use]
    pub fn new(zoom_threshold: f64) -> Self {
        Self {
            zoom_threshold,
            last_altitude: None,
            next_seq: 1,
            applied_seq: 0,
            in_flight: Vec::new(),
            markers: Vec::new(),
        }
    }

    #[must_use]
    pub fn zoom_threshold(&self) -> f64 {
        self.zoom_threshold
    }

    /// The most recent altitude seen.
    #[must_use]
    pub fn last_altitude(&self) -> Option<f64> {
        self.last_altitude
    }

    /// Currently visible city markers.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Number of requests still in flight that could change the markers.
    ///
    /// Completed requests, whatever their outcome, and requests superseded by
    /// a newer result or a clear are not counted.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Issue the unparameterised startup request.
    pub fn initial_request(&mut self) -> CityRequest {
        self.issue(None)
    }

    /// Handle a camera altitude update.
    pub fn on_altitude(&mut self, altitude: f64) -> GateDecision {
        self.last_altitude = Some(altitude);

        if altitude < self.zoom_threshold {
            GateDecision::Fetch(self.issue(Some(altitude)))
        } else {
            // Anything still in flight was issued for a lower altitude.
            self.supersede(self.next_seq - 1);
            self.markers.clear();
            GateDecision::Clear
        }
    }

    /// Apply a completed fetch if it is still the most relevant one.
    pub fn complete(
        &mut self,
        request: CityRequest,
        result: Result<Vec<CityRecord>>,
    ) -> Completion {
        self.in_flight.retain(|&seq| seq != request.seq);

        match result {
            Ok(_) if request.seq <= self.applied_seq => {
                tracing::debug!(seq = request.seq, "discarding stale city response");
                Completion::Stale
            }
            Ok(records) => {
                self.supersede(request.seq);
                self.markers = project_cities(&records);
                tracing::info!(
                    seq = request.seq,
                    altitude = request.altitude,
                    count = self.markers.len(),
                    "updated city markers"
                );
                Completion::Applied {
                    markers: self.markers.len(),
                }
            }
            Err(e) => {
                tracing::error!("Failed to load cities: {}", e);
                Completion::Failed
            }
        }
    }

    fn issue(&mut self, altitude: Option<f64>) -> CityRequest {
        let request = CityRequest {
            seq: self.next_seq,
            altitude,
        };
        self.next_seq += 1;
        self.in_flight.push(request.seq);
        request
    }

    /// Mark every request up to and including `seq` as stale.
    fn supersede(&mut self, seq: u64) {
        self.applied_seq = seq;
        self.in_flight.retain(|&pending| pending > seq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::LatLng;

    fn city(name: &str) -> CityRecord {
        CityRecord {
            name: name.to_string(),
            population: Some(1_000_000),
            position: LatLng::new(0.0, 0.0),
        }
    }

    fn labels(gate: &ViewportGate) -> Vec<&str> {
        gate.markers().iter().map(|m| m.label.as_str()).collect()
    }

    fn fetches(gate: &mut ViewportGate, altitudes: &[f64]) -> Vec<CityRequest> {
        altitudes
            .iter()
            .filter_map(|&a| match gate.on_altitude(a) {
                GateDecision::Fetch(request) => Some(request),
                GateDecision::Clear => None,
            })
            .collect()
    }

    #[test]
    fn test_fetches_only_below_threshold() {
        let mut gate = ViewportGate::default();
        let requests = fetches(&mut gate, &[0.8, 0.4, 0.3]);

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].altitude, Some(0.4));
        assert_eq!(requests[1].altitude, Some(0.3));
        assert!(requests[0].seq < requests[1].seq);
        assert_eq!(gate.last_altitude(), Some(0.3));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut gate = ViewportGate::default();
        assert_eq!(gate.on_altitude(CITY_ZOOM_THRESHOLD), GateDecision::Clear);
    }

    #[test]
    fn test_zoom_out_clears_without_fetch() {
        let mut gate = ViewportGate::default();
        let GateDecision::Fetch(request) = gate.on_altitude(0.4) else {
            panic!("expected a fetch below the threshold");
        };
        gate.complete(request, Ok(vec![city("Lagos")]));
        assert_eq!(labels(&gate), ["Lagos"]);

        assert_eq!(gate.on_altitude(0.8), GateDecision::Clear);
        assert!(gate.markers().is_empty());
    }

    #[test]
    fn test_every_qualifying_event_fetches() {
        let mut gate = ViewportGate::default();
        let requests = fetches(&mut gate, &[0.4, 0.4, 0.4]);
        assert_eq!(requests.len(), 3);
        assert_eq!(gate.pending(), 3);
    }

    #[test]
    fn test_stale_response_does_not_overwrite_newer() {
        let mut gate = ViewportGate::default();
        let requests = fetches(&mut gate, &[0.5, 0.3]);

        assert_eq!(
            gate.complete(requests[1], Ok(vec![city("Newer")])),
            Completion::Applied { markers: 1 }
        );
        assert_eq!(
            gate.complete(requests[0], Ok(vec![city("Older")])),
            Completion::Stale
        );
        assert_eq!(labels(&gate), ["Newer"]);
    }

    #[test]
    fn test_in_order_responses_both_apply() {
        let mut gate = ViewportGate::default();
        let requests = fetches(&mut gate, &[0.5, 0.3]);

        gate.complete(requests[0], Ok(vec![city("Older")]));
        gate.complete(requests[1], Ok(vec![city("Newer"), city("Other")]));
        assert_eq!(labels(&gate), ["Newer", "Other"]);
        assert_eq!(gate.pending(), 0);
    }

    #[test]
    fn test_response_after_clear_is_stale() {
        let mut gate = ViewportGate::default();
        let requests = fetches(&mut gate, &[0.4]);
        gate.on_altitude(1.2);

        assert_eq!(
            gate.complete(requests[0], Ok(vec![city("Late")])),
            Completion::Stale
        );
        assert!(gate.markers().is_empty());
    }

    #[test]
    fn test_failure_keeps_previous_markers() {
        let mut gate = ViewportGate::default();
        let initial = gate.initial_request();
        assert_eq!(initial.altitude, None);
        gate.complete(initial, Ok(vec![city("Lagos")]));

        let requests = fetches(&mut gate, &[0.4]);
        let outcome = gate.complete(
            requests[0],
            Err(Error::HttpStatus {
                url: "http://localhost/api/cities?altitude=0.4".to_string(),
                status: 502,
            }),
        );
        assert_eq!(outcome, Completion::Failed);
        assert_eq!(labels(&gate), ["Lagos"]);
        assert_eq!(gate.pending(), 0);
    }

    #[test]
    fn test_pending_counts_unsettled_requests() {
        let mut gate = ViewportGate::default();
        let requests = fetches(&mut gate, &[0.5, 0.4, 0.3]);
        assert_eq!(gate.pending(), 3);

        gate.complete(
            requests[0],
            Err(Error::HttpStatus {
                url: "http://localhost/api/cities?altitude=0.5".to_string(),
                status: 500,
            }),
        );
        assert_eq!(gate.pending(), 2);

        // Applying the newest result supersedes the one still outstanding.
        gate.complete(requests[2], Ok(vec![city("Kano")]));
        assert_eq!(gate.pending(), 0);

        fetches(&mut gate, &[0.2]);
        assert_eq!(gate.pending(), 1);
        gate.on_altitude(0.9);
        assert_eq!(gate.pending(), 0);
    }

    #[test]
    fn test_replaces_rather_than_merges() {
        let mut gate = ViewportGate::default();
        let requests = fetches(&mut gate, &[0.5, 0.4]);
        gate.complete(requests[0], Ok(vec![city("Lagos"), city("Abuja")]));
        gate.complete(requests[1], Ok(vec![city("Kano")]));
        assert_eq!(labels(&gate), ["Kano"]);
    }
}
