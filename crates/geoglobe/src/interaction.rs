//! Hover and selection state.
//!
//! Hover and selection are independent fields. Transitions return the camera
//! commands they produce instead of driving a camera directly.

use std::sync::Arc;

use crate::camera::{CameraCommand, CameraConfig, CameraTarget, FlyTo};
use crate::store::FeatureStore;
use crate::style::Highlight;
use crate::types::CountryFeature;

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState {
    hovered: Option<Arc<CountryFeature>>,
    selected: Option<Arc<CountryFeature>>,
    /// Where the camera was last sent.
    camera_target: CameraTarget,
    auto_rotate: bool,
}

impl InteractionState {
    /// Idle state looking at `overview` with auto-rotation enabled.
    #[must_use]
    pub fn new(overview: CameraTarget) -> Self {
        Self {
            hovered: None,
            selected: None,
            camera_target: overview,
            auto_rotate: true,
        }
    }

    #[must_use]
    pub fn hovered(&self) -> Option<&Arc<CountryFeature>> {
        self.hovered.as_ref()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Arc<CountryFeature>> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn camera_target(&self) -> CameraTarget {
        self.camera_target
    }

    #[must_use]
    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    /// The pointer entered a polygon or left all polygons.
    pub fn on_hover(&mut self, feature: Option<Arc<CountryFeature>>) {
        self.hovered = feature;
    }

    /// A polygon was clicked. Clicking the selected country deselects it.
    pub fn on_polygon_click(
        &mut self,
        feature: Arc<CountryFeature>,
        camera: &CameraConfig,
    ) -> Vec<CameraCommand> {
        let reselected = self
            .selected
            .as_ref()
            .is_some_and(|selected| selected.same_country(&feature));

        if reselected {
            self.deselect(camera)
        } else {
            self.select(feature, camera)
        }
    }

    /// A click landed on the globe but not on any polygon.
    pub fn on_globe_click(&mut self, camera: &CameraConfig) -> Vec<CameraCommand> {
        self.deselect(camera)
    }

    /// Select `feature` and focus the camera on its centroid.
    ///
    /// If the centroid cannot be computed the selection still applies and
    /// auto-rotation is still suspended, but the camera stays where it is.
    pub fn select(
        &mut self,
        feature: Arc<CountryFeature>,
        camera: &CameraConfig,
    ) -> Vec<CameraCommand> {
        let mut commands = Vec::with_capacity(2);

        match feature.centroid() {
            Ok(centroid) => {
                let flight = FlyTo {
                    target: CameraTarget::new(centroid.lat, centroid.lng, camera.focus_altitude),
                    duration: camera.transition,
                };
                self.camera_target = flight.target;
                commands.push(CameraCommand::FlyTo(flight));
            }
            Err(e) => {
                tracing::warn!("Failed to focus {}: {}", feature.admin, e);
            }
        }

        tracing::info!(iso_a2 = %feature.iso_a2, "selected {}", feature.admin);
        self.selected = Some(feature);
        self.auto_rotate = false;
        commands.push(CameraCommand::SetAutoRotate(false));
        commands
    }

    fn deselect(&mut self, camera: &CameraConfig) -> Vec<CameraCommand> {
        if let Some(previous) = self.selected.take() {
            tracing::info!(iso_a2 = %previous.iso_a2, "deselected {}", previous.admin);
        }

        let flight = camera.overview_flight();
        self.camera_target = flight.target;
        self.auto_rotate = true;
        vec![
            CameraCommand::SetAutoRotate(true),
            CameraCommand::FlyTo(flight),
        ]
    }

    /// Emphasis for `feature`. Selection takes precedence over hover.
    #[must_use]
    pub fn highlight(&self, feature: &CountryFeature) -> Highlight {
        let matches = |candidate: &Option<Arc<CountryFeature>>| {
            candidate
                .as_ref()
                .is_some_and(|candidate| candidate.same_country(feature))
        };

        if matches(&self.selected) {
            Highlight::Selected
        } else if matches(&self.hovered) {
            Highlight::Hovered
        } else {
            Highlight::Default
        }
    }

    /// Re-point hover and selection at the store's current features.
    ///
    /// Features that no longer exist are dropped.
    pub(crate) fn reconcile(&mut self, store: &FeatureStore) {
        if let Some(hovered) = self.hovered.take() {
            self.hovered = store.resolve(&hovered);
        }
        if let Some(selected) = self.selected.take() {
            self.selected = store.resolve(&selected);
            if self.selected.is_none() {
                tracing::warn!(iso_a2 = %selected.iso_a2, "selected country no longer loaded");
            }
        }
    }
}
