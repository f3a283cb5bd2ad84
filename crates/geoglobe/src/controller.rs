//! The globe controller: a reducer from renderer and loader events to state
//! changes plus the effects the host must carry out.

use std::sync::Arc;

use crate::camera::{CameraCommand, CameraConfig, CameraController, CameraTarget, FlyTo};
use crate::error::Result;
use crate::interaction::InteractionState;
use crate::markers::{COUNTRY_POPULATION_THRESHOLD, project_countries};
use crate::search::SearchIndex;
use crate::store::FeatureStore;
use crate::style::{Highlight, Palette, Rgba};
use crate::types::{CityRecord, CountryFeature, Marker};
use crate::viewport::{CITY_ZOOM_THRESHOLD, CityRequest, GateDecision, ViewportGate};

/// Something that happened in the renderer, the presentation layer or a loader.
#[derive(Debug)]
pub enum Event {
    /// The boundary load finished.
    BoundariesLoaded(Result<Vec<CountryFeature>>),
    /// The pointer moved onto a polygon, or off all of them.
    PolygonHover(Option<Arc<CountryFeature>>),
    PolygonClick(Arc<CountryFeature>),
    /// A click hit the globe but no polygon.
    GlobeClick,
    /// The camera settled at a new altitude.
    Zoom { altitude: f64 },
    /// A city fetch issued through [`Effect::FetchCities`] finished.
    CitiesLoaded {
        request: CityRequest,
        result: Result<Vec<CityRecord>>,
    },
    QueryChange(String),
    SearchResultSelect(Arc<CountryFeature>),
}

/// Work the host must perform on the controller's behalf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Camera(CameraCommand),
    /// Start a city fetch and report it back as [`Event::CitiesLoaded`].
    FetchCities(CityRequest),
}

/// Controller tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Countries at or above this population get a marker.
    pub population_threshold: u64,
    /// Cities are shown below this camera altitude.
    pub zoom_threshold: f64,
    pub camera: CameraConfig,
    pub palette: Palette,
    /// Whether [`GlobeController::start`] issues the unparameterised city load.
    pub load_cities_on_startup: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            population_threshold: COUNTRY_POPULATION_THRESHOLD,
            zoom_threshold: CITY_ZOOM_THRESHOLD,
            camera: CameraConfig::default(),
            palette: Palette::default(),
            load_cities_on_startup: true,
        }
    }
}

/// Owns all interaction state for one globe view.
#[derive(Debug, Clone)]
pub struct GlobeController {
    config: ControllerConfig,
    store: FeatureStore,
    interaction: InteractionState,
    search: SearchIndex,
    gate: ViewportGate,
    country_markers: Vec<Marker>,
}

impl Default for GlobeController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl GlobeController {
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            interaction: InteractionState::new(config.camera.overview),
            gate: ViewportGate::new(config.zoom_threshold),
            store: FeatureStore::new(),
            search: SearchIndex::new(),
            country_markers: Vec::new(),
            config,
        }
    }

    /// Effects for the initial view: auto-rotation, the intro flight and the
    /// startup city load.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut effects = vec![
            Effect::Camera(CameraCommand::SetAutoRotate(self.interaction.auto_rotate())),
            Effect::Camera(CameraCommand::FlyTo(FlyTo {
                target: self.interaction.camera_target(),
                duration: self.config.camera.intro_transition,
            })),
        ];
        if self.config.load_cities_on_startup {
            effects.push(Effect::FetchCities(self.gate.initial_request()));
        }
        effects
    }

    /// Apply `event` and return the effects it produced.
    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::BoundariesLoaded(result) => {
                if self.store.apply_load(result) {
                    self.on_store_changed();
                }
                Vec::new()
            }
            Event::PolygonHover(feature) => {
                let resolved = feature.and_then(|f| self.store.resolve(&f));
                self.interaction.on_hover(resolved);
                Vec::new()
            }
            Event::PolygonClick(feature) => match self.store.resolve(&feature) {
                Some(feature) => {
                    camera_effects(self.interaction.on_polygon_click(feature, &self.config.camera))
                }
                None => {
                    tracing::warn!(iso_a2 = %feature.iso_a2, "ignoring click on unknown country");
                    Vec::new()
                }
            },
            Event::GlobeClick => camera_effects(self.interaction.on_globe_click(&self.config.camera)),
            Event::Zoom { altitude } => match self.gate.on_altitude(altitude) {
                GateDecision::Fetch(request) => vec![Effect::FetchCities(request)],
                GateDecision::Clear => Vec::new(),
            },
            Event::CitiesLoaded { request, result } => {
                self.gate.complete(request, result);
                Vec::new()
            }
            Event::QueryChange(query) => {
                self.search.on_query_change(query, &self.store);
                Vec::new()
            }
            Event::SearchResultSelect(feature) => match self.store.resolve(&feature) {
                Some(feature) => {
                    self.search.clear();
                    camera_effects(self.interaction.select(feature, &self.config.camera))
                }
                None => {
                    tracing::warn!(iso_a2 = %feature.iso_a2, "ignoring unknown search result");
                    Vec::new()
                }
            },
        }
    }

    /// Apply `event`, execute its camera commands against `camera` and return
    /// the city fetches the host must start.
    pub fn dispatch<C: CameraController + ?Sized>(
        &mut self,
        event: Event,
        camera: &mut C,
    ) -> Vec<CityRequest> {
        execute(self.update(event), camera)
    }

    /// Like [`GlobeController::start`], executing camera commands against `camera`.
    pub fn start_with<C: CameraController + ?Sized>(&mut self, camera: &mut C) -> Vec<CityRequest> {
        let effects = self.start();
        execute(effects, camera)
    }

    fn on_store_changed(&mut self) {
        self.country_markers =
            project_countries(self.store.features(), self.config.population_threshold);
        self.interaction.reconcile(&self.store);
        self.search.refresh(&self.store);
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    #[must_use]
    pub fn hovered(&self) -> Option<&Arc<CountryFeature>> {
        self.interaction.hovered()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Arc<CountryFeature>> {
        self.interaction.selected()
    }

    #[must_use]
    pub fn search_query(&self) -> &str {
        self.search.query()
    }

    #[must_use]
    pub fn search_results(&self) -> &[Arc<CountryFeature>] {
        self.search.results()
    }

    #[must_use]
    pub fn country_markers(&self) -> &[Marker] {
        &self.country_markers
    }

    #[must_use]
    pub fn city_markers(&self) -> &[Marker] {
        self.gate.markers()
    }

    /// Country markers followed by city markers.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.country_markers.iter().chain(self.gate.markers())
    }

    /// City loads still in flight that could replace the city markers.
    #[must_use]
    pub fn pending_city_loads(&self) -> usize {
        self.gate.pending()
    }

    #[must_use]
    pub fn last_altitude(&self) -> Option<f64> {
        self.gate.last_altitude()
    }

    #[must_use]
    pub fn camera_target(&self) -> CameraTarget {
        self.interaction.camera_target()
    }

    #[must_use]
    pub fn auto_rotate(&self) -> bool {
        self.interaction.auto_rotate()
    }

    #[must_use]
    pub fn highlight(&self, feature: &CountryFeature) -> Highlight {
        self.interaction.highlight(feature)
    }

    /// Cap colour for `feature` under the current hover and selection.
    #[must_use]
    pub fn cap_color(&self, feature: &CountryFeature) -> Rgba {
        self.config.palette.cap_color(self.highlight(feature))
    }

    #[must_use]
    pub fn side_color(&self) -> Rgba {
        self.config.palette.side
    }

    #[must_use]
    pub fn stroke_color(&self) -> Rgba {
        self.config.palette.stroke
    }
}

fn camera_effects(commands: Vec<CameraCommand>) -> Vec<Effect> {
    commands.into_iter().map(Effect::Camera).collect()
}

fn execute<C: CameraController + ?Sized>(effects: Vec<Effect>, camera: &mut C) -> Vec<CityRequest> {
    let mut requests = Vec::new();
    for effect in effects {
        match effect {
            Effect::Camera(command) => command.apply(camera),
            Effect::FetchCities(request) => requests.push(request),
        }
    }
    requests
}
