//! Interaction controller for a country and population globe.
//!
//! The crate loads country boundaries and city records, projects them into
//! point markers and reduces renderer events (hover, click, zoom, search) into
//! state changes plus effects for the host to run.
//!
//! # Design principles
//!
//! - **Renderer-agnostic**: camera control goes through [`CameraController`]
//! - **Reducer-shaped**: [`GlobeController::update`] returns [`Effect`]s
//!   instead of performing I/O
//! - **Fail silent**: load and geometry failures are logged and leave the
//!   previous state in place
//!
//! # Example
//!
//! ```ignore
//! use geoglobe::{Client, Event, GlobeController, SourceConfig};
//!
//! let client = Client::new(SourceConfig::default());
//! let mut controller = GlobeController::default();
//!
//! let startup = controller.start();
//! controller.update(Event::BoundariesLoaded(client.load_boundaries().await));
//! ```

pub mod camera;
pub mod collection;
pub mod controller;
mod error;
pub mod interaction;
pub mod markers;
pub mod search;
mod source;
pub mod store;
pub mod style;
pub mod types;
pub mod viewport;

#[cfg(test)]
mod testing;

pub use camera::{CameraCommand, CameraConfig, CameraController, CameraTarget, FlyTo};
pub use controller::{ControllerConfig, Effect, Event, GlobeController};
pub use error::{Error, ErrorKind, Result};
pub use source::{
    Client, DEFAULT_BASE_URL, DEFAULT_BOUNDARIES_PATH, DEFAULT_CITIES_PATH, SourceConfig,
};
pub use style::{Highlight, Palette, Rgba};
pub use types::{CityRecord, CountryFeature, LatLng, Marker, MarkerKind};
pub use viewport::CityRequest;
