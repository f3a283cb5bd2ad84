//! Background fetching of boundaries and cities.
//!
//! [`Fetcher`] starts a load on the platform's runtime and sends the result
//! back over `async_channel`:
//! - Native: Tokio via `bevy_tokio_tasks` (reqwest requires it)
//! - WASM: Bevy's `AsyncComputeTaskPool` (reqwest uses browser fetch)
//!
//! Finished loads are drained on the main thread as controller events.

use bevy::prelude::*;
use geoglobe::{CityRecord, CityRequest, Client, CountryFeature, Event, Result};

use crate::launch_params::LaunchParams;

/// Capacity of the city result channel. Senders wait while it is full.
const CITY_CHANNEL_CAPACITY: usize = 16;

/// Plugin that sets up the runtime, the HTTP client and the result channels.
pub struct FetchPlugin;

impl Plugin for FetchPlugin {
    fn build(&self, app: &mut App) {
        #[cfg(not(target_family = "wasm"))]
        app.add_plugins(bevy_tokio_tasks::TokioTasksPlugin::default());

        app.init_resource::<SourceClient>()
            .init_resource::<FetchChannels>();
    }
}

/// The HTTP client for the boundary and city sources.
#[derive(Resource)]
pub struct SourceClient(pub Client);

impl FromWorld for SourceClient {
    fn from_world(world: &mut World) -> Self {
        let params = world.get_resource::<LaunchParams>().cloned().unwrap_or_default();
        Self(Client::new(params.source))
    }
}

type CityResult = (CityRequest, Result<Vec<CityRecord>>);

/// Channels carrying finished loads back to the main thread.
#[derive(Resource)]
pub struct FetchChannels {
    boundaries_rx: async_channel::Receiver<Result<Vec<CountryFeature>>>,
    boundaries_tx: async_channel::Sender<Result<Vec<CountryFeature>>>,
    cities_rx: async_channel::Receiver<CityResult>,
    cities_tx: async_channel::Sender<CityResult>,
}

impl Default for FetchChannels {
    fn default() -> Self {
        let (boundaries_tx, boundaries_rx) = async_channel::bounded(1);
        let (cities_tx, cities_rx) = async_channel::bounded(CITY_CHANNEL_CAPACITY);
        Self {
            boundaries_rx,
            boundaries_tx,
            cities_rx,
            cities_tx,
        }
    }
}

impl FetchChannels {
    /// Take every finished load as a controller event, boundaries first.
    pub fn drain(&self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(result) = self.boundaries_rx.try_recv() {
            events.push(Event::BoundariesLoaded(result));
        }
        while let Ok((request, result)) = self.cities_rx.try_recv() {
            events.push(Event::CitiesLoaded { request, result });
        }
        events
    }
}

impl Fetcher<'_, '_> {
    /// Start loading the country boundaries.
    pub fn load_boundaries(&self) {
        let client = self.source.0.clone();
        let tx = self.channels.boundaries_tx.clone();

        self.spawn(async move {
            let result = client.load_boundaries().await;
            if tx.send(result).await.is_err() {
                tracing::debug!("boundary result dropped, receiver closed");
            }
        });

        tracing::info!("Started loading country boundaries");
    }

    /// Start the city load for `request`.
    pub fn load_cities(&self, request: CityRequest) {
        let client = self.source.0.clone();
        let tx = self.channels.cities_tx.clone();

        self.spawn(async move {
            let result = client.fetch_cities(request.altitude).await;
            if tx.send((request, result)).await.is_err() {
                tracing::debug!(seq = request.seq, "city result dropped, receiver closed");
            }
        });

        tracing::debug!(seq = request.seq, altitude = request.altitude, "Started loading cities");
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use std::future::Future;

    use bevy::{ecs::system::SystemParam, prelude::*};

    use super::{FetchChannels, SourceClient};

    /// Starts loads on the Tokio runtime.
    #[derive(SystemParam)]
    pub struct Fetcher<'w, 's> {
        pub(super) source: Res<'w, SourceClient>,
        pub(super) channels: Res<'w, FetchChannels>,
        runtime: Res<'w, bevy_tokio_tasks::TokioTasksRuntime>,
        #[allow(dead_code)]
        _local: Local<'s, ()>,
    }

    impl Fetcher<'_, '_> {
        pub(super) fn spawn<F>(&self, future: F)
        where
            F: Future<Output = ()> + Send + 'static,
        {
            self.runtime.spawn_background_task(move |_ctx| future);
        }
    }
}

#[cfg(target_family = "wasm")]
mod wasm {
    use std::future::Future;

    use bevy::{ecs::system::SystemParam, prelude::*, tasks::AsyncComputeTaskPool};

    use super::{FetchChannels, SourceClient};

    /// Starts loads on Bevy's task pool.
    #[derive(SystemParam)]
    pub struct Fetcher<'w, 's> {
        pub(super) source: Res<'w, SourceClient>,
        pub(super) channels: Res<'w, FetchChannels>,
        #[allow(dead_code)]
        _local: Local<'s, ()>,
    }

    impl Fetcher<'_, '_> {
        /// The browser is single-threaded, so `Send` is not required.
        pub(super) fn spawn<F>(&self, future: F)
        where
            F: Future<Output = ()> + 'static,
        {
            AsyncComputeTaskPool::get().spawn_local(future).detach();
        }
    }
}

#[cfg(not(target_family = "wasm"))]
pub use native::Fetcher;
#[cfg(target_family = "wasm")]
pub use wasm::Fetcher;
