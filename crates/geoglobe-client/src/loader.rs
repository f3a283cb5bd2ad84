//! Controller dispatch.
//!
//! Every event goes through [`ControllerParams::send`]: the controller state is
//! updated first, then its effects are carried out. Camera commands go to the
//! orbit camera and city requests to the [`Fetcher`].

use bevy::{ecs::system::SystemParam, prelude::*};
use geoglobe::{CameraController, CityRequest, Effect, Event, GlobeController};

use crate::camera::OrbitCamera;
use crate::fetch::{FetchChannels, Fetcher};
use crate::launch_params::LaunchParams;

/// Plugin for the controller and its loads.
pub struct DataLoaderPlugin;

impl Plugin for DataLoaderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GlobeState>()
            .add_systems(PostStartup, start_globe)
            .add_systems(Update, poll_loads);
    }
}

/// The interaction controller for the globe.
#[derive(Resource)]
pub struct GlobeState {
    pub controller: GlobeController,
}

impl FromWorld for GlobeState {
    fn from_world(world: &mut World) -> Self {
        let params = world.get_resource::<LaunchParams>().cloned().unwrap_or_default();
        Self {
            controller: GlobeController::new(params.controller),
        }
    }
}

/// Everything needed to feed an event to the controller and carry out its
/// effects.
#[derive(SystemParam)]
pub struct ControllerParams<'w, 's> {
    pub globe: ResMut<'w, GlobeState>,
    cameras: Query<'w, 's, &'static mut OrbitCamera>,
    fetcher: Fetcher<'w, 's>,
}

impl ControllerParams<'_, '_> {
    pub fn controller(&self) -> &GlobeController {
        &self.globe.controller
    }

    pub fn camera_mut(&mut self) -> Option<Mut<'_, OrbitCamera>> {
        self.cameras.single_mut().ok()
    }

    /// Apply `event`, drive the camera and start any requested city loads.
    pub fn send(&mut self, event: Event) {
        let effects = self.globe.controller.update(event);
        self.execute(effects);
    }

    fn start(&mut self) {
        let effects = self.globe.controller.start();
        self.execute(effects);
        self.fetcher.load_boundaries();
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        let mut camera = self.cameras.single_mut().ok();
        let fetcher = &self.fetcher;
        run_effects(effects, camera.as_deref_mut(), |request| {
            fetcher.load_cities(request);
        });
    }
}

/// Carry out controller effects.
///
/// Without a camera, camera commands are skipped; city requests still start.
fn run_effects<C: CameraController>(
    effects: Vec<Effect>,
    mut camera: Option<&mut C>,
    mut fetch: impl FnMut(CityRequest),
) {
    for effect in effects {
        match effect {
            Effect::Camera(command) => match camera.as_deref_mut() {
                Some(camera) => command.apply(camera),
                None => tracing::warn!(?command, "No globe camera, skipping camera command"),
            },
            Effect::FetchCities(request) => fetch(request),
        }
    }
}

/// Start the intro flight and the initial loads.
fn start_globe(mut globe: ControllerParams) {
    globe.start();
}

/// Feed finished loads to the controller.
#[allow(clippy::needless_pass_by_value)]
fn poll_loads(channels: Res<FetchChannels>, mut globe: ControllerParams) {
    for event in channels.drain() {
        globe.send(event);
    }
}

#[cfg(test)]
mod tests {
    use geoglobe::CameraTarget;

    use super::*;

    #[test]
    fn test_effects_without_camera_still_fetch() {
        let mut controller = GlobeController::default();
        let mut fetched = Vec::new();

        run_effects(controller.start(), None::<&mut OrbitCamera>, |request| {
            fetched.push(request);
        });
        run_effects(
            controller.update(Event::Zoom { altitude: 0.4 }),
            None::<&mut OrbitCamera>,
            |request| fetched.push(request),
        );

        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].altitude, None);
        assert_eq!(fetched[1].altitude, Some(0.4));
        assert_eq!(controller.last_altitude(), Some(0.4));
    }

    #[test]
    fn test_effects_drive_camera() {
        let mut controller = GlobeController::default();
        let mut camera = OrbitCamera::new(CameraTarget::new(0.0, 0.0, 2.5), 1.8);
        let mut fetched = Vec::new();

        run_effects(controller.start(), Some(&mut camera), |request| {
            fetched.push(request);
        });

        assert!(camera.auto_rotating());
        assert!(camera.is_flying());
        assert_eq!(fetched.len(), 1);
    }
}
