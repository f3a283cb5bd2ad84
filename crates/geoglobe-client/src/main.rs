//! Interactive country and population globe using Bevy.
//!
//! Country outlines are loaded from a GeoJSON collection and drawn as caps on
//! a rotating globe. Populous countries get a marker, and zooming in loads
//! city markers for the visible area.

mod camera;
mod coords;
mod fetch;
mod globe;
mod launch_params;
mod loader;
mod markers;
mod picking;
mod ui;

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;
use camera::{OrbitCamera, OrbitCameraPlugin};
use fetch::FetchPlugin;
use geoglobe::CameraTarget;
use globe::GlobePlugin;
use launch_params::LaunchParams;
use loader::DataLoaderPlugin;
use markers::MarkerPlugin;
use picking::PickingPlugin;
use ui::GlobeUiPlugin;

/// Where the camera sits before the intro flight starts.
const START: CameraTarget = CameraTarget::new(0.0, 0.0, 2.5);

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            DataLoaderPlugin,
            OrbitCameraPlugin,
            GlobePlugin,
            MarkerPlugin,
            PickingPlugin,
            GlobeUiPlugin,
        ))
        .add_systems(Startup, setup_scene);
    }
}

/// Spawn the camera and its light.
#[allow(clippy::needless_pass_by_value)]
fn setup_scene(mut commands: Commands, params: Res<LaunchParams>) {
    let camera = OrbitCamera::new(
        START,
        params.controller.camera.auto_rotate_degrees_per_sec(),
    );

    commands
        .spawn((
            Camera3d::default(),
            Camera {
                clear_color: bevy::camera::ClearColorConfig::Custom(Color::BLACK),
                ..default()
            },
            Projection::Perspective(PerspectiveProjection {
                fov: std::f32::consts::FRAC_PI_4,
                near: 0.5,
                far: 10_000.0,
                ..Default::default()
            }),
            // Caps and markers are unlit; keep their colours exact.
            Tonemapping::None,
            Transform::default(),
            camera,
        ))
        .with_children(|parent| {
            // Lights the hemisphere facing the viewer.
            parent.spawn((
                DirectionalLight {
                    illuminance: 4_000.0,
                    ..default()
                },
                Transform::default(),
            ));
        });

    tracing::info!("Scene setup complete - drag to rotate, scroll to zoom, click to select");
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "geoglobe".to_string(),
        resolution: (1280, 720).into(),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    // Loader resources read the launch parameters when they are created.
    app.insert_resource(params)
        .add_plugins((FetchPlugin, AppPlugin))
        .run();
}
