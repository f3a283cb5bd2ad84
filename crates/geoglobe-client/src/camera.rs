//! Orbit camera around the globe.
//!
//! The camera always looks at the globe centre from a geographic position and
//! altitude. It accepts timed flights from the controller, is dragged with the
//! left mouse button, zooms with the scroll wheel, and slowly drifts in
//! longitude while auto-rotation is enabled.

use bevy::ecs::message::MessageReader;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use geoglobe::{CameraController, CameraTarget, Event, FlyTo};

use crate::coords::{ease_in_out_cubic, lat_lng_to_vec3, lng_delta, wrap_lng};
use crate::loader::ControllerParams;

/// Closest the camera may get to the surface, in globe radii.
pub const MIN_ALTITUDE: f64 = 0.05;
/// Farthest the camera may get from the surface, in globe radii.
pub const MAX_ALTITUDE: f64 = 6.0;
/// Latitude limit, keeps the look-at basis away from the poles.
const MAX_LAT: f64 = 85.0;
/// Pointer travel (pixels) below which a press and release count as a click.
pub const CLICK_SLOP: f32 = 4.0;

/// Plugin for the orbit camera.
pub struct OrbitCameraPlugin;

impl Plugin for OrbitCameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .init_resource::<PointerDrag>()
            .add_systems(
                Update,
                (orbit_input, advance_camera, apply_orbit_transform, report_zoom)
                    .chain()
                    .in_set(OrbitCameraSystems),
            );
    }
}

/// Systems that move the camera.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrbitCameraSystems;

/// Settings for manual camera control.
#[derive(Resource)]
pub struct CameraSettings {
    /// Degrees of rotation per dragged pixel at an altitude of 1.0.
    pub drag_sensitivity: f64,
    /// Altitude scale factor per scroll line.
    pub zoom_step: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.2,
            zoom_step: 1.1,
        }
    }
}

/// State of the current left-button press.
#[derive(Resource, Default, Debug)]
pub struct PointerDrag {
    /// Whether the press started over the globe view rather than a UI panel.
    active: bool,
    /// Total pointer travel since the press, in pixels.
    travelled: f32,
}

impl PointerDrag {
    /// Whether the press that was just released counts as a click.
    pub fn is_click(&self) -> bool {
        self.active && self.travelled <= CLICK_SLOP
    }

    fn is_dragging(&self) -> bool {
        self.active && self.travelled > CLICK_SLOP
    }
}

/// An in-progress flight.
#[derive(Debug, Clone, Copy)]
struct Flight {
    from: CameraTarget,
    to: CameraTarget,
    duration: f64,
    elapsed: f64,
}

/// The globe camera.
#[derive(Component, Debug)]
pub struct OrbitCamera {
    pub lat: f64,
    pub lng: f64,
    /// Distance above the surface in globe radii.
    pub altitude: f64,
    /// Auto-rotation speed in degrees of longitude per second.
    pub auto_rotate_speed: f64,
    auto_rotate: bool,
    flight: Option<Flight>,
    /// Altitude at the end of the previous frame.
    previous_altitude: f64,
    /// Altitude last reported to the controller.
    reported_altitude: Option<f64>,
}

impl OrbitCamera {
    pub fn new(start: CameraTarget, auto_rotate_speed: f64) -> Self {
        Self {
            lat: start.lat,
            lng: start.lng,
            altitude: start.altitude,
            auto_rotate_speed,
            auto_rotate: false,
            flight: None,
            previous_altitude: start.altitude,
            reported_altitude: None,
        }
    }

    pub fn target(&self) -> CameraTarget {
        CameraTarget::new(self.lat, self.lng, self.altitude)
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    pub fn auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    /// Step the flight or auto-rotation by `dt` seconds.
    pub fn advance(&mut self, dt: f64, dragging: bool) {
        if let Some(mut flight) = self.flight.take() {
            flight.elapsed += dt;
            let t = if flight.duration > 0.0 {
                ease_in_out_cubic(flight.elapsed / flight.duration)
            } else {
                1.0
            };

            self.lat = flight.from.lat + (flight.to.lat - flight.from.lat) * t;
            self.lng = wrap_lng(flight.from.lng + lng_delta(flight.from.lng, flight.to.lng) * t);
            self.altitude = flight.from.altitude + (flight.to.altitude - flight.from.altitude) * t;

            if flight.elapsed < flight.duration {
                self.flight = Some(flight);
            }
        } else if self.auto_rotate && !dragging {
            // Earth appears to spin eastward.
            self.lng = wrap_lng(self.lng - self.auto_rotate_speed * dt);
        }
    }

    /// Rotate the view by a pointer drag. Cancels any flight.
    pub fn orbit(&mut self, dlat: f64, dlng: f64) {
        self.flight = None;
        self.lat = (self.lat + dlat).clamp(-MAX_LAT, MAX_LAT);
        self.lng = wrap_lng(self.lng + dlng);
    }

    /// Scale the altitude. Cancels any flight.
    pub fn zoom(&mut self, factor: f64) {
        self.flight = None;
        self.altitude = (self.altitude * factor).clamp(MIN_ALTITUDE, MAX_ALTITUDE);
    }

    /// The altitude, if it has just come to rest at a new value.
    ///
    /// Call once per frame after the camera has moved.
    pub fn take_settled_altitude(&mut self) -> Option<f64> {
        let moving = (self.altitude - self.previous_altitude).abs() > f64::EPSILON;
        self.previous_altitude = self.altitude;

        if moving || self.is_flying() {
            return None;
        }

        let changed = self
            .reported_altitude
            .is_none_or(|reported| (reported - self.altitude).abs() > 1e-6);
        if !changed {
            return None;
        }

        self.reported_altitude = Some(self.altitude);
        Some(self.altitude)
    }
}

impl CameraController for OrbitCamera {
    fn fly_to(&mut self, flight: FlyTo) {
        let to = CameraTarget::new(
            flight.target.lat.clamp(-MAX_LAT, MAX_LAT),
            wrap_lng(flight.target.lng),
            flight.target.altitude.clamp(MIN_ALTITUDE, MAX_ALTITUDE),
        );
        tracing::debug!(lat = to.lat, lng = to.lng, altitude = to.altitude, "flying");

        self.flight = Some(Flight {
            from: self.target(),
            to,
            duration: flight.duration.as_secs_f64(),
            elapsed: 0.0,
        });
    }

    fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }
}

/// Handle drag rotation and scroll zoom.
fn orbit_input(
    mouse: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut scroll_events: MessageReader<MouseWheel>,
    settings: Res<CameraSettings>,
    mut drag: ResMut<PointerDrag>,
    mut camera: Single<&mut OrbitCamera>,
    mut contexts: EguiContexts,
) {
    let over_ui = contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.is_pointer_over_area());

    if mouse.just_pressed(MouseButton::Left) {
        *drag = PointerDrag {
            active: !over_ui,
            travelled: 0.0,
        };
    }

    let mut delta = Vec2::ZERO;
    for event in mouse_motion.read() {
        delta += event.delta;
    }

    if drag.active && mouse.pressed(MouseButton::Left) && delta != Vec2::ZERO {
        drag.travelled += delta.length();
        if drag.is_dragging() {
            let scale = settings.drag_sensitivity * camera.altitude.clamp(0.1, 2.0);
            camera.orbit(f64::from(delta.y) * scale, -f64::from(delta.x) * scale);
        }
    }

    if over_ui {
        scroll_events.clear();
        return;
    }

    for event in scroll_events.read() {
        // Normalize scroll value: web reports pixels, native reports lines.
        let scroll = match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / 120.0,
        };
        if scroll != 0.0 {
            camera.zoom(settings.zoom_step.powf(-f64::from(scroll)));
        }
    }
}

/// Advance flights and auto-rotation.
fn advance_camera(
    time: Res<Time>,
    mouse: Res<ButtonInput<MouseButton>>,
    drag: Res<PointerDrag>,
    mut camera: Single<&mut OrbitCamera>,
) {
    let dragging = mouse.pressed(MouseButton::Left) && drag.is_dragging();
    camera.advance(time.delta_secs_f64(), dragging);
}

/// Place the camera entity from its geographic position.
fn apply_orbit_transform(mut query: Query<(&OrbitCamera, &mut Transform)>) {
    for (camera, mut transform) in &mut query {
        let position = lat_lng_to_vec3(camera.lat, camera.lng, camera.altitude);
        *transform = Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y);
    }
}

/// Tell the controller about a new resting altitude.
fn report_zoom(mut globe: ControllerParams) {
    let Some(altitude) = globe.camera_mut().and_then(|mut camera| camera.take_settled_altitude())
    else {
        return;
    };
    globe.send(Event::Zoom { altitude });
}

/// Whether the pointer is over the window and not captured by a UI panel.
pub fn pointer_over_globe(window: &Window, contexts: &mut EguiContexts) -> Option<Vec2> {
    let cursor = window.cursor_position()?;
    let over_ui = contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.is_pointer_over_area());
    (!over_ui).then_some(cursor)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(CameraTarget::OVERVIEW, 1.8)
    }

    #[test]
    fn test_flight_reaches_target() {
        let mut camera = camera();
        camera.fly_to(FlyTo {
            target: CameraTarget::new(40.0, -100.0, 0.5),
            duration: Duration::from_secs(2),
        });
        assert!(camera.is_flying());

        for _ in 0..30 {
            camera.advance(0.1, false);
        }
        assert!(!camera.is_flying());
        assert!((camera.lat - 40.0).abs() < 1e-9);
        assert!((camera.lng + 100.0).abs() < 1e-9);
        assert!((camera.altitude - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_new_flight_supersedes_old() {
        let mut camera = camera();
        camera.fly_to(FlyTo {
            target: CameraTarget::new(40.0, -100.0, 0.5),
            duration: Duration::from_secs(2),
        });
        camera.advance(0.5, false);
        camera.fly_to(FlyTo {
            target: CameraTarget::OVERVIEW,
            duration: Duration::from_secs(1),
        });
        camera.advance(1.5, false);
        assert!(!camera.is_flying());
        assert!((camera.lat - CameraTarget::OVERVIEW.lat).abs() < 1e-9);
        assert!((camera.altitude - CameraTarget::OVERVIEW.altitude).abs() < 1e-9);
    }

    #[test]
    fn test_flight_crosses_antimeridian_the_short_way() {
        let mut camera = OrbitCamera::new(CameraTarget::new(0.0, 170.0, 1.0), 0.0);
        camera.fly_to(FlyTo {
            target: CameraTarget::new(0.0, -170.0, 1.0),
            duration: Duration::from_secs(2),
        });
        camera.advance(1.0, false);
        assert!(camera.lng.abs() > 170.0);
    }

    #[test]
    fn test_auto_rotate() {
        let mut camera = camera();
        let start = camera.lng;

        camera.advance(1.0, false);
        assert_eq!(camera.lng, start);

        camera.set_auto_rotate(true);
        camera.advance(1.0, true);
        assert_eq!(camera.lng, start);

        camera.advance(1.0, false);
        assert!((lng_delta(camera.lng, start) - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_is_clamped_and_cancels_flight() {
        let mut camera = camera();
        camera.fly_to(FlyTo {
            target: CameraTarget::new(0.0, 0.0, 0.3),
            duration: Duration::from_secs(2),
        });
        camera.zoom(1000.0);
        assert!(!camera.is_flying());
        assert_eq!(camera.altitude, MAX_ALTITUDE);

        camera.zoom(0.0);
        assert_eq!(camera.altitude, MIN_ALTITUDE);
    }

    #[test]
    fn test_settled_altitude_reported_once() {
        let mut camera = camera();
        assert_eq!(camera.take_settled_altitude(), Some(1.5));
        assert_eq!(camera.take_settled_altitude(), None);

        camera.zoom(0.3);
        assert_eq!(camera.take_settled_altitude(), None);
        assert!((camera.take_settled_altitude().unwrap() - 0.45).abs() < 1e-9);
        assert_eq!(camera.take_settled_altitude(), None);
    }

    #[test]
    fn test_no_report_while_flying() {
        let mut camera = camera();
        camera.take_settled_altitude();
        camera.fly_to(FlyTo {
            target: CameraTarget::new(0.0, 0.0, 0.4),
            duration: Duration::from_secs(1),
        });
        camera.advance(0.5, false);
        assert_eq!(camera.take_settled_altitude(), None);
        camera.advance(0.5, false);
        assert_eq!(camera.take_settled_altitude(), None);
        assert!((camera.take_settled_altitude().unwrap() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_pointer_drag_click() {
        let click = PointerDrag {
            active: true,
            travelled: 2.0,
        };
        assert!(click.is_click());

        let drag = PointerDrag {
            active: true,
            travelled: 20.0,
        };
        assert!(!drag.is_click());

        assert!(!PointerDrag::default().is_click());
    }
}
