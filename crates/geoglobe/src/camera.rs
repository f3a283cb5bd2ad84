//! Camera targets and the camera capability the controller drives.

use std::time::Duration;

/// A point of view: where the camera looks and from how far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    pub lat: f64,
    pub lng: f64,
    /// Distance above the surface in globe radii.
    pub altitude: f64,
}

impl CameraTarget {
    /// The default overview, centred on Abuja.
    pub const OVERVIEW: CameraTarget = CameraTarget {
        lat: 9.072_264,
        lng: 7.491_302,
        altitude: 1.5,
    };

    #[must_use]
    pub const fn new(lat: f64, lng: f64, altitude: f64) -> Self {
        Self { lat, lng, altitude }
    }
}

/// A timed transition to a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyTo {
    pub target: CameraTarget,
    pub duration: Duration,
}

/// A single instruction for the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    FlyTo(FlyTo),
    SetAutoRotate(bool),
}

impl CameraCommand {
    /// Execute this command against `camera`.
    pub fn apply<C: CameraController + ?Sized>(self, camera: &mut C) {
        match self {
            CameraCommand::FlyTo(flight) => camera.fly_to(flight),
            CameraCommand::SetAutoRotate(enabled) => camera.set_auto_rotate(enabled),
        }
    }
}

/// Imperative camera control provided by the renderer.
///
/// Implementations own the animation. A new flight issued before the previous
/// one finishes replaces it.
pub trait CameraController {
    fn fly_to(&mut self, flight: FlyTo);
    fn set_auto_rotate(&mut self, enabled: bool);
}

/// Camera behaviour settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Target used at startup and after a deselect.
    pub overview: CameraTarget,
    /// Altitude used when focusing a selected country.
    pub focus_altitude: f64,
    /// Duration of selection and deselection flights.
    pub transition: Duration,
    /// Duration of the startup flight.
    pub intro_transition: Duration,
    /// Auto-rotation speed in orbit-control units (2.0 is one turn per 30 s).
    pub auto_rotate_speed: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            overview: CameraTarget::OVERVIEW,
            focus_altitude: 0.5,
            transition: Duration::from_secs(2),
            intro_transition: Duration::from_secs(5),
            auto_rotate_speed: 0.3,
        }
    }
}

impl CameraConfig {
    /// Flight back to the overview.
    #[must_use]
    pub fn overview_flight(&self) -> FlyTo {
        FlyTo {
            target: self.overview,
            duration: self.transition,
        }
    }

    /// Auto-rotation speed converted to degrees of longitude per second.
    #[must_use]
    pub fn auto_rotate_degrees_per_sec(&self) -> f64 {
        // Speed 2.0 completes a turn in 30 seconds.
        self.auto_rotate_speed * 360.0 / 60.0
    }
}
