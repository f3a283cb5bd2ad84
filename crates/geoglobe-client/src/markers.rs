//! Point markers for populous countries and loaded cities.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};
use geoglobe::style::MARKER_ALTITUDE;
use geoglobe::{Marker, MarkerKind};

use crate::camera::OrbitCamera;
use crate::coords::lat_lng_to_vec3;
use crate::globe::to_color;
use crate::loader::GlobeState;

/// World units of marker radius per unit of marker size.
const RADIUS_PER_SIZE: f32 = 0.6;

/// Plugin for marker drawing.
pub struct MarkerPlugin;

impl Plugin for MarkerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, draw_markers)
            .add_systems(EguiPrimaryContextPass, draw_marker_labels);
    }
}

fn marker_position(marker: &Marker) -> Vec3 {
    lat_lng_to_vec3(marker.lat, marker.lng, MARKER_ALTITUDE)
}

#[allow(clippy::cast_possible_truncation)]
fn marker_radius(marker: &Marker) -> f32 {
    marker.size as f32 * RADIUS_PER_SIZE
}

/// Draw every visible marker as a sphere.
#[allow(clippy::needless_pass_by_value)]
fn draw_markers(globe: Res<GlobeState>, mut gizmos: Gizmos) {
    let palette = globe.controller.config().palette;
    for marker in globe.controller.markers() {
        gizmos.sphere(
            Isometry3d::from_translation(marker_position(marker)),
            marker_radius(marker),
            to_color(palette.marker_color(marker.kind)),
        );
    }
}

/// Label markers on the side of the globe facing the camera.
#[allow(clippy::needless_pass_by_value)]
fn draw_marker_labels(
    mut contexts: EguiContexts,
    globe: Res<GlobeState>,
    camera: Single<(&Camera, &GlobalTransform), With<OrbitCamera>>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let (camera, camera_transform) = *camera;
    let eye = camera_transform.translation();

    for (index, marker) in globe.controller.markers().enumerate() {
        let position = marker_position(marker);
        // Skip the far hemisphere.
        if position.dot(eye - position) <= 0.0 {
            continue;
        }
        let Ok(screen) = camera.world_to_viewport(camera_transform, position) else {
            continue;
        };

        let text = match marker.kind {
            MarkerKind::Country => egui::RichText::new(&marker.label).strong(),
            MarkerKind::City => egui::RichText::new(&marker.label).small(),
        };
        egui::Area::new(egui::Id::new(("marker_label", index)))
            .order(egui::Order::Background)
            .interactable(false)
            .fixed_pos(egui::pos2(screen.x + 6.0, screen.y - 6.0))
            .show(ctx, |ui| {
                ui.label(text.color(egui::Color32::WHITE));
            });
    }

    Ok(())
}
