//! Pointer picking against the globe.
//!
//! The cursor ray is intersected with the globe sphere and the hit is looked
//! up in the feature store. Hover changes and clicks become controller events.

use std::sync::Arc;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;
use geoglobe::{CountryFeature, Event, LatLng};

use crate::camera::{OrbitCamera, OrbitCameraSystems, PointerDrag, pointer_over_globe};
use crate::coords::{ray_globe_intersection, world_to_lat_lng};
use crate::loader::{ControllerParams, GlobeState};

/// Plugin for hover and click picking.
pub struct PickingPlugin;

impl Plugin for PickingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Pick>()
            .add_systems(Update, (pick, hover, click).chain().after(OrbitCameraSystems));
    }
}

/// What is under the pointer this frame.
#[derive(Resource, Default)]
pub struct Pick {
    /// Cursor position over the globe view, if any.
    pub cursor: Option<Vec2>,
    /// Surface position under the cursor, if the cursor hits the globe.
    pub surface: Option<LatLng>,
    /// Country under the cursor.
    pub country: Option<Arc<CountryFeature>>,
}

/// Resolve what lies under the cursor.
#[allow(clippy::needless_pass_by_value)]
fn pick(
    mut picked: ResMut<Pick>,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&Camera, &GlobalTransform), With<OrbitCamera>>,
    mut contexts: EguiContexts,
    globe: Res<GlobeState>,
) {
    let (camera, camera_transform) = *camera;
    let cursor = pointer_over_globe(&window, &mut contexts);

    let surface = cursor
        .and_then(|cursor| camera.viewport_to_world(camera_transform, cursor).ok())
        .and_then(ray_globe_intersection)
        .map(world_to_lat_lng);

    let country = surface
        .and_then(|position| globe.controller.store().feature_at(position))
        .cloned();

    *picked = Pick {
        cursor,
        surface,
        country,
    };
}

/// Report hover changes.
fn hover(picked: Res<Pick>, mut globe: ControllerParams) {
    let current = globe.controller().hovered().map(|f| f.iso_a2.as_str());
    let next = picked.country.as_ref().map(|f| f.iso_a2.as_str());
    let same = match (globe.controller().hovered(), &picked.country) {
        (Some(current), Some(next)) => Arc::ptr_eq(current, next),
        (None, None) => true,
        _ => false,
    };
    if same {
        return;
    }

    tracing::trace!(?current, ?next, "hover changed");
    globe.send(Event::PolygonHover(picked.country.clone()));
}

/// Turn a short press and release into a polygon or globe click.
fn click(
    mouse: Res<ButtonInput<MouseButton>>,
    drag: Res<PointerDrag>,
    picked: Res<Pick>,
    mut globe: ControllerParams,
) {
    if !mouse.just_released(MouseButton::Left) || !drag.is_click() {
        return;
    }

    match (&picked.country, picked.surface) {
        (Some(country), _) => globe.send(Event::PolygonClick(Arc::clone(country))),
        (None, Some(_)) => globe.send(Event::GlobeClick),
        // Clicks on empty space leave the selection alone.
        (None, None) => {}
    }
}
