//! Search, country info and status panels.
//!
//! Panels only read controller state. Anything the user does is collected as
//! events and sent once the panels have been drawn.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use geoglobe::style::polygon_label;
use geoglobe::{CountryFeature, Event, GlobeController};

use crate::loader::ControllerParams;
use crate::picking::Pick;

/// Placeholder for the search box. Search matches administrative names only.
const SEARCH_HINT: &str = "Country name";

/// Plugin for the egui overlay.
pub struct GlobeUiPlugin;

impl Plugin for GlobeUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .add_systems(EguiPrimaryContextPass, globe_ui_system);
    }
}

/// Render the overlay and forward user actions to the controller.
#[allow(clippy::needless_pass_by_value)]
fn globe_ui_system(
    mut contexts: EguiContexts,
    picked: Res<Pick>,
    mut globe: ControllerParams,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let controller = globe.controller();
    let mut events = Vec::new();

    search_window(ctx, controller, &mut events);
    country_window(ctx, controller);
    status_window(ctx, controller);

    if let (Some(cursor), Some(hovered)) = (picked.cursor, controller.hovered()) {
        egui::Area::new(egui::Id::new("hover_tooltip"))
            .order(egui::Order::Tooltip)
            .interactable(false)
            .fixed_pos(egui::pos2(cursor.x + 14.0, cursor.y + 14.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(polygon_label(hovered));
                });
            });
    }

    for event in events {
        globe.send(event);
    }

    Ok(())
}

fn search_window(ctx: &egui::Context, controller: &GlobeController, events: &mut Vec<Event>) {
    egui::Window::new("Search")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            let mut query = controller.search_query().to_string();
            let response = ui.add(
                egui::TextEdit::singleline(&mut query).hint_text(SEARCH_HINT),
            );
            if response.changed() {
                events.push(Event::QueryChange(query));
            }

            let results = controller.search_results();
            if results.is_empty() {
                return;
            }
            ui.separator();
            egui::ScrollArea::vertical()
                .max_height(240.0)
                .show(ui, |ui| {
                    for feature in results {
                        if ui.link(polygon_label(feature)).clicked() {
                            events.push(Event::SearchResultSelect(feature.clone()));
                        }
                    }
                });
        });
}

fn country_window(ctx: &egui::Context, controller: &GlobeController) {
    let hovered = controller.hovered();
    let selected = controller.selected();
    if hovered.is_none() && selected.is_none() {
        return;
    }

    egui::Window::new("Country")
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            if let Some(feature) = selected {
                ui.heading("Selected");
                country_details(ui, feature);
            }
            if let Some(feature) = hovered {
                if selected.is_some() {
                    ui.separator();
                }
                ui.heading("Hovered");
                country_details(ui, feature);
            }
        });
}

fn country_details(ui: &mut egui::Ui, feature: &CountryFeature) {
    egui::Grid::new(("country_details", feature.iso_a2.as_str()))
        .num_columns(2)
        .show(ui, |ui| {
            ui.label("Name");
            ui.label(&feature.admin);
            ui.end_row();

            ui.label("ISO A2");
            ui.label(&feature.iso_a2);
            ui.end_row();

            ui.label("Population");
            ui.label(feature.pop_est.map_or_else(|| "unknown".to_string(), format_population));
            ui.end_row();
        });
}

fn status_window(ctx: &egui::Context, controller: &GlobeController) {
    let altitude = controller
        .last_altitude()
        .map_or_else(|| "-".to_string(), |altitude| format!("{altitude:.2}"));

    egui::Window::new("Status")
        .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            ui.label(format!("Countries: {}", controller.store().len()));
            ui.label(format!("Altitude: {altitude}"));
            ui.label(format!(
                "Markers: {} countries, {} cities",
                controller.country_markers().len(),
                controller.city_markers().len()
            ));
            let loading = controller.pending_city_loads();
            if loading > 0 {
                ui.label(format!("Loading cities: {loading}"));
            }
            ui.label(format!(
                "Auto-rotate: {}",
                if controller.auto_rotate() { "on" } else { "off" }
            ));
            ui.separator();
            ui.label("Drag - Rotate");
            ui.label("Scroll - Zoom");
            ui.label("Click country - Select");
            ui.label("Click ocean - Reset");
        });
}

/// Format a population with thousands separators.
fn format_population(population: u64) -> String {
    let digits = population.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use geo::MultiPolygon;

    use super::*;

    #[test]
    fn test_format_population() {
        assert_eq!(format_population(0), "0");
        assert_eq!(format_population(999), "999");
        assert_eq!(format_population(1_000), "1,000");
        assert_eq!(format_population(206_139_589), "206,139,589");
        assert_eq!(format_population(1_397_715_000), "1,397,715,000");
    }

    #[test]
    fn test_search_matches_names_not_codes() {
        let nigeria = CountryFeature {
            admin: "Nigeria".to_string(),
            iso_a2: "NG".to_string(),
            pop_est: Some(200_000_000),
            label_anchor: None,
            geometry: MultiPolygon::new(Vec::new()),
        };
        let mut controller = GlobeController::default();
        controller.update(Event::BoundariesLoaded(Ok(vec![nigeria])));

        controller.update(Event::QueryChange("nigeria".to_string()));
        assert_eq!(controller.search_results().len(), 1);

        controller.update(Event::QueryChange("NG".to_string()));
        assert!(controller.search_results().is_empty());
        assert_eq!(SEARCH_HINT, "Country name");
    }
}
