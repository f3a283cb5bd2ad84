//! Globe and country polygon rendering.
//!
//! Each country becomes one entity with a cap mesh raised slightly above the
//! globe surface and a side mesh joining the cap to the surface. Cap colours
//! follow the controller's highlight state; outlines are drawn with gizmos.

use std::sync::Arc;

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use geo::{LineString, Polygon};
use geoglobe::style::POLYGON_ALTITUDE;
use geoglobe::{CountryFeature, Highlight, Rgba};

use crate::coords::{GLOBE_RADIUS, lat_lng_to_vec3};
use crate::loader::GlobeState;

/// Longest triangle edge, in degrees, before it is split.
///
/// Keeps large caps from cutting through the globe between vertices.
const MAX_EDGE_DEG: f64 = 4.0;

/// Plugin for the globe and country polygons.
pub struct GlobePlugin;

impl Plugin for GlobePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_globe)
            .add_systems(Update, (rebuild_countries, update_cap_colors, draw_outlines).chain());
    }
}

/// A rendered country.
#[derive(Component)]
pub struct CountryPolygon {
    pub feature: Arc<CountryFeature>,
    cap_material: Handle<StandardMaterial>,
    highlight: Highlight,
    /// Outline rings projected onto the cap.
    outlines: Vec<Vec<Vec3>>,
}

/// Convert a palette colour to a Bevy colour.
pub fn to_color(color: Rgba) -> Color {
    let [r, g, b, a] = color.to_f32_array();
    Color::srgba(r, g, b, a)
}

fn flat_material(color: Rgba) -> StandardMaterial {
    StandardMaterial {
        base_color: to_color(color),
        alpha_mode: if color.a < 1.0 {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        },
        unlit: true,
        ..default()
    }
}

/// Spawn the globe sphere.
fn spawn_globe(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    #[allow(clippy::cast_possible_truncation)]
    let sphere = Sphere::new(GLOBE_RADIUS as f32).mesh().uv(128, 64);

    commands.spawn((
        Mesh3d(meshes.add(sphere)),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.02, 0.05, 0.12),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::default(),
    ));
}

/// Replace the country entities whenever the feature store changes.
#[allow(clippy::needless_pass_by_value)]
fn rebuild_countries(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    globe: Res<GlobeState>,
    existing: Query<Entity, With<CountryPolygon>>,
    mut revision: Local<u64>,
) {
    let store = globe.controller.store();
    if store.revision() == *revision {
        return;
    }
    *revision = store.revision();

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let palette = globe.controller.config().palette;
    let side_material = materials.add(flat_material(palette.side));

    for feature in store.features() {
        let polygons = &feature.geometry.0;
        let highlight = globe.controller.highlight(feature);
        let cap_material = materials.add(flat_material(palette.cap_color(highlight)));

        commands
            .spawn((
                Mesh3d(meshes.add(cap_mesh(polygons))),
                MeshMaterial3d(cap_material.clone()),
                Transform::default(),
                CountryPolygon {
                    feature: Arc::clone(feature),
                    cap_material,
                    highlight,
                    outlines: polygons.iter().flat_map(outline_rings).collect(),
                },
            ))
            .with_child((
                Mesh3d(meshes.add(side_mesh(polygons))),
                MeshMaterial3d(side_material.clone()),
                Transform::default(),
            ));
    }

    tracing::info!(countries = store.len(), "Built country polygons");
}

/// Recolour caps whose highlight changed.
#[allow(clippy::needless_pass_by_value)]
fn update_cap_colors(
    globe: Res<GlobeState>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut countries: Query<&mut CountryPolygon>,
) {
    for mut country in &mut countries {
        let highlight = globe.controller.highlight(&country.feature);
        if highlight == country.highlight {
            continue;
        }
        country.highlight = highlight;

        if let Some(mut material) = materials.get_mut(&country.cap_material) {
            *material = flat_material(globe.controller.config().palette.cap_color(highlight));
        }
    }
}

/// Draw country outlines in the stroke colour.
#[allow(clippy::needless_pass_by_value)]
fn draw_outlines(globe: Res<GlobeState>, countries: Query<&CountryPolygon>, mut gizmos: Gizmos) {
    let stroke = to_color(globe.controller.stroke_color());
    for country in &countries {
        for ring in &country.outlines {
            gizmos.linestrip(ring.iter().copied(), stroke);
        }
    }
}

/// A ring's vertices as `[lng, lat]`, without the closing duplicate.
fn ring_coords(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    let mut coords: Vec<[f64; 2]> = ring.coords().map(|c| [c.x, c.y]).collect();
    if coords.len() >= 2 && coords.first() == coords.last() {
        coords.pop();
    }
    coords
}

/// Triangulate a polygon in longitude/latitude space.
///
/// Returns triangles as `[lng, lat]` corner triples, subdivided until no edge
/// is longer than [`MAX_EDGE_DEG`].
pub fn triangulate(polygon: &Polygon<f64>) -> Vec<[[f64; 2]; 3]> {
    let mut vertices = ring_coords(polygon.exterior());
    if vertices.len() < 3 {
        return Vec::new();
    }

    let mut hole_indices = Vec::with_capacity(polygon.interiors().len());
    for interior in polygon.interiors() {
        let ring = ring_coords(interior);
        if ring.len() >= 3 {
            hole_indices.push(vertices.len());
            vertices.extend(ring);
        }
    }

    let flat: Vec<f64> = vertices.iter().flatten().copied().collect();
    let indices = match earcutr::earcut(&flat, &hole_indices, 2) {
        Ok(indices) => indices,
        Err(e) => {
            tracing::warn!("Failed to triangulate polygon: {:?}", e);
            return Vec::new();
        }
    };

    let mut triangles = Vec::with_capacity(indices.len() / 3);
    for corner in indices.chunks_exact(3) {
        subdivide(
            [vertices[corner[0]], vertices[corner[1]], vertices[corner[2]]],
            &mut triangles,
        );
    }
    triangles
}

fn subdivide(triangle: [[f64; 2]; 3], out: &mut Vec<[[f64; 2]; 3]>) {
    let [a, b, c] = triangle;
    let longest = [distance(a, b), distance(b, c), distance(c, a)]
        .into_iter()
        .fold(0.0, f64::max);

    if longest <= MAX_EDGE_DEG {
        out.push(triangle);
        return;
    }

    let ab = midpoint(a, b);
    let bc = midpoint(b, c);
    let ca = midpoint(c, a);
    subdivide([a, ab, ca], out);
    subdivide([ab, b, bc], out);
    subdivide([ca, bc, c], out);
    subdivide([ab, bc, ca], out);
}

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

fn midpoint(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0]
}

fn to_world(coord: [f64; 2], altitude: f64) -> Vec3 {
    lat_lng_to_vec3(coord[1], coord[0], altitude)
}

/// Build the raised cap mesh for a country's polygons.
fn cap_mesh(polygons: &[Polygon<f64>]) -> Mesh {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    for polygon in polygons {
        for triangle in triangulate(polygon) {
            for corner in triangle {
                let position = to_world(corner, POLYGON_ALTITUDE);
                positions.push(position.to_array());
                normals.push(position.normalize().to_array());
            }
        }
    }

    build_mesh(positions, normals)
}

/// Build the walls between the globe surface and the cap outline.
fn side_mesh(polygons: &[Polygon<f64>]) -> Mesh {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    for polygon in polygons {
        let ring = ring_coords(polygon.exterior());
        for (index, &start) in ring.iter().enumerate() {
            let end = ring[(index + 1) % ring.len()];
            let quad = [
                to_world(start, 0.0),
                to_world(end, 0.0),
                to_world(end, POLYGON_ALTITUDE),
                to_world(start, POLYGON_ALTITUDE),
            ];
            let normal = (quad[1] - quad[0])
                .cross(quad[3] - quad[0])
                .normalize_or_zero()
                .to_array();

            for corner in [0, 1, 2, 0, 2, 3] {
                positions.push(quad[corner].to_array());
                normals.push(normal);
            }
        }
    }

    build_mesh(positions, normals)
}

#[allow(clippy::cast_possible_truncation)]
fn build_mesh(positions: Vec<[f32; 3]>, normals: Vec<[f32; 3]>) -> Mesh {
    let indices: Vec<u32> = (0..positions.len() as u32).collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Outline rings (exterior and holes) lifted just above the cap.
fn outline_rings(polygon: &Polygon<f64>) -> Vec<Vec<Vec3>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| {
            ring.coords()
                .map(|c| to_world([c.x, c.y], POLYGON_ALTITUDE * 1.05))
                .collect()
        })
        .collect()
}
