//! Coordinate conversion utilities.
//!
//! The globe is a sphere of [`GLOBE_RADIUS`] centred on the origin with `+Y`
//! through the north pole and `+Z` through (0°, 0°). Altitudes are expressed
//! in globe radii above the surface.

use bevy::math::Ray3d;
use geoglobe::LatLng;
use glam::{DVec3, Vec3};

/// Globe radius in world units.
pub const GLOBE_RADIUS: f64 = 100.0;

/// Convert a geographic position and altitude (globe radii) to world space.
pub fn lat_lng_to_world(lat_deg: f64, lng_deg: f64, altitude: f64) -> DVec3 {
    let radius = GLOBE_RADIUS * (1.0 + altitude);
    let lat = lat_deg.to_radians();
    let lng = lng_deg.to_radians();
    DVec3::new(
        radius * lat.cos() * lng.sin(),
        radius * lat.sin(),
        radius * lat.cos() * lng.cos(),
    )
}

/// Single-precision variant of [`lat_lng_to_world`] for mesh and gizmo data.
pub fn lat_lng_to_vec3(lat_deg: f64, lng_deg: f64, altitude: f64) -> Vec3 {
    lat_lng_to_world(lat_deg, lng_deg, altitude).as_vec3()
}

/// Convert a world-space position back to latitude and longitude.
pub fn world_to_lat_lng(position: DVec3) -> LatLng {
    let lat = (position.y / position.length()).clamp(-1.0, 1.0).asin();
    let lng = position.x.atan2(position.z);
    LatLng::new(lat.to_degrees(), lng.to_degrees())
}

/// Where `ray` first meets the globe surface, if it does.
pub fn ray_globe_intersection(ray: Ray3d) -> Option<DVec3> {
    let origin = ray.origin.as_dvec3();
    let direction = ray.direction.as_dvec3();

    // |origin + t * direction|^2 = r^2 with a unit direction.
    let b = origin.dot(direction);
    let c = origin.length_squared() - GLOBE_RADIUS * GLOBE_RADIUS;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t = if -b - root >= 0.0 { -b - root } else { -b + root };
    (t >= 0.0).then(|| origin + direction * t)
}

/// Wrap a longitude into `[-180, 180)`.
pub fn wrap_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

/// Shortest signed longitude difference from `from` to `to`.
pub fn lng_delta(from: f64, to: f64) -> f64 {
    wrap_lng(to - from)
}

/// Cubic ease-in-out over `t` in `[0, 1]`.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::Dir3;

    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_axes() {
        let origin = lat_lng_to_world(0.0, 0.0, 0.0);
        assert!(approx(origin.z, GLOBE_RADIUS));

        let north = lat_lng_to_world(90.0, 0.0, 0.0);
        assert!(approx(north.y, GLOBE_RADIUS));

        let east = lat_lng_to_world(0.0, 90.0, 1.0);
        assert!(approx(east.x, 2.0 * GLOBE_RADIUS));
    }

    #[test]
    fn test_lat_lng_round_trip() {
        for (lat, lng) in [(9.072_264, 7.491_302), (-33.9, 151.2), (40.7, -74.0)] {
            let back = world_to_lat_lng(lat_lng_to_world(lat, lng, 0.3));
            assert!(approx(back.lat, lat));
            assert!(approx(back.lng, lng));
        }
    }

    #[test]
    fn test_ray_hits_near_side() {
        let ray = Ray3d::new(Vec3::new(0.0, 0.0, 300.0), Dir3::NEG_Z);
        let hit = ray_globe_intersection(ray).unwrap();
        assert!((hit.z - GLOBE_RADIUS).abs() < 1e-3);

        let position = world_to_lat_lng(hit);
        assert!(position.lat.abs() < 1e-6);
        assert!(position.lng.abs() < 1e-6);
    }

    #[test]
    fn test_ray_misses() {
        let ray = Ray3d::new(Vec3::new(0.0, 150.0, 300.0), Dir3::NEG_Z);
        assert!(ray_globe_intersection(ray).is_none());

        let away = Ray3d::new(Vec3::new(0.0, 0.0, 300.0), Dir3::Z);
        assert!(ray_globe_intersection(away).is_none());
    }

    #[test]
    fn test_lng_delta_takes_short_way() {
        assert!(approx(lng_delta(170.0, -170.0), 20.0));
        assert!(approx(lng_delta(-170.0, 170.0), -20.0));
        assert!(approx(wrap_lng(540.0), -180.0));
    }

    #[test]
    fn test_easing_endpoints() {
        assert!(approx(ease_in_out_cubic(0.0), 0.0));
        assert!(approx(ease_in_out_cubic(0.5), 0.5));
        assert!(approx(ease_in_out_cubic(1.0), 1.0));
        assert!(approx(ease_in_out_cubic(2.0), 1.0));
    }
}
