//! Rhumb-line bearing and distance, and compass point names.

use std::f64::consts::{FRAC_PI_4, PI};

/// Mean earth radius used for rhumb distances, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6367.0;

/// Sixteen compass points starting at north, with north repeated at the end
/// so that headings just under 360 round onto it.
pub const COMPASS: [&str; 17] = [
    "north",
    "north by northeast",
    "northeast",
    "east by northeast",
    "east",
    "east by southeast",
    "southeast",
    "south by southeast",
    "south",
    "south by southwest",
    "southwest",
    "west by southwest",
    "west",
    "west by northwest",
    "northwest",
    "north by northwest",
    "north",
];

fn project(lat: f64) -> f64 {
    (FRAC_PI_4 + lat / 2.0).tan()
}

fn wrap_longitude(delta: f64) -> f64 {
    if delta.abs() > PI {
        if delta > 0.0 {
            -(2.0 * PI - delta)
        } else {
            2.0 * PI + delta
        }
    } else {
        delta
    }
}

/// Difference in isometric latitude from `a` to `b`, radians in and out.
fn delta_psi(lat_a: f64, lat_b: f64) -> f64 {
    let mut base = project(lat_a);
    if base == 0.0 {
        base = 0.01;
    }
    (project(lat_b) / base).ln()
}

/// Constant bearing, in degrees `0..360`, that leads from the target at
/// `(lat2, lon2)` to the observer at `(lat1, lon1)`.
///
/// Measured from the target so it reads as "north of" the target rather
/// than "south to" it.
pub fn rhumb_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat_a, lon_a) = (lat2.to_radians(), lon2.to_radians());
    let (lat_b, lon_b) = (lat1.to_radians(), lon1.to_radians());
    let d_lambda = wrap_longitude(lon_b - lon_a);
    d_lambda
        .atan2(delta_psi(lat_a, lat_b))
        .to_degrees()
        .rem_euclid(360.0)
}

/// Rhumb-line distance between two points in kilometers.
pub fn rhumb_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat_a, lon_a) = (lat2.to_radians(), lon2.to_radians());
    let (lat_b, lon_b) = (lat1.to_radians(), lon1.to_radians());

    let d_phi = lat_b - lat_a;
    let d_psi = delta_psi(lat_a, lat_b);
    let q = if d_psi.abs() > 10e-12 {
        d_phi / d_psi
    } else {
        lat_a.cos()
    };
    let d_lambda = wrap_longitude(lon_b - lon_a);

    (d_phi * d_phi + q * q * d_lambda * d_lambda).sqrt() * EARTH_RADIUS_KM
}

/// Name of the compass point nearest to `heading` degrees.
pub fn compass_point(heading: f64) -> &'static str {
    let index = (heading.rem_euclid(360.0) / 22.5).round() as usize;
    COMPASS[index.min(COMPASS.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_north_of_target() {
        let h = rhumb_bearing(47.0, -122.0, 40.0, -122.0);
        assert!(h < 0.5 || h > 359.5, "heading {h}");
        assert_eq!(compass_point(h), "north");
    }

    #[test]
    fn due_west_of_target() {
        let h = rhumb_bearing(0.0, -10.0, 0.0, 10.0);
        assert!((h - 270.0).abs() < 0.5, "heading {h}");
        assert_eq!(compass_point(h), "west");
    }

    #[test]
    fn seven_degrees_of_latitude() {
        let d = rhumb_distance_km(47.0, -122.0, 40.0, -122.0);
        assert!((d - 777.9).abs() < 1.0, "distance {d}");
    }

    #[test]
    fn same_point_is_zero_distance() {
        assert!(rhumb_distance_km(40.8, -119.2, 40.8, -119.2) < 1e-6);
    }

    #[test]
    fn compass_rounding() {
        assert_eq!(compass_point(0.0), "north");
        assert_eq!(compass_point(11.0), "north");
        assert_eq!(compass_point(12.0), "north by northeast");
        assert_eq!(compass_point(135.0), "southeast");
        assert_eq!(compass_point(355.0), "north");
        assert_eq!(compass_point(-90.0), "west");
    }
}
