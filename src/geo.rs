//! Great-circle kernels over WGS84 decimal degrees.
//!
//! All kernels take [`Point`]s, which are valid by construction, so null
//! coordinates never reach this module; operators treat a missing coordinate
//! as an absent ping instead. Formulas are the standard spherical ones and
//! are safe across the antimeridian. At the poles a bearing is still
//! returned but its value is implementation-defined; callers must not
//! ascribe meaning to it.

use crate::Point;

/// Mean Earth radius in meters, as used by every kernel in this module.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters.
pub fn haversine_m(a: &Point, b: &Point) -> f64 {
    let phi1 = a.latitude().to_radians();
    let phi2 = b.latitude().to_radians();
    let dphi = (b.latitude() - a.latitude()).to_radians();
    let dlambda = (b.longitude() - a.longitude()).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Initial bearing of the great-circle from `a` to `b`, in degrees in
/// `[0, 360)` clockwise from true north.
pub fn initial_bearing_deg(a: &Point, b: &Point) -> f64 {
    let phi1 = a.latitude().to_radians();
    let phi2 = b.latitude().to_radians();
    let dlambda = (b.longitude() - a.longitude()).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Unsigned turn between two bearings, in degrees in `[0, 180]`.
///
/// Computed as `180 - |180 - |b2 - b1||`, so a 350 degree difference reads
/// as the 10 degree turn it is.
pub fn angular_delta_deg(b1: f64, b2: f64) -> f64 {
    180.0 - (180.0 - (b2 - b1).abs()).abs()
}

/// Midpoint of the great-circle segment between `a` and `b`.
pub fn spherical_midpoint(a: &Point, b: &Point) -> Point {
    let phi1 = a.latitude().to_radians();
    let phi2 = b.latitude().to_radians();
    let lambda1 = a.longitude().to_radians();
    let dlambda = (b.longitude() - a.longitude()).to_radians();

    let bx = phi2.cos() * dlambda.cos();
    let by = phi2.cos() * dlambda.sin();

    let phi_m = (phi1.sin() + phi2.sin())
        .atan2(((phi1.cos() + bx).powi(2) + by.powi(2)).sqrt());
    let lambda_m = lambda1 + by.atan2(phi1.cos() + bx);

    let latitude = phi_m.to_degrees();
    // lambda_m lies in [-2pi, 2pi]; fold back into [-180, 180]
    let longitude = (lambda_m.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
    Point::new_unchecked(latitude, longitude)
}

/// Cumulative great-circle length of a path, in meters. Zero for paths of
/// fewer than two points.
pub fn path_length_m<I>(points: I) -> f64
where
    I: IntoIterator<Item = Point>,
{
    let mut total = 0.0;
    let mut prev: Option<Point> = None;
    for point in points {
        if let Some(p) = prev {
            total += haversine_m(&p, &point);
        }
        prev = Some(point);
    }
    total
}
