//! Geodesic point solver
//!
//! Solves the direct problem (origin + bearing + distance -> destination) on
//! either a sphere or the WGS84 ellipsoid, plus the haversine distance and
//! initial bearing helpers used for validation and tour instructions.

use crate::constants::geo::{EARTH_RADIUS_METERS, WGS84_A, WGS84_F};
use crate::coord::{Coordinate, EarthModel};
use crate::error::{Error, Result};

const VINCENTY_TOLERANCE: f64 = 1e-12;
const VINCENTY_MAX_ITERATIONS: usize = 200;

/// Normalize a bearing into [0, 360)
pub fn normalize_bearing(bearing: f64) -> f64 {
    let b = bearing.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if b >= 360.0 {
        0.0
    } else {
        b
    }
}

/// Wrap a longitude into [-180, 180)
pub fn normalize_longitude(lon: f64) -> f64 {
    if (-180.0..180.0).contains(&lon) {
        return lon;
    }
    let l = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if l >= 180.0 {
        -180.0
    } else {
        l
    }
}

/// Compute the destination reached from `origin` travelling `distance_meters`
/// along the initial `bearing_degrees`
///
/// # Arguments
/// * `origin` - Starting coordinate
/// * `bearing_degrees` - Initial bearing, clockwise from north (any value, normalized mod 360)
/// * `distance_meters` - Distance to travel (must be >= 0)
/// * `model` - Earth model to solve on
///
/// # Returns
/// The destination, with longitude wrapped into [-180, 180)
pub fn destination(
    origin: Coordinate,
    bearing_degrees: f64,
    distance_meters: f64,
    model: EarthModel,
) -> Result<Coordinate> {
    if !origin.lat.is_finite() || !origin.lon.is_finite() {
        return Err(Error::InvalidGeometryInput(format!(
            "origin ({}, {}) is not finite",
            origin.lat, origin.lon
        )));
    }
    if !bearing_degrees.is_finite() {
        return Err(Error::InvalidGeometryInput(format!(
            "bearing {} is not finite",
            bearing_degrees
        )));
    }
    if !distance_meters.is_finite() || distance_meters < 0.0 {
        return Err(Error::InvalidGeometryInput(format!(
            "distance {} must be finite and >= 0",
            distance_meters
        )));
    }

    let bearing = normalize_bearing(bearing_degrees);
    if distance_meters == 0.0 {
        return Ok(Coordinate::new(origin.lat, normalize_longitude(origin.lon)));
    }

    let dest = match model {
        EarthModel::Sphere => spherical_destination(origin, bearing, distance_meters),
        EarthModel::Wgs84 => vincenty_destination(origin, bearing, distance_meters),
    };

    Ok(Coordinate::new(
        dest.lat.clamp(-90.0, 90.0),
        normalize_longitude(dest.lon),
    ))
}

/// Great-circle forward solution on a sphere of mean earth radius
fn spherical_destination(origin: Coordinate, bearing: f64, distance: f64) -> Coordinate {
    let delta = distance / EARTH_RADIUS_METERS;
    let theta = bearing.to_radians();
    let phi1 = origin.lat.to_radians();
    let lambda1 = origin.lon.to_radians();

    let sin_phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos())
        .clamp(-1.0, 1.0);
    let phi2 = sin_phi2.asin();

    let y = theta.sin() * delta.sin() * phi1.cos();
    let x = delta.cos() - phi1.sin() * sin_phi2;
    let lambda2 = lambda1 + y.atan2(x);

    Coordinate::new(phi2.to_degrees(), lambda2.to_degrees())
}

/// Vincenty's direct formula on the WGS84 ellipsoid
fn vincenty_destination(origin: Coordinate, bearing: f64, distance: f64) -> Coordinate {
    let a = WGS84_A;
    let f = WGS84_F;
    let b = a * (1.0 - f);

    let alpha1 = bearing.to_radians();
    let (sin_alpha1, cos_alpha1) = alpha1.sin_cos();

    let tan_u1 = (1.0 - f) * origin.lat.to_radians().tan();
    let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
    let sin_u1 = tan_u1 * cos_u1;

    let sigma1 = tan_u1.atan2(cos_alpha1);
    let sin_alpha = cos_u1 * sin_alpha1;
    let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
    let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));

    let mut sigma = distance / (b * big_a);
    let mut cos_2sigma_m;
    let mut sin_sigma;
    let mut cos_sigma;
    let mut iterations = 0;
    loop {
        cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
        sin_sigma = sigma.sin();
        cos_sigma = sigma.cos();
        let delta_sigma = big_b
            * sin_sigma
            * (cos_2sigma_m
                + big_b / 4.0
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                        - big_b / 6.0
                            * cos_2sigma_m
                            * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                            * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));
        let previous = sigma;
        sigma = distance / (b * big_a) + delta_sigma;
        iterations += 1;
        if (sigma - previous).abs() < VINCENTY_TOLERANCE || iterations >= VINCENTY_MAX_ITERATIONS {
            break;
        }
    }

    let x = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
    let phi2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
        .atan2((1.0 - f) * (sin_alpha * sin_alpha + x * x).sqrt());
    let lambda = (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
    let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
    let l = lambda
        - (1.0 - c)
            * f
            * sin_alpha
            * (sigma
                + c * sin_sigma
                    * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

    Coordinate::new(phi2.to_degrees(), origin.lon + l.to_degrees())
}

/// Calculate the distance between two points in meters (Haversine formula)
pub fn haversine_distance(p1: Coordinate, p2: Coordinate) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lon = (p2.lon - p1.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Initial compass bearing from `from` towards `to`, in [0, 360)
pub fn initial_bearing(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let y = delta_lon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lon.cos();
    normalize_bearing(y.atan2(x).to_degrees())
}
