//! Geographic coordinates and earth models
//!
//! This module handles:
//! - The immutable `Coordinate` value type and its range validation
//! - Selecting the earth model used by the geodesic solver
//! - Direct/inverse geodesic helpers (see [`geodesic`])

pub mod geodesic;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude) in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Create new coordinates
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Validate that coordinates are finite and within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(Error::InvalidCoordinates(format!(
                "Coordinates ({}, {}) must be finite",
                self.lat, self.lon
            )));
        }
        if self.lat < -90.0 || self.lat > 90.0 {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if self.lon < -180.0 || self.lon > 180.0 {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }

    /// Coordinates in GeoJSON/KML axis order: [lon, lat]
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Earth model used to solve the direct geodesic problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarthModel {
    /// Great-circle formula on a sphere of mean earth radius
    #[default]
    Sphere,
    /// Vincenty's direct formula on the WGS84 ellipsoid
    Wgs84,
}

impl std::fmt::Display for EarthModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sphere => write!(f, "sphere"),
            Self::Wgs84 => write!(f, "wgs84"),
        }
    }
}

impl std::str::FromStr for EarthModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sphere" | "spherical" => Ok(Self::Sphere),
            "wgs84" | "wgs-84" | "ellipsoid" => Ok(Self::Wgs84),
            _ => Err(format!("Unknown earth model: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(Coordinate::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinate::new(-90.0, -180.0).validate().is_ok());
        assert!(Coordinate::new(35.627, 139.585).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(Coordinate::new(91.0, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, -180.5).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let err = Coordinate::new(f64::NAN, 0.0).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidCoordinates(_)));
    }

    #[test]
    fn test_earth_model_parse() {
        assert_eq!(EarthModel::from_str("sphere").unwrap(), EarthModel::Sphere);
        assert_eq!(EarthModel::from_str("WGS84").unwrap(), EarthModel::Wgs84);
        assert!(EarthModel::from_str("flat").is_err());
    }
}
