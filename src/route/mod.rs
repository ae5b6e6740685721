//! Route request model and ring/spoke geometry
//!
//! This module handles:
//! - Validating raw route parameters into a `RouteRequest`
//! - Building the ring/spoke waypoint grid (see [`grid`])
//! - Assembling waypoints into spokes, rings and a tour (see [`assemble`], [`tour`])

pub mod assemble;
pub mod grid;
pub mod tour;

use crate::constants::route::{
    DEFAULT_SEGMENT_LENGTH, MAX_BEARINGS, MAX_GRID_POINTS, MIN_POINTS_PER_BEARING,
};
use crate::coord::geodesic::normalize_bearing;
use crate::coord::{Coordinate, EarthModel};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub use assemble::{assemble, RouteGeometry};
pub use grid::build_grid;

/// How the number of arc points grows with ring index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityPolicy {
    /// Ring `r` gets `base * (r + 1)` points
    #[default]
    Linear,
    /// Every ring gets `base` points
    Constant,
}

impl DensityPolicy {
    /// Number of arc points for a ring given the effective base density
    pub fn points_for_ring(&self, base: usize, ring: usize) -> usize {
        match self {
            Self::Linear => base.saturating_mul(ring.saturating_add(1)),
            Self::Constant => base,
        }
    }

    /// Arc points summed over `rings` rings, or `None` on overflow
    pub fn total_points(&self, base: usize, rings: usize) -> Option<usize> {
        match self {
            // base * rings * (rings + 1) / 2
            Self::Linear => {
                let (even, odd) = if rings % 2 == 0 {
                    (rings / 2, rings.checked_add(1)?)
                } else {
                    (rings.checked_add(1)? / 2, rings)
                };
                base.checked_mul(even)?.checked_mul(odd)
            }
            Self::Constant => base.checked_mul(rings),
        }
    }
}

impl std::fmt::Display for DensityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Constant => write!(f, "constant"),
        }
    }
}

impl std::str::FromStr for DensityPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "constant" => Ok(Self::Constant),
            _ => Err(format!("Unknown density policy: {}", s)),
        }
    }
}

/// Unvalidated route parameters as received from a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteParams {
    pub lat: f64,
    pub lon: f64,
    pub azimuths: Vec<f64>,
    pub num_circles: i64,
    pub points_per_circle_base: i64,
    pub max_distance: f64,
    #[serde(default)]
    pub density: DensityPolicy,
    #[serde(default = "default_ring_arcs")]
    pub ring_arcs: bool,
    #[serde(default)]
    pub earth_model: EarthModel,
    #[serde(default = "default_segment_length")]
    pub segment_length: f64,
}

fn default_ring_arcs() -> bool {
    true
}
fn default_segment_length() -> f64 {
    DEFAULT_SEGMENT_LENGTH
}

impl RouteParams {
    /// Validate and normalize into a `RouteRequest`
    ///
    /// Checks run in the same order as [`RouteRequest::validate`].
    pub fn into_request(self) -> Result<RouteRequest> {
        let num_circles = positive_count("num_circles", self.num_circles);
        let points_per_circle_base =
            positive_count("points_per_circle_base", self.points_per_circle_base);

        let request = RouteRequest {
            origin: Coordinate::new(self.lat, self.lon),
            bearings: self.azimuths.iter().map(|b| normalize_bearing(*b)).collect(),
            num_circles: *num_circles.as_ref().unwrap_or(&0),
            points_per_circle_base: *points_per_circle_base.as_ref().unwrap_or(&0),
            max_distance: self.max_distance,
            density: self.density,
            ring_arcs: self.ring_arcs,
            earth_model: self.earth_model,
            segment_length: self.segment_length,
        };
        request.validate_site()?;
        num_circles?;
        points_per_circle_base?;
        request.validate()?;
        Ok(request)
    }
}

fn positive_count(field: &'static str, value: i64) -> Result<usize> {
    match usize::try_from(value) {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(Error::NonPositiveParameter {
            field,
            value: value as f64,
        }),
    }
}

/// A validated route request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: Coordinate,
    /// Bearings in degrees, normalized into [0, 360), insertion order preserved
    pub bearings: Vec<f64>,
    pub num_circles: usize,
    pub points_per_circle_base: usize,
    /// Outer ring radius in meters
    pub max_distance: f64,
    pub density: DensityPolicy,
    /// Whether to interpolate points around each ring's circumference
    pub ring_arcs: bool,
    pub earth_model: EarthModel,
    /// Target tour segment length in meters
    pub segment_length: f64,
}

impl RouteRequest {
    /// Create a request with default density, arcs, earth model and segment length
    pub fn new(
        origin: Coordinate,
        bearings: Vec<f64>,
        num_circles: usize,
        points_per_circle_base: usize,
        max_distance: f64,
    ) -> Result<Self> {
        let request = Self {
            origin,
            bearings: bearings.into_iter().map(normalize_bearing).collect(),
            num_circles,
            points_per_circle_base,
            max_distance,
            density: DensityPolicy::default(),
            ring_arcs: true,
            earth_model: EarthModel::default(),
            segment_length: DEFAULT_SEGMENT_LENGTH,
        };
        request.validate()?;
        Ok(request)
    }

    /// Set the density policy
    pub fn with_density(mut self, density: DensityPolicy) -> Self {
        self.density = density;
        self
    }

    /// Enable or disable ring arcs
    pub fn with_ring_arcs(mut self, ring_arcs: bool) -> Self {
        self.ring_arcs = ring_arcs;
        self
    }

    /// Set the earth model
    pub fn with_earth_model(mut self, earth_model: EarthModel) -> Self {
        self.earth_model = earth_model;
        self
    }

    /// Set the tour segment length
    pub fn with_segment_length(mut self, segment_length: f64) -> Self {
        self.segment_length = segment_length;
        self
    }

    /// Check every field; runs before any geometry is computed
    pub fn validate(&self) -> Result<()> {
        self.validate_site()?;

        if self.num_circles == 0 {
            return Err(Error::NonPositiveParameter {
                field: "num_circles",
                value: 0.0,
            });
        }
        if self.points_per_circle_base == 0 {
            return Err(Error::NonPositiveParameter {
                field: "points_per_circle_base",
                value: 0.0,
            });
        }
        if !self.max_distance.is_finite() {
            return Err(Error::InvalidGeometryInput(format!(
                "max_distance {} is not finite",
                self.max_distance
            )));
        }
        if self.max_distance <= 0.0 {
            return Err(Error::NonPositiveParameter {
                field: "max_distance",
                value: self.max_distance,
            });
        }
        if !self.segment_length.is_finite() || self.segment_length <= 0.0 {
            return Err(Error::NonPositiveParameter {
                field: "segment_length",
                value: self.segment_length,
            });
        }
        match self.checked_grid_size() {
            Some(size) if size <= MAX_GRID_POINTS => Ok(()),
            _ => Err(Error::GridTooLarge {
                num_circles: self.num_circles,
                points_per_circle_base: self.points_per_circle_base,
                max: MAX_GRID_POINTS,
            }),
        }
    }

    /// Origin and bearing checks
    fn validate_site(&self) -> Result<()> {
        self.origin.validate()?;

        if self.bearings.is_empty() {
            return Err(Error::EmptyBearingSet);
        }
        if self.bearings.len() > MAX_BEARINGS {
            return Err(Error::TooManyBearings {
                count: self.bearings.len(),
                max: MAX_BEARINGS,
            });
        }
        if let Some(bad) = self
            .bearings
            .iter()
            .find(|b| !b.is_finite() || **b < 0.0 || **b >= 360.0)
        {
            return Err(Error::InvalidGeometryInput(format!(
                "bearing {} is not in [0, 360)",
                bad
            )));
        }

        Ok(())
    }

    /// Base density after raising it so each bearing gets a minimum share
    pub fn effective_base(&self) -> usize {
        self.points_per_circle_base
            .max(self.bearings.len().saturating_mul(MIN_POINTS_PER_BEARING))
    }

    /// Radius in meters of ring `ring` (0 = innermost)
    pub fn ring_radius(&self, ring: usize) -> f64 {
        (ring + 1) as f64 * self.max_distance / self.num_circles as f64
    }

    /// Number of arc points on ring `ring`
    pub fn ring_point_count(&self, ring: usize) -> usize {
        self.density.points_for_ring(self.effective_base(), ring)
    }

    /// Total number of waypoints `build_grid` produces for this request
    ///
    /// Saturates at `usize::MAX`; validated requests never come close.
    pub fn grid_size(&self) -> usize {
        self.checked_grid_size().unwrap_or(usize::MAX)
    }

    /// Total number of waypoints, or `None` if it does not fit in `usize`
    pub fn checked_grid_size(&self) -> Option<usize> {
        let spokes = self.num_circles.checked_mul(self.bearings.len())?;
        if !self.ring_arcs {
            return Some(spokes);
        }
        let arcs = self
            .density
            .total_points(self.effective_base(), self.num_circles)?;
        spokes.checked_add(arcs)
    }
}

/// What part of the grid a waypoint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WaypointKind {
    /// Lies on spoke `spoke` (index into the request's bearings)
    Spoke { spoke: usize },
    /// Interpolated arc point `slot` around its ring
    Arc { slot: usize },
}

/// One computed point of the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub coord: Coordinate,
    /// 0-based ring index, innermost first
    pub ring: usize,
    /// Bearing from the origin used to compute this point
    pub bearing: f64,
    /// Distance from the origin in meters
    pub distance: f64,
    pub kind: WaypointKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RouteParams {
        RouteParams {
            lat: 35.6271473943848,
            lon: 139.58538125298406,
            azimuths: vec![0.0, 120.0, 240.0],
            num_circles: 4,
            points_per_circle_base: 8,
            max_distance: 1500.0,
            density: DensityPolicy::Linear,
            ring_arcs: true,
            earth_model: EarthModel::Sphere,
            segment_length: 500.0,
        }
    }

    #[test]
    fn test_params_into_request() {
        let req = params().into_request().unwrap();
        assert_eq!(req.bearings, vec![0.0, 120.0, 240.0]);
        assert_eq!(req.num_circles, 4);
        assert_eq!(req.ring_radius(0), 375.0);
        assert_eq!(req.ring_radius(3), 1500.0);
    }

    #[test]
    fn test_bearings_normalized_and_duplicates_kept() {
        let mut p = params();
        p.azimuths = vec![360.0, -90.0, 270.0];
        let req = p.into_request().unwrap();
        assert_eq!(req.bearings, vec![0.0, 270.0, 270.0]);
    }

    #[test]
    fn test_zero_circles_rejected() {
        let mut p = params();
        p.num_circles = 0;
        let err = p.into_request().unwrap_err();
        assert!(matches!(err, Error::NonPositiveParameter { field: "num_circles", .. }));
    }

    #[test]
    fn test_negative_base_rejected() {
        let mut p = params();
        p.points_per_circle_base = -3;
        let err = p.into_request().unwrap_err();
        assert!(matches!(
            err,
            Error::NonPositiveParameter { field: "points_per_circle_base", .. }
        ));
    }

    #[test]
    fn test_zero_distance_rejected() {
        let mut p = params();
        p.max_distance = 0.0;
        let err = p.into_request().unwrap_err();
        assert!(matches!(err, Error::NonPositiveParameter { field: "max_distance", .. }));
    }

    #[test]
    fn test_empty_bearings_rejected() {
        let mut p = params();
        p.azimuths.clear();
        assert!(matches!(p.into_request().unwrap_err(), Error::EmptyBearingSet));
    }

    #[test]
    fn test_too_many_bearings_rejected() {
        let mut p = params();
        p.azimuths = vec![0.0, 50.0, 100.0, 150.0, 200.0, 250.0, 300.0];
        assert!(matches!(
            p.into_request().unwrap_err(),
            Error::TooManyBearings { count: 7, max: 6 }
        ));
    }

    #[test]
    fn test_nan_bearing_rejected() {
        let mut p = params();
        p.azimuths = vec![f64::NAN];
        assert!(matches!(
            p.into_request().unwrap_err(),
            Error::InvalidGeometryInput(_)
        ));
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let mut p = params();
        p.lat = 95.0;
        assert!(matches!(
            p.into_request().unwrap_err(),
            Error::InvalidCoordinates(_)
        ));
    }

    #[test]
    fn test_linear_density_monotonic() {
        let req = params().into_request().unwrap();
        let counts: Vec<usize> = (0..4).map(|r| req.ring_point_count(r)).collect();
        assert_eq!(counts, vec![8, 16, 24, 32]);
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_constant_density() {
        let req = params().into_request().unwrap().with_density(DensityPolicy::Constant);
        assert!((0..4).all(|r| req.ring_point_count(r) == 8));
    }

    #[test]
    fn test_effective_base_raised_for_many_bearings() {
        let mut p = params();
        p.azimuths = vec![0.0, 60.0, 120.0, 180.0, 240.0, 300.0];
        p.points_per_circle_base = 4;
        let req = p.into_request().unwrap();
        assert_eq!(req.effective_base(), 12);
        assert_eq!(req.ring_point_count(0), 12);
    }

    #[test]
    fn test_grid_size() {
        let req = params().into_request().unwrap();
        assert_eq!(req.grid_size(), 12 + 8 + 16 + 24 + 32);
        let req = req.with_ring_arcs(false);
        assert_eq!(req.grid_size(), 12);
    }

    #[test]
    fn test_total_points_matches_per_ring_sum() {
        for policy in [DensityPolicy::Linear, DensityPolicy::Constant] {
            for rings in 0..9 {
                let summed: usize = (0..rings).map(|r| policy.points_for_ring(8, r)).sum();
                assert_eq!(policy.total_points(8, rings), Some(summed));
            }
        }
        assert_eq!(DensityPolicy::Linear.total_points(usize::MAX / 2, 3), None);
    }

    #[test]
    fn test_huge_base_rejected_without_overflow() {
        let err = RouteRequest::new(
            Coordinate::new(35.6, 139.5),
            vec![0.0],
            3,
            usize::MAX / 2,
            1500.0,
        )
        .unwrap_err();
        assert!(matches!(err, Error::GridTooLarge { max: MAX_GRID_POINTS, .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn test_huge_ring_count_rejected() {
        let mut p = params();
        p.num_circles = 2_000_000;
        let err = p.into_request().unwrap_err();
        assert!(matches!(err, Error::GridTooLarge { num_circles: 2_000_000, .. }));
        assert!(err.to_string().contains("num_circles"));

        let mut p = params();
        p.num_circles = i64::MAX;
        p.points_per_circle_base = i64::MAX;
        assert!(matches!(p.into_request().unwrap_err(), Error::GridTooLarge { .. }));
    }

    #[test]
    fn test_grid_limit_is_inclusive() {
        // 1 bearing, constant density: num_circles * (1 + base) points
        let req = RouteRequest::new(Coordinate::new(0.0, 0.0), vec![0.0], 1, 8, 100.0)
            .unwrap()
            .with_density(DensityPolicy::Constant);
        let mut at_limit = req.clone();
        at_limit.num_circles = MAX_GRID_POINTS / 9;
        assert!(at_limit.validate().is_ok());

        let mut over = req;
        over.num_circles = MAX_GRID_POINTS / 9 + 1;
        assert!(matches!(over.validate().unwrap_err(), Error::GridTooLarge { .. }));
    }

    #[test]
    fn test_grid_size_saturates_on_unvalidated_request() {
        let req = RouteRequest {
            num_circles: usize::MAX,
            ..params().into_request().unwrap()
        };
        assert_eq!(req.checked_grid_size(), None);
        assert_eq!(req.grid_size(), usize::MAX);
    }

    #[test]
    fn test_site_errors_reported_before_counts() {
        let mut p = params();
        p.azimuths.clear();
        p.num_circles = 0;
        assert!(matches!(p.into_request().unwrap_err(), Error::EmptyBearingSet));

        let mut p = params();
        p.lat = 95.0;
        p.points_per_circle_base = -1;
        assert!(matches!(
            p.into_request().unwrap_err(),
            Error::InvalidCoordinates(_)
        ));

        let mut p = params();
        p.num_circles = -3;
        match p.into_request().unwrap_err() {
            Error::NonPositiveParameter { field, value } => {
                assert_eq!(field, "num_circles");
                assert_eq!(value, -3.0);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_density_parse() {
        use std::str::FromStr;
        assert_eq!(DensityPolicy::from_str("Linear").unwrap(), DensityPolicy::Linear);
        assert_eq!(DensityPolicy::from_str("constant").unwrap(), DensityPolicy::Constant);
        assert!(DensityPolicy::from_str("quadratic").is_err());
    }
}
