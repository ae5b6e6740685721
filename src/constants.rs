//! Centralized constants for the ripple-nav crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in meters (WGS84 approximation)
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

    /// WGS84 semi-major axis in meters
    pub const WGS84_A: f64 = 6_378_137.0;

    /// WGS84 flattening
    pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
}

/// Route generation limits and defaults
pub mod route {
    /// Maximum number of sector bearings per request
    pub const MAX_BEARINGS: usize = 6;

    /// Minimum arc points contributed per bearing on each ring
    pub const MIN_POINTS_PER_BEARING: usize = 2;

    /// Largest waypoint grid a single request may produce
    pub const MAX_GRID_POINTS: usize = 100_000;

    /// Default tour segment length in meters
    pub const DEFAULT_SEGMENT_LENGTH: f64 = 500.0;
}

/// Artifact naming
pub mod artifact {
    /// Path prefix the transport layer serves stored files from
    pub const DOWNLOAD_PREFIX: &str = "/download_file/";

    pub const GEOJSON_SUFFIX: &str = "navigation_route.geojson";
    pub const PLOT_SUFFIX: &str = "route_plot.png";
    pub const KML_SUFFIX: &str = "navigation_route.kml";
    pub const MANIFEST_SUFFIX: &str = "manifest.json";
    pub const CUSTOM_GEOJSON_SUFFIX: &str = "custom_geojson.geojson";

    /// Longest accepted storage key, leaving headroom under the 255-byte file name limit
    pub const MAX_KEY_LEN: usize = 240;
}
