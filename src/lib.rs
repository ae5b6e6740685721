//! ripple-nav: Ring/spoke navigation route generator
//!
//! A library and CLI tool that lays waypoints on concentric rings along a set
//! of sector bearings around an origin, links them into a navigation tour,
//! and encodes the result as GeoJSON, a PNG plot and KML.
//!
//! ## Features
//!
//! - Spherical and WGS84 (Vincenty) destination-point solvers
//! - Linear or constant ring density, optional arc interpolation
//! - Tour segmentation with turn instructions
//! - File-system and in-memory artifact stores
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use ripple_nav::coord::Coordinate;
//! use ripple_nav::format::ArtifactSelection;
//! use ripple_nav::pipeline::generate_route;
//! use ripple_nav::route::RouteRequest;
//!
//! let origin = Coordinate::new(35.6271, 139.5854);
//! let req = RouteRequest::new(origin, vec![0.0, 120.0, 240.0], 4, 8, 1500.0).unwrap();
//!
//! let outcome = generate_route(&req, ArtifactSelection::GeojsonOnly).unwrap();
//! println!("{} spokes", outcome.geometry.spokes().len());
//! ```

pub mod artifact;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod route;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use artifact::{ArtifactBundle, ArtifactKind, RequestId};
pub use config::Config;
pub use coord::{Coordinate, EarthModel};
pub use error::{Error, Result};
pub use format::ArtifactSelection;
pub use pipeline::{generate_route, RouteOutcome};
pub use route::{RouteGeometry, RouteParams, RouteRequest};
pub use store::{ArtifactStore, FsArtifactStore, MemoryArtifactStore};
