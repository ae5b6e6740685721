//! Error types for ripple-nav

use thiserror::Error;

/// Main error type for ripple-nav operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid geometry input: {0}")]
    InvalidGeometryInput(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Parameter must be positive: {field} = {value}")]
    NonPositiveParameter { field: &'static str, value: f64 },

    #[error("At least one bearing must be provided")]
    EmptyBearingSet,

    #[error("At most {max} bearings are supported, got {count}")]
    TooManyBearings { count: usize, max: usize },

    #[error("Route grid too large: num_circles = {num_circles} and points_per_circle_base = {points_per_circle_base} exceed {max} waypoints")]
    GridTooLarge {
        num_circles: usize,
        points_per_circle_base: usize,
        max: usize,
    },

    #[error("Malformed grid: {0}")]
    MalformedGrid(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Invalid artifact name: {0}")]
    InvalidArtifactName(String),

    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// Whether this error was caused by the caller's input rather than a fault
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidGeometryInput(_)
                | Self::InvalidCoordinates(_)
                | Self::NonPositiveParameter { .. }
                | Self::EmptyBearingSet
                | Self::TooManyBearings { .. }
                | Self::GridTooLarge { .. }
                | Self::InvalidArtifactName(_)
        )
    }
}

/// Result type alias for ripple-nav operations
pub type Result<T> = std::result::Result<T, Error>;
