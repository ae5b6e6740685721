//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default number of concentric rings
pub const DEFAULT_NUM_CIRCLES: usize = 4;

/// Default arc point base density per ring
pub const DEFAULT_POINTS_PER_CIRCLE_BASE: usize = 8;

/// Default outer ring radius in meters
pub const DEFAULT_MAX_DISTANCE: f64 = 1500.0;

/// Default plot edge length in pixels
pub const DEFAULT_PLOT_SIZE: u32 = 800;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "ripple-nav";

/// Artifact subdirectory under the data directory
pub const ARTIFACT_DIR_NAME: &str = "artifacts";
