//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/ripple-nav/config.toml

pub mod defaults;

use crate::constants::route::DEFAULT_SEGMENT_LENGTH;
use crate::coord::EarthModel;
use crate::error::{Error, Result};
use crate::route::DensityPolicy;
use crate::store::FsArtifactStore;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default route parameters
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Artifact storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Plot rendering settings
    #[serde(default)]
    pub plot: PlotConfig,
}

/// Default route parameters, used when a request omits them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Number of concentric rings
    #[serde(default = "default_num_circles")]
    pub num_circles: usize,

    /// Arc point base density per ring
    #[serde(default = "default_points_per_circle_base")]
    pub points_per_circle_base: usize,

    /// Outer ring radius in meters
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,

    /// Ring density policy
    #[serde(default)]
    pub density: DensityPolicy,

    /// Interpolate points around each ring
    #[serde(default = "default_ring_arcs")]
    pub ring_arcs: bool,

    /// Earth model used for destination points
    #[serde(default)]
    pub earth_model: EarthModel,

    /// Tour segment length in meters
    #[serde(default = "default_segment_length")]
    pub segment_length: f64,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Artifact storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Artifact directory; the XDG data directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Plot rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Edge length of the square plot in pixels
    #[serde(default = "default_plot_size")]
    pub size: u32,

    /// Draw the navigation tour over the grid
    #[serde(default = "default_show_route")]
    pub show_route: bool,
}

// Default value functions for serde
fn default_num_circles() -> usize {
    DEFAULT_NUM_CIRCLES
}
fn default_points_per_circle_base() -> usize {
    DEFAULT_POINTS_PER_CIRCLE_BASE
}
fn default_max_distance() -> f64 {
    DEFAULT_MAX_DISTANCE
}
fn default_ring_arcs() -> bool {
    true
}
fn default_segment_length() -> f64 {
    DEFAULT_SEGMENT_LENGTH
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_plot_size() -> u32 {
    DEFAULT_PLOT_SIZE
}
fn default_show_route() -> bool {
    true
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            num_circles: default_num_circles(),
            points_per_circle_base: default_points_per_circle_base(),
            max_distance: default_max_distance(),
            density: DensityPolicy::default(),
            ring_arcs: default_ring_arcs(),
            earth_model: EarthModel::default(),
            segment_length: default_segment_length(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            size: default_plot_size(),
            show_route: default_show_route(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(what: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {} value: {}", what, value)))
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "num_circles"] => Some(self.defaults.num_circles.to_string()),
            ["defaults", "points_per_circle_base"] => {
                Some(self.defaults.points_per_circle_base.to_string())
            }
            ["defaults", "max_distance"] => Some(self.defaults.max_distance.to_string()),
            ["defaults", "density"] => Some(self.defaults.density.to_string()),
            ["defaults", "ring_arcs"] => Some(self.defaults.ring_arcs.to_string()),
            ["defaults", "earth_model"] => Some(self.defaults.earth_model.to_string()),
            ["defaults", "segment_length"] => Some(self.defaults.segment_length.to_string()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["storage", "dir"] => Some(
                self.storage
                    .dir
                    .as_ref()
                    .map(|d| d.display().to_string())
                    .unwrap_or_default(),
            ),

            ["plot", "size"] => Some(self.plot.size.to_string()),
            ["plot", "show_route"] => Some(self.plot.show_route.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "num_circles"] => {
                self.defaults.num_circles = parse_value("num_circles", value)?;
            }
            ["defaults", "points_per_circle_base"] => {
                self.defaults.points_per_circle_base = parse_value("points_per_circle_base", value)?;
            }
            ["defaults", "max_distance"] => {
                self.defaults.max_distance = parse_value("max_distance", value)?;
            }
            ["defaults", "density"] => {
                self.defaults.density = value.parse().map_err(Error::Config)?;
            }
            ["defaults", "ring_arcs"] => {
                self.defaults.ring_arcs = parse_value("boolean", value)?;
            }
            ["defaults", "earth_model"] => {
                self.defaults.earth_model = value.parse().map_err(Error::Config)?;
            }
            ["defaults", "segment_length"] => {
                self.defaults.segment_length = parse_value("segment_length", value)?;
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse_value("port", value)?;
            }

            ["storage", "dir"] => {
                self.storage.dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }

            ["plot", "size"] => {
                self.plot.size = parse_value("plot size", value)?;
            }
            ["plot", "show_route"] => {
                self.plot.show_route = parse_value("boolean", value)?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "defaults.num_circles",
            "defaults.points_per_circle_base",
            "defaults.max_distance",
            "defaults.density",
            "defaults.ring_arcs",
            "defaults.earth_model",
            "defaults.segment_length",
            "server.host",
            "server.port",
            "storage.dir",
            "plot.size",
            "plot.show_route",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Artifact directory, falling back to the XDG data directory
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.storage.dir {
            Some(dir) => Ok(dir.clone()),
            None => FsArtifactStore::default_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn with_temp_config<F: FnOnce()>(f: F) {
        let temp_dir = TempDir::new().unwrap();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        f();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.defaults.num_circles, 4);
        assert_eq!(config.defaults.points_per_circle_base, 8);
        assert_eq!(config.defaults.max_distance, 1500.0);
        assert_eq!(config.defaults.density, DensityPolicy::Linear);
        assert!(config.defaults.ring_arcs);
        assert_eq!(config.server.port, 7878);
        assert_eq!(config.plot.size, 800);
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("defaults.num_circles"), Some("4".to_string()));

        config.set("defaults.num_circles", "6").unwrap();
        assert_eq!(config.defaults.num_circles, 6);

        config.set("defaults.density", "constant").unwrap();
        assert_eq!(config.get("defaults.density"), Some("constant".to_string()));

        config.set("defaults.earth_model", "wgs84").unwrap();
        assert_eq!(config.defaults.earth_model, EarthModel::Wgs84);

        config.set("storage.dir", "/tmp/artifacts").unwrap();
        assert_eq!(config.get("storage.dir"), Some("/tmp/artifacts".to_string()));
        config.set("storage.dir", "").unwrap();
        assert!(config.storage.dir.is_none());
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("defaults.max_distance", "far").is_err());
        assert!(config.set("defaults.density", "quadratic").is_err());
        assert!(config.set("server.port", "70000").is_err());
    }

    #[test]
    fn test_save_and_load() {
        with_temp_config(|| {
            let mut config = Config::default();
            config.defaults.max_distance = 2500.0;
            config.server.port = 9000;
            config.save().unwrap();

            let loaded = Config::load().unwrap();
            assert_eq!(loaded.defaults.max_distance, 2500.0);
            assert_eq!(loaded.server.port, 9000);
        });
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let loaded: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(loaded.defaults.num_circles, 4);
        assert_eq!(loaded.defaults.earth_model, EarthModel::Sphere);
        assert_eq!(loaded.server.port, 7878);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[defaults]\nmax_distance = 900.0\n").unwrap();
        assert_eq!(loaded.defaults.max_distance, 900.0);
        assert_eq!(loaded.defaults.num_circles, 4);
        assert_eq!(loaded.server.host, "127.0.0.1");
    }

    #[test]
    fn test_serialization_format() {
        let toml = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(toml.contains("[defaults]"));
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[plot]"));
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(Config::default().server_addr(), "127.0.0.1:7878");
    }

    #[test]
    fn test_storage_dir_override() {
        let mut config = Config::default();
        config.storage.dir = Some(PathBuf::from("/srv/routes"));
        assert_eq!(config.storage_dir().unwrap(), PathBuf::from("/srv/routes"));
    }

    #[test]
    fn test_available_keys() {
        let keys = Config::available_keys();
        let config = Config::default();
        for key in &keys {
            assert!(config.get(key).is_some(), "{} has no getter", key);
        }
        assert!(keys.contains(&"defaults.max_distance"));
        assert!(keys.contains(&"server.port"));
    }
}
