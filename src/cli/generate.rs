//! Generate command handler
//!
//! Builds a route from command-line parameters and writes its artifacts to
//! an output directory or the configured artifact store.

use crate::artifact::ArtifactKind;
use crate::cli::init_logging;
use crate::config::Config;
use crate::coord::EarthModel;
use crate::error::Result;
use crate::format::plot::PlotOptions;
use crate::format::ArtifactSelection;
use crate::pipeline::generate_route_with;
use crate::route::{DensityPolicy, RouteParams};
use crate::store::{persist_bundle, FsArtifactStore};
use clap::Args;
use std::path::PathBuf;

/// Generate command arguments
#[derive(Args)]
pub struct GenerateArgs {
    /// Origin latitude
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Origin longitude
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Sector bearings in degrees, comma separated
    #[arg(long, short = 'b', value_delimiter = ',', required = true, allow_negative_numbers = true)]
    pub bearings: Vec<f64>,

    /// Number of concentric rings
    #[arg(long, short = 'n')]
    pub num_circles: Option<i64>,

    /// Arc point base density per ring
    #[arg(long)]
    pub points_per_circle_base: Option<i64>,

    /// Outer ring radius in meters
    #[arg(long, short = 'd')]
    pub max_distance: Option<f64>,

    /// Ring density policy: linear or constant
    #[arg(long)]
    pub density: Option<DensityPolicy>,

    /// Only place waypoints on the spokes
    #[arg(long)]
    pub no_ring_arcs: bool,

    /// Earth model: sphere or wgs84
    #[arg(long)]
    pub earth_model: Option<EarthModel>,

    /// Tour segment length in meters
    #[arg(long)]
    pub segment_length: Option<f64>,

    /// Render the PNG plot
    #[arg(long)]
    pub plot: bool,

    /// Export KML (implies --plot)
    #[arg(long)]
    pub kml: bool,

    /// Directory to write artifacts to (defaults to the configured store)
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Print the GeoJSON to stdout instead of storing anything
    #[arg(long)]
    pub stdout: bool,
}

impl GenerateArgs {
    fn to_params(&self, config: &Config) -> RouteParams {
        let defaults = &config.defaults;
        RouteParams {
            lat: self.lat,
            lon: self.lon,
            azimuths: self.bearings.clone(),
            num_circles: self.num_circles.unwrap_or(defaults.num_circles as i64),
            points_per_circle_base: self
                .points_per_circle_base
                .unwrap_or(defaults.points_per_circle_base as i64),
            max_distance: self.max_distance.unwrap_or(defaults.max_distance),
            density: self.density.unwrap_or(defaults.density),
            ring_arcs: defaults.ring_arcs && !self.no_ring_arcs,
            earth_model: self.earth_model.unwrap_or(defaults.earth_model),
            segment_length: self.segment_length.unwrap_or(defaults.segment_length),
        }
    }
}

/// Run the generate command
pub fn run(args: GenerateArgs) -> Result<()> {
    init_logging("warn");

    let config = Config::load()?;
    let req = args.to_params(&config).into_request()?;
    let selection = ArtifactSelection::from_flags(args.plot, args.kml);
    let plot_options = PlotOptions {
        size: config.plot.size,
        show_route: config.plot.show_route,
    };

    let outcome = generate_route_with(&req, selection, &plot_options)?;

    for failure in &outcome.failures {
        eprintln!("Warning: {} not produced: {}", failure.kind, failure.error);
    }

    if args.stdout {
        let geojson = outcome.bundle.get(ArtifactKind::Geojson).unwrap_or_default();
        println!("{}", String::from_utf8_lossy(geojson));
        return Ok(());
    }

    let dir = match args.output_dir {
        Some(dir) => dir,
        None => config.storage_dir()?,
    };
    let store = FsArtifactStore::new(&dir)?;
    let manifest = persist_bundle(&store, &outcome.bundle)?;

    println!("Request: {}", outcome.request_id);
    println!(
        "Route: {} spokes, {} rings, {} waypoints, {:.1}m",
        outcome.geometry.spokes().len(),
        outcome.geometry.rings().len(),
        outcome.geometry.waypoints().count(),
        outcome.geometry.tour().total_distance()
    );
    for entry in &manifest.artifacts {
        println!(
            "  {:<8} {} ({} bytes)",
            entry.kind.name(),
            store.root().join(&entry.filename).display(),
            entry.size
        );
    }

    Ok(())
}
