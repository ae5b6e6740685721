//! Route generation pipeline
//!
//! parameters -> grid -> geometry -> {plot, KML} in parallel -> GeoJSON.
//! Each call is independent and stateless; the only shared resource is the
//! artifact store the caller hands the resulting bundle to.

use crate::artifact::{download_reference, ArtifactBundle, ArtifactKind, RequestId};
use crate::error::{Error, Result};
use crate::format::geojson::{self, Annotations};
use crate::format::plot::{self, PlotOptions};
use crate::format::{kml, ArtifactSelection};
use crate::route::{assemble, build_grid, RouteGeometry, RouteRequest};
use std::collections::BTreeMap;
use std::thread;
use tracing::{info, warn};

/// An artifact that could not be produced
#[derive(Debug)]
pub struct ArtifactFailure {
    pub kind: ArtifactKind,
    pub error: Error,
}

/// Result of one pipeline run
#[derive(Debug)]
pub struct RouteOutcome {
    pub request_id: RequestId,
    pub geometry: RouteGeometry,
    pub bundle: ArtifactBundle,
    /// Optional artifacts that failed; the GeoJSON is still present
    pub failures: Vec<ArtifactFailure>,
}

impl RouteOutcome {
    /// The GeoJSON text of this run
    pub fn geojson(&self) -> Result<serde_json::Value> {
        let bytes = self
            .bundle
            .get(ArtifactKind::Geojson)
            .ok_or_else(|| Error::NotFound(ArtifactKind::Geojson.filename(&self.request_id)))?;
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Generate a route and the selected artifacts with default plot options
pub fn generate_route(req: &RouteRequest, selection: ArtifactSelection) -> Result<RouteOutcome> {
    generate_route_with(req, selection, &PlotOptions::default())
}

/// Generate a route and the selected artifacts
///
/// # Errors
/// Validation errors before any geometry is computed, `MalformedGrid` on an
/// internal inconsistency, or a GeoJSON encoding failure. Plot or KML
/// failures are reported in `RouteOutcome::failures` instead.
pub fn generate_route_with(
    req: &RouteRequest,
    selection: ArtifactSelection,
    plot_options: &PlotOptions,
) -> Result<RouteOutcome> {
    req.validate()?;
    let request_id = RequestId::generate();

    let grid = build_grid(req)?;
    let geometry = assemble(req, grid)?;

    let (artifacts, failures) = encode_artifacts(&geometry, req, &request_id, selection, plot_options)?;

    info!(
        "Generated route {} ({} spokes, {} rings, artifacts: {})",
        request_id,
        geometry.spokes().len(),
        geometry.rings().len(),
        artifacts
            .keys()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(RouteOutcome {
        bundle: ArtifactBundle::new(request_id.clone(), artifacts),
        request_id,
        geometry,
        failures,
    })
}

/// Run the selected encoders over one geometry
///
/// Plot and KML run concurrently on scoped threads; GeoJSON runs last so it
/// can embed whatever they produced.
pub fn encode_artifacts(
    geometry: &RouteGeometry,
    req: &RouteRequest,
    request_id: &RequestId,
    selection: ArtifactSelection,
    plot_options: &PlotOptions,
) -> Result<(BTreeMap<ArtifactKind, Vec<u8>>, Vec<ArtifactFailure>)> {
    let (plot_result, kml_result) = thread::scope(|scope| {
        let plot_handle = selection
            .includes(ArtifactKind::Plot)
            .then(|| scope.spawn(|| plot::render_with(geometry, plot_options)));
        let kml_handle = selection
            .includes(ArtifactKind::Kml)
            .then(|| scope.spawn(|| kml::export_kml(geometry, req)));

        let plot_result = plot_handle.map(|h| {
            h.join()
                .unwrap_or_else(|_| Err(Error::Render("plot renderer panicked".to_string())))
        });
        let kml_result = kml_handle.map(|h| {
            h.join()
                .map_err(|_| Error::Server("KML exporter panicked".to_string()))
        });
        (plot_result, kml_result)
    });

    let mut artifacts = BTreeMap::new();
    let mut failures = Vec::new();

    match plot_result {
        Some(Ok(png)) => {
            artifacts.insert(ArtifactKind::Plot, png);
        }
        Some(Err(error)) => {
            warn!("Plot for {} failed: {}", request_id, error);
            failures.push(ArtifactFailure {
                kind: ArtifactKind::Plot,
                error,
            });
        }
        None => {}
    }

    match kml_result {
        Some(Ok(text)) => {
            artifacts.insert(ArtifactKind::Kml, text.into_bytes());
        }
        Some(Err(error)) => {
            warn!("KML for {} failed: {}", request_id, error);
            failures.push(ArtifactFailure {
                kind: ArtifactKind::Kml,
                error,
            });
        }
        None => {}
    }

    let annotations = Annotations {
        plot: artifacts.get(&ArtifactKind::Plot).map(Vec::as_slice),
        kml_download: artifacts
            .contains_key(&ArtifactKind::Kml)
            .then(|| download_reference(&ArtifactKind::Kml.filename(request_id))),
    };
    let text = geojson::encode(geometry, req, request_id, &annotations)?;
    artifacts.insert(ArtifactKind::Geojson, text.into_bytes());

    Ok((artifacts, failures))
}
