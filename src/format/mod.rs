//! Artifact encoders
//!
//! Three independent encoders over one immutable `RouteGeometry`:
//! GeoJSON text, KML text, and a PNG plot.

pub mod geojson;
pub mod kml;
pub mod plot;

use crate::artifact::ArtifactKind;
use serde::{Deserialize, Serialize};

/// Which artifacts a pipeline run should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactSelection {
    /// GeoJSON only; the plot renderer and KML exporter are not invoked
    #[default]
    GeojsonOnly,
    /// GeoJSON with an embedded plot
    WithPlot,
    /// GeoJSON with an embedded plot and a KML download reference
    WithPlotAndKml,
}

impl ArtifactSelection {
    pub fn includes(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Geojson => true,
            ArtifactKind::Plot => !matches!(self, Self::GeojsonOnly),
            ArtifactKind::Kml => matches!(self, Self::WithPlotAndKml),
        }
    }

    /// Selection for the given plot/kml flags; KML implies a plot
    pub fn from_flags(plot: bool, kml: bool) -> Self {
        if kml {
            Self::WithPlotAndKml
        } else if plot {
            Self::WithPlot
        } else {
            Self::GeojsonOnly
        }
    }
}

impl std::str::FromStr for ArtifactSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "geojson" | "geojson_only" | "geojson-only" => Ok(Self::GeojsonOnly),
            "plot" | "with_plot" | "with-plot" => Ok(Self::WithPlot),
            "kml" | "plot_kml" | "with_plot_and_kml" | "with-plot-and-kml" => {
                Ok(Self::WithPlotAndKml)
            }
            _ => Err(format!("Unknown artifact selection: {}", s)),
        }
    }
}
