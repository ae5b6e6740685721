//! GeoJSON encoder
//!
//! Emits a FeatureCollection with one LineString per spoke, one feature per
//! ring (Polygon when closed), the complete navigation route, its segments,
//! and an origin Point. Coordinates are `[lon, lat]`.

use crate::artifact::RequestId;
use crate::coord::Coordinate;
use crate::error::Result;
use crate::route::{RouteGeometry, RouteRequest};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub type Properties = Map<String, Value>;

/// GeoJSON geometry object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point([f64; 2]),
    LineString(Vec<[f64; 2]>),
    Polygon(Vec<Vec<[f64; 2]>>),
}

impl Geometry {
    fn line(coords: &[Coordinate]) -> Self {
        Self::LineString(coords.iter().map(Coordinate::lon_lat).collect())
    }

    /// Positions of a Point/LineString, or the outer ring of a Polygon
    pub fn positions(&self) -> Vec<[f64; 2]> {
        match self {
            Self::Point(p) => vec![*p],
            Self::LineString(line) => line.clone(),
            Self::Polygon(rings) => rings.first().cloned().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    pub properties: Properties,
}

impl Feature {
    fn new(geometry: Geometry, properties: Value) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry,
            properties: match properties {
                Value::Object(map) => map,
                _ => Properties::new(),
            },
        }
    }

    /// The `kind` property (`spoke`, `ring`, `route`, `segment`, `origin`)
    pub fn feature_kind(&self) -> Option<&str> {
        self.properties.get("kind").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
    #[serde(default)]
    pub properties: Properties,
}

impl FeatureCollection {
    /// Features whose `kind` property equals `kind`, in document order
    pub fn features_of(&self, kind: &str) -> impl Iterator<Item = &Feature> {
        let kind = kind.to_string();
        self.features
            .iter()
            .filter(move |f| f.feature_kind() == Some(kind.as_str()))
    }
}

/// Optional extras produced by other encoders in the same run
#[derive(Debug, Clone, Default)]
pub struct Annotations<'a> {
    /// Raster plot bytes, embedded base64-encoded as `plot`
    pub plot: Option<&'a [u8]>,
    /// Reference path of the stored KML, embedded as `kml_download`
    pub kml_download: Option<String>,
}

/// Build the FeatureCollection for a geometry
pub fn to_feature_collection(
    geom: &RouteGeometry,
    req: &RouteRequest,
    request_id: &RequestId,
    annotations: &Annotations<'_>,
) -> FeatureCollection {
    let mut features = Vec::new();

    for spoke in geom.spokes() {
        features.push(Feature::new(
            Geometry::line(&spoke.coordinates()),
            json!({
                "kind": "spoke",
                "name": format!("Spoke {}", spoke.index + 1),
                "spoke_index": spoke.index,
                "bearing": spoke.bearing,
                "radii": spoke.waypoints.iter().map(|w| w.distance).collect::<Vec<_>>(),
            }),
        ));
    }

    for ring in geom.rings() {
        let coords = ring.coordinates();
        let geometry = if ring.closed {
            Geometry::Polygon(vec![coords.iter().map(Coordinate::lon_lat).collect()])
        } else {
            Geometry::line(&coords)
        };
        features.push(Feature::new(
            geometry,
            json!({
                "kind": "ring",
                "name": format!("Ring {}", ring.index + 1),
                "ring_index": ring.index,
                "radius": ring.radius,
                "point_count": ring.waypoints.len(),
            }),
        ));
    }

    let tour = geom.tour();
    if !tour.points.is_empty() {
        features.push(Feature::new(
            Geometry::line(&tour.points),
            json!({
                "kind": "route",
                "name": "Complete Navigation Route",
                "total_distance": tour.total_distance(),
                "num_segments": tour.segments.len(),
            }),
        ));
    }
    for (i, segment) in tour.segments.iter().enumerate() {
        features.push(Feature::new(
            Geometry::line(&segment.coordinates),
            json!({
                "kind": "segment",
                "name": format!("Segment {}", i + 1),
                "length": segment.length,
                "instruction": segment.instruction.to_string(),
            }),
        ));
    }

    features.push(Feature::new(
        Geometry::Point(geom.origin().lon_lat()),
        json!({
            "kind": "origin",
            "name": "Origin",
            "azimuths": req.bearings,
        }),
    ));

    let mut properties = Properties::new();
    properties.insert("request_id".to_string(), json!(request_id));
    properties.insert(
        "parameters".to_string(),
        json!({
            "lat": req.origin.lat,
            "lon": req.origin.lon,
            "azimuths": req.bearings,
            "num_circles": req.num_circles,
            "points_per_circle_base": req.points_per_circle_base,
            "max_distance": req.max_distance,
            "density": req.density,
            "ring_arcs": req.ring_arcs,
            "earth_model": req.earth_model,
            "segment_length": req.segment_length,
        }),
    );
    if let Some(plot) = annotations.plot {
        properties.insert("plot".to_string(), Value::String(STANDARD.encode(plot)));
    }
    if let Some(kml_download) = &annotations.kml_download {
        properties.insert("kml_download".to_string(), Value::String(kml_download.clone()));
    }

    FeatureCollection {
        kind: "FeatureCollection".to_string(),
        features,
        properties,
    }
}

/// Encode a geometry as GeoJSON text
pub fn encode(
    geom: &RouteGeometry,
    req: &RouteRequest,
    request_id: &RequestId,
    annotations: &Annotations<'_>,
) -> Result<String> {
    let collection = to_feature_collection(geom, req, request_id, annotations);
    Ok(serde_json::to_string(&collection)?)
}

/// Parse GeoJSON text produced by [`encode`]
pub fn decode(text: &str) -> Result<FeatureCollection> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::geodesic::haversine_distance;
    use crate::route::{assemble, build_grid};

    fn tokyo() -> (RouteRequest, RouteGeometry) {
        let req = RouteRequest::new(
            Coordinate::new(35.6271473943848, 139.58538125298406),
            vec![0.0, 120.0, 240.0],
            4,
            8,
            1500.0,
        )
        .unwrap();
        let geom = assemble(&req, build_grid(&req).unwrap()).unwrap();
        (req, geom)
    }

    fn request_id() -> RequestId {
        RequestId::parse("test-request").unwrap()
    }

    #[test]
    fn test_tokyo_example() {
        let (req, geom) = tokyo();
        let text = encode(&geom, &req, &request_id(), &Annotations::default()).unwrap();
        let fc = decode(&text).unwrap();

        assert_eq!(fc.kind, "FeatureCollection");
        let spokes: Vec<&Feature> = fc.features_of("spoke").collect();
        assert_eq!(spokes.len(), 3);
        for spoke in &spokes {
            let positions = match &spoke.geometry {
                Geometry::LineString(line) => line.clone(),
                other => panic!("spoke should be a LineString, got {:?}", other),
            };
            assert_eq!(positions.len(), 4);
            for (i, [lon, lat]) in positions.iter().enumerate() {
                let d = haversine_distance(req.origin, Coordinate::new(*lat, *lon));
                assert!(d <= 1500.0 + 1e-3);
                assert!((d - [375.0, 750.0, 1125.0, 1500.0][i]).abs() < 1e-3);
            }
        }

        let radii: Vec<f64> = fc
            .features_of("ring")
            .map(|f| f.properties["radius"].as_f64().unwrap())
            .collect();
        assert_eq!(radii, vec![375.0, 750.0, 1125.0, 1500.0]);

        assert_eq!(fc.features_of("origin").count(), 1);
        assert_eq!(fc.features_of("route").count(), 1);
        assert_eq!(
            fc.features_of("segment").count(),
            geom.tour().segments.len()
        );
    }

    #[test]
    fn test_properties() {
        let (req, geom) = tokyo();
        let fc = to_feature_collection(&geom, &req, &request_id(), &Annotations::default());

        assert_eq!(fc.properties["request_id"], "test-request");
        assert_eq!(fc.properties["parameters"]["num_circles"], 4);
        assert_eq!(fc.properties["parameters"]["max_distance"], 1500.0);
        assert!(!fc.properties.contains_key("plot"));
        assert!(!fc.properties.contains_key("kml_download"));
    }

    #[test]
    fn test_annotations_embedded() {
        let (req, geom) = tokyo();
        let plot = [0x89u8, b'P', b'N', b'G'];
        let annotations = Annotations {
            plot: Some(&plot),
            kml_download: Some("/download_file/x_navigation_route.kml".to_string()),
        };
        let fc = to_feature_collection(&geom, &req, &request_id(), &annotations);

        let encoded = fc.properties["plot"].as_str().unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), plot.to_vec());
        assert_eq!(
            fc.properties["kml_download"],
            "/download_file/x_navigation_route.kml"
        );
    }

    #[test]
    fn test_closed_rings_are_polygons() {
        let (req, geom) = tokyo();
        let fc = to_feature_collection(&geom, &req, &request_id(), &Annotations::default());
        for ring in fc.features_of("ring") {
            match &ring.geometry {
                Geometry::Polygon(rings) => {
                    let outer = &rings[0];
                    assert_eq!(outer.first(), outer.last());
                }
                other => panic!("expected Polygon, got {:?}", other),
            }
        }

        let req = req.with_ring_arcs(false);
        let geom = assemble(&req, build_grid(&req).unwrap()).unwrap();
        let fc = to_feature_collection(&geom, &req, &request_id(), &Annotations::default());
        assert!(fc
            .features_of("ring")
            .all(|f| matches!(f.geometry, Geometry::LineString(_))));
    }

    #[test]
    fn test_roundtrip_preserves_waypoint_order() {
        let (req, geom) = tokyo();
        let text = encode(&geom, &req, &request_id(), &Annotations::default()).unwrap();
        let fc = decode(&text).unwrap();

        for (spoke, feature) in geom.spokes().iter().zip(fc.features_of("spoke")) {
            let decoded = feature.geometry.positions();
            let expected: Vec<[f64; 2]> = spoke.coordinates().iter().map(|c| c.lon_lat()).collect();
            assert_eq!(decoded.len(), expected.len());
            for (a, b) in decoded.iter().zip(&expected) {
                assert!((a[0] - b[0]).abs() < 1e-12 && (a[1] - b[1]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_antimeridian_positions_in_range() {
        let req = RouteRequest::new(Coordinate::new(-16.5, 179.99), vec![90.0, 270.0], 3, 6, 5000.0)
            .unwrap()
            .with_earth_model(crate::coord::EarthModel::Wgs84);
        let geom = assemble(&req, build_grid(&req).unwrap()).unwrap();
        let text = encode(&geom, &req, &request_id(), &Annotations::default()).unwrap();
        let fc = decode(&text).unwrap();

        let positions: Vec<[f64; 2]> = fc
            .features
            .iter()
            .flat_map(|f| match &f.geometry {
                Geometry::Polygon(rings) => rings.concat(),
                other => other.positions(),
            })
            .collect();
        assert!(positions.len() > geom.waypoints().count());
        for [lon, lat] in &positions {
            assert!((-180.0..=180.0).contains(lon), "lon {}", lon);
            assert!((-90.0..=90.0).contains(lat), "lat {}", lat);
        }
        assert!(positions.iter().any(|[lon, _]| *lon < 0.0));
        assert!(positions.iter().any(|[lon, _]| *lon > 0.0));
    }

    #[test]
    fn test_lon_lat_order() {
        let (req, geom) = tokyo();
        let fc = to_feature_collection(&geom, &req, &request_id(), &Annotations::default());
        let origin = fc.features_of("origin").next().unwrap();
        assert_eq!(
            origin.geometry,
            Geometry::Point([139.58538125298406, 35.6271473943848])
        );
    }
}
