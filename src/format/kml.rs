//! KML exporter
//!
//! Writes a KML 2.2 document: an origin Point placemark, one LineString
//! placemark per spoke and per ring, the complete navigation route, and one
//! placemark per tour segment with its length and turn instruction.
//! Coordinates are `lon,lat,0` and follow the same order as the GeoJSON
//! encoder for the same geometry.

use crate::coord::Coordinate;
use crate::route::{RouteGeometry, RouteRequest};

/// KML style ids and their `aabbggrr` line colors
const STYLES: [(&str, &str, f32); 4] = [
    ("spoke", "ff00a000", 2.0),
    ("ring", "ffff8000", 1.5),
    ("route", "ff800080", 3.0),
    ("segment", "ff0080ff", 4.0),
];

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn coordinates(coords: &[Coordinate]) -> String {
    coords
        .iter()
        .map(|c| format!("{},{},0", c.lon, c.lat))
        .collect::<Vec<_>>()
        .join(" ")
}

fn line_placemark(kml: &mut String, name: &str, description: &str, style: &str, coords: &[Coordinate]) {
    kml.push_str("    <Placemark>\n");
    kml.push_str(&format!("      <name>{}</name>\n", escape(name)));
    kml.push_str(&format!("      <description>{}</description>\n", escape(description)));
    kml.push_str(&format!("      <styleUrl>#{}</styleUrl>\n", style));
    kml.push_str("      <LineString>\n");
    kml.push_str("        <tessellate>1</tessellate>\n");
    kml.push_str(&format!("        <coordinates>{}</coordinates>\n", coordinates(coords)));
    kml.push_str("      </LineString>\n");
    kml.push_str("    </Placemark>\n");
}

/// Export a geometry as KML text
pub fn export_kml(geom: &RouteGeometry, req: &RouteRequest) -> String {
    let mut kml = String::new();

    kml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    kml.push('\n');
    kml.push_str(r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#);
    kml.push('\n');
    kml.push_str("  <Document>\n");
    kml.push_str("    <name>Navigation Route</name>\n");
    kml.push_str(&format!(
        "    <description>{} rings, {} spokes, max distance {}m</description>\n",
        req.num_circles,
        req.bearings.len(),
        req.max_distance
    ));

    for (id, color, width) in STYLES {
        kml.push_str(&format!("    <Style id=\"{}\">\n", id));
        kml.push_str(&format!(
            "      <LineStyle><color>{}</color><width>{}</width></LineStyle>\n",
            color, width
        ));
        kml.push_str("    </Style>\n");
    }

    // Origin
    let origin = geom.origin();
    kml.push_str("    <Placemark>\n");
    kml.push_str("      <name>Origin</name>\n");
    let azimuths = req
        .bearings
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    kml.push_str(&format!("      <description>Azimuths: {}</description>\n", azimuths));
    kml.push_str(&format!(
        "      <Point><coordinates>{},{},0</coordinates></Point>\n",
        origin.lon, origin.lat
    ));
    kml.push_str("    </Placemark>\n");

    for spoke in geom.spokes() {
        line_placemark(
            &mut kml,
            &format!("Spoke {}", spoke.index + 1),
            &format!("Bearing {}", spoke.bearing),
            "spoke",
            &spoke.coordinates(),
        );
    }

    for ring in geom.rings() {
        line_placemark(
            &mut kml,
            &format!("Ring {}", ring.index + 1),
            &format!("Radius {}m", ring.radius),
            "ring",
            &ring.coordinates(),
        );
    }

    let tour = geom.tour();
    if !tour.points.is_empty() {
        line_placemark(
            &mut kml,
            "Complete Navigation Route",
            &format!(
                "Total distance {:.1}m in {} segments",
                tour.total_distance(),
                tour.segments.len()
            ),
            "route",
            &tour.points,
        );
    }
    for (i, segment) in tour.segments.iter().enumerate() {
        line_placemark(
            &mut kml,
            &format!("Segment {}", i + 1),
            &format!(
                "Length: {:.2} m\nInstruction: {}",
                segment.length, segment.instruction
            ),
            "segment",
            &segment.coordinates,
        );
    }

    kml.push_str("  </Document>\n");
    kml.push_str("</kml>\n");
    kml
}
