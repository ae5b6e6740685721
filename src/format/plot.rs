//! Plot renderer
//!
//! Rasterizes a route geometry into a PNG using tiny-skia. The view is
//! centred on the origin and scaled from `max_distance` so every request is
//! framed the same way regardless of bearings or density.
//!
//! A geometry with no spokes and no rings is rejected with `Error::Render`
//! rather than producing a blank image.

use crate::constants::geo::EARTH_RADIUS_METERS;
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::route::RouteGeometry;
use std::f64::consts::PI;
use tiny_skia::{Color, FillRule, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};
use tracing::debug;

/// Fraction of `max_distance` left as margin around the outer ring
const FRAME_MARGIN: f64 = 0.15;

fn background_color() -> Color {
    Color::from_rgba8(255, 255, 255, 255)
}
fn ring_color() -> Color {
    Color::from_rgba8(153, 153, 153, 255)
}
fn spoke_color() -> Color {
    Color::from_rgba8(0, 160, 0, 255)
}
fn route_color() -> Color {
    Color::from_rgba8(128, 0, 128, 200)
}
fn waypoint_color() -> Color {
    Color::from_rgba8(30, 90, 220, 255)
}
fn origin_color() -> Color {
    Color::from_rgba8(220, 30, 30, 255)
}

/// Rendering options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotOptions {
    /// Width and height of the square image in pixels
    pub size: u32,
    /// Draw the navigation tour over the grid
    pub show_route: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            size: 800,
            show_route: true,
        }
    }
}

/// Maps geographic coordinates to pixels around the origin
struct Projection {
    origin: Coordinate,
    cos_lat: f64,
    scale: f64,
    center: f64,
}

impl Projection {
    fn new(origin: Coordinate, max_distance: f64, size: u32) -> Self {
        let extent = max_distance * (1.0 + FRAME_MARGIN);
        let center = size as f64 / 2.0;
        Self {
            origin,
            cos_lat: origin.lat.to_radians().cos(),
            scale: center / extent,
            center,
        }
    }

    /// Local east/north offset in meters, continuous across the antimeridian
    fn offset_meters(&self, c: Coordinate) -> (f64, f64) {
        let mut d_lon = (c.lon - self.origin.lon).to_radians();
        if d_lon > PI {
            d_lon -= 2.0 * PI;
        } else if d_lon < -PI {
            d_lon += 2.0 * PI;
        }
        let d_lat = (c.lat - self.origin.lat).to_radians();
        (
            EARTH_RADIUS_METERS * d_lon * self.cos_lat,
            EARTH_RADIUS_METERS * d_lat,
        )
    }

    fn to_pixel(&self, c: Coordinate) -> (f32, f32) {
        let (east, north) = self.offset_meters(c);
        (
            (self.center + east * self.scale) as f32,
            (self.center - north * self.scale) as f32,
        )
    }

    fn polyline(&self, coords: &[Coordinate]) -> Option<Path> {
        let mut pb = PathBuilder::new();
        let mut points = coords.iter().map(|c| self.to_pixel(*c));
        let (x, y) = points.next()?;
        pb.move_to(x, y);
        for (x, y) in points {
            pb.line_to(x, y);
        }
        pb.finish()
    }
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        ..Default::default()
    }
}

/// Render a geometry to PNG bytes with default options
pub fn render(geom: &RouteGeometry) -> Result<Vec<u8>> {
    render_with(geom, &PlotOptions::default())
}

/// Render a geometry to PNG bytes
pub fn render_with(geom: &RouteGeometry, options: &PlotOptions) -> Result<Vec<u8>> {
    if geom.is_empty() {
        return Err(Error::Render(
            "nothing to draw: geometry has no spokes or rings".to_string(),
        ));
    }

    let mut pixmap = Pixmap::new(options.size, options.size)
        .ok_or_else(|| Error::Render(format!("invalid canvas size {}", options.size)))?;
    pixmap.fill(background_color());

    let projection = Projection::new(geom.origin(), geom.max_distance(), options.size);
    let origin = geom.origin();

    let ring_paint = paint(ring_color());
    for ring in geom.rings() {
        if let Some(path) = projection.polyline(&ring.coordinates()) {
            pixmap.stroke_path(&path, &ring_paint, &stroke(1.5), Transform::identity(), None);
        }
    }

    let spoke_paint = paint(spoke_color());
    for spoke in geom.spokes() {
        let mut coords = vec![origin];
        coords.extend(spoke.coordinates());
        if let Some(path) = projection.polyline(&coords) {
            pixmap.stroke_path(&path, &spoke_paint, &stroke(2.0), Transform::identity(), None);
        }
    }

    if options.show_route {
        let route_paint = paint(route_color());
        if let Some(path) = projection.polyline(&geom.tour().points) {
            pixmap.stroke_path(&path, &route_paint, &stroke(1.0), Transform::identity(), None);
        }
    }

    let waypoint_paint = paint(waypoint_color());
    for waypoint in geom.waypoints() {
        let (x, y) = projection.to_pixel(waypoint.coord);
        if let Some(dot) = PathBuilder::from_circle(x, y, 3.0) {
            pixmap.fill_path(&dot, &waypoint_paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    let (x, y) = projection.to_pixel(origin);
    if let Some(marker) = PathBuilder::from_circle(x, y, 7.0) {
        pixmap.fill_path(&marker, &paint(origin_color()), FillRule::Winding, Transform::identity(), None);
    }

    let png = pixmap
        .encode_png()
        .map_err(|e| Error::Render(format!("PNG encoding failed: {}", e)))?;
    debug!("Rendered {}x{} plot ({} bytes)", options.size, options.size, png.len());
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{assemble, build_grid, RouteRequest};

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn tokyo() -> RouteGeometry {
        let req = RouteRequest::new(
            Coordinate::new(35.6271473943848, 139.58538125298406),
            vec![0.0, 120.0, 240.0],
            4,
            8,
            1500.0,
        )
        .unwrap();
        assemble(&req, build_grid(&req).unwrap()).unwrap()
    }

    #[test]
    fn test_render_png() {
        let png = render(&tokyo()).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);

        let decoded = Pixmap::decode_png(&png).unwrap();
        assert_eq!(decoded.width(), 800);
        assert_eq!(decoded.height(), 800);
    }

    #[test]
    fn test_origin_marker_at_center() {
        let png = render_with(&tokyo(), &PlotOptions { size: 400, show_route: false }).unwrap();
        let decoded = Pixmap::decode_png(&png).unwrap();
        let center = decoded.pixel(200, 200).unwrap();
        assert!(center.red() > 200 && center.green() < 80, "center pixel {:?}", center);

        let corner = decoded.pixel(0, 0).unwrap();
        assert_eq!((corner.red(), corner.green(), corner.blue()), (255, 255, 255));
    }

    #[test]
    fn test_outer_ring_inside_frame() {
        let geom = tokyo();
        let projection = Projection::new(geom.origin(), geom.max_distance(), 800);
        for ring in geom.rings() {
            for c in ring.coordinates() {
                let (x, y) = projection.to_pixel(c);
                assert!((0.0..800.0).contains(&x) && (0.0..800.0).contains(&y));
            }
        }
    }

    #[test]
    fn test_render_deterministic() {
        let geom = tokyo();
        assert_eq!(render(&geom).unwrap(), render(&geom).unwrap());
    }

    #[test]
    fn test_empty_geometry_is_render_error() {
        let geom = RouteGeometry::empty(Coordinate::new(0.0, 0.0), 1000.0);
        assert!(matches!(render(&geom).unwrap_err(), Error::Render(_)));
    }

    #[test]
    fn test_zero_size_is_render_error() {
        let err = render_with(&tokyo(), &PlotOptions { size: 0, show_route: true }).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[test]
    fn test_projection_wraps_antimeridian() {
        let projection = Projection::new(Coordinate::new(0.0, 179.99), 5000.0, 800);
        let (x, _) = projection.to_pixel(Coordinate::new(0.0, -179.99));
        assert!(x > 400.0 && x < 800.0, "x = {}", x);
    }
}
