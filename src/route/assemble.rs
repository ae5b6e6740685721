//! Route geometry assembler
//!
//! Groups the ordered grid into spokes (per bearing, innermost ring first)
//! and rings (per ring index), then plans the navigation tour. The result is
//! an immutable `RouteGeometry` shared read-only by every encoder.

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::route::tour::{plan_tour, Tour};
use crate::route::{RouteRequest, Waypoint, WaypointKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Waypoints along one bearing, origin excluded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spoke {
    pub index: usize,
    pub bearing: f64,
    pub waypoints: Vec<Waypoint>,
}

impl Spoke {
    /// Coordinates from the innermost ring outward
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.waypoints.iter().map(|w| w.coord).collect()
    }
}

/// Waypoints at one ring index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub index: usize,
    /// Radius in meters
    pub radius: f64,
    /// True when built from arc points; the polyline is then closed
    pub closed: bool,
    pub waypoints: Vec<Waypoint>,
}

impl Ring {
    /// Polyline coordinates; closed rings repeat the first point at the end
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let mut coords: Vec<Coordinate> = self.waypoints.iter().map(|w| w.coord).collect();
        if self.closed {
            if let Some(&first) = coords.first() {
                coords.push(first);
            }
        }
        coords
    }
}

/// The assembled route: spokes, rings and the tour through them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    origin: Coordinate,
    max_distance: f64,
    spokes: Vec<Spoke>,
    rings: Vec<Ring>,
    tour: Tour,
}

impl RouteGeometry {
    /// Origin of every spoke; not stored as a waypoint
    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    /// Radius of the outermost ring in meters
    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn spokes(&self) -> &[Spoke] {
        &self.spokes
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn tour(&self) -> &Tour {
        &self.tour
    }

    /// Whether there is anything to draw
    pub fn is_empty(&self) -> bool {
        self.spokes.is_empty() && self.rings.is_empty()
    }

    /// All waypoints, spokes first then rings
    pub fn waypoints(&self) -> impl Iterator<Item = &Waypoint> {
        self.spokes
            .iter()
            .flat_map(|s| s.waypoints.iter())
            .chain(self.rings.iter().flat_map(|r| r.waypoints.iter()))
    }

    #[cfg(test)]
    pub(crate) fn empty(origin: Coordinate, max_distance: f64) -> Self {
        Self {
            origin,
            max_distance,
            spokes: Vec::new(),
            rings: Vec::new(),
            tour: Tour {
                points: Vec::new(),
                segments: Vec::new(),
            },
        }
    }
}

fn malformed(message: String) -> Error {
    error!("Malformed grid: {}", message);
    Error::MalformedGrid(message)
}

/// Assemble a grid produced by `build_grid` for `req`
///
/// # Errors
/// `MalformedGrid` if the waypoints do not match the request's ring count,
/// bearing count or arc density, or arrive out of order.
pub fn assemble(req: &RouteRequest, waypoints: Vec<Waypoint>) -> Result<RouteGeometry> {
    let mut spokes: Vec<Spoke> = req
        .bearings
        .iter()
        .enumerate()
        .map(|(index, &bearing)| Spoke {
            index,
            bearing,
            waypoints: Vec::with_capacity(req.num_circles),
        })
        .collect();
    let mut rings: Vec<Ring> = (0..req.num_circles)
        .map(|index| Ring {
            index,
            radius: req.ring_radius(index),
            closed: req.ring_arcs,
            waypoints: Vec::new(),
        })
        .collect();

    for waypoint in waypoints {
        let ring = rings.get_mut(waypoint.ring).ok_or_else(|| {
            malformed(format!(
                "waypoint on ring {} but only {} rings declared",
                waypoint.ring, req.num_circles
            ))
        })?;

        match waypoint.kind {
            WaypointKind::Spoke { spoke } => {
                let target = spokes.get_mut(spoke).ok_or_else(|| {
                    malformed(format!(
                        "waypoint on spoke {} but only {} bearings declared",
                        spoke,
                        req.bearings.len()
                    ))
                })?;
                if target.waypoints.len() != waypoint.ring {
                    return Err(malformed(format!(
                        "spoke {} expected ring {} next, got ring {}",
                        spoke,
                        target.waypoints.len(),
                        waypoint.ring
                    )));
                }
                if let Some(last) = target.waypoints.last() {
                    if waypoint.distance <= last.distance {
                        return Err(malformed(format!(
                            "spoke {} radius not increasing at ring {}",
                            spoke, waypoint.ring
                        )));
                    }
                }
                if !req.ring_arcs {
                    ring.waypoints.push(waypoint);
                }
                target.waypoints.push(waypoint);
            }
            WaypointKind::Arc { slot } => {
                if !req.ring_arcs {
                    return Err(malformed(format!(
                        "arc point on ring {} but ring arcs are disabled",
                        waypoint.ring
                    )));
                }
                if ring.waypoints.len() != slot {
                    return Err(malformed(format!(
                        "ring {} expected arc slot {} next, got {}",
                        waypoint.ring,
                        ring.waypoints.len(),
                        slot
                    )));
                }
                ring.waypoints.push(waypoint);
            }
        }
    }

    for spoke in &spokes {
        if spoke.waypoints.len() != req.num_circles {
            return Err(malformed(format!(
                "spoke {} has {} points, expected {}",
                spoke.index,
                spoke.waypoints.len(),
                req.num_circles
            )));
        }
    }
    for ring in &rings {
        let expected = if req.ring_arcs {
            req.ring_point_count(ring.index)
        } else {
            req.bearings.len()
        };
        if ring.waypoints.len() != expected {
            return Err(malformed(format!(
                "ring {} has {} points, expected {}",
                ring.index,
                ring.waypoints.len(),
                expected
            )));
        }
    }

    let stops = rings
        .iter()
        .flat_map(|r| r.waypoints.iter().map(|w| w.coord))
        .collect::<Vec<_>>();
    let tour = plan_tour(req.origin, stops, req.segment_length);

    debug!(
        "Assembled {} spokes, {} rings, tour of {} segments",
        spokes.len(),
        rings.len(),
        tour.segments.len()
    );

    Ok(RouteGeometry {
        origin: req.origin,
        max_distance: req.max_distance,
        spokes,
        rings,
        tour,
    })
}
