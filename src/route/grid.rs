//! Ring/spoke grid builder
//!
//! Projects one waypoint per (ring, bearing) pair with the geodesic solver,
//! plus evenly spaced arc points around each ring when ring arcs are enabled.
//!
//! Output order is significant: rings ascending; within a ring, spoke points
//! in bearing order followed by arc points in slot order. The assembler
//! relies on this and never re-sorts.

use crate::coord::geodesic::destination;
use crate::error::Result;
use crate::route::{RouteRequest, Waypoint, WaypointKind};
use tracing::debug;

/// Build the ordered waypoint grid for a request
///
/// # Arguments
/// * `req` - The route request (validated again before any projection)
///
/// # Returns
/// `req.grid_size()` waypoints, ordered rings-first
pub fn build_grid(req: &RouteRequest) -> Result<Vec<Waypoint>> {
    req.validate()?;

    let mut waypoints = Vec::with_capacity(req.grid_size());

    for ring in 0..req.num_circles {
        let radius = req.ring_radius(ring);

        for (spoke, &bearing) in req.bearings.iter().enumerate() {
            let coord = destination(req.origin, bearing, radius, req.earth_model)?;
            waypoints.push(Waypoint {
                coord,
                ring,
                bearing,
                distance: radius,
                kind: WaypointKind::Spoke { spoke },
            });
        }

        if req.ring_arcs {
            let count = req.ring_point_count(ring);
            let step = 360.0 / count as f64;
            for slot in 0..count {
                let bearing = slot as f64 * step;
                let coord = destination(req.origin, bearing, radius, req.earth_model)?;
                waypoints.push(Waypoint {
                    coord,
                    ring,
                    bearing,
                    distance: radius,
                    kind: WaypointKind::Arc { slot },
                });
            }
            debug!("Ring {}: radius {:.1}m, {} arc points", ring, radius, count);
        }
    }

    debug!(
        "Built grid of {} waypoints ({} rings x {} bearings)",
        waypoints.len(),
        req.num_circles,
        req.bearings.len()
    );

    Ok(waypoints)
}
