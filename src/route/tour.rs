//! Navigation tour planning
//!
//! A tour leaves the origin, visits every ring's waypoints innermost ring
//! first, and returns to the origin. It is split into segments of at least
//! the requested length, each carrying a turn instruction.

use crate::coord::geodesic::{haversine_distance, initial_bearing};
use crate::coord::Coordinate;
use serde::{Deserialize, Serialize};

/// Turn instruction derived from the change in heading between legs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnInstruction {
    StartRoute,
    Straight,
    SlightRight,
    Right,
    SharpRight,
    UTurn,
    SharpLeft,
    Left,
    SlightLeft,
}

impl TurnInstruction {
    /// Classify the turn from `prev_bearing` to `current_bearing` (degrees)
    pub fn from_bearings(prev_bearing: f64, current_bearing: f64) -> Self {
        let angle = (current_bearing - prev_bearing + 360.0).rem_euclid(360.0);
        if angle < 20.0 {
            Self::Straight
        } else if angle < 60.0 {
            Self::SlightRight
        } else if angle < 120.0 {
            Self::Right
        } else if angle < 160.0 {
            Self::SharpRight
        } else if angle <= 200.0 {
            Self::UTurn
        } else if angle < 240.0 {
            Self::SharpLeft
        } else if angle < 300.0 {
            Self::Left
        } else if angle < 340.0 {
            Self::SlightLeft
        } else {
            Self::Straight
        }
    }
}

impl std::fmt::Display for TurnInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::StartRoute => "Start route",
            Self::Straight => "Continue straight",
            Self::SlightRight => "Turn slight right",
            Self::Right => "Turn right",
            Self::SharpRight => "Turn sharp right",
            Self::UTurn => "Make a U-turn",
            Self::SharpLeft => "Turn sharp left",
            Self::Left => "Turn left",
            Self::SlightLeft => "Turn slight left",
        };
        write!(f, "{}", text)
    }
}

/// A run of consecutive tour points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub coordinates: Vec<Coordinate>,
    /// Length in meters
    pub length: f64,
    pub instruction: TurnInstruction,
}

/// The complete closed navigation path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub points: Vec<Coordinate>,
    pub segments: Vec<Segment>,
}

impl Tour {
    /// Sum of all segment lengths in meters
    pub fn total_distance(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }
}

/// Plan a tour through `stops` starting and ending at `origin`
pub fn plan_tour(
    origin: Coordinate,
    stops: impl IntoIterator<Item = Coordinate>,
    segment_length: f64,
) -> Tour {
    let mut points = vec![origin];
    points.extend(stops);
    points.push(origin);

    let segments = split_into_segments(&points, segment_length);
    Tour { points, segments }
}

/// Split a path into segments of at least `segment_length` meters
///
/// The last segment always ends at the final point and may be shorter.
pub fn split_into_segments(points: &[Coordinate], segment_length: f64) -> Vec<Segment> {
    let mut segments = Vec::new();
    let Some(&first) = points.first() else {
        return segments;
    };

    let mut current = vec![first];
    let mut current_length = 0.0;
    let mut prev_bearing: Option<f64> = None;

    for i in 1..points.len() {
        let prev = points[i - 1];
        let point = points[i];

        current_length += haversine_distance(prev, point);
        let bearing = initial_bearing(prev, point);
        current.push(point);

        if current_length >= segment_length || i == points.len() - 1 {
            let instruction = match prev_bearing {
                Some(prev_bearing) => TurnInstruction::from_bearings(prev_bearing, bearing),
                None => TurnInstruction::StartRoute,
            };
            segments.push(Segment {
                coordinates: std::mem::replace(&mut current, vec![point]),
                length: current_length,
                instruction,
            });
            current_length = 0.0;
        }

        prev_bearing = Some(bearing);
    }

    segments
}
