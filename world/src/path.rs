//! Arc-length parameterised polylines followed by enemies.

use std::f32::consts::FRAC_PI_2;

use lane_defence_core::Vec2;
use thiserror::Error;

/// Progress distance sampled on either side of a point to find the local perpendicular.
const LANE_PROBE: f32 = 0.02;
/// Progress distance sampled on either side of a point to measure turn sharpness.
const TURN_PROBE: f32 = 0.05;
/// Probe spans shorter than this are treated as degenerate.
const MIN_PROBE_SPAN: f32 = 1.0e-3;

/// Errors raised while constructing a [`GridPath`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// The polyline does not contain enough waypoints to form a segment.
    #[error("a path needs at least two waypoints, found {count}")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },
    /// The level does not define a main path.
    #[error("the level does not define any path")]
    MissingPath,
}

/// Immutable polyline with cached cumulative segment lengths.
#[derive(Clone, Debug, PartialEq)]
pub struct GridPath {
    waypoints: Vec<Vec2>,
    cumulative: Vec<f32>,
}

impl GridPath {
    /// Creates a path from world-space waypoints.
    pub fn new(waypoints: Vec<Vec2>) -> Result<Self, PathError> {
        if waypoints.len() < 2 {
            return Err(PathError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }

        let mut cumulative = Vec::with_capacity(waypoints.len());
        let mut travelled = 0.0;
        cumulative.push(travelled);
        for pair in waypoints.windows(2) {
            travelled += pair[0].distance(pair[1]);
            cumulative.push(travelled);
        }

        Ok(Self {
            waypoints,
            cumulative,
        })
    }

    /// Waypoints in travel order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Sum of the distances between consecutive waypoints.
    #[must_use]
    pub fn total_length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Position at the provided fraction of the path's arc length.
    ///
    /// Progress is clamped to `[0, 1]`; `0` yields the first waypoint and `1`
    /// the last one.
    #[must_use]
    pub fn position_at(&self, progress: f32) -> Vec2 {
        let first = self.waypoints[0];
        let last = self.waypoints[self.waypoints.len() - 1];
        if progress.is_nan() || progress <= 0.0 {
            return first;
        }
        if progress >= 1.0 {
            return last;
        }

        let target = progress * self.total_length();
        let end = self.cumulative.partition_point(|&length| length < target);
        if end == 0 {
            return first;
        }
        if end >= self.waypoints.len() {
            return last;
        }

        let start = end - 1;
        let span = self.cumulative[end] - self.cumulative[start];
        if span <= 0.0 {
            return self.waypoints[end];
        }
        let local = (target - self.cumulative[start]) / span;
        self.waypoints[start].lerp(self.waypoints[end], local)
    }

    /// Position displaced perpendicular to the local direction of travel.
    ///
    /// Positive offsets displace toward the left-hand normal of the path. The
    /// displacement shrinks by up to half near sharp turns. Degenerate
    /// neighbourhoods fall back to the centre position.
    #[must_use]
    pub fn lane_position(&self, progress: f32, offset: f32) -> Vec2 {
        let centre = self.position_at(progress);
        if offset == 0.0 {
            return centre;
        }

        let behind = self.position_at(progress - LANE_PROBE);
        let ahead = self.position_at(progress + LANE_PROBE);
        let direction = ahead - behind;
        if direction.length() <= MIN_PROBE_SPAN {
            return centre;
        }

        let normal = direction.normalize().perp();
        let damping = 1.0 - self.turn_sharpness(progress) * 0.5;
        centre + normal * (offset * damping)
    }

    /// Angular sharpness of the path around the provided progress.
    ///
    /// `0` is straight and `1` is a turn of ninety degrees or more. Points
    /// close to either end always report `0`.
    #[must_use]
    pub fn turn_sharpness(&self, progress: f32) -> f32 {
        if !(TURN_PROBE..=1.0 - TURN_PROBE).contains(&progress) {
            return 0.0;
        }

        let here = self.position_at(progress);
        let incoming = here - self.position_at(progress - TURN_PROBE);
        let outgoing = self.position_at(progress + TURN_PROBE) - here;
        if incoming.length() <= MIN_PROBE_SPAN || outgoing.length() <= MIN_PROBE_SPAN {
            return 0.0;
        }

        (incoming.angle_between(outgoing).abs() / FRAC_PI_2).min(1.0)
    }

    /// Shortest distance between the point and any segment of the path.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| distance_to_segment(point, pair[0], pair[1]))
            .fold(f32::INFINITY, f32::min)
    }
}

fn distance_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let segment = end - start;
    let length_squared = segment.length_squared();
    if length_squared <= 0.0 {
        return point.distance(start);
    }
    let t = ((point - start).dot(segment) / length_squared).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}
