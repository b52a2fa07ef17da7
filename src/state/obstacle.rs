//! Obstacle generation.
//!
//! Obstacles are a pure function of a timestamp so that every replica
//! applying the same transition spawns the same obstacle.

use serde::{Deserialize, Serialize};

/// Number of lanes reachable by the car and by obstacles.
pub const LANE_COUNT: u8 = 2;

/// Distance at which every obstacle spawns.
pub const OBSTACLE_SPAWN_Z: i32 = -70;

/// An obstacle on the road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Lane index, always below [`LANE_COUNT`]
    pub lane: u8,

    /// Distance from the car
    pub z: i32,
}

impl Obstacle {
    /// Generate the obstacle for a timestamp.
    ///
    /// `lane = timestamp mod 2`, using the Euclidean remainder so negative
    /// timestamps still land on a valid lane.
    pub fn generate(timestamp: i64) -> Self {
        Self {
            lane: lane_for(timestamp),
            z: OBSTACLE_SPAWN_Z,
        }
    }
}

/// Lane an obstacle spawned at `timestamp` occupies.
pub fn lane_for(timestamp: i64) -> u8 {
    // rem_euclid keeps the result in 0..LANE_COUNT, so the cast is lossless.
    timestamp.rem_euclid(i64::from(LANE_COUNT)) as u8
}
