//! Truffle Pig - a truffle-hunting reinforcement learning environment
//!
//! Core modules:
//! - `sim`: Deterministic simulation (placement, smell, rewards, episodes)
//! - `settings`: Data-driven environment tuning
//! - `scoreboard`: Score display text and finished-episode records
//! - `error`: Error types shared across the crate

pub mod error;
pub mod scoreboard;
pub mod settings;
pub mod sim;

pub use error::{ActionError, ConfigError, PlacementError};
pub use scoreboard::Scoreboard;
pub use settings::Settings;

use glam::Vec2;

/// Environment configuration constants
pub mod consts {
    /// Fixed simulation timestep (matches a 50 Hz physics tick)
    pub const SIM_DT: f32 = 0.02;

    /// Agent defaults
    pub const MOVE_SPEED: f32 = 1.0;
    pub const ROTATE_SPEED: f32 = 2.0;
    pub const NOSTRIL_WIDTH: f32 = 0.5;
    /// Linear drag applied by the kinematic body (1/s)
    pub const AGENT_DRAG: f32 = 4.0;

    /// Pen dimensions (arena-local units)
    pub const BOUNDARY_HALF_EXTENT: f32 = 13.0;
    pub const WALL_HALF_EXTENT: f32 = 12.5;

    /// Placement
    pub const AGENT_PLACEMENT_ATTEMPTS: u32 = 10;
    pub const OBJECT_PLACEMENT_ATTEMPTS: u32 = 50;
    /// Footprints are inflated by 10% to leave clearance
    pub const FOOTPRINT_MARGIN: f32 = 1.1;

    /// Rewards
    pub const TRUFFLE_REWARD: f64 = 1.0;
    pub const COLLISION_PENALTY: f64 = -0.01;
    pub const TIME_PENALTY: f64 = -0.001;
    pub const FAILURE_THRESHOLD: f64 = -5.0;
    pub const OUT_OF_BOUNDS_PENALTY: f64 = -5.0;
    /// Absorbs f64 accumulation error when comparing against the failure threshold
    pub const REWARD_EPSILON: f64 = 1e-9;

    /// Perception
    pub const RAY_DISTANCE: f32 = 20.0;
    pub const RAY_ANGLE: f32 = 90.0;
    /// Smell falloff: reading = SMELL_BASE - SMELL_FALLOFF * log10(distance)
    pub const SMELL_BASE: f32 = 0.8;
    pub const SMELL_FALLOFF: f32 = 0.5;
    pub const SMELL_MIN_DISTANCE: f32 = 1e-4;

    /// How long the success/failure ground signal stays up
    pub const FEEDBACK_DURATION: f32 = 0.5;
}

/// Normalize a heading in degrees to [0, 360)
#[inline]
pub fn normalize_heading(heading: f32) -> f32 {
    let h = heading.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if h >= 360.0 { 0.0 } else { h }
}

/// Forward axis in the ground plane (x, z) for a heading in degrees.
///
/// Heading 0 faces +z; positive headings turn clockwise seen from above.
#[inline]
pub fn forward_axis(heading: f32) -> Vec2 {
    let rad = heading.to_radians();
    Vec2::new(rad.sin(), rad.cos())
}

/// Right axis in the ground plane (x, z) for a heading in degrees
#[inline]
pub fn right_axis(heading: f32) -> Vec2 {
    let rad = heading.to_radians();
    Vec2::new(rad.cos(), -rad.sin())
}

/// Express a ground-plane vector in the local frame of a heading: (right, forward)
#[inline]
pub fn to_local_frame(v: Vec2, heading: f32) -> Vec2 {
    Vec2::new(v.dot(right_axis(heading)), v.dot(forward_axis(heading)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_heading() {
        assert_eq!(normalize_heading(370.0), 10.0);
        assert_eq!(normalize_heading(-90.0), 270.0);
        assert!(normalize_heading(-1e-9) < 360.0);
    }

    #[test]
    fn test_axes_are_orthonormal() {
        for heading in [0.0_f32, 33.0, 90.0, 181.0, 270.0] {
            let f = forward_axis(heading);
            let r = right_axis(heading);
            assert!((f.length() - 1.0).abs() < 1e-5);
            assert!(f.dot(r).abs() < 1e-5);
        }
        assert!((forward_axis(0.0) - Vec2::new(0.0, 1.0)).length() < 1e-5);
        assert!((right_axis(0.0) - Vec2::new(1.0, 0.0)).length() < 1e-5);
        assert!((forward_axis(90.0) - Vec2::new(1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_local_frame() {
        let v = Vec2::new(0.0, 2.0);
        let local = to_local_frame(v, 90.0);
        // Facing +x, a +z velocity points to the agent's left
        assert!((local.x + 2.0).abs() < 1e-5);
        assert!(local.y.abs() < 1e-5);
    }
}
