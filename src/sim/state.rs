//! Arena entities and episode bookkeeping types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// A scent-emitting collectible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truffle {
    pub id: u32,
    /// Arena-local position
    pub pos: Vec2,
    /// Heading in degrees
    pub heading: f32,
    /// Physical radius used for contacts and rays
    pub radius: f32,
}

/// A static obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stump {
    pub id: u32,
    pub pos: Vec2,
    pub heading: f32,
    pub radius: f32,
}

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeOutcome {
    /// Every spawned truffle was collected
    Success,
    /// Cumulative reward dropped to the failure threshold
    Failure,
    /// The agent left the pen
    OutOfBounds,
}

impl EpisodeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, EpisodeOutcome::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeOutcome::Success => "success",
            EpisodeOutcome::Failure => "failure",
            EpisodeOutcome::OutOfBounds => "out_of_bounds",
        }
    }
}

/// Transient success/failure signal shown on the arena ground.
///
/// Advanced by the tick clock; nothing in the simulation reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeFeedback {
    pub success: bool,
    /// Time units left before reverting to the normal ground
    pub remaining: f32,
}

impl OutcomeFeedback {
    pub fn new(success: bool, duration: f32) -> Self {
        Self {
            success,
            remaining: duration,
        }
    }

    /// Count down by `dt`. Returns false once expired.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining > 0.0
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_feedback_expires_after_duration() {
        let mut feedback = OutcomeFeedback::new(true, 0.5);
        let mut ticks = 0;
        while feedback.advance(0.02) {
            ticks += 1;
        }
        // Roughly 0.5 / 0.02 = 25 ticks, give or take float rounding
        assert!((24..=25).contains(&ticks), "ticks = {ticks}");
    }

    #[test]
    fn test_rng_state_reproducible() {
        let state = RngState::new(42);
        let a: u32 = state.to_rng().random();
        let b: u32 = state.to_rng().random();
        assert_eq!(a, b);
    }
}
