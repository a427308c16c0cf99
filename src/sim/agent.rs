//! The pig: action decoding, reward accumulation and termination
//!
//! The agent never reaches into the arena. The arena hands it the entity slices
//! it needs to observe, and feeds it contact events after each physics step.

use serde::{Deserialize, Serialize};

use super::perception::{self, RayLayout};
use super::physics::Body;
use super::smell;
use super::state::{EpisodeOutcome, Stump, Truffle};
use crate::consts::REWARD_EPSILON;
use crate::error::ActionError;
use crate::settings::Settings;
use crate::{forward_axis, normalize_heading, to_local_frame};

/// Rotation command (action channel 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotate {
    #[default]
    None,
    Left,
    Right,
}

/// Movement command (action channel 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Move {
    #[default]
    None,
    Forward,
    Backward,
}

/// One discrete action: 3 x 3 combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Action {
    pub movement: Move,
    pub rotation: Rotate,
}

impl Action {
    pub const fn new(movement: Move, rotation: Rotate) -> Self {
        Self { movement, rotation }
    }

    /// Decode the trainer's `[movement, rotation]` channels
    pub fn from_channels(channels: [u32; 2]) -> Result<Self, ActionError> {
        let movement = match channels[0] {
            0 => Move::None,
            1 => Move::Forward,
            2 => Move::Backward,
            other => return Err(ActionError::Movement(other)),
        };
        let rotation = match channels[1] {
            0 => Rotate::None,
            1 => Rotate::Left,
            2 => Rotate::Right,
            other => return Err(ActionError::Rotation(other)),
        };
        Ok(Self { movement, rotation })
    }

    /// Encode back into trainer channels
    pub fn to_channels(self) -> [u32; 2] {
        let movement = match self.movement {
            Move::None => 0,
            Move::Forward => 1,
            Move::Backward => 2,
        };
        let rotation = match self.rotation {
            Rotate::None => 0,
            Rotate::Left => 1,
            Rotate::Right => 2,
        };
        [movement, rotation]
    }
}

/// Agent lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AgentPhase {
    #[default]
    Active,
    Terminated(EpisodeOutcome),
}

/// Fixed-order observation vector:
/// `[ray features][smell left, smell right][local velocity x, local velocity z]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation(pub Vec<f32>);

impl Observation {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// (left, right) smell readings. `None` if the vector is too short.
    pub fn smell(&self) -> Option<(f32, f32)> {
        match self.0.as_slice() {
            [.., left, right, _, _] => Some((*left, *right)),
            _ => None,
        }
    }

    /// Local-frame velocity (x, z)
    pub fn velocity(&self) -> Option<(f32, f32)> {
        match self.0.as_slice() {
            [.., _, _, x, z] => Some((*x, *z)),
            _ => None,
        }
    }

    /// Ray features only
    pub fn rays(&self) -> Option<&[f32]> {
        let n = self.0.len().checked_sub(4)?;
        Some(&self.0[..n])
    }
}

/// The truffle-hunting agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub body: Body,
    pub cumulative_reward: f64,
    /// Reward given during the current tick
    pub step_reward: f64,
    pub items_collected: u32,
    pub phase: AgentPhase,
    /// Ticks since the last reset
    pub episode_ticks: u64,
}

impl Agent {
    pub fn new(body_radius: f32) -> Self {
        Self {
            body: Body::new(body_radius),
            cumulative_reward: 0.0,
            step_reward: 0.0,
            items_collected: 0,
            phase: AgentPhase::Active,
            episode_ticks: 0,
        }
    }

    /// Clear per-episode state. Position is left for the arena to re-place.
    pub fn reset(&mut self) {
        self.body.vel = glam::Vec2::ZERO;
        self.cumulative_reward = 0.0;
        self.step_reward = 0.0;
        self.items_collected = 0;
        self.phase = AgentPhase::Active;
        self.episode_ticks = 0;
    }

    pub fn is_active(&self) -> bool {
        self.phase == AgentPhase::Active
    }

    /// Start a new tick's reward bookkeeping
    pub fn begin_tick(&mut self) {
        self.step_reward = 0.0;
        self.episode_ticks += 1;
    }

    pub fn add_reward(&mut self, reward: f64) {
        self.step_reward += reward;
        self.cumulative_reward += reward;
    }

    /// Replace this tick's reward, adjusting the cumulative total to match
    pub fn set_reward(&mut self, reward: f64) {
        self.cumulative_reward += reward - self.step_reward;
        self.step_reward = reward;
    }

    /// Record a truffle pickup
    pub fn collect_truffle(&mut self, reward: f64) {
        self.items_collected += 1;
        self.add_reward(reward);
    }

    /// Rotate, then push along the new forward axis
    pub fn apply_action(&mut self, action: Action, settings: &Settings) {
        let rotate_amount = match action.rotation {
            Rotate::None => 0.0,
            Rotate::Left => -settings.rotate_speed,
            Rotate::Right => settings.rotate_speed,
        };
        self.body.heading = normalize_heading(self.body.heading + rotate_amount * settings.rotate_speed);

        let move_amount = match action.movement {
            Move::None => 0.0,
            Move::Forward => settings.move_speed,
            // Backward at half speed
            Move::Backward => settings.move_speed * -0.5,
        };
        self.body
            .add_velocity_change(forward_axis(self.body.heading) * move_amount * settings.move_speed);
    }

    /// Decide whether the episode is over.
    ///
    /// Failure is checked first and wins ties: if the last truffle is collected
    /// on the same tick the reward reaches the threshold, the episode fails.
    pub fn evaluate_termination(&self, truffles_total: u32, failure_threshold: f64) -> Option<EpisodeOutcome> {
        let failed = self.cumulative_reward <= failure_threshold + REWARD_EPSILON;
        let succeeded = self.items_collected >= truffles_total;

        match (failed, succeeded) {
            (true, true) => {
                log::debug!(
                    "Reward {:.3} hit the failure threshold on the tick all {} truffles were found; failure wins",
                    self.cumulative_reward,
                    truffles_total
                );
                Some(EpisodeOutcome::Failure)
            }
            (true, false) => Some(EpisodeOutcome::Failure),
            (false, true) => Some(EpisodeOutcome::Success),
            (false, false) => None,
        }
    }

    pub fn terminate(&mut self, outcome: EpisodeOutcome) {
        self.phase = AgentPhase::Terminated(outcome);
    }

    /// Build the observation vector
    pub fn collect_observations(&self, settings: &Settings, stumps: &[Stump], truffles: &[Truffle]) -> Observation {
        let mut obs = Vec::with_capacity(settings.observation_size());

        let layout = RayLayout {
            distance: settings.ray_distance,
            angles: &settings.ray_angles,
            wall_half_extent: settings.wall_half_extent,
        };
        perception::perceive(&mut obs, self.body.pos, self.body.heading, layout, stumps, truffles);

        let reading = smell::sniff(
            self.body.pos,
            self.body.heading,
            settings.nostril_width,
            truffles.iter().map(|t| t.pos),
        );
        obs.push(reading.left);
        obs.push(reading.right);

        let local_vel = to_local_frame(self.body.vel, self.body.heading);
        obs.push(local_vel.x);
        obs.push(local_vel.y);

        Observation(obs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_action_channels() {
        let action = Action::from_channels([2, 1]).unwrap();
        assert_eq!(action, Action::new(Move::Backward, Rotate::Left));
        assert_eq!(action.to_channels(), [2, 1]);

        assert_eq!(Action::from_channels([3, 0]), Err(ActionError::Movement(3)));
        assert_eq!(Action::from_channels([0, 7]), Err(ActionError::Rotation(7)));
    }

    #[test]
    fn test_all_nine_actions_decode() {
        let mut seen = Vec::new();
        for m in 0..3 {
            for r in 0..3 {
                let action = Action::from_channels([m, r]).unwrap();
                assert!(!seen.contains(&action));
                seen.push(action);
            }
        }
        assert_eq!(seen.len(), 9);
    }

    #[test]
    fn test_backward_is_half_forward() {
        let settings = Settings::default();
        let mut fwd = Agent::new(0.8);
        fwd.apply_action(Action::new(Move::Forward, Rotate::None), &settings);
        let mut back = Agent::new(0.8);
        back.apply_action(Action::new(Move::Backward, Rotate::None), &settings);

        assert!((back.body.vel + fwd.body.vel * 0.5).length() < 1e-6);
        assert!(fwd.body.vel.y > 0.0);
    }

    #[test]
    fn test_rotation_is_symmetric() {
        let settings = Settings::default();
        let mut left = Agent::new(0.8);
        left.body.heading = 180.0;
        left.apply_action(Action::new(Move::None, Rotate::Left), &settings);
        let mut right = Agent::new(0.8);
        right.body.heading = 180.0;
        right.apply_action(Action::new(Move::None, Rotate::Right), &settings);

        // rotate_speed^2 degrees per tick
        assert!((left.body.heading - 176.0).abs() < 1e-4);
        assert!((right.body.heading - 184.0).abs() < 1e-4);
    }

    #[test]
    fn test_set_reward_replaces_tick_reward() {
        let mut agent = Agent::new(0.8);
        agent.add_reward(2.0);
        agent.begin_tick();
        agent.add_reward(-0.001);
        agent.set_reward(-5.0);
        assert!((agent.step_reward + 5.0).abs() < 1e-12);
        assert!((agent.cumulative_reward + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_failure_after_five_hundred_collisions() {
        let mut agent = Agent::new(0.8);
        for _ in 0..499 {
            agent.add_reward(-0.01);
        }
        assert_eq!(agent.evaluate_termination(3, -5.0), None);
        agent.add_reward(-0.01);
        assert_eq!(agent.evaluate_termination(3, -5.0), Some(EpisodeOutcome::Failure));
    }

    #[test]
    fn test_success_when_all_collected() {
        let mut agent = Agent::new(0.8);
        agent.collect_truffle(1.0);
        agent.collect_truffle(1.0);
        assert_eq!(agent.evaluate_termination(3, -5.0), None);
        agent.collect_truffle(1.0);
        assert_eq!(agent.evaluate_termination(3, -5.0), Some(EpisodeOutcome::Success));
    }

    #[test]
    fn test_failure_wins_tie() {
        let mut agent = Agent::new(0.8);
        agent.add_reward(-6.0);
        agent.collect_truffle(1.0);
        assert_eq!(agent.evaluate_termination(1, -5.0), Some(EpisodeOutcome::Failure));
    }

    #[test]
    fn test_observation_layout() {
        let settings = Settings::default();
        let mut agent = Agent::new(0.8);
        agent.body.vel = Vec2::new(0.0, 3.0);
        let obs = agent.collect_observations(&settings, &[], &[]);
        assert_eq!(obs.len(), 8);
        assert_eq!(obs.smell(), Some((0.0, 0.0)));
        let (vx, vz) = obs.velocity().unwrap();
        assert!(vx.abs() < 1e-6);
        assert!((vz - 3.0).abs() < 1e-6);
        // Facing +z from the origin: the wall is straight ahead
        assert_eq!(&obs.rays().unwrap()[..3], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_short_observation_has_no_sections() {
        let empty = Observation(Vec::new());
        assert_eq!(empty.smell(), None);
        assert_eq!(empty.velocity(), None);
        assert_eq!(empty.rays(), None);

        // Smell and velocity only, no rays
        let bare = Observation(vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(bare.smell(), Some((0.1, 0.2)));
        assert_eq!(bare.velocity(), Some((0.3, 0.4)));
        assert_eq!(bare.rays(), Some(&[][..]));
    }

    #[test]
    fn test_reset_clears_episode_state() {
        let mut agent = Agent::new(0.8);
        agent.collect_truffle(1.0);
        agent.body.vel = Vec2::ONE;
        agent.terminate(EpisodeOutcome::Success);
        agent.reset();
        assert_eq!(agent.items_collected, 0);
        assert_eq!(agent.cumulative_reward, 0.0);
        assert_eq!(agent.body.vel, Vec2::ZERO);
        assert!(agent.is_active());
    }
}
