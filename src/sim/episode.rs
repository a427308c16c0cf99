//! Generic episode interface and driver loop
//!
//! Any trainer pairs with the simulation through [`Episode`] and [`Policy`].
//! The arena is the only episode in this crate, but the driver does not know
//! that.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::agent::{Action, Move, Observation, Rotate};
use super::arena::{Arena, ArenaConfig, StepResult};
use super::state::EpisodeOutcome;
use crate::error::ConfigError;

/// Something that can be configured, reset and stepped
pub trait Episode {
    type Config;

    /// Store the config for the next reset
    fn configure(&mut self, config: Self::Config) -> Result<(), ConfigError>;

    /// Begin a new episode and return its first observation
    fn reset(&mut self) -> Observation;

    /// Advance one tick
    fn step(&mut self, action: Action) -> StepResult;
}

impl Episode for Arena {
    type Config = ArenaConfig;

    fn configure(&mut self, config: ArenaConfig) -> Result<(), ConfigError> {
        Arena::configure(self, config)
    }

    fn reset(&mut self) -> Observation {
        self.reset_area();
        self.observe()
    }

    fn step(&mut self, action: Action) -> StepResult {
        Arena::step(self, action)
    }
}

/// External controller: observations in, actions out
pub trait Policy {
    fn act(&mut self, observation: &Observation) -> Action;
}

impl<F> Policy for F
where
    F: FnMut(&Observation) -> Action,
{
    fn act(&mut self, observation: &Observation) -> Action {
        self(observation)
    }
}

/// Uniformly random actions from a seeded generator
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: Pcg32,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &Observation) -> Action {
        let movement = match self.rng.random_range(0..3) {
            0 => Move::None,
            1 => Move::Forward,
            _ => Move::Backward,
        };
        let rotation = match self.rng.random_range(0..3) {
            0 => Rotate::None,
            1 => Rotate::Left,
            _ => Rotate::Right,
        };
        Action::new(movement, rotation)
    }
}

/// Summary of one driven episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    /// None if the tick limit ran out first
    pub outcome: Option<EpisodeOutcome>,
    /// Sum of per-tick rewards
    pub total_reward: f64,
    pub ticks: u64,
}

/// Reset `episode`, then step it with `policy` until it ends or `max_ticks` pass
pub fn run_episode<E, P>(episode: &mut E, policy: &mut P, max_ticks: u64) -> EpisodeSummary
where
    E: Episode,
    P: Policy + ?Sized,
{
    let mut observation = episode.reset();
    let mut total_reward = 0.0;

    for tick in 1..=max_ticks {
        let action = policy.act(&observation);
        let result = episode.step(action);
        total_reward += result.reward;
        observation = result.observation;

        if result.done {
            return EpisodeSummary {
                outcome: result.outcome,
                total_reward,
                ticks: tick,
            };
        }
    }

    EpisodeSummary {
        outcome: None,
        total_reward,
        ticks: max_ticks,
    }
}
