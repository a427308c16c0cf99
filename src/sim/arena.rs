//! The arena: one pen, one pig, its truffles and stumps
//!
//! Owns every piece of per-episode state and the per-arena RNG, so arenas can
//! be stepped independently (and on separate threads).

use glam::{Vec2, Vec3};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::agent::{Action, Agent, Observation};
use super::physics::{self, ContactState, StepParams};
use super::placement::{self, Footprint, FootprintRegistry, SpawnRegion};
use super::state::{EpisodeOutcome, OutcomeFeedback, RngState, Stump, Truffle};
use crate::error::{ActionError, ConfigError};
use crate::scoreboard::{EpisodeRecord, Scoreboard};
use crate::settings::Settings;

/// Per-episode spawn configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub num_truffles: u32,
    pub num_stumps: u32,
    /// Half-width of the spawn square
    pub spawn_range: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            num_truffles: 3,
            num_stumps: 2,
            spawn_range: 10.0,
        }
    }
}

impl ArenaConfig {
    pub fn new(num_truffles: u32, num_stumps: u32, spawn_range: f32) -> Result<Self, ConfigError> {
        let config = Self {
            num_truffles,
            num_stumps,
            spawn_range,
        };
        config.validate()?;
        Ok(config)
    }

    /// The spawn square must have a positive, finite half-width
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spawn_range.is_finite() && self.spawn_range > 0.0) {
            return Err(ConfigError::InvalidSpawnRange(f64::from(self.spawn_range)));
        }
        Ok(())
    }
}

/// Outcome of one arena tick
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Observation after the tick (after the reset, if the episode ended)
    pub observation: Observation,
    /// Reward given this tick
    pub reward: f64,
    /// Whether the episode ended this tick
    pub done: bool,
    pub outcome: Option<EpisodeOutcome>,
    /// Final cumulative reward of the episode that just ended
    pub episode_reward: Option<f64>,
}

/// One self-contained simulation space
#[derive(Debug, Clone)]
pub struct Arena {
    pub id: u32,
    /// World-space position of the arena center
    pub origin: Vec3,
    settings: Settings,
    config: ArenaConfig,
    pub agent: Agent,
    truffles: Vec<Truffle>,
    stumps: Vec<Stump>,
    /// Truffles placed this episode; collecting this many wins
    truffles_spawned: u32,
    footprints: FootprintRegistry,
    contacts: ContactState,
    feedback: Option<OutcomeFeedback>,
    pub scoreboard: Scoreboard,
    rng_state: RngState,
    rng: Pcg32,
    /// Episodes started since construction
    pub episode_count: u64,
    next_id: u32,
}

impl Arena {
    /// Create an arena and run its first reset with the default config
    pub fn new(id: u32, seed: u64, settings: Settings) -> Result<Self, ConfigError> {
        Self::with_config(id, seed, settings, ArenaConfig::default())
    }

    pub fn with_config(id: u32, seed: u64, settings: Settings, config: ArenaConfig) -> Result<Self, ConfigError> {
        settings.validate()?;
        config.validate()?;
        let rng_state = RngState::new(seed);
        let mut arena = Self {
            id,
            origin: Vec3::ZERO,
            agent: Agent::new(settings.pig_shape.body_radius()),
            settings,
            config,
            truffles: Vec::new(),
            stumps: Vec::new(),
            truffles_spawned: 0,
            footprints: FootprintRegistry::new(),
            contacts: ContactState::default(),
            feedback: None,
            scoreboard: Scoreboard::new(),
            rng: rng_state.to_rng(),
            rng_state,
            episode_count: 0,
            next_id: 1,
        };
        arena.reset_area();
        Ok(arena)
    }

    /// Set the spawn config. Takes effect on the next reset.
    ///
    /// An invalid config is rejected and the current one kept.
    pub fn configure(&mut self, config: ArenaConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> ArenaConfig {
        self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    /// Active truffles, in spawn order
    pub fn collectibles(&self) -> &[Truffle] {
        &self.truffles
    }

    pub fn stumps(&self) -> &[Stump] {
        &self.stumps
    }

    pub fn truffles_spawned(&self) -> u32 {
        self.truffles_spawned
    }

    pub fn footprints(&self) -> &FootprintRegistry {
        &self.footprints
    }

    /// In-flight outcome signal, if any
    pub fn feedback(&self) -> Option<OutcomeFeedback> {
        self.feedback
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn spawn_region(&self) -> SpawnRegion {
        SpawnRegion::new(self.config.spawn_range, self.settings.area_scale)
    }

    /// Start a new episode: re-place the agent, then respawn truffles and stumps
    pub fn reset_area(&mut self) {
        // Ids are unique within an episode
        self.next_id = 1;
        self.footprints.clear();
        self.contacts.clear();
        self.agent.reset();
        self.reset_agent_position();
        self.reset_truffles();
        self.reset_stumps();

        self.episode_count += 1;
        self.scoreboard.update_score(0.0);
        log::debug!(
            "Arena {} episode {}: {} truffles, {} stumps",
            self.id,
            self.episode_count,
            self.truffles.len(),
            self.stumps.len()
        );
    }

    fn reset_agent_position(&mut self) {
        let region = self.spawn_region();
        let radius = Footprint::radius_for(&self.settings.pig_shape, self.settings.footprint_margin);
        match placement::place(
            &mut self.rng,
            &mut self.footprints,
            region,
            radius,
            self.settings.agent_attempts,
            "pig",
        ) {
            Ok(placed) => {
                self.agent.body.pos = placed.position;
                self.agent.body.heading = placed.heading;
            }
            Err(err) => log::warn!("Arena {}: {}", self.id, err),
        }
    }

    fn reset_truffles(&mut self) {
        self.truffles.clear();
        let shape = self.settings.truffle_shape;
        let radius = Footprint::radius_for(&shape, self.settings.footprint_margin);
        let region = self.spawn_region();

        for _ in 0..self.config.num_truffles {
            match placement::place(
                &mut self.rng,
                &mut self.footprints,
                region,
                radius,
                self.settings.object_attempts,
                "truffle",
            ) {
                Ok(placed) => {
                    let id = self.next_entity_id();
                    self.truffles.push(Truffle {
                        id,
                        pos: placed.position,
                        heading: placed.heading,
                        radius: shape.body_radius(),
                    });
                }
                Err(err) => log::warn!("Arena {}: {}", self.id, err),
            }
        }
        self.truffles_spawned = self.truffles.len() as u32;
    }

    fn reset_stumps(&mut self) {
        self.stumps.clear();
        let shape = self.settings.stump_shape;
        let radius = Footprint::radius_for(&shape, self.settings.footprint_margin);
        let region = self.spawn_region();

        for _ in 0..self.config.num_stumps {
            match placement::place(
                &mut self.rng,
                &mut self.footprints,
                region,
                radius,
                self.settings.object_attempts,
                "stump",
            ) {
                Ok(placed) => {
                    let id = self.next_entity_id();
                    self.stumps.push(Stump {
                        id,
                        pos: placed.position,
                        heading: placed.heading,
                        radius: shape.body_radius(),
                    });
                }
                Err(err) => log::warn!("Arena {}: {}", self.id, err),
            }
        }
    }

    /// Agent position in arena-local 3D coordinates (y is up)
    pub fn agent_local_position(&self) -> Vec3 {
        let pos = self.agent.body.pos;
        Vec3::new(pos.x, 0.0, pos.y)
    }

    /// Convert an arena-local ground point to world space
    pub fn to_world(&self, local: Vec2) -> Vec3 {
        self.origin + Vec3::new(local.x, 0.0, local.y)
    }

    /// True if a local position is outside the pen on either ground axis
    pub fn check_boundary(&self, local: Vec3) -> bool {
        let limit = self.settings.boundary_half_extent;
        local.x.abs() > limit || local.z.abs() > limit
    }

    /// Raise the transient success/failure signal, replacing any in-flight one
    pub fn notify_outcome(&mut self, success: bool) {
        self.feedback = Some(OutcomeFeedback::new(success, self.settings.feedback_duration));
    }

    fn advance_feedback(&mut self, dt: f32) {
        if let Some(feedback) = self.feedback.as_mut() {
            if !feedback.advance(dt) {
                self.feedback = None;
            }
        }
    }

    /// Current observation
    pub fn observe(&self) -> Observation {
        self.agent
            .collect_observations(&self.settings, &self.stumps, &self.truffles)
    }

    /// Decode raw trainer channels and tick. Bad channels change nothing.
    pub fn step_channels(&mut self, channels: [u32; 2]) -> Result<StepResult, ActionError> {
        let action = Action::from_channels(channels)?;
        Ok(self.step(action))
    }

    /// Advance one fixed tick
    pub fn step(&mut self, action: Action) -> StepResult {
        let dt = self.settings.dt;
        self.agent.begin_tick();
        self.agent.apply_action(action, &self.settings);

        let params = StepParams {
            dt,
            drag: self.settings.drag,
            wall_half_extent: self.settings.wall_half_extent,
        };
        let events = physics::step(
            &mut self.agent.body,
            params,
            &self.stumps,
            &self.truffles,
            &mut self.contacts,
        );

        if !events.truffles.is_empty() {
            self.truffles.retain(|t| !events.truffles.contains(&t.id));
            for _ in &events.truffles {
                self.agent.collect_truffle(self.settings.truffle_reward);
            }
        }
        for _ in 0..events.obstacle_entries() {
            self.agent.add_reward(self.settings.collision_penalty);
        }

        self.agent.add_reward(self.settings.time_penalty);
        self.scoreboard.update_score(self.agent.cumulative_reward);

        let reward = self.agent.step_reward;
        let mut outcome = self
            .agent
            .evaluate_termination(self.truffles_spawned, self.settings.failure_threshold);

        let episode_reward = if let Some(result) = outcome {
            let total = self.agent.cumulative_reward;
            self.finish_episode(result);
            Some(total)
        } else if self.check_boundary(self.agent_local_position()) {
            let total = self.handle_boundary_violation();
            outcome = Some(EpisodeOutcome::OutOfBounds);
            Some(total)
        } else {
            None
        };

        // Boundary violations overwrite the tick's reward
        let reward = if outcome == Some(EpisodeOutcome::OutOfBounds) {
            self.settings.out_of_bounds_penalty
        } else {
            reward
        };

        self.advance_feedback(dt);

        StepResult {
            observation: self.observe(),
            reward,
            done: outcome.is_some(),
            outcome,
            episode_reward,
        }
    }

    fn record_episode(&mut self, outcome: EpisodeOutcome) {
        self.scoreboard.record(EpisodeRecord {
            outcome,
            reward: self.agent.cumulative_reward,
            ticks: self.agent.episode_ticks,
            items_collected: self.agent.items_collected,
        });
    }

    fn finish_episode(&mut self, outcome: EpisodeOutcome) {
        self.agent.terminate(outcome);
        self.record_episode(outcome);
        log::debug!(
            "Arena {} episode {} {} with reward {:.3} after {} ticks",
            self.id,
            self.episode_count,
            outcome.as_str(),
            self.agent.cumulative_reward,
            self.agent.episode_ticks
        );
        self.notify_outcome(outcome.is_success());
        self.reset_area();
    }

    /// Penalize, reset the agent, and start over. Returns the episode's final reward.
    fn handle_boundary_violation(&mut self) -> f64 {
        log::warn!(
            "Arena {}: pig out of the pen at ({:.2}, {:.2})",
            self.id,
            self.agent.body.pos.x,
            self.agent.body.pos.y
        );
        self.agent.set_reward(self.settings.out_of_bounds_penalty);
        let total = self.agent.cumulative_reward;
        self.agent.terminate(EpisodeOutcome::OutOfBounds);
        self.record_episode(EpisodeOutcome::OutOfBounds);
        self.agent.reset();
        self.reset_area();
        total
    }
}
