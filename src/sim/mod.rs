//! Deterministic simulation module
//!
//! All environment logic lives here. This module must stay deterministic:
//! - Fixed timestep only
//! - Seeded per-arena RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod agent;
pub mod arena;
pub mod collision;
pub mod controller;
pub mod episode;
pub mod perception;
pub mod physics;
pub mod placement;
pub mod smell;
pub mod state;

pub use agent::{Action, Agent, AgentPhase, Move, Observation, Rotate};
pub use arena::{Arena, ArenaConfig, StepResult};
pub use controller::{EpisodeController, NUM_STUMPS, NUM_TRUFFLES, ResetParameters, SPAWN_RANGE};
pub use episode::{Episode, EpisodeSummary, Policy, RandomPolicy, run_episode};
pub use placement::{Footprint, FootprintRegistry, Placement, SpawnRegion, place};
pub use smell::{SmellReading, sniff};
pub use state::{EpisodeOutcome, OutcomeFeedback, Stump, Truffle};
