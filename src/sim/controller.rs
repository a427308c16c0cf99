//! Episode controller
//!
//! Holds the process-wide reset parameters and the arenas they apply to. Arenas
//! are handed over explicitly at construction; nothing is discovered globally.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::agent::Action;
use super::arena::{Arena, ArenaConfig, StepResult};
use crate::error::ConfigError;

pub const NUM_TRUFFLES: &str = "num_truffles";
pub const NUM_STUMPS: &str = "num_stumps";
pub const SPAWN_RANGE: &str = "spawn_range";

/// Reset parameters as the trainer sends them: named numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResetParameters {
    values: BTreeMap<String, f64>,
}

impl Default for ResetParameters {
    fn default() -> Self {
        let config = ArenaConfig::default();
        let mut params = Self::empty();
        params.set(NUM_TRUFFLES, f64::from(config.num_truffles));
        params.set(NUM_STUMPS, f64::from(config.num_stumps));
        params.set(SPAWN_RANGE, f64::from(config.spawn_range));
        params
    }
}

impl ResetParameters {
    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    /// Load from a JSON object of numbers
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn require(&self, key: &'static str) -> Result<f64, ConfigError> {
        let value = self.get(key).ok_or(ConfigError::MissingParameter(key))?;
        if !value.is_finite() {
            return Err(ConfigError::NonFinite { key, value });
        }
        Ok(value)
    }

    fn count(&self, key: &'static str) -> Result<u32, ConfigError> {
        let value = self.require(key)?;
        if value < 0.0 {
            return Err(ConfigError::NegativeCount { key, value });
        }
        // Truncate like an integer cast
        Ok(value.trunc().min(f64::from(u32::MAX)) as u32)
    }

    /// Validate into an arena config
    pub fn to_arena_config(&self) -> Result<ArenaConfig, ConfigError> {
        let num_truffles = self.count(NUM_TRUFFLES)?;
        let num_stumps = self.count(NUM_STUMPS)?;
        let spawn_range = self.require(SPAWN_RANGE)?;
        if spawn_range <= 0.0 {
            return Err(ConfigError::InvalidSpawnRange(spawn_range));
        }
        ArenaConfig::new(num_truffles, num_stumps, spawn_range as f32)
    }
}

/// Pushes reset parameters into every managed arena
#[derive(Debug)]
pub struct EpisodeController {
    parameters: ResetParameters,
    /// Bumped on every parameter change
    generation: u64,
    arenas: Vec<Arena>,
}

impl EpisodeController {
    pub fn new(parameters: ResetParameters, arenas: Vec<Arena>) -> Self {
        Self {
            parameters,
            generation: 0,
            arenas,
        }
    }

    pub fn parameters(&self) -> &ResetParameters {
        &self.parameters
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the parameters. Call only between batches, never mid-tick.
    pub fn set_parameters(&mut self, parameters: ResetParameters) {
        self.parameters = parameters;
        self.generation += 1;
    }

    pub fn set_parameter(&mut self, key: impl Into<String>, value: f64) {
        self.parameters.set(key, value);
        self.generation += 1;
    }

    pub fn arenas(&self) -> &[Arena] {
        &self.arenas
    }

    /// Mutable access for external drivers, e.g. one thread per arena
    pub fn arenas_mut(&mut self) -> &mut [Arena] {
        &mut self.arenas
    }

    /// Validate the parameters, then configure and reset every arena.
    ///
    /// Nothing is touched if validation fails.
    pub fn apply_reset_parameters(&mut self) -> Result<(), ConfigError> {
        let config = self.parameters.to_arena_config()?;
        log::info!(
            "Applying reset parameters (generation {}): {} truffles, {} stumps, spawn range {} to {} arenas",
            self.generation,
            config.num_truffles,
            config.num_stumps,
            config.spawn_range,
            self.arenas.len()
        );

        for arena in &mut self.arenas {
            arena.configure(config)?;
            arena.reset_area();
        }
        Ok(())
    }

    /// Tick every arena with its own action, in arena order
    pub fn step_all(&mut self, actions: &[Action]) -> Vec<StepResult> {
        debug_assert_eq!(actions.len(), self.arenas.len());
        self.arenas
            .iter_mut()
            .zip(actions)
            .map(|(arena, &action)| arena.step(action))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn arenas(n: u32) -> Vec<Arena> {
        (0..n)
            .map(|i| Arena::new(i, u64::from(i) + 100, Settings::default()).unwrap())
            .collect()
    }

    fn params(truffles: f64, stumps: f64, range: f64) -> ResetParameters {
        let mut p = ResetParameters::empty();
        p.set(NUM_TRUFFLES, truffles);
        p.set(NUM_STUMPS, stumps);
        p.set(SPAWN_RANGE, range);
        p
    }

    #[test]
    fn test_no_arenas_is_noop() {
        let mut controller = EpisodeController::new(ResetParameters::default(), Vec::new());
        assert!(controller.apply_reset_parameters().is_ok());
    }

    #[test]
    fn test_pushes_config_to_all_arenas() {
        let mut controller = EpisodeController::new(params(5.0, 1.0, 7.0), arenas(3));
        controller.apply_reset_parameters().unwrap();
        for arena in controller.arenas() {
            assert_eq!(arena.config(), ArenaConfig::new(5, 1, 7.0).unwrap());
            assert_eq!(arena.collectibles().len(), 5);
            assert_eq!(arena.stumps().len(), 1);
        }
    }

    #[test]
    fn test_counts_truncate() {
        let config = params(2.9, 0.4, 3.0).to_arena_config().unwrap();
        assert_eq!(config.num_truffles, 2);
        assert_eq!(config.num_stumps, 0);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(
            params(-1.0, 0.0, 3.0).to_arena_config(),
            Err(ConfigError::NegativeCount { key: NUM_TRUFFLES, .. })
        ));
        assert!(matches!(
            params(1.0, 1.0, 0.0).to_arena_config(),
            Err(ConfigError::InvalidSpawnRange(_))
        ));
        assert!(matches!(
            params(1.0, f64::NAN, 3.0).to_arena_config(),
            Err(ConfigError::NonFinite { key: NUM_STUMPS, .. })
        ));
        assert!(matches!(
            ResetParameters::empty().to_arena_config(),
            Err(ConfigError::MissingParameter(NUM_TRUFFLES))
        ));
    }

    #[test]
    fn test_failed_apply_leaves_arenas_untouched() {
        let mut controller = EpisodeController::new(params(1.0, 1.0, 5.0), arenas(2));
        controller.apply_reset_parameters().unwrap();
        let before: Vec<_> = controller.arenas().iter().map(|a| a.episode_count).collect();

        controller.set_parameter(NUM_STUMPS, -3.0);
        assert!(controller.apply_reset_parameters().is_err());

        let after: Vec<_> = controller.arenas().iter().map(|a| a.episode_count).collect();
        assert_eq!(before, after);
        assert_eq!(controller.arenas()[0].config().num_stumps, 1);
    }

    #[test]
    fn test_generation_counts_updates() {
        let mut controller = EpisodeController::new(ResetParameters::default(), Vec::new());
        assert_eq!(controller.generation(), 0);
        controller.set_parameter(NUM_TRUFFLES, 4.0);
        controller.set_parameters(ResetParameters::default());
        assert_eq!(controller.generation(), 2);
    }

    #[test]
    fn test_parameters_json() {
        let params: ResetParameters =
            serde_json::from_str(r#"{"num_truffles": 3, "num_stumps": 2, "spawn_range": 5.0}"#).unwrap();
        assert_eq!(params.to_arena_config().unwrap(), ArenaConfig::new(3, 2, 5.0).unwrap());
    }

    #[test]
    fn test_step_all() {
        let mut controller = EpisodeController::new(params(2.0, 0.0, 5.0), arenas(2));
        controller.apply_reset_parameters().unwrap();
        let results = controller.step_all(&[Action::default(), Action::default()]);
        assert_eq!(results.len(), 2);
        for result in results {
            assert_eq!(result.observation.len(), 8);
        }
    }
}
