//! Score display and finished-episode records
//!
//! Keeps the running score text an arena would show, and a bounded history of
//! recent episodes for quick training summaries.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::sim::EpisodeOutcome;

/// Maximum number of finished episodes to keep
pub const MAX_EPISODE_RECORDS: usize = 100;

/// One finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub outcome: EpisodeOutcome,
    /// Final cumulative reward
    pub reward: f64,
    /// Ticks the episode lasted
    pub ticks: u64,
    pub items_collected: u32,
}

/// Per-arena score display and episode history (newest last)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoreboard {
    display: String,
    records: VecDeque<EpisodeRecord>,
    /// Total episodes ever recorded, including ones trimmed from history
    pub total_episodes: u64,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Scoreboard {
    pub fn new() -> Self {
        Self {
            display: format_score(0.0),
            records: VecDeque::with_capacity(MAX_EPISODE_RECORDS),
            total_episodes: 0,
        }
    }

    /// Update the score display text
    pub fn update_score(&mut self, score: f64) {
        self.display = format_score(score);
    }

    /// Current score text
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Record a finished episode, dropping the oldest past the cap
    pub fn record(&mut self, record: EpisodeRecord) {
        if self.records.len() == MAX_EPISODE_RECORDS {
            self.records.pop_front();
        }
        self.records.push_back(record);
        self.total_episodes += 1;
    }

    pub fn records(&self) -> impl Iterator<Item = &EpisodeRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&EpisodeRecord> {
        self.records.back()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fraction of kept episodes that succeeded
    pub fn success_rate(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let wins = self.records.iter().filter(|r| r.outcome.is_success()).count();
        Some(wins as f64 / self.records.len() as f64)
    }

    /// Best final reward among kept episodes
    pub fn best_reward(&self) -> Option<f64> {
        self.records.iter().map(|r| r.reward).reduce(f64::max)
    }

    /// Mean final reward among kept episodes
    pub fn mean_reward(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        Some(self.records.iter().map(|r| r.reward).sum::<f64>() / self.records.len() as f64)
    }
}

/// Two decimal places, as shown on the arena's score board
pub fn format_score(score: f64) -> String {
    format!("{score:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(outcome: EpisodeOutcome, reward: f64) -> EpisodeRecord {
        EpisodeRecord {
            outcome,
            reward,
            ticks: 10,
            items_collected: 0,
        }
    }

    #[test]
    fn test_display_format() {
        let mut board = Scoreboard::new();
        assert_eq!(board.display(), "0.00");
        board.update_score(2.987);
        assert_eq!(board.display(), "2.99");
        board.update_score(-0.001);
        assert_eq!(board.display(), "-0.00");
    }

    #[test]
    fn test_empty_board() {
        let board = Scoreboard::new();
        assert!(board.is_empty());
        assert_eq!(board.success_rate(), None);
        assert_eq!(board.best_reward(), None);
    }

    #[test]
    fn test_stats() {
        let mut board = Scoreboard::new();
        board.record(record(EpisodeOutcome::Success, 2.5));
        board.record(record(EpisodeOutcome::Failure, -5.0));
        board.record(record(EpisodeOutcome::OutOfBounds, -5.2));
        board.record(record(EpisodeOutcome::Success, 1.5));

        assert_eq!(board.success_rate(), Some(0.5));
        assert_eq!(board.best_reward(), Some(2.5));
        assert!((board.mean_reward().unwrap() - (-6.2 / 4.0)).abs() < 1e-12);
        assert_eq!(board.last().map(|r| r.reward), Some(1.5));
    }

    #[test]
    fn test_history_is_capped() {
        let mut board = Scoreboard::new();
        for i in 0..(MAX_EPISODE_RECORDS + 5) {
            board.record(record(EpisodeOutcome::Success, i as f64));
        }
        assert_eq!(board.records().count(), MAX_EPISODE_RECORDS);
        assert_eq!(board.total_episodes, (MAX_EPISODE_RECORDS + 5) as u64);
        // Oldest five were dropped
        assert_eq!(board.records().next().map(|r| r.reward), Some(5.0));
    }
}
