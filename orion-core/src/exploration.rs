//! Epsilon-greedy exploration with a per-update linear decay.
use crate::error::OrionError;
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration of [`ExplorationSchedule`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ExplorationConfig {
    /// Initial exploration rate.
    pub rate: f64,

    /// Minimum exploration rate.
    pub floor: f64,

    /// Number of learning updates to decay `rate` down to `floor`.
    pub steps: usize,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            floor: 0.001,
            steps: 4000,
        }
    }
}

impl ExplorationConfig {
    /// Sets the initial rate.
    pub fn rate(mut self, v: f64) -> Self {
        self.rate = v;
        self
    }

    /// Sets the minimum rate.
    pub fn floor(mut self, v: f64) -> Self {
        self.floor = v;
        self
    }

    /// Sets the decay horizon in learning updates.
    pub fn steps(mut self, v: usize) -> Self {
        self.steps = v;
        self
    }
}

/// Tracks the probability of taking a random action.
///
/// The rate is decayed by [`ExplorationSchedule::advance`], which the agent
/// calls once per learning update, not per environment step. Episodes in
/// which no update runs leave the rate unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorationSchedule {
    rate: f64,
    floor: f64,
    decay: f64,
}

impl ExplorationSchedule {
    /// Constructs a schedule with an explicit decay per update.
    pub fn new(rate: f64, floor: f64, decay: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&rate) || !(0.0..=1.0).contains(&floor) {
            return Err(OrionError::InvalidConfig(format!(
                "exploration rate {} and floor {} must be in [0, 1]",
                rate, floor
            ))
            .into());
        }
        if decay < 0.0 {
            return Err(OrionError::InvalidConfig(format!(
                "exploration decay {} must not be negative",
                decay
            ))
            .into());
        }
        Ok(Self {
            rate: rate.max(floor),
            floor,
            decay,
        })
    }

    /// Constructs a schedule reaching `floor` after `config.steps` updates.
    pub fn build(config: &ExplorationConfig) -> Result<Self> {
        let decay = (config.rate - config.floor).max(0.0) / config.steps.max(1) as f64;
        Self::new(config.rate, config.floor, decay)
    }

    /// The current rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// The minimum rate.
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// The decay per update.
    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Returns a uniformly random action with probability `rate`, otherwise
    /// the action given by `greedy`.
    ///
    /// `greedy` is only evaluated when the greedy branch is taken.
    pub fn select<R, F>(&self, n_actions: usize, rng: &mut R, greedy: F) -> Result<usize>
    where
        R: Rng,
        F: FnOnce() -> Result<usize>,
    {
        if rng.gen::<f64>() < self.rate {
            Ok(rng.gen_range(0..n_actions))
        } else {
            greedy()
        }
    }

    /// Decays the rate once, never below the floor.
    pub fn advance(&mut self) {
        self.rate = (self.rate - self.decay).max(self.floor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn test_advance_is_clamped() {
        let mut schedule = ExplorationSchedule::new(1.0, 0.1, 0.01).unwrap();
        let mut prev = schedule.rate();
        for _ in 0..95 {
            schedule.advance();
            assert!(schedule.rate() <= prev);
            assert!(schedule.rate() >= 0.1);
            prev = schedule.rate();
        }
        assert!((schedule.rate() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_build_from_horizon() {
        let config = ExplorationConfig::default().rate(1.0).floor(0.2).steps(4);
        let mut schedule = ExplorationSchedule::build(&config).unwrap();
        assert!((schedule.decay() - 0.2).abs() < 1e-12);
        for _ in 0..4 {
            schedule.advance();
        }
        assert!((schedule.rate() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_rate() {
        assert!(ExplorationSchedule::new(1.5, 0.1, 0.01).is_err());
        assert!(ExplorationSchedule::new(0.5, 0.1, -0.01).is_err());
    }

    #[test]
    fn test_select() {
        let mut rng = SmallRng::seed_from_u64(0);

        let greedy_only = ExplorationSchedule::new(0.0, 0.0, 0.0).unwrap();
        for _ in 0..100 {
            assert_eq!(greedy_only.select(4, &mut rng, || Ok(3)).unwrap(), 3);
        }

        let random_only = ExplorationSchedule::new(1.0, 1.0, 0.0).unwrap();
        let mut seen = [false; 4];
        for _ in 0..200 {
            let a = random_only
                .select(4, &mut rng, || panic!("greedy branch taken"))
                .unwrap();
            seen[a] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
