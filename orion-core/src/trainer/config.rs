//! Configuration of [`Trainer`](super::Trainer).
use crate::error::OrionError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
///
/// All intervals are counted in episodes, starting from episode 1.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The number of episodes to play.
    pub max_episodes: usize,

    /// The number of environment steps per agent decision.
    pub frame_skip: usize,

    /// Interval of learning updates.
    pub train_interval: usize,

    /// The episode from which learning updates and target syncs are allowed.
    pub warmup_episodes: usize,

    /// Interval of target network syncs.
    pub sync_interval: usize,

    /// Interval of saving the online parameters.
    pub checkpoint_interval: usize,

    /// Interval of the summary log.
    pub summary_interval: usize,

    /// Probability of keeping an episode without positive reward.
    pub remember_prob: f64,

    /// Where to save the parameters. Nothing is saved if `None`.
    pub model_dir: Option<String>,

    /// Seed of the environment and of the commit decisions.
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_episodes: 50000,
            frame_skip: 4,
            train_interval: 5,
            warmup_episodes: 1000,
            sync_interval: 1250,
            checkpoint_interval: 5000,
            summary_interval: 2500,
            remember_prob: 0.0025,
            model_dir: None,
            seed: 42,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of episodes.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the number of environment steps per decision.
    pub fn frame_skip(mut self, v: usize) -> Self {
        self.frame_skip = v;
        self
    }

    /// Sets the interval of learning updates in episodes.
    pub fn train_interval(mut self, v: usize) -> Self {
        self.train_interval = v;
        self
    }

    /// Sets the warmup period in episodes.
    pub fn warmup_episodes(mut self, v: usize) -> Self {
        self.warmup_episodes = v;
        self
    }

    /// Sets the interval of target syncs in episodes.
    pub fn sync_interval(mut self, v: usize) -> Self {
        self.sync_interval = v;
        self
    }

    /// Sets the interval of checkpoints in episodes.
    pub fn checkpoint_interval(mut self, v: usize) -> Self {
        self.checkpoint_interval = v;
        self
    }

    /// Sets the interval of the summary log in episodes.
    pub fn summary_interval(mut self, v: usize) -> Self {
        self.summary_interval = v;
        self
    }

    /// Sets the probability of keeping an episode without positive reward.
    pub fn remember_prob(mut self, v: f64) -> Self {
        self.remember_prob = v;
        self
    }

    /// Sets the directory of checkpoints.
    pub fn model_dir(mut self, v: impl Into<String>) -> Self {
        self.model_dir = Some(v.into());
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Checks that every interval is positive and the probability is in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("frame_skip", self.frame_skip),
            ("train_interval", self.train_interval),
            ("sync_interval", self.sync_interval),
            ("checkpoint_interval", self.checkpoint_interval),
            ("summary_interval", self.summary_interval),
        ];
        for (name, v) in intervals {
            if v == 0 {
                return Err(OrionError::InvalidConfig(format!("{} must be positive", name)).into());
            }
        }
        if !(0.0..=1.0).contains(&self.remember_prob) {
            return Err(OrionError::InvalidConfig(format!(
                "remember_prob {} must be in [0, 1]",
                self.remember_prob
            ))
            .into());
        }
        Ok(())
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
