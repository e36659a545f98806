//! Configuration of the vision DQN agent.
use super::DqnModelConfig;
use crate::{util::OutDim, Device};
use anyhow::Result;
use orion_core::ExplorationConfig;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`VisionDqn`](super::VisionDqn) agent.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct VisionDqnConfig<Q>
where
    Q: OutDim,
{
    /// Action-value function and optimizer.
    pub model_config: DqnModelConfig<Q>,

    /// Maximum number of trajectories sampled per learning update.
    pub batch_size: usize,

    /// Discount of the reward-to-go.
    pub discount: f32,

    /// Discount of the bootstrapped action-value.
    pub gamma: f32,

    /// Value the reward-to-go restarts from at the end of every trajectory.
    pub punishment: f32,

    /// Scale of the observed rewards.
    pub incentive: f32,

    /// Elementwise bounds of the gradients. No clamping if `None`.
    pub grad_clamp: Option<(f32, f32)>,

    /// Exploration schedule.
    pub exploration: ExplorationConfig,

    /// Seed of the exploration draws.
    pub seed: u64,

    /// Device on which the networks are evaluated.
    pub device: Option<Device>,
}

impl<Q> Default for VisionDqnConfig<Q>
where
    Q: OutDim,
{
    fn default() -> Self {
        Self {
            model_config: DqnModelConfig::default(),
            batch_size: 32,
            discount: 0.99,
            gamma: 0.99,
            punishment: -10.0,
            incentive: 10.0,
            grad_clamp: Some((-1.0, 1.0)),
            exploration: ExplorationConfig::default(),
            seed: 42,
            device: None,
        }
    }
}

impl<Q> VisionDqnConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets the configuration of the model.
    pub fn model_config(mut self, v: DqnModelConfig<Q>) -> Self {
        self.model_config = v;
        self
    }

    /// Sets the number of trajectories per batch.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the discount of the reward-to-go.
    pub fn discount(mut self, v: f32) -> Self {
        self.discount = v;
        self
    }

    /// Sets the discount of the bootstrapped action-value.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the punishment.
    pub fn punishment(mut self, v: f32) -> Self {
        self.punishment = v;
        self
    }

    /// Sets the incentive.
    pub fn incentive(mut self, v: f32) -> Self {
        self.incentive = v;
        self
    }

    /// Sets the gradient bounds.
    pub fn grad_clamp(mut self, v: Option<(f32, f32)>) -> Self {
        self.grad_clamp = v;
        self
    }

    /// Sets the exploration schedule.
    pub fn exploration(mut self, v: ExplorationConfig) -> Self {
        self.exploration = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Sets the number of actions.
    pub fn out_dim(mut self, v: usize) -> Self {
        self.model_config = self.model_config.out_dim(v);
        self
    }

    /// Constructs [`VisionDqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`VisionDqnConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
