//! Configuration of a training run.
use anyhow::Result;
use orion_candle_agent::{
    cnn::CnnConfig,
    dqn::{DqnModelConfig, VisionDqnConfig},
    preprocess::{FrameStackConfig, PreprocessConfig},
    Device,
};
use orion_catch_env::{CatchAct, CatchEnvConfig};
use orion_core::{error::OrionError, replay_memory::ReplayMemoryConfig, TrainerConfig};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of a training run, one section per component.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct OrionConfig {
    /// Environment.
    pub env: CatchEnvConfig,

    /// Preprocessing and stacking of the observed frames.
    pub frame_stack: FrameStackConfig,

    /// Agent, its network and optimizer.
    pub agent: VisionDqnConfig<CnnConfig>,

    /// Replay memory.
    pub replay_memory: ReplayMemoryConfig,

    /// Training loop.
    pub trainer: TrainerConfig,
}

impl Default for OrionConfig {
    fn default() -> Self {
        let env = CatchEnvConfig::default();
        let preprocess = PreprocessConfig::default().crop(None).max_pooling(Some(2));
        let (h, w) = env.frame_shape();
        let frame_stack = FrameStackConfig::default()
            .n_stack(4)
            .preprocess(preprocess.clone());
        let q_config = CnnConfig::default()
            .n_stack(4)
            .in_shape(preprocess.out_shape(h, w))
            .out_dim(CatchAct::N);
        let agent = VisionDqnConfig::default()
            .model_config(DqnModelConfig::default().q_config(q_config))
            .device(Device::Cpu);

        Self {
            env,
            frame_stack,
            agent,
            replay_memory: ReplayMemoryConfig::default(),
            trainer: TrainerConfig::default().model_dir("./model/catch"),
        }
    }
}

impl OrionConfig {
    /// Checks that the sections agree with each other.
    ///
    /// The network input must match the shape of the stacked frames and its
    /// output the number of actions.
    pub fn validate(&self) -> Result<()> {
        self.trainer.validate()?;
        let q_config = match &self.agent.model_config.q_config {
            Some(q_config) => q_config,
            None => {
                return Err(OrionError::InvalidConfig(
                    "agent.model_config.q_config is not given".to_string(),
                )
                .into())
            }
        };
        q_config.validate()?;

        let (h, w) = self.env.frame_shape();
        let in_shape = self.frame_stack.preprocess.out_shape(h, w);
        if q_config.in_shape != in_shape || q_config.n_stack != self.frame_stack.n_stack {
            return Err(OrionError::InvalidConfig(format!(
                "network input {}x{:?} does not match stacked frames {}x{:?}",
                q_config.n_stack, q_config.in_shape, self.frame_stack.n_stack, in_shape
            ))
            .into());
        }
        if q_config.out_dim != CatchAct::N {
            return Err(OrionError::InvalidConfig(format!(
                "network output {} does not match {} actions",
                q_config.out_dim,
                CatchAct::N
            ))
            .into());
        }
        Ok(())
    }

    /// Overrides the directory of the checkpoints.
    pub fn model_dir(mut self, v: impl Into<String>) -> Self {
        self.trainer = self.trainer.model_dir(v);
        self
    }

    /// Loads [`OrionConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`OrionConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_default_is_consistent() -> Result<()> {
        let config = OrionConfig::default();
        config.validate()?;
        let q_config = config.agent.model_config.q_config.unwrap();
        assert_eq!(q_config.in_shape, (32, 16));
        assert_eq!(q_config.out_dim, 3);
        Ok(())
    }

    #[test]
    fn test_mismatched_input() {
        let mut config = OrionConfig::default();
        config.frame_stack = config.frame_stack.n_stack(2);
        assert!(config.validate().is_err());

        let mut config = OrionConfig::default();
        config.env = config.env.width(10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_orion_config() -> Result<()> {
        let config = OrionConfig::default().model_dir("some/directory");

        let dir = TempDir::new("orion_config")?;
        let path = dir.path().join("orion.yaml");
        config.save(&path)?;
        let config_ = OrionConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
