//! Episodic deep Q-learning for pixel-observation games.
//!
//! Orion consists of the following crates:
//!
//! * [`orion_core`] provides the interfaces between environments, state
//!   processors and agents, the trajectory replay memory, reward-to-go and
//!   the episode-level training loop. It does not depend on a tensor backend.
//! * [`orion_candle_agent`] implements the convolutional action-value function,
//!   frame preprocessing and the DQN agent with
//!   [candle](https://crates.io/crates/candle-core).
//! * [`orion_catch_env`] is a small falling-ball game rendered to grayscale
//!   frames.
//! * [`orion_tensorboard`] has `TensorboardRecorder`, writing metrics which
//!   can be shown in Tensorboard.
//!
//! This crate ties them together in [`run`] and the `orion` binary.
use anyhow::Result;
use log::info;
use orion_candle_agent::{cnn::Cnn, dqn::VisionDqn, preprocess::FrameStack};
use orion_catch_env::CatchEnv;
use orion_core::{checkpoint::load_latest, record::Recorder, Trainer};

pub use orion_candle_agent;
pub use orion_catch_env;
pub use orion_core;
pub use orion_tensorboard;

mod config;
pub use config::OrionConfig;

/// The agent playing [`CatchEnv`].
pub type CatchDqn = VisionDqn<CatchEnv, Cnn>;

/// Builds the agent, resuming from the latest checkpoint in the model
/// directory if there is one.
pub fn build_agent(config: &OrionConfig) -> Result<CatchDqn> {
    let mut agent_config = config.agent.clone();
    if agent_config.device.is_none() {
        agent_config = agent_config.device(config.frame_stack.device);
    }
    let mut agent = CatchDqn::build(agent_config)?;

    if let Some(model_dir) = &config.trainer.model_dir {
        if load_latest::<CatchEnv, _>(&mut agent, model_dir)?.is_none() {
            info!("No checkpoint in {}, starting from scratch", model_dir);
        }
    }
    Ok(agent)
}

/// Trains an agent on [`CatchEnv`] and returns it.
pub fn run(config: OrionConfig, recorder: &mut dyn Recorder) -> Result<CatchDqn> {
    config.validate()?;
    let mut agent = build_agent(&config)?;
    let mut trainer = Trainer::<CatchEnv, FrameStack>::build(
        config.trainer,
        config.env,
        config.frame_stack,
        &config.replay_memory,
    );
    trainer.train(&mut agent, recorder)?;
    Ok(agent)
}
