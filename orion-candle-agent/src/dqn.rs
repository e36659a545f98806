//! DQN agent learning from whole trajectories.
mod base;
mod config;
mod model;
pub use base::VisionDqn;
pub use config::VisionDqnConfig;
pub use model::{DqnModel, DqnModelConfig};
