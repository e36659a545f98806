//! Agent.
use super::{Env, Policy};
use crate::{record::Record, replay_memory::ReplayMemory};
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
///
/// The agent owns two copies of its action-value function: the online copy,
/// updated by [`Agent::opt`], and the target copy, updated only by
/// [`Agent::sync_target`].
pub trait Agent<E: Env>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Performs a learning update with trajectories sampled from `memory`.
    ///
    /// Returns `Ok(None)` without touching any parameter when the memory is
    /// empty. Otherwise the returned record contains the scalar `"loss"`.
    fn opt(&mut self, memory: &mut ReplayMemory<Self::State>) -> Result<Option<Record>>;

    /// Copies the parameters of the online network into the target network.
    fn sync_target(&mut self) -> Result<()>;

    /// The current exploration probability.
    fn exploration_rate(&self) -> f64;

    /// Saves the parameters of the online network into the given file.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Loads the parameters of the online network from the given file.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
