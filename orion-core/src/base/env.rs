//! Environment.
use super::{Act, EnvStep, Info, Obs};
use crate::record::Record;
use anyhow::Result;

/// Represents an environment, typically an MDP with pixel observations.
///
/// Frame skipping is not the responsibility of the environment: the
/// [`Trainer`](crate::Trainer) calls [`Env::step`] repeatedly with the same
/// action and sums the rewards.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`EnvStep`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performes an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<(EnvStep<Self>, Record)>
    where
        Self: Sized;

    /// The number of discrete actions.
    fn n_actions(&self) -> usize;
}
